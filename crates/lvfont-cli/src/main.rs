mod cli;
mod glyph_cmd;
mod glyphs_cmd;
mod info_cmd;
mod ranges_cmd;
mod shared;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands, OutputFormat};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info {
            ref file,
            ref format,
            ref decode,
        }) => info_cmd::run(file, format, decode.options()),
        Some(Commands::Glyphs {
            ref file,
            ref format,
            ref decode,
        }) => glyphs_cmd::run(file, format, decode.options()),
        Some(Commands::Glyph {
            ref file,
            ref character,
            ref format,
            ref decode,
        }) => glyph_cmd::run(file, character, format, decode.options()),
        Some(Commands::Ranges {
            ref file,
            ref format,
            ref decode,
        }) => ranges_cmd::run(file, format, decode.options()),
        None => match cli.file.clone().map_or_else(prompt_for_file, Ok) {
            Ok(file) => info_cmd::run(&file, &OutputFormat::Text, cli.decode.options()),
            Err(code) => Err(code),
        },
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Ask for a font path on stdin when none was given on the command line.
fn prompt_for_file() -> Result<PathBuf, i32> {
    eprint!("Font file: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(|e| {
        eprintln!("Error: failed to read from stdin: {e}");
        1
    })?;
    let path = line.trim();
    if path.is_empty() {
        eprintln!("Error: no font file given");
        return Err(1);
    }
    Ok(PathBuf::from(path))
}
