use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lvfont::{DecodeOptions, LocaFormat};

/// Inspect LVGL bitmap fonts generated by lv_font_conv (C source or binary).
///
/// With a FILE and no subcommand the font summary is printed. Without a FILE
/// the path is read from standard input.
#[derive(Debug, Parser)]
#[command(name = "lvfont", about, version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a .c, .h or .bin font file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub decode: DecodeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show font metrics and table sizes
    Info {
        /// Path to a .c, .h or .bin font file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List mapped glyphs with their metrics
    Glyphs {
        /// Path to a .c, .h or .bin font file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Show one glyph and its bitmap
    Glyph {
        /// Path to a .c, .h or .bin font file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Character to show: a literal ('A'), 'U+0041' or '0x41'
        #[arg(long = "char", value_name = "C")]
        character: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List the character map ranges
    Ranges {
        /// Path to a .c, .h or .bin font file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}

/// Decoder flags shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct DecodeArgs {
    /// Fail on the first decode warning instead of reporting it
    #[arg(long)]
    pub strict: bool,

    /// Read loca offsets as 16 or 32 bits according to the binary header
    #[arg(long)]
    pub loca_from_head: bool,

    /// Reject files larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<usize>,
}

impl DecodeArgs {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            strict_mode: self.strict,
            max_input_bytes: self.max_bytes,
            loca_format: if self.loca_from_head {
                LocaFormat::FromHead
            } else {
                LocaFormat::Offset32
            },
            ..DecodeOptions::default()
        }
    }
}

/// Output format for all subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}
