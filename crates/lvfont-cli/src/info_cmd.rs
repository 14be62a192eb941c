use std::path::Path;

use lvfont::{DecodeOptions, Font};

use crate::cli::OutputFormat;
use crate::shared::{format_codepoint, open_font};

pub fn run(file: &Path, format: &OutputFormat, options: DecodeOptions) -> Result<(), i32> {
    let font = open_font(file, options)?;
    match format {
        OutputFormat::Text => print_text(&font),
        OutputFormat::Json => print_json(&font)?,
    }
    Ok(())
}

fn print_text(font: &Font) {
    let meta = font.metadata();
    if let Some(path) = font.path() {
        println!("File: {}", path.display());
    }
    println!("Name: {}", font.name());
    if let Some(kind) = font.kind() {
        println!("Format: {kind}");
    }
    println!("Size: {} px", meta.font_size);
    println!("Bpp: {}", meta.bpp);
    println!("Line height: {}", meta.line_height);
    println!("Base line: {}", meta.base_line);
    println!("Subpixel: {}", meta.subpixel.as_str());
    println!("Compression: {}", meta.compression);
    println!(
        "Underline: position {}, thickness {}",
        meta.underline_position, meta.underline_thickness
    );
    println!("Kerning scale: {}", meta.kern_scale);
    println!("Glyphs: {}", font.glyph_count());
    println!("Mapped characters: {}", font.mapped_glyphs().len());
    println!("Cmap ranges: {}", font.cmap_ranges().len());
    println!("Kerning pairs: {}", font.model().kern_pairs().len());

    let ranges = font.unicode_ranges();
    if !ranges.is_empty() {
        let text: Vec<String> = ranges
            .iter()
            .map(|&(start, end)| format!("{}-{}", format_codepoint(start), format_codepoint(end)))
            .collect();
        println!("Unicode ranges: {}", text.join(", "));
    }
    if !font.warnings().is_empty() {
        println!("Warnings: {}", font.warnings().len());
    }
}

fn print_json(font: &Font) -> Result<(), i32> {
    let metadata = serde_json::to_value(font.metadata()).map_err(|e| {
        eprintln!("Error: failed to serialize metadata: {e}");
        1
    })?;
    let ranges: Vec<serde_json::Value> = font
        .unicode_ranges()
        .iter()
        .map(|&(start, end)| serde_json::json!([start, end]))
        .collect();
    let warnings: Vec<String> = font.warnings().iter().map(|w| w.to_string()).collect();

    let output = serde_json::json!({
        "file": font.path().map(|p| p.display().to_string()),
        "metadata": metadata,
        "glyph_count": font.glyph_count(),
        "mapped_count": font.mapped_glyphs().len(),
        "cmap_count": font.cmap_ranges().len(),
        "kern_pair_count": font.model().kern_pairs().len(),
        "unicode_ranges": ranges,
        "warnings": warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    Ok(())
}
