use std::path::Path;

use lvfont::{DecodeOptions, GlyphBitmap};

use crate::cli::OutputFormat;
use crate::glyphs_cmd::glyph_json;
use crate::shared::{format_codepoint, open_font, parse_char_arg, printable};

const SHADES: [char; 4] = ['-', '+', '*', '#'];

pub fn run(
    file: &Path,
    character: &str,
    format: &OutputFormat,
    options: DecodeOptions,
) -> Result<(), i32> {
    let unicode = parse_char_arg(character).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    let font = open_font(file, options)?;

    let (Some(id), Some(glyph)) = (font.model().glyph_id(unicode), font.get_glyph(unicode)) else {
        eprintln!(
            "Error: {} is not mapped in {}",
            format_codepoint(unicode),
            file.display()
        );
        return Err(1);
    };

    match format {
        OutputFormat::Text => {
            println!(
                "{} '{}' (glyph {id})",
                format_codepoint(unicode),
                printable(unicode)
            );
            println!(
                "Advance: {:.2} px (adv_w {})",
                glyph.advance_width(),
                glyph.adv_w
            );
            println!(
                "Box: {}x{} at ({}, {})",
                glyph.box_w, glyph.box_h, glyph.ofs_x, glyph.ofs_y
            );
            match &glyph.bitmap {
                Some(bitmap) => {
                    println!();
                    for line in render_rows(bitmap) {
                        println!("{line}");
                    }
                }
                None if glyph.is_empty() => println!("Bitmap: empty"),
                None => println!("Bitmap: not decoded"),
            }
        }
        OutputFormat::Json => {
            let mut value = glyph_json(unicode, glyph);
            value["glyph_id"] = serde_json::json!(id);
            value["bitmap"] = match &glyph.bitmap {
                Some(bitmap) => serde_json::json!({
                    "width": bitmap.width(),
                    "height": bitmap.height(),
                    "bpp": bitmap.bpp().bits(),
                    "rows": bitmap.rows().collect::<Vec<_>>(),
                }),
                None => serde_json::Value::Null,
            };
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }
    }

    Ok(())
}

/// One line of shade characters per bitmap row; zero samples print as '.'.
fn render_rows(bitmap: &GlyphBitmap) -> Vec<String> {
    (0..bitmap.height())
        .map(|y| {
            (0..bitmap.width())
                .map(|x| match bitmap.intensity(x, y).unwrap_or(0) {
                    0 => '.',
                    level => SHADES[(usize::from(level) * SHADES.len() / 256).min(SHADES.len() - 1)],
                })
                .collect()
        })
        .collect()
}
