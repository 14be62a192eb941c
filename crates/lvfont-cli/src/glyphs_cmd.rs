use std::path::Path;

use lvfont::{DecodeOptions, Glyph};

use crate::cli::OutputFormat;
use crate::shared::{format_codepoint, open_font, printable};

pub fn run(file: &Path, format: &OutputFormat, options: DecodeOptions) -> Result<(), i32> {
    let font = open_font(file, options)?;
    let mapped = font.mapped_glyphs();

    match format {
        OutputFormat::Text => {
            println!("unicode\tchar\tadv\tbox_w\tbox_h\tofs_x\tofs_y");
            for (unicode, glyph) in &mapped {
                println!(
                    "{}\t{}\t{:.2}\t{}\t{}\t{}\t{}",
                    format_codepoint(*unicode),
                    printable(*unicode),
                    glyph.advance_width(),
                    glyph.box_w,
                    glyph.box_h,
                    glyph.ofs_x,
                    glyph.ofs_y,
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = mapped
                .iter()
                .map(|(unicode, glyph)| glyph_json(*unicode, glyph))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).unwrap_or_default()
            );
        }
    }

    Ok(())
}

/// Metrics of one glyph without its samples.
pub fn glyph_json(unicode: u32, glyph: &Glyph) -> serde_json::Value {
    serde_json::json!({
        "unicode": unicode,
        "char": char::from_u32(unicode).map(String::from),
        "adv_w": glyph.adv_w,
        "advance_width": glyph.advance_width(),
        "box_w": glyph.box_w,
        "box_h": glyph.box_h,
        "ofs_x": glyph.ofs_x,
        "ofs_y": glyph.ofs_y,
        "bitmap_index": glyph.bitmap_index,
    })
}
