use std::path::Path;

use lvfont::{CmapRange, DecodeOptions};

use crate::cli::OutputFormat;
use crate::shared::{format_codepoint, open_font};

pub fn run(file: &Path, format: &OutputFormat, options: DecodeOptions) -> Result<(), i32> {
    let font = open_font(file, options)?;
    let ranges = font.cmap_ranges();

    match format {
        OutputFormat::Text => {
            println!("type\tstart\tend\tglyph_id_start\tchars");
            for range in ranges {
                let (start, end) = range
                    .coverage()
                    .map(|(s, e)| (format_codepoint(s), format_codepoint(e)))
                    .unwrap_or_default();
                println!(
                    "{}\t{start}\t{end}\t{}\t{}",
                    range.kind(),
                    range.glyph_id_start,
                    range.resolved_len()
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = ranges.iter().map(range_json).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn range_json(range: &CmapRange) -> serde_json::Value {
    serde_json::json!({
        "type": range.kind().as_str(),
        "range_start": range.range_start,
        "range_length": range.range_length,
        "glyph_id_start": range.glyph_id_start,
        "list_length": range.list_length,
        "coverage": range.coverage().map(|(s, e)| [s, e]),
        "chars": range.resolved_len(),
    })
}
