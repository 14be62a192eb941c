use std::path::Path;

use lvfont::{DecodeOptions, DecodeWarning, Font};

/// Open a font file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file has an
/// unsupported extension, cannot be read or cannot be decoded. Decode
/// warnings are reported on stderr.
pub fn open_font(file: &Path, options: DecodeOptions) -> Result<Font, i32> {
    let font = Font::open_file(file, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open font: {e}");
        1
    })?;
    report_warnings(font.warnings());
    Ok(font)
}

/// Print decode warnings to stderr, one per line.
pub fn report_warnings(warnings: &[DecodeWarning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

/// Parse a character argument: a single character, `U+XXXX` or `0xXXXX`.
pub fn parse_char_arg(arg: &str) -> Result<u32, String> {
    let mut chars = arg.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(u32::from(c));
    }

    let hex = arg
        .strip_prefix("U+")
        .or_else(|| arg.strip_prefix("u+"))
        .or_else(|| arg.strip_prefix("0x"))
        .or_else(|| arg.strip_prefix("0X"))
        .ok_or_else(|| format!("invalid character '{arg}' (expected 'A', 'U+0041' or '0x41')"))?;
    u32::from_str_radix(hex, 16).map_err(|_| format!("invalid code point '{arg}'"))
}

/// Format a code point as `U+XXXX`.
pub fn format_codepoint(unicode: u32) -> String {
    format!("U+{unicode:04X}")
}

/// Printable form of a code point for text output, or an empty string.
pub fn printable(unicode: u32) -> String {
    match char::from_u32(unicode) {
        Some(c) if !c.is_control() && !c.is_whitespace() => c.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_char_literal() {
        assert_eq!(parse_char_arg("A"), Ok(0x41));
        assert_eq!(parse_char_arg("•"), Ok(0x2022));
    }

    #[test]
    fn parse_char_hex_forms() {
        assert_eq!(parse_char_arg("U+0041"), Ok(0x41));
        assert_eq!(parse_char_arg("u+2022"), Ok(0x2022));
        assert_eq!(parse_char_arg("0x41"), Ok(0x41));
        assert_eq!(parse_char_arg("0X1F600"), Ok(0x1F600));
    }

    #[test]
    fn parse_char_invalid() {
        assert!(parse_char_arg("").is_err());
        assert!(parse_char_arg("AB").is_err());
        assert!(parse_char_arg("U+ZZ").is_err());
    }

    #[test]
    fn format_codepoint_pads() {
        assert_eq!(format_codepoint(0x41), "U+0041");
        assert_eq!(format_codepoint(0x1F600), "U+1F600");
    }

    #[test]
    fn printable_skips_space_and_controls() {
        assert_eq!(printable(0x41), "A");
        assert_eq!(printable(0x20), "");
        assert_eq!(printable(0x0A), "");
        assert_eq!(printable(0xD800), "");
    }

    #[test]
    fn open_font_file_not_found() {
        let result = open_font(Path::new("/nonexistent/font.c"), DecodeOptions::default());
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn open_font_missing_unsupported_extension() {
        let result = open_font(Path::new("/nonexistent/font.ttf"), DecodeOptions::default());
        assert_eq!(result.err(), Some(1));
    }
}
