//! Top-level font handle.

use std::path::{Path, PathBuf};

use lvfont_core::{
    CmapRange, DecodeOptions, DecodeResult, DecodeWarning, FontError, FontKind, FontMetadata,
    FontModel, Glyph, GlyphBitmap,
};
use lvfont_parse::{decode_binary, decode_source};

/// A decoded font with its unicode index built.
///
/// ```no_run
/// use lvfont::{DecodeOptions, Font};
///
/// let options = DecodeOptions { strict_mode: true, ..DecodeOptions::default() };
/// let font = Font::open_file("font_16.bin", Some(options))?;
/// println!("{} glyphs, line height {}", font.glyph_count(), font.metadata().line_height);
/// # Ok::<(), lvfont::FontError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Font {
    model: FontModel,
    warnings: Vec<DecodeWarning>,
    path: Option<PathBuf>,
}

impl Font {
    /// Open a font file, choosing the decoder from its extension.
    ///
    /// `.c` and `.h` files are read as generated C source, `.bin` files as the
    /// binary container (case-insensitive). A binary font has no name of its
    /// own, so it is named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::UnsupportedFormat`] for any other extension,
    /// before the file is read. Returns [`FontError::IoError`] if the file
    /// cannot be read, and the errors of [`Font::open`] otherwise.
    pub fn open_file(
        path: impl AsRef<Path>,
        options: Option<DecodeOptions>,
    ) -> Result<Self, FontError> {
        let path = path.as_ref();
        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(FontKind::from_extension)
            .ok_or_else(|| {
                FontError::UnsupportedFormat(format!(
                    "{} (expected a .c, .h or .bin file)",
                    path.display()
                ))
            })?;

        let bytes = std::fs::read(path).map_err(|e| FontError::IoError(e.to_string()))?;
        let mut font = Self::open(&bytes, kind, options)?;
        if font.model.metadata.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                font.model.metadata.name = stem.to_string();
            }
        }
        font.path = Some(path.to_path_buf());
        Ok(font)
    }

    /// Decode font bytes of a known kind.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::ResourceLimitExceeded`] if `bytes` is larger than
    /// `max_input_bytes`, [`FontError::EncodingError`] if C source is not
    /// valid UTF-8, and the first warning as an error in strict mode.
    pub fn open(
        bytes: &[u8],
        kind: FontKind,
        options: Option<DecodeOptions>,
    ) -> Result<Self, FontError> {
        let options = options.unwrap_or_default();
        options.check_input_len(bytes.len())?;

        let result = match kind {
            FontKind::Binary => decode_binary(bytes, &options),
            FontKind::Source => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    FontError::EncodingError(format!("font source is not valid UTF-8: {e}"))
                })?;
                decode_source(text, &options)
            }
        };
        Ok(Self::from_result(result.apply_options(&options)?))
    }

    /// Wrap an already decoded model, building its index.
    pub fn from_result(result: DecodeResult<FontModel>) -> Self {
        let DecodeResult {
            value: mut model,
            warnings,
        } = result;
        model.build_index();
        Self {
            model,
            warnings,
            path: None,
        }
    }

    /// The decoded model.
    pub fn model(&self) -> &FontModel {
        &self.model
    }

    /// Consume the font and return the model.
    pub fn into_model(self) -> FontModel {
        self.model
    }

    /// Non-fatal problems found while decoding.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    /// File the font was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn metadata(&self) -> &FontMetadata {
        &self.model.metadata
    }

    pub fn name(&self) -> &str {
        &self.model.metadata.name
    }

    pub fn kind(&self) -> Option<FontKind> {
        self.model.metadata.kind
    }

    /// Number of glyphs, reserved id 0 included.
    pub fn glyph_count(&self) -> usize {
        self.model.glyph_count()
    }

    pub fn glyphs(&self) -> &[Glyph] {
        self.model.glyphs()
    }

    pub fn glyph(&self, id: usize) -> Option<&Glyph> {
        self.model.glyph(id)
    }

    /// Glyph mapped to a code point.
    pub fn get_glyph(&self, unicode: u32) -> Option<&Glyph> {
        self.model.get_glyph(unicode)
    }

    /// Glyph mapped to a character.
    pub fn get_char(&self, c: char) -> Option<&Glyph> {
        self.model.get_glyph(u32::from(c))
    }

    /// Pixel grid of the glyph mapped to a code point.
    pub fn bitmap(&self, unicode: u32) -> Option<&GlyphBitmap> {
        self.get_glyph(unicode)?.bitmap.as_ref()
    }

    /// All mapped `(unicode, glyph)` pairs sorted by code point.
    pub fn mapped_glyphs(&self) -> Vec<(u32, &Glyph)> {
        self.model.mapped_glyphs()
    }

    pub fn cmap_ranges(&self) -> &[CmapRange] {
        self.model.cmap_ranges()
    }

    /// Inclusive code point intervals declared by the character map.
    pub fn unicode_ranges(&self) -> Vec<(u32, u32)> {
        self.model.unicode_ranges()
    }

    /// Kerning between the glyphs mapped to two characters, in kerning-scale units.
    pub fn kerning(&self, left: char, right: char) -> Option<i32> {
        let left = self.model.glyph_id(u32::from(left))?;
        let right = self.model.glyph_id(u32::from(right))?;
        self.model.kerning(left as u32, right as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvfont_core::DecodeWarningCode;

    const SOURCE: &str = r#"
/* Size: 8 px
 * Bpp: 1 */
static const uint8_t glyph_bitmap[] = { 0xC0, 0x80 };
static const lv_font_fmt_txt_glyph_dsc_t glyph_dsc[] = {
    {.bitmap_index = 0, .adv_w = 0, .box_w = 0, .box_h = 0, .ofs_x = 0, .ofs_y = 0},
    {.bitmap_index = 0, .adv_w = 80, .box_w = 2, .box_h = 1, .ofs_x = 0, .ofs_y = 0},
    {.bitmap_index = 1, .adv_w = 64, .box_w = 1, .box_h = 1, .ofs_x = 0, .ofs_y = 0}
};
static const lv_font_fmt_txt_cmap_t cmaps[] = {
    { .range_start = 104, .range_length = 2, .glyph_id_start = 1,
      .unicode_list = NULL, .glyph_id_ofs_list = NULL, .list_length = 0,
      .type = LV_FONT_FMT_TXT_CMAP_FORMAT0_TINY }
};
static const uint8_t kern_pair_glyph_ids[] = { 1, 2 };
static const int8_t kern_pair_values[] = { -4 };
static const lv_font_fmt_txt_kern_pair_t kern_pairs = {
    .glyph_ids = kern_pair_glyph_ids, .values = kern_pair_values, .pair_cnt = 1, .glyph_ids_size = 0
};
static const lv_font_fmt_txt_dsc_t font_dsc = {
    .glyph_bitmap = glyph_bitmap, .glyph_dsc = glyph_dsc, .cmaps = cmaps,
    .kern_dsc = &kern_pairs, .kern_scale = 16, .cmap_num = 1, .bpp = 1,
    .kern_classes = 0, .bitmap_format = 0
};
const lv_font_t hi_8 = { .line_height = 9, .base_line = 1, .dsc = &font_dsc };
"#;

    #[test]
    fn open_source_builds_index() {
        let font = Font::open(SOURCE.as_bytes(), FontKind::Source, None).unwrap();
        assert!(font.warnings().is_empty(), "{:?}", font.warnings());
        assert_eq!(font.name(), "hi_8");
        assert_eq!(font.kind(), Some(FontKind::Source));
        assert_eq!(font.glyph_count(), 3);
        assert!(font.model().is_indexed());
        assert_eq!(font.get_char('h').unwrap().adv_w, 80);
        assert_eq!(font.bitmap(u32::from('h')).unwrap().samples(), &[1, 1]);
        assert_eq!(font.get_char('i').unwrap().advance_width(), 4.0);
        assert!(font.get_char('j').is_none());
        assert_eq!(font.unicode_ranges(), vec![(104, 105)]);
        assert_eq!(font.kerning('h', 'i'), Some(-4));
        assert_eq!(font.kerning('i', 'h'), None);
        assert!(font.path().is_none());
    }

    #[test]
    fn invalid_utf8_source_is_fatal() {
        let err = Font::open(&[0x2F, 0x2A, 0xFF, 0xFE], FontKind::Source, None).unwrap_err();
        assert!(matches!(err, FontError::EncodingError(_)));
    }

    #[test]
    fn max_input_bytes_is_checked_first() {
        let options = DecodeOptions {
            max_input_bytes: Some(16),
            ..DecodeOptions::default()
        };
        let err = Font::open(SOURCE.as_bytes(), FontKind::Source, Some(options)).unwrap_err();
        assert!(matches!(
            err,
            FontError::ResourceLimitExceeded { limit_value: 16, .. }
        ));
    }

    #[test]
    fn strict_mode_escalates_first_warning() {
        let options = DecodeOptions {
            strict_mode: true,
            ..DecodeOptions::default()
        };
        let err = Font::open(b"", FontKind::Binary, Some(options)).unwrap_err();
        assert!(err.to_string().contains("MISSING_TABLE"));
    }

    #[test]
    fn warnings_can_be_discarded() {
        let options = DecodeOptions {
            collect_warnings: false,
            ..DecodeOptions::default()
        };
        let font = Font::open(b"", FontKind::Binary, Some(options)).unwrap();
        assert!(font.warnings().is_empty());
        assert_eq!(font.glyph_count(), 0);
    }

    #[test]
    fn empty_binary_is_a_valid_empty_font() {
        let font = Font::open(b"", FontKind::Binary, None).unwrap();
        assert_eq!(font.glyph_count(), 0);
        assert!(
            font.warnings()
                .iter()
                .all(|w| w.code == DecodeWarningCode::MissingTable)
        );
        assert!(font.get_glyph(0x41).is_none());
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let err = Font::open_file("/nonexistent/font.ttf", None).unwrap_err();
        assert!(matches!(err, FontError::UnsupportedFormat(_)));
        let err = Font::open_file("/nonexistent/font", None).unwrap_err();
        assert!(matches!(err, FontError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Font::open_file("/nonexistent/font.BIN", None).unwrap_err();
        assert!(matches!(err, FontError::IoError(_)));
    }

    #[test]
    fn from_result_indexes_model() {
        let result = decode_source(SOURCE, &DecodeOptions::default());
        let font = Font::from_result(result);
        assert!(font.get_char('i').is_some());
        let model = font.into_model();
        assert!(model.is_indexed());
    }

    #[test]
    fn font_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Font>();
        assert_sync::<Font>();
    }
}
