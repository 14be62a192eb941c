//! The decoded font model.
//!
//! A [`FontModel`] is created empty by a decoder, filled table by table,
//! and then indexed with [`FontModel::build_index`]. Mutating accessors
//! drop the index, so callers rebuild it after any change.

use std::collections::HashMap;
use std::fmt;

use crate::bitmap::GlyphBitmap;
use crate::cmap::{CmapRange, resolve_ranges};

/// One glyph: metrics plus its decoded coverage bitmap.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// Code point mapped to this glyph, 0 when unmapped or reserved.
    pub unicode: u32,
    /// Byte offset of the glyph's pixel data in the font's bitmap buffer.
    pub bitmap_index: usize,
    /// Advance width in 12.4 fixed point.
    pub adv_w: u32,
    /// Bounding box width in pixels.
    pub box_w: u16,
    /// Bounding box height in pixels.
    pub box_h: u16,
    /// Horizontal offset of the box from the pen position.
    pub ofs_x: i16,
    /// Vertical offset of the box from the baseline.
    pub ofs_y: i16,
    /// Decoded pixels; `None` for empty boxes or undecodable data.
    pub bitmap: Option<GlyphBitmap>,
}

impl Glyph {
    /// Advance width in pixels.
    pub fn advance_width(&self) -> f32 {
        self.adv_w as f32 / 16.0
    }

    /// The character this glyph is mapped to, if it is a valid scalar value.
    pub fn char(&self) -> Option<char> {
        char::from_u32(self.unicode)
    }

    /// Returns true if the bounding box covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.box_w == 0 || self.box_h == 0
    }

    /// Number of pixels in the bounding box.
    pub fn pixel_count(&self) -> usize {
        self.box_w as usize * self.box_h as usize
    }
}

/// A kerning adjustment between two glyphs, referenced by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernPair {
    /// Glyph id on the left side.
    pub left: u32,
    /// Glyph id on the right side.
    pub right: u32,
    /// Adjustment in 4.4 fixed point, scaled by the font's kerning scale.
    pub value: i32,
}

/// Which artifact shape a model was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontKind {
    /// Generated C source.
    Source,
    /// Binary chunk container.
    Binary,
}

impl FontKind {
    /// Kind for a file extension (`c`/`h` or `bin`, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "c" | "h" => Some(FontKind::Source),
            "bin" => Some(FontKind::Binary),
            _ => None,
        }
    }

    /// Short lowercase name ("source" or "binary").
    pub fn as_str(self) -> &'static str {
        match self {
            FontKind::Source => "source",
            FontKind::Binary => "binary",
        }
    }
}

impl fmt::Display for FontKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subpixel rendering mode the font was converted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubpixelMode {
    /// Regular, one sample per pixel.
    #[default]
    None,
    /// Three horizontal subpixels per pixel.
    Horizontal,
    /// Three vertical subpixels per pixel.
    Vertical,
    /// Both directions.
    Both,
}

impl SubpixelMode {
    /// Mode from the binary header code. Unknown codes fall back to `None`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => SubpixelMode::Horizontal,
            2 => SubpixelMode::Vertical,
            3 => SubpixelMode::Both,
            _ => SubpixelMode::None,
        }
    }

    /// Mode from a source tag such as `LV_FONT_SUBPX_HOR`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.strip_prefix("LV_FONT_SUBPX_").unwrap_or(tag) {
            "NONE" => Some(SubpixelMode::None),
            "HOR" => Some(SubpixelMode::Horizontal),
            "VER" => Some(SubpixelMode::Vertical),
            "BOTH" => Some(SubpixelMode::Both),
            _ => None,
        }
    }

    /// Converter tag without prefix ("NONE", "HOR", "VER", "BOTH").
    pub fn as_str(self) -> &'static str {
        match self {
            SubpixelMode::None => "NONE",
            SubpixelMode::Horizontal => "HOR",
            SubpixelMode::Vertical => "VER",
            SubpixelMode::Both => "BOTH",
        }
    }
}

/// Bitmap compression declared by the font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    /// Plain packed samples.
    #[default]
    None,
    /// RLE with XOR line prefilter.
    Rle,
    /// RLE without prefilter.
    RleNoPrefilter,
    /// A code this library does not know.
    Unknown(u8),
}

impl Compression {
    /// Compression from its numeric code (binary `compression_id`, source `bitmap_format`).
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Compression::None,
            1 => Compression::Rle,
            2 => Compression::RleNoPrefilter,
            other => Compression::Unknown(other),
        }
    }

    /// Returns true for anything but plain samples.
    pub fn is_compressed(self) -> bool {
        self != Compression::None
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("NONE"),
            Compression::Rle => f.write_str("RLE"),
            Compression::RleNoPrefilter => f.write_str("RLE_NO_PREFILTER"),
            Compression::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// The binary container's `head` chunk, field for field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadTable {
    /// Format version; `1` for current converters.
    pub version: u32,
    /// Number of tables that follow `head`.
    pub table_count: u16,
    /// Nominal font size in px.
    pub font_size: u16,
    /// Distance from the baseline to the top of the line.
    pub ascent: u16,
    /// Distance from the baseline to the bottom of the line, usually negative.
    pub descent: i16,
    /// Typographic ascent from the source font.
    pub typo_ascent: u16,
    /// Typographic descent from the source font.
    pub typo_descent: i16,
    /// Typographic line gap from the source font.
    pub typo_line_gap: u16,
    /// Lowest pixel row any glyph reaches.
    pub min_y: i16,
    /// Highest pixel row any glyph reaches.
    pub max_y: i16,
    /// Advance shared by every glyph when non-zero.
    pub default_advance_width: u16,
    /// Kerning scale in 12.4 fixed point.
    pub kerning_scale: u16,
    /// `0` for 16-bit `loca` offsets, `1` for 32-bit.
    pub index_to_loc_format: u8,
    /// `0` for 8-bit glyph ids in kerning tables, `1` for 16-bit.
    pub glyph_id_format: u8,
    /// `0` for whole-pixel advances, `1` for 12.4 fixed point.
    pub advance_width_format: u8,
    /// Bits per pixel of glyph bitmaps.
    pub bits_per_pixel: u8,
    /// Bit width of each glyph's `ofs_x`/`ofs_y`.
    pub xy_bits: u8,
    /// Bit width of each glyph's `box_w`/`box_h`.
    pub wh_bits: u8,
    /// Bit width of each glyph's advance.
    pub advance_width_bits: u8,
    /// Raw bitmap compression code, see [`Compression`].
    pub compression_id: u8,
    /// Raw subpixel rendering code.
    pub subpixel_mode: u8,
    /// Padding byte.
    pub reserved: u8,
    /// Underline offset from the baseline.
    pub underline_position: i16,
    /// Underline thickness in px.
    pub underline_thickness: u16,
}

impl HeadTable {
    /// `ascent - descent`.
    pub fn line_height(&self) -> i32 {
        i32::from(self.ascent) - i32::from(self.descent)
    }

    /// Baseline measured from the bottom of the line (`-descent`).
    pub fn base_line(&self) -> i32 {
        -i32::from(self.descent)
    }
}

/// Scalar font properties.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontMetadata {
    /// Font identifier (the public font variable name for source fonts).
    pub name: String,
    /// Artifact shape the model was decoded from.
    pub kind: Option<FontKind>,
    /// Nominal pixel size.
    pub font_size: u32,
    /// Maximum line height in pixels.
    pub line_height: i32,
    /// Baseline measured from the bottom of the line.
    pub base_line: i32,
    /// Bits per pixel of glyph bitmaps as declared (0 when unknown).
    pub bpp: u8,
    /// Subpixel mode.
    pub subpixel: SubpixelMode,
    /// Bitmap compression.
    pub compression: Compression,
    /// Underline position relative to the baseline.
    pub underline_position: i16,
    /// Underline thickness.
    pub underline_thickness: u16,
    /// Kerning scale in 12.4 fixed point.
    pub kern_scale: u16,
    /// Full `head` chunk for binary fonts.
    pub head: Option<HeadTable>,
}

/// A decoded font: glyphs, character map, kerning and metadata.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontModel {
    /// Scalar properties.
    pub metadata: FontMetadata,
    glyphs: Vec<Glyph>,
    cmap_ranges: Vec<CmapRange>,
    kern_pairs: Vec<KernPair>,
    glyph_bitmap: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: Option<HashMap<u32, usize>>,
}

impl FontModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model tagged with the artifact kind.
    pub fn with_kind(kind: FontKind) -> Self {
        let mut model = Self::default();
        model.metadata.kind = Some(kind);
        model
    }

    /// Glyphs in id order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Glyph by id.
    pub fn glyph(&self, id: usize) -> Option<&Glyph> {
        self.glyphs.get(id)
    }

    /// Mutable glyph storage. Drops the unicode index.
    pub fn glyphs_mut(&mut self) -> &mut Vec<Glyph> {
        self.index = None;
        &mut self.glyphs
    }

    /// Total number of glyphs, reserved id 0 included.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Character map ranges in declaration order.
    pub fn cmap_ranges(&self) -> &[CmapRange] {
        &self.cmap_ranges
    }

    /// Append a character map range. Drops the unicode index.
    pub fn push_cmap_range(&mut self, range: CmapRange) {
        self.index = None;
        self.cmap_ranges.push(range);
    }

    /// Kerning pairs in declaration order.
    pub fn kern_pairs(&self) -> &[KernPair] {
        &self.kern_pairs
    }

    /// Append a kerning pair.
    pub fn push_kern_pair(&mut self, pair: KernPair) {
        self.kern_pairs.push(pair);
    }

    /// Kerning value for a glyph pair, if one is declared.
    pub fn kerning(&self, left: u32, right: u32) -> Option<i32> {
        self.kern_pairs
            .iter()
            .find(|p| p.left == left && p.right == right)
            .map(|p| p.value)
    }

    /// Raw pixel data all glyphs' `bitmap_index` values point into.
    pub fn glyph_bitmap(&self) -> &[u8] {
        &self.glyph_bitmap
    }

    /// Replace the raw pixel data.
    pub fn set_glyph_bitmap(&mut self, data: Vec<u8>) {
        self.glyph_bitmap = data;
    }

    /// Write resolved code points onto glyphs, in cmap range order.
    ///
    /// Returns the number of mappings dropped for out-of-range glyph ids.
    pub fn assign_unicodes(&mut self) -> usize {
        let resolution = resolve_ranges(&self.cmap_ranges, self.glyphs.len());
        for &(unicode, glyph_id) in &resolution.pairs {
            self.glyphs[glyph_id].unicode = unicode;
        }
        self.index = None;
        resolution.dropped
    }

    /// Build the unicode -> glyph index from the cmap ranges.
    ///
    /// When two ranges map the same code point, the later one wins.
    pub fn build_index(&mut self) {
        let resolution = resolve_ranges(&self.cmap_ranges, self.glyphs.len());
        let mut index = HashMap::with_capacity(resolution.pairs.len());
        for (unicode, glyph_id) in resolution.pairs {
            index.insert(unicode, glyph_id);
        }
        self.index = Some(index);
    }

    /// Returns true if the index is built and current.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Glyph id mapped to `unicode`.
    pub fn glyph_id(&self, unicode: u32) -> Option<usize> {
        self.index.as_ref()?.get(&unicode).copied()
    }

    /// Glyph mapped to `unicode`; `None` when unmapped or the index is not built.
    pub fn get_glyph(&self, unicode: u32) -> Option<&Glyph> {
        self.glyph_id(unicode).and_then(|id| self.glyphs.get(id))
    }

    /// All indexed `(unicode, glyph)` pairs sorted by code point.
    pub fn mapped_glyphs(&self) -> Vec<(u32, &Glyph)> {
        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };
        let mut mapped: Vec<(u32, &Glyph)> = index
            .iter()
            .filter_map(|(&unicode, &id)| self.glyphs.get(id).map(|g| (unicode, g)))
            .collect();
        mapped.sort_by_key(|&(unicode, _)| unicode);
        mapped
    }

    /// Inclusive `(first, last)` code point intervals from the declared cmap ranges.
    pub fn unicode_ranges(&self) -> Vec<(u32, u32)> {
        self.cmap_ranges.iter().filter_map(CmapRange::coverage).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bpp, GlyphBitmap};
    use crate::cmap::CmapEncoding;

    fn glyph(adv_w: u32) -> Glyph {
        Glyph {
            adv_w,
            ..Glyph::default()
        }
    }

    fn model_with_glyphs(count: usize) -> FontModel {
        let mut model = FontModel::new();
        for i in 0..count {
            model.glyphs_mut().push(glyph(i as u32 * 16));
        }
        model
    }

    #[test]
    fn advance_width_is_fixed_point() {
        assert_eq!(glyph(142).advance_width(), 8.875);
        assert_eq!(glyph(0).advance_width(), 0.0);
    }

    #[test]
    fn glyph_char() {
        let g = Glyph {
            unicode: 0x41,
            ..Glyph::default()
        };
        assert_eq!(g.char(), Some('A'));
        let bad = Glyph {
            unicode: 0xD800,
            ..Glyph::default()
        };
        assert_eq!(bad.char(), None);
    }

    #[test]
    fn empty_box() {
        let g = Glyph {
            box_w: 3,
            box_h: 0,
            ..Glyph::default()
        };
        assert!(g.is_empty());
        assert_eq!(g.pixel_count(), 0);
    }

    #[test]
    fn head_derived_metrics() {
        let head = HeadTable {
            ascent: 14,
            descent: -3,
            ..HeadTable::default()
        };
        assert_eq!(head.line_height(), 17);
        assert_eq!(head.base_line(), 3);
    }

    #[test]
    fn get_glyph_requires_index() {
        let mut model = model_with_glyphs(3);
        model.push_cmap_range(CmapRange::tiny(0x41, 2, 1));
        assert!(model.get_glyph(0x41).is_none());
        model.build_index();
        assert!(model.is_indexed());
        assert_eq!(model.get_glyph(0x41), Some(&model.glyphs()[1]));
        assert_eq!(model.get_glyph(0x42), Some(&model.glyphs()[2]));
        assert!(model.get_glyph(0x43).is_none());
    }

    #[test]
    fn later_range_wins_for_duplicate_unicode() {
        let mut model = model_with_glyphs(6);
        model.push_cmap_range(CmapRange::tiny(0x41, 3, 1));
        model.push_cmap_range(CmapRange::tiny(0x42, 1, 5));
        model.build_index();
        assert_eq!(model.glyph_id(0x41), Some(1));
        assert_eq!(model.glyph_id(0x42), Some(5));
        assert_eq!(model.glyph_id(0x43), Some(3));
    }

    #[test]
    fn mutation_invalidates_index() {
        let mut model = model_with_glyphs(2);
        model.push_cmap_range(CmapRange::tiny(0x30, 1, 1));
        model.build_index();
        assert!(model.is_indexed());
        model.glyphs_mut().push(Glyph::default());
        assert!(!model.is_indexed());
        assert!(model.get_glyph(0x30).is_none());
        model.build_index();
        assert!(model.get_glyph(0x30).is_some());
    }

    #[test]
    fn assign_unicodes_writes_glyphs_and_counts_drops() {
        let mut model = model_with_glyphs(3);
        model.push_cmap_range(CmapRange::tiny(0x61, 4, 1));
        let dropped = model.assign_unicodes();
        assert_eq!(dropped, 2);
        assert_eq!(model.glyphs()[0].unicode, 0);
        assert_eq!(model.glyphs()[1].unicode, 0x61);
        assert_eq!(model.glyphs()[2].unicode, 0x62);
    }

    #[test]
    fn unicode_ranges_come_from_declared_ranges() {
        let mut model = model_with_glyphs(1);
        model.push_cmap_range(CmapRange::tiny(32, 95, 1));
        model.push_cmap_range(CmapRange {
            range_start: 0x4E00,
            range_length: 100,
            glyph_id_start: 96,
            list_length: 2,
            encoding: CmapEncoding::SparseTiny {
                unicode_offsets: vec![0, 99],
            },
        });
        // Ranges are reported even though the glyphs they point to are missing.
        assert_eq!(model.unicode_ranges(), vec![(32, 126), (0x4E00, 0x4E63)]);
    }

    #[test]
    fn mapped_glyphs_sorted_by_unicode() {
        let mut model = model_with_glyphs(4);
        model.push_cmap_range(CmapRange::tiny(0x62, 2, 2));
        model.push_cmap_range(CmapRange::tiny(0x41, 1, 1));
        model.build_index();
        let codes: Vec<u32> = model.mapped_glyphs().iter().map(|(u, _)| *u).collect();
        assert_eq!(codes, vec![0x41, 0x62, 0x63]);
    }

    #[test]
    fn kerning_lookup() {
        let mut model = FontModel::new();
        model.push_kern_pair(KernPair {
            left: 1,
            right: 2,
            value: -12,
        });
        assert_eq!(model.kerning(1, 2), Some(-12));
        assert_eq!(model.kerning(2, 1), None);
    }

    #[test]
    fn empty_model_is_valid() {
        let mut model = FontModel::with_kind(FontKind::Binary);
        model.build_index();
        assert_eq!(model.glyph_count(), 0);
        assert!(model.get_glyph(0x41).is_none());
        assert_eq!(model.metadata.kind, Some(FontKind::Binary));
    }

    #[test]
    fn glyph_bitmap_stays_attached() {
        let mut model = model_with_glyphs(1);
        let bitmap = GlyphBitmap::from_samples(1, 1, Bpp::One, vec![1]).unwrap();
        model.glyphs_mut()[0].bitmap = Some(bitmap.clone());
        assert_eq!(model.glyph(0).unwrap().bitmap, Some(bitmap));
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(FontKind::from_extension("c"), Some(FontKind::Source));
        assert_eq!(FontKind::from_extension("H"), Some(FontKind::Source));
        assert_eq!(FontKind::from_extension("BIN"), Some(FontKind::Binary));
        assert_eq!(FontKind::from_extension("ttf"), None);
    }

    #[test]
    fn subpixel_and_compression_codes() {
        assert_eq!(SubpixelMode::from_code(1), SubpixelMode::Horizontal);
        assert_eq!(SubpixelMode::from_code(9), SubpixelMode::None);
        assert_eq!(
            SubpixelMode::from_tag("LV_FONT_SUBPX_VER"),
            Some(SubpixelMode::Vertical)
        );
        assert_eq!(SubpixelMode::from_tag("LV_FONT_SUBPX_DIAG"), None);
        assert_eq!(Compression::from_code(0), Compression::None);
        assert_eq!(Compression::from_code(7), Compression::Unknown(7));
        assert!(Compression::Rle.is_compressed());
        assert_eq!(Compression::RleNoPrefilter.to_string(), "RLE_NO_PREFILTER");
    }
}
