//! Decoder for generated C font sources.
//!
//! The source is matched structurally: [`tokenize`] removes comments and
//! preprocessor lines, [`scan_declarations`] collects the initialized
//! tables, and this module maps them onto a [`FontModel`]. Nothing is
//! evaluated. Tables are located in this order of preference:
//!
//! 1. the name referenced from the `lv_font_fmt_txt_dsc_t` descriptor
//!    (`.glyph_bitmap`, `.glyph_dsc`, `.cmaps`, `.kern_dsc`),
//! 2. the declared type (`lv_font_fmt_txt_glyph_dsc_t`, ...),
//! 3. the name the generator conventionally uses.

use std::sync::LazyLock;

use lvfont_core::{
    Bpp, CmapEncoding, CmapKind, CmapRange, Compression, DecodeOptions, DecodeResult,
    DecodeWarning, DecodeWarningCode, FontKind, FontModel, Glyph, KernPair, SubpixelMode,
    calc_bytes, unpack,
};
use regex::Regex;

use crate::declaration::{Declaration, Scan, Value, scan_declarations};
use crate::lexer::{Comment, tokenize};
use crate::log::debug;

static SIZE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bSize:\s*(\d+)\s*px").expect("valid regex")
});

static BPP_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bBpp:\s*(\d+)").expect("valid regex"));

const FONT_DSC_TYPE: &str = "lv_font_fmt_txt_dsc_t";
const FONT_TYPE: &str = "lv_font_t";
const GLYPH_DSC_TYPE: &str = "lv_font_fmt_txt_glyph_dsc_t";
const CMAP_TYPE: &str = "lv_font_fmt_txt_cmap_t";
const KERN_PAIR_TYPE: &str = "lv_font_fmt_txt_kern_pair_t";
const KERN_CLASSES_TYPE: &str = "lv_font_fmt_txt_kern_classes_t";

/// Positional order of glyph descriptor fields.
const GLYPH_FIELDS: [&str; 6] = ["bitmap_index", "adv_w", "box_w", "box_h", "ofs_x", "ofs_y"];

/// Positional order of cmap descriptor fields.
const CMAP_FIELDS: [&str; 7] = [
    "range_start",
    "range_length",
    "glyph_id_start",
    "unicode_list",
    "glyph_id_ofs_list",
    "list_length",
    "type",
];

/// Decode a generated C font source.
///
/// Glyphs keep their descriptor order, so a glyph's index is its glyph id.
/// Code points are written onto glyphs from the cmap ranges; the returned
/// model's unicode index is not built yet.
///
/// The options are accepted for symmetry with [`crate::decode_binary`];
/// none of them change how source text is read.
pub fn decode_source(text: &str, _options: &DecodeOptions) -> DecodeResult<FontModel> {
    let lexed = tokenize(text);
    let scan = scan_declarations(&lexed.tokens);
    #[cfg(feature = "tracing")]
    for skipped in &scan.skipped {
        debug!(name = %skipped.name, line = skipped.line, reason = %skipped.reason, "skipped declaration");
    }

    let mut decoder = SourceDecoder {
        scan: &scan,
        model: FontModel::with_kind(FontKind::Source),
        warnings: Vec::new(),
    };
    decoder.run(&lexed.comments);

    debug!(
        glyphs = decoder.model.glyph_count(),
        ranges = decoder.model.cmap_ranges().len(),
        warnings = decoder.warnings.len(),
        "decoded source font"
    );
    DecodeResult::with_warnings(decoder.model, decoder.warnings)
}

struct SourceDecoder<'a> {
    scan: &'a Scan,
    model: FontModel,
    warnings: Vec<DecodeWarning>,
}

impl<'a> SourceDecoder<'a> {
    fn run(&mut self, comments: &[Comment]) {
        let scan = self.scan;
        let font_dsc = scan.by_type(FONT_DSC_TYPE);
        if font_dsc.is_none() {
            self.warn(
                DecodeWarningCode::MissingTable,
                format!("no {FONT_DSC_TYPE} descriptor"),
                FONT_DSC_TYPE,
            );
        }
        let dsc_value = font_dsc.map(|d| &d.value);

        self.read_labels(comments);
        self.read_font_header();
        let bpp = self.read_descriptor(dsc_value);

        let bitmap = self.read_bitmap(dsc_value);
        self.read_glyphs(dsc_value);
        self.read_cmaps(dsc_value);
        self.read_kerning(dsc_value);

        let dropped = self.model.assign_unicodes();
        if dropped > 0 {
            let count = self.model.glyph_count();
            self.warn(
                DecodeWarningCode::GlyphIdOutOfRange,
                format!("{dropped} character mappings point past the last glyph ({count} glyphs)"),
                "cmaps",
            );
        }

        if let (Some(bpp), Some(bitmap)) = (bpp, bitmap.as_deref()) {
            self.attach_bitmaps(bitmap, bpp);
        }
        if let Some(bitmap) = bitmap {
            self.model.set_glyph_bitmap(bitmap);
        }
    }

    fn warn(&mut self, code: DecodeWarningCode, description: String, element: impl Into<String>) {
        self.warnings
            .push(DecodeWarning::with_code(code, description).on(element));
    }

    /// Locate a table: descriptor reference, then type, then conventional name.
    fn find_table(
        &self,
        dsc: Option<&Value>,
        field: &str,
        type_name: Option<&str>,
        conventional: &str,
    ) -> Option<&'a Declaration> {
        let scan = self.scan;
        if let Some(name) = dsc.and_then(|v| v.field(field)).and_then(Value::reference) {
            if let Some(decl) = scan.by_name(name) {
                return Some(decl);
            }
        }
        type_name
            .and_then(|t| scan.by_type(t))
            .or_else(|| scan.by_name(conventional))
    }

    /// `Size: N px` and `Bpp: N` from the generator's header comment.
    fn read_labels(&mut self, comments: &[Comment]) {
        let meta = &mut self.model.metadata;
        for comment in comments {
            if let Some(size) = SIZE_LABEL
                .captures(&comment.text)
                .and_then(|c| c[1].parse::<u32>().ok())
            {
                if meta.font_size == 0 {
                    meta.font_size = size;
                }
            }
            if let Some(bpp) = BPP_LABEL
                .captures(&comment.text)
                .and_then(|c| c[1].parse::<u8>().ok())
            {
                if meta.bpp == 0 {
                    meta.bpp = bpp;
                }
            }
        }
    }

    /// Name and line metrics from the public `lv_font_t`.
    fn read_font_header(&mut self) {
        let scan = self.scan;
        let Some(font) = scan.by_type(FONT_TYPE) else {
            self.warn(
                DecodeWarningCode::MissingTable,
                format!("no {FONT_TYPE} declaration"),
                FONT_TYPE,
            );
            return;
        };
        let value = &font.value;
        self.model.metadata.name = font.name.clone();

        if let Some(v) = self.int_field::<i32>(value, "line_height", &font.name) {
            self.model.metadata.line_height = v;
        }
        if let Some(v) = self.int_field::<i32>(value, "base_line", &font.name) {
            self.model.metadata.base_line = v;
        }
        if let Some(v) = self.int_field::<i16>(value, "underline_position", &font.name) {
            self.model.metadata.underline_position = v;
        }
        if let Some(v) = self.int_field::<u16>(value, "underline_thickness", &font.name) {
            self.model.metadata.underline_thickness = v;
        }
        if let Some(tag) = value.field("subpx") {
            match tag.as_ident().and_then(SubpixelMode::from_tag) {
                Some(mode) => self.model.metadata.subpixel = mode,
                None => self.warn(
                    DecodeWarningCode::MalformedTable,
                    format!("unrecognised subpixel mode {tag:?}"),
                    font.name.clone(),
                ),
            }
        }
    }

    /// Scalars from the `lv_font_fmt_txt_dsc_t` descriptor; returns the usable bit depth.
    fn read_descriptor(&mut self, dsc: Option<&Value>) -> Option<Bpp> {
        if let Some(dsc) = dsc {
            if self.model.metadata.bpp == 0 {
                if let Some(v) = self.int_field::<u8>(dsc, "bpp", FONT_DSC_TYPE) {
                    self.model.metadata.bpp = v;
                }
            }
            if let Some(v) = self.int_field::<u16>(dsc, "kern_scale", FONT_DSC_TYPE) {
                self.model.metadata.kern_scale = v;
            }
            if let Some(v) = self.int_field::<u8>(dsc, "bitmap_format", FONT_DSC_TYPE) {
                self.model.metadata.compression = Compression::from_code(v);
            }
        }

        let compression = self.model.metadata.compression;
        if compression.is_compressed() {
            self.warn(
                DecodeWarningCode::CompressedBitmap,
                format!("bitmaps use {compression} compression; samples are read as stored"),
                FONT_DSC_TYPE,
            );
        }

        match self.model.metadata.bpp {
            0 => {
                self.warn(
                    DecodeWarningCode::MissingTable,
                    "bits per pixel not declared; bitmaps are not decoded".to_string(),
                    FONT_DSC_TYPE,
                );
                None
            }
            bpp => match Bpp::try_from(bpp) {
                Ok(bpp) => Some(bpp),
                Err(e) => {
                    self.warn(DecodeWarningCode::UnsupportedBpp, e.to_string(), FONT_DSC_TYPE);
                    None
                }
            },
        }
    }

    fn read_bitmap(&mut self, dsc: Option<&Value>) -> Option<Vec<u8>> {
        let Some(decl) = self.find_table(dsc, "glyph_bitmap", None, "glyph_bitmap") else {
            self.warn(
                DecodeWarningCode::MissingTable,
                "no glyph bitmap array".to_string(),
                "glyph_bitmap",
            );
            return None;
        };
        match int_list::<u8>(&decl.value) {
            Ok(bytes) => Some(bytes),
            Err(reason) => {
                self.warn(DecodeWarningCode::MalformedTable, reason, decl.name.clone());
                None
            }
        }
    }

    fn read_glyphs(&mut self, dsc: Option<&Value>) {
        let Some(decl) = self.find_table(dsc, "glyph_dsc", Some(GLYPH_DSC_TYPE), "glyph_dsc") else {
            self.warn(
                DecodeWarningCode::MissingTable,
                "no glyph descriptor array".to_string(),
                "glyph_dsc",
            );
            return;
        };
        let Some(entries) = decl.value.as_list() else {
            self.warn(
                DecodeWarningCode::MalformedTable,
                "glyph descriptors are not a list".to_string(),
                decl.name.clone(),
            );
            return;
        };

        let mut glyphs = Vec::with_capacity(entries.len());
        for (id, entry) in entries.iter().enumerate() {
            match glyph_from(&entry.value) {
                Ok(glyph) => glyphs.push(glyph),
                Err(reason) => {
                    self.warn(DecodeWarningCode::MalformedTable, reason, format!("glyph {id}"));
                    glyphs.push(Glyph::default());
                }
            }
        }
        *self.model.glyphs_mut() = glyphs;
    }

    fn read_cmaps(&mut self, dsc: Option<&Value>) {
        let Some(decl) = self.find_table(dsc, "cmaps", Some(CMAP_TYPE), "cmaps") else {
            self.warn(
                DecodeWarningCode::MissingTable,
                "no character map".to_string(),
                "cmaps",
            );
            return;
        };
        let Some(entries) = decl.value.as_list() else {
            self.warn(
                DecodeWarningCode::MalformedTable,
                "character map is not a list".to_string(),
                decl.name.clone(),
            );
            return;
        };
        for (index, entry) in entries.iter().enumerate() {
            let element = format!("cmap {index}");
            match self.cmap_range_from(&entry.value, &element) {
                Ok(range) => self.model.push_cmap_range(range),
                Err(reason) => self.warn(DecodeWarningCode::MalformedTable, reason, element),
            }
        }
    }

    fn cmap_range_from(&mut self, value: &Value, element: &str) -> Result<CmapRange, String> {
        let range_start = required::<u32>(value, &CMAP_FIELDS, 0)?;
        let range_length = required::<u32>(value, &CMAP_FIELDS, 1)?;
        let glyph_id_start = required::<u32>(value, &CMAP_FIELDS, 2)?;
        let unicode_list = value.member(CMAP_FIELDS[3], 3).and_then(Value::reference);
        let glyph_id_ofs_list = value.member(CMAP_FIELDS[4], 4).and_then(Value::reference);
        let list_length = optional::<u32>(value, &CMAP_FIELDS, 5)?.unwrap_or(0);

        let tag = value.member(CMAP_FIELDS[6], 6).and_then(Value::as_ident);
        let kind = match tag.and_then(CmapKind::from_tag) {
            Some(kind) => kind,
            None => {
                let inferred = match (unicode_list.is_some(), glyph_id_ofs_list.is_some()) {
                    (true, true) => CmapKind::SparseFull,
                    (true, false) => CmapKind::SparseTiny,
                    (false, true) => CmapKind::Full,
                    (false, false) => CmapKind::Tiny,
                };
                self.warn(
                    DecodeWarningCode::MalformedTable,
                    format!(
                        "unrecognised cmap type {}; treated as {inferred}",
                        tag.unwrap_or("(none)")
                    ),
                    element,
                );
                inferred
            }
        };

        let encoding = match kind {
            CmapKind::Tiny => CmapEncoding::Tiny,
            CmapKind::Full => CmapEncoding::Full {
                glyph_offsets: self.offset_list(glyph_id_ofs_list, "glyph_id_ofs_list", element),
            },
            CmapKind::SparseTiny => CmapEncoding::SparseTiny {
                unicode_offsets: self.offset_list(unicode_list, "unicode_list", element),
            },
            CmapKind::SparseFull => CmapEncoding::SparseFull {
                unicode_offsets: self.offset_list(unicode_list, "unicode_list", element),
                glyph_offsets: self.offset_list(glyph_id_ofs_list, "glyph_id_ofs_list", element),
            },
        };

        Ok(CmapRange {
            range_start,
            range_length,
            glyph_id_start,
            list_length,
            encoding,
        })
    }

    /// Integer array referenced by a cmap range; empty when absent or unusable.
    fn offset_list(&mut self, name: Option<&str>, field: &str, element: &str) -> Vec<u32> {
        let Some(name) = name else {
            self.warn(
                DecodeWarningCode::MissingTable,
                format!("{field} is NULL for an encoding that needs it"),
                element,
            );
            return Vec::new();
        };
        let scan = self.scan;
        let Some(decl) = scan.by_name(name) else {
            self.warn(
                DecodeWarningCode::MissingTable,
                format!("{field} refers to undeclared array '{name}'"),
                element,
            );
            return Vec::new();
        };
        match int_list::<u32>(&decl.value) {
            Ok(values) => values,
            Err(reason) => {
                self.warn(DecodeWarningCode::MalformedTable, reason, name);
                Vec::new()
            }
        }
    }

    fn read_kerning(&mut self, dsc: Option<&Value>) {
        let scan = self.scan;
        let classes = dsc
            .and_then(|v| v.field("kern_classes"))
            .and_then(Value::as_int)
            .is_some_and(|v| v != 0);
        if classes || scan.by_type(KERN_CLASSES_TYPE).is_some() {
            self.warn(
                DecodeWarningCode::Other("kern classes".to_string()),
                "class-based kerning is not decoded".to_string(),
                "kern_classes",
            );
            return;
        }

        let Some(decl) = self.find_table(dsc, "kern_dsc", Some(KERN_PAIR_TYPE), "kern_pairs") else {
            return;
        };
        let value = &decl.value;
        let ids = value
            .field("glyph_ids")
            .and_then(Value::reference)
            .and_then(|name| scan.by_name(name));
        let values = value
            .field("values")
            .and_then(Value::reference)
            .and_then(|name| scan.by_name(name));
        let (Some(ids), Some(values)) = (ids, values) else {
            self.warn(
                DecodeWarningCode::MissingTable,
                "kerning pair arrays not found".to_string(),
                decl.name.clone(),
            );
            return;
        };
        let (ids, values) = match (int_list::<u32>(&ids.value), int_list::<i32>(&values.value)) {
            (Ok(ids), Ok(values)) => (ids, values),
            (Err(reason), _) | (_, Err(reason)) => {
                self.warn(DecodeWarningCode::MalformedTable, reason, decl.name.clone());
                return;
            }
        };

        let available = (ids.len() / 2).min(values.len());
        let declared = match optional::<usize>(value, &["pair_cnt"], 0) {
            Ok(Some(count)) => count,
            _ => available,
        };
        if declared > available {
            self.warn(
                DecodeWarningCode::OutOfBounds,
                format!("{declared} kerning pairs declared, {available} present"),
                decl.name.clone(),
            );
        }
        for (i, pair) in ids.chunks_exact(2).take(declared.min(available)).enumerate() {
            self.model.push_kern_pair(KernPair {
                left: pair[0],
                right: pair[1],
                value: values[i],
            });
        }
    }

    /// Unpack each glyph's pixels from the shared byte array.
    fn attach_bitmaps(&mut self, bitmap: &[u8], bpp: Bpp) {
        let mut overruns = Vec::new();
        for (id, glyph) in self.model.glyphs_mut().iter_mut().enumerate() {
            if glyph.is_empty() {
                continue;
            }
            let len = calc_bytes(glyph.pixel_count(), bpp);
            let Some(data) = glyph
                .bitmap_index
                .checked_add(len)
                .and_then(|end| bitmap.get(glyph.bitmap_index..end))
            else {
                overruns.push((id, glyph.bitmap_index, len));
                continue;
            };
            match unpack(data, glyph.box_w.into(), glyph.box_h.into(), bpp) {
                Ok(grid) => glyph.bitmap = Some(grid),
                Err(_) => overruns.push((id, glyph.bitmap_index, len)),
            }
        }
        for (id, start, len) in overruns {
            self.warn(
                DecodeWarningCode::OutOfBounds,
                format!(
                    "bitmap bytes {start}..{} exceed the {}-byte bitmap array",
                    start + len,
                    bitmap.len()
                ),
                format!("glyph {id}"),
            );
        }
    }

    /// Designated integer field, converted to `T`; a value that does not fit warns.
    fn int_field<T: TryFrom<i64>>(&mut self, value: &Value, name: &str, element: &str) -> Option<T> {
        let raw = value.field(name)?;
        match raw.as_int().and_then(|v| T::try_from(v).ok()) {
            Some(v) => Some(v),
            None => {
                self.warn(
                    DecodeWarningCode::MalformedTable,
                    format!(".{name} has unusable value {raw:?}"),
                    element,
                );
                None
            }
        }
    }
}

fn glyph_from(value: &Value) -> Result<Glyph, String> {
    if value.as_list().is_none() {
        return Err("glyph descriptor is not a brace list".to_string());
    }
    Ok(Glyph {
        unicode: 0,
        bitmap_index: required(value, &GLYPH_FIELDS, 0)?,
        adv_w: required(value, &GLYPH_FIELDS, 1)?,
        box_w: required(value, &GLYPH_FIELDS, 2)?,
        box_h: required(value, &GLYPH_FIELDS, 3)?,
        ofs_x: required(value, &GLYPH_FIELDS, 4)?,
        ofs_y: required(value, &GLYPH_FIELDS, 5)?,
        bitmap: None,
    })
}

/// Member `fields[index]` (by name or position) as `T`, absent allowed.
fn optional<T: TryFrom<i64>>(
    value: &Value,
    fields: &[&str],
    index: usize,
) -> Result<Option<T>, String> {
    let name = fields[index];
    match value.member(name, index) {
        None => Ok(None),
        Some(raw) => raw
            .as_int()
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| format!(".{name} has unusable value {raw:?}")),
    }
}

/// Member `fields[index]` (by name or position) as `T`.
fn required<T: TryFrom<i64>>(value: &Value, fields: &[&str], index: usize) -> Result<T, String> {
    optional(value, fields, index)?.ok_or_else(|| format!(".{} is missing", fields[index]))
}

/// Flat integer array with every element converted to `T`.
fn int_list<T: TryFrom<i64>>(value: &Value) -> Result<Vec<T>, String> {
    let ints = value
        .ints()
        .map_err(|i| format!("element {i} is not an integer literal"))?;
    ints.into_iter()
        .enumerate()
        .map(|(i, v)| T::try_from(v).map_err(|_| format!("element {i} value {v} is out of range")))
        .collect()
}
