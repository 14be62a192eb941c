//! Decoder for the binary chunk-container font format.
//!
//! The container holds `head`, `cmap`, `loca` and `glyf` chunks (see
//! [`crate::chunk`] for the framing). The `cmap`, `loca` and `glyf`
//! payloads repeat their own size and tag in an 8-byte inner header before
//! the table data; `cmap` subtable offsets and `loca` glyph offsets count
//! from the start of the payload and the end of that inner header
//! respectively.
//!
//! Decoding never fails: missing or damaged tables leave defaults in the
//! model and are reported as [`DecodeWarning`]s.

use lvfont_core::{
    Bpp, CmapEncoding, CmapRange, Compression, DecodeOptions, DecodeResult, DecodeWarning,
    DecodeWarningCode, FontKind, FontModel, Glyph, HeadTable, LocaFormat, SubpixelMode, unpack,
};

use crate::chunk::read_chunks;
use crate::error::BackendError;
use crate::log::{debug, warn};
use crate::reader::Reader;

/// Tags this decoder understands. Anything else is skipped.
#[cfg(feature = "tracing")]
const KNOWN_TAGS: [&str; 4] = ["head", "cmap", "loca", "glyf"];

/// Redundant size + tag at the start of the cmap, loca and glyf payloads.
const INNER_HEADER_LEN: usize = 8;

/// Size of one cmap subtable descriptor.
const CMAP_SUBTABLE_LEN: usize = 16;

/// adv_w u16, box_w u8, box_h u8, ofs_x i8, ofs_y i8.
const GLYPH_DESCRIPTOR_LEN: usize = 6;

/// Width of one `loca` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetWidth {
    U16,
    U32,
}

impl OffsetWidth {
    fn resolve(format: LocaFormat, head: Option<&HeadTable>) -> Self {
        match (format, head) {
            (LocaFormat::FromHead, Some(head)) if head.index_to_loc_format == 0 => OffsetWidth::U16,
            _ => OffsetWidth::U32,
        }
    }

    fn read(self, reader: &mut Reader<'_>) -> Result<u32, BackendError> {
        match self {
            OffsetWidth::U16 => reader.u16().map(u32::from),
            OffsetWidth::U32 => reader.u32(),
        }
    }

    fn len(self) -> usize {
        match self {
            OffsetWidth::U16 => 2,
            OffsetWidth::U32 => 4,
        }
    }
}

/// Decode a binary font container.
///
/// Glyphs are stored by glyph id for every id the `loca` table describes,
/// and their code points are filled in from the `cmap` subtables. The
/// returned model's unicode index is not built yet; call
/// [`FontModel::build_index`] before querying by code point.
///
/// Only `options.loca_format` affects decoding. The warning policy
/// (`strict_mode`, `collect_warnings`) is applied by the caller through
/// [`DecodeResult::apply_options`].
pub fn decode_binary(data: &[u8], options: &DecodeOptions) -> DecodeResult<FontModel> {
    let mut model = FontModel::with_kind(FontKind::Binary);
    let mut warnings = Vec::new();

    let chunks = read_chunks(data);
    if let Some(err) = &chunks.stopped {
        warn!(error = %err, "chunk stream ends early");
        warnings.push(
            DecodeWarning::with_code(
                DecodeWarningCode::OutOfBounds,
                format!("chunk stream ends early: {err}"),
            )
            .on("container"),
        );
    }
    #[cfg(feature = "tracing")]
    for chunk in &chunks.chunks {
        if KNOWN_TAGS.contains(&chunk.tag.as_str()) {
            debug!(tag = %chunk.tag, offset = chunk.offset, len = chunk.payload.len(), "chunk");
        } else {
            debug!(tag = %chunk.tag, offset = chunk.offset, "ignoring unknown chunk");
        }
    }

    let head = match chunks.find("head") {
        Some(chunk) => match parse_head(chunk.payload) {
            Ok(head) => Some(head),
            Err(e) => {
                warnings.push(
                    DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                        .on("head"),
                );
                None
            }
        },
        None => {
            warnings.push(missing_table("head"));
            None
        }
    };
    let bpp = match &head {
        Some(head) => apply_head(&mut model, head, &mut warnings),
        None => None,
    };

    match chunks.find("cmap") {
        Some(chunk) => {
            for range in parse_cmap(chunk.payload, &mut warnings) {
                model.push_cmap_range(range);
            }
        }
        None => warnings.push(missing_table("cmap")),
    }

    match (chunks.find("loca"), chunks.find("glyf")) {
        (Some(loca), Some(glyf)) => {
            let width = OffsetWidth::resolve(options.loca_format, head.as_ref());
            match parse_loca(loca.payload, width) {
                Ok(positions) => {
                    let glyphs = decode_glyphs(&positions, glyf.payload, bpp, &mut warnings);
                    *model.glyphs_mut() = glyphs;
                    model.set_glyph_bitmap(glyf.payload.to_vec());
                }
                Err(e) => warnings.push(
                    DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                        .on("loca"),
                ),
            }
        }
        (loca, glyf) => {
            if loca.is_none() {
                warnings.push(missing_table("loca"));
            }
            if glyf.is_none() {
                warnings.push(missing_table("glyf"));
            }
        }
    }

    let dropped = model.assign_unicodes();
    if dropped > 0 {
        warnings.push(
            DecodeWarning::with_code(
                DecodeWarningCode::GlyphIdOutOfRange,
                format!(
                    "{dropped} character mappings point past the last glyph ({} glyphs)",
                    model.glyph_count()
                ),
            )
            .on("cmap"),
        );
    }

    debug!(
        glyphs = model.glyph_count(),
        ranges = model.cmap_ranges().len(),
        warnings = warnings.len(),
        "decoded binary font"
    );
    DecodeResult::with_warnings(model, warnings)
}

fn missing_table(tag: &str) -> DecodeWarning {
    DecodeWarning::with_code(
        DecodeWarningCode::MissingTable,
        format!("no '{tag}' chunk in container"),
    )
    .on(tag)
}

/// Read the 40-byte `head` payload.
pub fn parse_head(payload: &[u8]) -> Result<HeadTable, BackendError> {
    let mut r = Reader::new(payload);
    Ok(HeadTable {
        version: r.u32()?,
        table_count: r.u16()?,
        font_size: r.u16()?,
        ascent: r.u16()?,
        descent: r.i16()?,
        typo_ascent: r.u16()?,
        typo_descent: r.i16()?,
        typo_line_gap: r.u16()?,
        min_y: r.i16()?,
        max_y: r.i16()?,
        default_advance_width: r.u16()?,
        kerning_scale: r.u16()?,
        index_to_loc_format: r.u8()?,
        glyph_id_format: r.u8()?,
        advance_width_format: r.u8()?,
        bits_per_pixel: r.u8()?,
        xy_bits: r.u8()?,
        wh_bits: r.u8()?,
        advance_width_bits: r.u8()?,
        compression_id: r.u8()?,
        subpixel_mode: r.u8()?,
        reserved: r.u8()?,
        underline_position: r.i16()?,
        underline_thickness: r.u16()?,
    })
}

/// Copy header fields into the model metadata; returns the usable bit depth.
fn apply_head(
    model: &mut FontModel,
    head: &HeadTable,
    warnings: &mut Vec<DecodeWarning>,
) -> Option<Bpp> {
    let meta = &mut model.metadata;
    meta.font_size = head.font_size.into();
    meta.line_height = head.line_height();
    meta.base_line = head.base_line();
    meta.bpp = head.bits_per_pixel;
    meta.subpixel = SubpixelMode::from_code(head.subpixel_mode);
    meta.compression = Compression::from_code(head.compression_id);
    meta.underline_position = head.underline_position;
    meta.underline_thickness = head.underline_thickness;
    meta.kern_scale = head.kerning_scale;
    meta.head = Some(head.clone());

    if meta.compression.is_compressed() {
        warnings.push(
            DecodeWarning::with_code(
                DecodeWarningCode::CompressedBitmap,
                format!(
                    "bitmaps use {} compression; samples are read as stored",
                    meta.compression
                ),
            )
            .on("head"),
        );
    }

    match Bpp::try_from(head.bits_per_pixel) {
        Ok(bpp) => Some(bpp),
        Err(e) => {
            warnings.push(
                DecodeWarning::with_code(DecodeWarningCode::UnsupportedBpp, e.to_string())
                    .on("head"),
            );
            None
        }
    }
}

/// Subtable descriptor as stored in the `cmap` payload.
#[derive(Debug, Clone, Copy)]
struct Subtable {
    data_offset: u32,
    range_start: u32,
    range_length: u16,
    glyph_id_offset: u16,
    total: u16,
    kind: u8,
}

impl Subtable {
    fn read(reader: &mut Reader<'_>) -> Result<Self, BackendError> {
        let subtable = Subtable {
            data_offset: reader.u32()?,
            range_start: reader.u32()?,
            range_length: reader.u16()?,
            glyph_id_offset: reader.u16()?,
            total: reader.u16()?,
            kind: reader.u8()?,
        };
        reader.skip(1)?;
        Ok(subtable)
    }

    fn encoding(&self, payload: &[u8]) -> Result<CmapEncoding, BackendError> {
        let mut data = Reader::at(payload, self.data_offset as usize);
        let total = usize::from(self.total);
        match self.kind {
            0 => {
                let deltas = data.bytes(usize::from(self.range_length))?;
                Ok(CmapEncoding::Full {
                    glyph_offsets: deltas.iter().map(|&d| u32::from(d)).collect(),
                })
            }
            1 => {
                let unicode_offsets = read_u16_list(&mut data, total)?;
                let glyph_offsets = read_u16_list(&mut data, total)?;
                Ok(CmapEncoding::SparseFull {
                    unicode_offsets,
                    glyph_offsets,
                })
            }
            2 => Ok(CmapEncoding::Tiny),
            3 => Ok(CmapEncoding::SparseTiny {
                unicode_offsets: read_u16_list(&mut data, total)?,
            }),
            other => Err(BackendError::Parse(format!(
                "unknown cmap subtable type {other}"
            ))),
        }
    }
}

fn read_u16_list(reader: &mut Reader<'_>, count: usize) -> Result<Vec<u32>, BackendError> {
    // Check the whole span first so a bogus count cannot drive allocation.
    let raw = reader.bytes(count * 2)?;
    Ok(raw
        .chunks_exact(2)
        .map(|pair| u32::from(u16::from_le_bytes([pair[0], pair[1]])))
        .collect())
}

/// Read the `cmap` payload into ranges, skipping subtables that do not fit.
fn parse_cmap(payload: &[u8], warnings: &mut Vec<DecodeWarning>) -> Vec<CmapRange> {
    let mut reader = Reader::new(payload);
    let count = match reader
        .skip(INNER_HEADER_LEN)
        .and_then(|()| reader.u32())
    {
        Ok(count) => count,
        Err(e) => {
            warnings.push(
                DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                    .on("cmap"),
            );
            return Vec::new();
        }
    };

    let mut ranges = Vec::new();
    for index in 0..count {
        if reader.remaining() < CMAP_SUBTABLE_LEN {
            warnings.push(
                DecodeWarning::with_code(
                    DecodeWarningCode::OutOfBounds,
                    format!("cmap declares {count} subtables but only {index} fit"),
                )
                .on("cmap"),
            );
            break;
        }
        let subtable = match Subtable::read(&mut reader) {
            Ok(subtable) => subtable,
            Err(e) => {
                warnings.push(
                    DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                        .on(format!("cmap subtable {index}")),
                );
                break;
            }
        };
        match subtable.encoding(payload) {
            Ok(encoding) => ranges.push(CmapRange {
                range_start: subtable.range_start,
                range_length: subtable.range_length.into(),
                glyph_id_start: subtable.glyph_id_offset.into(),
                list_length: subtable.total.into(),
                encoding,
            }),
            Err(e) => {
                let code = match e {
                    BackendError::Parse(_) => DecodeWarningCode::MalformedTable,
                    _ => DecodeWarningCode::OutOfBounds,
                };
                warnings.push(
                    DecodeWarning::with_code(code, e.to_string())
                        .on(format!("cmap subtable {index}")),
                );
            }
        }
    }
    ranges
}

/// Read glyph offsets from the `loca` payload.
///
/// Up to `glyph_count + 1` offsets are read; a table cut short keeps the
/// offsets that fit.
fn parse_loca(payload: &[u8], width: OffsetWidth) -> Result<Vec<u32>, BackendError> {
    let mut reader = Reader::new(payload);
    reader.skip(INNER_HEADER_LEN)?;
    let count = reader.u32()? as usize;
    let wanted = count.saturating_add(1).min(reader.remaining() / width.len());
    let mut positions = Vec::with_capacity(wanted);
    for _ in 0..wanted {
        positions.push(width.read(&mut reader)?);
    }
    Ok(positions)
}

/// Decode one glyph per consecutive pair of `loca` positions.
fn decode_glyphs(
    positions: &[u32],
    glyf: &[u8],
    bpp: Option<Bpp>,
    warnings: &mut Vec<DecodeWarning>,
) -> Vec<Glyph> {
    positions
        .windows(2)
        .enumerate()
        .map(|(id, span)| {
            let (start, end) = (span[0] as usize, span[1] as usize);
            match decode_glyph(glyf, start, end) {
                Ok((mut glyph, pixels)) => {
                    if let Some(bpp) = bpp {
                        attach_bitmap(&mut glyph, pixels, bpp, id, warnings);
                    }
                    glyph
                }
                Err(e) => {
                    warnings.push(
                        DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                            .on(format!("glyph {id}")),
                    );
                    Glyph::default()
                }
            }
        })
        .collect()
}

/// Read the descriptor for the glyph at `start..end` and return it with its pixel bytes.
fn decode_glyph(glyf: &[u8], start: usize, end: usize) -> Result<(Glyph, &[u8]), BackendError> {
    let base = INNER_HEADER_LEN + start;
    let len = end.checked_sub(start).ok_or_else(|| {
        BackendError::Parse(format!("glyph data ends at {end} before it starts at {start}"))
    })?;
    if len == 0 {
        let glyph = Glyph {
            bitmap_index: base,
            ..Glyph::default()
        };
        return Ok((glyph, &[]));
    }
    if len < GLYPH_DESCRIPTOR_LEN {
        return Err(BackendError::Truncated {
            offset: base,
            needed: GLYPH_DESCRIPTOR_LEN,
            available: len,
        });
    }

    let mut r = Reader::at(glyf, base);
    let adv_w = r.u16()?;
    let box_w = r.u8()?;
    let box_h = r.u8()?;
    let ofs_x = r.i8()?;
    let ofs_y = r.i8()?;
    let pixels = r.bytes(len - GLYPH_DESCRIPTOR_LEN)?;

    let glyph = Glyph {
        unicode: 0,
        bitmap_index: base + GLYPH_DESCRIPTOR_LEN,
        adv_w: adv_w.into(),
        box_w: box_w.into(),
        box_h: box_h.into(),
        ofs_x: ofs_x.into(),
        ofs_y: ofs_y.into(),
        bitmap: None,
    };
    Ok((glyph, pixels))
}

/// Unpack the pixel grid; a short buffer keeps the metrics and drops the grid.
fn attach_bitmap(
    glyph: &mut Glyph,
    pixels: &[u8],
    bpp: Bpp,
    id: usize,
    warnings: &mut Vec<DecodeWarning>,
) {
    if glyph.is_empty() {
        return;
    }
    match unpack(pixels, glyph.box_w.into(), glyph.box_h.into(), bpp) {
        Ok(bitmap) => glyph.bitmap = Some(bitmap),
        Err(e) => warnings.push(
            DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, e.to_string())
                .on(format!("glyph {id}")),
        ),
    }
}
