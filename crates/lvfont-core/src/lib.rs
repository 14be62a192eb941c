//! lvfont-core: Format-independent font model and algorithms.
//!
//! This crate provides the decoded font model ([`FontModel`], [`Glyph`],
//! [`CmapRange`], [`KernPair`]), the packed bitmap codec and the cmap
//! resolver shared by both artifact decoders in lvfont-parse.

pub mod bitmap;
pub mod cmap;
pub mod error;
pub mod font;

pub use bitmap::{Bpp, GlyphBitmap, calc_bytes, pack, unpack, unpack_raw};
pub use cmap::{CmapEncoding, CmapKind, CmapRange, CmapResolution, resolve_ranges};
pub use error::{
    DecodeOptions, DecodeResult, DecodeWarning, DecodeWarningCode, FontError, LocaFormat,
};
pub use font::{
    Compression, FontKind, FontMetadata, FontModel, Glyph, HeadTable, KernPair, SubpixelMode,
};
