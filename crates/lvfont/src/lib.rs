//! lvfont: Read LVGL bitmap fonts into a queryable glyph model.
//!
//! This is the public API facade crate for lvfont-rs. It re-exports types from
//! lvfont-core and uses lvfont-parse to decode font artifacts.
//!
//! # Architecture
//!
//! - **lvfont-core**: Font model, bitmap codec and cmap resolver
//! - **lvfont-parse**: Binary container and C source decoders
//! - **lvfont** (this crate): Public API that ties everything together
//!
//! # Example
//!
//! ```no_run
//! use lvfont::Font;
//!
//! let font = Font::open_file("font_16.c", None)?;
//! if let Some(glyph) = font.get_char('A') {
//!     println!("A is {}x{} px", glyph.box_w, glyph.box_h);
//! }
//! # Ok::<(), lvfont::FontError>(())
//! ```

mod font;

pub use font::Font;
pub use lvfont_core;
pub use lvfont_core::{
    Bpp, CmapEncoding, CmapKind, CmapRange, Compression, DecodeOptions, DecodeResult,
    DecodeWarning, DecodeWarningCode, FontError, FontKind, FontMetadata, FontModel, Glyph,
    GlyphBitmap, HeadTable, KernPair, LocaFormat, SubpixelMode,
};
pub use lvfont_parse;
