//! lvfont-parse: decoders for the two artifact shapes produced by `lv_font_conv`.
//!
//! [`decode_binary`] reads the chunked binary container and
//! [`decode_source`] reads the generated C source. Both return a
//! [`FontModel`](lvfont_core::FontModel) with non-fatal problems attached as
//! [`DecodeWarning`](lvfont_core::DecodeWarning)s. The crate depends on
//! lvfont-core for the model, bitmap codec and cmap resolver.

mod log;

pub mod binary;
pub mod chunk;
pub mod declaration;
pub mod error;
pub mod lexer;
pub mod reader;
pub mod source;

pub use binary::decode_binary;
pub use chunk::{Chunk, ChunkList, read_chunks};
pub use error::BackendError;
pub use lvfont_core;
pub use reader::Reader;
pub use source::decode_source;
