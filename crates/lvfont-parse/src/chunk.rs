//! Chunk container framing for the binary font format.
//!
//! A binary font is a flat sequence of chunks, each framed as
//! `[u32 total_size][4-byte tag][total_size - 8 bytes payload]`, little-endian.
//! Reading stops at the first chunk that does not fit in the buffer; the
//! chunks before it are kept.

use crate::error::BackendError;
use crate::reader::Reader;

/// Size of the `size` + `tag` framing in front of every payload.
pub const CHUNK_HEADER_LEN: usize = 8;

/// One framed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Tag with NUL padding trimmed (e.g., `"head"`).
    pub tag: String,
    /// Offset of the chunk's size field in the container.
    pub offset: usize,
    /// Payload after the 8-byte framing.
    pub payload: &'a [u8],
}

/// Chunks read from a container, plus the reason reading stopped early.
#[derive(Debug)]
pub struct ChunkList<'a> {
    /// Fully read chunks in file order.
    pub chunks: Vec<Chunk<'a>>,
    /// Set when trailing bytes could not be framed as a chunk.
    pub stopped: Option<BackendError>,
}

impl<'a> ChunkList<'a> {
    /// Last chunk carrying `tag`.
    pub fn find(&self, tag: &str) -> Option<&Chunk<'a>> {
        self.chunks.iter().rev().find(|c| c.tag == tag)
    }
}

/// Split `data` into chunks.
pub fn read_chunks(data: &[u8]) -> ChunkList<'_> {
    let mut reader = Reader::new(data);
    let mut chunks = Vec::new();
    let mut stopped = None;

    while !reader.is_empty() {
        match read_chunk(&mut reader) {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => {
                stopped = Some(e);
                break;
            }
        }
    }

    ChunkList { chunks, stopped }
}

fn read_chunk<'a>(reader: &mut Reader<'a>) -> Result<Chunk<'a>, BackendError> {
    let offset = reader.position();
    let size = reader.u32()? as usize;
    let tag = reader.tag()?;
    if size < CHUNK_HEADER_LEN {
        return Err(BackendError::Parse(format!(
            "chunk '{tag}' at offset {offset} declares size {size}, smaller than its header"
        )));
    }
    let payload = reader.bytes(size - CHUNK_HEADER_LEN)?;
    Ok(Chunk {
        tag,
        offset,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + CHUNK_HEADER_LEN) as u32).to_le_bytes().to_vec();
        out.extend_from_slice(tag);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn reads_consecutive_chunks() {
        let mut data = chunk(b"head", &[1, 2, 3]);
        data.extend(chunk(b"glyf", &[]));
        let list = read_chunks(&data);
        assert!(list.stopped.is_none());
        assert_eq!(list.chunks.len(), 2);
        assert_eq!(list.chunks[0].tag, "head");
        assert_eq!(list.chunks[0].payload, &[1, 2, 3]);
        assert_eq!(list.chunks[1].tag, "glyf");
        assert_eq!(list.chunks[1].offset, 11);
        assert!(list.chunks[1].payload.is_empty());
    }

    #[test]
    fn stops_at_overrunning_chunk() {
        let mut data = chunk(b"head", &[0; 4]);
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(b"cmap");
        data.extend_from_slice(&[0; 10]);
        let list = read_chunks(&data);
        assert_eq!(list.chunks.len(), 1);
        assert_eq!(list.chunks[0].tag, "head");
        assert!(matches!(list.stopped, Some(BackendError::Truncated { .. })));
    }

    #[test]
    fn stops_at_partial_size_field() {
        let mut data = chunk(b"head", &[]);
        data.extend_from_slice(&[0x10, 0x00]);
        let list = read_chunks(&data);
        assert_eq!(list.chunks.len(), 1);
        assert!(list.stopped.is_some());
    }

    #[test]
    fn rejects_size_smaller_than_header() {
        let mut data = 4u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"loca");
        let list = read_chunks(&data);
        assert!(list.chunks.is_empty());
        assert!(matches!(list.stopped, Some(BackendError::Parse(_))));
    }

    #[test]
    fn nul_padded_tags_are_trimmed() {
        let data = chunk(b"ab\0\0", &[7]);
        let list = read_chunks(&data);
        assert_eq!(list.chunks[0].tag, "ab");
        assert!(list.find("ab").is_some());
    }

    #[test]
    fn find_returns_last_duplicate() {
        let mut data = chunk(b"head", &[1]);
        data.extend(chunk(b"head", &[2]));
        let list = read_chunks(&data);
        assert_eq!(list.find("head").unwrap().payload, &[2]);
        assert!(list.find("kern").is_none());
    }

    #[test]
    fn empty_input_has_no_chunks() {
        let list = read_chunks(&[]);
        assert!(list.chunks.is_empty());
        assert!(list.stopped.is_none());
    }
}
