//! Character map ranges and their resolution to glyph ids.
//!
//! A font declares one or more [`CmapRange`]s, each in one of four
//! encodings. [`CmapRange::pairs`] expands a single range into
//! `(unicode, glyph_id)` pairs and [`resolve_ranges`] applies a whole
//! table against a glyph count, dropping ids the font does not have.

use std::fmt;

/// Encoding of a cmap range, carrying the explicit offset arrays it needs.
///
/// An array the artifact does not provide is stored empty, which limits
/// resolution of that range to zero pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmapEncoding {
    /// Contiguous code points map to contiguous glyph ids.
    Tiny,
    /// Contiguous code points, glyph id offsets listed per code point.
    Full {
        /// Offset added to `glyph_id_start` for code point `range_start + i`.
        glyph_offsets: Vec<u32>,
    },
    /// Listed code point offsets map to contiguous glyph ids.
    SparseTiny {
        /// Offset added to `range_start` for the i-th mapped code point.
        unicode_offsets: Vec<u32>,
    },
    /// Both code point offsets and glyph id offsets are listed.
    SparseFull {
        /// Offset added to `range_start` for the i-th mapped code point.
        unicode_offsets: Vec<u32>,
        /// Offset added to `glyph_id_start` for the i-th mapped code point.
        glyph_offsets: Vec<u32>,
    },
}

/// Tag identifying a [`CmapEncoding`] without its arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmapKind {
    /// See [`CmapEncoding::Tiny`].
    Tiny,
    /// See [`CmapEncoding::Full`].
    Full,
    /// See [`CmapEncoding::SparseTiny`].
    SparseTiny,
    /// See [`CmapEncoding::SparseFull`].
    SparseFull,
}

impl CmapKind {
    /// Name used by the font converter for this encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            CmapKind::Tiny => "FORMAT0_TINY",
            CmapKind::Full => "FORMAT0_FULL",
            CmapKind::SparseTiny => "SPARSE_TINY",
            CmapKind::SparseFull => "SPARSE_FULL",
        }
    }

    /// Parse a converter tag, with or without the `LV_FONT_FMT_TXT_CMAP_` prefix.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.strip_prefix("LV_FONT_FMT_TXT_CMAP_").unwrap_or(tag);
        match tag {
            "FORMAT0_TINY" => Some(CmapKind::Tiny),
            "FORMAT0_FULL" => Some(CmapKind::Full),
            "SPARSE_TINY" => Some(CmapKind::SparseTiny),
            "SPARSE_FULL" => Some(CmapKind::SparseFull),
            _ => None,
        }
    }
}

impl fmt::Display for CmapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared interval of code points mapped to glyph ids.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmapRange {
    /// First code point of the interval.
    pub range_start: u32,
    /// Number of code points the interval spans.
    pub range_length: u32,
    /// Glyph id the encoding offsets are relative to.
    pub glyph_id_start: u32,
    /// Length of the explicit lists as declared by the artifact.
    pub list_length: u32,
    /// Encoding and its offset arrays.
    pub encoding: CmapEncoding,
}

impl CmapRange {
    /// A range of contiguous code points and contiguous glyph ids.
    pub fn tiny(range_start: u32, range_length: u32, glyph_id_start: u32) -> Self {
        Self {
            range_start,
            range_length,
            glyph_id_start,
            list_length: 0,
            encoding: CmapEncoding::Tiny,
        }
    }

    /// Encoding tag of this range.
    pub fn kind(&self) -> CmapKind {
        match self.encoding {
            CmapEncoding::Tiny => CmapKind::Tiny,
            CmapEncoding::Full { .. } => CmapKind::Full,
            CmapEncoding::SparseTiny { .. } => CmapKind::SparseTiny,
            CmapEncoding::SparseFull { .. } => CmapKind::SparseFull,
        }
    }

    /// Inclusive `(first, last)` code points covered by the interval.
    ///
    /// Returns `None` for an empty range.
    pub fn coverage(&self) -> Option<(u32, u32)> {
        if self.range_length == 0 {
            return None;
        }
        let last = self.range_start.saturating_add(self.range_length - 1);
        Some((self.range_start, last))
    }

    /// Number of pairs this range resolves to, after clipping to its arrays.
    pub fn resolved_len(&self) -> usize {
        let declared = self.range_length as usize;
        match &self.encoding {
            CmapEncoding::Tiny => declared,
            CmapEncoding::Full { glyph_offsets } => declared.min(glyph_offsets.len()),
            CmapEncoding::SparseTiny { unicode_offsets } => declared.min(unicode_offsets.len()),
            CmapEncoding::SparseFull {
                unicode_offsets,
                glyph_offsets,
            } => declared
                .min(unicode_offsets.len())
                .min(glyph_offsets.len()),
        }
    }

    /// Expand this range into `(unicode, glyph_id)` pairs in declaration order.
    ///
    /// Glyph ids are not checked against any glyph count; pairs whose code
    /// point or glyph id would overflow `u32` are skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.resolved_len()).filter_map(move |i| {
            let (unicode_offset, glyph_offset) = match &self.encoding {
                CmapEncoding::Tiny => (i as u32, i as u32),
                CmapEncoding::Full { glyph_offsets } => (i as u32, glyph_offsets[i]),
                CmapEncoding::SparseTiny { unicode_offsets } => (unicode_offsets[i], i as u32),
                CmapEncoding::SparseFull {
                    unicode_offsets,
                    glyph_offsets,
                } => (unicode_offsets[i], glyph_offsets[i]),
            };
            let unicode = self.range_start.checked_add(unicode_offset)?;
            let glyph_id = self.glyph_id_start.checked_add(glyph_offset)?;
            Some((unicode, glyph_id))
        })
    }
}

/// Outcome of resolving a cmap table against a glyph count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmapResolution {
    /// Valid `(unicode, glyph_id)` pairs in range processing order.
    pub pairs: Vec<(u32, usize)>,
    /// Number of pairs dropped because the glyph id was out of range.
    pub dropped: usize,
}

/// Resolve all `ranges` in order, keeping pairs whose glyph id is below `glyph_count`.
///
/// Later pairs are kept after earlier ones, so consumers that insert them
/// into a map in order get last-write-wins semantics for repeated code points.
pub fn resolve_ranges(ranges: &[CmapRange], glyph_count: usize) -> CmapResolution {
    let mut resolution = CmapResolution::default();
    for range in ranges {
        for (unicode, glyph_id) in range.pairs() {
            let glyph_id = glyph_id as usize;
            if glyph_id < glyph_count {
                resolution.pairs.push((unicode, glyph_id));
            } else {
                resolution.dropped += 1;
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_maps_contiguous_ids() {
        let range = CmapRange::tiny(48, 10, 1);
        let pairs: Vec<_> = range.pairs().collect();
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[0], (48, 1));
        assert_eq!(pairs[9], (57, 10));
    }

    #[test]
    fn full_uses_glyph_offsets() {
        let range = CmapRange {
            range_start: 0x20,
            range_length: 3,
            glyph_id_start: 5,
            list_length: 3,
            encoding: CmapEncoding::Full {
                glyph_offsets: vec![0, 2, 1],
            },
        };
        let pairs: Vec<_> = range.pairs().collect();
        assert_eq!(pairs, vec![(0x20, 5), (0x21, 7), (0x22, 6)]);
    }

    #[test]
    fn sparse_tiny_uses_unicode_offsets() {
        let range = CmapRange {
            range_start: 0x100,
            range_length: 50,
            glyph_id_start: 10,
            list_length: 3,
            encoding: CmapEncoding::SparseTiny {
                unicode_offsets: vec![0, 7, 49],
            },
        };
        let pairs: Vec<_> = range.pairs().collect();
        assert_eq!(pairs, vec![(0x100, 10), (0x107, 11), (0x131, 12)]);
    }

    #[test]
    fn sparse_full_uses_both_arrays() {
        let range = CmapRange {
            range_start: 0x41,
            range_length: 11,
            glyph_id_start: 100,
            list_length: 3,
            encoding: CmapEncoding::SparseFull {
                unicode_offsets: vec![0, 5, 10],
                glyph_offsets: vec![2, 3, 4],
            },
        };
        let pairs: Vec<_> = range.pairs().collect();
        assert_eq!(pairs, vec![(0x41, 102), (0x46, 103), (0x4B, 104)]);
    }

    #[test]
    fn short_arrays_truncate_resolution() {
        let range = CmapRange {
            range_start: 0,
            range_length: 10,
            glyph_id_start: 0,
            list_length: 10,
            encoding: CmapEncoding::SparseFull {
                unicode_offsets: vec![1, 2, 3, 4],
                glyph_offsets: vec![1, 2],
            },
        };
        assert_eq!(range.resolved_len(), 2);
        assert_eq!(range.pairs().count(), 2);
    }

    #[test]
    fn missing_array_resolves_nothing() {
        let range = CmapRange {
            range_start: 0x30,
            range_length: 5,
            glyph_id_start: 1,
            list_length: 0,
            encoding: CmapEncoding::Full {
                glyph_offsets: Vec::new(),
            },
        };
        assert_eq!(range.pairs().count(), 0);
    }

    #[test]
    fn overflowing_pairs_are_skipped() {
        let range = CmapRange::tiny(u32::MAX, 2, 0);
        let pairs: Vec<_> = range.pairs().collect();
        assert_eq!(pairs, vec![(u32::MAX, 0)]);
    }

    #[test]
    fn resolve_drops_out_of_range_ids() {
        let ranges = vec![CmapRange::tiny(0x41, 4, 1)];
        let resolution = resolve_ranges(&ranges, 3);
        assert_eq!(resolution.pairs, vec![(0x41, 1), (0x42, 2)]);
        assert_eq!(resolution.dropped, 2);
    }

    #[test]
    fn resolve_keeps_range_order() {
        let ranges = vec![CmapRange::tiny(0x41, 2, 1), CmapRange::tiny(0x41, 1, 5)];
        let resolution = resolve_ranges(&ranges, 10);
        assert_eq!(resolution.pairs, vec![(0x41, 1), (0x42, 2), (0x41, 5)]);
    }

    #[test]
    fn coverage_is_inclusive() {
        assert_eq!(CmapRange::tiny(32, 95, 1).coverage(), Some((32, 126)));
        assert_eq!(CmapRange::tiny(32, 0, 1).coverage(), None);
    }

    #[test]
    fn kind_tags() {
        assert_eq!(CmapRange::tiny(0, 1, 0).kind(), CmapKind::Tiny);
        assert_eq!(
            CmapKind::from_tag("LV_FONT_FMT_TXT_CMAP_SPARSE_TINY"),
            Some(CmapKind::SparseTiny)
        );
        assert_eq!(CmapKind::from_tag("FORMAT0_FULL"), Some(CmapKind::Full));
        assert_eq!(CmapKind::from_tag("LV_FONT_FMT_TXT_CMAP_BOGUS"), None);
        assert_eq!(CmapKind::SparseFull.to_string(), "SPARSE_FULL");
    }
}
