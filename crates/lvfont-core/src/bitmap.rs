//! Packed coverage bitmaps.
//!
//! Glyph pixels are stored as fixed-depth coverage samples packed
//! most-significant-bit first. A sample never straddles a byte boundary,
//! so each byte carries `8 / bpp` samples and a glyph's data ends in a
//! partially used byte whenever `width * height * bpp` is not a multiple of 8.

use crate::error::FontError;

/// Sample depth of a glyph bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bpp {
    /// 1 bit per pixel, 8 samples per byte.
    One,
    /// 2 bits per pixel, 4 samples per byte.
    Two,
    /// 4 bits per pixel, 2 samples per byte (high nibble first).
    Four,
    /// 8 bits per pixel, one sample per byte.
    Eight,
}

impl Bpp {
    /// Number of bits in one sample.
    pub fn bits(self) -> u8 {
        match self {
            Bpp::One => 1,
            Bpp::Two => 2,
            Bpp::Four => 4,
            Bpp::Eight => 8,
        }
    }

    /// Largest sample value at this depth (`2^bpp - 1`).
    pub fn max_sample(self) -> u8 {
        match self {
            Bpp::One => 0x01,
            Bpp::Two => 0x03,
            Bpp::Four => 0x0F,
            Bpp::Eight => 0xFF,
        }
    }

    /// Number of samples packed into one byte.
    pub fn samples_per_byte(self) -> usize {
        8 / self.bits() as usize
    }
}

impl TryFrom<u8> for Bpp {
    type Error = FontError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Bpp::One),
            2 => Ok(Bpp::Two),
            4 => Ok(Bpp::Four),
            8 => Ok(Bpp::Eight),
            other => Err(FontError::UnsupportedBpp(other)),
        }
    }
}

/// Bytes needed to store `pixel_count` samples at `bpp`.
pub fn calc_bytes(pixel_count: usize, bpp: Bpp) -> usize {
    (pixel_count * bpp.bits() as usize).div_ceil(8)
}

/// A decoded glyph bitmap: `height` rows of `width` coverage samples.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGlyphBitmap"))]
pub struct GlyphBitmap {
    width: usize,
    height: usize,
    bpp: Bpp,
    samples: Vec<u8>,
}

/// Unchecked wire form of [`GlyphBitmap`]; validated through `from_samples`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGlyphBitmap {
    width: usize,
    height: usize,
    bpp: Bpp,
    samples: Vec<u8>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGlyphBitmap> for GlyphBitmap {
    type Error = String;

    fn try_from(raw: RawGlyphBitmap) -> Result<Self, Self::Error> {
        let (width, height, bpp, len) = (raw.width, raw.height, raw.bpp, raw.samples.len());
        GlyphBitmap::from_samples(width, height, bpp, raw.samples).ok_or_else(|| {
            format!("{len} samples do not fill a {width}x{height} bitmap at {} bpp", bpp.bits())
        })
    }
}

impl GlyphBitmap {
    /// Build a bitmap from row-major samples.
    ///
    /// Returns `None` if `samples.len() != width * height` or a sample
    /// exceeds the maximum value for `bpp`.
    pub fn from_samples(width: usize, height: usize, bpp: Bpp, samples: Vec<u8>) -> Option<Self> {
        if width.checked_mul(height) != Some(samples.len())
            || samples.iter().any(|&s| s > bpp.max_sample())
        {
            return None;
        }
        Some(Self {
            width,
            height,
            bpp,
            samples,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample depth the bitmap was decoded at.
    pub fn bpp(&self) -> Bpp {
        self.bpp
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Sample at (`x`, `y`) scaled to the 0..=255 range.
    pub fn intensity(&self, x: usize, y: usize) -> Option<u8> {
        let max = u16::from(self.bpp.max_sample());
        self.get(x, y).map(|s| (u16::from(s) * 255 / max) as u8)
    }

    /// Row `y` as a slice of `width` samples.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.samples.get(start..start + self.width)
    }

    /// Iterate over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.samples.chunks(self.width.max(1))
    }
}

/// Unpack `width * height` samples from `data`.
///
/// Exactly `calc_bytes(width * height, bpp)` bytes are consumed; extra input
/// and the padding bits of a trailing partial byte are ignored.
///
/// # Errors
///
/// Returns [`FontError::OutOfBounds`] if `data` is shorter than required.
pub fn unpack(data: &[u8], width: usize, height: usize, bpp: Bpp) -> Result<GlyphBitmap, FontError> {
    let count = width * height;
    let needed = calc_bytes(count, bpp);
    if data.len() < needed {
        return Err(FontError::OutOfBounds {
            needed,
            available: data.len(),
        });
    }

    let bits = bpp.bits() as usize;
    let mask = bpp.max_sample();
    let per_byte = bpp.samples_per_byte();
    let samples = data[..needed]
        .iter()
        .flat_map(|&byte| (1..=per_byte).map(move |i| (byte >> (8 - bits * i)) & mask))
        .take(count)
        .collect();

    Ok(GlyphBitmap {
        width,
        height,
        bpp,
        samples,
    })
}

/// Unpack with a raw bits-per-pixel value, as read from a font header.
///
/// # Errors
///
/// Returns [`FontError::UnsupportedBpp`] for depths other than 1, 2, 4 and 8,
/// and [`FontError::OutOfBounds`] for short input.
pub fn unpack_raw(data: &[u8], width: usize, height: usize, bpp: u8) -> Result<GlyphBitmap, FontError> {
    unpack(data, width, height, Bpp::try_from(bpp)?)
}

/// Pack a bitmap back into bytes at its own depth.
///
/// Inverse of [`unpack`]; padding bits of the final byte are zero.
pub fn pack(bitmap: &GlyphBitmap) -> Vec<u8> {
    let bpp = bitmap.bpp;
    let bits = bpp.bits() as usize;
    let mut out = vec![0u8; calc_bytes(bitmap.samples.len(), bpp)];
    for (i, &sample) in bitmap.samples.iter().enumerate() {
        let bit = i * bits;
        out[bit / 8] |= (sample & bpp.max_sample()) << (8 - bits - bit % 8);
    }
    out
}
