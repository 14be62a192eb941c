//! Error and warning types for lvfont-rs.
//!
//! Provides [`FontError`] for fatal errors that stop decoding,
//! [`DecodeWarning`] for non-fatal issues that allow best-effort continuation,
//! [`DecodeResult`] for pairing a value with collected warnings, and
//! [`DecodeOptions`] for configuring resource limits and warning behavior.

use std::fmt;

/// Fatal error types for font decoding.
///
/// A fatal error means no model is produced. Everything a decoder can
/// recover from is reported as a [`DecodeWarning`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// Error decoding the structure of a font artifact.
    ParseError(String),
    /// I/O error reading the font file.
    IoError(String),
    /// The textual form is not valid UTF-8.
    EncodingError(String),
    /// The file kind is not one of the supported artifact shapes.
    UnsupportedFormat(String),
    /// A bits-per-pixel value outside {1, 2, 4, 8}.
    UnsupportedBpp(u8),
    /// A read would run past the end of the available data.
    OutOfBounds {
        /// Bytes the operation needed.
        needed: usize,
        /// Bytes that were available.
        available: usize,
    },
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::ParseError(msg) => write!(f, "parse error: {msg}"),
            FontError::IoError(msg) => write!(f, "I/O error: {msg}"),
            FontError::EncodingError(msg) => write!(f, "encoding error: {msg}"),
            FontError::UnsupportedFormat(what) => write!(f, "unsupported font format: {what}"),
            FontError::UnsupportedBpp(bpp) => {
                write!(f, "unsupported bits per pixel: {bpp} (expected 1, 2, 4 or 8)")
            }
            FontError::OutOfBounds { needed, available } => {
                write!(f, "out of bounds: needed {needed} bytes, {available} available")
            }
            FontError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            FontError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FontError {}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::IoError(err.to_string())
    }
}

/// Machine-readable warning code for categorizing decode issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum DecodeWarningCode {
    /// An expected table or chunk is absent; its fields keep default values.
    MissingTable,
    /// A declared size, offset or length points outside the data.
    OutOfBounds,
    /// A cmap mapping resolved to a glyph id the font does not have.
    GlyphIdOutOfRange,
    /// The font declares a bits-per-pixel value the codec cannot unpack.
    UnsupportedBpp,
    /// A table is present but does not have the expected shape.
    MalformedTable,
    /// Bitmaps are compressed; samples are decoded as stored.
    CompressedBitmap,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl DecodeWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            DecodeWarningCode::MissingTable => "MISSING_TABLE",
            DecodeWarningCode::OutOfBounds => "OUT_OF_BOUNDS",
            DecodeWarningCode::GlyphIdOutOfRange => "GLYPH_ID_OUT_OF_RANGE",
            DecodeWarningCode::UnsupportedBpp => "UNSUPPORTED_BPP",
            DecodeWarningCode::MalformedTable => "MALFORMED_TABLE",
            DecodeWarningCode::CompressedBitmap => "COMPRESSED_BITMAP",
            DecodeWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for DecodeWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning encountered while decoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeWarning {
    /// Machine-readable warning code.
    pub code: DecodeWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Table, chunk or glyph the warning refers to (e.g., "glyph 12").
    pub element: Option<String>,
}

impl DecodeWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: DecodeWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            element: None,
        }
    }

    /// Attach the element the warning refers to (builder pattern).
    pub fn on(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Convert this warning into a [`FontError`].
    ///
    /// Used by strict mode to escalate warnings to errors.
    pub fn to_error(&self) -> FontError {
        FontError::Other(self.to_string())
    }
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref element) = self.element {
            write!(f, " [{element}]")?;
        }
        Ok(())
    }
}

/// Result wrapper that pairs a value with collected warnings.
#[derive(Debug, Clone)]
pub struct DecodeResult<T> {
    /// The decoded value.
    pub value: T,
    /// Warnings collected while decoding.
    pub warnings: Vec<DecodeWarning>,
}

impl<T> DecodeResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<DecodeWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodeResult<U> {
        DecodeResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Apply the warning policy from `options`.
    ///
    /// In strict mode the first warning becomes a fatal error. When warnings
    /// are not collected they are dropped.
    pub fn apply_options(mut self, options: &DecodeOptions) -> Result<Self, FontError> {
        if options.strict_mode {
            if let Some(first) = self.warnings.first() {
                return Err(first.to_error());
            }
        }
        if !options.collect_warnings {
            self.warnings.clear();
        }
        Ok(self)
    }
}

/// How the binary decoder reads `loca` offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocaFormat {
    /// Always read 32-bit offsets.
    #[default]
    Offset32,
    /// Follow the head table: `index_to_loc_format == 0` means 16-bit offsets.
    FromHead,
}

/// Options controlling decode behavior and resource limits.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Whether to collect warnings while decoding (default: true).
    pub collect_warnings: bool,
    /// When true, any warning is escalated to an error (default: false).
    pub strict_mode: bool,
    /// Maximum input file size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Offset width used for the binary `loca` chunk (default: 32-bit).
    pub loca_format: LocaFormat,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            collect_warnings: true,
            strict_mode: false,
            max_input_bytes: None,
            loca_format: LocaFormat::Offset32,
        }
    }
}

impl DecodeOptions {
    /// Check `len` against [`max_input_bytes`](Self::max_input_bytes).
    pub fn check_input_len(&self, len: usize) -> Result<(), FontError> {
        match self.max_input_bytes {
            Some(limit) if len > limit => Err(FontError::ResourceLimitExceeded {
                limit_name: "max_input_bytes".to_string(),
                limit_value: limit,
                actual_value: len,
            }),
            _ => Ok(()),
        }
    }
}
