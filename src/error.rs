//! Error types for slicer file decoding
//!
//! Decoders never surface these to the caller of [`crate::decode`] except for
//! [`Error::UnsupportedFormat`]. Internally every fallible step returns
//! [`Result`] so offset arithmetic and archive access can use `?`, and the
//! decoder boundary turns a failure into a defaulted field.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing errors
//! - **E3xxx**: Binary layout and numeric errors
//! - **E4xxx**: Unsupported input
//! - **E5xxx**: Thumbnail and metadata encoding errors

use std::io;
use thiserror::Error;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding slicer files
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading an archive entry
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - The file is not a ZIP container
    /// - Corrupted or truncated archive
    /// - Unsupported compression method
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required entry is missing from the archive
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Missing archive entry: {0}")]
    MissingEntry(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure or encoding
    ///
    /// **Error Code**: E2003
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// A read ran past the end of the buffer
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - Truncated upload
    /// - Header offset pointing outside the file
    /// - Firmware revision with a different header layout
    #[error("[E3001] Unexpected end of data: needed {needed} bytes at offset {offset}, buffer is {len} bytes")]
    UnexpectedEof {
        /// Offset where the read started
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Total buffer length
        len: usize,
    },

    /// Magic number or magic string did not match the expected format
    ///
    /// **Error Code**: E3002
    #[error("[E3002] Invalid magic: {0}")]
    InvalidMagic(String),

    /// Parse error for numeric values
    ///
    /// **Error Code**: E3003
    #[error("[E3003] Parse error: {0}")]
    ParseError(String),

    /// File extension does not map to any known decoder
    ///
    /// **Error Code**: E4001
    ///
    /// **Suggestions**:
    /// - Supported: .gcode, .gco, .g, .3mf, .ctb, .cbddlp, .fdg, .cxdlpv4,
    ///   .goo, .photon, .pwmo, .sl1, .sl1s, .form
    #[error("[E4001] Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Encoding a decoded preview image failed
    ///
    /// **Error Code**: E5001
    #[error("[E5001] Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// Thumbnail payload is not valid base64
    ///
    /// **Error Code**: E5002
    #[error("[E5002] Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON metadata entry could not be parsed
    ///
    /// **Error Code**: E5003
    #[error("[E5003] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an UnexpectedEof error for a read of `needed` bytes at `offset`
    pub fn eof(offset: usize, needed: usize, len: usize) -> Self {
        Error::UnexpectedEof {
            offset,
            needed,
            len,
        }
    }

    /// Create an InvalidMagic error naming the format and the value found
    ///
    /// # Arguments
    /// * `format` - The format that was expected (e.g., "CTB")
    /// * `found` - Printable form of the magic that was read
    pub fn invalid_magic(format: &str, found: &str) -> Self {
        Error::InvalidMagic(format!("expected {} magic, found {}", format, found))
    }
}
