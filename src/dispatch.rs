//! Routing an uploaded file to its decoder
//!
//! The file extension picks a [`FormatFamily`]. The extension is only a hint
//! for the binary families: each chain starts with a magic-checking decoder
//! and falls back to the generic scan when the magic does not match.

use crate::archive::parse_3mf_with_config;
use crate::binary::{CtbDecoder, CxdlpDecoder, GenericDecoder, PhotonDecoder, ResinDecoder, run_chain};
use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::gcode::parse_gcode_with_config;
use crate::model::{RawDocument, SlicerExtract};

/// Group of file formats sharing a decoder chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFamily {
    /// G-code text (`.gcode`, `.gco`, `.g`)
    Gcode,
    /// 3MF package (`.3mf`)
    ThreeMf,
    /// CHITUBOX CTB, CBDDLP and Elegoo FDG
    Ctb,
    /// Creality CXDLPV4
    Cxdlp,
    /// Anycubic Photon, PWMO and Elegoo GOO
    Photon,
    /// Prusa SL1/SL1S and Formlabs FORM, decoded heuristically
    Generic,
}

impl FormatFamily {
    /// Select a family from the lower-cased file extension
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "gcode" | "gco" | "g" => Some(FormatFamily::Gcode),
            "3mf" => Some(FormatFamily::ThreeMf),
            "ctb" | "cbddlp" | "fdg" => Some(FormatFamily::Ctb),
            "cxdlpv4" => Some(FormatFamily::Cxdlp),
            "goo" | "photon" | "pwmo" => Some(FormatFamily::Photon),
            "sl1" | "sl1s" | "form" => Some(FormatFamily::Generic),
            _ => None,
        }
    }

    /// Decoder chain for a binary family; empty for text and archive families
    pub fn chain(&self) -> &'static [&'static dyn ResinDecoder] {
        match self {
            FormatFamily::Ctb => &[&CtbDecoder, &GenericDecoder],
            FormatFamily::Cxdlp => &[&CxdlpDecoder, &GenericDecoder],
            FormatFamily::Photon => &[&PhotonDecoder],
            FormatFamily::Generic => &[&GenericDecoder],
            FormatFamily::Gcode | FormatFamily::ThreeMf => &[],
        }
    }

    /// Decode `bytes` as this family
    pub fn decode(&self, bytes: &[u8], config: &DecoderConfig) -> SlicerExtract {
        match self {
            FormatFamily::Gcode => parse_gcode_with_config(&String::from_utf8_lossy(bytes), config),
            FormatFamily::ThreeMf => parse_3mf_with_config(bytes, config),
            resin => run_chain(resin.chain(), bytes, config),
        }
    }
}

/// Decode an uploaded file with the default configuration
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] when the extension maps to no decoder.
/// Every supported file produces a record, possibly with all fields empty.
///
/// # Example
///
/// ```
/// use slicer_extract::{RawDocument, decode};
///
/// let doc = RawDocument::new("part.gcode", b";TIME:5400\n".to_vec());
/// let extract = decode(doc)?;
/// assert_eq!(extract.print_time_hours, 1.5);
/// # Ok::<(), slicer_extract::Error>(())
/// ```
pub fn decode(doc: RawDocument) -> Result<SlicerExtract> {
    decode_with_config(doc, &DecoderConfig::default())
}

/// Decode an uploaded file
pub fn decode_with_config(doc: RawDocument, config: &DecoderConfig) -> Result<SlicerExtract> {
    let family = FormatFamily::from_file_name(&doc.file_name)
        .ok_or_else(|| Error::UnsupportedFormat(doc.file_name.clone()))?;
    tracing::debug!(file = %doc.file_name, ?family, len = doc.bytes.len(), "decoding");
    Ok(family.decode(&doc.bytes, config))
}

impl SlicerExtract {
    /// Decode file contents by name
    ///
    /// Borrowing counterpart of [`decode`].
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_config(file_name, bytes, &DecoderConfig::default())
    }

    /// Decode file contents by name with a custom configuration
    pub fn from_bytes_with_config(file_name: &str, bytes: &[u8], config: &DecoderConfig) -> Result<Self> {
        let family = FormatFamily::from_file_name(file_name)
            .ok_or_else(|| Error::UnsupportedFormat(file_name.to_string()))?;
        Ok(family.decode(bytes, config))
    }
}
