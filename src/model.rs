//! Normalized decoder output and input document types

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::error::Result;

/// Unit of [`SlicerExtract::material_used`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialUnit {
    /// Filament mass in grams (G-code, 3MF)
    Grams,
    /// Resin volume in millilitres (resin binary formats)
    Milliliters,
}

/// Encoding of an embedded preview image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
}

impl ImageFormat {
    /// MIME type of the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Guess the format from a file name, if it names a PNG or JPEG
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            Some(ImageFormat::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

/// An embedded preview image, kept in its encoded base64 form
///
/// The payload is materialized into something displayable only on request,
/// through [`Thumbnail::to_data_url`] or [`Thumbnail::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    /// Image encoding of the payload
    pub format: ImageFormat,
    /// Base64 payload without any `data:` prefix
    pub base64: String,
}

impl Thumbnail {
    /// Wrap an already base64-encoded payload
    pub fn new(format: ImageFormat, base64: impl Into<String>) -> Self {
        Self {
            format,
            base64: base64.into(),
        }
    }

    /// Encode raw image file bytes (a PNG or JPEG file) as a thumbnail
    pub fn from_bytes(format: ImageFormat, bytes: &[u8]) -> Self {
        Self::new(format, STANDARD.encode(bytes))
    }

    /// Render the thumbnail as a `data:` URL suitable for an `<img>` source
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64)
    }

    /// Decode the base64 payload back into image file bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.base64.as_bytes())?)
    }
}

/// Normalized result of decoding one slicer file
///
/// Every decoder returns this shape. Fields that could not be recovered, or
/// whose recovered value failed its plausibility check, are `0.0` or `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlicerExtract {
    /// Estimated print time in hours, rounded to 2 decimals
    pub print_time_hours: f64,
    /// Material usage in [`SlicerExtract::material_unit`], rounded to 1 decimal
    pub material_used: f64,
    /// Unit of `material_used`
    pub material_unit: MaterialUnit,
    /// Filament length in millimetres (G-code only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filament_length_mm: Option<f64>,
    /// Printer or machine model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_model: Option<String>,
    /// Material or filament settings identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Filament colour as written by the slicer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Embedded preview image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    /// Number of layers (resin formats only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_count: Option<u32>,
    /// Mesh surface area in mm² (3MF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_area_mm2: Option<f64>,
}

impl SlicerExtract {
    /// Create an all-default record measured in `unit`
    pub fn empty(unit: MaterialUnit) -> Self {
        Self {
            print_time_hours: 0.0,
            material_used: 0.0,
            material_unit: unit,
            filament_length_mm: None,
            printer_model: None,
            material: None,
            color: None,
            thumbnail: None,
            layer_count: None,
            surface_area_mm2: None,
        }
    }

    /// Whether print time or material usage was recovered
    ///
    /// A record without either means extraction failed and the values have
    /// to be entered manually.
    pub fn has_core_data(&self) -> bool {
        self.print_time_hours > 0.0 || self.material_used > 0.0
    }
}

/// An uploaded file awaiting decoding
///
/// The document is moved into [`crate::decode`] and dropped once a
/// [`SlicerExtract`] has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Original file name, used to select the decoder
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a document from a file name and its contents
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Collapse an empty or whitespace-only string to `None`
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let extract = SlicerExtract::empty(MaterialUnit::Milliliters);
        assert_eq!(extract.print_time_hours, 0.0);
        assert_eq!(extract.material_unit, MaterialUnit::Milliliters);
        assert!(!extract.has_core_data());
    }

    #[test]
    fn test_has_core_data() {
        let mut extract = SlicerExtract::empty(MaterialUnit::Grams);
        extract.material_used = 4.2;
        assert!(extract.has_core_data());
    }

    #[test]
    fn test_thumbnail_data_url() {
        let thumb = Thumbnail::new(ImageFormat::Jpeg, "AAAA");
        assert_eq!(thumb.to_data_url(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_thumbnail_bytes_round_trip() {
        let bytes = [0x89u8, b'P', b'N', b'G', 0, 1, 2, 3];
        let thumb = Thumbnail::from_bytes(ImageFormat::Png, &bytes);
        assert_eq!(thumb.decode().unwrap(), bytes);
    }

    #[test]
    fn test_image_format_from_file_name() {
        assert_eq!(
            ImageFormat::from_file_name("Metadata/plate_1.PNG"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_file_name("preview.jpeg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_file_name("3D/3dmodel.model"), None);
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let extract = SlicerExtract::empty(MaterialUnit::Grams);
        let json = serde_json::to_value(&extract).unwrap();
        assert_eq!(json["material_unit"], "grams");
        assert!(json.get("thumbnail").is_none());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  PLA \r"), Some("PLA".to_string()));
        assert_eq!(non_empty(" \t"), None);
    }
}
