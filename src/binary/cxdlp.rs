//! Creality CXDLPV4 decoding (Halot series)
//!
//! Layout, after a big-endian length-prefixed magic (`CXSW3D...`):
//!
//! | field                    | type       |
//! |--------------------------|------------|
//! | version                  | u16 BE     |
//! | printer model            | u32 BE len + bytes, NUL-terminated |
//! | resolution X / Y         | u16 LE ×2  |
//! | bed size X / Y / Z       | f32 LE ×3  |
//! | print height             | f32 LE     |
//! | layer height             | f32 LE     |
//! | bottom layer count       | u32 LE     |
//! | small preview offset     | u32 LE     |
//! | layer definition offset  | u32 LE     |
//! | layer count              | u32 LE     |
//! | large preview offset     | u32 LE     |
//! | print time (s)           | u32 LE     |
//! | projector type           | u32 LE     |
//! | print parameters offset  | u32 LE     |
//!
//! The print parameters block starts with five lift/retract floats; the resin
//! volume in ml follows at byte 20.

use super::cursor::ByteCursor;
use super::preview::{PreviewHeader, decode_rgb565};
use super::{Decoded, ResinDecoder};
use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::model::{MaterialUnit, SlicerExtract, Thumbnail};

/// Prefix every CXDLPV4 magic string starts with
pub const MAGIC_PREFIX: &str = "CXSW3D";

/// Longest printer-model string accepted
const MAX_MODEL_LEN: u32 = 256;

/// Largest preview edge in pixels
const MAX_PREVIEW_EDGE: u32 = 1024;

/// Offset of the volume float inside the print parameters block
const VOLUME_OFFSET: usize = 20;

/// Fixed header fields following the magic
#[derive(Debug, Clone, PartialEq)]
pub struct CxdlpHeader {
    /// File format version
    pub version: u16,
    /// Printer model string
    pub printer_model: String,
    /// Horizontal LCD resolution
    pub resolution_x: u16,
    /// Vertical LCD resolution
    pub resolution_y: u16,
    /// Bed size in mm (X, Y, Z)
    pub bed_size: [f32; 3],
    /// Total print height in mm
    pub print_height: f32,
    /// Layer height in mm
    pub layer_height: f32,
    /// Number of bottom layers
    pub bottom_layers: u32,
    /// Offset of the small preview
    pub preview_small_offset: u32,
    /// Offset of the layer definition table
    pub layers_definition_offset: u32,
    /// Number of layers
    pub layer_count: u32,
    /// Offset of the large preview
    pub preview_large_offset: u32,
    /// Estimated print time in seconds
    pub print_time_seconds: u32,
    /// Offset of the print parameters block
    pub print_params_offset: u32,
}

impl CxdlpHeader {
    /// Validate the magic and read the header
    ///
    /// Fails with [`Error::InvalidMagic`] when the magic does not start with
    /// `CXSW3D`, and with [`Error::UnexpectedEof`] when the buffer ends early.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        read_magic(&mut cursor)?;

        let version = cursor.read_u16_be()?;
        let printer_model = read_model_string(&mut cursor)?;
        let resolution_x = cursor.read_u16_le()?;
        let resolution_y = cursor.read_u16_le()?;
        let bed_size = [
            cursor.read_f32_le()?,
            cursor.read_f32_le()?,
            cursor.read_f32_le()?,
        ];
        let print_height = cursor.read_f32_le()?;
        let layer_height = cursor.read_f32_le()?;
        let bottom_layers = cursor.read_u32_le()?;
        let preview_small_offset = cursor.read_u32_le()?;
        let layers_definition_offset = cursor.read_u32_le()?;
        let layer_count = cursor.read_u32_le()?;
        let preview_large_offset = cursor.read_u32_le()?;
        let print_time_seconds = cursor.read_u32_le()?;
        cursor.skip(4)?; // projector type
        let print_params_offset = cursor.read_u32_le()?;

        Ok(Self {
            version,
            printer_model,
            resolution_x,
            resolution_y,
            bed_size,
            print_height,
            layer_height,
            bottom_layers,
            preview_small_offset,
            layers_definition_offset,
            layer_count,
            preview_large_offset,
            print_time_seconds,
            print_params_offset,
        })
    }

    /// Resin volume from the print parameters block, if the block is in bounds
    pub fn volume_ml(&self, data: &[u8]) -> Option<f32> {
        let mut cursor = ByteCursor::block_at(data, self.print_params_offset)?;
        // the block must extend past the volume float
        if cursor.remaining() <= VOLUME_OFFSET + 4 {
            return None;
        }
        cursor.skip(VOLUME_OFFSET).ok()?;
        cursor.read_f32_le().ok()
    }
}

/// Length-prefixed magic string; any failure to read it counts as a mismatch
fn read_magic(cursor: &mut ByteCursor<'_>) -> Result<()> {
    let magic = cursor
        .read_u32_be()
        .and_then(|len| cursor.read_bytes(len as usize))
        .map(|bytes| String::from_utf8_lossy(bytes).replace('\0', ""))
        .map_err(|err| Error::invalid_magic("CXDLPV4", &err.to_string()))?;
    if !magic.starts_with(MAGIC_PREFIX) {
        return Err(Error::invalid_magic("CXDLPV4", &format!("{:?}", magic)));
    }
    Ok(())
}

/// Length-prefixed model string; an empty or oversized length yields ""
fn read_model_string(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let len = cursor.read_u32_be()?;
    if len == 0 || len > MAX_MODEL_LEN {
        return Ok(String::new());
    }
    let bytes = cursor.read_bytes(len as usize)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Decode the large preview as raw RGB565
pub fn read_preview(data: &[u8], offset: u32) -> Result<Option<Thumbnail>> {
    let Some(cursor) = ByteCursor::block_at(data, offset)
        .filter(|c| c.remaining() > PreviewHeader::LEN)
    else {
        return Ok(None);
    };
    let offset = cursor.position();

    let header = PreviewHeader::read(data, offset)?;
    if !header.is_plausible(MAX_PREVIEW_EDGE, MAX_PREVIEW_EDGE) {
        return Ok(None);
    }
    let payload = header.payload(data, offset)?;

    match decode_rgb565(header.width, header.height, payload) {
        Some(image) => image.into_thumbnail().map(Some),
        None => {
            tracing::debug!(
                expected = header.pixel_count() * 2,
                got = header.size,
                "CXDLPV4 preview size mismatch"
            );
            Ok(None)
        }
    }
}

/// Decoder for Creality CXDLPV4 files
#[derive(Debug, Clone, Copy, Default)]
pub struct CxdlpDecoder;

impl ResinDecoder for CxdlpDecoder {
    fn name(&self) -> &'static str {
        "cxdlpv4"
    }

    fn decode(&self, data: &[u8], config: &DecoderConfig) -> Decoded {
        let header = match CxdlpHeader::read(data) {
            Ok(header) => header,
            Err(err @ Error::InvalidMagic(_)) => {
                tracing::debug!(%err, "not a CXDLPV4 file");
                return Decoded::NoMatch;
            }
            Err(err) => {
                tracing::warn!(%err, "truncated CXDLPV4 header");
                return Decoded::Match(SlicerExtract::empty(MaterialUnit::Milliliters));
            }
        };
        tracing::debug!(?header, "CXDLPV4 header");

        let limits = config.limits();
        let mut extract = SlicerExtract::empty(MaterialUnit::Milliliters);
        extract.print_time_hours = limits.print_hours_from_seconds(header.print_time_seconds as f64);
        extract.material_used = header
            .volume_ml(data)
            .map_or(0.0, |v| limits.material(v as f64));
        extract.layer_count = limits.layer_count(header.layer_count);
        extract.printer_model = crate::model::non_empty(&header.printer_model);

        if config.previews() {
            extract.thumbnail = read_preview(data, header.preview_large_offset).unwrap_or_else(|err| {
                tracing::warn!(%err, "failed to decode CXDLPV4 preview");
                None
            });
        }

        Decoded::Match(extract)
    }
}
