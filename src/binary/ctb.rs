//! CHITUBOX CTB / CBDDLP / FDG decoding
//!
//! Fixed little-endian header starting at byte 0:
//!
//! ```text
//!  0  magic              u32     48  bottom layer count  u32
//!  4  version            u32     52  resolution X        u32
//!  8  bed X/Y/Z          f32×3   56  resolution Y        u32
//! 20  (unknown)          8 bytes 60  large preview       u32
//! 28  total height       f32     64  layer definitions   u32
//! 32  layer height       f32     68  layer count         u32
//! 36  exposure           f32     72  small preview       u32
//! 40  bottom exposure    f32     76  print time (s)      u32
//! 44  light-off delay    f32     80  projector type      u32
//!                                84  print params offset u32
//!                                88  print params size   u32
//! ```

use super::cursor::ByteCursor;
use super::preview::{PreviewHeader, decode_rgb565_rle};
use super::{Decoded, ResinDecoder};
use crate::config::{DecoderConfig, round_to};
use crate::error::{Error, Result};
use crate::model::{MaterialUnit, SlicerExtract, Thumbnail};

/// Magic numbers accepted for CTB, CBDDLP, CTBv4 and encrypted CTB
pub const MAGICS: [u32; 4] = [0x12FD_0019, 0x12FD_0086, 0x12FD_0106, 0xFF22_0810];

/// Largest preview accepted (width, height)
const MAX_PREVIEW: (u32, u32) = (800, 480);

/// Offset of the volume float inside the print parameters block
const VOLUME_OFFSET: usize = 20;

/// Bytes of the print parameters block that must be present
const PARAMS_MIN_LEN: usize = 28;

/// Decoded CTB header
#[derive(Debug, Clone, PartialEq)]
pub struct CtbHeader {
    /// Magic number
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Bed size in mm (X, Y, Z)
    pub bed_size: [f32; 3],
    /// Total model height in mm
    pub total_height: f32,
    /// Layer height in mm
    pub layer_height: f32,
    /// Normal layer exposure in seconds
    pub exposure: f32,
    /// Bottom layer exposure in seconds
    pub bottom_exposure: f32,
    /// Light-off delay in seconds
    pub light_off_delay: f32,
    /// Number of bottom layers
    pub bottom_layers: u32,
    /// Horizontal LCD resolution
    pub resolution_x: u32,
    /// Vertical LCD resolution
    pub resolution_y: u32,
    /// Offset of the large preview
    pub preview_large_offset: u32,
    /// Offset of the layer definition table
    pub layers_definition_offset: u32,
    /// Number of layers
    pub layer_count: u32,
    /// Offset of the small preview
    pub preview_small_offset: u32,
    /// Estimated print time in seconds
    pub print_time_seconds: u32,
    /// Projector type
    pub projector_type: u32,
    /// Offset of the print parameters block
    pub print_params_offset: u32,
    /// Size of the print parameters block
    pub print_params_size: u32,
}

impl CtbHeader {
    /// Header length in bytes
    pub const LEN: usize = 92;

    /// Read and validate the header
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let magic = cursor.read_u32_le()?;
        if !MAGICS.contains(&magic) {
            return Err(Error::invalid_magic("CTB", &format!("{:#010x}", magic)));
        }

        let version = cursor.read_u32_le()?;
        let bed_size = [
            cursor.read_f32_le()?,
            cursor.read_f32_le()?,
            cursor.read_f32_le()?,
        ];
        cursor.skip(8)?;

        Ok(Self {
            magic,
            version,
            bed_size,
            total_height: cursor.read_f32_le()?,
            layer_height: cursor.read_f32_le()?,
            exposure: cursor.read_f32_le()?,
            bottom_exposure: cursor.read_f32_le()?,
            light_off_delay: cursor.read_f32_le()?,
            bottom_layers: cursor.read_u32_le()?,
            resolution_x: cursor.read_u32_le()?,
            resolution_y: cursor.read_u32_le()?,
            preview_large_offset: cursor.read_u32_le()?,
            layers_definition_offset: cursor.read_u32_le()?,
            layer_count: cursor.read_u32_le()?,
            preview_small_offset: cursor.read_u32_le()?,
            print_time_seconds: cursor.read_u32_le()?,
            projector_type: cursor.read_u32_le()?,
            print_params_offset: cursor.read_u32_le()?,
            print_params_size: cursor.read_u32_le()?,
        })
    }

    /// Volume stored in the print parameters block
    pub fn stored_volume_ml(&self, data: &[u8]) -> Option<f32> {
        let mut cursor = ByteCursor::block_at(data, self.print_params_offset)?;
        if cursor.remaining() < PARAMS_MIN_LEN {
            return None;
        }
        cursor.skip(VOLUME_OFFSET).ok()?;
        cursor.read_f32_le().ok()
    }

    /// Rough volume from the lit area of the bed and the model height
    ///
    /// Assumes `fill_factor` of the LCD is exposed on every layer. Returns
    /// NaN or infinity when the resolution is zero, which the caller rejects.
    pub fn estimated_volume_ml(&self, fill_factor: f64) -> f64 {
        let res_x = self.resolution_x as f64;
        let res_y = self.resolution_y as f64;
        let pixel_mm = self.bed_size[0] as f64 / res_x;
        let area_mm2 = res_x * res_y * pixel_mm * pixel_mm * fill_factor;
        round_to(area_mm2 * self.total_height as f64 / 1000.0, 1)
    }
}

/// Decode the large preview through the RLE path
pub fn read_preview(data: &[u8], offset: u32) -> Result<Option<Thumbnail>> {
    let Some(cursor) = ByteCursor::block_at(data, offset)
        .filter(|c| c.remaining() > PreviewHeader::LEN)
    else {
        return Ok(None);
    };
    let offset = cursor.position();

    let header = PreviewHeader::read(data, offset)?;
    if !header.is_plausible(MAX_PREVIEW.0, MAX_PREVIEW.1) {
        tracing::debug!(?header, "CTB preview header rejected");
        return Ok(None);
    }
    let payload = header.payload(data, offset)?;

    decode_rgb565_rle(header.width, header.height, payload)
        .into_thumbnail()
        .map(Some)
}

/// Decoder for CHITUBOX CTB, CBDDLP and FDG files
#[derive(Debug, Clone, Copy, Default)]
pub struct CtbDecoder;

impl ResinDecoder for CtbDecoder {
    fn name(&self) -> &'static str {
        "ctb"
    }

    fn decode(&self, data: &[u8], config: &DecoderConfig) -> Decoded {
        let header = match CtbHeader::read(data) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!(%err, "not a readable CTB header");
                return Decoded::NoMatch;
            }
        };
        tracing::debug!(?header, "CTB header");

        let limits = config.limits();
        let stored = header
            .stored_volume_ml(data)
            .map_or(0.0, |v| limits.material(v as f64));
        let volume = if stored > 0.0 {
            stored
        } else {
            let estimate = header.estimated_volume_ml(config.ctb_fill_factor());
            tracing::debug!(estimate, "CTB volume estimated from bed geometry");
            limits.material(estimate)
        };

        let mut extract = SlicerExtract::empty(MaterialUnit::Milliliters);
        extract.print_time_hours = limits.print_hours_from_seconds(header.print_time_seconds as f64);
        extract.material_used = volume;
        extract.layer_count = limits.layer_count(header.layer_count);

        if config.previews() {
            extract.thumbnail = read_preview(data, header.preview_large_offset).unwrap_or_else(|err| {
                tracing::warn!(%err, "failed to decode CTB preview");
                None
            });
        }

        Decoded::Match(extract)
    }
}
