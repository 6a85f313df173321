//! Preview image decoding for resin slicer formats
//!
//! Resin files store previews as a small header `(width, height, size)` of
//! little-endian `u32` values followed by RGB565 pixel data, either raw
//! (CXDLPV4) or run-length encoded (CTB). Decoded rasters are encoded as PNG
//! straight away; the RGB buffer never leaves this module.

use std::io::Cursor;

use image::RgbImage;

use super::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::model::{ImageFormat, Thumbnail};

/// Upper bound (exclusive) on the byte size of a preview payload
pub const MAX_PREVIEW_BYTES: u32 = 500_000;

/// Preview header read at a preview offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewHeader {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Payload size in bytes
    pub size: u32,
}

impl PreviewHeader {
    /// Size of the header in bytes
    pub const LEN: usize = 12;

    /// Read the header at `offset`
    pub fn read(data: &[u8], offset: usize) -> Result<Self> {
        let mut cursor = ByteCursor::at(data, offset);
        Ok(Self {
            width: cursor.read_u32_le()?,
            height: cursor.read_u32_le()?,
            size: cursor.read_u32_le()?,
        })
    }

    /// Whether the dimensions fit `max_width × max_height` and the payload size is sane
    pub fn is_plausible(&self, max_width: u32, max_height: u32) -> bool {
        self.width > 0
            && self.width <= max_width
            && self.height > 0
            && self.height <= max_height
            && self.size > 0
            && self.size < MAX_PREVIEW_BYTES
    }

    /// Number of pixels described by the header
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Borrow the payload that follows the header at `offset`
    pub fn payload<'a>(&self, data: &'a [u8], offset: usize) -> Result<&'a [u8]> {
        let mut cursor = ByteCursor::at(data, offset);
        cursor.skip(Self::LEN)?;
        cursor.read_bytes(self.size as usize)
    }
}

/// A decoded RGB8 raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Packed RGB triples, row-major
    pub rgb: Vec<u8>,
}

impl PreviewImage {
    /// Encode the raster as a PNG thumbnail, consuming the pixel buffer
    pub fn into_thumbnail(self) -> Result<Thumbnail> {
        let (width, height) = (self.width, self.height);
        let raster = RgbImage::from_raw(width, height, self.rgb).ok_or_else(|| {
            Error::ParseError(format!("preview buffer does not match {}x{}", width, height))
        })?;
        let mut png = Vec::new();
        raster.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Thumbnail::from_bytes(ImageFormat::Png, &png))
    }
}

/// Expand an RGB565 pixel into 8-bit RGB by shifting each channel
pub fn rgb565_to_rgb(pixel: u16) -> [u8; 3] {
    let r = ((pixel >> 11) & 0x1F) << 3;
    let g = ((pixel >> 5) & 0x3F) << 2;
    let b = (pixel & 0x1F) << 3;
    [r as u8, g as u8, b as u8]
}

/// Decode an uncompressed little-endian RGB565 stream
///
/// Returns `None` when the payload holds fewer than `width × height` pixels.
pub fn decode_rgb565(width: u32, height: u32, payload: &[u8]) -> Option<PreviewImage> {
    let pixels = width as usize * height as usize;
    if payload.len() < pixels * 2 {
        return None;
    }

    let rgb = payload
        .chunks_exact(2)
        .take(pixels)
        .flat_map(|px| rgb565_to_rgb(u16::from_le_bytes([px[0], px[1]])))
        .collect();

    Some(PreviewImage { width, height, rgb })
}

/// Decode a run-length encoded RGB565 stream
///
/// Each pixel is a little-endian `u16`. When the byte after it has bit 7 set
/// it is a control byte giving the run length in its low 7 bits; otherwise the
/// pixel appears once. Decoding stops when the raster is full or the payload
/// is exhausted; pixels not reached stay black.
pub fn decode_rgb565_rle(width: u32, height: u32, payload: &[u8]) -> PreviewImage {
    let pixels = width as usize * height as usize;
    let mut rgb = vec![0u8; pixels * 3];
    let mut written = 0usize;
    let mut i = 0usize;

    while i < payload.len() && written < pixels {
        let lo = payload[i];
        let hi = payload.get(i + 1).copied().unwrap_or(0);
        i += 2;

        let mut repeat = 1usize;
        if let Some(&control) = payload.get(i)
            && control & 0x80 != 0
        {
            repeat = (control & 0x7F) as usize;
            i += 1;
        }

        let color = rgb565_to_rgb(u16::from_le_bytes([lo, hi]));
        for _ in 0..repeat.min(pixels - written) {
            rgb[written * 3..written * 3 + 3].copy_from_slice(&color);
            written += 1;
        }
    }

    PreviewImage { width, height, rgb }
}
