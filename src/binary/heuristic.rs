//! Bounded value scans for resin files without a trusted header layout
//!
//! Photon/GOO headers vary between firmware revisions and opaque containers
//! have no known layout at all, so these decoders probe fixed byte windows for
//! values that look like a print time, a layer count or a resin volume. The
//! first plausible candidate of each kind wins.

use std::ops::RangeInclusive;

use super::cursor::{f32_le_at, u32_le_at};
use crate::config::DecoderConfig;
use crate::model::{MaterialUnit, SlicerExtract};

/// Print time candidates, in seconds (one minute to 100 hours)
pub const PRINT_SECONDS: RangeInclusive<u32> = 60..=360_000;

/// Layer count candidates
pub const LAYER_COUNT: RangeInclusive<u32> = 10..=50_000;

/// Values recovered by a scan
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanResult {
    /// First plausible print time in seconds
    pub print_seconds: Option<u32>,
    /// First plausible layer count
    pub layer_count: Option<u32>,
    /// First plausible volume in ml
    pub volume_ml: Option<f32>,
}

impl ScanResult {
    /// Run the `u32` scan over `offsets` and the `f32` volume scan over the
    /// first `float_window` bytes
    pub fn scan(
        data: &[u8],
        offsets: impl IntoIterator<Item = usize>,
        float_window: usize,
        volume: RangeInclusive<f32>,
    ) -> Self {
        let mut result = ScanResult::default();

        for offset in offsets {
            let Some(value) = u32_le_at(data, offset) else {
                continue;
            };
            if result.print_seconds.is_none() && PRINT_SECONDS.contains(&value) {
                result.print_seconds = Some(value);
            }
            if result.layer_count.is_none() && LAYER_COUNT.contains(&value) {
                result.layer_count = Some(value);
            }
        }

        result.volume_ml = aligned_offsets(data, float_window)
            .filter_map(|offset| f32_le_at(data, offset))
            .find(|v| v.is_finite() && volume.contains(v));

        result
    }

    /// Convert the scan into a normalized record
    pub fn into_extract(self, printer_model: Option<String>, config: &DecoderConfig) -> SlicerExtract {
        let limits = config.limits();
        let mut extract = SlicerExtract::empty(MaterialUnit::Milliliters);
        extract.print_time_hours = self
            .print_seconds
            .map_or(0.0, |s| limits.print_hours_from_seconds(s as f64));
        extract.material_used = self.volume_ml.map_or(0.0, |v| limits.material(v as f64));
        extract.layer_count = self.layer_count.and_then(|l| limits.layer_count(l));
        extract.printer_model = printer_model;
        extract
    }
}

/// 4-byte aligned offsets below `min(window, len - 4)`
pub fn aligned_offsets(data: &[u8], window: usize) -> impl Iterator<Item = usize> {
    (0..window.min(data.len().saturating_sub(4))).step_by(4)
}
