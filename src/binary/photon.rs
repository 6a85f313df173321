//! Anycubic Photon / PWMO / GOO decoding
//!
//! The header layout differs between firmware revisions, so the decoder uses
//! the bounded scan from [`super::heuristic`] over a fixed list of candidate
//! offsets instead of trusting field positions. No preview is decoded.

use super::heuristic::ScanResult;
use super::{Decoded, ResinDecoder};
use crate::config::DecoderConfig;

/// Offsets probed for the print time and layer count
const CANDIDATE_OFFSETS: [usize; 12] = [24, 28, 32, 48, 52, 56, 60, 64, 68, 72, 76, 80];

/// Bytes scanned for a volume float
const VOLUME_WINDOW: usize = 200;

/// Bytes searched for the vendor marker
const MARKER_WINDOW: usize = 64;

/// Decoder for Anycubic Photon family files
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotonDecoder;

impl ResinDecoder for PhotonDecoder {
    fn name(&self) -> &'static str {
        "photon"
    }

    fn decode(&self, data: &[u8], config: &DecoderConfig) -> Decoded {
        let header = &data[..data.len().min(MARKER_WINDOW)];
        let printer_model = header
            .windows(b"ANYCUBIC".len())
            .any(|w| w == b"ANYCUBIC")
            .then(|| "Anycubic Photon".to_string());

        let scan = ScanResult::scan(data, CANDIDATE_OFFSETS, VOLUME_WINDOW, 0.1..=2000.0);
        tracing::debug!(?scan, ?printer_model, "photon header scan");

        Decoded::Match(scan.into_extract(printer_model, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialUnit;

    #[test]
    fn test_anycubic_marker_and_scan() {
        let mut data = vec![0u8; 256];
        // unaligned so the marker bytes never read as a plausible float
        data[5..13].copy_from_slice(b"ANYCUBIC");
        data[48..52].copy_from_slice(&5400u32.to_le_bytes());
        data[100..104].copy_from_slice(&35.25f32.to_le_bytes());

        let Decoded::Match(extract) = PhotonDecoder.decode(&data, &DecoderConfig::default()) else {
            panic!("photon decoder always matches");
        };
        assert_eq!(extract.printer_model.as_deref(), Some("Anycubic Photon"));
        assert_eq!(extract.print_time_hours, 1.5);
        assert_eq!(extract.layer_count, Some(5400));
        assert_eq!(extract.material_used, 35.3);
        assert_eq!(extract.material_unit, MaterialUnit::Milliliters);
        assert!(extract.thumbnail.is_none());
    }

    #[test]
    fn test_empty_input() {
        let Decoded::Match(extract) = PhotonDecoder.decode(&[], &DecoderConfig::default()) else {
            panic!("photon decoder always matches");
        };
        assert!(!extract.has_core_data());
        assert_eq!(extract.printer_model, None);
    }
}
