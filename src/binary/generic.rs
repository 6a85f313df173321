//! Heuristic fallback for unknown or opaque resin files
//!
//! Used for SL1/SL1S and Formlabs containers, and whenever a format decoder
//! rejects the magic. It always produces a record.

use std::sync::LazyLock;

use regex::bytes::Regex;

use super::heuristic::{ScanResult, aligned_offsets};
use super::{Decoded, ResinDecoder};
use crate::config::DecoderConfig;

/// Bytes scanned for numeric candidates
const SCAN_WINDOW: usize = 1024;

/// Bytes searched for a printer model name
const TEXT_WINDOW: usize = 512;

static PRINTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)HALOT[- ]?(MAGE|ONE|SKY|RAY|MAX|LITE)[- ]?(\d*K?)?(\s*PRO)?",
        r"(?i)CL-\d+[A-Z]*",
        r"(?i)ELEGOO[- ]?(MARS|SATURN|JUPITER)[- ]?(\d+)?(\s*(ULTRA|PRO))?",
        r"(?i)ANYCUBIC[- ]?(PHOTON|MONO)[- ]?(\w+)?",
        r"(?i)PHROZEN[- ]?(SONIC|MEGA|MIGHTY)[- ]?(\w+)?",
        r"(?i)PRUSA[- ]?SL\d?S?",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("invalid printer model regex"))
    .collect()
});

/// Decoder that scans raw bytes for plausible values
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDecoder;

impl ResinDecoder for GenericDecoder {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn decode(&self, data: &[u8], config: &DecoderConfig) -> Decoded {
        let printer_model = detect_printer_model(data);
        let scan = ScanResult::scan(
            data,
            aligned_offsets(data, SCAN_WINDOW),
            SCAN_WINDOW,
            0.1..=5000.0,
        );
        tracing::debug!(?scan, ?printer_model, "generic heuristic scan");

        Decoded::Match(scan.into_extract(printer_model, config))
    }
}

/// Match the printer-name pattern bank against the start of the file
pub fn detect_printer_model(data: &[u8]) -> Option<String> {
    let header = &data[..data.len().min(TEXT_WINDOW)];
    PRINTER_PATTERNS.iter().find_map(|pattern| {
        pattern.find(header).and_then(|m| {
            let text = String::from_utf8_lossy(m.as_bytes()).replace('\0', "");
            crate::model::non_empty(&text)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(data: &[u8]) -> crate::model::SlicerExtract {
        match GenericDecoder.decode(data, &DecoderConfig::default()) {
            Decoded::Match(extract) => extract,
            Decoded::NoMatch => panic!("generic decoder always matches"),
        }
    }

    #[test]
    fn test_printer_bank_compiles_in_full() {
        assert_eq!(PRINTER_PATTERNS.len(), 6);
    }

    #[test]
    fn test_printer_patterns() {
        assert_eq!(
            detect_printer_model(b"\x00\x01HALOT-MAGE 8K PRO\x00").as_deref(),
            Some("HALOT-MAGE 8K PRO")
        );
        assert_eq!(
            detect_printer_model(b"machine=ELEGOO SATURN 3 ULTRA;").as_deref(),
            Some("ELEGOO SATURN 3 ULTRA")
        );
        assert_eq!(
            detect_printer_model(b"printer Original Prusa SL1S SPEED").as_deref(),
            Some("Prusa SL1S")
        );
        assert_eq!(detect_printer_model(b"nothing to see"), None);
    }

    #[test]
    fn test_model_outside_text_window_ignored() {
        let mut data = vec![0u8; 600];
        data[550..559].copy_from_slice(b"HALOT-ONE");
        assert_eq!(detect_printer_model(&data), None);
    }

    #[test]
    fn test_scan_over_window() {
        let mut data = vec![0u8; 2048];
        data[512..516].copy_from_slice(&3600u32.to_le_bytes());
        data[516..520].copy_from_slice(&120.0f32.to_le_bytes());
        // beyond the scan window
        data[1500..1504].copy_from_slice(&99u32.to_le_bytes());

        let extract = decode(&data);
        assert_eq!(extract.print_time_hours, 1.0);
        assert_eq!(extract.layer_count, Some(3600));
        assert_eq!(extract.material_used, 120.0);
    }

    #[test]
    fn test_garbage_never_panics() {
        for len in 0..16 {
            let data = vec![0xFFu8; len];
            let extract = decode(&data);
            assert_eq!(extract.print_time_hours, 0.0);
        }
    }
}
