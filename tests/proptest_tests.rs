//! Property-based tests for slicer-extract
//!
//! Arbitrary bytes must never panic or fail a supported format, decoding must
//! be deterministic, and implausible values must never leak into a record.

mod common;

use common::{CtbFixture, zip_package};
use proptest::prelude::*;
use slicer_extract::binary::{Decoded, GenericDecoder, ResinDecoder};
use slicer_extract::{DecoderConfig, MaterialUnit, RawDocument, SlicerExtract, decode, parse_3mf, parse_gcode};

const EXTENSIONS: [&str; 14] = [
    "gcode", "gco", "g", "3mf", "ctb", "cbddlp", "fdg", "cxdlpv4", "goo", "photon", "pwmo", "sl1",
    "sl1s", "form",
];

// ============================================================================
// Generators
// ============================================================================

/// Bytes biased towards the magics and markers the decoders look for
fn slicer_bytes() -> impl Strategy<Value = Vec<u8>> {
    let prefix = prop_oneof![
        Just(Vec::new()),
        Just(0x12FD_0086u32.to_le_bytes().to_vec()),
        Just(b"\x00\x00\x00\x09CXSW3DV2\x00".to_vec()),
        Just(b"PK\x03\x04".to_vec()),
        Just(b"; thumbnail begin 10x10 400\n".to_vec()),
    ];
    (prefix, prop::collection::vec(any::<u8>(), 0..2048)).prop_map(|(mut prefix, tail)| {
        prefix.extend(tail);
        prefix
    })
}

fn assert_well_formed(extract: &SlicerExtract) {
    assert!(extract.print_time_hours >= 0.0 && extract.print_time_hours <= 100.0);
    assert!(extract.material_used >= 0.0 && extract.material_used < 10_000.0);
    if let Some(layers) = extract.layer_count {
        assert!(layers > 0 && layers < 100_000);
    }
    if let Some(area) = extract.surface_area_mm2 {
        assert!(area > 0.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_bytes_decode_for_every_extension(bytes in slicer_bytes(), ext in 0..EXTENSIONS.len()) {
        let name = format!("upload.{}", EXTENSIONS[ext]);
        let extract = decode(RawDocument::new(name, bytes)).unwrap();
        assert_well_formed(&extract);
    }

    #[test]
    fn prop_decoding_is_deterministic(bytes in slicer_bytes(), ext in 0..EXTENSIONS.len()) {
        let name = format!("upload.{}", EXTENSIONS[ext]);
        let first = SlicerExtract::from_bytes(&name, &bytes).unwrap();
        let second = SlicerExtract::from_bytes(&name, &bytes).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_cura_seconds_convert_to_rounded_hours(seconds in 1u32..=360_000) {
        let extract = parse_gcode(&format!(";TIME:{}\n", seconds));
        let expected = (seconds as f64 / 3600.0 * 100.0).round() / 100.0;
        prop_assert_eq!(extract.print_time_hours, expected);
    }

    #[test]
    fn prop_out_of_range_time_is_zero(seconds in 360_001u64..10_000_000_000) {
        let gcode = parse_gcode(&format!(";TIME:{}\n", seconds));
        prop_assert_eq!(gcode.print_time_hours, 0.0);

        let fixture = CtbFixture {
            print_time: u32::try_from(seconds).unwrap_or(u32::MAX),
            ..Default::default()
        };
        let ctb = decode(RawDocument::new("a.ctb", fixture.build())).unwrap();
        prop_assert_eq!(ctb.print_time_hours, 0.0);
    }

    #[test]
    fn prop_ctb_with_foreign_magic_equals_generic(magic in any::<u32>(), tail in prop::collection::vec(any::<u8>(), 0..512)) {
        prop_assume!(![0x12FD_0019, 0x12FD_0086, 0x12FD_0106, 0xFF22_0810].contains(&magic));
        let mut bytes = magic.to_le_bytes().to_vec();
        bytes.extend(tail);

        let ctb = decode(RawDocument::new("a.ctb", bytes.clone())).unwrap();
        let Decoded::Match(generic) = GenericDecoder.decode(&bytes, &DecoderConfig::default()) else {
            panic!("generic decoder always matches");
        };
        prop_assert_eq!(ctb, generic);
    }

    #[test]
    fn prop_gcode_inside_3mf_equals_plain_gcode(minutes in 1u32..6000, grams in 1u32..5000) {
        let gcode = format!(
            "; total filament weight [g] : {}.5\n; estimated printing time (normal mode) = {}m\n",
            grams, minutes
        );
        let package = zip_package(&[("Metadata/plate_1.gcode", gcode.as_bytes())]);
        prop_assert_eq!(parse_3mf(&package), parse_gcode(&gcode));
    }

    #[test]
    fn prop_random_archives_stay_grams(entries in prop::collection::btree_map("[a-z]{1,8}\\.(json|config|model|png)", prop::collection::vec(any::<u8>(), 0..256), 0..6)) {
        let refs: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
            .collect();
        let package = zip_package(&refs);
        let extract = parse_3mf(&package);
        prop_assert_eq!(extract.material_unit, MaterialUnit::Grams);
        assert_well_formed(&extract);
    }
}
