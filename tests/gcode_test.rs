//! G-code metadata extraction across slicer dialects

mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::{gcode_thumbnail_block, tiny_png};
use slicer_extract::{
    DecoderConfig, ImageFormat, MaterialUnit, PlausibilityLimits, RawDocument, SlicerExtract, decode,
    parse_gcode, parse_gcode_with_config,
};

const PRUSASLICER: &str = "\
; generated by PrusaSlicer 2.7.1+win64 on 2024-01-03 at 10:12:45 UTC
G21 ; set units to millimeters
G90 ; use absolute coordinates
M83 ; extruder relative mode
G1 X10 Y10 E2.5 F1500
; filament used [mm] = 5230.61
; filament used [cm3] = 12.58
; filament used [g] = 15.60
; filament cost = 0.39
; total filament used [g] = 15.60
; estimated printing time (normal mode) = 2h 14m 8s
; estimated printing time (silent mode) = 2h 19m 31s
; printer_model = MK3S
; filament_colour = #FF8000
; filament_settings_id = \"Prusament PLA\"
";

const CURA: &str = "\
;FLAVOR:Marlin
;TIME:6666
;Filament used: 3.4567m
;Layer height: 0.2
;MINX:95.3
;Generated with Cura_SteamEngine 5.6.0
M140 S60
";

const ORCA: &str = "\
; HEADER_BLOCK_START
; generated by OrcaSlicer 2.0.0
; total layer number: 120
; total filament weight [g] : 8.42
; filament used [mm] = 2801.12
; HEADER_BLOCK_END
; model printing time: 41m 20s; total estimated time: 47m 3s
; estimated printing time (normal mode) = 47m 3s
; printer_model = Bambu Lab P1S
; filament_type = PETG
";

#[test]
fn test_prusaslicer_footer() {
    let extract = parse_gcode(PRUSASLICER);
    // 2h 14m 8s = 8048 s
    assert_eq!(extract.print_time_hours, 2.24);
    assert_eq!(extract.material_used, 15.6);
    assert_eq!(extract.material_unit, MaterialUnit::Grams);
    assert_eq!(extract.filament_length_mm, Some(5230.6));
    assert_eq!(extract.printer_model.as_deref(), Some("MK3S"));
    assert_eq!(extract.color.as_deref(), Some("#FF8000"));
    assert_eq!(extract.material.as_deref(), Some("\"Prusament PLA\""));
    assert!(extract.thumbnail.is_none());
}

#[test]
fn test_cura_header() {
    let extract = parse_gcode(CURA);
    assert_eq!(extract.print_time_hours, 1.85);
    assert_eq!(extract.filament_length_mm, Some(3456.7));
    // weight estimated from length: 3456.7 mm × 0.00298 g/mm ≈ 10.3 g
    assert_eq!(extract.material_used, 10.3);
    assert_eq!(extract.printer_model, None);
}

#[test]
fn test_orca_header() {
    let extract = parse_gcode(ORCA);
    assert_eq!(extract.material_used, 8.4);
    assert_eq!(extract.filament_length_mm, Some(2801.1));
    assert_eq!(extract.printer_model.as_deref(), Some("Bambu Lab P1S"));
    assert_eq!(extract.material.as_deref(), Some("PETG"));
    assert!(extract.print_time_hours > 0.0);
}

#[test]
fn test_days_in_duration() {
    let extract = parse_gcode("; estimated printing time (normal mode) = 1d 2h 30m\n");
    assert_eq!(extract.print_time_hours, 26.5);
}

#[test]
fn test_limits_reject_time_and_weight() {
    let text = ";TIME:400000\n; filament used [g] = 20000\n";
    let extract = parse_gcode(text);
    assert_eq!(extract.print_time_hours, 0.0);
    assert_eq!(extract.material_used, 0.0);
    assert!(!extract.has_core_data());

    let limits = PlausibilityLimits {
        max_print_seconds: 500_000,
        max_material: 50_000.0,
        max_layer_count: 100_000,
    };
    let config = DecoderConfig::new().with_limits(limits);
    let extract = parse_gcode_with_config(text, &config);
    assert_eq!(extract.print_time_hours, 111.11);
    assert_eq!(extract.material_used, 20_000.0);
}

#[test]
fn test_thumbnail_roundtrip() {
    let png = tiny_png();
    let encoded = STANDARD.encode(&png);
    // pad the block so it clears the minimum length
    let text = format!(
        "{}{}G28\n;TIME:60\n",
        gcode_thumbnail_block("thumbnail", 16, 16, &"A".repeat(160)),
        gcode_thumbnail_block("thumbnail", 300, 300, &encoded),
    );
    let config = DecoderConfig::new().with_thumbnail_min_len(10);

    let extract = parse_gcode_with_config(&text, &config);
    let thumb = extract.thumbnail.expect("thumbnail");
    assert_eq!(thumb.format, ImageFormat::Png);
    assert_eq!(thumb.decode().unwrap(), png);
    assert!(thumb.to_data_url().starts_with("data:image/png;base64,iVBOR"));
}

#[test]
fn test_jpg_thumbnail_marker() {
    let payload = "/9j/4AAQSkZJRgABAQ".repeat(10);
    let text = gcode_thumbnail_block("thumbnail_JPG", 220, 124, &payload);
    let thumb = parse_gcode(&text).thumbnail.expect("thumbnail");
    assert_eq!(thumb.format, ImageFormat::Jpeg);
    assert_eq!(thumb.base64, payload);
}

#[test]
fn test_decode_by_extension() {
    for name in ["part.gcode", "part.GCO", "part.g"] {
        let extract = decode(RawDocument::new(name, CURA.as_bytes().to_vec())).unwrap();
        assert_eq!(extract, parse_gcode(CURA), "{}", name);
    }
}

#[test]
fn test_from_bytes_matches_decode() {
    let via_bytes = SlicerExtract::from_bytes("a.gcode", PRUSASLICER.as_bytes()).unwrap();
    let via_doc = decode(RawDocument::new("a.gcode", PRUSASLICER)).unwrap();
    assert_eq!(via_bytes, via_doc);
}

#[test]
fn test_serializes_to_json() {
    let json = serde_json::to_value(parse_gcode(PRUSASLICER)).unwrap();
    assert_eq!(json["material_unit"], "grams");
    assert_eq!(json["print_time_hours"], 2.24);
    assert!(json.get("layer_count").is_none());
}
