#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // ZIP extraction -> metadata scan -> mesh surface area -> preview
    let extract = slicer_extract::parse_3mf(data);
    assert!(extract.surface_area_mm2.is_none_or(|area| area > 0.0));
});
