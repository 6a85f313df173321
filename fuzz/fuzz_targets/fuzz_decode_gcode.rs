#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let extract = slicer_extract::parse_gcode(&text);

    // Thumbnail search slices the text by byte windows
    let _ = slicer_extract::extract_thumbnail(&text, &slicer_extract::DecoderConfig::default());
    assert!(extract.print_time_hours <= 100.0);
});
