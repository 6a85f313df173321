#![no_main]

use libfuzzer_sys::fuzz_target;
use slicer_extract::SlicerExtract;

const EXTENSIONS: [&str; 10] = [
    "ctb", "cbddlp", "fdg", "cxdlpv4", "goo", "photon", "pwmo", "sl1", "sl1s", "form",
];

fuzz_target!(|data: &[u8]| {
    // The first byte picks the extension so one corpus drives every chain
    let Some((&selector, bytes)) = data.split_first() else {
        return;
    };
    let name = format!("fuzz.{}", EXTENSIONS[selector as usize % EXTENSIONS.len()]);

    let extract = SlicerExtract::from_bytes(&name, bytes).expect("resin extensions are supported");
    assert!(extract.print_time_hours >= 0.0);
    assert!(extract.material_used >= 0.0);
});
