//! Fixture builders shared by the integration tests
//!
//! Every fixture is generated in memory so the tests do not depend on
//! slicer output checked into the repository.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Build a ZIP archive from `(name, contents)` pairs, in order
pub fn zip_package(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A 10 mm cube as a 3MF model part, optionally with a build item transform
pub fn cube_model(transform: Option<&str>) -> String {
    let vertices = [
        (0, 0, 0),
        (10, 0, 0),
        (10, 10, 0),
        (0, 10, 0),
        (0, 0, 10),
        (10, 0, 10),
        (10, 10, 10),
        (0, 10, 10),
    ];
    let triangles = [
        (0, 2, 1),
        (0, 3, 2),
        (4, 5, 6),
        (4, 6, 7),
        (0, 1, 5),
        (0, 5, 4),
        (1, 2, 6),
        (1, 6, 5),
        (2, 3, 7),
        (2, 7, 6),
        (3, 0, 4),
        (3, 4, 7),
    ];

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1" type="model">
      <mesh>
        <vertices>
"#,
    );
    for (x, y, z) in vertices {
        xml.push_str(&format!(
            "          <vertex x=\"{}\" y=\"{}\" z=\"{}\"/>\n",
            x, y, z
        ));
    }
    xml.push_str("        </vertices>\n        <triangles>\n");
    for (v1, v2, v3) in triangles {
        xml.push_str(&format!(
            "          <triangle v1=\"{}\" v2=\"{}\" v3=\"{}\"/>\n",
            v1, v2, v3
        ));
    }
    xml.push_str("        </triangles>\n      </mesh>\n    </object>\n  </resources>\n  <build>\n");
    match transform {
        Some(t) => xml.push_str(&format!("    <item objectid=\"1\" transform=\"{}\"/>\n", t)),
        None => xml.push_str("    <item objectid=\"1\"/>\n"),
    }
    xml.push_str("  </build>\n</model>\n");
    xml
}

/// A valid 2×2 PNG
pub fn tiny_png() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 128, 0]));
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

/// Wrap base64 text into a commented G-code thumbnail block
pub fn gcode_thumbnail_block(marker: &str, width: u32, height: u32, base64: &str) -> String {
    let mut block = format!("; {} begin {}x{} {}\n", marker, width, height, base64.len());
    for line in base64.as_bytes().chunks(78) {
        block.push_str("; ");
        block.push_str(std::str::from_utf8(line).unwrap());
        block.push('\n');
    }
    block.push_str(&format!("; {} end\n;\n", marker));
    block
}

/// Fields of a synthetic CTB file
pub struct CtbFixture {
    pub magic: u32,
    pub print_time: u32,
    pub layer_count: u32,
    pub volume: Option<f32>,
}

impl Default for CtbFixture {
    fn default() -> Self {
        Self {
            magic: 0x12FD_0086,
            print_time: 9000,
            layer_count: 1500,
            volume: Some(42.8),
        }
    }
}

impl CtbFixture {
    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&self.magic.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        for v in [68.04f32, 120.96, 150.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 8]);
        for v in [75.0f32, 0.05, 2.0, 25.0, 0.5] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let params_offset = if self.volume.is_some() { 92u32 } else { 0 };
        for v in [
            5,
            1620,
            2560,
            0,
            0,
            self.layer_count,
            0,
            self.print_time,
            0,
            params_offset,
            32,
        ] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        if let Some(volume) = self.volume {
            for v in [6.0f32, 65.0, 6.0, 80.0, 150.0, volume, 45.0, 0.0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        data.extend_from_slice(&[0u8; 64]);
        data
    }
}

/// A CXDLPV4 file with the given printer model, print time and volume
pub fn cxdlp_file(model: &str, print_time: u32, volume: f32) -> Vec<u8> {
    let magic = b"CXSW3DV2\0";
    let mut data = Vec::new();
    data.extend_from_slice(&(magic.len() as u32).to_be_bytes());
    data.extend_from_slice(magic);
    data.extend_from_slice(&2u16.to_be_bytes());
    data.extend_from_slice(&((model.len() + 1) as u32).to_be_bytes());
    data.extend_from_slice(model.as_bytes());
    data.push(0);
    data.extend_from_slice(&3840u16.to_le_bytes());
    data.extend_from_slice(&2400u16.to_le_bytes());
    for v in [192.0f32, 120.0, 200.0, 30.0, 0.05] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    let params_offset = data.len() as u32 + 36;
    for v in [6u32, 0, 0, 600, 0, print_time, 0, params_offset] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    // padding up to the parameters block
    data.extend_from_slice(&[0u8; 4]);
    assert_eq!(data.len() as u32, params_offset);
    for v in [5.0f32, 60.0, 5.0, 60.0, 150.0, volume, 0.0, 0.0] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data
}
