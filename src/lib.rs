//! # slicer-extract
//!
//! A pure Rust library for reading print estimates out of 3D-printer slicer
//! output.
//!
//! Uploaded files are decoded into a single normalized [`SlicerExtract`]:
//! print time, material usage, printer model and an embedded preview, plus
//! layer count for resin files and mesh surface area for 3MF packages.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - G-code comment metadata from PrusaSlicer, Cura, OrcaSlicer and Bambu Studio
//! - 3MF packages (ZIP), with embedded G-code, slicer metadata parts and mesh
//!   surface area
//! - Resin formats: Creality CXDLPV4, CHITUBOX CTB/CBDDLP/FDG, Anycubic
//!   Photon/PWMO/GOO, and a heuristic scan for SL1/SL1S/FORM
//! - Preview images decoded from RGB565 and re-encoded as PNG
//!
//! Malformed input never panics and never fails a supported file: fields that
//! cannot be recovered, or that fall outside [`PlausibilityLimits`], are left
//! empty. Check [`SlicerExtract::has_core_data`] to know whether anything
//! useful was found.
//!
//! ## Example
//!
//! ```no_run
//! use slicer_extract::{RawDocument, decode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("benchy.3mf")?;
//! let extract = decode(RawDocument::new("benchy.3mf", bytes))?;
//!
//! println!(
//!     "{:.2} h, {} {:?}",
//!     extract.print_time_hours, extract.material_used, extract.material_unit
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod binary;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gcode;
pub mod model;

pub use archive::{parse_3mf, parse_3mf_with_config};
pub use config::{DecoderConfig, PlausibilityLimits};
pub use dispatch::{FormatFamily, decode, decode_with_config};
pub use error::{Error, Result};
pub use gcode::{extract_thumbnail, parse_gcode, parse_gcode_with_config};
pub use model::{ImageFormat, MaterialUnit, RawDocument, SlicerExtract, Thumbnail};
