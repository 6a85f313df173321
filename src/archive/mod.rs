//! 3MF package decoding
//!
//! A 3MF file is a ZIP archive. Sliced packages from Bambu Studio,
//! OrcaSlicer and PrusaSlicer may carry the G-code itself, which is the most
//! reliable source; otherwise the walker falls back through slicer metadata
//! parts, the model mesh and finally any preview image.
//!
//! ## Walk order
//!
//! 1. An embedded `.gcode` entry (one under `Metadata/` preferred) is parsed
//!    as G-code. A `.png` preview is overlaid when the G-code has none.
//! 2. Otherwise every `.json`, `.xml` and `.config` entry is scanned
//!    ([`metadata`]).
//! 3. The mesh surface area is computed from the model part ([`mesh`]).
//! 4. The first preview image in the package becomes the thumbnail.

pub mod mesh;
pub mod metadata;

use std::io::{Cursor, Read, Seek};

use zip::ZipArchive;

use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::gcode::parse_gcode_with_config;
use crate::model::{ImageFormat, MaterialUnit, SlicerExtract, Thumbnail};
use metadata::ArchiveMetadata;

/// Folder slicers store their metadata parts in, lower-cased
const METADATA_DIR: &str = "metadata/";

/// Conventional model part name suffix
const MODEL_SUFFIX: &str = "3dmodel.model";

/// A ZIP package opened for reading
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from a reader
    pub fn open(reader: R) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Names of all file entries, in archive order
    pub fn file_names(&mut self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| {
                self.archive
                    .by_index(i)
                    .ok()
                    .filter(|f| !f.is_dir())
                    .map(|f| f.name().to_string())
            })
            .collect()
    }

    /// Read an entry as text, replacing invalid UTF-8
    pub fn get_file(&mut self, name: &str) -> Result<String> {
        let bytes = self.get_file_binary(name)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read an entry as bytes
    pub fn get_file_binary(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingEntry(name.to_string()))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }
}

/// Entry names with their lower-cased form for matching
struct Entries {
    names: Vec<(String, String)>,
}

impl Entries {
    fn new(names: Vec<String>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|name| {
                    let lower = name.to_ascii_lowercase();
                    (name, lower)
                })
                .collect(),
        }
    }

    fn find(&self, predicate: impl Fn(&str) -> bool) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, lower)| predicate(lower.as_str()))
            .map(|(name, _)| name.as_str())
    }

    fn filter<'a>(&'a self, predicate: impl Fn(&str) -> bool + 'a) -> impl Iterator<Item = &'a str> + 'a {
        self.names
            .iter()
            .filter(move |(_, lower)| predicate(lower.as_str()))
            .map(|(name, _)| name.as_str())
    }

    /// Embedded G-code, preferring one under `Metadata/`
    fn gcode(&self) -> Option<&str> {
        self.find(|n| n.starts_with(METADATA_DIR) && n.ends_with(".gcode"))
            .or_else(|| self.find(|n| n.ends_with(".gcode")))
    }

    /// PNG preview for a G-code package
    fn gcode_preview(&self) -> Option<&str> {
        self.find(|n| n.ends_with(".png") && (n.starts_with(METADATA_DIR) || n.contains("thumbnail")))
    }

    /// Model part, preferring the conventional name
    fn model(&self) -> Option<&str> {
        self.find(|n| n.ends_with(MODEL_SUFFIX))
            .or_else(|| self.find(|n| n.ends_with(".model")))
    }

    /// Any PNG or JPEG that looks like a preview
    fn preview(&self) -> Option<&str> {
        self.find(|n| {
            ImageFormat::from_file_name(n).is_some()
                && (n.contains("thumbnail") || n.contains("preview") || n.starts_with(METADATA_DIR))
        })
    }
}

/// Read an image entry into a thumbnail
fn read_thumbnail<R: Read + Seek>(
    package: &mut Package<R>,
    name: &str,
    format: ImageFormat,
) -> Option<Thumbnail> {
    match package.get_file_binary(name) {
        Ok(bytes) if !bytes.is_empty() => Some(Thumbnail::from_bytes(format, &bytes)),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(%err, entry = name, "failed to read preview entry");
            None
        }
    }
}

/// Parse a 3MF package with the default configuration
pub fn parse_3mf(bytes: &[u8]) -> SlicerExtract {
    parse_3mf_with_config(bytes, &DecoderConfig::default())
}

/// Parse a 3MF package
///
/// Input that is not a readable ZIP archive yields an empty grams record.
pub fn parse_3mf_with_config(bytes: &[u8], config: &DecoderConfig) -> SlicerExtract {
    match Package::open(Cursor::new(bytes)) {
        Ok(mut package) => walk(&mut package, config),
        Err(err) => {
            tracing::debug!(%err, "not a readable 3MF archive");
            SlicerExtract::empty(MaterialUnit::Grams)
        }
    }
}

fn walk<R: Read + Seek>(package: &mut Package<R>, config: &DecoderConfig) -> SlicerExtract {
    let entries = Entries::new(package.file_names());

    if let Some(name) = entries.gcode() {
        match package.get_file(name) {
            Ok(text) => {
                tracing::debug!(entry = name, "parsing embedded G-code");
                let mut extract = parse_gcode_with_config(&text, config);
                if extract.thumbnail.is_none()
                    && let Some(preview) = entries.gcode_preview()
                {
                    extract.thumbnail = read_thumbnail(package, preview, ImageFormat::Png);
                }
                return extract;
            }
            Err(err) => tracing::warn!(%err, entry = name, "failed to read embedded G-code"),
        }
    }

    let mut meta = ArchiveMetadata::default();
    let is_metadata = |n: &str| n.ends_with(".json") || n.ends_with(".xml") || n.ends_with(".config");
    for name in entries.filter(is_metadata) {
        let text = match package.get_file(name) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(%err, entry = name, "skipping unreadable entry");
                continue;
            }
        };
        if name.to_ascii_lowercase().ends_with(".json") {
            if let Err(err) = meta.merge_json(&text) {
                tracing::debug!(%err, entry = name, "skipping unparsable JSON entry");
            }
        } else {
            meta.merge_xml(&text);
        }
    }
    tracing::debug!(?meta, "3MF metadata");

    let mut extract = meta.into_extract(config);

    if config.surface_area()
        && let Some(model) = entries.model()
    {
        extract.surface_area_mm2 = match package.get_file(model).and_then(|xml| mesh::surface_area(&xml)) {
            Ok(area) => area,
            Err(err) => {
                tracing::warn!(%err, entry = model, "failed to compute mesh surface area");
                None
            }
        };
    }

    if let Some(name) = entries.preview()
        && let Some(format) = ImageFormat::from_file_name(name)
    {
        extract.thumbnail = read_thumbnail(package, name, format);
    }

    extract
}
