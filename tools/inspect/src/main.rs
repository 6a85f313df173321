//! Slicer file inspector
//!
//! Prints the record slicer-extract produces for each file as pretty JSON,
//! optionally writing the decoded thumbnails into a directory.
//!
//! ```text
//! slicer-inspect plate.3mf part.gcode --thumbnail previews/ -v
//! ```

#![forbid(unsafe_code)]

use clap::Parser;
use slicer_extract::{SlicerExtract, Thumbnail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slicer output files (.gcode, .3mf, .ctb, .cxdlpv4, .goo, ...)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory to write decoded thumbnails into
    #[arg(short, long, value_name = "DIR")]
    thumbnail: Option<PathBuf>,

    /// Skip the 3MF mesh surface-area pass
    #[arg(long)]
    no_surface_area: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "slicer_extract=debug",
        _ => "slicer_extract=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_thumbnail(dir: &Path, source: &Path, thumbnail: &Thumbnail) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    let path = dir.join(format!("{}.{}", stem, thumbnail.format.extension()));
    fs::create_dir_all(dir)?;
    fs::write(&path, thumbnail.decode()?)?;
    Ok(path)
}

fn inspect(path: &Path, args: &Args) -> Result<SlicerExtract, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config = slicer_extract::DecoderConfig::new().with_surface_area(!args.no_surface_area);
    let extract = SlicerExtract::from_bytes_with_config(&name, &bytes, &config)?;

    if let Some(dir) = &args.thumbnail
        && let Some(thumbnail) = &extract.thumbnail
    {
        let written = write_thumbnail(dir, path, thumbnail)?;
        eprintln!("thumbnail: {}", written.display());
    }
    Ok(extract)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut failed = false;
    for path in &args.files {
        match inspect(path, &args) {
            Ok(extract) => match serde_json::to_string_pretty(&extract) {
                Ok(json) => println!("{}: {}", path.display(), json),
                Err(err) => {
                    eprintln!("{}: {}", path.display(), err);
                    failed = true;
                }
            },
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
