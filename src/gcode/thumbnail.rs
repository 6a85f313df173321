//! Inline preview blocks in G-code comments
//!
//! PrusaSlicer, SuperSlicer, OrcaSlicer and Bambu Studio embed previews as
//! commented base64:
//!
//! ```text
//! ; thumbnail begin 300x300 12345
//! ; iVBORw0KGgoAAAANSUhEUgAA...
//! ; thumbnail end
//! ```
//!
//! JPEG previews use `thumbnail_JPG` markers instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::DecoderConfig;
use crate::model::{ImageFormat, Thumbnail};

static BEGIN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i);\s*thumbnail(?:_JPG)?\s+begin\s+(\d+)[xX](\d+)\s+(\d+)")
        .expect("invalid thumbnail begin regex")
});

static END_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i);\s*thumbnail(?:_JPG)?\s+end").expect("invalid thumbnail end regex")
});

static COMMENT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*;[ \t]*").expect("invalid comment prefix regex"));

/// A `thumbnail begin` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockStart {
    /// Byte offset of the marker
    offset: usize,
    pixels: u64,
    format: ImageFormat,
}

/// Pick the largest preview; the first one wins on ties
fn largest_block(text: &str) -> Option<BlockStart> {
    let mut best: Option<BlockStart> = None;
    for caps in BEGIN_MARKER.captures_iter(text) {
        let (Some(marker), Some(width), Some(height)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let width: u64 = width.as_str().parse().unwrap_or(0);
        let height: u64 = height.as_str().parse().unwrap_or(0);
        let pixels = width.saturating_mul(height);

        if best.is_none_or(|b| pixels > b.pixels) {
            let format = if marker.as_str().to_ascii_lowercase().contains("jpg") {
                ImageFormat::Jpeg
            } else {
                ImageFormat::Png
            };
            best = Some(BlockStart {
                offset: marker.start(),
                pixels,
                format,
            });
        }
    }
    best.filter(|b| b.pixels > 0)
}

/// Largest non-negative index `<= index` that lies on a char boundary
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Extract the largest embedded preview
///
/// The end marker must appear within `config.thumbnail_search_window()` bytes
/// of the block start, and the reassembled base64 must be longer than
/// `config.thumbnail_min_len()` characters.
pub fn extract_thumbnail(text: &str, config: &DecoderConfig) -> Option<Thumbnail> {
    let block = largest_block(text)?;
    let block_start = text[block.offset..].find('\n')? + block.offset + 1;

    let window_end = floor_char_boundary(text, block_start.saturating_add(config.thumbnail_search_window()));
    let window = &text[block_start..window_end];
    let end = END_MARKER.find(window)?.start();

    let stripped = COMMENT_PREFIX.replace_all(&window[..end], "");
    let base64: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    if base64.len() <= config.thumbnail_min_len() {
        tracing::debug!(len = base64.len(), "thumbnail block too short");
        return None;
    }
    Some(Thumbnail::new(block.format, base64))
}
