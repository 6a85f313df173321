//! G-code comment metadata
//!
//! Slicers write their estimates as comments in the G-code header or footer,
//! each with its own wording:
//!
//! ```text
//! ; estimated printing time (normal mode) = 1h 23m 45s   (PrusaSlicer)
//! ;TIME:5025                                             (Cura)
//! ; total filament weight [g] : 12.34                     (Bambu/Orca)
//! ; filament used [mm] = 4140.2
//! ```
//!
//! Every field has an ordered list of case-insensitive patterns; the first
//! pattern that matches anywhere in the text wins.

pub mod thumbnail;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{DecoderConfig, round_to};
use crate::model::{MaterialUnit, SlicerExtract, non_empty};

pub use thumbnail::extract_thumbnail;

/// Compile a literal pattern
fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid G-code metadata regex")
}

/// Compile a list of literal patterns, keeping their order
fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|pattern| regex(pattern)).collect()
}

static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)total filament weight\s*\[g\]\s*[:=]\s*([\d.]+)",
        r"(?i)total filament used\s*\[g\]\s*[:=]\s*([\d.]+)",
        r"(?i)filament used\s*\[g\]\s*[:=]\s*([\d.]+)",
        r"(?i)total filament used\s*[:=]\s*([\d.]+)\s*g",
        r"(?i)filament used\s*[:=]\s*([\d.]+)\s*g",
        r"(?i);\s*filament\s*used\s*\[g\]\s*=\s*([\d.]+)",
        r"(?i);\s*total\s*filament\s*weight\s*=\s*([\d.]+)",
    ])
});

/// Length patterns with the factor converting the capture to millimetres
static LENGTH_PATTERNS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"(?i)filament used\s*\[mm\]\s*=\s*([\d.]+)", 1.0),
        // metres, but not "mm"
        (r"(?i)filament\s*used\s*[:=]\s*([\d.]+)\s*m(?:[^m]|$)", 1000.0),
        (r"(?i)filament\s*used\s*[:=]\s*([\d.]+)\s*mm", 1.0),
    ]
    .into_iter()
    .map(|(pattern, factor)| (regex(pattern), factor))
    .collect()
});

static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)estimated printing time\s*(?:\(normal mode\))?\s*[:=]\s*(.+)",
        r"(?i)estimated time\s*[:=]\s*(.+)",
        r"(?i);\s*TIME:\s*(\d+)",
        r"(?i)print time\s*[:=]\s*(.+)",
    ])
});

static PRINTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i);\s*printer_model\s*[:=]\s*(.+)",
        r"(?i);\s*machine_model\s*[:=]\s*(.+)",
        r"(?i);\s*printer\s*[:=]\s*(.+)",
        r"(?i);\s*machine\s*[:=]\s*(.+)",
        r"(?i);\s*printer_type\s*[:=]\s*(.+)",
        r"(?i);\s*Generated\s*with\s*(.+?)\s*printer",
        r"(?i);\s*device\s*[:=]\s*(.+)",
    ])
});

static COLOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i);\s*filament_colour\s*[:=]\s*(.+)",
        r"(?i);\s*filament_color\s*[:=]\s*(.+)",
        r"(?i);\s*extruder_colour\s*[:=]\s*(.+)",
        r"(?i);\s*extruder_color\s*[:=]\s*(.+)",
    ])
});

static MATERIAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i);\s*filament_settings_id\s*[:=]\s*(.+)",
        r"(?i);\s*filament_type\s*[:=]\s*(.+)",
        r"(?i);\s*material_type\s*[:=]\s*(.+)",
        r"(?i);\s*material_name\s*[:=]\s*(.+)",
    ])
});

/// Duration components; a minutes `m` must not be followed by `s`
static DURATION_PARTS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"(?i)(\d+)\s*d", 86_400.0),
        (r"(?i)(\d+)\s*h", 3_600.0),
        (r"(?i)(\d+)\s*m(?:[^s]|$)", 60.0),
        (r"(?i)(\d+)\s*s", 1.0),
    ]
    .into_iter()
    .map(|(pattern, factor)| (regex(pattern), factor))
    .collect()
});

/// First capture group of the first matching pattern
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
}

/// Parse the leading decimal number of a `[\d.]+` capture
///
/// Extra dots end the number, so `1.2.3` reads as `1.2`.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = text
        .char_indices()
        .find(|&(_, c)| match c {
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            c => !c.is_ascii_digit(),
        })
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().ok()
}

/// Convert a time capture to seconds
///
/// A pure digit string is seconds (Cura). Anything else is read as a
/// combination of `Nd`, `Nh`, `Nm` and `Ns` components, any subset allowed.
pub fn parse_duration_seconds(value: &str) -> f64 {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().unwrap_or(0.0);
    }

    DURATION_PARTS
        .iter()
        .filter_map(|(re, factor)| {
            let caps = re.captures(value)?;
            let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
            Some(amount * factor)
        })
        .sum()
}

/// Filament length in millimetres from the length patterns
fn filament_length_mm(text: &str) -> f64 {
    LENGTH_PATTERNS
        .iter()
        .find_map(|(re, factor)| {
            let caps = re.captures(text)?;
            let value = parse_number(caps.get(1)?.as_str())?;
            Some(value * factor)
        })
        .unwrap_or(0.0)
}

/// Parse G-code text with the default configuration
pub fn parse_gcode(text: &str) -> SlicerExtract {
    parse_gcode_with_config(text, &DecoderConfig::default())
}

/// Parse G-code text
///
/// When only a filament length is found, the weight is estimated with
/// [`DecoderConfig::filament_grams_per_mm`]. Values outside the configured
/// limits are dropped.
pub fn parse_gcode_with_config(text: &str, config: &DecoderConfig) -> SlicerExtract {
    let limits = config.limits();

    let mut weight = first_capture(&WEIGHT_PATTERNS, text)
        .and_then(parse_number)
        .unwrap_or(0.0);
    let length = filament_length_mm(text);
    if length > 0.0 && weight == 0.0 {
        weight = length * config.filament_grams_per_mm();
        tracing::debug!(length, weight, "estimated filament weight from length");
    }

    let seconds = first_capture(&TIME_PATTERNS, text)
        .map(parse_duration_seconds)
        .unwrap_or(0.0);

    let mut extract = SlicerExtract::empty(MaterialUnit::Grams);
    extract.print_time_hours = limits.print_hours_from_seconds(seconds);
    extract.material_used = limits.material(weight);
    extract.filament_length_mm = (length.is_finite() && length > 0.0).then(|| round_to(length, 1));
    extract.printer_model = first_capture(&PRINTER_PATTERNS, text).and_then(non_empty);
    extract.color = first_capture(&COLOR_PATTERNS, text).and_then(non_empty);
    extract.material = first_capture(&MATERIAL_PATTERNS, text).and_then(non_empty);
    extract.thumbnail = extract_thumbnail(text, config);

    tracing::debug!(
        seconds,
        weight,
        length,
        printer = ?extract.printer_model,
        "G-code metadata"
    );
    extract
}
