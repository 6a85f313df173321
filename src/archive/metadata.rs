//! Slicer metadata stored beside the model in a 3MF package
//!
//! Bambu Studio and OrcaSlicer write plate summaries as JSON
//! (`Metadata/plate_1.json`) and XML config parts
//! (`Metadata/slice_info.config`). Each field keeps the first non-zero or
//! non-empty value seen, in archive order.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::DecoderConfig;
use crate::error::Result;
use crate::gcode::parse_number;
use crate::model::{MaterialUnit, SlicerExtract, non_empty};

/// Compile a literal pattern
fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid metadata regex")
}

static ESTIMATED_TIME: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)estimated[_-]?time["\s:=>]+(\d+)"#));
static FILAMENT_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)filament[_-]?weight[_-]?total["\s:=>]+(\d+\.?\d*)"#));
static PRINTER_MODEL: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)printer[_-]?model["\s:=>]+([^"<\n]+)"#));
static PREDICTION_KEY: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)key="prediction"\s+value="(\d+)""#));
static WEIGHT_KEY: LazyLock<Regex> = LazyLock::new(|| regex(r#"(?i)key="weight"\s+value="([\d.]+)""#));
static PRINTER_MODEL_KEY: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)key="printer_model_id"\s+value="([^"]*)""#));
static FILAMENT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)<filament\b[^>]*>"));
static TYPE_ATTR: LazyLock<Regex> = LazyLock::new(|| regex(r#"\btype="([^"]*)""#));
static COLOR_ATTR: LazyLock<Regex> = LazyLock::new(|| regex(r#"\bcolou?r="([^"]*)""#));

/// Metadata gathered across the JSON and XML parts of a package
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveMetadata {
    /// Print time in seconds
    pub print_seconds: f64,
    /// Filament weight in grams
    pub weight_grams: f64,
    /// Printer model
    pub printer_model: Option<String>,
    /// Filament type
    pub material: Option<String>,
    /// Filament colour
    pub color: Option<String>,
}

/// Read a number or a numeric string
fn json_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_string(value: Option<&Value>) -> Option<String> {
    value?.as_str().and_then(non_empty)
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)?.get(1).map(|m| m.as_str())
}

fn fill_number(slot: &mut f64, value: Option<f64>) {
    if *slot == 0.0
        && let Some(value) = value.filter(|v| v.is_finite())
    {
        *slot = value;
    }
}

fn fill_string(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl ArchiveMetadata {
    /// Merge the top-level keys of a JSON part
    pub fn merge_json(&mut self, text: &str) -> Result<()> {
        let json: Value = serde_json::from_str(text)?;

        fill_number(&mut self.print_seconds, json_number(json.get("prediction")));
        fill_number(&mut self.weight_grams, json_number(json.get("weight")));
        fill_number(&mut self.weight_grams, json_number(json.get("filament_used_g")));
        fill_number(&mut self.print_seconds, json_number(json.get("print_time")));
        fill_string(&mut self.printer_model, json_string(json.get("printer_model")));
        fill_string(&mut self.printer_model, json_string(json.get("machine")));
        Ok(())
    }

    /// Merge an XML or `.config` part
    pub fn merge_xml(&mut self, text: &str) {
        let seconds = capture(&ESTIMATED_TIME, text).or_else(|| capture(&PREDICTION_KEY, text));
        fill_number(&mut self.print_seconds, seconds.and_then(|s| s.parse().ok()));

        let weight = capture(&FILAMENT_WEIGHT, text).or_else(|| capture(&WEIGHT_KEY, text));
        fill_number(&mut self.weight_grams, weight.and_then(parse_number));

        let printer = capture(&PRINTER_MODEL, text).or_else(|| capture(&PRINTER_MODEL_KEY, text));
        fill_string(&mut self.printer_model, printer.and_then(non_empty));

        if let Some(filament) = FILAMENT_ELEMENT.find(text) {
            let element = filament.as_str();
            fill_string(&mut self.material, capture(&TYPE_ATTR, element).and_then(non_empty));
            fill_string(&mut self.color, capture(&COLOR_ATTR, element).and_then(non_empty));
        }
    }

    /// Validate and round into a grams record
    pub fn into_extract(self, config: &DecoderConfig) -> SlicerExtract {
        let limits = config.limits();
        let mut extract = SlicerExtract::empty(MaterialUnit::Grams);
        extract.print_time_hours = limits.print_hours_from_seconds(self.print_seconds);
        extract.material_used = limits.material(self.weight_grams);
        extract.printer_model = self.printer_model;
        extract.material = self.material;
        extract.color = self.color;
        extract
    }
}
