//! Decoder configuration
//!
//! [`DecoderConfig`] carries the plausibility bounds and the few tunable
//! heuristics shared by every decoder. The defaults reproduce the values
//! community slicer tooling has settled on; callers usually pass
//! `DecoderConfig::default()`.

/// Range limits a decoded value must satisfy before it is accepted
///
/// A value outside its range is treated as "not found" and the field is
/// zeroed or omitted. Values are never clamped into range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityLimits {
    /// Upper bound (inclusive) for print time in seconds; the lower bound is exclusive 0
    pub max_print_seconds: u64,
    /// Upper bound (exclusive) for material mass in grams or volume in ml
    pub max_material: f64,
    /// Upper bound (exclusive) for resin layer count
    pub max_layer_count: u32,
}

impl PlausibilityLimits {
    /// Accept a print time in seconds and convert it to hours rounded to 2 decimals
    pub fn print_hours_from_seconds(&self, seconds: f64) -> f64 {
        if seconds.is_finite() && seconds > 0.0 && seconds <= self.max_print_seconds as f64 {
            round_to(seconds / 3600.0, 2)
        } else {
            0.0
        }
    }

    /// Accept a material amount (grams or ml), rounded to 1 decimal
    pub fn material(&self, amount: f64) -> f64 {
        if amount.is_finite() && amount > 0.0 && amount < self.max_material {
            round_to(amount, 1)
        } else {
            0.0
        }
    }

    /// Accept a layer count
    pub fn layer_count(&self, layers: u32) -> Option<u32> {
        (layers > 0 && layers < self.max_layer_count).then_some(layers)
    }
}

impl Default for PlausibilityLimits {
    fn default() -> Self {
        Self {
            max_print_seconds: 360_000,
            max_material: 10_000.0,
            max_layer_count: 100_000,
        }
    }
}

/// Configuration for decoding slicer files
///
/// # Example
///
/// ```
/// use slicer_extract::DecoderConfig;
///
/// let config = DecoderConfig::new()
///     .with_surface_area(false)
///     .with_thumbnail_min_len(64);
/// assert!(!config.surface_area());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    limits: PlausibilityLimits,
    thumbnail_min_len: usize,
    thumbnail_search_window: usize,
    filament_grams_per_mm: f64,
    surface_area: bool,
    previews: bool,
    ctb_fill_factor: f64,
}

impl DecoderConfig {
    /// Create a configuration with default limits and heuristics
    pub fn new() -> Self {
        Self {
            limits: PlausibilityLimits::default(),
            thumbnail_min_len: 100,
            thumbnail_search_window: 50_000,
            // PLA at 1.24 g/cm³ on 1.75 mm filament
            filament_grams_per_mm: 0.00298,
            surface_area: true,
            previews: true,
            ctb_fill_factor: 0.3,
        }
    }

    /// Replace the plausibility limits
    pub fn with_limits(mut self, limits: PlausibilityLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Minimum base64 length for a G-code thumbnail block to be kept
    pub fn with_thumbnail_min_len(mut self, len: usize) -> Self {
        self.thumbnail_min_len = len;
        self
    }

    /// Number of bytes after a thumbnail begin marker searched for its end marker
    pub fn with_thumbnail_search_window(mut self, window: usize) -> Self {
        self.thumbnail_search_window = window;
        self
    }

    /// Grams per millimetre used to estimate weight from filament length alone
    pub fn with_filament_grams_per_mm(mut self, grams_per_mm: f64) -> Self {
        self.filament_grams_per_mm = grams_per_mm;
        self
    }

    /// Enable or disable 3MF mesh surface-area analysis
    pub fn with_surface_area(mut self, enabled: bool) -> Self {
        self.surface_area = enabled;
        self
    }

    /// Enable or disable decoding of resin preview images
    pub fn with_previews(mut self, enabled: bool) -> Self {
        self.previews = enabled;
        self
    }

    /// Fraction of the build plate assumed cured when estimating CTB volume
    pub fn with_ctb_fill_factor(mut self, factor: f64) -> Self {
        self.ctb_fill_factor = factor;
        self
    }

    /// Plausibility limits
    pub fn limits(&self) -> &PlausibilityLimits {
        &self.limits
    }

    /// Minimum base64 length for a G-code thumbnail
    pub fn thumbnail_min_len(&self) -> usize {
        self.thumbnail_min_len
    }

    /// Search window for the thumbnail end marker
    pub fn thumbnail_search_window(&self) -> usize {
        self.thumbnail_search_window
    }

    /// Grams per millimetre of filament
    pub fn filament_grams_per_mm(&self) -> f64 {
        self.filament_grams_per_mm
    }

    /// Whether 3MF surface area is computed
    pub fn surface_area(&self) -> bool {
        self.surface_area
    }

    /// Whether resin previews are decoded
    pub fn previews(&self) -> bool {
        self.previews
    }

    /// CTB fill factor
    pub fn ctb_fill_factor(&self) -> f64 {
        self.ctb_fill_factor
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Round `value` to `decimals` decimal places, half away from zero
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
