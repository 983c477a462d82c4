//! Display formatting of canonical values
//!
//! Read-only projection of a standard unit value into a chosen unit, with
//! an optional rendering step that produces a human-readable string.

use gauge_core::{ConversionError, Value};
use num_format::{Locale, ToFormattedString};
use tracing::debug;
use crate::{round_to, Unit, UnitSystem};

/// Convert a standard unit value into `unit`
pub fn display(value: &Value, unit: &Unit) -> Result<Value, ConversionError> {
    unit.from_canonical(value)
}

/// Convert a standard unit value into the named unit of `system`.
/// If the name is absent or unknown, the standard unit is used.
pub fn display_in(value: &Value, system: &UnitSystem, unit_name: Option<&str>) -> Result<Value, ConversionError> {
    display(value, system.resolve_unit(unit_name))
}

/// Number of fraction digits shown for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub min_fraction: usize,
    pub max_fraction: usize,
}

impl Precision {
    /// Always exactly `digits` fraction digits
    pub const fn fixed(digits: usize) -> Self {
        Precision { min_fraction: digits, max_fraction: digits }
    }

    pub const fn range(min_fraction: usize, max_fraction: usize) -> Self {
        Precision { min_fraction, max_fraction }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::range(0, 3)
    }
}

/// Format a number with en-US digit grouping, e.g. `1234.5` -> `"1,234.50"`
/// for `Precision::fixed(2)`.
pub fn format_number(value: f64, precision: Precision) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Ties round away from zero, as the converters do
    let rounded = round_to(value.abs(), precision.max_fraction as u32);
    let rounded = if rounded.is_finite() { rounded } else { value.abs() };
    let fixed = format!("{:.*}", precision.max_fraction, rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.to_string();
    while frac.len() > precision.min_fraction && frac.ends_with('0') {
        frac.pop();
    }

    let grouped = int_part
        .parse::<u64>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    let is_zero = int_part.chars().chain(frac.chars()).all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

type RenderFn = dyn Fn(&Value, &Unit) -> Result<String, ConversionError> + Send + Sync;

/// Text shown when a value cannot be converted or rendered
pub const DEFAULT_SENTINEL: &str = "Invalid value";

/// Formats standard unit values of one unit system as strings.
///
/// Rendering is a per-system callback receiving the already converted
/// value and the resolved unit. Failures never escape [`format`]: they
/// are replaced by a fixed sentinel text.
///
/// [`format`]: DisplayFormatter::format
pub struct DisplayFormatter {
    system: UnitSystem,
    renderer: Box<RenderFn>,
    sentinel: String,
}

impl DisplayFormatter {
    /// Formatter rendering `value` followed by the unit symbol
    pub fn new(system: UnitSystem) -> Self {
        DisplayFormatter {
            system,
            renderer: Box::new(|value: &Value, unit: &Unit| Ok(format!("{}{}", value, unit.symbol()))),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value, &Unit) -> Result<String, ConversionError> + Send + Sync + 'static,
    {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_sentinel(mut self, sentinel: &str) -> Self {
        self.sentinel = sentinel.to_string();
        self
    }

    pub fn system(&self) -> &UnitSystem {
        &self.system
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Convert without rendering
    pub fn convert(&self, value: &Value, unit_name: Option<&str>) -> Result<Value, ConversionError> {
        display_in(value, &self.system, unit_name)
    }

    /// Convert and render; returns the sentinel text on failure
    pub fn format(&self, value: &Value, unit_name: Option<&str>) -> String {
        let unit: &Unit = self.system.resolve_unit(unit_name);
        match display(value, unit).and_then(|converted| (self.renderer)(&converted, unit)) {
            Ok(text) => text,
            Err(e) => {
                debug!(system = self.system.name(), unit = %unit.name, error = %e, "formatting failed");
                self.sentinel.clone()
            }
        }
    }
}

/// Renderer for numeric systems: grouped number with per-unit precision,
/// followed by the unit symbol
pub fn numeric_renderer(
    precision: fn(&str) -> Precision,
) -> impl Fn(&Value, &Unit) -> Result<String, ConversionError> + Send + Sync + 'static {
    move |value: &Value, unit: &Unit| match value {
        Value::Number(n) => Ok(format!("{}{}", format_number(*n, precision(&unit.name)), unit.symbol())),
        Value::Null => Ok(String::new()),
        other => Err(ConversionError::TypeMismatch { expected: "Number", got: other.type_name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor_converter;

    fn length() -> UnitSystem {
        UnitSystem::builder("length")
            .unit(Unit::standard("meter", "Meter").with_symbol("m"))
            .unit(Unit::converted("centimeter", "Centimeter", factor_converter(100.0, Some(0))).with_symbol("cm"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_display_standard_is_identity() {
        let system = length();
        let v = Value::from(1.5);
        assert_eq!(display(&v, system.standard_unit()).unwrap(), v);
    }

    #[test]
    fn test_display_in_resolves() {
        let system = length();
        let v = Value::from(1.5);
        assert_eq!(display_in(&v, &system, Some("centimeter")).unwrap(), Value::from(150.0));
        assert_eq!(display_in(&v, &system, Some("furlong")).unwrap(), v);
        assert_eq!(display_in(&v, &system, None).unwrap(), v);
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1234.5, Precision::fixed(2)), "1,234.50");
        assert_eq!(format_number(1234567.0, Precision::fixed(0)), "1,234,567");
        assert_eq!(format_number(59.06, Precision::fixed(1)), "59.1");
    }

    #[test]
    fn test_format_number_rounds_ties_up() {
        assert_eq!(format_number(0.125, Precision::fixed(2)), "0.13");
        assert_eq!(format_number(2.5, Precision::fixed(0)), "3");
        assert_eq!(format_number(-0.125, Precision::fixed(2)), "-0.13");
    }

    #[test]
    fn test_format_number_trims_to_min() {
        assert_eq!(format_number(1.5, Precision::range(0, 3)), "1.5");
        assert_eq!(format_number(2.0, Precision::range(0, 3)), "2");
        assert_eq!(format_number(2.0, Precision::range(1, 3)), "2.0");
    }

    #[test]
    fn test_format_number_sign() {
        assert_eq!(format_number(-1500.26, Precision::fixed(1)), "-1,500.3");
        assert_eq!(format_number(-0.0001, Precision::fixed(2)), "0.00");
    }

    #[test]
    fn test_default_formatter() {
        let fmt = DisplayFormatter::new(length());
        assert_eq!(fmt.format(&Value::from(1.5), Some("centimeter")), "150cm");
        assert_eq!(fmt.format(&Value::from(1.5), None), "1.5m");
    }

    #[test]
    fn test_formatter_sentinel_on_error() {
        let fmt = DisplayFormatter::new(length()).with_sentinel("n/a");
        assert_eq!(fmt.format(&Value::from("abc"), Some("centimeter")), "n/a");
    }

    #[test]
    fn test_numeric_renderer() {
        let fmt = DisplayFormatter::new(length()).with_renderer(numeric_renderer(|name| match name {
            "meter" => Precision::fixed(2),
            _ => Precision::fixed(0),
        }));
        assert_eq!(fmt.format(&Value::from(12.5), Some("centimeter")), "1,250cm");
        assert_eq!(fmt.format(&Value::from(12.5), Some("meter")), "12.50m");
        assert_eq!(fmt.format(&Value::Bool(true), Some("meter")), DEFAULT_SENTINEL);
    }
}
