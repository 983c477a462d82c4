//! Length: meter (standard), centimeter, inch

use std::sync::LazyLock;
use gauge_core::ConfigurationError;
use crate::{factor_converter, numeric_renderer, DisplayFormatter, Precision, Unit, UnitSystem};

/// Inches per meter
pub const INCHES_PER_METER: f64 = 39.3700787;

pub static LENGTH: LazyLock<UnitSystem> = LazyLock::new(|| match length_system() {
    Ok(system) => system,
    Err(e) => panic!("invalid built-in unit system: {}", e),
});

pub fn length_system() -> Result<UnitSystem, ConfigurationError> {
    UnitSystem::builder("length")
        .unit(Unit::standard("meter", "Meter").with_symbol("m"))
        .unit(Unit::converted("centimeter", "Centimeter", factor_converter(100.0, Some(0))).with_symbol("cm"))
        .unit(Unit::converted("inch", "Inch", factor_converter(INCHES_PER_METER, Some(1))).with_symbol("in"))
        .build()
}

/// Fraction digits shown per length unit
pub fn length_precision(unit: &str) -> Precision {
    match unit {
        "meter" => Precision::fixed(2),
        "centimeter" => Precision::fixed(0),
        "inch" => Precision::fixed(1),
        _ => Precision::default(),
    }
}

pub fn length_formatter() -> DisplayFormatter {
    DisplayFormatter::new(LENGTH.clone()).with_renderer(numeric_renderer(length_precision))
}
