//! Temperature: celsius (standard), fahrenheit, kelvin

use std::sync::LazyLock;
use gauge_core::ConfigurationError;
use crate::{linear_converter, numeric_renderer, DisplayFormatter, Precision, Unit, UnitSystem};

pub static TEMPERATURE: LazyLock<UnitSystem> = LazyLock::new(|| match temperature_system() {
    Ok(system) => system,
    Err(e) => panic!("invalid built-in unit system: {}", e),
});

pub fn temperature_system() -> Result<UnitSystem, ConfigurationError> {
    UnitSystem::builder("temperature")
        .unit(Unit::standard("celsius", "Celsius").with_symbol("°C"))
        .unit(Unit::converted("fahrenheit", "Fahrenheit", linear_converter(1.8, 32.0, Some(1))).with_symbol("°F"))
        .unit(Unit::converted("kelvin", "Kelvin", linear_converter(1.0, 273.15, Some(2))).with_symbol("K"))
        .build()
}

pub fn temperature_precision(unit: &str) -> Precision {
    match unit {
        "kelvin" => Precision::fixed(2),
        _ => Precision::range(0, 1),
    }
}

pub fn temperature_formatter() -> DisplayFormatter {
    DisplayFormatter::new(TEMPERATURE.clone()).with_renderer(numeric_renderer(temperature_precision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_in;
    use gauge_core::Value;

    #[test]
    fn test_fahrenheit() {
        assert_eq!(display_in(&Value::from(100.0), &TEMPERATURE, Some("fahrenheit")).unwrap(), Value::from(212.0));
        let c = TEMPERATURE.resolve_unit(Some("fahrenheit")).to_canonical(&Value::from(32.0)).unwrap();
        assert_eq!(c, Value::from(0.0));
    }

    #[test]
    fn test_kelvin() {
        assert_eq!(display_in(&Value::from(0.0), &TEMPERATURE, Some("kelvin")).unwrap(), Value::from(273.15));
    }

    #[test]
    fn test_formatter() {
        let fmt = temperature_formatter();
        assert_eq!(fmt.format(&Value::from(21.5), None), "21.5°C");
        assert_eq!(fmt.format(&Value::from(20.0), Some("fahrenheit")), "68°F");
        assert_eq!(fmt.format(&Value::from(20.0), Some("kelvin")), "293.15K");
    }
}
