//! Numeric converter helpers
//!
//! Rounding is a display nicety: it is applied on the way out of the
//! standard unit only, never on the way back, so that repeated round trips
//! through the model do not compound precision loss.

use gauge_core::{ConversionError, Value};
use crate::ConverterPair;

/// Round to `decimals` digits after the decimal point
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let order = 10f64.powi(decimals as i32);
    (value * order).round() / order
}

fn finite(value: f64) -> Result<f64, ConversionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConversionError::NonFinite(value))
    }
}

fn not_numeric(value: &Value) -> Result<Value, ConversionError> {
    Err(ConversionError::TypeMismatch { expected: "Number", got: value.type_name() })
}

/// Converter for a proportional unit: `display = canonical * factor`.
///
/// Composite values are converted leaf by leaf and absent (`Null`) leaves
/// pass through unchanged.
pub fn factor_converter(factor: f64, max_decimals: Option<u32>) -> ConverterPair {
    linear_converter(factor, 0.0, max_decimals)
}

/// Converter for an affine unit: `display = canonical * factor + offset`
/// (e.g. Celsius to Fahrenheit).
pub fn linear_converter(factor: f64, offset: f64, max_decimals: Option<u32>) -> ConverterPair {
    ConverterPair::new(
        move |value| {
            value.try_map_numbers(
                &|v| {
                    let display = finite(v)? * factor + offset;
                    Ok(match max_decimals {
                        Some(decimals) => round_to(display, decimals),
                        None => display,
                    })
                },
                &not_numeric,
            )
        },
        move |value| value.try_map_numbers(&|v| Ok((finite(v)? - offset) / factor), &not_numeric),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Converter;

    fn approx(a: &Value, b: f64) -> bool {
        a.as_number().map_or(false, |a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(59.05511805, 1), 59.1);
        assert_eq!(round_to(149.6, 0), 150.0);
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-2.25, 1), -2.3);
    }

    #[test]
    fn test_factor_from_canonical_rounds() {
        let inch = factor_converter(39.3700787, Some(1));
        assert_eq!(inch.from_canonical(&Value::from(1.5)).unwrap(), Value::from(59.1));
    }

    #[test]
    fn test_zero_decimals_rounds_to_integer() {
        let cm = factor_converter(100.0, Some(0));
        assert_eq!(cm.from_canonical(&Value::from(1.234)).unwrap(), Value::from(123.0));
    }

    #[test]
    fn test_to_canonical_never_rounds() {
        let inch = factor_converter(39.3700787, Some(1));
        let std = inch.to_canonical(&Value::from(59.12345)).unwrap();
        assert!(approx(&std, 59.12345 / 39.3700787));
    }

    #[test]
    fn test_no_decimals_keeps_precision() {
        let cm = factor_converter(100.0, None);
        assert!(approx(&cm.from_canonical(&Value::from(0.123456)).unwrap(), 12.3456));
    }

    #[test]
    fn test_factor_composite_fieldwise() {
        let cm = factor_converter(100.0, Some(0));
        let v = Value::object([("a", Value::from(1.5)), ("b", Value::Null)]);
        assert_eq!(
            cm.from_canonical(&v).unwrap(),
            Value::object([("a", Value::from(150.0)), ("b", Value::Null)])
        );
    }

    #[test]
    fn test_factor_rejects_text() {
        let cm = factor_converter(100.0, Some(0));
        let err = cm.to_canonical(&Value::from("abc")).unwrap_err();
        assert_eq!(err, ConversionError::TypeMismatch { expected: "Number", got: "Text" });
    }

    #[test]
    fn test_factor_rejects_nan() {
        let cm = factor_converter(100.0, Some(0));
        assert!(matches!(
            cm.to_canonical(&Value::from(f64::NAN)),
            Err(ConversionError::NonFinite(_))
        ));
    }

    #[test]
    fn test_linear_round_trip() {
        let fahrenheit = linear_converter(1.8, 32.0, None);
        let display = fahrenheit.from_canonical(&Value::from(100.0)).unwrap();
        assert!(approx(&display, 212.0));
        let back = fahrenheit.to_canonical(&display).unwrap();
        assert!(approx(&back, 100.0));
    }
}
