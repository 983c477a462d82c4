//! Gauge Core - Fundamental types
//!
//! This crate provides the core types used throughout Gauge:
//! - `Value`: Values held by controls (numbers, text, objects, lists)
//! - `ConversionError` / `ConfigurationError`: converter and unit system failures
//! - `GaugeError`: Structured errors for error channels and hosts

mod error;
mod value;

pub use error::{codes, ConfigurationError, ConversionError, GaugeError, Severity};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{ConfigurationError, ConversionError, GaugeError, Severity, Value};
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_conversion_error_is_recoverable() {
            let err: GaugeError = ConversionError::NonFinite(f64::NAN).into();
            assert_eq!(err.code, codes::CONVERSION_ERROR);
            assert_eq!(err.severity, Severity::Error);
            assert!(!err.is_fatal());
        }

        #[test]
        fn test_type_mismatch_code() {
            let err: GaugeError = ConversionError::TypeMismatch { expected: "Number", got: "Text" }.into();
            assert_eq!(err.code, codes::TYPE_ERROR);
            assert_eq!(err.message, "expected Number, got Text");
        }

        #[test]
        fn test_configuration_error_is_fatal() {
            let err: GaugeError = ConfigurationError::NoStandardUnit { system: "length".into() }.into();
            assert_eq!(err.code, codes::NO_STANDARD_UNIT);
            assert!(err.is_fatal());
            assert_eq!(err.message, "unit system 'length' has no standard unit");
        }

        #[test]
        fn test_invalid_projection_is_fatal() {
            let err: GaugeError = ConfigurationError::InvalidProjection {
                definition: "+proj=nonsense".into(),
                reason: "Projection not found".into(),
            }
            .into();
            assert_eq!(err.code, codes::INVALID_PROJECTION);
            assert!(err.is_fatal());
        }

        #[test]
        fn test_multiple_standard_units_message() {
            let err = ConfigurationError::MultipleStandardUnits {
                system: "length".into(),
                units: vec!["meter".into(), "foot".into()],
            };
            assert_eq!(err.to_string(), "unit system 'length' has several standard units: meter, foot");
        }

        #[test]
        fn test_display_with_unit() {
            let err = GaugeError::from(ConversionError::InvalidCoordinates("lat is NaN".into()))
                .in_unit("GGRS87");
            assert_eq!(
                err.to_string(),
                "[CONVERSION_ERROR] Conversion failed: invalid coordinates: lat is NaN (unit: GGRS87)"
            );
        }

        #[test]
        fn test_serialize_skips_empty_fields() {
            let err = GaugeError::new(codes::INVALID_REQUEST, "bad");
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json, serde_json::json!({"code": "INVALID_REQUEST", "message": "bad", "severity": "error"}));
        }
    }
}
