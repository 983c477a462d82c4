//! Binding errors

use gauge_core::{ConversionError, GaugeError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// `attach` was called without a control
    #[error("no control to bind")]
    MissingContext,

    #[error("unit '{unit}': {source}")]
    Conversion {
        unit: String,
        #[source]
        source: ConversionError,
    },
}

impl From<SyncError> for GaugeError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::MissingContext => GaugeError::missing_context("no control to bind"),
            SyncError::Conversion { unit, source } => GaugeError::from(source).in_unit(unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::codes;

    #[test]
    fn test_into_gauge_error() {
        let err: GaugeError = SyncError::Conversion {
            unit: "centimeter".into(),
            source: ConversionError::NonFinite(f64::INFINITY),
        }
        .into();
        assert_eq!(err.code, codes::CONVERSION_ERROR);
        assert_eq!(err.unit.as_deref(), Some("centimeter"));

        let err: GaugeError = SyncError::MissingContext.into();
        assert_eq!(err.code, codes::MISSING_CONTEXT);
        assert!(err.is_fatal());
    }
}
