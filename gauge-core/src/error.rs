//! Conversion and configuration errors
//!
//! Converters fail with [`ConversionError`]; unit systems that break the
//! one-standard-unit rule fail with [`ConfigurationError`]. Both translate
//! into the structured [`GaugeError`] that error channels and hosts carry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const CONVERSION_ERROR: &str = "CONVERSION_ERROR";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const NO_STANDARD_UNIT: &str = "NO_STANDARD_UNIT";
    pub const MULTIPLE_STANDARD_UNITS: &str = "MULTIPLE_STANDARD_UNITS";
    pub const DUPLICATE_UNIT: &str = "DUPLICATE_UNIT";
    pub const INVALID_PROJECTION: &str = "INVALID_PROJECTION";
    pub const MISSING_CONTEXT: &str = "MISSING_CONTEXT";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const UNKNOWN_SYSTEM: &str = "UNKNOWN_SYSTEM";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

/// Error raised by a converter for input outside its domain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: &'static str, got: &'static str },

    #[error("value is not finite: {0}")]
    NonFinite(f64),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("projection failed: {0}")]
    Projection(String),
}

/// A unit system that cannot be built: it breaks the one-standard-unit
/// rule, or one of its converters is misconfigured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unit system '{system}' has no standard unit")]
    NoStandardUnit { system: String },

    #[error("unit system '{system}' has several standard units: {}", units.join(", "))]
    MultipleStandardUnits { system: String, units: Vec<String> },

    #[error("unit system '{system}' defines '{unit}' twice")]
    DuplicateUnit { system: String, unit: String },

    #[error("invalid projection '{definition}': {reason}")]
    InvalidProjection { definition: String, reason: String },
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The edit was rejected; the binding keeps working
    Error,
    /// A programming or configuration mistake
    Fatal,
}

/// Structured error delivered through error channels and host responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Unit that was active when the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub severity: Severity,
}

impl GaugeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            unit: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set unit context
    pub fn in_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    // ========== Common Error Constructors ==========

    pub fn missing_context(details: impl Into<String>) -> Self {
        Self::new(codes::MISSING_CONTEXT, format!("Missing context: {}", details.into()))
            .with_suggestion("Attach the binding to a control")
            .with_severity(Severity::Fatal)
    }

    pub fn unknown_unit(system: &str, name: &str) -> Self {
        Self::new(codes::UNKNOWN_UNIT, format!("Unknown unit '{}' in system '{}'", name, system))
            .with_suggestion("The standard unit is used instead")
    }

    pub fn unknown_system(name: &str) -> Self {
        Self::new(codes::UNKNOWN_SYSTEM, format!("Unknown unit system: {}", name))
    }

    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, format!("Invalid request: {}", details.into()))
    }
}

impl std::fmt::Display for GaugeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref unit) = self.unit {
            write!(f, " (unit: {})", unit)?;
        }
        Ok(())
    }
}

impl std::error::Error for GaugeError {}

impl From<ConversionError> for GaugeError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::TypeMismatch { .. } => Self::new(codes::TYPE_ERROR, err.to_string())
                .with_suggestion("Enter a value of the unit's type"),
            _ => Self::new(codes::CONVERSION_ERROR, format!("Conversion failed: {}", err))
                .with_suggestion("Correct the value; the previous value was kept"),
        }
    }
}

impl From<ConfigurationError> for GaugeError {
    fn from(err: ConfigurationError) -> Self {
        let (code, suggestion) = match err {
            ConfigurationError::NoStandardUnit { .. } => {
                (codes::NO_STANDARD_UNIT, "Exactly one unit of a system must have no converters")
            }
            ConfigurationError::MultipleStandardUnits { .. } => {
                (codes::MULTIPLE_STANDARD_UNITS, "Exactly one unit of a system must have no converters")
            }
            ConfigurationError::DuplicateUnit { .. } => (codes::DUPLICATE_UNIT, "Give every unit a distinct name"),
            ConfigurationError::InvalidProjection { .. } => {
                (codes::INVALID_PROJECTION, "Check the proj4 definition of the unit")
            }
        };
        Self::new(code, err.to_string())
            .with_suggestion(suggestion)
            .with_severity(Severity::Fatal)
    }
}
