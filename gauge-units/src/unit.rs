//! Unit representation with its converters to and from the standard unit

use std::fmt;
use std::sync::Arc;
use gauge_core::{ConversionError, Value};

/// Dual conversion between the standard unit of a system and one of its units.
///
/// Implementations must be pure: the same input always yields the same
/// output, and any configuration is fixed at construction.
pub trait Converter: Send + Sync {
    /// Standard unit value -> this unit's display value
    fn from_canonical(&self, value: &Value) -> Result<Value, ConversionError>;

    /// This unit's display value -> standard unit value
    fn to_canonical(&self, value: &Value) -> Result<Value, ConversionError>;
}

type ConvertFn = Box<dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync>;

/// A converter built from two closures
pub struct ConverterPair {
    from_canonical: ConvertFn,
    to_canonical: ConvertFn,
}

impl ConverterPair {
    pub fn new<F, T>(from_canonical: F, to_canonical: T) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
        T: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        ConverterPair {
            from_canonical: Box::new(from_canonical),
            to_canonical: Box::new(to_canonical),
        }
    }
}

impl Converter for ConverterPair {
    fn from_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        (self.from_canonical)(value)
    }

    fn to_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        (self.to_canonical)(value)
    }
}

impl fmt::Debug for ConverterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConverterPair")
    }
}

/// A unit of a unit system.
///
/// The standard unit of a system is the one without converters; every
/// other unit converts from and to it.
#[derive(Clone)]
pub struct Unit {
    /// The unit name, unique within its system (e.g. "centimeter")
    pub name: String,
    /// Human-readable label (e.g. "Centimeter")
    pub label: String,
    /// Optional symbol appended to formatted values (e.g. "cm")
    pub symbol: Option<String>,
    converters: Option<Arc<dyn Converter>>,
}

impl Unit {
    /// Create the standard unit of a system
    pub fn standard(name: &str, label: &str) -> Self {
        Unit {
            name: name.to_string(),
            label: label.to_string(),
            symbol: None,
            converters: None,
        }
    }

    /// Create a unit converting from and to the standard unit
    pub fn converted<C: Converter + 'static>(name: &str, label: &str, converters: C) -> Self {
        Unit {
            name: name.to_string(),
            label: label.to_string(),
            symbol: None,
            converters: Some(Arc::new(converters)),
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    /// Whether this is the standard unit of its system
    pub fn is_standard(&self) -> bool {
        self.converters.is_none()
    }

    pub fn converters(&self) -> Option<&dyn Converter> {
        self.converters.as_deref()
    }

    /// Convert a standard unit value into this unit.
    /// The standard unit is its own display form.
    pub fn from_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        match &self.converters {
            Some(c) => c.from_canonical(value),
            None => Ok(value.clone()),
        }
    }

    /// Convert a value in this unit into the standard unit
    pub fn to_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        match &self.converters {
            Some(c) => c.to_canonical(value),
            None => Ok(value.clone()),
        }
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("symbol", &self.symbol)
            .field("standard", &self.is_standard())
            .finish()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling() -> ConverterPair {
        ConverterPair::new(
            |v| Ok(Value::Number(v.as_number().unwrap_or(0.0) * 2.0)),
            |v| Ok(Value::Number(v.as_number().unwrap_or(0.0) / 2.0)),
        )
    }

    #[test]
    fn test_standard_unit_is_identity() {
        let m = Unit::standard("meter", "Meter").with_symbol("m");
        assert!(m.is_standard());
        assert_eq!(m.from_canonical(&Value::from(1.5)).unwrap(), Value::from(1.5));
        assert_eq!(m.to_canonical(&Value::from(1.5)).unwrap(), Value::from(1.5));
        assert_eq!(m.symbol(), "m");
    }

    #[test]
    fn test_converted_unit() {
        let half = Unit::converted("half", "Half meter", doubling());
        assert!(!half.is_standard());
        assert!(half.converters().is_some());
        assert_eq!(half.from_canonical(&Value::from(3.0)).unwrap(), Value::from(6.0));
        assert_eq!(half.to_canonical(&Value::from(6.0)).unwrap(), Value::from(3.0));
        assert_eq!(half.symbol(), "");
    }

    #[test]
    fn test_debug_hides_converters() {
        let half = Unit::converted("half", "Half meter", doubling());
        let dbg = format!("{:?}", half);
        assert!(dbg.contains("standard: false"), "{}", dbg);
    }
}
