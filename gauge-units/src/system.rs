//! Unit systems: named sets of interchangeable units with one standard unit

use std::collections::HashSet;
use std::sync::Arc;
use gauge_core::ConfigurationError;
use crate::Unit;

/// A closed set of units over one value type.
///
/// Exactly one unit has no converters; it is the standard unit in which
/// canonical values are expressed. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct UnitSystem {
    inner: Arc<SystemInner>,
}

#[derive(Debug)]
struct SystemInner {
    name: String,
    units: Vec<Arc<Unit>>,
    standard: Arc<Unit>,
}

impl UnitSystem {
    pub fn builder(name: &str) -> UnitSystemBuilder {
        UnitSystemBuilder {
            name: name.to_string(),
            units: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get a unit by name
    pub fn get(&self, name: &str) -> Option<&Arc<Unit>> {
        self.inner.units.iter().find(|u| u.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All units, in declaration order
    pub fn units(&self) -> impl Iterator<Item = &Arc<Unit>> {
        self.inner.units.iter()
    }

    pub fn unit_names(&self) -> Vec<&str> {
        self.inner.units.iter().map(|u| u.name.as_str()).collect()
    }

    /// The unit without converters
    pub fn standard_unit(&self) -> &Arc<Unit> {
        &self.inner.standard
    }

    /// The requested unit if it exists, otherwise the standard unit
    pub fn resolve_unit(&self, requested: Option<&str>) -> &Arc<Unit> {
        requested
            .and_then(|name| self.get(name))
            .unwrap_or(&self.inner.standard)
    }
}

/// Free-function form of [`UnitSystem::resolve_unit`]
pub fn resolve_unit(system: &UnitSystem, requested: Option<&str>) -> Arc<Unit> {
    system.resolve_unit(requested).clone()
}

/// Scan `units` for the one without converters.
///
/// More than one candidate is rejected rather than picking the first.
pub fn find_standard_unit<'a>(system: &str, units: &'a [Arc<Unit>]) -> Result<&'a Arc<Unit>, ConfigurationError> {
    let mut standard = units.iter().filter(|u| u.is_standard());
    match (standard.next(), standard.next()) {
        (Some(unit), None) => Ok(unit),
        (None, _) => Err(ConfigurationError::NoStandardUnit { system: system.to_string() }),
        (Some(_), Some(_)) => Err(ConfigurationError::MultipleStandardUnits {
            system: system.to_string(),
            units: units
                .iter()
                .filter(|u| u.is_standard())
                .map(|u| u.name.clone())
                .collect(),
        }),
    }
}

/// Collects units and validates them into a [`UnitSystem`]
pub struct UnitSystemBuilder {
    name: String,
    units: Vec<Arc<Unit>>,
}

impl UnitSystemBuilder {
    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.push(Arc::new(unit));
        self
    }

    pub fn build(self) -> Result<UnitSystem, ConfigurationError> {
        let mut seen = HashSet::new();
        for unit in &self.units {
            if !seen.insert(unit.name.as_str()) {
                return Err(ConfigurationError::DuplicateUnit {
                    system: self.name.clone(),
                    unit: unit.name.clone(),
                });
            }
        }
        let standard = find_standard_unit(&self.name, &self.units)?.clone();
        Ok(UnitSystem {
            inner: Arc::new(SystemInner {
                name: self.name,
                units: self.units,
                standard,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor_converter;

    fn length() -> UnitSystem {
        UnitSystem::builder("length")
            .unit(Unit::standard("meter", "Meter"))
            .unit(Unit::converted("centimeter", "Centimeter", factor_converter(100.0, Some(0))))
            .build()
            .unwrap()
    }

    #[test]
    fn test_standard_unit() {
        let system = length();
        assert_eq!(system.standard_unit().name, "meter");
        assert_eq!(system.unit_names(), vec!["meter", "centimeter"]);
    }

    #[test]
    fn test_resolve_known_unit() {
        let system = length();
        assert_eq!(system.resolve_unit(Some("centimeter")).name, "centimeter");
    }

    #[test]
    fn test_resolve_falls_back_to_standard() {
        let system = length();
        assert_eq!(resolve_unit(&system, None).name, "meter");
        assert_eq!(resolve_unit(&system, Some("unknown-name")).name, "meter");
    }

    #[test]
    fn test_no_standard_unit() {
        let err = UnitSystem::builder("broken")
            .unit(Unit::converted("centimeter", "Centimeter", factor_converter(100.0, None)))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::NoStandardUnit { system: "broken".into() });
    }

    #[test]
    fn test_multiple_standard_units() {
        let err = UnitSystem::builder("broken")
            .unit(Unit::standard("meter", "Meter"))
            .unit(Unit::standard("foot", "Foot"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MultipleStandardUnits {
                system: "broken".into(),
                units: vec!["meter".into(), "foot".into()],
            }
        );
    }

    #[test]
    fn test_duplicate_unit() {
        let err = UnitSystem::builder("broken")
            .unit(Unit::standard("meter", "Meter"))
            .unit(Unit::converted("meter", "Meter again", factor_converter(1.0, None)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateUnit { .. }));
    }

    #[test]
    fn test_find_standard_unit_empty() {
        assert!(find_standard_unit("empty", &[]).is_err());
    }
}
