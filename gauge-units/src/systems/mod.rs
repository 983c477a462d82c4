//! Built-in unit systems

mod length;
mod projections;
mod temperature;

pub use length::{length_formatter, length_precision, length_system, INCHES_PER_METER, LENGTH};
pub use projections::{
    projections_formatter, projections_system, Coords, Reprojection, COORD_DECIMALS, GGRS87_DEF,
    INVALID_COORDINATES, PROJECTIONS, WGS84_DEF,
};
pub use temperature::{temperature_formatter, temperature_precision, temperature_system, TEMPERATURE};

use crate::{DisplayFormatter, UnitSystem};

/// Names of the built-in systems
pub const SYSTEM_NAMES: [&str; 3] = ["length", "temperature", "projections"];

/// Look up a built-in system by name
pub fn by_name(name: &str) -> Option<&'static UnitSystem> {
    match name {
        "length" => Some(&*LENGTH),
        "temperature" => Some(&*TEMPERATURE),
        "projections" => Some(&*PROJECTIONS),
        _ => None,
    }
}

/// The formatter matching a built-in system
pub fn formatter_for(name: &str) -> Option<DisplayFormatter> {
    match name {
        "length" => Some(length_formatter()),
        "temperature" => Some(temperature_formatter()),
        "projections" => Some(projections_formatter()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        for name in SYSTEM_NAMES {
            let system = by_name(name).unwrap();
            assert_eq!(system.name(), name);
            assert_eq!(formatter_for(name).unwrap().system().name(), name);
        }
        assert!(by_name("volume").is_none());
        assert!(formatter_for("volume").is_none());
    }
}
