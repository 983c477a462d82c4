//! Gauge Units - Unit systems and conversion
//!
//! A unit system is a set of units over one value type with exactly one
//! standard unit. Every other unit carries a pair of converters from and
//! to the standard unit.
//!
//! Built-in systems:
//! - Length (meter, centimeter, inch)
//! - Temperature (celsius, fahrenheit, kelvin)
//! - Projections (WGS84, GGRS87)

mod convert;
mod display;
mod system;
mod unit;
pub mod systems;

pub use convert::{factor_converter, linear_converter, round_to};
pub use display::{display, display_in, format_number, numeric_renderer, DisplayFormatter, Precision, DEFAULT_SENTINEL};
pub use system::{find_standard_unit, resolve_unit, UnitSystem, UnitSystemBuilder};
pub use unit::{Converter, ConverterPair, Unit};
