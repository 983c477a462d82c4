//! Coordinate projections: WGS84 (standard) and GGRS87 / Greek Grid (EPSG:2100)
//!
//! Values are objects `{lat, lng}`. In projected units `lng` holds the
//! easting and `lat` the northing, both in meters.

use std::sync::LazyLock;
use gauge_core::{ConfigurationError, ConversionError, Value};
use proj4rs::proj::Proj;
use serde::{Deserialize, Serialize};
use crate::{round_to, Converter, DisplayFormatter, Unit, UnitSystem};

/// Geographic WGS84, degrees
pub const WGS84_DEF: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// EPSG:2100, transverse Mercator over GRS80 with a datum shift to WGS84
pub const GGRS87_DEF: &str = "+proj=tmerc +lat_0=0 +lon_0=24 +k=0.9996 +x_0=500000 +y_0=0 \
    +ellps=GRS80 +towgs84=-199.87,74.79,246.62,0,0,0,0 +units=m +no_defs";

/// Decimal digits kept on both sides of a reprojection
pub const COORD_DECIMALS: u32 = 5;

pub const INVALID_COORDINATES: &str = "Invalid coordinates";

/// A coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    /// Read `{lat, lng}` from a value; absent fields are 0
    pub fn from_value(value: &Value) -> Result<Coords, ConversionError> {
        let field = |name: &str| {
            let n = value
                .number_or(name, 0.0)
                .ok_or_else(|| ConversionError::TypeMismatch { expected: "Number", got: value.field(name).type_name() })?;
            if n.is_finite() {
                Ok(n)
            } else {
                Err(ConversionError::InvalidCoordinates(format!("{} is {}", name, n)))
            }
        };
        Ok(Coords { lat: field("lat")?, lng: field("lng")? })
    }
}

impl From<Coords> for Value {
    fn from(c: Coords) -> Self {
        Value::object([("lat", c.lat), ("lng", c.lng)])
    }
}

/// Converter reprojecting between the standard geographic CRS and a
/// projected CRS given as a proj4 definition
pub struct Reprojection {
    geographic: Proj,
    projected: Proj,
}

impl Reprojection {
    /// Parse both definitions once; a bad definition fails here, not on use
    pub fn new(definition: &str) -> Result<Self, ConfigurationError> {
        Ok(Reprojection {
            geographic: parse(WGS84_DEF)?,
            projected: parse(definition)?,
        })
    }

    fn transform(&self, src: &Proj, dst: &Proj, value: &Value) -> Result<Value, ConversionError> {
        let coords = Coords::from_value(value)?;

        // proj4rs works in radians on the geographic side
        let mut point = (coords.lng, coords.lat, 0.0);
        if src.is_latlong() {
            point.0 = point.0.to_radians();
            point.1 = point.1.to_radians();
        }
        proj4rs::transform::transform(src, dst, &mut point)
            .map_err(|e| ConversionError::Projection(e.to_string()))?;
        if dst.is_latlong() {
            point.0 = point.0.to_degrees();
            point.1 = point.1.to_degrees();
        }

        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(ConversionError::InvalidCoordinates(format!(
                "({}, {}) has no image",
                coords.lat, coords.lng
            )));
        }
        Ok(Coords {
            lat: round_to(point.1, COORD_DECIMALS),
            lng: round_to(point.0, COORD_DECIMALS),
        }
        .into())
    }
}

fn parse(definition: &str) -> Result<Proj, ConfigurationError> {
    Proj::from_proj_string(definition).map_err(|e| ConfigurationError::InvalidProjection {
        definition: definition.to_string(),
        reason: e.to_string(),
    })
}

impl Converter for Reprojection {
    fn from_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        self.transform(&self.geographic, &self.projected, value)
    }

    fn to_canonical(&self, value: &Value) -> Result<Value, ConversionError> {
        self.transform(&self.projected, &self.geographic, value)
    }
}

pub static PROJECTIONS: LazyLock<UnitSystem> = LazyLock::new(|| match projections_system() {
    Ok(system) => system,
    Err(e) => panic!("invalid built-in unit system: {}", e),
});

pub fn projections_system() -> Result<UnitSystem, ConfigurationError> {
    UnitSystem::builder("projections")
        .unit(Unit::standard("WGS84", "WGS84"))
        .unit(Unit::converted("GGRS87", "GGRS87", Reprojection::new(GGRS87_DEF)?))
        .build()
}

/// Renders `"lat, lng"`, or the invalid-coordinates text
pub fn projections_formatter() -> DisplayFormatter {
    DisplayFormatter::new(PROJECTIONS.clone())
        .with_renderer(|value: &Value, _unit: &Unit| {
            if value.is_null() {
                return Ok(String::new());
            }
            let c = Coords::from_value(value)?;
            Ok(format!("{}, {}", c.lat, c.lng))
        })
        .with_sentinel(INVALID_COORDINATES)
}
