//! One host session: a single bound control driven by JSON requests

use std::cell::RefCell;
use std::rc::Rc;
use gauge_core::{GaugeError, Value};
use gauge_sync::{Binder, Binding, Control, FieldControl, GroupControl, SetOptions};
use gauge_units::systems::{self, SYSTEM_NAMES};
use gauge_units::UnitSystem;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<JsonValue>,
    pub op: String,
    #[serde(default)]
    pub params: JsonValue,
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GaugeError>,
    /// Rejected conversions reported while handling the request
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GaugeError>,
}

impl Response {
    pub fn failure(id: Option<JsonValue>, error: GaugeError) -> Self {
        Response { id, result: None, error: Some(error), errors: Vec::new() }
    }
}

/// Defaults applied by `attach` when the request names no system or unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub system: String,
    pub unit: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config { system: "length".to_string(), unit: None }
    }
}

enum HostControl {
    Field(FieldControl),
    Group(GroupControl),
}

impl HostControl {
    /// Coordinates are edited per field; every other system uses one field
    fn for_system(system: &str, value: Value) -> Self {
        if system == "projections" {
            let group = GroupControl::builder()
                .field("lat", FieldControl::new(value.field("lat")))
                .field("lng", FieldControl::new(value.field("lng")))
                .build();
            HostControl::Group(group)
        } else {
            HostControl::Field(FieldControl::new(value))
        }
    }

    fn handle(&self) -> Rc<dyn Control> {
        match self {
            HostControl::Field(c) => c.handle(),
            HostControl::Group(c) => c.handle(),
        }
    }

    fn input(&self, value: Value) {
        match self {
            HostControl::Field(c) => c.input(value),
            HostControl::Group(c) => c.input(value),
        }
    }

    fn reset(&self) {
        match self {
            HostControl::Field(c) => c.reset(),
            HostControl::Group(c) => c.reset(),
        }
    }

    fn is_initial_value(&self) -> bool {
        match self {
            HostControl::Field(c) => c.is_initial_value(),
            HostControl::Group(c) => c.is_initial_value(),
        }
    }
}

struct Bound {
    control: HostControl,
    binding: Binding,
}

pub struct Session {
    config: Config,
    bound: Option<Bound>,
    errors: Rc<RefCell<Vec<GaugeError>>>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session { config, bound: None, errors: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        debug!(op = %request.op, "request");
        let result = match request.op.as_str() {
            "systems" => Ok(list_systems()),
            "attach" => self.attach(&request.params),
            "input" => self.input(&request.params),
            "load" => self.load(&request.params),
            "set_unit" => self.set_unit(&request.params),
            "show" => self.show(),
            "format" => self.format(&request.params),
            "reset" => self.reset(),
            "detach" => self.detach(),
            other => Err(GaugeError::invalid_request(format!("unknown operation '{}'", other))
                .with_suggestion("Use one of: systems, attach, input, load, set_unit, show, format, reset, detach")),
        };

        let errors = std::mem::take(&mut *self.errors.borrow_mut());
        match result {
            Ok(result) => Response { id: request.id.clone(), result: Some(result), error: None, errors },
            Err(error) => Response { id: request.id.clone(), result: None, error: Some(error), errors },
        }
    }

    fn attach(&mut self, params: &JsonValue) -> Result<JsonValue, GaugeError> {
        let system_name = str_param(params, "system").unwrap_or(&self.config.system).to_string();
        let system = lookup(&system_name)?;
        let unit = str_param(params, "unit").or(self.config.unit.as_deref());
        if let Some(unit) = unit {
            if !system.contains(unit) {
                self.errors.borrow_mut().push(GaugeError::unknown_unit(&system_name, unit));
            }
        }
        let value = params.get("value").map(Value::from_json).unwrap_or_default();

        if let Some(previous) = self.bound.take() {
            previous.binding.detach();
        }

        let control = HostControl::for_system(&system_name, value);
        let errors = self.errors.clone();
        let mut binder = Binder::new(system.clone())
            .control(control.handle())
            .on_error(move |e| errors.borrow_mut().push(e.clone().into()));
        if let Some(unit) = unit {
            binder = binder.with_unit(unit);
        }
        let binding = binder.attach().map_err(GaugeError::from)?;
        info!(system = %system_name, unit = %binding.unit_name(), "control attached");

        self.bound = Some(Bound { control, binding });
        self.show()
    }

    fn input(&mut self, params: &JsonValue) -> Result<JsonValue, GaugeError> {
        let value = value_param(params)?;
        self.bound()?.control.input(value);
        self.show()
    }

    /// Write the model directly, as loading stored data does
    fn load(&mut self, params: &JsonValue) -> Result<JsonValue, GaugeError> {
        let value = value_param(params)?;
        self.bound()?.control.handle().set_value(value, SetOptions::canonical());
        self.show()
    }

    fn set_unit(&mut self, params: &JsonValue) -> Result<JsonValue, GaugeError> {
        let name = str_param(params, "unit").ok_or_else(|| GaugeError::invalid_request("missing 'unit'"))?;
        let bound = self.bound()?;
        if !bound.binding.system().contains(name) {
            let error = GaugeError::unknown_unit(bound.binding.system().name(), name);
            self.errors.borrow_mut().push(error);
        }
        bound.binding.set_unit(name);
        self.show()
    }

    fn show(&self) -> Result<JsonValue, GaugeError> {
        let bound = self.bound()?;
        let binding = &bound.binding;
        let system = binding.system().name();
        let formatted = systems::formatter_for(system).map(|f| binding.format(&f));
        Ok(json!({
            "system": system,
            "unit": binding.unit_name(),
            "canonical": binding.canonical_value().to_json(),
            "display": binding.display_value().to_json(),
            "formatted": formatted,
            "initial": bound.control.is_initial_value(),
            "attached": binding.is_attached(),
        }))
    }

    /// Stateless conversion of a canonical value, independent of the binding
    fn format(&self, params: &JsonValue) -> Result<JsonValue, GaugeError> {
        let system_name = str_param(params, "system").unwrap_or(&self.config.system);
        let formatter = systems::formatter_for(system_name).ok_or_else(|| GaugeError::unknown_system(system_name))?;
        let value = value_param(params)?;
        let unit = str_param(params, "unit");
        let converted = formatter.convert(&value, unit).map_err(GaugeError::from)?;
        Ok(json!({
            "system": system_name,
            "unit": formatter.system().resolve_unit(unit).name,
            "value": converted.to_json(),
            "formatted": formatter.format(&value, unit),
        }))
    }

    fn reset(&mut self) -> Result<JsonValue, GaugeError> {
        self.bound()?.control.reset();
        self.show()
    }

    fn detach(&mut self) -> Result<JsonValue, GaugeError> {
        let bound = self.bound.take().ok_or_else(not_attached)?;
        bound.binding.detach();
        info!(system = bound.binding.system().name(), "control detached");
        Ok(json!({ "attached": false }))
    }

    fn bound(&self) -> Result<&Bound, GaugeError> {
        self.bound.as_ref().ok_or_else(not_attached)
    }
}

fn not_attached() -> GaugeError {
    GaugeError::missing_context("no control attached").with_suggestion("Send an 'attach' request first")
}

fn lookup(name: &str) -> Result<&'static UnitSystem, GaugeError> {
    systems::by_name(name).ok_or_else(|| {
        GaugeError::unknown_system(name).with_suggestion(format!("Available systems: {}", SYSTEM_NAMES.join(", ")))
    })
}

fn str_param<'a>(params: &'a JsonValue, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

fn value_param(params: &JsonValue) -> Result<Value, GaugeError> {
    params
        .get("value")
        .map(Value::from_json)
        .ok_or_else(|| GaugeError::invalid_request("missing 'value'"))
}

fn list_systems() -> JsonValue {
    let systems: Vec<JsonValue> = SYSTEM_NAMES
        .iter()
        .filter_map(|name| systems::by_name(name))
        .map(|system| {
            json!({
                "name": system.name(),
                "standard": system.standard_unit().name,
                "units": system.units().map(|u| json!({
                    "name": u.name,
                    "label": u.label,
                    "symbol": u.symbol(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "systems": systems })
}
