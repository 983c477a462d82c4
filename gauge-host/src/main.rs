//! Gauge Host
//!
//! Drives one unit-bound control over a line-delimited JSON protocol on
//! stdin/stdout. Each request is `{"id": .., "op": "..", "params": {..}}`.
//!
//! Operations:
//! - systems: List the built-in unit systems
//! - attach: Bind a new control (`system`, `unit`, `value`)
//! - input: Type a value into the control, in the displayed unit
//! - load: Write a standard unit value into the model
//! - set_unit: Switch the displayed unit
//! - show: Current canonical, display and formatted values
//! - format: Convert and format a standard unit value without a binding
//! - reset: Restore the value the control was attached with
//! - detach: Release the binding
//!
//! Environment:
//! - GAUGE_SYSTEM: system used by `attach` when none is given (default `length`)
//! - GAUGE_UNIT: initial unit used by `attach` when none is given
//! - GAUGE_LOG: log filter, falls back to RUST_LOG, then `info`

mod session;

use std::env;
use std::io::{self, BufRead, Write};
use gauge_core::GaugeError;
use gauge_units::systems;
use session::{Config, Request, Response, Session};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    let filter = EnvFilter::try_from_env("GAUGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries responses only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn config_from_env() -> Config {
    let mut config = Config::default();
    if let Ok(system) = env::var("GAUGE_SYSTEM") {
        if systems::by_name(&system).is_some() {
            config.system = system;
        } else {
            warn!(system = %system, "unknown GAUGE_SYSTEM, using {}", config.system);
        }
    }
    config.unit = env::var("GAUGE_UNIT").ok().filter(|u| !u.is_empty());
    config
}

fn write_response(response: &Response) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

fn main() {
    init_logging();

    let config = config_from_env();
    info!(version = SERVER_VERSION, system = %config.system, unit = ?config.unit, "gauge host started");
    let mut session = Session::new(config);

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "received");

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => session.handle(&request),
                    Err(e) => {
                        warn!(error = %e, "unparseable request");
                        Response::failure(None, GaugeError::invalid_request(format!("parse error: {}", e)))
                    }
                };

                if let Err(e) = write_response(&response) {
                    error!(error = %e, "writing response failed");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "reading input failed");
                break;
            }
        }
    }

    info!("gauge host shutting down");
}
