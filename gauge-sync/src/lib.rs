//! Gauge Sync - Unit-aware value synchronization
//!
//! Binds a [`Control`] to a unit system so the control's model always holds
//! the standard unit value while its view shows the selected unit.
//!
//! ```ignore
//! let length = FieldControl::new(0.0);
//! let binding = Binder::new(LENGTH.clone())
//!     .control(length.handle())
//!     .with_unit("centimeter")
//!     .on_error(|e| eprintln!("{}", e))
//!     .attach()?;
//! length.input(200.0);            // model: 2.0 (meters)
//! binding.set_unit("inch");       // view: 78.7, model unchanged
//! ```

mod binding;
mod control;
mod error;
mod field;
mod group;

pub use binding::{attach, Binder, Binding, SyncState};
pub use control::{Change, ChangeKind, Control, ControlExt, Listener, SetOptions, Subscription, WriteTag};
pub use error::SyncError;
pub use field::FieldControl;
pub use group::{GroupBuilder, GroupControl};
