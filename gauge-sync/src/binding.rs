//! Binding between a control and a unit system
//!
//! A binding keeps the model of a control in the standard unit while the
//! view shows the selected unit:
//!
//! - an edit of the view is normalized: `to_canonical(view)` is written to
//!   the model only;
//! - a unit switch, or an external write of the model, re-renders:
//!   `from_canonical(model)` is written to the view only.
//!
//! Every write the binding issues carries its [`WriteTag`], so the
//! notification it causes is recognized and never handled as an edit.
//! Changes that arrive while a write is in progress are queued and handled
//! once the write is complete.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use gauge_core::Value;
use gauge_units::{DisplayFormatter, Unit, UnitSystem};
use tracing::{debug, trace, warn};
use crate::control::{Change, ChangeKind, Control, SetOptions, Subscription, WriteTag};
use crate::error::SyncError;
use crate::ControlExt;

/// What a binding is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// Writing a normalized value to the model
    ApplyingCanonicalUpdate,
    /// Writing a re-rendered value to the view
    ApplyingUnitSwitch,
}

type ErrorCallback = Box<dyn Fn(&SyncError)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Normalize,
    Render,
}

/// Sets the state for the duration of one write; back to idle on drop,
/// including when a listener panics.
struct Guard<'a> {
    state: &'a Cell<SyncState>,
}

impl<'a> Guard<'a> {
    fn enter(state: &'a Cell<SyncState>, next: SyncState) -> Self {
        state.set(next);
        Guard { state }
    }
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.state.set(SyncState::Idle);
    }
}

struct BindingInner {
    control: Rc<dyn Control>,
    system: UnitSystem,
    unit: RefCell<Arc<Unit>>,
    state: Cell<SyncState>,
    tag: WriteTag,
    attached: Cell<bool>,
    queue: RefCell<VecDeque<Job>>,
    on_error: Option<ErrorCallback>,
    last_error: RefCell<Option<SyncError>>,
}

impl BindingInner {
    fn on_change(&self, change: &Change) {
        if !self.attached.get() {
            return;
        }
        if change.tag == Some(self.tag) {
            trace!(kind = ?change.kind, "own write ignored");
            return;
        }
        let job = match change.kind {
            ChangeKind::Initial | ChangeKind::Input => Job::Normalize,
            ChangeKind::Canonical => Job::Render,
            // Someone else re-rendered the view; the model is untouched
            ChangeKind::Display => return,
        };
        self.schedule(job);
    }

    fn schedule(&self, job: Job) {
        if self.state.get() != SyncState::Idle {
            trace!(?job, state = ?self.state.get(), "queued");
            self.queue.borrow_mut().push_back(job);
            return;
        }
        self.run(job);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(job) if self.attached.get() => self.run(job),
                Some(_) => continue,
                None => break,
            }
        }
    }

    fn run(&self, job: Job) {
        match job {
            Job::Normalize => self.normalize(),
            Job::Render => self.render(),
        }
    }

    fn normalize(&self) {
        let unit = self.unit.borrow().clone();
        let view = self.control.view_value();
        match unit.to_canonical(&view) {
            Ok(canonical) => {
                debug!(unit = %unit.name, %view, %canonical, "normalize");
                let _guard = Guard::enter(&self.state, SyncState::ApplyingCanonicalUpdate);
                self.write(canonical, SetOptions::canonical());
            }
            Err(source) => self.report(SyncError::Conversion { unit: unit.name.clone(), source }),
        }
    }

    fn render(&self) {
        let unit = self.unit.borrow().clone();
        let canonical = self.control.value();
        match unit.from_canonical(&canonical) {
            Ok(view) => {
                debug!(unit = %unit.name, %canonical, %view, "render");
                let _guard = Guard::enter(&self.state, SyncState::ApplyingUnitSwitch);
                self.write(view, SetOptions::display());
            }
            Err(source) => self.report(SyncError::Conversion { unit: unit.name.clone(), source }),
        }
    }

    /// Silent write to every leaf control, then a single notification
    fn write(&self, value: Value, options: SetOptions) {
        let options = options.tagged(self.tag);
        write_leaves(&*self.control, value, options.silent());
        self.control.emit(options.kind(), Some(self.tag));
    }

    fn report(&self, err: SyncError) {
        warn!(system = self.system.name(), error = %err, "conversion rejected, control left unchanged");
        if let Some(callback) = &self.on_error {
            callback(&err);
        }
        *self.last_error.borrow_mut() = Some(err);
    }
}

fn write_leaves(control: &dyn Control, value: Value, options: SetOptions) {
    let fields = control.sub_controls();
    if fields.is_empty() {
        control.set_value(value, options);
        return;
    }
    for (name, field) in fields {
        write_leaves(&*field, value.field(&name), options);
    }
}

/// Configures and attaches a [`Binding`]
pub struct Binder {
    system: UnitSystem,
    control: Option<Rc<dyn Control>>,
    unit: Option<String>,
    on_error: Option<ErrorCallback>,
}

impl Binder {
    pub fn new(system: UnitSystem) -> Self {
        Binder { system, control: None, unit: None, on_error: None }
    }

    pub fn control(mut self, control: Rc<dyn Control>) -> Self {
        self.control = Some(control);
        self
    }

    /// Initial display unit; the standard unit if absent or unknown
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Error channel for rejected conversions
    pub fn on_error<F: Fn(&SyncError) + 'static>(mut self, callback: F) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Subscribe to the control. The replayed current value is treated as
    /// a display value in the initial unit and normalized right away.
    pub fn attach(self) -> Result<Binding, SyncError> {
        let control = self.control.ok_or(SyncError::MissingContext)?;
        let unit = resolve(&self.system, self.unit.as_deref());
        debug!(system = self.system.name(), unit = %unit.name, "attach");

        let inner = Rc::new(BindingInner {
            control: control.clone(),
            system: self.system,
            unit: RefCell::new(unit),
            state: Cell::new(SyncState::Idle),
            tag: WriteTag::next(),
            attached: Cell::new(true),
            queue: RefCell::new(VecDeque::new()),
            on_error: self.on_error,
            last_error: RefCell::new(None),
        });

        let weak: Weak<BindingInner> = Rc::downgrade(&inner);
        let subscription = control.on_change(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.on_change(change);
            }
        });

        Ok(Binding { inner, subscription: RefCell::new(Some(subscription)) })
    }
}

fn resolve(system: &UnitSystem, name: Option<&str>) -> Arc<Unit> {
    if let Some(name) = name {
        if !system.contains(name) {
            debug!(system = system.name(), unit = name, "unknown unit, using the standard unit");
        }
    }
    system.resolve_unit(name).clone()
}

/// Bind `control` to `system`, displaying `initial_unit`
pub fn attach(
    control: Option<Rc<dyn Control>>,
    system: &UnitSystem,
    initial_unit: Option<&str>,
) -> Result<Binding, SyncError> {
    let mut binder = Binder::new(system.clone());
    if let Some(control) = control {
        binder = binder.control(control);
    }
    if let Some(unit) = initial_unit {
        binder = binder.with_unit(unit);
    }
    binder.attach()
}

/// A live binding. Dropping it detaches.
pub struct Binding {
    inner: Rc<BindingInner>,
    subscription: RefCell<Option<Subscription>>,
}

impl Binding {
    /// Select the display unit and re-render the view from the model.
    /// Unknown names select the standard unit. Returns the selected unit.
    pub fn set_unit(&self, name: &str) -> Arc<Unit> {
        let unit = resolve(&self.inner.system, Some(name));
        if !self.is_attached() {
            return unit;
        }
        debug!(from = %self.inner.unit.borrow().name, to = %unit.name, "unit switch");
        *self.inner.unit.borrow_mut() = unit.clone();
        self.inner.schedule(Job::Render);
        unit
    }

    /// Stop listening. No write happens afterwards. Safe to call twice.
    pub fn detach(&self) {
        if !self.inner.attached.replace(false) {
            return;
        }
        self.inner.queue.borrow_mut().clear();
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        debug!(system = self.inner.system.name(), "detach");
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attached.get()
    }

    pub fn unit(&self) -> Arc<Unit> {
        self.inner.unit.borrow().clone()
    }

    pub fn unit_name(&self) -> String {
        self.inner.unit.borrow().name.clone()
    }

    pub fn system(&self) -> &UnitSystem {
        &self.inner.system
    }

    pub fn state(&self) -> SyncState {
        self.inner.state.get()
    }

    pub fn control(&self) -> &Rc<dyn Control> {
        &self.inner.control
    }

    /// The model value, in the standard unit
    pub fn canonical_value(&self) -> Value {
        self.inner.control.value()
    }

    /// The view value, in the selected unit
    pub fn display_value(&self) -> Value {
        self.inner.control.view_value()
    }

    /// Render the model in the selected unit
    pub fn format(&self, formatter: &DisplayFormatter) -> String {
        formatter.format(&self.canonical_value(), Some(&self.unit_name()))
    }

    pub fn last_error(&self) -> Option<SyncError> {
        self.inner.last_error.borrow().clone()
    }

    pub fn take_error(&self) -> Option<SyncError> {
        self.inner.last_error.borrow_mut().take()
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("system", &self.inner.system.name())
            .field("unit", &self.unit_name())
            .field("state", &self.state())
            .field("attached", &self.is_attached())
            .finish()
    }
}
