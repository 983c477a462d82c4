//! The control contract consumed by bindings
//!
//! A control is a mutable value cell observed through change
//! notifications. It keeps two representations of its value: the model
//! (canonical, standard unit) and the view (what the user sees and edits).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use gauge_core::Value;

/// What a change notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Replay of the current value to a new subscriber
    Initial,
    /// View and model were both written, as by a keystroke
    Input,
    /// Only the model was written
    Canonical,
    /// Only the view was written (a re-render)
    Display,
}

/// Identifies the writer of a change so it can recognize its own echo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteTag(u64);

impl WriteTag {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        WriteTag(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How [`Control::set_value`] writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOptions {
    /// Write the model
    pub canonical: bool,
    /// Write the view
    pub display: bool,
    /// Do not notify listeners
    pub silent: bool,
    pub tag: Option<WriteTag>,
}

impl SetOptions {
    /// Write view and model
    pub const fn input() -> Self {
        SetOptions { canonical: true, display: true, silent: false, tag: None }
    }

    /// Write the model only
    pub const fn canonical() -> Self {
        SetOptions { canonical: true, display: false, silent: false, tag: None }
    }

    /// Write the view only
    pub const fn display() -> Self {
        SetOptions { canonical: false, display: true, silent: false, tag: None }
    }

    pub const fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub const fn tagged(mut self, tag: WriteTag) -> Self {
        self.tag = Some(tag);
        self
    }

    // Neither flag set means both.
    pub fn writes_model(&self) -> bool {
        self.canonical || !self.display
    }

    pub fn writes_view(&self) -> bool {
        self.display || !self.canonical
    }

    pub fn kind(&self) -> ChangeKind {
        match (self.writes_model(), self.writes_view()) {
            (true, false) => ChangeKind::Canonical,
            (false, true) => ChangeKind::Display,
            _ => ChangeKind::Input,
        }
    }
}

/// A change notification
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    /// Model value after the change
    pub value: Value,
    /// View value after the change
    pub view: Value,
    pub tag: Option<WriteTag>,
}

pub type Listener = Rc<dyn Fn(&Change)>;

/// A mutable value cell, scalar or composite.
///
/// `subscribe` must deliver the current value (as [`ChangeKind::Initial`])
/// before returning, and then every later change in order.
pub trait Control {
    /// The model value
    fn value(&self) -> Value;

    /// The view value
    fn view_value(&self) -> Value;

    fn set_value(&self, value: Value, options: SetOptions);

    /// Notify listeners with the current value
    fn emit(&self, kind: ChangeKind, tag: Option<WriteTag>);

    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Named sub-controls; empty for a scalar control
    fn sub_controls(&self) -> Vec<(String, Rc<dyn Control>)> {
        Vec::new()
    }
}

pub trait ControlExt: Control {
    fn on_change<F: Fn(&Change) + 'static>(&self, f: F) -> Subscription {
        self.subscribe(Rc::new(f))
    }
}

impl<C: Control + ?Sized> ControlExt for C {}

struct Entry {
    id: u64,
    active: Cell<bool>,
    listener: Listener,
}

/// Listener list shared by a control and its subscriptions.
///
/// A change emitted while another is being delivered waits until every
/// listener has seen the first one, so all listeners observe the same order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Rc<Entry>>>,
    pending: RefCell<VecDeque<Change>>,
    delivering: Cell<bool>,
}

/// Ends a delivery round, even when a listener panics
struct Delivery<'a> {
    listeners: &'a Listeners,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        self.listeners.delivering.set(false);
        if std::thread::panicking() {
            self.listeners.pending.borrow_mut().clear();
        }
    }
}

impl Listeners {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Listeners::default())
    }

    /// Register `listener`, replay `initial` to it, and return its handle
    pub(crate) fn subscribe(self: &Rc<Self>, listener: Listener, initial: Change) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let entry = Rc::new(Entry { id, active: Cell::new(true), listener });
        self.entries.borrow_mut().push(entry.clone());

        (entry.listener)(&initial);

        Subscription {
            listeners: Rc::downgrade(self),
            entry: Rc::downgrade(&entry),
        }
    }

    pub(crate) fn emit(&self, change: &Change) {
        self.pending.borrow_mut().push_back(change.clone());
        if self.delivering.replace(true) {
            return;
        }
        let _delivery = Delivery { listeners: self };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else { break };
            // Listeners may subscribe or unsubscribe while being notified
            let snapshot: Vec<Rc<Entry>> = self.entries.borrow().clone();
            for entry in snapshot {
                if entry.active.get() {
                    (entry.listener)(&change);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|e| e.id != id);
    }
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use]
pub struct Subscription {
    listeners: Weak<Listeners>,
    entry: Weak<Entry>,
}

impl Subscription {
    /// Stop deliveries. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(entry) = self.entry.upgrade() {
            entry.active.set(false);
            if let Some(listeners) = self.listeners.upgrade() {
                listeners.remove(entry.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.entry.upgrade().map_or(false, |e| e.active.get())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(kind: ChangeKind) -> Change {
        Change { kind, value: Value::Null, view: Value::Null, tag: None }
    }

    #[test]
    fn test_set_options_kind() {
        assert_eq!(SetOptions::input().kind(), ChangeKind::Input);
        assert_eq!(SetOptions::canonical().kind(), ChangeKind::Canonical);
        assert_eq!(SetOptions::display().silent().kind(), ChangeKind::Display);
        assert_eq!(SetOptions::default().kind(), ChangeKind::Input);
        assert!(SetOptions::default().writes_model() && SetOptions::default().writes_view());
    }

    #[test]
    fn test_write_tags_are_unique() {
        assert_ne!(WriteTag::next(), WriteTag::next());
    }

    #[test]
    fn test_subscribe_replays() {
        let listeners = Listeners::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = listeners.subscribe(Rc::new(move |c: &Change| s.borrow_mut().push(c.kind)), change(ChangeKind::Initial));
        listeners.emit(&change(ChangeKind::Input));
        assert_eq!(*seen.borrow(), vec![ChangeKind::Initial, ChangeKind::Input]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let listeners = Listeners::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = listeners.subscribe(Rc::new(move |_: &Change| c.set(c.get() + 1)), change(ChangeKind::Initial));
        assert!(sub.is_active());
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(listeners.len(), 0);
        listeners.emit(&change(ChangeKind::Input));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let listeners = Listeners::new();
        {
            let _sub = listeners.subscribe(Rc::new(|_: &Change| {}), change(ChangeKind::Initial));
            assert_eq!(listeners.len(), 1);
        }
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_unsubscribed_during_emit_is_not_called() {
        let listeners = Listeners::new();
        let second_calls = Rc::new(Cell::new(0));
        let second_sub: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim = second_sub.clone();
        let _first = listeners.subscribe(
            Rc::new(move |c: &Change| {
                if c.kind == ChangeKind::Input {
                    if let Some(sub) = victim.borrow().as_ref() {
                        sub.unsubscribe();
                    }
                }
            }),
            change(ChangeKind::Initial),
        );
        let calls = second_calls.clone();
        *second_sub.borrow_mut() = Some(listeners.subscribe(
            Rc::new(move |_: &Change| calls.set(calls.get() + 1)),
            change(ChangeKind::Initial),
        ));

        listeners.emit(&change(ChangeKind::Input));
        // only the replay reached the second listener
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn test_nested_emit_keeps_order() {
        let listeners = Listeners::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::downgrade(&listeners);
        let _first = listeners.subscribe(
            Rc::new(move |c: &Change| {
                if c.kind == ChangeKind::Input {
                    if let Some(l) = inner.upgrade() {
                        l.emit(&change(ChangeKind::Canonical));
                    }
                }
            }),
            change(ChangeKind::Initial),
        );
        let s = seen.clone();
        let _second = listeners.subscribe(Rc::new(move |c: &Change| s.borrow_mut().push(c.kind)), change(ChangeKind::Initial));

        listeners.emit(&change(ChangeKind::Input));
        assert_eq!(*seen.borrow(), vec![ChangeKind::Initial, ChangeKind::Input, ChangeKind::Canonical]);
    }
}
