//! In-memory scalar control

use std::cell::RefCell;
use std::rc::Rc;
use gauge_core::Value;
use crate::control::{Change, ChangeKind, Control, Listener, Listeners, SetOptions, Subscription, WriteTag};

/// A scalar control holding separate model and view values.
///
/// Remembers the value it was created with so a form can be reset.
#[derive(Clone)]
pub struct FieldControl {
    inner: Rc<FieldInner>,
}

struct FieldInner {
    model: RefCell<Value>,
    view: RefCell<Value>,
    initial: Value,
    listeners: Rc<Listeners>,
}

impl FieldControl {
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        FieldControl {
            inner: Rc::new(FieldInner {
                model: RefCell::new(value.clone()),
                view: RefCell::new(value.clone()),
                initial: value,
                listeners: Listeners::new(),
            }),
        }
    }

    /// Enter a value as the user would: view and model both take it
    pub fn input(&self, value: impl Into<Value>) {
        self.set_value(value.into(), SetOptions::input());
    }

    pub fn initial_value(&self) -> Value {
        self.inner.initial.clone()
    }

    /// Enter the initial value again
    pub fn reset(&self) {
        self.input(self.inner.initial.clone());
    }

    /// Whether the view shows the value the control was created with
    pub fn is_initial_value(&self) -> bool {
        *self.inner.view.borrow() == self.inner.initial
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Shared handle usable as a sub-control or binding target
    pub fn handle(&self) -> Rc<dyn Control> {
        Rc::new(self.clone())
    }

    fn change(&self, kind: ChangeKind, tag: Option<WriteTag>) -> Change {
        Change {
            kind,
            value: self.value(),
            view: self.view_value(),
            tag,
        }
    }
}

impl Control for FieldControl {
    fn value(&self) -> Value {
        self.inner.model.borrow().clone()
    }

    fn view_value(&self) -> Value {
        self.inner.view.borrow().clone()
    }

    fn set_value(&self, value: Value, options: SetOptions) {
        if options.writes_model() && options.writes_view() {
            *self.inner.view.borrow_mut() = value.clone();
            *self.inner.model.borrow_mut() = value;
        } else if options.writes_model() {
            *self.inner.model.borrow_mut() = value;
        } else {
            *self.inner.view.borrow_mut() = value;
        }
        if !options.silent {
            self.emit(options.kind(), options.tag);
        }
    }

    fn emit(&self, kind: ChangeKind, tag: Option<WriteTag>) {
        let change = self.change(kind, tag);
        self.inner.listeners.emit(&change);
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let initial = self.change(ChangeKind::Initial, None);
        self.inner.listeners.subscribe(listener, initial)
    }
}

impl std::fmt::Debug for FieldControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldControl")
            .field("value", &*self.inner.model.borrow())
            .field("view", &*self.inner.view.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlExt;
    use std::cell::RefCell;

    fn recorder(control: &FieldControl) -> (Rc<RefCell<Vec<Change>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let sub = control.on_change(move |c| s.borrow_mut().push(c.clone()));
        (seen, sub)
    }

    #[test]
    fn test_new_sets_model_and_view() {
        let c = FieldControl::new(1.5);
        assert_eq!(c.value(), Value::from(1.5));
        assert_eq!(c.view_value(), Value::from(1.5));
        assert!(c.is_initial_value());
    }

    #[test]
    fn test_replay_on_subscribe() {
        let c = FieldControl::new(3.0);
        let (seen, _sub) = recorder(&c);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, ChangeKind::Initial);
        assert_eq!(seen[0].value, Value::from(3.0));
    }

    #[test]
    fn test_model_only_write_keeps_view() {
        let c = FieldControl::new(200.0);
        let (seen, _sub) = recorder(&c);
        c.set_value(Value::from(2.0), SetOptions::canonical());
        assert_eq!(c.value(), Value::from(2.0));
        assert_eq!(c.view_value(), Value::from(200.0));
        assert_eq!(seen.borrow()[1].kind, ChangeKind::Canonical);
    }

    #[test]
    fn test_view_only_write_keeps_model() {
        let c = FieldControl::new(3.0);
        c.set_value(Value::from(300.0), SetOptions::display());
        assert_eq!(c.value(), Value::from(3.0));
        assert_eq!(c.view_value(), Value::from(300.0));
        assert!(!c.is_initial_value());
    }

    #[test]
    fn test_silent_write_does_not_notify() {
        let c = FieldControl::new(1.0);
        let (seen, _sub) = recorder(&c);
        c.set_value(Value::from(2.0), SetOptions::input().silent());
        assert_eq!(seen.borrow().len(), 1);
        c.emit(ChangeKind::Input, None);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1].value, Value::from(2.0));
    }

    #[test]
    fn test_reset() {
        let c = FieldControl::new(1.0);
        c.input(5.0);
        assert!(!c.is_initial_value());
        c.reset();
        assert!(c.is_initial_value());
        assert_eq!(c.value(), Value::from(1.0));
    }

    #[test]
    fn test_tag_is_forwarded() {
        let c = FieldControl::new(1.0);
        let (seen, _sub) = recorder(&c);
        let tag = WriteTag::next();
        c.set_value(Value::from(2.0), SetOptions::canonical().tagged(tag));
        assert_eq!(seen.borrow()[1].tag, Some(tag));
    }
}
