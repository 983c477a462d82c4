//! In-memory composite control

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use gauge_core::Value;
use crate::control::{Change, ChangeKind, Control, Listener, Listeners, SetOptions, Subscription, WriteTag};
use crate::ControlExt;

/// A composite control made of named sub-controls.
///
/// Its value is an object with one field per sub-control. Changes of a
/// sub-control are re-emitted by the group.
#[derive(Clone)]
pub struct GroupControl {
    inner: Rc<GroupInner>,
}

struct GroupInner {
    fields: Vec<(String, Rc<dyn Control>)>,
    initial: Value,
    listeners: Rc<Listeners>,
    field_subs: RefCell<Vec<Subscription>>,
}

impl GroupInner {
    fn value(&self) -> Value {
        Value::Object(self.fields.iter().map(|(k, c)| (k.clone(), c.value())).collect::<HashMap<_, _>>())
    }

    fn view_value(&self) -> Value {
        Value::Object(self.fields.iter().map(|(k, c)| (k.clone(), c.view_value())).collect::<HashMap<_, _>>())
    }

    fn change(&self, kind: ChangeKind, tag: Option<WriteTag>) -> Change {
        Change { kind, value: self.value(), view: self.view_value(), tag }
    }

    fn emit(&self, kind: ChangeKind, tag: Option<WriteTag>) {
        self.listeners.emit(&self.change(kind, tag));
    }
}

impl GroupControl {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Rc<dyn Control>)>,
        K: Into<String>,
    {
        let fields: Vec<(String, Rc<dyn Control>)> = fields.into_iter().map(|(k, c)| (k.into(), c)).collect();
        let initial = Value::Object(fields.iter().map(|(k, c)| (k.clone(), c.view_value())).collect());
        let inner = Rc::new(GroupInner {
            fields,
            initial,
            listeners: Listeners::new(),
            field_subs: RefCell::new(Vec::new()),
        });

        let weak: Weak<GroupInner> = Rc::downgrade(&inner);
        for (_, field) in &inner.fields {
            let group = weak.clone();
            let sub = field.on_change(move |change| {
                if change.kind == ChangeKind::Initial {
                    return;
                }
                if let Some(group) = group.upgrade() {
                    group.emit(change.kind, change.tag);
                }
            });
            inner.field_subs.borrow_mut().push(sub);
        }

        GroupControl { inner }
    }

    pub fn builder() -> GroupBuilder {
        GroupBuilder { fields: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Control>> {
        self.inner.fields.iter().find(|(k, _)| k == name).map(|(_, c)| c.clone())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.inner.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Enter a whole value as the user would
    pub fn input(&self, value: impl Into<Value>) {
        self.set_value(value.into(), SetOptions::input());
    }

    pub fn initial_value(&self) -> Value {
        self.inner.initial.clone()
    }

    pub fn reset(&self) {
        self.input(self.inner.initial.clone());
    }

    pub fn is_initial_value(&self) -> bool {
        self.inner.view_value() == self.inner.initial
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn handle(&self) -> Rc<dyn Control> {
        Rc::new(self.clone())
    }
}

impl Control for GroupControl {
    fn value(&self) -> Value {
        self.inner.value()
    }

    fn view_value(&self) -> Value {
        self.inner.view_value()
    }

    /// Writes every sub-control silently, then notifies once
    fn set_value(&self, value: Value, options: SetOptions) {
        for (name, field) in &self.inner.fields {
            field.set_value(value.field(name), options.silent());
        }
        if !options.silent {
            self.emit(options.kind(), options.tag);
        }
    }

    fn emit(&self, kind: ChangeKind, tag: Option<WriteTag>) {
        self.inner.emit(kind, tag);
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let initial = self.inner.change(ChangeKind::Initial, None);
        self.inner.listeners.subscribe(listener, initial)
    }

    fn sub_controls(&self) -> Vec<(String, Rc<dyn Control>)> {
        self.inner.fields.clone()
    }
}

/// Collects named sub-controls of different kinds
pub struct GroupBuilder {
    fields: Vec<(String, Rc<dyn Control>)>,
}

impl GroupBuilder {
    pub fn field<C: Control + 'static>(mut self, name: &str, control: C) -> Self {
        self.fields.push((name.to_string(), Rc::new(control)));
        self
    }

    pub fn build(self) -> GroupControl {
        GroupControl::new(self.fields)
    }
}
