//! Mutable container payloads shared by the object/array/set/tuple variants,
//! plus the pre/post mutation-listener machinery: containers support pre-
//! and post-mutation listeners keyed by operation (`Grow`, `Shrink`,
//! `Change`).
//!
//! A `RefCell`-guarded payload plus a side table of callbacks: listeners
//! live next to the data they watch, not in a separate global registry, so
//! a dropped container drops its listeners for free.

use crate::error::{ErrorKind, HvmlError};
use crate::variant::Value;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Which kind of structural change a listener is watching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    /// A member is being added (array append/insert, object/set insert).
    Grow,
    /// A member is being removed.
    Shrink,
    /// An existing member's value is being replaced in place.
    Change,
}

/// Whether a listener is asked before (and can veto) or after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    Pre,
    Post,
}

type ListenerFn = Rc<dyn Fn(MutationOp, &Value) -> Result<(), HvmlError>>;

#[derive(Default, Clone)]
pub struct Listeners {
    pre: Vec<ListenerFn>,
    post: Vec<ListenerFn>,
}

impl Listeners {
    pub fn register(&mut self, phase: ListenerPhase, f: ListenerFn) {
        match phase {
            ListenerPhase::Pre => self.pre.push(f),
            ListenerPhase::Post => self.post.push(f),
        }
    }

    fn fire_pre(&self, op: MutationOp, detail: &Value) -> Result<(), HvmlError> {
        for l in &self.pre {
            l(op, detail)?;
        }
        Ok(())
    }

    fn fire_post(&self, op: MutationOp, detail: &Value) {
        for l in &self.post {
            // Post listeners observe a committed change; a panic-safe
            // interpreter logs failures here rather than propagating them
            // (the mutation already happened).
            let _ = l(op, detail);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Listeners {{ pre: {}, post: {} }}",
            self.pre.len(),
            self.post.len()
        )
    }
}

/// An ordered key -> value map, backing the `object` variant.
#[derive(Debug, Default)]
pub struct ObjectData {
    pub entries: IndexMap<String, Value>,
    pub listeners: Listeners,
}

impl ObjectData {
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<(), HvmlError> {
        let key = key.into();
        let op = if self.entries.contains_key(&key) {
            MutationOp::Change
        } else {
            MutationOp::Grow
        };
        self.listeners.fire_pre(op, &value)?;
        self.entries.insert(key, value.clone());
        self.listeners.fire_post(op, &value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, HvmlError> {
        let Some(existing) = self.entries.get(key).cloned() else {
            return Ok(None);
        };
        self.listeners.fire_pre(MutationOp::Shrink, &existing)?;
        let removed = self.entries.shift_remove(key);
        self.listeners.fire_post(MutationOp::Shrink, &existing);
        Ok(removed)
    }

    /// `<update to="merge">` semantics: keys present in `other` win over
    /// existing keys of the same name.
    pub fn merge_from(&mut self, other: &ObjectData) -> Result<(), HvmlError> {
        for (k, v) in &other.entries {
            self.set(k.clone(), v.clone())?;
        }
        Ok(())
    }
}

/// The `array` variant's backing store: an ordered, index-addressed sequence.
#[derive(Debug, Default)]
pub struct ArrayData {
    pub items: Vec<Value>,
    pub listeners: Listeners,
}

impl ArrayData {
    pub fn push(&mut self, value: Value) -> Result<(), HvmlError> {
        self.listeners.fire_pre(MutationOp::Grow, &value)?;
        self.items.push(value.clone());
        self.listeners.fire_post(MutationOp::Grow, &value);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), HvmlError> {
        if index > self.items.len() {
            return Err(HvmlError::new(ErrorKind::InvalidValue));
        }
        self.listeners.fire_pre(MutationOp::Grow, &value)?;
        self.items.insert(index, value.clone());
        self.listeners.fire_post(MutationOp::Grow, &value);
        Ok(())
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), HvmlError> {
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;
        self.listeners.fire_pre(MutationOp::Change, &value)?;
        *slot = value.clone();
        self.listeners.fire_post(MutationOp::Change, &value);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Value, HvmlError> {
        if index >= self.items.len() {
            return Err(HvmlError::new(ErrorKind::InvalidValue));
        }
        let existing = self.items[index].clone();
        self.listeners.fire_pre(MutationOp::Shrink, &existing)?;
        let removed = self.items.remove(index);
        self.listeners.fire_post(MutationOp::Shrink, &existing);
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), HvmlError> {
        while !self.items.is_empty() {
            self.remove(self.items.len() - 1)?;
        }
        Ok(())
    }
}

/// The `set` variant: either keyed (unique by an object property name,
/// `unique-keys`) or anonymous (unique by structural equality).
#[derive(Debug)]
pub struct SetData {
    pub unique_keys: Option<Vec<String>>,
    pub items: Vec<Value>,
    pub listeners: Listeners,
}

impl SetData {
    pub fn anonymous() -> Self {
        Self {
            unique_keys: None,
            items: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn keyed(keys: Vec<String>) -> Self {
        Self {
            unique_keys: Some(keys),
            items: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    fn key_of<'a>(&self, v: &'a Value) -> Option<Vec<Option<Value>>> {
        let keys = self.unique_keys.as_ref()?;
        let Value::Object(obj) = v else {
            return None;
        };
        let obj = obj.borrow();
        Some(
            keys.iter()
                .map(|k| obj.entries.get(k).cloned())
                .collect(),
        )
    }

    fn find_conflict(&self, candidate: &Value) -> Option<usize> {
        match self.key_of(candidate) {
            Some(key) => self
                .items
                .iter()
                .position(|existing| self.key_of(existing).as_ref() == Some(&key)),
            None => self
                .items
                .iter()
                .position(|existing| crate::variant::isequal(existing, candidate)),
        }
    }

    /// Insert, overwriting any member that conflicts on the unique key (or,
    /// for an anonymous set, on structural equality).
    pub fn insert(&mut self, value: Value) -> Result<(), HvmlError> {
        match self.find_conflict(&value) {
            Some(idx) => {
                self.listeners.fire_pre(MutationOp::Change, &value)?;
                self.items[idx] = value.clone();
                self.listeners.fire_post(MutationOp::Change, &value);
            }
            None => {
                self.listeners.fire_pre(MutationOp::Grow, &value)?;
                self.items.push(value.clone());
                self.listeners.fire_post(MutationOp::Grow, &value);
            }
        }
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Value, HvmlError> {
        if index >= self.items.len() {
            return Err(HvmlError::new(ErrorKind::InvalidValue));
        }
        let existing = self.items[index].clone();
        self.listeners.fire_pre(MutationOp::Shrink, &existing)?;
        let removed = self.items.remove(index);
        self.listeners.fire_post(MutationOp::Shrink, &existing);
        Ok(removed)
    }
}

/// The `tuple` variant: a fixed-length sequence whose *members* remain
/// mutable in place, unlike array/set which can grow and shrink.
#[derive(Debug)]
pub struct TupleData {
    pub items: Vec<Value>,
    pub listeners: Listeners,
}

impl TupleData {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            listeners: Listeners::default(),
        }
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), HvmlError> {
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;
        self.listeners.fire_pre(MutationOp::Change, &value)?;
        *slot = value.clone();
        self.listeners.fire_post(MutationOp::Change, &value);
        Ok(())
    }
}
