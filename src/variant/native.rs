//! Native variants: an opaque entity plus an open method table.
//!
//! A closed sum-type covers the built-in value forms; [`NativeEntity`] is
//! the one open extension point, a method-table trait that lets a host plug
//! in opaque behavior without adding a new `Value` constructor.

use crate::atom::Atom;
use crate::error::{ErrorKind, HvmlError};
use crate::variant::Value;
use std::rc::Rc;

/// The method table a native entity exposes to the interpreter: an opaque
/// `entity` plus `property_getter`/`property_setter`/`property_eraser`/
/// `on_observe`/`on_release` hooks.
pub trait NativeEntity {
    /// Human-readable name, used in error messages and `stringify`.
    fn type_name(&self) -> &str {
        "native"
    }

    fn property_getter(&self, _name: &str) -> Option<Value> {
        None
    }

    fn property_setter(&self, _name: &str, _value: Value) -> Result<(), HvmlError> {
        Err(HvmlError::new(ErrorKind::NotSupported))
    }

    fn property_eraser(&self, _name: &str) -> Result<(), HvmlError> {
        Err(HvmlError::new(ErrorKind::NotSupported))
    }

    /// Must return `true` before any observer over this native is allowed.
    /// Returning `false` causes the registering `<observe>` to fail.
    fn on_observe(&self, _event_type: Atom, _sub_type: Atom) -> bool {
        false
    }

    /// Runs exactly once, when the last strong reference to this entity is
    /// dropped (see [`Native`]'s `Drop` impl).
    fn on_release(&self) {}

    /// Overrides structural equality: native equality defers to pointer
    /// identity unless the native exposes an `equal_to` method.
    fn equal_to(&self, _other: &dyn NativeEntity) -> Option<bool> {
        None
    }

    /// Overrides the default numerify-to-zero rule.
    fn numerify(&self) -> Option<f64> {
        None
    }
}

/// A reference-counted native variant. Wraps `Rc<dyn NativeEntity>` so the
/// ordinary `Value::clone()` path (which just bumps an `Rc`) is sufficient to
/// track liveness without any manual bookkeeping.
pub struct Native {
    entity: Rc<dyn NativeEntity>,
}

impl Native {
    pub fn new(entity: Rc<dyn NativeEntity>) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Rc<dyn NativeEntity> {
        &self.entity
    }

    pub fn ptr_eq(&self, other: &Native) -> bool {
        Rc::ptr_eq(&self.entity, &other.entity)
    }
}

impl Clone for Native {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
        }
    }
}

impl Drop for Native {
    fn drop(&mut self) {
        // `on_release` must run exactly once, right before the entity itself
        // is actually freed. `strong_count == 1` here means this is the last
        // handle; after this drop completes, the `Rc` inside will free it.
        if Rc::strong_count(&self.entity) == 1 {
            self.entity.on_release();
        }
    }
}

impl std::fmt::Debug for Native {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Native({})", self.entity.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        released: Rc<Cell<bool>>,
    }

    impl NativeEntity for Counter {
        fn type_name(&self) -> &str {
            "counter"
        }
        fn on_release(&self) {
            self.released.set(true);
        }
    }

    #[test]
    fn on_release_runs_once_on_last_drop() {
        let released = Rc::new(Cell::new(false));
        let entity: Rc<dyn NativeEntity> = Rc::new(Counter {
            released: released.clone(),
        });
        let a = Native::new(entity);
        let b = a.clone();
        drop(a);
        assert!(!released.get(), "still one live reference");
        drop(b);
        assert!(released.get(), "last reference dropped");
    }
}
