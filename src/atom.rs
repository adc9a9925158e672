//! Process-wide atom interning.
//!
//! Tag names, exception names, and event `type`/`sub-type` tokens are all
//! short strings that get hashed and compared constantly by the scheduler and
//! observer tables. Interning them once into a small integer buys cheap
//! equality and hashing everywhere else in the crate.
//!
//! The atom table is a process-wide singleton guarded by a writer-priority
//! rwlock rather than per-runtime state — atoms never need to be released,
//! so contention is write-once, read-many.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct Interner {
    by_str: HashMap<Arc<str>, u32>,
    by_id: Vec<Arc<str>>,
}

impl Interner {
    fn new() -> Self {
        Self {
            by_str: HashMap::new(),
            by_id: Vec::new(),
        }
    }
}

static INTERNER: Lazy<RwLock<Interner>> = Lazy::new(|| RwLock::new(Interner::new()));

/// An interned string. Two atoms are equal iff they were interned from equal
/// strings; comparison is an integer compare, not a string compare.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(u32);

impl Atom {
    pub fn new(s: &str) -> Self {
        // Fast path: read lock only.
        if let Some(id) = INTERNER.read().by_str.get(s) {
            return Atom(*id);
        }

        let mut interner = INTERNER.write();
        // Another writer may have beaten us to it between the two locks.
        if let Some(id) = interner.by_str.get(s) {
            return Atom(*id);
        }

        let arc: Arc<str> = Arc::from(s);
        let id = interner.by_id.len() as u32;
        interner.by_id.push(arc.clone());
        interner.by_str.insert(arc, id);
        Atom(id)
    }

    pub fn as_str(&self) -> Arc<str> {
        INTERNER.read().by_id[self.0 as usize].clone()
    }

    /// Parse `type:sub` event-name atoms into their two components.
    ///
    /// Names use the convention `type:sub` separated by `:`. A name with
    /// no `:` has an empty sub-type.
    pub fn split_type_sub(name: &str) -> (&str, &str) {
        match name.find(':') {
            Some(idx) => (&name[..idx], &name[idx + 1..]),
            None => (name, ""),
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.as_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Atom::new(s)
    }
}

impl From<String> for Atom {
    fn from(s: String) -> Self {
        Atom::new(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = Atom::new("observe:expired");
        let b = Atom::new("observe:expired");
        assert_eq!(a, b);
        assert_eq!(&*a.as_str(), "observe:expired");
    }

    #[test]
    fn distinct_strings_distinct_atoms() {
        assert_ne!(Atom::new("change"), Atom::new("grow"));
    }

    #[test]
    fn split_type_sub_with_and_without_colon() {
        assert_eq!(Atom::split_type_sub("expired:tick"), ("expired", "tick"));
        assert_eq!(Atom::split_type_sub("rdrState"), ("rdrState", ""));
    }
}
