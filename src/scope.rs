//! Named-variable management and `at=` scope resolution.
//!
//! A named variable lives in one of three places: bound to a single stack
//! frame, bound to the element that pushed that frame, or bound at the
//! document level (visible to every coroutine sharing the document). The
//! `at=` attribute on `<define>`/`<bind>` picks which [`VariableMap`] a new
//! binding lands in, or which one a lookup should start from.
//!
//! A `Vec` of per-frame contexts searched from innermost to outermost, each
//! a small `IndexMap`-backed store rather than a full hashmap per lookup
//! level.

use crate::variant::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct VariableMap {
    entries: IndexMap<String, Value>,
    listeners: Vec<Rc<dyn Fn(&str, &Value)>>,
}

impl VariableMap {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        for listener in &self.listeners {
            listener(&name, &value);
        }
        self.entries.insert(name, value);
    }

    pub fn undefine(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// Registers a callback invoked whenever a variable is (re)defined in
    /// this map — the hook `<observe>` uses to watch a named variable for
    /// `change` events.
    pub fn on_define(&mut self, listener: Rc<dyn Fn(&str, &Value)>) {
        self.listeners.push(listener);
    }
}

/// The `at=` qualifier grammar: either a small integer level count, one of
/// the named relative positions, or an `#id` element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtQualifier {
    /// `at="0"` is the current frame, `at="1"` its parent, and so on.
    Level(u32),
    Parent,
    Grandparent,
    Root,
    Topmost,
    Last,
    NextToLast,
    Id(String),
}

impl AtQualifier {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix('#') {
            return Some(AtQualifier::Id(id.to_string()));
        }
        if let Ok(n) = s.parse::<u32>() {
            return Some(AtQualifier::Level(n));
        }
        match s {
            "_parent" => Some(AtQualifier::Parent),
            "_grandparent" => Some(AtQualifier::Grandparent),
            "_root" => Some(AtQualifier::Root),
            "_topmost" => Some(AtQualifier::Topmost),
            "_last" => Some(AtQualifier::Last),
            "_nexttolast" => Some(AtQualifier::NextToLast),
            _ => None,
        }
    }
}

/// The stack of frame-level variable maps for one coroutine, ordered
/// outermost (the root element's frame, index 0) to innermost (the
/// currently executing frame, last index).
#[derive(Debug, Default)]
pub struct ScopeChain {
    frames: Vec<Rc<RefCell<VariableMap>>>,
    /// Variables visible to every coroutine sharing this document.
    pub document: Rc<RefCell<VariableMap>>,
    /// `#id`-addressable frames, populated as elements carrying an `id`
    /// attribute push their frame.
    by_id: IndexMap<String, Rc<RefCell<VariableMap>>>,
}

impl ScopeChain {
    pub fn push_frame(&mut self, id_attr: Option<&str>) -> Rc<RefCell<VariableMap>> {
        let map = Rc::new(RefCell::new(VariableMap::default()));
        if let Some(id) = id_attr {
            self.by_id.insert(id.to_string(), map.clone());
        }
        self.frames.push(map.clone());
        map
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Used by exception unwinding: drop every frame past `len` in one
    /// step, mirroring an abrupt multi-frame pop of the execution stack.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> Option<Rc<RefCell<VariableMap>>> {
        self.frames.last().cloned()
    }

    /// Resolve an `at=` qualifier to the [`VariableMap`] it designates.
    pub fn resolve(&self, at: &AtQualifier) -> Option<Rc<RefCell<VariableMap>>> {
        let len = self.frames.len();
        match at {
            AtQualifier::Level(n) => {
                let idx = len.checked_sub(1)?.checked_sub(*n as usize)?;
                self.frames.get(idx).cloned()
            }
            AtQualifier::Parent => self.resolve(&AtQualifier::Level(1)),
            AtQualifier::Grandparent => self.resolve(&AtQualifier::Level(2)),
            AtQualifier::NextToLast => self.resolve(&AtQualifier::Level(1)),
            AtQualifier::Last => self.resolve(&AtQualifier::Level(0)),
            AtQualifier::Root | AtQualifier::Topmost => self.frames.first().cloned(),
            AtQualifier::Id(id) => self.by_id.get(id).cloned(),
        }
    }

    /// Look up `name` starting at `at` (defaulting to the current frame) and
    /// walking outward to the document level if not found locally — the
    /// search order an unqualified variable reference uses.
    pub fn lookup(&self, name: &str, at: Option<&AtQualifier>) -> Option<Value> {
        if let Some(at) = at {
            return self.resolve(at).and_then(|m| m.borrow().get(name));
        }
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.borrow().get(name) {
                return Some(v);
            }
        }
        self.document.borrow().get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_at_qualifiers() {
        assert_eq!(AtQualifier::parse("2"), Some(AtQualifier::Level(2)));
        assert_eq!(AtQualifier::parse("_parent"), Some(AtQualifier::Parent));
        assert_eq!(
            AtQualifier::parse("#foo"),
            Some(AtQualifier::Id("foo".to_string()))
        );
        assert_eq!(AtQualifier::parse("bogus"), None);
    }

    #[test]
    fn level_resolution_walks_outward() {
        let mut chain = ScopeChain::default();
        let root = chain.push_frame(None);
        root.borrow_mut().define("x", Value::number(1.0));
        let _mid = chain.push_frame(None);
        let _leaf = chain.push_frame(None);

        assert_eq!(chain.lookup("x", Some(&AtQualifier::Level(2))).unwrap().numerify(), 1.0);
        assert!(chain.lookup("x", Some(&AtQualifier::Level(0))).is_none());
        assert_eq!(chain.lookup("x", None).unwrap().numerify(), 1.0);
    }

    #[test]
    fn id_selector_finds_named_frame() {
        let mut chain = ScopeChain::default();
        chain.push_frame(Some("top"));
        let inner = chain.push_frame(Some("leaf"));
        inner.borrow_mut().define("y", Value::number(2.0));

        assert_eq!(
            chain
                .lookup("y", Some(&AtQualifier::Id("leaf".to_string())))
                .unwrap()
                .numerify(),
            2.0
        );
    }

    #[test]
    fn falls_back_to_document_scope() {
        let mut chain = ScopeChain::default();
        chain.document.borrow_mut().define("g", Value::number(9.0));
        chain.push_frame(None);
        assert_eq!(chain.lookup("g", None).unwrap().numerify(), 9.0);
    }
}
