//! The `Variant` data model: a closed, 15-constructor tagged value,
//! reference-counted via `Rc` so that `Value::clone()` alone tracks
//! liveness — no manual bookkeeping needed.
//!
//! Containers (`object`, `array`, `set`, `tuple`) are `Rc<RefCell<...>>` so
//! multiple named variables can alias the same mutable container, which is
//! exactly what's needed when two scopes bind the same object.

pub mod bytes;
pub mod container;
pub mod native;
pub mod serialize;
pub mod sort;

use crate::error::HvmlError;
use container::{ArrayData, ObjectData, SetData, TupleData};
use native::Native;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A dynamic variant: a computed getter, with an optional setter closure.
pub struct Dynamic {
    pub getter: Rc<dyn Fn() -> Value>,
    pub setter: Option<Rc<dyn Fn(Value) -> Result<(), HvmlError>>>,
}

impl Dynamic {
    pub fn get(&self) -> Value {
        (self.getter)()
    }

    pub fn set(&self, value: Value) -> Result<(), HvmlError> {
        match &self.setter {
            Some(setter) => setter(value),
            None => Err(HvmlError::new(crate::error::ErrorKind::NotSupported)),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dynamic(has_setter={})", self.setter.is_some())
    }
}

/// The tagged value type at the heart of the interpreter.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Undefined,
    Boolean(bool),
    /// An exception atom used as a value (e.g. bound to `$ERR` context
    /// data), distinct from the `HvmlError` control-flow tier.
    Exception(crate::atom::Atom),
    /// A plain IEEE-754 double, the everyday numeric type.
    Number(f64),
    LongInt(i64),
    ULongInt(u64),
    /// 80-bit extended precision ("C `long double`"), stored widened to
    /// `f64` in memory — only the `fetch_real`/serialize paths need the
    /// true 80-bit layout, and those work directly on byte sequences.
    LongDouble(f64),
    AtomString(crate::atom::Atom),
    String(Rc<str>),
    ByteSequence(Rc<Vec<u8>>),
    Dynamic(Rc<Dynamic>),
    Native(Rc<Native>),
    Object(Rc<RefCell<ObjectData>>),
    Array(Rc<RefCell<ArrayData>>),
    Set(Rc<RefCell<SetData>>),
    Tuple(Rc<RefCell<TupleData>>),
}

/// The variant's runtime type tag, as exposed to HVML via `typeof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Null,
    Undefined,
    Boolean,
    Exception,
    Number,
    LongInt,
    ULongInt,
    LongDouble,
    AtomString,
    String,
    ByteSequence,
    Dynamic,
    Native,
    Object,
    Array,
    Set,
    Tuple,
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        let mut data = ArrayData::default();
        for item in items {
            // Construction never runs user listeners that could reasonably
            // fail; an empty `ArrayData` has none yet.
            data.push(item).expect("fresh array has no listeners");
        }
        Value::Array(Rc::new(RefCell::new(data)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(RefCell::new(TupleData::new(items))))
    }

    pub fn object(entries: Vec<(String, Value)>) -> Self {
        let mut data = ObjectData::default();
        for (k, v) in entries {
            data.set(k, v).expect("fresh object has no listeners");
        }
        Value::Object(Rc::new(RefCell::new(data)))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Undefined => TypeTag::Undefined,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Exception(_) => TypeTag::Exception,
            Value::Number(_) => TypeTag::Number,
            Value::LongInt(_) => TypeTag::LongInt,
            Value::ULongInt(_) => TypeTag::ULongInt,
            Value::LongDouble(_) => TypeTag::LongDouble,
            Value::AtomString(_) => TypeTag::AtomString,
            Value::String(_) => TypeTag::String,
            Value::ByteSequence(_) => TypeTag::ByteSequence,
            Value::Dynamic(_) => TypeTag::Dynamic,
            Value::Native(_) => TypeTag::Native,
            Value::Object(_) => TypeTag::Object,
            Value::Array(_) => TypeTag::Array,
            Value::Set(_) => TypeTag::Set,
            Value::Tuple(_) => TypeTag::Tuple,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.type_tag(),
            TypeTag::Object | TypeTag::Array | TypeTag::Set | TypeTag::Tuple
        )
    }

    /// Every variant has a total numeric projection, used by arithmetic
    /// expression evaluation.
    pub fn numerify(&self) -> f64 {
        match self {
            Value::Null | Value::Undefined => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Exception(_) => 0.0,
            Value::Number(n) => *n,
            Value::LongInt(n) => *n as f64,
            Value::ULongInt(n) => *n as f64,
            Value::LongDouble(n) => *n,
            Value::AtomString(a) => a.as_str().trim().parse().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            Value::ByteSequence(b) => b.len() as f64,
            Value::Dynamic(d) => d.get().numerify(),
            Value::Native(n) => n.entity().numerify().unwrap_or(0.0),
            Value::Object(o) => o.borrow().entries.values().map(Value::numerify).sum(),
            Value::Array(a) => a.borrow().items.iter().map(Value::numerify).sum(),
            Value::Set(s) => s.borrow().items.iter().map(Value::numerify).sum(),
            Value::Tuple(t) => t.borrow().items.iter().map(Value::numerify).sum(),
        }
    }

    /// The truthiness rule used by `<test>`/`hvml:raw`-boolean attribute
    /// coercion.
    pub fn booleanize(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Boolean(b) => *b,
            Value::Exception(_) => true,
            Value::Number(n) => *n != 0.0,
            Value::LongInt(n) => *n != 0,
            Value::ULongInt(n) => *n != 0,
            Value::LongDouble(n) => *n != 0.0,
            Value::AtomString(a) => !a.as_str().is_empty() && a.as_str().chars().any(|c| c != '0'),
            Value::String(s) => !s.is_empty() && s.chars().any(|c| c != '0'),
            Value::ByteSequence(b) => !b.is_empty() && b.iter().any(|&byte| byte != 0),
            Value::Dynamic(d) => d.get().booleanize(),
            Value::Native(n) => n.entity().numerify().map(|v| v != 0.0).unwrap_or(true),
            Value::Object(o) => !o.borrow().entries.is_empty(),
            Value::Array(a) => !a.borrow().items.is_empty(),
            Value::Set(s) => !s.borrow().items.is_empty(),
            Value::Tuple(t) => !t.borrow().items.is_empty(),
        }
    }

    /// A string projection used for display/interpolation and `auto`-
    /// caseness comparisons; not the same as EJSON `serialize`.
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Exception(a) => a.as_str().to_string(),
            Value::Number(n) => format!("{n}"),
            Value::LongInt(n) => n.to_string(),
            Value::ULongInt(n) => n.to_string(),
            Value::LongDouble(n) => format!("{n}"),
            Value::AtomString(a) => a.as_str().to_string(),
            Value::String(s) => s.to_string(),
            Value::ByteSequence(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Dynamic(d) => d.get().stringify(),
            Value::Native(n) => format!("<native:{}>", n.entity().type_name()),
            Value::Object(_) | Value::Array(_) | Value::Set(_) | Value::Tuple(_) => {
                serialize::serialize(self, &serialize::SerializeFlags::default())
            }
        }
    }
}

/// Strict-by-type equality: a number never equals the string that looks
/// like it.
pub fn isequal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Exception(x), Value::Exception(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::LongInt(x), Value::LongInt(y)) => x == y,
        (Value::ULongInt(x), Value::ULongInt(y)) => x == y,
        (Value::LongDouble(x), Value::LongDouble(y)) => x == y,
        (Value::AtomString(x), Value::AtomString(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::ByteSequence(x), Value::ByteSequence(y)) => x == y,
        (Value::Dynamic(x), Value::Dynamic(y)) => Rc::ptr_eq(x, y),
        (Value::Native(x), Value::Native(y)) => x
            .entity()
            .equal_to(y.entity().as_ref())
            .unwrap_or_else(|| x.ptr_eq(y)),
        (Value::Object(x), Value::Object(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.entries.len() == y.entries.len()
                && x.entries
                    .iter()
                    .all(|(k, v)| y.entries.get(k).map(|yv| isequal(v, yv)).unwrap_or(false))
        }
        (Value::Array(x), Value::Array(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.items.len() == y.items.len()
                && x.items.iter().zip(y.items.iter()).all(|(a, b)| isequal(a, b))
        }
        (Value::Set(x), Value::Set(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.items.len() == y.items.len()
                && x.items
                    .iter()
                    .all(|a| y.items.iter().any(|b| isequal(a, b)))
        }
        (Value::Tuple(x), Value::Tuple(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.items.len() == y.items.len()
                && x.items.iter().zip(y.items.iter()).all(|(a, b)| isequal(a, b))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerify_rules() {
        assert_eq!(Value::Null.numerify(), 0.0);
        assert_eq!(Value::Boolean(true).numerify(), 1.0);
        assert_eq!(Value::string("42").numerify(), 42.0);
        assert_eq!(Value::string("nope").numerify(), 0.0);
        assert_eq!(
            Value::array(vec![Value::number(1.0), Value::number(2.0)]).numerify(),
            3.0
        );
    }

    #[test]
    fn booleanize_rules() {
        assert!(!Value::Null.booleanize());
        assert!(!Value::array(vec![]).booleanize());
        assert!(Value::array(vec![Value::Null]).booleanize());
        assert!(!Value::string("0").booleanize());
        assert!(Value::string("0.0").booleanize());
    }

    #[test]
    fn isequal_is_type_strict() {
        assert!(!isequal(&Value::Number(0.0), &Value::string("0")));
        assert!(isequal(&Value::Number(1.0), &Value::Number(1.0)));
    }

    #[test]
    fn refcount_tracks_clones() {
        let v = Value::array(vec![]);
        let Value::Array(rc) = &v else { unreachable!() };
        assert_eq!(Rc::strong_count(rc), 1);
        let v2 = v.clone();
        let Value::Array(rc2) = &v2 else { unreachable!() };
        assert_eq!(Rc::strong_count(rc2), 2);
        drop(v2);
        assert_eq!(Rc::strong_count(rc), 1);
    }
}
