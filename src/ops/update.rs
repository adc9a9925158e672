//! `<update on="$var" to="verb" at="..." individually with="...">`: mutates a
//! named variable's container value in place. A `#id`-prefixed `at=` also
//! pushes an [`EdomOp`] at the element that declared this `<update>`.
//!
//! `to=` accepts the full update verb table: `displace` (default), `append`,
//! `prepend`, `insertBefore`, `insertAfter`, `merge`, `overwrite`, `remove`,
//! `unite`, `intersect`, `subtract`, `xor`. A non-`#` `at=` addresses a
//! sub-path of the target — a numeric index into an array/tuple, or a
//! (`.`-prefixed) key into an object — and the verb applies to that sub-path
//! instead of the whole container. `individually` treats the target as a
//! collection of members and applies the `at=`-addressed update to each
//! member in turn, rather than once to the collection itself.
//!
//! `to="merge"` on conflicting object keys takes the incoming value: the
//! source object always wins over the destination's existing key.

use crate::coroutine::Coroutine;
use crate::edom::{EdomOp, EdomSink};
use crate::error::{ErrorKind, HvmlError};
use crate::ops::eval_attr_text;
use crate::variant::container::ArrayData;
use crate::variant::{isequal, Value};
use crate::vdom::VdomSource;
use std::cell::RefCell;
use std::rc::Rc;

enum AtPath {
    Index(usize),
    Key(String),
}

fn parse_at(at: &str) -> AtPath {
    let trimmed = at.trim_start_matches('.');
    match trimmed.parse::<usize>() {
        Ok(n) => AtPath::Index(n),
        Err(_) => AtPath::Key(trimmed.to_string()),
    }
}

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();

    let target_name = element
        .attr("on")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let op = element
        .attr("to")
        .map(|a| a.value.as_str())
        .unwrap_or("displace")
        .to_string();
    let with_value = element
        .attr("with")
        .map(|a| eval_attr_text(co, &a.value))
        .unwrap_or(Value::Undefined);
    let individually = element.attr("individually").is_some();
    let at_attr = element.attr("at").map(|a| a.value.clone());

    let target_name = target_name.trim_start_matches('$').to_string();
    let current = co.scope.lookup(&target_name, None);

    let container_at = at_attr.as_deref().filter(|s| !s.starts_with('#')).map(parse_at);

    let updated = if op == "insertBefore" || op == "insertAfter" {
        let AtPath::Index(index) = container_at.ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))? else {
            return Err(HvmlError::new(ErrorKind::ArgumentMissed));
        };
        apply_insert(current, with_value, op == "insertBefore", index)?
    } else {
        match container_at {
            Some(path) if individually => apply_individually(current, &op, with_value, &path)?,
            Some(path) => apply_at(current, &op, with_value, &path)?,
            None => apply_update(current, &op, with_value)?,
        }
    };

    // Write back wherever the variable currently resolves, falling back to
    // document scope for a variable that doesn't exist yet.
    if let Some(map) = co.scope.current() {
        if map.borrow().get(&target_name).is_some() {
            map.borrow_mut().define(target_name.clone(), updated.clone());
        } else {
            co.scope.document.borrow_mut().define(target_name.clone(), updated.clone());
        }
    }

    if let Some(id) = at_attr.as_deref().and_then(|s| s.strip_prefix('#')) {
        let _ = id;
        sink.apply(EdomOp::Update {
            target: frame_element,
            content: updated.stringify(),
        });
    }
    Ok(())
}

fn apply_update(current: Option<Value>, op: &str, with: Value) -> Result<Value, HvmlError> {
    match op {
        "displace" => Ok(with),
        "merge" => merge_objects(current, with, true),
        "overwrite" => merge_objects(current, with, false),
        "append" => append_or_new(current, with, true),
        "prepend" => append_or_new(current, with, false),
        "remove" => {
            let Some(Value::Array(arr)) = current else {
                return Ok(Value::array(vec![]));
            };
            let target = with.stringify();
            arr.borrow_mut()
                .items
                .retain(|item| item.stringify() != target);
            Ok(Value::Array(arr))
        }
        "unite" => set_like(current, with, SetOp::Union),
        "intersect" => set_like(current, with, SetOp::Intersect),
        "subtract" => set_like(current, with, SetOp::Subtract),
        "xor" => set_like(current, with, SetOp::Xor),
        _ => Err(HvmlError::new(ErrorKind::InvalidValue)),
    }
}

/// Apply `op` to the sub-path of `current` addressed by `at`, writing the
/// result back into that same slot and returning the (unchanged identity)
/// container.
fn apply_at(current: Option<Value>, op: &str, with: Value, at: &AtPath) -> Result<Value, HvmlError> {
    match (current, at) {
        (Some(Value::Object(obj)), AtPath::Key(key)) => {
            let existing = obj.borrow().entries.get(key).cloned();
            let updated = apply_update(existing, op, with)?;
            obj.borrow_mut().set(key.clone(), updated)?;
            Ok(Value::Object(obj))
        }
        (Some(Value::Array(arr)), AtPath::Index(idx)) => {
            let existing = arr.borrow().items.get(*idx).cloned();
            let updated = apply_update(existing, op, with)?;
            arr.borrow_mut().set(*idx, updated)?;
            Ok(Value::Array(arr))
        }
        (Some(Value::Tuple(t)), AtPath::Index(idx)) => {
            let existing = t.borrow().items.get(*idx).cloned();
            let updated = apply_update(existing, op, with)?;
            t.borrow_mut().set(*idx, updated)?;
            Ok(Value::Tuple(t))
        }
        _ => Err(HvmlError::new(ErrorKind::InvalidValue)),
    }
}

/// `individually`: `current` is itself a collection of members, and `at`
/// addresses the same sub-path within every one of them.
fn apply_individually(current: Option<Value>, op: &str, with: Value, at: &AtPath) -> Result<Value, HvmlError> {
    let Some(Value::Array(arr)) = current else {
        return Err(HvmlError::new(ErrorKind::WrongDataType));
    };
    let len = arr.borrow().items.len();
    for i in 0..len {
        let member = arr.borrow().items[i].clone();
        let updated_member = apply_at(Some(member), op, with.clone(), at)?;
        arr.borrow_mut().set(i, updated_member)?;
    }
    Ok(Value::Array(arr))
}

fn apply_insert(current: Option<Value>, with: Value, before: bool, index: usize) -> Result<Value, HvmlError> {
    let arr = match current {
        Some(Value::Array(a)) => a,
        _ => Rc::new(RefCell::new(ArrayData::default())),
    };
    let insert_at = if before { index } else { index + 1 };
    let items = match with {
        Value::Array(a) => a.borrow().items.clone(),
        other => vec![other],
    };
    {
        let mut borrow = arr.borrow_mut();
        for (offset, item) in items.into_iter().enumerate() {
            borrow.insert(insert_at + offset, item)?;
        }
    }
    Ok(Value::Array(arr))
}

fn merge_objects(current: Option<Value>, with: Value, add_new: bool) -> Result<Value, HvmlError> {
    let Some(Value::Object(dst)) = current else {
        return if add_new { Ok(with) } else { Err(HvmlError::new(ErrorKind::NoData)) };
    };
    let Value::Object(src) = with else {
        return Err(HvmlError::new(ErrorKind::WrongDataType));
    };
    {
        let src_borrow = src.borrow();
        let mut dst_mut = dst.borrow_mut();
        for (k, v) in &src_borrow.entries {
            if add_new || dst_mut.entries.contains_key(k) {
                dst_mut.set(k.clone(), v.clone())?;
            }
        }
    }
    Ok(Value::Object(dst))
}

fn append_or_new(current: Option<Value>, with: Value, append: bool) -> Result<Value, HvmlError> {
    let arr = match current {
        Some(Value::Array(a)) => a,
        _ => Rc::new(RefCell::new(ArrayData::default())),
    };
    if append {
        arr.borrow_mut().push(with)?;
    } else {
        arr.borrow_mut().insert(0, with)?;
    }
    Ok(Value::Array(arr))
}

enum SetOp {
    Union,
    Intersect,
    Subtract,
    Xor,
}

fn set_like(current: Option<Value>, with: Value, op: SetOp) -> Result<Value, HvmlError> {
    let a = as_item_vec(current);
    let b = as_item_vec(Some(with));
    let result = match op {
        SetOp::Union => {
            let mut out = a.clone();
            for item in b {
                if !out.iter().any(|x| isequal(x, &item)) {
                    out.push(item);
                }
            }
            out
        }
        SetOp::Intersect => a.into_iter().filter(|x| b.iter().any(|y| isequal(x, y))).collect(),
        SetOp::Subtract => a.into_iter().filter(|x| !b.iter().any(|y| isequal(x, y))).collect(),
        SetOp::Xor => {
            let mut out: Vec<Value> = a.iter().filter(|x| !b.iter().any(|y| isequal(x, y))).cloned().collect();
            out.extend(b.iter().filter(|y| !a.iter().any(|x| isequal(x, y))).cloned());
            out
        }
    };
    Ok(Value::array(result))
}

fn as_item_vec(v: Option<Value>) -> Vec<Value> {
    match v {
        Some(Value::Array(a)) => a.borrow().items.clone(),
        Some(Value::Set(s)) => s.borrow().items.clone(),
        Some(other) => vec![other],
        None => vec![],
    }
}
