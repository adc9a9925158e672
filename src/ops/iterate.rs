//! `<iterate on="$dataset">`: re-runs its children once per member of
//! `on`'s array/set/object/tuple value, binding `?` to the member and `%`
//! to its position. Structured as a `select_child` override that hands back
//! the same child list repeatedly, one walk per iteration, and a `rerun`
//! that advances to the next member in between walks.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::frame::{NextStep, SymbolSlot};
use crate::ops::eval_attr_text;
use crate::variant::Value;
use crate::vdom::{ElementId, VdomSource};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

struct IterState {
    items: Vec<Value>,
    position: usize,
}

fn state_cell<V: VdomSource>(co: &mut Coroutine<V>) -> Rc<RefCell<dyn Any>> {
    let frame = co.frames.last_mut().unwrap();
    if frame.ctxt.is_none() {
        let element = co.vdom.element(frame.element).clone();
        frame.ctxt = Some(Rc::new(RefCell::new(None::<IterState>)));
        let _ = element;
    }
    frame.ctxt.clone().unwrap()
}

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let on_attr = element
        .attr("on")
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let dataset = eval_attr_text(co, &on_attr.value);

    let items = match dataset {
        Value::Array(a) => a.borrow().items.clone(),
        Value::Set(s) => s.borrow().items.clone(),
        Value::Tuple(t) => t.borrow().items.clone(),
        Value::Object(o) => o
            .borrow()
            .entries
            .values()
            .cloned()
            .collect(),
        other => vec![other],
    };

    let cell = state_cell(co);
    *cell.borrow_mut().downcast_mut::<Option<IterState>>().unwrap() = Some(IterState { items, position: 0 });
    bind_current(co);
    Ok(())
}

fn bind_current<V: VdomSource>(co: &mut Coroutine<V>) {
    let frame = co.frames.last_mut().unwrap();
    let Some(ctxt) = &frame.ctxt else { return };
    let borrow = ctxt.borrow();
    let Some(state) = borrow.downcast_ref::<Option<IterState>>().and_then(|s| s.as_ref()) else {
        return;
    };
    if let Some(item) = state.items.get(state.position) {
        frame.set_symbol(SymbolSlot::Question, item.clone());
        frame.set_symbol(SymbolSlot::Percent, Value::number(state.position as f64));
    }
}

/// Whether a subsequent member remains after the one currently bound.
pub fn has_more<V: VdomSource>(co: &Coroutine<V>) -> bool {
    co.frames
        .last()
        .and_then(|f| f.ctxt.as_ref())
        .and_then(|c| {
            c.borrow()
                .downcast_ref::<Option<IterState>>()
                .and_then(|s| s.as_ref())
                .map(|s| s.position + 1 < s.items.len())
        })
        .unwrap_or(false)
}

/// Child walk for the current iteration, same as the default left-to-right
/// traversal but gated on there being a current item at all.
pub fn select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let has_item = {
        let frame = co.frames.last().unwrap();
        frame
            .ctxt
            .as_ref()
            .and_then(|c| {
                c.borrow()
                    .downcast_ref::<Option<IterState>>()
                    .and_then(|s| s.as_ref())
                    .map(|s| s.position < s.items.len())
            })
            .unwrap_or(false)
    };
    if !has_item {
        return Ok(None);
    }
    crate::ops::default_select_child(co)
}

/// Advance to the next member; the scheduler re-enters `select_child` from
/// the top for this frame afterward (see [`crate::frame::NextStep::Rerun`]).
pub fn rerun<V: VdomSource>(co: &mut Coroutine<V>, _sink: &mut dyn EdomSink) -> Result<(), HvmlError> {
    {
        let frame = co.frames.last().unwrap();
        if let Some(ctxt) = &frame.ctxt {
            if let Some(state) = ctxt.borrow_mut().downcast_mut::<Option<IterState>>().and_then(|s| s.as_mut()) {
                state.position += 1;
            }
        }
    }
    bind_current(co);
    let _ = NextStep::Rerun;
    Ok(())
}
