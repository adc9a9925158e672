//! `<call on="name" within="_self" concurrently with="...">`: invokes a
//! template registered by `<define>`.
//!
//! The default, synchronous path (`within="_self"`, no `concurrently`) runs
//! the template's body in place: `select_child` is redirected to walk the
//! *template's* children instead of `<call>`'s own. A `concurrently` call
//! instead records a [`crate::coroutine::PendingSpawn`] for the scheduler
//! to turn into a sibling coroutine with its own, empty observer table and
//! blocks this frame on the resulting request.

use crate::coroutine::{Coroutine, PendingSpawn};
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::frame::SymbolSlot;
use crate::ops::eval_attr_text;
use crate::request::{RequestId, RequestType};
use crate::vdom::{ElementId, VdomSource};
use std::cell::RefCell;
use std::rc::Rc;

/// The per-frame redirect target, stashed in the frame's generic `ctxt`
/// slot so plain frames (the overwhelming majority of tags) pay nothing.
fn template_cell<V: VdomSource>(co: &mut Coroutine<V>) -> Rc<RefCell<dyn std::any::Any>> {
    let frame = co.frames.last_mut().unwrap();
    if frame.ctxt.is_none() {
        frame.ctxt = Some(Rc::new(RefCell::new(None::<ElementId>)));
    }
    frame.ctxt.clone().unwrap()
}

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let template_name = element
        .attr("on")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let template = *co
        .templates
        .get(&template_name)
        .ok_or_else(|| HvmlError::new(ErrorKind::EntityNotFound))?;

    if let Some(with_attr) = element.attr("with") {
        let args = eval_attr_text(co, &with_attr.value);
        if let Some(map) = co.scope.current() {
            map.borrow_mut().define("_ARGS", args.clone());
        }
        co.frames.last_mut().unwrap().set_symbol(SymbolSlot::Colon, args);
    }

    let concurrently = element.attr("concurrently").is_some();
    if concurrently {
        let request = RequestId::next(RequestType::Crtn);
        co.pending_spawns.push(PendingSpawn { request, template });
        co.wait_request = Some(request);
        co.state = crate::coroutine::CoroutineState::Observing;
    } else {
        let cell = template_cell(co);
        *cell.borrow_mut().downcast_mut::<Option<ElementId>>().unwrap() = Some(template);
    }
    Ok(())
}

pub fn on_popping<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    if let Some(ctxt) = &co.frames.last().unwrap().ctxt {
        if let Some(slot) = ctxt.borrow_mut().downcast_mut::<Option<ElementId>>() {
            *slot = None;
        }
    }
    Ok(())
}

pub fn select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let template = {
        let frame = co.frames.last().unwrap();
        match &frame.ctxt {
            Some(ctxt) => *ctxt.borrow().downcast_ref::<Option<ElementId>>().unwrap_or(&None),
            None => None,
        }
    };
    let Some(template) = template else {
        return Ok(None);
    };
    let idx = co.frames.len() - 1;
    let cursor = co.frames[idx].child_cursor;
    let children = co.vdom.element(template).children();
    if cursor < children.len() {
        co.frames[idx].child_cursor += 1;
        Ok(Some(children[cursor]))
    } else {
        Ok(None)
    }
}
