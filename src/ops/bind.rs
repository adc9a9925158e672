//! `<bind as="name" at="..." with="expr">`: like `<init>`, but scoped to the
//! frame that declares it — the binding lands in the current frame's own
//! variable map, so it disappears when this element's frame pops (the
//! scheduler pops the matching [`crate::scope::ScopeChain`] frame in lock
//! step with the execution frame).
//!
//! `<bind temporarily as="name" with="expr">` instead writes into the
//! frame-temporary `!` object on the enclosing frame, outliving this
//! element's own frame and visible to every frame pushed after it.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::ops::{eval_attr_text, frame_temporary};
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let name = element
        .attr("as")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let value = element
        .attr("with")
        .map(|a| eval_attr_text(co, &a.value))
        .unwrap_or(crate::variant::Value::Undefined);

    if element.attr("temporarily").is_some() {
        return frame_temporary(co, name, value);
    }

    let map = co
        .scope
        .current()
        .ok_or_else(|| HvmlError::new(ErrorKind::InternalFailure))?;
    map.borrow_mut().define(name, value);
    Ok(())
}
