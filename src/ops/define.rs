//! `<define name="...">`: registers this element's children as a reusable
//! template, invokable later by `<call>`. `<define>` never executes its own
//! children at definition time — `select_child` is suppressed so the body
//! only ever runs when a `<call>` re-enters it.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element);
    let name = element
        .attr("name")
        .map(|a| a.value.clone())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    co.templates.insert(name, frame_element);
    Ok(())
}
