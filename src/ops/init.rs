//! `<init as="name" at="..." with="expr">`: defines a named variable,
//! persisting for as long as the scope it's bound in (the opposite of
//! `<bind>`, which unwinds when its owning frame pops).
//!
//! `<init locally as="name" with="expr">` instead writes into the frame-
//! temporary `!` object on the enclosing frame, shared down that frame's
//! whole descendant chain.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::ops::{eval_attr_text, frame_temporary};
use crate::scope::AtQualifier;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let element = co.vdom.element(co.frames.last().unwrap().element).clone();
    let name = element
        .attr("as")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let value = element
        .attr("with")
        .map(|a| eval_attr_text(co, &a.value))
        .unwrap_or(crate::variant::Value::Undefined);

    if element.attr("locally").is_some() {
        return frame_temporary(co, name, value);
    }

    let at = element
        .attr("at")
        .and_then(|a| AtQualifier::parse(&a.value));

    let map = match at {
        Some(q) => co
            .scope
            .resolve(&q)
            .ok_or_else(|| HvmlError::new(ErrorKind::BadName))?,
        None => co.scope.document.clone(),
    };
    map.borrow_mut().define(name, value);
    Ok(())
}
