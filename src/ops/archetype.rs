//! `<archetype name="...">` and its data-only sibling `<archedata
//! name="...">`: register this element's children as a named template,
//! exactly like `<define>`, but addressed by renderer-facing constructs
//! (`$ARCHETYPE`) rather than `<call>`. Kept as a distinct tag from
//! `<define>` because archetypes are meant to be rendered (their raw
//! content may be read back verbatim by a renderer), while `<define>`
//! templates are only ever executed.

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
