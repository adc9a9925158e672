//! `<forget on="name" for="type:sub">`: revokes a previously-registered
//! `<observe>` so it no longer wakes this coroutine.

use crate::atom::Atom;
use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::event::EventSource;
use crate::ops::eval_attr_text;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();

    let Some(on_attr) = element.attr("on") else {
        return Ok(());
    };
    let on = eval_attr_text(co, &on_attr.value).stringify();
    let for_name = element
        .attr("for")
        .map(|a| a.value.clone())
        .unwrap_or_else(|| "*:*".to_string());
    let (event_type, sub_type) = Atom::split_type_sub(&for_name);
    let event_type = Atom::new(event_type);
    let sub_type = Atom::new(if sub_type.is_empty() { "*" } else { sub_type });

    co.observers.retain(|obs| {
        !(matches!(&obs.source, EventSource::NamedVariable(name) if name == &on)
            && obs.event_type == event_type
            && obs.sub_type == sub_type)
    });
    Ok(())
}
