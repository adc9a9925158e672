//! `<exit with="expr">`: terminates the coroutine immediately, regardless
//! of how many frames remain on the stack — `on_popping` here unwinds the
//! entire frame stack in one step rather than letting the scheduler pop
//! frames one at a time.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::ops::eval_attr_text;
use crate::variant::Value;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let value = element
        .attr("with")
        .map(|a| eval_attr_text(co, &a.value))
        .unwrap_or(Value::Undefined);
    co.exit(Ok(value));
    co.frames.clear();
    Ok(())
}

pub fn on_popping<V: VdomSource>(
    _co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    Ok(())
}
