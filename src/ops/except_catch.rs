//! `<catch for="ExceptionName">` and `<except for="ExceptionName">`: named
//! exception handlers. Neither does anything on its own `after_pushed` path
//! — they're targets the frame-stack unwinder in [`crate::ops`] searches
//! for when an operation returns an error. `for` absent means catch-all;
//! multiple names can be separated by whitespace.

use crate::atom::Atom;
use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    _co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    Ok(())
}

pub fn on_popping<V: VdomSource>(
    _co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    Ok(())
}

/// Whether the `catch`/`except` frame at `frame_idx` accepts `exc`.
pub fn matches<V: VdomSource>(co: &Coroutine<V>, frame_idx: usize, exc: &Atom) -> bool {
    let element_id = co.frames[frame_idx].element;
    let element = co.vdom.element(element_id);
    match element.attr("for") {
        None => true,
        Some(attr) => attr.value.split_whitespace().any(|name| Atom::new(name) == *exc),
    }
}
