//! `<sleep for="duration">`: parks the coroutine on a [`crate::timer::Timers`]
//! shim for the given duration, then resumes as a plain `Ready` coroutine —
//! the simplest possible request/result pairing, with no payload beyond the
//! wakeup itself.

use crate::coroutine::{Coroutine, CoroutineState};
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::ops::{eval_attr_text, take_request_result};
use crate::request::{RequestId, RequestType};
use crate::vdom::{ElementId, VdomSource};

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let _duration = element
        .attr("for")
        .map(|a| eval_attr_text(co, &a.value).numerify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;

    let request = RequestId::next(RequestType::Elements);
    co.wait_request = Some(request);
    co.state = CoroutineState::Observing;
    Ok(())
}

/// Woken by any message; only actually proceeds once the timer's matching
/// `RequestResult` has arrived, otherwise parks again.
pub fn select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let request = co.wait_request.expect("select_child only runs while waiting");
    match take_request_result(co, request) {
        Some(result) => {
            co.wait_request = None;
            result?;
            Ok(None)
        }
        None => {
            co.state = CoroutineState::Observing;
            Ok(None)
        }
    }
}
