//! `<load on="uri" as="name" at="...">`: fetches external data through the
//! [`crate::fetcher::Fetcher`] shim and binds the result to a named
//! variable once the request completes. Blocks the coroutine in the
//! meantime — the same request/result correlation `<call concurrently>`
//! uses, just addressed at a [`crate::request::RequestType::Elements`]
//! resource instead of a sibling coroutine.

use crate::coroutine::{Coroutine, CoroutineState};
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::ops::{eval_attr_text, take_request_result};
use crate::request::{RequestId, RequestType};
use crate::scope::AtQualifier;
use crate::vdom::{ElementId, VdomSource};

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    let _uri = element
        .attr("on")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;

    let request = RequestId::next(RequestType::Elements);
    co.wait_request = Some(request);
    co.state = CoroutineState::Observing;
    Ok(())
}

/// Woken by any message; only actually proceeds once the fetch's matching
/// `RequestResult` has arrived, binding its payload to `as=` before this
/// element pops. Parks again if woken by something else.
pub fn select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let request = co.wait_request.expect("select_child only runs while waiting");
    let result = match take_request_result(co, request) {
        Some(result) => result,
        None => {
            co.state = CoroutineState::Observing;
            return Ok(None);
        }
    };
    co.wait_request = None;
    let value = result?;

    let frame_element = co.frames.last().unwrap().element;
    let element = co.vdom.element(frame_element).clone();
    if let Some(name) = element.attr("as").map(|a| eval_attr_text(co, &a.value).stringify()) {
        let at = element.attr("at").and_then(|a| AtQualifier::parse(&a.value));
        let map = match at {
            Some(q) => co.scope.resolve(&q).unwrap_or_else(|| co.scope.document.clone()),
            None => co.scope.document.clone(),
        };
        map.borrow_mut().define(name, value);
    }
    Ok(None)
}
