//! `<observe on="name" for="type:sub" at="..." reduce-opt="...">`: registers
//! an [`Observer`] against a named variable, an element, or another
//! coroutine, then blocks this coroutine until a matching event arrives.

use crate::coroutine::{Coroutine, CoroutineState};
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::event::{EventSource, Message, ReduceOpt};
use crate::frame::SymbolSlot;
use crate::observer::Observer;
use crate::ops::eval_attr_text;
use crate::atom::Atom;
use crate::vdom::{ElementId, VdomSource};

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let frame_idx = co.frames.len() - 1;
    let frame_element = co.frames[frame_idx].element;
    let element = co.vdom.element(frame_element).clone();

    let on = element
        .attr("on")
        .map(|a| eval_attr_text(co, &a.value).stringify())
        .ok_or_else(|| HvmlError::new(ErrorKind::ArgumentMissed))?;
    let for_name = element
        .attr("for")
        .map(|a| a.value.clone())
        .unwrap_or_else(|| "*:*".to_string());
    let (event_type, sub_type) = Atom::split_type_sub(&for_name);

    let reduce = match element.attr("reduce-opt").map(|a| a.value.as_str()) {
        Some("ignore") => ReduceOpt::Ignore,
        Some("overlay") => ReduceOpt::Overlay,
        _ => ReduceOpt::Keep,
    };

    co.observers.push(Observer {
        source: EventSource::NamedVariable(on),
        event_type: Atom::new(event_type),
        sub_type: Atom::new(if sub_type.is_empty() { "*" } else { sub_type }),
        reduce,
        bind_to: SymbolSlot::Question,
        handler_frame: frame_idx,
    });

    // Idle sentinel: nothing to walk until the first match arrives.
    // `select_child` resets this to 0 each time it consumes a match.
    let children_len = co.vdom.element(frame_element).children().len();
    co.frames[frame_idx].child_cursor = children_len;

    co.state = CoroutineState::Observing;
    Ok(())
}

/// Whether this frame's observer is still registered — it is never removed
/// by a match, only by an explicit `<forget>` (or the coroutine itself going
/// away), so this frame keeps re-parking and re-firing its body for as long
/// as the registration survives.
pub fn is_still_registered<V: VdomSource>(co: &Coroutine<V>) -> bool {
    let frame_idx = co.frames.len() - 1;
    co.observers.iter().any(|o| o.handler_frame == frame_idx)
}

/// Woken by any message. If a previous match's body is still being walked,
/// continues that walk first. Once the body is exhausted (or was empty),
/// looks for the next matching event: consuming one rewinds the child walk
/// from the top so the body re-runs; finding none re-parks without removing
/// the observer.
pub fn select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let frame_idx = co.frames.len() - 1;
    if !is_still_registered(co) {
        return Ok(None);
    }

    let element = co.frames[frame_idx].element;
    let children_len = co.vdom.element(element).children().len();
    if co.frames[frame_idx].child_cursor < children_len {
        return crate::ops::default_select_child(co);
    }

    let obs_pos = co.observers.iter().position(|o| o.handler_frame == frame_idx).unwrap();
    let observer = co.observers[obs_pos].clone();
    let msg_pos = co.mailbox.iter().position(|m| match m {
        Message::Event(e) => observer.is_match(&e.source, e.event_type, e.sub_type),
        _ => false,
    });
    match msg_pos {
        Some(i) => {
            if let Message::Event(event) = co.mailbox.remove(i).unwrap() {
                co.frames[frame_idx].set_symbol(observer.bind_to, event.data);
            }
            co.frames[frame_idx].child_cursor = 0;
            crate::ops::default_select_child(co)
        }
        None => {
            co.state = CoroutineState::Observing;
            Ok(None)
        }
    }
}
