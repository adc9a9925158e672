//! Element operations: the per-tag quad of `after_pushed` / `select_child` /
//! `rerun` / `on_popping` calls the scheduler drives one vDOM element at a
//! time. `mod.rs` holds the dispatch table and the default traversal every
//! tag gets unless it overrides a step; each sibling module implements one
//! HVML tag's deviations from that default.

pub mod archetype;
pub mod bind;
pub mod call;
pub mod define;
pub mod except_catch;
pub mod exit;
pub mod forget;
pub mod hvml;
pub mod include;
pub mod inherit;
pub mod init;
pub mod iterate;
pub mod load;
pub mod observe;
pub mod sleep;
pub mod undefined;
pub mod update;

use crate::coroutine::{Coroutine, CoroutineState};
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::event::Message;
use crate::frame::{EvalStep, Frame, SymbolSlot};
use crate::request::RequestId;
use crate::variant::Value;
use crate::vdom::{ElementId, VdomSource};
use std::cell::RefCell;
use std::rc::Rc;

/// Pull a queued [`Message::RequestResult`] matching `request` out of the
/// mailbox, if one has arrived. Leaves the mailbox untouched (and returns
/// `None`) when the coroutine was merely woken by some other message.
pub(crate) fn take_request_result<V: VdomSource>(
    co: &mut Coroutine<V>,
    request: RequestId,
) -> Option<Result<Value, HvmlError>> {
    let pos = co
        .mailbox
        .iter()
        .position(|m| matches!(m, Message::RequestResult { request: r, .. } if *r == request))?;
    match co.mailbox.remove(pos).unwrap() {
        Message::RequestResult { result, .. } => Some(result),
        _ => unreachable!(),
    }
}

/// `<init locally>`/`<bind temporarily>` share this: both write into the `!`
/// object on the *parent* frame (the one that will still be on the stack for
/// later siblings), creating it lazily on first use. Because a child frame
/// copies its parent's `!` value down at push time, every frame entered
/// after this point — siblings included — sees the binding; frames already
/// popped by the time it runs never will.
pub(crate) fn frame_temporary<V: VdomSource>(
    co: &mut Coroutine<V>,
    name: String,
    value: Value,
) -> Result<(), HvmlError> {
    let parent_idx = co
        .frames
        .len()
        .checked_sub(2)
        .ok_or_else(|| HvmlError::new(crate::error::ErrorKind::NotExists))?;
    let obj = match co.frames[parent_idx].get_symbol(SymbolSlot::Exclamation) {
        Some(Value::Object(obj)) => obj,
        _ => {
            let obj = Rc::new(RefCell::new(crate::variant::container::ObjectData::default()));
            co.frames[parent_idx].set_symbol(SymbolSlot::Exclamation, Value::Object(obj.clone()));
            obj
        }
    };
    obj.borrow_mut().set(name, value)?;
    Ok(())
}

/// Default `select_child`: visit children left to right, in document order.
pub fn default_select_child<V: VdomSource>(co: &mut Coroutine<V>) -> Result<Option<ElementId>, HvmlError> {
    let idx = co.frames.len() - 1;
    let element = co.frames[idx].element;
    let children = co.vdom.element(element).children();
    let cursor = co.frames[idx].child_cursor;
    if cursor < children.len() {
        co.frames[idx].child_cursor += 1;
        Ok(Some(children[cursor]))
    } else {
        Ok(None)
    }
}

/// Run exactly one scheduler step for `co`. A step is one quad call on the
/// element at the top of the frame stack, advancing that frame's
/// [`EvalStep`] or pushing/popping a child frame.
pub fn run_one_step<V: VdomSource>(
    co: &mut Coroutine<V>,
    sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    if co.frames.is_empty() {
        let root = co.vdom.root();
        co.frames.push(Frame::new(root));
        co.scope.push_frame(co.vdom.element(root).attr("id").map(|a| a.value.as_str()));
    }

    let idx = co.frames.len() - 1;
    let element = co.frames[idx].element;
    let tag = co.vdom.element(element).tag.as_str().to_string();
    let step = co.frames[idx].eval_step;

    match step {
        EvalStep::AfterPushed => {
            {
                let i = co.frames.len() - 1;
                let element = co.vdom.element(co.frames[i].element).clone();
                if element.attr("silently").is_some() {
                    co.frames[i].silently = true;
                }
                // Symbol variables are refreshed on every frame entry: `?`
                // always reflects this element's own datum, `@` the value
                // of its own `in=` selector, independent of what tag it is.
                if let Some(attr) = element.attr("with").or_else(|| element.attr("from")) {
                    let value = eval_attr_text(co, &attr.value);
                    co.frames[i].set_symbol(SymbolSlot::Question, value);
                }
                if let Some(attr) = element.attr("in") {
                    let value = eval_attr_text(co, &attr.value);
                    co.frames[i].set_symbol(SymbolSlot::At, value);
                }
            }
            if let Err(e) = dispatch_after_pushed(&tag, co, sink) {
                return handle_exception(co, e);
            }
            if !co.frames.is_empty() {
                let i = co.frames.len() - 1;
                if co.frames[i].eval_step == EvalStep::AfterPushed {
                    co.frames[i].eval_step = EvalStep::SelectChild;
                }
            }
        }
        EvalStep::SelectChild => match dispatch_select_child(&tag, co) {
            Ok(Some(child)) => {
                let id_attr = co.vdom.element(child).attr("id").map(|a| a.value.clone());
                let mut child_frame = Frame::new(child);
                child_frame.silently = co.frames[idx].silently;
                // The frame-temporary `!` object is shared down the whole
                // frame chain, not just the declaring frame, so a binding
                // made by an ancestor's `<init locally>`/`<bind temporarily>`
                // stays visible to every descendant pushed afterward.
                if let Some(excl) = co.frames[idx].get_symbol(SymbolSlot::Exclamation) {
                    child_frame.set_symbol(SymbolSlot::Exclamation, excl);
                }
                co.frames.push(child_frame);
                co.scope.push_frame(id_attr.as_deref());
            }
            Ok(None) => {
                // A tag's `select_child` can decide mid-call that it needs to
                // stay parked (no matching request result or observed event
                // yet) by setting the coroutine back to `Observing` itself;
                // honor that instead of forcing the walk onward.
                if co.state != CoroutineState::Observing {
                    co.frames[idx].eval_step = if dispatch_should_loop(&tag, co) {
                        EvalStep::Rerun
                    } else {
                        EvalStep::OnPopping
                    };
                }
            }
            Err(e) => return handle_exception(co, e),
        },
        EvalStep::Rerun => {
            if let Err(e) = dispatch_rerun(&tag, co, sink) {
                return handle_exception(co, e);
            }
            let i = co.frames.len() - 1;
            // `<observe>` manages its own cursor (idle sentinel vs. an
            // in-progress body walk) inside `select_child`; resetting it
            // here would restart the body before the next match arrives.
            if tag != "observe" {
                co.frames[i].child_cursor = 0;
            }
            co.frames[i].eval_step = EvalStep::SelectChild;
        }
        EvalStep::OnPopping => {
            if let Err(e) = dispatch_on_popping(&tag, co, sink) {
                return handle_exception(co, e);
            }
            if !co.frames.is_empty() && co.frames.last().map(|f| f.element) == Some(element) {
                co.frames.pop();
                co.scope.pop_frame();
            }
        }
    }
    Ok(())
}

/// Unwind the frame stack looking for an enclosing `<catch>`/`<except>`
/// that accepts `err`'s default exception name. `again` is special: it
/// re-enters the same quad call rather than unwinding at all. A `silently`
/// frame short-circuits both: the error is cleared and that frame's own walk
/// continues as if the failing step had simply done nothing.
fn handle_exception<V: VdomSource>(co: &mut Coroutine<V>, err: HvmlError) -> Result<(), HvmlError> {
    if err.kind.is_again() {
        return Ok(());
    }
    if co.frames.last().map(|f| f.silently).unwrap_or(false) {
        let i = co.frames.len() - 1;
        co.frames[i].eval_step = match co.frames[i].eval_step {
            EvalStep::AfterPushed => EvalStep::SelectChild,
            EvalStep::SelectChild | EvalStep::Rerun => EvalStep::OnPopping,
            EvalStep::OnPopping => EvalStep::OnPopping,
        };
        return Ok(());
    }
    let exc = err.kind.default_exception();
    for i in (0..co.frames.len()).rev() {
        let tag = co.vdom.element(co.frames[i].element).tag.as_str().to_string();
        if (tag == "catch" || tag == "except") && except_catch::matches(co, i, &exc) {
            co.frames.truncate(i + 1);
            co.scope.truncate(i + 1);
            co.frames[i].exception = Some(crate::variant::Value::Exception(exc));
            co.frames[i].eval_step = EvalStep::SelectChild;
            co.frames[i].child_cursor = 0;
            return Ok(());
        }
    }
    Err(err)
}

fn dispatch_after_pushed<V: VdomSource>(
    tag: &str,
    co: &mut Coroutine<V>,
    sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    match tag {
        "hvml" => hvml::after_pushed(co, sink),
        "init" => init::after_pushed(co, sink),
        "bind" => bind::after_pushed(co, sink),
        "define" => define::after_pushed(co, sink),
        "call" => call::after_pushed(co, sink),
        "include" => include::after_pushed(co, sink),
        "observe" => observe::after_pushed(co, sink),
        "forget" => forget::after_pushed(co, sink),
        "load" => load::after_pushed(co, sink),
        "update" => update::after_pushed(co, sink),
        "iterate" => iterate::after_pushed(co, sink),
        "archetype" | "archedata" => archetype::after_pushed(co, sink),
        "exit" => exit::after_pushed(co, sink),
        "sleep" => sleep::after_pushed(co, sink),
        "catch" | "except" => except_catch::after_pushed(co, sink),
        "inherit" => inherit::after_pushed(co, sink),
        "undefined" | "differ" => undefined::after_pushed(co, sink),
        _ => Ok(()),
    }
}

fn dispatch_select_child<V: VdomSource>(
    tag: &str,
    co: &mut Coroutine<V>,
) -> Result<Option<ElementId>, HvmlError> {
    match tag {
        "iterate" => iterate::select_child(co),
        "archetype" | "archedata" | "define" => Ok(None),
        "load" => load::select_child(co),
        "sleep" => sleep::select_child(co),
        "include" => include::select_child(co),
        "observe" => observe::select_child(co),
        "call" if co.wait_request.is_some() => {
            co.state = CoroutineState::Observing;
            Ok(None)
        }
        "call" => call::select_child(co),
        _ => default_select_child(co),
    }
}

/// Whether, having exhausted the current child walk, this frame should loop
/// back (`<iterate>`'s next member) instead of popping.
fn dispatch_should_loop<V: VdomSource>(tag: &str, co: &Coroutine<V>) -> bool {
    match tag {
        "iterate" => iterate::has_more(co),
        "observe" => observe::is_still_registered(co),
        _ => false,
    }
}

fn dispatch_rerun<V: VdomSource>(
    tag: &str,
    co: &mut Coroutine<V>,
    sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    match tag {
        "iterate" => iterate::rerun(co, sink),
        _ => Ok(()),
    }
}

fn dispatch_on_popping<V: VdomSource>(
    tag: &str,
    co: &mut Coroutine<V>,
    sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    match tag {
        "hvml" => hvml::on_popping(co, sink),
        "call" => call::on_popping(co, sink),
        "include" => include::on_popping(co, sink),
        "exit" => exit::on_popping(co, sink),
        "catch" | "except" => except_catch::on_popping(co, sink),
        _ => Ok(()),
    }
}

/// Read an attribute's raw text and resolve it against the current scope's
/// document-level fallback only (full expression evaluation is out of this
/// crate's scope — attribute text here is either a literal or a bare
/// `$name` variable reference, the minimal subset the element operations
/// need to exercise named-variable plumbing end to end).
pub fn eval_attr_text<V: VdomSource>(co: &Coroutine<V>, text: &str) -> crate::variant::Value {
    if let Some(name) = text.strip_prefix('$') {
        if let Some(Value::Object(temp)) = co.frames.last().and_then(|f| f.get_symbol(SymbolSlot::Exclamation)) {
            if let Some(v) = temp.borrow().entries.get(name).cloned() {
                return v;
            }
        }
        co.scope
            .lookup(name, None)
            .unwrap_or(crate::variant::Value::Undefined)
    } else if let Some(lit) = text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        crate::variant::Value::string(lit)
    } else if let Some(lit) = text.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        crate::variant::Value::string(lit)
    } else if let Ok(n) = text.parse::<f64>() {
        crate::variant::Value::number(n)
    } else {
        crate::variant::Value::string(text)
    }
}
