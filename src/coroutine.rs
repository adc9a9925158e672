//! A coroutine: one independent HVML program instance — its own vDOM, frame
//! stack, observer table, and mailbox — cooperatively scheduled alongside
//! its siblings by the [`crate::scheduler::Scheduler`].
//!
//! Per-instance state is owned by an arena slot and referenced everywhere
//! else by a small `Copy` id; the scheduler owns a `Slab` of these and
//! drives them one tick at a time.

use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::event::Message;
use crate::frame::Frame;
use crate::observer::Observer;
use crate::request::RequestId;
use crate::scope::ScopeChain;
use crate::vdom::VdomSource;
use crate::variant::Value;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoroutineId(pub u64);

/// Where a coroutine is in its overall lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineState {
    /// Has work to do and can be picked up by the scheduler's next tick.
    Ready,
    /// Currently executing a step (set for the duration of that step only;
    /// no coroutine is ever resumed while already `Running`).
    Running,
    /// Blocked on an observed event or request result; not schedulable
    /// until a matching message arrives.
    Observing,
    /// Finished running; holds its terminal `result`.
    Stopped,
}

/// First-run vs. steady-state, distinguishing the coroutine's initial
/// top-to-bottom vDOM walk from later re-entries driven by observed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineStage {
    FirstRun,
    Observing,
}

/// One HVML program instance.
pub struct Coroutine<V: VdomSource> {
    pub cid: CoroutineId,
    /// Shared, not owned: a concurrent `<call>` spawns a sibling coroutine
    /// over the same document — the callee gets a fresh, empty observer
    /// table, but still reads the same parsed tree the caller does.
    pub vdom: Rc<V>,
    pub frames: Vec<Frame>,
    pub scope: ScopeChain,
    pub state: CoroutineState,
    pub stage: CoroutineStage,
    pub mailbox: VecDeque<Message>,
    pub observers: Vec<Observer>,
    /// Set while `state == Observing`: the request this coroutine is
    /// blocked on, if it's blocked on a specific request rather than a
    /// general event.
    pub wait_request: Option<RequestId>,
    pub target: Option<String>,
    pub base_url: Option<String>,
    /// Qualified-name prefix new elements in this coroutine's vDOM inherit
    /// (set by `<hvml tag-prefix="...">`).
    pub tag_prefix: Option<String>,
    pub result: Option<Result<Value, HvmlError>>,
    /// Named templates registered by `<define>`/`<archetype>`/`<archedata>`,
    /// keyed by their `name` attribute. The value is the defining element's
    /// id; its children are the template body.
    pub templates: std::collections::HashMap<String, crate::vdom::ElementId>,
    /// Concurrent `<call>`s this coroutine has asked the scheduler to spawn
    /// as siblings but that haven't been turned into a [`Coroutine`] yet.
    pub pending_spawns: Vec<PendingSpawn>,
}

/// A request, recorded by `ops::call`, for the scheduler to spawn a new
/// sibling coroutine that runs `template` to completion and reports back
/// via `request`.
#[derive(Debug, Clone)]
pub struct PendingSpawn {
    pub request: RequestId,
    pub template: crate::vdom::ElementId,
}

impl<V: VdomSource> Coroutine<V> {
    pub fn new(cid: CoroutineId, vdom: Rc<V>) -> Self {
        Self {
            cid,
            vdom,
            frames: Vec::new(),
            scope: ScopeChain::default(),
            state: CoroutineState::Ready,
            stage: CoroutineStage::FirstRun,
            mailbox: VecDeque::new(),
            observers: Vec::new(),
            wait_request: None,
            target: None,
            base_url: None,
            tag_prefix: None,
            result: None,
            templates: std::collections::HashMap::new(),
            pending_spawns: Vec::new(),
        }
    }

    pub fn is_exited(&self) -> bool {
        self.state == CoroutineState::Stopped
    }

    pub fn push_message(&mut self, message: Message) {
        self.mailbox.push_back(message);
        if self.state == CoroutineState::Observing {
            self.state = CoroutineState::Ready;
        }
    }

    pub fn pop_message(&mut self) -> Option<Message> {
        self.mailbox.pop_front()
    }

    pub fn exit(&mut self, result: Result<Value, HvmlError>) {
        self.result = Some(result);
        self.state = CoroutineState::Stopped;
    }

    /// Dispatch one step of work, delegating the actual per-element
    /// evaluation to the element-operation dispatch table
    /// ([`crate::ops::dispatch`]). `sink` receives any eDOM mutations this
    /// step produces.
    pub fn step(&mut self, sink: &mut dyn EdomSink) -> Result<(), HvmlError> {
        self.state = CoroutineState::Running;
        crate::ops::run_one_step(self, sink)?;
        if self.state == CoroutineState::Running {
            self.state = if self.frames.is_empty() {
                CoroutineState::Stopped
            } else {
                CoroutineState::Ready
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::vdom::Document;

    #[test]
    fn new_coroutine_is_ready_with_empty_frames() {
        let mut doc = Document::new();
        doc.insert(Atom::new("hvml"), None);
        let co = Coroutine::new(CoroutineId(1), Rc::new(doc));
        assert_eq!(co.state, CoroutineState::Ready);
        assert!(co.frames.is_empty());
    }

    #[test]
    fn pushing_a_message_wakes_an_observing_coroutine() {
        let mut doc = Document::new();
        doc.insert(Atom::new("hvml"), None);
        let mut co = Coroutine::new(CoroutineId(1), Rc::new(doc));
        co.state = CoroutineState::Observing;
        co.push_message(Message::Event(crate::event::Event::new(
            crate::event::EventSource::Coroutine(co.cid),
            "change:x",
            Value::Null,
        )));
        assert_eq!(co.state, CoroutineState::Ready);
    }
}
