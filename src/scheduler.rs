//! The cooperative scheduler: owns every coroutine in one runner and drives
//! them one step at a time until all are blocked or stopped.
//!
//! A `Slab` of coroutines addressed by a small `Copy` id, a `Ready` queue the
//! main loop drains before going idle, and a tiered priority so
//! high-priority work (an immediately-available message) preempts
//! low-priority background polling. Four tiers, mirroring `EventPriority`:
//! `Immediate` (an exited coroutine's parent waiting on its result), `High`
//! (a just-delivered observed event), `Medium` (ordinary `Ready` work),
//! `Low` (timer/fetch polling ticks).

use crate::coroutine::{Coroutine, CoroutineId, CoroutineState};
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::event::Message;
use crate::request::{RequestId, RequestType};
use crate::vdom::VdomSource;
use slab::Slab;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    Low,
    Medium,
    High,
    Immediate,
}

/// A runnable unit queued for the next scheduler pass.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledWork {
    pub cid: CoroutineId,
    pub priority: EventPriority,
}

/// A coroutine with mail already sitting in its mailbox gets to run before
/// one that's merely `Ready` with nothing new to react to; a coroutine that
/// just had a concurrent `<call>` resolve jumps the whole queue.
fn priority_of<V: VdomSource>(co: &Coroutine<V>) -> EventPriority {
    if co.mailbox.iter().any(|m| matches!(m, Message::RequestResult { .. })) {
        EventPriority::Immediate
    } else if !co.mailbox.is_empty() {
        EventPriority::High
    } else {
        EventPriority::Medium
    }
}

pub struct Scheduler<V: VdomSource> {
    coroutines: Slab<Coroutine<V>>,
    next_cid: u64,
    heuristics: crate::runtime::Heuristics,
    /// Concurrent-call results awaiting delivery: (parent, request, child).
    pending_results: Vec<(CoroutineId, RequestId, CoroutineId)>,
}

impl<V: VdomSource> Scheduler<V> {
    pub fn new(heuristics: crate::runtime::Heuristics) -> Self {
        Self {
            coroutines: Slab::with_capacity(heuristics.coroutine_capacity),
            next_cid: 1,
            heuristics,
            pending_results: Vec::new(),
        }
    }

    pub fn spawn(&mut self, vdom: Rc<V>) -> CoroutineId {
        let cid = CoroutineId(self.next_cid);
        self.next_cid += 1;
        let co = Coroutine::new(cid, vdom);
        self.coroutines.insert(co);
        debug!(cid = cid.0, "spawned coroutine");
        cid
    }

    pub fn get(&self, cid: CoroutineId) -> Option<&Coroutine<V>> {
        self.coroutines.iter().find(|(_, c)| c.cid == cid).map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, cid: CoroutineId) -> Option<&mut Coroutine<V>> {
        self.coroutines.iter_mut().find(|(_, c)| c.cid == cid).map(|(_, c)| c)
    }

    pub fn all_stopped(&self) -> bool {
        self.coroutines.iter().all(|(_, c)| c.is_exited())
    }

    /// Run one step on every `Ready` coroutine, then turn any
    /// `pending_spawns` they produced into new sibling coroutines and wake
    /// anyone observing a now-completed request. Returns whether any
    /// coroutine made progress this pass (false means the runner should
    /// block waiting for external input — a fetch, a timer, a renderer
    /// event).
    pub fn run_pass(&mut self, sink: &mut dyn EdomSink) -> Result<bool, HvmlError> {
        let mut ready: Vec<(usize, EventPriority)> = self
            .coroutines
            .iter()
            .filter(|(_, c)| c.state == CoroutineState::Ready)
            .map(|(slot, c)| (slot, priority_of(c)))
            .collect();

        if ready.is_empty() {
            return Ok(false);
        }
        ready.sort_by(|a, b| b.1.cmp(&a.1));

        for (slot, _) in ready {
            let cid = self.coroutines[slot].cid;
            trace!(cid = cid.0, "stepping coroutine");
            self.coroutines[slot].step(sink)?;
            self.drain_spawns(slot);
            self.deliver_exit_results(slot);
        }
        Ok(true)
    }

    fn drain_spawns(&mut self, parent_slot: usize) {
        let spawns = std::mem::take(&mut self.coroutines[parent_slot].pending_spawns);
        let parent_cid = self.coroutines[parent_slot].cid;
        for spawn in spawns {
            let vdom = self.coroutines[parent_slot].vdom.clone();
            let child_cid = self.spawn(vdom);
            if let Some(child) = self.get_mut(child_cid) {
                child.frames.push(crate::frame::Frame::new(spawn.template));
                child.scope.push_frame(None);
                child.result = None;
            }
            debug!(
                parent = parent_cid.0,
                child = child_cid.0,
                request = %spawn.request,
                "spawned concurrent call"
            );
            self.pending_results.push((parent_cid, spawn.request, child_cid));
        }
    }

    /// Check whether any spawned-for-a-request child has finished, and if
    /// so deliver its result back to the waiting parent.
    fn deliver_exit_results(&mut self, _just_stepped_slot: usize) {
        let mut remaining = Vec::new();
        let pending = std::mem::take(&mut self.pending_results);
        for (parent_cid, request, child_cid) in pending {
            let finished = self.get(child_cid).map(|c| c.is_exited()).unwrap_or(false);
            if !finished {
                remaining.push((parent_cid, request, child_cid));
                continue;
            }
            let result = self
                .get(child_cid)
                .and_then(|c| c.result.clone())
                .unwrap_or(Ok(crate::variant::Value::Undefined));
            if let Some(parent) = self.get_mut(parent_cid) {
                if parent.wait_request == Some(request) {
                    parent.wait_request = None;
                    parent.push_message(Message::RequestResult { request, result });
                }
            }
        }
        self.pending_results = remaining;
    }

    /// Deliver a completed request (a fetch through a [`crate::fetcher::Fetcher`],
    /// a timer firing through [`crate::timer::Timers`]) to whichever coroutine is
    /// parked waiting on it. A driving loop calls this after polling those
    /// shims; the matching `<load>`/`<sleep>`/`<include>` consumes the result
    /// the next time it's stepped.
    pub fn deliver_request_result(&mut self, request: RequestId, result: Result<crate::variant::Value, HvmlError>) {
        for (_, co) in self.coroutines.iter_mut() {
            if co.wait_request == Some(request) {
                co.push_message(Message::RequestResult { request, result });
                return;
            }
        }
    }

    pub fn max_moving_msgs(&self) -> usize {
        self.heuristics.max_moving_msgs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::vdom::Document;

    fn doc_with_root() -> Rc<Document> {
        let mut doc = Document::new();
        doc.insert(Atom::new("hvml"), None);
        Rc::new(doc)
    }

    #[test]
    fn spawn_then_run_to_stopped() {
        let mut sched: Scheduler<Document> = Scheduler::new(Default::default());
        let cid = sched.spawn(doc_with_root());
        let mut sink = crate::edom::RecordingSink::default();
        while sched.run_pass(&mut sink).unwrap() {}
        assert!(sched.get(cid).unwrap().is_exited());
    }
}
