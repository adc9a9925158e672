//! Events and inter-coroutine messages (spec data model: "Event/Message").
//!
//! An `Event` is a `type:sub` notification raised against a source (a
//! variable, an element, a coroutine); a `Message` is the payload a
//! coroutine mailbox queues until its scheduler slot runs. `ReduceOpt`
//! governs what happens when a new message for the same source arrives
//! before the old one has been consumed.

use crate::atom::Atom;
use crate::request::RequestId;
use crate::variant::Value;

/// What raised an event: the three places `<observe>` can attach to.
#[derive(Debug, Clone)]
pub enum EventSource {
    NamedVariable(String),
    Element(crate::vdom::ElementId),
    Coroutine(crate::coroutine::CoroutineId),
}

/// How a coroutine's mailbox should combine a newly-arrived message with an
/// already-queued one for the same observed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOpt {
    /// Keep both; deliver in arrival order.
    Keep,
    /// Drop the new message if one is already queued.
    Ignore,
    /// Replace the queued message with the new one.
    Overlay,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub source: EventSource,
    pub event_type: Atom,
    pub sub_type: Atom,
    pub data: Value,
}

impl Event {
    pub fn new(source: EventSource, name: &str, data: Value) -> Self {
        let (ty, sub) = Atom::split_type_sub(name);
        Self {
            source,
            event_type: Atom::new(ty),
            sub_type: Atom::new(sub),
            data,
        }
    }

    pub fn matches(&self, event_type: Atom, sub_type: Atom) -> bool {
        let wildcard = Atom::new("*");
        self.event_type == event_type
            && (sub_type == wildcard || self.sub_type == sub_type)
    }
}

/// A unit of cross-coroutine communication: either a plain event delivery
/// or the completion of a correlated asynchronous request.
#[derive(Debug, Clone)]
pub enum Message {
    Event(Event),
    RequestResult {
        request: RequestId,
        result: Result<Value, crate::error::HvmlError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_event_name_into_type_and_sub() {
        let ev = Event::new(
            EventSource::NamedVariable("x".into()),
            "change:attached",
            Value::Null,
        );
        assert_eq!(&*ev.event_type.as_str(), "change");
        assert_eq!(&*ev.sub_type.as_str(), "attached");
    }

    #[test]
    fn wildcard_subtype_matches_anything() {
        let ev = Event::new(EventSource::NamedVariable("x".into()), "change:foo", Value::Null);
        assert!(ev.matches(Atom::new("change"), Atom::new("*")));
        assert!(!ev.matches(Atom::new("grow"), Atom::new("*")));
    }
}
