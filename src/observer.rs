//! Observers: the registration a `<observe>` element installs, matched
//! against incoming events to decide whether (and how) to wake the owning
//! coroutine.
//!
//! Coroutine-identity observers never cross runner boundaries: a `<call
//! within="...">` targeting another runner's coroutine cannot register a
//! same-process `Observer`; that path always goes through the message
//! move-buffer instead, which is why `Observer` only ever matches sources
//! local to its own coroutine.

use crate::atom::Atom;
use crate::event::{EventSource, ReduceOpt};
use crate::frame::SymbolSlot;

#[derive(Debug, Clone)]
pub struct Observer {
    pub source: EventSource,
    pub event_type: Atom,
    pub sub_type: Atom,
    pub reduce: ReduceOpt,
    /// The symbol slot the matched event's data should be bound to before
    /// the observer's body runs (`@` for most observers, `!` for an
    /// exception handler's catch body).
    pub bind_to: SymbolSlot,
    /// The frame index whose child subtree should re-run when this observer
    /// fires.
    pub handler_frame: usize,
}

impl Observer {
    pub fn is_match(&self, source: &EventSource, event_type: Atom, sub_type: Atom) -> bool {
        source_matches(&self.source, source) && self.matches_type(event_type, sub_type)
    }

    fn matches_type(&self, event_type: Atom, sub_type: Atom) -> bool {
        let wildcard = Atom::new("*");
        (self.event_type == wildcard || self.event_type == event_type)
            && (self.sub_type == wildcard || self.sub_type == sub_type)
    }
}

fn source_matches(observed: &EventSource, incoming: &EventSource) -> bool {
    match (observed, incoming) {
        (EventSource::NamedVariable(a), EventSource::NamedVariable(b)) => a == b,
        (EventSource::Element(a), EventSource::Element(b)) => a == b,
        (EventSource::Coroutine(a), EventSource::Coroutine(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::ElementId;

    #[test]
    fn matches_exact_type_and_sub() {
        let obs = Observer {
            source: EventSource::Element(ElementId(0)),
            event_type: Atom::new("change"),
            sub_type: Atom::new("attached"),
            reduce: ReduceOpt::Keep,
            bind_to: SymbolSlot::At,
            handler_frame: 0,
        };
        assert!(obs.is_match(
            &EventSource::Element(ElementId(0)),
            Atom::new("change"),
            Atom::new("attached")
        ));
        assert!(!obs.is_match(
            &EventSource::Element(ElementId(1)),
            Atom::new("change"),
            Atom::new("attached")
        ));
    }

    #[test]
    fn wildcard_subtype_on_observer_matches_any_incoming_sub() {
        let obs = Observer {
            source: EventSource::Element(ElementId(0)),
            event_type: Atom::new("change"),
            sub_type: Atom::new("*"),
            reduce: ReduceOpt::Keep,
            bind_to: SymbolSlot::At,
            handler_frame: 0,
        };
        assert!(obs.is_match(&EventSource::Element(ElementId(0)), Atom::new("change"), Atom::new("anything")));
    }
}
