//! The eDOM (execution/rendering-side DOM) sink: the external consumer the
//! interpreter pushes tree-mutation operations into. A write-only, batched
//! mutation channel the core emits into without knowing or caring what's on
//! the other end (a real renderer in production, a recording fake in
//! tests).

use crate::vdom::ElementId;
use crate::variant::Value;

/// One structural change to the eDOM, as emitted by element operations like
/// `<update>`/`<iterate>`/`<archetype>`.
#[derive(Debug, Clone)]
pub enum EdomOp {
    Append { target: ElementId, content: String },
    Prepend { target: ElementId, content: String },
    InsertBefore { target: ElementId, content: String },
    InsertAfter { target: ElementId, content: String },
    Displace { target: ElementId, content: String },
    Update { target: ElementId, content: String },
    Erase { target: ElementId },
    Clear { target: ElementId },
}

/// The output side of the interpreter: anything that can accept a stream of
/// [`EdomOp`]s. Kept minimal and write-only, same shape as `WriteMutations`
/// — the interpreter never reads back from the eDOM, only appends to it.
pub trait EdomSink {
    fn apply(&mut self, op: EdomOp);

    /// Convenience used by operations that materialize a whole value as
    /// their emitted content (most `<update>` variants).
    fn apply_value(&mut self, target: ElementId, value: &Value, op: fn(ElementId, String) -> EdomOp) {
        self.apply(op(target, value.stringify()));
    }
}

/// An in-memory [`EdomSink`] that just records every op, for tests and for
/// embedding contexts with no real renderer attached.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<EdomOp>,
}

impl EdomSink for RecordingSink {
    fn apply(&mut self, op: EdomOp) {
        self.ops.push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_collects_ops() {
        let mut sink = RecordingSink::default();
        sink.apply(EdomOp::Append {
            target: ElementId(0),
            content: "<p>hi</p>".to_string(),
        });
        assert_eq!(sink.ops.len(), 1);
    }
}
