//! The stack frame: the per-element execution record pushed when a
//! coroutine's walk enters an element and popped when it leaves.
//!
//! Each element tag implements a quad of operations — `after_pushed`,
//! `select_child`, `rerun`, `on_popping` — and the frame is the bundle of
//! state those four calls share: which child to visit next, the element's
//! evaluated context data, and the small set of well-known "symbol"
//! variables (`<`, `?`, `!`, `@`, `%`, `:`, `^`) that HVML expression syntax
//! can reference without an explicit name. Frame-local bookkeeping (`pos`,
//! `next_step`) lives directly on the struct, while the slower-changing
//! symbol table is a small fixed array indexed by an enum rather than a
//! hash map.

use crate::variant::Value;
use crate::vdom::ElementId;
use std::cell::RefCell;
use std::rc::Rc;

/// The seven well-known per-frame symbol variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolSlot {
    /// `<` (input-var) — receives the outer `with`.
    Context,
    /// `?` (question-var) — the current datum: the content of `with`/`from`,
    /// or a call's result. `<iterate>` rebinds this to each member in turn.
    Question,
    /// `!` (exclamation-var) — an anonymous object shared down the frame
    /// chain, written by `<init locally>`/`<bind temporarily>`. Not the
    /// caught-exception value; that lives in [`Frame::exception`], a
    /// separate slot.
    Exclamation,
    /// `@` (at-var) — the eDOM element produced by this frame, or the value
    /// of an `in=` selector.
    At,
    /// `%` — the current iteration's position/index.
    Percent,
    /// `:` — set by `<call>`/`<inherit>`.
    Colon,
    /// `^` — the value returned by the element's last-run child.
    Caret,
}

impl SymbolSlot {
    pub const ALL: [SymbolSlot; 7] = [
        SymbolSlot::Context,
        SymbolSlot::Question,
        SymbolSlot::Exclamation,
        SymbolSlot::At,
        SymbolSlot::Percent,
        SymbolSlot::Colon,
        SymbolSlot::Caret,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn glyph(self) -> char {
        match self {
            SymbolSlot::Context => '<',
            SymbolSlot::Question => '?',
            SymbolSlot::Exclamation => '!',
            SymbolSlot::At => '@',
            SymbolSlot::Percent => '%',
            SymbolSlot::Colon => ':',
            SymbolSlot::Caret => '^',
        }
    }
}

/// Which quad operation should run next for this frame, driven by the
/// scheduler's per-step walk of the vDOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStep {
    AfterPushed,
    SelectChild,
    Rerun,
    OnPopping,
}

/// What the scheduler should do once the current quad call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Descend into the child just selected by `select_child`.
    PushChild(ElementId),
    /// No more children: run `on_popping` and pop this frame.
    Pop,
    /// Re-enter `select_child` without unwinding (the `again` control path).
    Again,
    /// The element asked to be visited again from the top (`rerun`, used by
    /// looping constructs like `<iterate>`).
    Rerun,
}

/// One entry of the per-coroutine execution stack.
pub struct Frame {
    pub element: ElementId,
    pub eval_step: EvalStep,
    pub next_step: Option<NextStep>,
    /// Which child index `select_child` should consider next.
    pub child_cursor: usize,
    symbols: [Option<Value>; 7],
    /// Whether errors raised while evaluating this element's attributes
    /// should be swallowed (the `silently` attribute) rather than raising an
    /// exception. Inherits from the parent frame at push time, then can be
    /// turned on (never off) by the element's own `silently` attribute.
    pub silently: bool,
    /// The value caught by the nearest enclosing `<catch>`/`<except>`, set
    /// only by the unwinder. Distinct from the seven symbol variables above
    /// — `!` has its own, unrelated meaning.
    pub exception: Option<Value>,
    /// Lazily-constructed per-element native context (e.g. an open file
    /// handle for `<choose>`-like streaming elements); boxed so `Frame`
    /// itself stays a fixed size regardless of which element owns it.
    pub ctxt: Option<Rc<RefCell<dyn std::any::Any>>>,
}

impl Frame {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            eval_step: EvalStep::AfterPushed,
            next_step: None,
            child_cursor: 0,
            symbols: Default::default(),
            silently: false,
            exception: None,
            ctxt: None,
        }
    }

    pub fn get_symbol(&self, slot: SymbolSlot) -> Option<Value> {
        self.symbols[slot.index()].clone()
    }

    pub fn set_symbol(&mut self, slot: SymbolSlot, value: Value) {
        self.symbols[slot.index()] = Some(value);
    }

    pub fn clear_symbol(&mut self, slot: SymbolSlot) {
        self.symbols[slot.index()] = None;
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("element", &self.element)
            .field("eval_step", &self.eval_step)
            .field("next_step", &self.next_step)
            .field("child_cursor", &self.child_cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_slots_round_trip() {
        let mut frame = Frame::new(ElementId(0));
        assert!(frame.get_symbol(SymbolSlot::Question).is_none());
        frame.set_symbol(SymbolSlot::Question, Value::number(42.0));
        assert_eq!(frame.get_symbol(SymbolSlot::Question).unwrap().numerify(), 42.0);
        frame.clear_symbol(SymbolSlot::Question);
        assert!(frame.get_symbol(SymbolSlot::Question).is_none());
    }

    #[test]
    fn glyphs_match_known_set() {
        let glyphs: Vec<char> = SymbolSlot::ALL.iter().map(|s| s.glyph()).collect();
        assert_eq!(glyphs, vec!['<', '?', '!', '@', '%', ':', '^']);
    }
}
