#![allow(clippy::type_complexity)]

//! Interpreter core for HVML.
//!
//! This crate is organized leaves-first: variants have no dependencies;
//! scopes depend on variants; frames depend on scopes and variants;
//! operations depend on frames; the scheduler depends on operations;
//! observers depend on the scheduler; the fetcher/timer shim depends on
//! observers.

pub mod atom;
pub mod coroutine;
pub mod edom;
pub mod env;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod frame;
pub mod movebuffer;
pub mod observer;
pub mod ops;
pub mod renderer;
pub mod request;
pub mod runtime;
pub mod scheduler;
pub mod scope;
pub mod timefmt;
pub mod timer;
pub mod uri;
pub mod variant;
pub mod vdom;

pub mod prelude {
    pub use crate::atom::Atom;
    pub use crate::coroutine::{Coroutine, CoroutineId, CoroutineStage, CoroutineState};
    pub use crate::error::{ErrorKind, Exception, HvmlError};
    pub use crate::event::{Event, EventSource, Message, ReduceOpt};
    pub use crate::frame::{EvalStep, Frame, NextStep, SymbolSlot};
    pub use crate::observer::Observer;
    pub use crate::request::{RequestId, RequestType};
    pub use crate::runtime::Runtime;
    pub use crate::scheduler::Scheduler;
    pub use crate::variant::Value;
}
