//! Process-wide mutable state modeled as an explicit handle passed into the
//! scheduler, so test harnesses can construct isolated runtimes instead of
//! sharing global state.
//!
//! A thread-local stack of active runtimes (`push_runtime`/`pop_runtime`/
//! `with_runtime`) lets nested or re-entrant evaluation (e.g. a native
//! variant's method calling back into the interpreter) find "the current
//! runtime" without threading a reference through every call site.

use std::cell::RefCell;
use std::rc::Rc;

use crate::env::EnvOverrides;

thread_local! {
    static RUNTIMES: RefCell<Vec<Rc<Runtime>>> = RefCell::new(Vec::new());
}

pub(crate) fn push_runtime(runtime: Rc<Runtime>) {
    RUNTIMES.with(|stack| stack.borrow_mut().push(runtime));
}

pub(crate) fn pop_runtime() {
    RUNTIMES.with(|stack| {
        stack.borrow_mut().pop();
    });
}

pub(crate) fn with_runtime<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Runtime) -> R,
{
    RUNTIMES.with(|stack| stack.borrow().last().map(|r| f(r)))
}

/// Pre-allocation and limits, analogous to `dioxus-core`'s
/// `HeuristicsEngine`/`Scheduler::new` pre-sizing of its component and
/// element slabs.
#[derive(Debug, Clone)]
pub struct Heuristics {
    /// Initial capacity for the coroutine table.
    pub coroutine_capacity: usize,
    /// Initial capacity for the per-coroutine frame stack.
    pub frame_capacity: usize,
    /// Bound on the inter-runner message move-buffer; a send once this
    /// many messages are queued fails with `ErrorKind::TooMany` instead of
    /// growing without limit.
    pub max_moving_msgs: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            coroutine_capacity: 16,
            frame_capacity: 32,
            max_moving_msgs: 1024,
        }
    }
}

/// One HVML runner: owns a scheduler loop's configuration and environment
/// snapshot. Not the scheduler itself (see [`crate::scheduler::Scheduler`]) —
/// this is the configuration/context object the scheduler is built from, kept
/// separate so test harnesses can construct many isolated runtimes cheaply.
pub struct Runtime {
    pub heuristics: Heuristics,
    pub env: EnvOverrides,
    pub runner_name: String,
    pub app_name: String,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// Run `f` with `self` installed as "the current runtime" for the
    /// duration of the call. Re-entrant: nested calls push/pop independently.
    pub fn enter<F, R>(self: &Rc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        push_runtime(self.clone());
        let result = f();
        pop_runtime();
        result
    }

    pub fn current() -> Option<Rc<Runtime>> {
        RUNTIMES.with(|stack| stack.borrow().last().cloned())
    }
}

#[derive(Default)]
pub struct RuntimeBuilder {
    heuristics: Heuristics,
    runner_name: Option<String>,
    app_name: Option<String>,
}

impl RuntimeBuilder {
    pub fn heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn runner_name(mut self, name: impl Into<String>) -> Self {
        self.runner_name = Some(name.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn build(self) -> Rc<Runtime> {
        Rc::new(Runtime {
            heuristics: self.heuristics,
            env: EnvOverrides::from_process_env(),
            runner_name: self.runner_name.unwrap_or_else(|| "main".to_string()),
            app_name: self.app_name.unwrap_or_else(|| "org.hvml.app".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_runtime_tracks_enter_scope() {
        assert!(Runtime::current().is_none());
        let rt = Runtime::builder().runner_name("test").build();
        rt.clone().enter(|| {
            assert_eq!(Runtime::current().unwrap().runner_name, "test");
        });
        assert!(Runtime::current().is_none());
    }
}
