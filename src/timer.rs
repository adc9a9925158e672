//! Timers: the capability `<sleep>` (and the scheduler's own idle-polling
//! tick) need to ask "wake me after N milliseconds" without this crate ever
//! touching a wall clock itself — that stays with whatever embeds it, the
//! same way [`crate::fetcher::Fetcher`] keeps network I/O out of the core.

use crate::request::RequestId;

/// The capability a coroutine needs to park itself on a duration.
pub trait Timers {
    /// Start a one-shot timer that should fire after `millis`. Returns
    /// immediately; the expiry is reported later through [`Timers::poll`].
    fn start(&mut self, request: RequestId, millis: u64);

    /// Cancel a pending timer. A no-op if it already fired.
    fn stop(&mut self, request: RequestId);

    /// Return the requests whose timers have fired since the last poll.
    fn poll(&mut self) -> Vec<RequestId>;
}

/// A manually-driven `Timers` for tests and embedders without a real clock:
/// `advance` fires every timer whose deadline has passed a caller-supplied
/// virtual tick count.
#[derive(Default)]
pub struct ManualTimers {
    pending: Vec<(RequestId, u64)>,
    now: u64,
    fired: Vec<RequestId>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the virtual clock by `millis`, firing any timer whose
    /// deadline that crosses.
    pub fn advance(&mut self, millis: u64) {
        self.now += millis;
        let now = self.now;
        let (due, still_pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(_, deadline)| *deadline <= now);
        self.pending = still_pending;
        self.fired.extend(due.into_iter().map(|(req, _)| req));
    }
}

impl Timers for ManualTimers {
    fn start(&mut self, request: RequestId, millis: u64) {
        self.pending.push((request, self.now + millis));
    }

    fn stop(&mut self, request: RequestId) {
        self.pending.retain(|(r, _)| *r != request);
        self.fired.retain(|r| *r != request);
    }

    fn poll(&mut self) -> Vec<RequestId> {
        std::mem::take(&mut self.fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestType;

    #[test]
    fn fires_once_deadline_passes() {
        let mut timers = ManualTimers::new();
        let req = RequestId::next(RequestType::Elements);
        timers.start(req, 500);
        timers.advance(200);
        assert!(timers.poll().is_empty());
        timers.advance(400);
        assert_eq!(timers.poll(), vec![req]);
    }

    #[test]
    fn stop_before_firing_is_silent() {
        let mut timers = ManualTimers::new();
        let req = RequestId::next(RequestType::Elements);
        timers.start(req, 100);
        timers.stop(req);
        timers.advance(1000);
        assert!(timers.poll().is_empty());
    }
}
