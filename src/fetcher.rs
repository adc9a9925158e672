//! Asynchronous data fetching: the capability `<load>`/`<include>`/`<call
//! on="$URI">` need to pull a resource in without blocking the whole
//! runner. The interpreter only ever sees [`Fetcher`] — an actual HTTP
//! client, file reader, or test double can sit behind it interchangeably.
//!
//! A fetch is identified by the [`RequestId`] minted when it starts; the
//! coroutine that started it parks in `Observing` with `wait_request` set
//! to that id, and the scheduler wakes it again once [`Fetcher::poll`]
//! reports the matching [`FetchOutcome`].

use crate::error::HvmlError;
use crate::request::RequestId;
use crate::variant::Value;
use std::collections::VecDeque;

/// What a completed fetch produced, keyed by the request that started it.
pub struct FetchOutcome {
    pub request: RequestId,
    pub result: Result<Value, HvmlError>,
}

/// The capability a coroutine needs to issue and collect async fetches.
/// Implementors decide how "fetch" actually happens; this crate only needs
/// to know when a request is done and what it produced.
pub trait Fetcher {
    /// Start fetching `uri`. Returns immediately; the outcome arrives later
    /// through [`Fetcher::poll`].
    fn load_async(&mut self, request: RequestId, uri: &str);

    /// Cancel a pending fetch. A no-op if it already completed.
    fn cancel(&mut self, request: RequestId);

    /// Drain any fetches that have completed since the last poll.
    fn poll(&mut self) -> Vec<FetchOutcome>;
}

/// An in-process `Fetcher` for tests and embedders that don't need real
/// network I/O: `complete`/`fail` resolve a request synchronously, and
/// `poll` hands back everything resolved since the last call.
#[derive(Default)]
pub struct StubFetcher {
    pending: Vec<RequestId>,
    ready: VecDeque<FetchOutcome>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&mut self, request: RequestId, value: Value) {
        self.pending.retain(|r| *r != request);
        self.ready.push_back(FetchOutcome {
            request,
            result: Ok(value),
        });
    }

    pub fn fail(&mut self, request: RequestId, err: HvmlError) {
        self.pending.retain(|r| *r != request);
        self.ready.push_back(FetchOutcome {
            request,
            result: Err(err),
        });
    }
}

impl Fetcher for StubFetcher {
    fn load_async(&mut self, request: RequestId, _uri: &str) {
        self.pending.push(request);
    }

    fn cancel(&mut self, request: RequestId) {
        self.pending.retain(|r| *r != request);
        self.ready.retain(|o| o.request != request);
    }

    fn poll(&mut self) -> Vec<FetchOutcome> {
        self.ready.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestType;

    #[test]
    fn stub_fetcher_resolves_on_complete() {
        let mut fetcher = StubFetcher::new();
        let req = RequestId::next(RequestType::Elements);
        fetcher.load_async(req, "https://example.test/data.json");
        assert!(fetcher.poll().is_empty());
        fetcher.complete(req, Value::string("hi"));
        let outcomes = fetcher.poll();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].request, req);
    }

    #[test]
    fn cancel_drops_a_not_yet_polled_outcome() {
        let mut fetcher = StubFetcher::new();
        let req = RequestId::next(RequestType::Elements);
        fetcher.load_async(req, "https://example.test/data.json");
        fetcher.complete(req, Value::Null);
        fetcher.cancel(req);
        assert!(fetcher.poll().is_empty());
    }
}
