//! Request identity: the addressing scheme used by `<call>`, `<load>`, and
//! channel operations to correlate an asynchronous request with its later
//! result event.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// What kind of target a [`RequestId`] addresses, used to pick the matching
/// rules a wildcard observer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// A specific vDOM element (e.g. an `<update>` target).
    Elements,
    /// A coroutine, addressed by its identity.
    Crtn,
    /// A named channel.
    Chan,
    /// The renderer connection itself.
    Rdr,
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// A process-wide unique identifier minted for every asynchronous request
/// (a `<call>`, a `<load>`, a channel post) so its eventual result event can
/// be correlated back to the frame that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub id: u64,
    pub ty: RequestType,
}

impl RequestId {
    pub fn next(ty: RequestType) -> Self {
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            ty,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.ty, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let a = RequestId::next(RequestType::Crtn);
        let b = RequestId::next(RequestType::Crtn);
        assert!(b.id > a.id);
    }
}
