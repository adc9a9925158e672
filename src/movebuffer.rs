//! The inter-runner message move-buffer: the channel a coroutine in one
//! runner uses to send an [`Message`] to a coroutine identified only by its
//! `CRTN`/`CHAN` URI, possibly living in a different runner (and therefore a
//! different thread or process). Unlike same-runner delivery, which just
//! pushes straight onto a `Coroutine`'s in-memory mailbox, a cross-runner
//! send has to cross a synchronization boundary, so it goes through this
//! bounded, lock-guarded buffer instead.
//!
//! Bounded by `max_moving_msgs`: once that many messages are queued and
//! unclaimed, a further `thread_move_msg` fails with `ErrorKind::TooMany`
//! rather than growing without limit.

use crate::error::{ErrorKind, HvmlError};
use crate::event::Message;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// A message in flight between runners, tagged with its destination so the
/// receiving runner can route it to the right coroutine's mailbox.
#[derive(Debug, Clone)]
pub struct MovingMessage {
    pub to: String,
    pub message: Message,
}

#[derive(Debug, Default)]
pub struct MoveBuffer {
    queue: RwLock<VecDeque<MovingMessage>>,
    capacity: usize,
}

impl MoveBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// Enqueue a message for cross-runner delivery. Fails once the buffer
    /// is at capacity — the sender is expected to retry or surface the
    /// failure as a recoverable error, not block.
    pub fn thread_move_msg(&self, to: impl Into<String>, message: Message) -> Result<(), HvmlError> {
        let mut queue = self.queue.write();
        if queue.len() >= self.capacity {
            return Err(HvmlError::new(ErrorKind::TooMany));
        }
        queue.push_back(MovingMessage {
            to: to.into(),
            message,
        });
        Ok(())
    }

    /// Look at the next message queued for `to` without removing it.
    pub fn thread_retrieve_msg(&self, to: &str) -> Option<MovingMessage> {
        self.queue.read().iter().find(|m| m.to == to).cloned()
    }

    /// Remove and return the next message queued for `to`, if any.
    pub fn thread_take_away_msg(&self, to: &str) -> Option<MovingMessage> {
        let mut queue = self.queue.write();
        let pos = queue.iter().position(|m| m.to == to)?;
        queue.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.queue.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventSource};
    use crate::variant::Value;

    fn sample_message() -> Message {
        Message::Event(Event::new(
            EventSource::NamedVariable("x".into()),
            "change",
            Value::Null,
        ))
    }

    #[test]
    fn take_away_removes_the_message() {
        let buf = MoveBuffer::new(4);
        buf.thread_move_msg("crtn:42", sample_message()).unwrap();
        assert!(buf.thread_retrieve_msg("crtn:42").is_some());
        assert!(buf.thread_take_away_msg("crtn:42").is_some());
        assert!(buf.thread_retrieve_msg("crtn:42").is_none());
    }

    #[test]
    fn overflow_is_too_many() {
        let buf = MoveBuffer::new(1);
        buf.thread_move_msg("a", sample_message()).unwrap();
        let err = buf.thread_move_msg("b", sample_message()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooMany);
    }
}
