//! `<undefined>` and the `differ` family of placeholder tags: elements a
//! vDOM can legally contain (e.g. left behind by a foreign-tag passthrough)
//! but that this interpreter has no operation for. Always raises
//! `NotImplemented` so the enclosing `<catch>` chain has something concrete
//! to handle, rather than silently no-opping.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    _co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    Err(HvmlError::new(ErrorKind::NotImplemented))
}
