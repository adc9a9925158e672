//! `<inherit>`: pulls the nearest ancestor frame's `:` (colon) symbol into
//! this frame, letting a child element see what a `<call>` bound there
//! without needing an explicit named variable.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::{ErrorKind, HvmlError};
use crate::frame::SymbolSlot;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    if co.frames.len() < 2 {
        return Err(HvmlError::new(ErrorKind::NotExists));
    }
    let parent_ctx = co.frames[co.frames.len() - 2].get_symbol(SymbolSlot::Colon);
    let Some(ctx) = parent_ctx else {
        return Err(HvmlError::new(ErrorKind::NoData));
    };
    co.frames.last_mut().unwrap().set_symbol(SymbolSlot::Colon, ctx);
    Ok(())
}
