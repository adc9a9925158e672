//! `<hvml>`: the document root. Reads the coroutine-wide `target` and
//! `tag-prefix` attributes and, on popping, finalizes the coroutine's result
//! if nothing already called `<exit>`.

use crate::coroutine::Coroutine;
use crate::edom::EdomSink;
use crate::error::HvmlError;
use crate::ops::eval_attr_text;
use crate::variant::Value;
use crate::vdom::VdomSource;

pub fn after_pushed<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    let root = co.vdom.root();
    let element = co.vdom.element(root).clone();
    if let Some(attr) = element.attr("target") {
        let v = eval_attr_text(co, &attr.value);
        co.target = Some(v.stringify());
    }
    if let Some(attr) = element.attr("tag-prefix") {
        let v = eval_attr_text(co, &attr.value);
        co.tag_prefix = Some(v.stringify());
    }
    Ok(())
}

pub fn on_popping<V: VdomSource>(
    co: &mut Coroutine<V>,
    _sink: &mut dyn EdomSink,
) -> Result<(), HvmlError> {
    if co.result.is_none() {
        co.result = Some(Ok(Value::Undefined));
    }
    Ok(())
}
