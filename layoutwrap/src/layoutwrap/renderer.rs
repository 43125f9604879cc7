use serde_json::{Map, Value};

use crate::layoutwrap::engines::Engine;
use crate::layoutwrap::error::EngineError;
use crate::layoutwrap::types::ContentItem;

/// Render `template` as a layout around `item`.
///
/// The template sees every field of `data` plus `file`, which carries the
/// item's `path`, `contents` and `data`. `file` wins over a data key of the
/// same name. Nothing passed in is modified.
pub fn render(
    engine: Engine,
    template: &str,
    data: &Map<String, Value>,
    item: &ContentItem,
) -> Result<String, EngineError> {
    let context = render_context(data, item)?;
    engine.render(template, &context)
}

pub fn render_context(data: &Map<String, Value>, item: &ContentItem) -> Result<Value, EngineError> {
    let mut context = data.clone();
    context.insert("file".into(), serde_json::to_value(item.template_view())?);
    Ok(Value::Object(context))
}
