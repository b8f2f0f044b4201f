//! Built-in translators for the Notion API reference.
//!
//! Each submodule describes one reference page in reading order. They are
//! data for the comparator and builder, nothing more.
mod block;
mod parent;
mod rich_text;

use crate::compare::Comparator;
use crate::element::{DocElement, ExpectedElement, ParameterFixture};
use crate::error::GenError;
use crate::ir::Field;
use crate::registry::Registry;

pub use block::BLOCK_URL;
pub use parent::PARENT_URL;
pub use rich_text::RICH_TEXT_URL;

pub fn builtin() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(block::translator())
        .register(parent::translator())
        .register(rich_text::translator());
    registry
}

// ————————————————————————————————————————————————————————————————————————————
// SHARED STEP HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Parameter rows whose type column says everything, as fields.
fn inferred_rows(cmp: &mut Comparator, rows: &[(&str, &str)]) -> Result<Vec<Field>, GenError> {
    let mut fields = Vec::with_capacity(rows.len());
    for (property, type_) in rows {
        cmp.expect_parameter(ParameterFixture::new(property, type_), |row| {
            fields.push(row.as_inferred_field()?);
            Ok(())
        })?;
    }
    Ok(fields)
}

/// Match a JSON example and return the value of its `type` key.
fn example_type(cmp: &mut Comparator) -> Result<String, GenError> {
    let mut tag = String::new();
    cmp.expect_block(ExpectedElement::any_code(), |actual| {
        tag = type_tag(actual)?;
        Ok(())
    })?;
    Ok(tag)
}

fn type_tag(element: &DocElement) -> Result<String, GenError> {
    let unusable = |reason: String| GenError::Example { element: element.to_string(), reason };
    let value: serde_json::Value =
        serde_json::from_str(&element.text()).map_err(|err| unusable(err.to_string()))?;
    value
        .get("type")
        .and_then(|t| t.as_str())
        .map(str::to_owned)
        .ok_or_else(|| unusable("no string `type` key".to_owned()))
}

/// The example's tag must be the one the section documents.
fn ensure_tag(cmp: &mut Comparator, expected: &str) -> Result<(), GenError> {
    let position = cmp.position();
    let tag = example_type(cmp)?;
    if tag != expected {
        return Err(GenError::Example {
            element: format!("{} #{position}", cmp.url()),
            reason: format!("example is tagged {tag:?}, section documents {expected:?}"),
        });
    }
    Ok(())
}
