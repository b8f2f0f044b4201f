use crate::compare::Comparator;
use crate::element::{ExpectedElement, ParameterFixture};
use crate::error::GenError;
use crate::ir::TypeRef;
use crate::registry::Translator;
use crate::schema::{AdaptiveId, SchemaBuilder};

use super::{ensure_tag, inferred_rows};

pub const RICH_TEXT_URL: &str = "https://developers.notion.com/reference/rich-text";

pub(super) fn translator() -> Translator<AdaptiveId> {
    Translator::new("rich_text", RICH_TEXT_URL, rich_text_object)
        .step(annotations)
        .step(text)
        .step(equation)
}

fn rich_text_object(cmp: &mut Comparator, b: &mut SchemaBuilder) -> Result<AdaptiveId, GenError> {
    cmp.expect(ExpectedElement::heading_level(1, "Rich text"))?;
    cmp.expect(ExpectedElement::paragraph_starting(
        "Rich text objects contain the data that Notion uses to display formatted text,",
    ))?;
    cmp.expect(ExpectedElement::any_code())?;

    cmp.expect_parameter(ParameterFixture::new("type", "string (enum)"), |_| Ok(()))?;
    // Annotation flags are documented in their own section below.
    cmp.expect_parameter(ParameterFixture::new("annotations", "object"), |_| Ok(()))?;
    let fields = inferred_rows(cmp, &[("plain_text", "string"), ("href", "string (optional)")])?;

    let rich_text = b.declare_adaptive_object("RichText", "type", Some("Formatted text."))?;
    b.add_fields(rich_text, fields)?;
    Ok(rich_text)
}

fn annotations(cmp: &mut Comparator, b: &mut SchemaBuilder, rich_text: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("The annotation object"))?;
    cmp.expect(ExpectedElement::paragraph_starting("All rich text objects contain an annotations object"))?;
    let flags = inferred_rows(
        cmp,
        &[
            ("bold", "boolean"),
            ("italic", "boolean"),
            ("strikethrough", "boolean"),
            ("underline", "boolean"),
            ("code", "boolean"),
            ("color", "string (enum)"),
        ],
    )?;
    // TODO: declare an `Annotations` object and attach it as `RichText.annotations`.
    b.defer_fields(
        Some((*rich_text).into()),
        "annotation flags are parsed but not attached to RichText yet",
        flags,
    )?;
    Ok(())
}

fn text(cmp: &mut Comparator, b: &mut SchemaBuilder, rich_text: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Text"))?;
    cmp.expect(ExpectedElement::paragraph_starting("If a rich text object's type value is \"text\","))?;
    let mut fields = inferred_rows(cmp, &[("content", "string")])?;
    cmp.expect_parameter(ParameterFixture::new("link", "object"), |row| {
        fields.push(row.as_field(TypeRef::JSON.nullable()).omit_empty());
        Ok(())
    })?;
    ensure_tag(cmp, "text")?;

    let text = b.add_variant(*rich_text, "text", Some("Plain or linked text."))?;
    b.add_fields(text, fields)?;
    Ok(())
}

fn equation(cmp: &mut Comparator, b: &mut SchemaBuilder, rich_text: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Equation"))?;
    cmp.expect(ExpectedElement::paragraph_starting("Notion supports inline LaTeX equations"))?;
    let fields = inferred_rows(cmp, &[("expression", "string")])?;
    ensure_tag(cmp, "equation")?;

    let equation = b.add_variant(*rich_text, "equation", Some("Inline LaTeX."))?;
    b.add_fields(equation, fields)?;
    Ok(())
}
