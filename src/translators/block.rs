use crate::compare::Comparator;
use crate::element::{ExpectedElement, ParameterFixture};
use crate::error::GenError;
use crate::ir::TypeRef;
use crate::registry::Translator;
use crate::schema::{AdaptiveId, SchemaBuilder};

use super::{ensure_tag, inferred_rows};

pub const BLOCK_URL: &str = "https://developers.notion.com/reference/block";

pub(super) fn translator() -> Translator<AdaptiveId> {
    Translator::new("block", BLOCK_URL, block_object)
        .step(paragraph)
        .step(headings)
        .step(divider)
        .step(breadcrumb)
}

fn block_object(cmp: &mut Comparator, b: &mut SchemaBuilder) -> Result<AdaptiveId, GenError> {
    let mut comment = String::new();
    cmp.expect(ExpectedElement::heading_level(1, "Block"))?;
    cmp.expect_block(
        ExpectedElement::paragraph_starting("A block object represents a piece of content within Notion."),
        |actual| {
            comment = actual.text();
            Ok(())
        },
    )?;
    cmp.expect(ExpectedElement::any_code())?;
    cmp.expect(ExpectedElement::heading("Keys"))?;

    let mut fields = Vec::new();
    cmp.expect_parameter(ParameterFixture::new("object", "string"), |row| {
        fields.push(row.as_fixed("block"));
        Ok(())
    })?;
    fields.extend(inferred_rows(cmp, &[("id", "string (UUIDv4)")])?);
    cmp.expect_parameter(ParameterFixture::new("parent", "object"), |row| {
        fields.push(row.as_field(TypeRef::named("Parent")));
        Ok(())
    })?;
    // The discriminator itself; its values are the variants below.
    cmp.expect_parameter(ParameterFixture::new("type", "string (enum)"), |_| Ok(()))?;
    fields.extend(inferred_rows(
        cmp,
        &[
            ("created_time", "string (ISO 8601 date time)"),
            ("last_edited_time", "string (ISO 8601 date time)"),
            ("has_children", "boolean"),
            ("archived", "boolean"),
            ("in_trash", "boolean"),
        ],
    )?);

    let block = b.declare_adaptive_object("Block", "type", Some(comment.as_str()))?;
    b.add_fields(block, fields)?;
    Ok(block)
}

fn paragraph(cmp: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Paragraph"))?;
    cmp.expect(ExpectedElement::paragraph(
        "Paragraph block objects contain the following information within the paragraph property:",
    ))?;
    let mut fields = inferred_rows(
        cmp,
        &[("rich_text", "array of rich text objects"), ("color", "string (enum)")],
    )?;
    // Children may be blocks of any type.
    cmp.expect_parameter(ParameterFixture::new("children", "array of block objects"), |row| {
        fields.push(row.as_inferred_field()?.interface());
        Ok(())
    })?;
    ensure_tag(cmp, "paragraph")?;

    let paragraph = b.add_variant(*block, "paragraph", Some("A paragraph of rich text."))?;
    b.add_fields(paragraph, fields)?;
    Ok(())
}

/// `heading_1`, `heading_2` and `heading_3` share one shape.
fn headings(cmp: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Headings"))?;
    cmp.expect(ExpectedElement::paragraph_starting(
        "All heading block objects, heading_1, heading_2, and heading_3,",
    ))?;
    let fields = inferred_rows(
        cmp,
        &[
            ("rich_text", "array of rich text objects"),
            ("color", "string (enum)"),
            ("is_toggleable", "boolean"),
        ],
    )?;
    ensure_tag(cmp, "heading_1")?;

    let heading = b.declare_concrete_object("BlockHeading", Some("Shared by all heading levels."))?;
    b.add_fields(heading, fields)?;
    for (tag, description) in [
        ("heading_1", "Top-level heading."),
        ("heading_2", "Second-level heading."),
        ("heading_3", "Third-level heading."),
    ] {
        b.add_ref_variant(*block, tag, Some(description), "BlockHeading")?;
    }
    Ok(())
}

fn divider(cmp: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Divider"))?;
    cmp.expect(ExpectedElement::paragraph(
        "Divider block objects do not contain any information within the divider property.",
    ))?;
    ensure_tag(cmp, "divider")?;
    b.add_empty_variant(*block, "divider", Some("A horizontal rule."))?;
    Ok(())
}

fn breadcrumb(cmp: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Breadcrumb"))?;
    cmp.expect(ExpectedElement::paragraph_starting(
        "Breadcrumb block objects do not contain any information",
    ))?;
    ensure_tag(cmp, "breadcrumb")?;
    b.add_empty_variant(*block, "breadcrumb", Some("Navigation path to the current page."))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::DocElement;
    use crate::ir::VariantPayload;
    use crate::registry::Translate;

    #[test]
    fn breadcrumb_section_alone() {
        let mut cmp = Comparator::new(
            BLOCK_URL,
            vec![
                DocElement::heading(2, "Breadcrumb"),
                DocElement::paragraph(
                    "Breadcrumb block objects do not contain any information within the breadcrumb property.",
                ),
                DocElement::code(Some("json"), r#"{"type":"breadcrumb","breadcrumb":{}}"#),
            ],
        );
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        breadcrumb(&mut cmp, &mut b, &block).unwrap();
        let model = b.finish().unwrap();
        assert_eq!(model.adaptive("Block").unwrap().variants["breadcrumb"].payload, VariantPayload::Empty);
    }

    #[test]
    fn mistagged_example_is_rejected() {
        let mut cmp = Comparator::new(
            BLOCK_URL,
            vec![
                DocElement::heading(2, "Divider"),
                DocElement::paragraph(
                    "Divider block objects do not contain any information within the divider property.",
                ),
                DocElement::code(Some("json"), r#"{"type":"breadcrumb","breadcrumb":{}}"#),
            ],
        );
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        let err = divider(&mut cmp, &mut b, &block).unwrap_err();
        assert!(matches!(err, GenError::Example { .. }));
    }

    #[test]
    fn translator_targets_the_block_page() {
        assert_eq!(translator().url(), BLOCK_URL);
    }
}
