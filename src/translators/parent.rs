use crate::compare::Comparator;
use crate::element::{ExpectedElement, ParameterFixture};
use crate::error::GenError;
use crate::ir::{Field, TypeRef};
use crate::registry::Translator;
use crate::schema::{ObjectId, SchemaBuilder};

pub const PARENT_URL: &str = "https://developers.notion.com/reference/parent-object";

// Every parent kind lands in one record: `type` plus one id key per kind.
pub(super) fn translator() -> Translator<ObjectId> {
    Translator::new("parent", PARENT_URL, parent_object)
        .step(database_parent)
        .step(page_parent)
        .step(workspace_parent)
        .step(block_parent)
}

fn parent_object(cmp: &mut Comparator, b: &mut SchemaBuilder) -> Result<ObjectId, GenError> {
    cmp.expect(ExpectedElement::heading_level(1, "Parent object"))?;
    cmp.expect(ExpectedElement::paragraph_starting(
        "Pages, databases, and blocks are either located inside other pages, databases, and blocks,",
    ))?;
    let parent = b.declare_concrete_object("Parent", Some("Where a page, database or block lives."))?;
    Ok(parent)
}

fn database_parent(cmp: &mut Comparator, b: &mut SchemaBuilder, parent: &ObjectId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Database parent"))?;
    let mut fields = Vec::new();
    cmp.expect_parameter(ParameterFixture::new("type", "string"), |row| {
        fields.push(row.as_field(TypeRef::STRING).non_empty_discriminator());
        Ok(())
    })?;
    parent_id(cmp, "database_id", "string (UUIDv4)", &mut fields)?;
    cmp.expect(ExpectedElement::any_code())?;
    b.add_fields(*parent, fields)?;
    Ok(())
}

fn page_parent(cmp: &mut Comparator, b: &mut SchemaBuilder, parent: &ObjectId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Page parent"))?;
    section_fields(cmp, b, parent, "page_id", "string (UUIDv4)")
}

fn workspace_parent(cmp: &mut Comparator, b: &mut SchemaBuilder, parent: &ObjectId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Workspace parent"))?;
    cmp.expect(ExpectedElement::paragraph_starting(
        "A page with a workspace parent is a top-level page within a Notion workspace.",
    ))?;
    section_fields(cmp, b, parent, "workspace", "boolean")
}

fn block_parent(cmp: &mut Comparator, b: &mut SchemaBuilder, parent: &ObjectId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Block parent"))?;
    cmp.expect(ExpectedElement::blockquote_starting("Block parents are only returned"))?;
    section_fields(cmp, b, parent, "block_id", "string (UUIDv4)")
}

/// `type` was added by the first section; later sections only re-check it.
fn section_fields(
    cmp: &mut Comparator,
    b: &mut SchemaBuilder,
    parent: &ObjectId,
    property: &str,
    type_: &str,
) -> Result<(), GenError> {
    cmp.expect_parameter(ParameterFixture::new("type", "string"), |_| Ok(()))?;
    let mut fields = Vec::new();
    parent_id(cmp, property, type_, &mut fields)?;
    cmp.expect(ExpectedElement::any_code())?;
    b.add_fields(*parent, fields)?;
    Ok(())
}

// Only one of the id keys is present on the wire.
fn parent_id(cmp: &mut Comparator, property: &str, type_: &str, fields: &mut Vec<Field>) -> Result<(), GenError> {
    cmp.expect_parameter(ParameterFixture::new(property, type_), |row| {
        fields.push(row.as_inferred_field()?.omit_empty());
        Ok(())
    })
}
