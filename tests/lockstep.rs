use docs_lockstep::compare::Comparator;
use docs_lockstep::element::{DocElement, ExpectedElement};
use docs_lockstep::error::{BuildError, Drift, GenError};
use docs_lockstep::generate::{run, RunOptions};
use docs_lockstep::registry::{Registry, Translator};
use docs_lockstep::schema::{AdaptiveId, SchemaBuilder};
use docs_lockstep::ir::VariantPayload;
use docs_lockstep::source::FixtureSource;

const URL: &str = "https://developers.notion.com/reference/block";

fn breadcrumb_page() -> Vec<DocElement> {
    vec![
        DocElement::heading(2, "Breadcrumb"),
        DocElement::paragraph("Breadcrumb block objects do not contain any information within the breadcrumb property."),
        DocElement::code(Some("json"), r#"{"type":"breadcrumb","breadcrumb":{}}"#),
    ]
}

fn declare_block(_: &mut Comparator, b: &mut SchemaBuilder) -> Result<AdaptiveId, GenError> {
    Ok(b.declare_adaptive_object("Block", "type", None)?)
}

fn breadcrumb(cmp: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    cmp.expect(ExpectedElement::heading("Breadcrumb"))?;
    cmp.expect(ExpectedElement::paragraph_starting("Breadcrumb block objects do not contain any information"))?;
    cmp.expect(ExpectedElement::any_code())?;
    b.add_empty_variant(*block, "breadcrumb", None)?;
    Ok(())
}

fn breadcrumb_again(_: &mut Comparator, b: &mut SchemaBuilder, block: &AdaptiveId) -> Result<(), GenError> {
    b.add_empty_variant(*block, "breadcrumb", None)?;
    Ok(())
}

fn registry(steps: &[docs_lockstep::registry::Step<AdaptiveId>]) -> Registry {
    let mut translator = Translator::new("block", URL, declare_block);
    for step in steps {
        translator = translator.step(*step);
    }
    let mut registry = Registry::new();
    registry.register(translator);
    registry
}

fn source(elements: Vec<DocElement>) -> FixtureSource {
    let mut source = FixtureSource::new();
    source.insert(URL, elements).unwrap();
    source
}

#[test]
fn three_element_breadcrumb_page() {
    let model = run(&registry(&[breadcrumb]), &mut source(breadcrumb_page()), RunOptions::default()).unwrap();
    let block = model.adaptive("Block").unwrap();
    assert_eq!(block.variants.len(), 1);
    assert_eq!(block.variants["breadcrumb"].payload, VariantPayload::Empty);
}

#[test]
fn trailing_elements_only_fail_in_strict_mode() {
    let mut page = breadcrumb_page();
    page.push(DocElement::heading(2, "Column list and column"));

    run(&registry(&[breadcrumb]), &mut source(page.clone()), RunOptions { strict: false }).unwrap();

    let err = run(&registry(&[breadcrumb]), &mut source(page), RunOptions { strict: true }).unwrap_err();
    let GenError::Compare(err) = &err else { panic!("{err:?}") };
    assert_eq!(err.position, 3);
    assert!(matches!(err.drift, Drift::TrailingElements { count: 1, .. }), "{err}");
}

#[test]
fn duplicate_tag_names_both_sites() {
    let err = run(
        &registry(&[breadcrumb, breadcrumb_again]),
        &mut source(breadcrumb_page()),
        RunOptions::default(),
    )
    .unwrap_err();
    let GenError::Build(BuildError::DuplicateVariant { tag, first, second, .. }) = &err else {
        panic!("{err:?}")
    };
    assert_eq!(tag, "breadcrumb");
    assert_ne!(first, second);
    assert_eq!(first.source.as_deref(), Some(URL));
}

#[test]
fn paragraph_drift_stops_before_the_builder_is_touched() {
    let mut page = breadcrumb_page();
    page[1] = DocElement::paragraph("Breadcrumbs are gone.");
    let err = run(&registry(&[breadcrumb]), &mut source(page), RunOptions::default()).unwrap_err();
    let GenError::Compare(err) = &err else { panic!("{err:?}") };
    assert_eq!((err.url.as_str(), err.position), (URL, 1));
}
