//! One generation run.
//!
//! Translators run strictly in registration order against a fresh builder.
//! The first error of any kind ends the run; a partial model is never
//! returned.
use crate::compare::Comparator;
use crate::error::GenError;
use crate::ir::Model;
use crate::registry::Registry;
use crate::schema::SchemaBuilder;
use crate::source::ElementSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Fail when a page has elements no translator step described.
    pub strict: bool,
}

pub fn run(
    registry: &Registry,
    source: &mut dyn ElementSource,
    options: RunOptions,
) -> Result<Model, GenError> {
    let mut builder = SchemaBuilder::new();
    for translator in registry.translators() {
        let elements = source.load(translator.url())?;
        log::info!("{}: {} element(s) from {}", translator.name(), elements.len(), translator.url());
        let mut cmp = Comparator::new(translator.url(), elements);
        builder.enter_source(translator.url());
        translator.run(&mut cmp, &mut builder)?;
        cmp.finish(options.strict)?;
    }
    let model = builder.finish()?;
    log::info!("model complete: {} type(s), {} deferred group(s)", model.types.len(), model.deferred.len());
    Ok(model)
}
