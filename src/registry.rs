//! Translators and the registry that orders them.
//!
//! A translator describes one documentation page as an ordered list of
//! steps. The first step declares whatever types later steps extend and
//! returns their handles as a typed value `S`; every following step gets a
//! shared reference to it. Handles are passed, never captured.
use crate::compare::Comparator;
use crate::error::GenError;
use crate::schema::SchemaBuilder;

pub type InitStep<S> = fn(&mut Comparator, &mut SchemaBuilder) -> Result<S, GenError>;
pub type Step<S> = fn(&mut Comparator, &mut SchemaBuilder, &S) -> Result<(), GenError>;

/// Object-safe view of a translator, whatever its handle type.
pub trait Translate {
    fn name(&self) -> &str;
    fn url(&self) -> &str;
    fn run(&self, cmp: &mut Comparator, builder: &mut SchemaBuilder) -> Result<(), GenError>;
}

pub struct Translator<S> {
    name: String,
    url: String,
    init: InitStep<S>,
    steps: Vec<Step<S>>,
}

impl<S> Translator<S> {
    pub fn new(name: &str, url: &str, init: InitStep<S>) -> Self {
        Self { name: name.to_owned(), url: url.to_owned(), init, steps: Vec::new() }
    }

    pub fn step(mut self, step: Step<S>) -> Self {
        self.steps.push(step);
        self
    }
}

impl<S> Translate for Translator<S> {
    fn name(&self) -> &str {
        &self.name
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn run(&self, cmp: &mut Comparator, builder: &mut SchemaBuilder) -> Result<(), GenError> {
        let handles = (self.init)(cmp, builder)?;
        for (index, step) in self.steps.iter().enumerate() {
            log::debug!("{}: step {} of {} at element #{}", self.name, index + 1, self.steps.len(), cmp.position());
            step(cmp, builder, &handles)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct Registry {
    translators: Vec<Box<dyn Translate>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: 'static>(&mut self, translator: Translator<S>) -> &mut Self {
        self.translators.push(Box::new(translator));
        self
    }

    /// In registration order.
    pub fn translators(&self) -> impl Iterator<Item = &dyn Translate> {
        self.translators.iter().map(|t| &**t)
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }
    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{DocElement, ExpectedElement};
    use crate::ir::{Field, TypeRef};
    use crate::schema::ObjectId;

    fn declare(cmp: &mut Comparator, b: &mut SchemaBuilder) -> Result<ObjectId, GenError> {
        cmp.expect(ExpectedElement::heading("User"))?;
        Ok(b.declare_concrete_object("User", None)?)
    }

    fn extend(cmp: &mut Comparator, b: &mut SchemaBuilder, user: &ObjectId) -> Result<(), GenError> {
        cmp.expect(ExpectedElement::paragraph("Users have names."))?;
        b.add_fields(*user, [Field::new("name", TypeRef::STRING)])?;
        Ok(())
    }

    #[test]
    fn steps_share_handles_from_the_init_step() {
        let mut registry = Registry::new();
        registry.register(Translator::new("user", "https://example.test/user", declare).step(extend));
        assert_eq!(registry.len(), 1);

        let translator = registry.translators().next().unwrap();
        let mut cmp = Comparator::new(
            translator.url(),
            vec![DocElement::heading(1, "User"), DocElement::paragraph("Users have names.")],
        );
        let mut builder = SchemaBuilder::new();
        translator.run(&mut cmp, &mut builder).unwrap();
        let model = builder.finish().unwrap();
        assert_eq!(model.concrete("User").unwrap().fields.len(), 1);
    }
}
