//! Schema builder.
//!
//! Accumulates named types while translators run. Structural mistakes
//! (duplicate names, variants, fields) are rejected at the offending call;
//! reference resolution waits for [`SchemaBuilder::finish`] because forward
//! references are the norm.
//!
//! Types are addressed through opaque handles returned by the `declare_*`
//! calls. A builder is created per run and owns everything it accumulates.
pub mod field;

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use indexmap::IndexMap;

use crate::error::BuildError;
use crate::ir::{self, Field, Model};

pub use field::interpret_type_column;

// ————————————————————————————————————————————————————————————————————————————
// HANDLES
// ————————————————————————————————————————————————————————————————————————————

/// Something fields can be added to: a concrete object, the shared fields of
/// an adaptive object, or an embedded variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    builder: u64,
    slot: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Decl(usize),
    Variant(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdaptiveId {
    builder: u64,
    index: usize,
}

impl From<AdaptiveId> for ObjectId {
    fn from(id: AdaptiveId) -> Self {
        ObjectId { builder: id.builder, slot: Slot::Decl(id.index) }
    }
}

// Handles carry the id of the builder that issued them.
static NEXT_BUILDER: AtomicU64 = AtomicU64::new(0);

/// Where a declaration was made: the translator call site, plus the page
/// being read at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub source: Option<String>,
    pub location: &'static Location<'static>,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} while reading {source}", self.location),
            None => write!(f, "{}", self.location),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCUMULATED STATE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub(crate) struct FieldSet {
    pub(crate) fields: Vec<(Field, Site)>,
}

#[derive(Debug)]
pub(crate) struct ConcreteDecl {
    pub(crate) name: String,
    pub(crate) comment: Option<String>,
    pub(crate) fields: FieldSet,
    pub(crate) site: Site,
}

#[derive(Debug)]
pub(crate) enum PayloadDecl {
    Fields(ConcreteDecl),
    Empty,
    Ref(String),
}

#[derive(Debug)]
pub(crate) struct VariantDecl {
    pub(crate) tag: String,
    pub(crate) description: Option<String>,
    pub(crate) payload: PayloadDecl,
    pub(crate) site: Site,
}

#[derive(Debug)]
pub(crate) struct AdaptiveDecl {
    pub(crate) name: String,
    pub(crate) discriminator: String,
    pub(crate) comment: Option<String>,
    pub(crate) fields: FieldSet,
    pub(crate) variants: Vec<VariantDecl>,
    pub(crate) site: Site,
}

#[derive(Debug)]
pub(crate) enum Decl {
    Concrete(ConcreteDecl),
    Adaptive(AdaptiveDecl),
}

#[derive(Debug)]
pub(crate) struct DeferredDecl {
    pub(crate) owner: Option<String>,
    pub(crate) note: String,
    pub(crate) fields: Vec<Field>,
    pub(crate) site: Site,
}

#[derive(Debug)]
pub struct SchemaBuilder {
    id: u64,
    decls: IndexMap<String, Decl>,
    deferred: Vec<DeferredDecl>,
    source: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            id: NEXT_BUILDER.fetch_add(1, Ordering::Relaxed),
            decls: IndexMap::new(),
            deferred: Vec::new(),
            source: None,
        }
    }

    /// Page currently being read; recorded on every declaration site.
    pub fn enter_source(&mut self, url: impl Into<String>) {
        self.source = Some(url.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    #[track_caller]
    pub fn declare_concrete_object(
        &mut self,
        name: &str,
        comment: Option<&str>,
    ) -> Result<ObjectId, BuildError> {
        let site = self.site();
        self.ensure_free(name, &site)?;
        let decl = ConcreteDecl {
            name: name.to_owned(),
            comment: comment.map(str::to_owned),
            fields: FieldSet::default(),
            site,
        };
        let (index, _) = self.decls.insert_full(name.to_owned(), Decl::Concrete(decl));
        log::debug!("declared concrete object `{name}`");
        Ok(ObjectId { builder: self.id, slot: Slot::Decl(index) })
    }

    #[track_caller]
    pub fn declare_adaptive_object(
        &mut self,
        name: &str,
        discriminator: &str,
        comment: Option<&str>,
    ) -> Result<AdaptiveId, BuildError> {
        let site = self.site();
        self.ensure_free(name, &site)?;
        if discriminator.is_empty() {
            return Err(BuildError::EmptyFieldName { object: name.to_owned(), site });
        }
        let decl = AdaptiveDecl {
            name: name.to_owned(),
            discriminator: discriminator.to_owned(),
            comment: comment.map(str::to_owned),
            fields: FieldSet::default(),
            variants: Vec::new(),
            site,
        };
        let (index, _) = self.decls.insert_full(name.to_owned(), Decl::Adaptive(decl));
        log::debug!("declared adaptive object `{name}` keyed by `{discriminator}`");
        Ok(AdaptiveId { builder: self.id, index })
    }

    /// Variant carrying its own (initially empty) field list.
    #[track_caller]
    pub fn add_variant(
        &mut self,
        adaptive: AdaptiveId,
        tag: &str,
        description: Option<&str>,
    ) -> Result<ObjectId, BuildError> {
        let site = self.site();
        let decl = self.adaptive_decl(adaptive, &site)?;
        let name = ir::variant_type_name(decl.name.as_str(), tag);
        // A repeated or empty tag is reported as such by `push_variant`.
        if !tag.is_empty() && !decl.variants.iter().any(|v| v.tag == tag) {
            self.ensure_free(&name, &site)?;
        }
        let payload = PayloadDecl::Fields(ConcreteDecl {
            name,
            comment: None,
            fields: FieldSet::default(),
            site: site.clone(),
        });
        let index = self.push_variant(adaptive, tag, description.map(str::to_owned), payload, site)?;
        Ok(ObjectId { builder: self.id, slot: Slot::Variant(adaptive.index, index) })
    }

    /// Tag-only variant (e.g. `divider`).
    #[track_caller]
    pub fn add_empty_variant(
        &mut self,
        adaptive: AdaptiveId,
        tag: &str,
        description: Option<&str>,
    ) -> Result<(), BuildError> {
        let site = self.site();
        self.push_variant(adaptive, tag, description.map(str::to_owned), PayloadDecl::Empty, site)?;
        Ok(())
    }

    /// Variant reusing a shape declared elsewhere, possibly later.
    #[track_caller]
    pub fn add_ref_variant(
        &mut self,
        adaptive: AdaptiveId,
        tag: &str,
        description: Option<&str>,
        type_name: &str,
    ) -> Result<(), BuildError> {
        let site = self.site();
        let payload = PayloadDecl::Ref(type_name.to_owned());
        self.push_variant(adaptive, tag, description.map(str::to_owned), payload, site)?;
        Ok(())
    }

    /// Append fields in call order. Either every field is added or none is.
    #[track_caller]
    pub fn add_fields<I>(&mut self, target: impl Into<ObjectId>, fields: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Field>,
    {
        let site = self.site();
        let target = target.into();
        let fields: Vec<Field> = fields.into_iter().collect();

        let (object, set, reserved) = self.field_set(target, &site)?;
        let mut seen: Vec<(String, Site)> = set
            .fields
            .iter()
            .map(|(f, s)| (f.name().to_ascii_lowercase(), s.clone()))
            .collect();

        for field in &fields {
            let key = field.name().to_ascii_lowercase();
            if key.is_empty() && !matches!(field, Field::Catchall(_)) {
                return Err(BuildError::EmptyFieldName { object, site });
            }
            if reserved.iter().any(|r| r.eq_ignore_ascii_case(&key)) {
                return Err(BuildError::DiscriminatorConflict {
                    object,
                    field: field.name().to_owned(),
                    site,
                });
            }
            if let Some((_, first)) = seen.iter().find(|(k, _)| *k == key) {
                return Err(BuildError::DuplicateField {
                    object,
                    field: field.name().to_owned(),
                    first: first.clone(),
                    second: site,
                });
            }
            seen.push((key, site.clone()));
        }

        let set = self.field_set_mut(target);
        set.fields.extend(fields.into_iter().map(|f| (f, site.clone())));
        Ok(())
    }

    /// Record fields that were parsed from the documentation but are not
    /// attached to any object yet. They are carried into the model as-is.
    #[track_caller]
    pub fn defer_fields<I>(
        &mut self,
        owner: Option<ObjectId>,
        note: &str,
        fields: I,
    ) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Field>,
    {
        let site = self.site();
        let owner = match owner {
            Some(id) => Some(self.field_set(id, &site)?.0),
            None => None,
        };
        let fields: Vec<Field> = fields.into_iter().collect();
        log::debug!("deferred {} field(s) for {owner:?}: {note}", fields.len());
        self.deferred.push(DeferredDecl { owner, note: note.to_owned(), fields, site });
        Ok(())
    }

    /// Resolve references and hand over the finished model.
    pub fn finish(self) -> Result<Model, BuildError> {
        crate::lower::lower_to_model(&self.decls, &self.deferred)
    }

    // —— internals ——————————————————————————————————————————————————————————

    #[track_caller]
    fn site(&self) -> Site {
        Site { source: self.source.clone(), location: Location::caller() }
    }

    /// `name` is neither declared nor the derived name of an embedded variant.
    fn ensure_free(&self, name: &str, site: &Site) -> Result<(), BuildError> {
        let declared = self.decls.get(name).map(|decl| match decl {
            Decl::Concrete(d) => &d.site,
            Decl::Adaptive(d) => &d.site,
        });
        let Some(existing) = declared.or_else(|| self.embedded_site(name)) else {
            return Ok(());
        };
        Err(BuildError::DuplicateName {
            name: name.to_owned(),
            first: existing.clone(),
            second: site.clone(),
        })
    }

    fn embedded_site(&self, name: &str) -> Option<&Site> {
        self.decls
            .values()
            .filter_map(|decl| match decl {
                Decl::Adaptive(d) => Some(d),
                Decl::Concrete(_) => None,
            })
            .flat_map(|d| &d.variants)
            .find(|v| matches!(&v.payload, PayloadDecl::Fields(object) if object.name == name))
            .map(|v| &v.site)
    }

    fn adaptive_decl(&self, id: AdaptiveId, site: &Site) -> Result<&AdaptiveDecl, BuildError> {
        if id.builder != self.id {
            return Err(BuildError::UnknownHandle { site: site.clone() });
        }
        match self.decls.get_index(id.index) {
            Some((_, Decl::Adaptive(decl))) => Ok(decl),
            _ => Err(BuildError::UnknownHandle { site: site.clone() }),
        }
    }

    fn push_variant(
        &mut self,
        adaptive: AdaptiveId,
        tag: &str,
        description: Option<String>,
        payload: PayloadDecl,
        site: Site,
    ) -> Result<usize, BuildError> {
        if adaptive.builder != self.id {
            return Err(BuildError::UnknownHandle { site });
        }
        let Some((_, Decl::Adaptive(decl))) = self.decls.get_index_mut(adaptive.index) else {
            return Err(BuildError::UnknownHandle { site });
        };
        if tag.is_empty() {
            return Err(BuildError::EmptyTag { adaptive: decl.name.clone(), site });
        }
        if let Some(first) = decl.variants.iter().find(|v| v.tag == tag) {
            return Err(BuildError::DuplicateVariant {
                adaptive: decl.name.clone(),
                tag: tag.to_owned(),
                first: first.site.clone(),
                second: site,
            });
        }
        // The payload travels under a wire key named after the tag.
        let clashes = tag.eq_ignore_ascii_case(&decl.discriminator)
            || decl.fields.fields.iter().any(|(f, _)| f.name().eq_ignore_ascii_case(tag));
        if clashes {
            return Err(BuildError::DiscriminatorConflict {
                object: decl.name.clone(),
                field: tag.to_owned(),
                site,
            });
        }
        log::debug!("`{}`: variant {tag:?}", decl.name);
        decl.variants.push(VariantDecl {
            tag: tag.to_owned(),
            description,
            payload,
            site,
        });
        Ok(decl.variants.len() - 1)
    }

    /// Owner name, field set and the wire keys fields may not use.
    fn field_set(&self, id: ObjectId, site: &Site) -> Result<(String, &FieldSet, Vec<String>), BuildError> {
        let unknown = || BuildError::UnknownHandle { site: site.clone() };
        if id.builder != self.id {
            return Err(unknown());
        }
        match id.slot {
            Slot::Decl(index) => match self.decls.get_index(index).ok_or_else(unknown)?.1 {
                Decl::Concrete(decl) => Ok((decl.name.clone(), &decl.fields, Vec::new())),
                Decl::Adaptive(decl) => {
                    let mut reserved = vec![decl.discriminator.clone()];
                    reserved.extend(decl.variants.iter().map(|v| v.tag.clone()));
                    Ok((decl.name.clone(), &decl.fields, reserved))
                }
            },
            Slot::Variant(index, variant) => match self.decls.get_index(index).ok_or_else(unknown)?.1 {
                Decl::Adaptive(decl) => match decl.variants.get(variant).map(|v| &v.payload) {
                    Some(PayloadDecl::Fields(object)) => {
                        Ok((object.name.clone(), &object.fields, Vec::new()))
                    }
                    _ => Err(unknown()),
                },
                Decl::Concrete(_) => Err(unknown()),
            },
        }
    }

    // Only reached after `field_set` validated the handle.
    fn field_set_mut(&mut self, id: ObjectId) -> &mut FieldSet {
        let (index, variant) = match id.slot {
            Slot::Decl(index) => (index, None),
            Slot::Variant(index, variant) => (index, Some(variant)),
        };
        match (&mut self.decls[index], variant) {
            (Decl::Concrete(decl), _) => &mut decl.fields,
            (Decl::Adaptive(decl), None) => &mut decl.fields,
            (Decl::Adaptive(decl), Some(variant)) => match &mut decl.variants[variant].payload {
                PayloadDecl::Fields(object) => &mut object.fields,
                PayloadDecl::Empty | PayloadDecl::Ref(_) => {
                    unreachable!("variant handles only point at embedded objects")
                }
            },
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{TypeRef, VariantPayload};
    use pretty_assertions::assert_eq;

    #[test]
    fn fields_keep_call_order() {
        let mut b = SchemaBuilder::new();
        let user = b.declare_concrete_object("User", None).unwrap();
        b.add_fields(user, [Field::fixed("object", "user"), Field::new("id", TypeRef::UUID)]).unwrap();
        b.add_fields(user, [Field::new("name", TypeRef::STRING).omit_empty()]).unwrap();
        let model = b.finish().unwrap();
        let names: Vec<_> = model.concrete("User").unwrap().fields.iter().map(|f| f.name().to_owned()).collect();
        assert_eq!(names, ["object", "id", "name"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut b = SchemaBuilder::new();
        b.enter_source("https://developers.notion.com/reference/user");
        b.declare_concrete_object("User", None).unwrap();
        let err = b.declare_adaptive_object("User", "type", None).unwrap_err();
        let BuildError::DuplicateName { name, first, second } = &err else { panic!("{err:?}") };
        assert_eq!(name, "User");
        assert_ne!(first.location.line(), second.location.line());
        assert_eq!(second.source.as_deref(), Some("https://developers.notion.com/reference/user"));
    }

    #[test]
    fn duplicate_field_leaves_the_object_unchanged() {
        let mut b = SchemaBuilder::new();
        let obj = b.declare_concrete_object("Page", None).unwrap();
        b.add_fields(obj, [Field::new("archived", TypeRef::BOOLEAN)]).unwrap();
        let err = b
            .add_fields(obj, [Field::new("url", TypeRef::STRING), Field::new("Archived", TypeRef::BOOLEAN)])
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateField { ref field, .. } if field == "Archived"));
        let model = b.finish().unwrap();
        assert_eq!(model.concrete("Page").unwrap().fields, vec![Field::new("archived", TypeRef::BOOLEAN)]);
    }

    #[test]
    fn duplicates_within_one_batch_are_rejected() {
        let mut b = SchemaBuilder::new();
        let obj = b.declare_concrete_object("Page", None).unwrap();
        let err = b
            .add_fields(obj, [Field::new("id", TypeRef::UUID), Field::new("id", TypeRef::STRING)])
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateField { .. }));
    }

    #[test]
    fn duplicate_variant_keeps_the_first() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        let paragraph = b.add_variant(block, "paragraph", Some("first")).unwrap();
        b.add_fields(paragraph, [Field::new("color", TypeRef::STRING)]).unwrap();
        let err = b.add_empty_variant(block, "paragraph", Some("second")).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateVariant { ref tag, .. } if tag == "paragraph"));

        let model = b.finish().unwrap();
        let variant = &model.adaptive("Block").unwrap().variants["paragraph"];
        assert_eq!(variant.description.as_deref(), Some("first"));
        let VariantPayload::Fields(object) = &variant.payload else { panic!("{variant:?}") };
        assert_eq!(object.name, "BlockParagraph");
        assert_eq!(object.fields.len(), 1);
    }

    #[test]
    fn discriminator_cannot_be_redeclared() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        let err = b.add_fields(block, [Field::new("type", TypeRef::STRING)]).unwrap_err();
        assert!(matches!(err, BuildError::DiscriminatorConflict { .. }));

        b.add_fields(block, [Field::new("archived", TypeRef::BOOLEAN)]).unwrap();
        let err = b.add_empty_variant(block, "archived", None).unwrap_err();
        assert!(matches!(err, BuildError::DiscriminatorConflict { .. }));
        b.add_empty_variant(block, "divider", None).unwrap();
        let err = b.add_fields(block, [Field::new("divider", TypeRef::JSON)]).unwrap_err();
        assert!(matches!(err, BuildError::DiscriminatorConflict { .. }));
    }

    #[test]
    fn empty_names_and_tags() {
        let mut b = SchemaBuilder::new();
        let obj = b.declare_concrete_object("Properties", None).unwrap();
        let err = b.add_fields(obj, [Field::new("", TypeRef::STRING)]).unwrap_err();
        assert!(matches!(err, BuildError::EmptyFieldName { .. }));
        b.add_fields(obj, [Field::catchall(TypeRef::named("PropertyValue"))]).unwrap();

        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        assert!(matches!(b.add_empty_variant(block, "", None), Err(BuildError::EmptyTag { .. })));
    }

    #[test]
    fn handles_from_another_builder_are_rejected() {
        let mut other = SchemaBuilder::new();
        let foreign = other.declare_concrete_object("Other", None).unwrap();
        let foreign_block = other.declare_adaptive_object("OtherBlock", "type", None).unwrap();

        // Same indexes, different builder.
        let mut b = SchemaBuilder::new();
        b.declare_concrete_object("Mine", None).unwrap();
        b.declare_adaptive_object("Block", "type", None).unwrap();

        let err = b.add_fields(foreign, [Field::new("x", TypeRef::STRING)]).unwrap_err();
        assert!(matches!(err, BuildError::UnknownHandle { .. }));
        let err = b.add_fields(foreign_block, [Field::new("x", TypeRef::STRING)]).unwrap_err();
        assert!(matches!(err, BuildError::UnknownHandle { .. }));
        assert!(matches!(b.add_variant(foreign_block, "paragraph", None), Err(BuildError::UnknownHandle { .. })));
        assert!(matches!(b.add_empty_variant(foreign_block, "divider", None), Err(BuildError::UnknownHandle { .. })));
        assert!(matches!(b.defer_fields(Some(foreign), "note", Vec::<Field>::new()), Err(BuildError::UnknownHandle { .. })));

        let model = b.finish().unwrap();
        assert!(model.concrete("Mine").unwrap().fields.is_empty());
        assert!(model.adaptive("Block").unwrap().variants.is_empty());
    }

    #[test]
    fn derived_variant_names_are_reserved_at_the_declaring_call() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        b.add_variant(block, "paragraph", None).unwrap();
        let err = b.declare_concrete_object("BlockParagraph", None).unwrap_err();
        let BuildError::DuplicateName { name, first, second } = &err else { panic!("{err:?}") };
        assert_eq!(name, "BlockParagraph");
        assert_ne!(first.location.line(), second.location.line());

        b.declare_concrete_object("BlockQuote", None).unwrap();
        let err = b.add_variant(block, "quote", None).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { ref name, .. } if name == "BlockQuote"));
        assert!(b.finish().unwrap().adaptive("Block").unwrap().variants.get("quote").is_none());
    }

    #[test]
    fn deferred_fields_stay_unattached() {
        let mut b = SchemaBuilder::new();
        let text = b.declare_concrete_object("RichText", None).unwrap();
        b.defer_fields(Some(text), "annotations are not modelled yet", [Field::new("bold", TypeRef::BOOLEAN)])
            .unwrap();
        let model = b.finish().unwrap();
        assert!(model.concrete("RichText").unwrap().fields.is_empty());
        assert_eq!(model.deferred.len(), 1);
        assert_eq!(model.deferred[0].owner.as_deref(), Some("RichText"));
    }
}
