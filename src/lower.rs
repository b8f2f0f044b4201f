//! Finalize boundary: builder state → `ir::Model`.
//!
//! This is the one place reference resolution happens. Nothing reaches the
//! renderer unless every named type resolves and every variant has a shape.
use std::collections::HashMap;
use indexmap::IndexMap;

use crate::error::BuildError;
use crate::ir::{
    AdaptiveObject, ConcreteObject, DeferredFields, Model, TypeDef, Variant, VariantPayload,
};
use crate::schema::{ConcreteDecl, Decl, DeferredDecl, FieldSet, PayloadDecl, Site};

/// What a type name resolves to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Concrete,
    Adaptive,
}

pub(crate) fn lower_to_model(
    decls: &IndexMap<String, Decl>,
    deferred: &[DeferredDecl],
) -> Result<Model, BuildError> {
    let namespace = build_namespace(decls)?;

    // 1) every named reference in every field set
    for decl in decls.values() {
        match decl {
            Decl::Concrete(object) => check_fields(&namespace, &object.name, &object.fields)?,
            Decl::Adaptive(adaptive) => {
                check_fields(&namespace, &adaptive.name, &adaptive.fields)?;
                for variant in &adaptive.variants {
                    match &variant.payload {
                        PayloadDecl::Fields(object) => {
                            check_fields(&namespace, &object.name, &object.fields)?
                        }
                        PayloadDecl::Empty => {}
                        // 2) shared shapes must be plain records
                        PayloadDecl::Ref(target) => {
                            if namespace.get(target.as_str()).map(|(shape, _)| *shape) != Some(Shape::Concrete) {
                                return Err(BuildError::UnresolvedTypeReference {
                                    name: target.clone(),
                                    referenced_by: format!("{}[{:?}]", adaptive.name, variant.tag),
                                    site: variant.site.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    // 3) assemble, preserving declaration order
    let types = decls
        .iter()
        .map(|(name, decl)| (name.clone(), lower_decl(decl)))
        .collect();
    let deferred = deferred
        .iter()
        .map(|d| {
            log::debug!("carrying {} unattached field(s) from {}: {}", d.fields.len(), d.site, d.note);
            DeferredFields {
                owner: d.owner.clone(),
                note: d.note.clone(),
                fields: d.fields.clone(),
            }
        })
        .collect();
    Ok(Model { types, deferred })
}

/// Declared names plus the derived names of embedded variant objects.
fn build_namespace(decls: &IndexMap<String, Decl>) -> Result<HashMap<&str, (Shape, &Site)>, BuildError> {
    let mut namespace: HashMap<&str, (Shape, &Site)> = HashMap::new();
    for (name, decl) in decls {
        let entry = match decl {
            Decl::Concrete(d) => (Shape::Concrete, &d.site),
            Decl::Adaptive(d) => (Shape::Adaptive, &d.site),
        };
        namespace.insert(name.as_str(), entry);
    }
    for decl in decls.values() {
        let Decl::Adaptive(adaptive) = decl else { continue };
        for variant in &adaptive.variants {
            let PayloadDecl::Fields(object) = &variant.payload else { continue };
            if let Some((_, first)) = namespace.get(object.name.as_str()) {
                return Err(BuildError::DuplicateName {
                    name: object.name.clone(),
                    first: (*first).clone(),
                    second: variant.site.clone(),
                });
            }
            namespace.insert(object.name.as_str(), (Shape::Concrete, &variant.site));
        }
    }
    Ok(namespace)
}

fn check_fields(
    namespace: &HashMap<&str, (Shape, &Site)>,
    owner: &str,
    set: &FieldSet,
) -> Result<(), BuildError> {
    for (field, site) in &set.fields {
        let Some(ty) = field.ty() else { continue };
        for name in ty.named_refs() {
            if !namespace.contains_key(name) {
                return Err(BuildError::UnresolvedTypeReference {
                    name: name.to_owned(),
                    referenced_by: format!("{owner}.{}", field.name()),
                    site: site.clone(),
                });
            }
        }
    }
    Ok(())
}

fn lower_decl(decl: &Decl) -> TypeDef {
    match decl {
        Decl::Concrete(object) => TypeDef::Concrete(lower_concrete(object)),
        Decl::Adaptive(adaptive) => TypeDef::Adaptive(AdaptiveObject {
            name: adaptive.name.clone(),
            discriminator: adaptive.discriminator.clone(),
            comment: adaptive.comment.clone(),
            fields: adaptive.fields.fields.iter().map(|(f, _)| f.clone()).collect(),
            variants: adaptive
                .variants
                .iter()
                .map(|v| {
                    let payload = match &v.payload {
                        PayloadDecl::Fields(object) => VariantPayload::Fields(lower_concrete(object)),
                        PayloadDecl::Empty => VariantPayload::Empty,
                        PayloadDecl::Ref(target) => VariantPayload::Ref(target.clone()),
                    };
                    (v.tag.clone(), Variant { description: v.description.clone(), payload })
                })
                .collect(),
        }),
    }
}

fn lower_concrete(object: &ConcreteDecl) -> ConcreteObject {
    ConcreteObject {
        name: object.name.clone(),
        comment: object.comment.clone(),
        fields: object.fields.fields.iter().map(|(f, _)| f.clone()).collect(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::Location;
    use crate::ir::{Field, TypeRef};
    use crate::schema::{AdaptiveDecl, SchemaBuilder, VariantDecl};

    #[test]
    fn forward_references_resolve() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        b.add_fields(block, [Field::new("parent", TypeRef::named("Parent"))]).unwrap();
        b.add_ref_variant(block, "heading_1", None, "BlockHeading").unwrap();
        b.declare_concrete_object("Parent", None).unwrap();
        b.declare_concrete_object("BlockHeading", None).unwrap();
        let model = b.finish().unwrap();
        let names: Vec<_> = model.types.keys().cloned().collect();
        assert_eq!(names, ["Block", "Parent", "BlockHeading"]);
    }

    #[test]
    fn unresolved_reference_names_the_field() {
        let mut b = SchemaBuilder::new();
        let paragraph = b.declare_concrete_object("Paragraph", None).unwrap();
        b.add_fields(paragraph, [Field::new("rich_text", TypeRef::named("RichText").array_of())]).unwrap();
        let err = b.finish().unwrap_err();
        let BuildError::UnresolvedTypeReference { name, referenced_by, .. } = &err else { panic!("{err:?}") };
        assert_eq!(name, "RichText");
        assert_eq!(referenced_by, "Paragraph.rich_text");
    }

    #[test]
    fn ref_variants_need_a_concrete_target() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        b.add_ref_variant(block, "child", None, "Block").unwrap();
        assert!(matches!(b.finish(), Err(BuildError::UnresolvedTypeReference { .. })));
    }

    #[test]
    fn derived_variant_names_may_not_shadow_declared_types() {
        // The builder refuses this at the declaring call; finalize re-checks.
        let site = Site { source: None, location: Location::caller() };
        let concrete = |name: &str| ConcreteDecl {
            name: name.to_owned(),
            comment: None,
            fields: FieldSet::default(),
            site: site.clone(),
        };
        let mut decls = IndexMap::new();
        decls.insert(
            "Block".to_owned(),
            Decl::Adaptive(AdaptiveDecl {
                name: "Block".into(),
                discriminator: "type".into(),
                comment: None,
                fields: FieldSet::default(),
                variants: vec![VariantDecl {
                    tag: "paragraph".into(),
                    description: None,
                    payload: PayloadDecl::Fields(concrete("BlockParagraph")),
                    site: site.clone(),
                }],
                site: site.clone(),
            }),
        );
        decls.insert("BlockParagraph".to_owned(), Decl::Concrete(concrete("BlockParagraph")));
        let err = lower_to_model(&decls, &[]).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { ref name, .. } if name == "BlockParagraph"), "{err:?}");
    }

    #[test]
    fn fields_may_reference_embedded_variants() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        b.add_variant(block, "paragraph", None).unwrap();
        let sync = b.declare_concrete_object("Preview", None).unwrap();
        b.add_fields(sync, [Field::new("paragraph", TypeRef::named("BlockParagraph"))]).unwrap();
        assert!(b.finish().is_ok());
    }
}
