//! Reference renderer: `ir::Model` → Rust type definitions.
//!
//! Output depends only on the model, so equal models render to equal text.
use std::fmt::Write as _;

use crate::ir::{
    AdaptiveObject, ConcreteObject, Field, Model, Primitive, TypeDef, TypeRef, VariantPayload,
    pascal_case,
};

const DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "gen",
];

#[derive(Default)]
pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, model: &Model) {
        self.out.push_str("// Generated by docs-lockstep. Do not edit by hand.\n\n");
        self.out.push_str("use serde::{Deserialize, Serialize};\n");
        for def in model.types.values() {
            match def {
                TypeDef::Concrete(object) => self.emit_struct(object),
                TypeDef::Adaptive(adaptive) => self.emit_adaptive(adaptive),
            }
        }
        for group in &model.deferred {
            self.out.push('\n');
            let owner = group.owner.as_deref().unwrap_or("no owner");
            let _ = writeln!(self.out, "// Unattached fields ({owner}): {}", group.note);
            for field in &group.fields {
                let ty = field.ty().map(rust_type).unwrap_or_else(|| "String".to_owned());
                let _ = writeln!(self.out, "//   {}: {ty}", field.name());
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn emit_struct(&mut self, object: &ConcreteObject) {
        self.out.push('\n');
        self.doc(object.comment.as_deref(), "");
        let _ = writeln!(self.out, "{DERIVES}\npub struct {} {{", object.name);
        for field in &object.fields {
            self.emit_field(field);
        }
        self.out.push_str("}\n");
        self.emit_constants(&object.name, &object.fields);
    }

    fn emit_adaptive(&mut self, adaptive: &AdaptiveObject) {
        let data = format!("{}Variant", adaptive.name);

        self.out.push('\n');
        self.doc(adaptive.comment.as_deref(), "");
        let _ = writeln!(self.out, "{DERIVES}\npub struct {} {{", adaptive.name);
        self.emit_field(&Field::new(adaptive.discriminator.as_str(), TypeRef::STRING));
        for field in &adaptive.fields {
            self.emit_field(field);
        }
        let _ = writeln!(self.out, "    #[serde(flatten)]\n    pub variant: {data},\n}}");
        self.emit_constants(&adaptive.name, &adaptive.fields);

        self.out.push('\n');
        let _ = writeln!(self.out, "{DERIVES}\npub enum {data} {{");
        for (tag, variant) in &adaptive.variants {
            self.doc(variant.description.as_deref(), "    ");
            let _ = writeln!(self.out, "    #[serde(rename = {tag:?})]");
            let name = pascal_case(tag);
            match &variant.payload {
                VariantPayload::Fields(object) => {
                    let _ = writeln!(self.out, "    {name}({}),", object.name);
                }
                VariantPayload::Ref(target) => {
                    let _ = writeln!(self.out, "    {name}({target}),");
                }
                VariantPayload::Empty => {
                    let _ = writeln!(self.out, "    {name} {{}},");
                }
            }
        }
        self.out.push_str("}\n");

        for variant in adaptive.variants.values() {
            if let VariantPayload::Fields(object) = &variant.payload {
                self.emit_struct(object);
            }
        }
    }

    fn emit_field(&mut self, field: &Field) {
        self.doc(field.comment(), "    ");
        match field {
            Field::Variable(f) => {
                if f.flags.interface {
                    let targets: Vec<_> = f.ty.named_refs().iter().map(|n| format!("`{n}`")).collect();
                    let _ = writeln!(self.out, "    /// Holds any variant of {}.", targets.join(", "));
                }
                let ident = field_ident(&f.name);
                let mut ty = rust_type(&f.ty);
                let mut attrs = Vec::new();
                if ident.trim_start_matches("r#") != f.name {
                    attrs.push(format!("rename = {:?}", f.name));
                }
                if f.flags.omit_empty {
                    let skip = match &f.ty {
                        TypeRef::Array(_) => "Vec::is_empty",
                        TypeRef::Map(_) => "std::collections::BTreeMap::is_empty",
                        TypeRef::Nullable(_) => "Option::is_none",
                        _ => {
                            ty = format!("Option<{ty}>");
                            "Option::is_none"
                        }
                    };
                    attrs.push(format!("default, skip_serializing_if = {skip:?}"));
                }
                if !attrs.is_empty() {
                    let _ = writeln!(self.out, "    #[serde({})]", attrs.join(", "));
                }
                let _ = writeln!(self.out, "    pub {ident}: {ty},");
            }
            Field::Fixed(f) => {
                let ident = field_ident(&f.name);
                let _ = writeln!(self.out, "    /// Always `{:?}`.", f.value);
                if ident.trim_start_matches("r#") != f.name {
                    let _ = writeln!(self.out, "    #[serde(rename = {:?})]", f.name);
                }
                let _ = writeln!(self.out, "    pub {ident}: String,");
            }
            Field::Catchall(f) => {
                let _ = writeln!(
                    self.out,
                    "    #[serde(flatten)]\n    pub rest: std::collections::BTreeMap<String, {}>,",
                    rust_type(&f.value)
                );
            }
        }
    }

    fn emit_constants(&mut self, owner: &str, fields: &[Field]) {
        let fixed: Vec<_> = fields
            .iter()
            .filter_map(|f| match f {
                Field::Fixed(f) => Some(f),
                _ => None,
            })
            .collect();
        if fixed.is_empty() {
            return;
        }
        let _ = writeln!(self.out, "\nimpl {owner} {{");
        for f in fixed {
            let _ = writeln!(
                self.out,
                "    pub const {}: &'static str = {:?};",
                const_ident(&f.name),
                f.value
            );
        }
        self.out.push_str("}\n");
    }

    fn doc(&mut self, text: Option<&str>, indent: &str) {
        let Some(text) = text else { return };
        for line in text.lines() {
            let _ = writeln!(self.out, "{indent}/// {}", line.trim_end());
        }
    }
}

pub fn rust_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(p) => match p {
            Primitive::String | Primitive::Uuid | Primitive::DateTime => "String".to_owned(),
            Primitive::Boolean => "bool".to_owned(),
            Primitive::Integer => "i64".to_owned(),
            Primitive::Number => "f64".to_owned(),
            Primitive::Json => "serde_json::Value".to_owned(),
        },
        TypeRef::Named(name) => name.clone(),
        TypeRef::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        TypeRef::Nullable(inner) => format!("Option<{}>", rust_type(inner)),
        TypeRef::Map(inner) => format!("std::collections::BTreeMap<String, {}>", rust_type(inner)),
    }
}

fn field_ident(wire: &str) -> String {
    let mut ident: String = wire
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

fn const_ident(wire: &str) -> String {
    field_ident(wire).trim_start_matches("r#").to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;

    fn render(model: &Model) -> String {
        let mut cg = Codegen::new();
        cg.emit(model);
        cg.into_string()
    }

    #[test]
    fn adaptive_objects_render_as_flattened_enums() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", Some("A block.")).unwrap();
        b.add_fields(block, [Field::fixed("object", "block"), Field::new("archived", TypeRef::BOOLEAN)]).unwrap();
        b.add_empty_variant(block, "breadcrumb", None).unwrap();
        b.add_ref_variant(block, "heading_1", None, "BlockHeading").unwrap();
        let heading = b.declare_concrete_object("BlockHeading", None).unwrap();
        b.add_fields(heading, [Field::new("color", TypeRef::STRING).omit_empty()]).unwrap();
        let src = render(&b.finish().unwrap());

        assert!(src.contains("pub struct Block {"), "{src}");
        assert!(src.contains("    pub r#type: String,"), "{src}");
        assert!(src.contains("pub const OBJECT: &'static str = \"block\";"), "{src}");
        assert!(src.contains("    #[serde(flatten)]\n    pub variant: BlockVariant,"), "{src}");
        assert!(src.contains("    Breadcrumb {},"), "{src}");
        assert!(src.contains("    Heading1(BlockHeading),"), "{src}");
        assert!(src.contains("pub color: Option<String>,"), "{src}");
    }

    #[test]
    fn field_identifiers() {
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("heading_1"), "heading_1");
        assert_eq!(field_ident("last-edited"), "last_edited");
        assert_eq!(rust_type(&TypeRef::named("RichText").array_of().nullable()), "Option<Vec<RichText>>");
        assert_eq!(const_ident("last-edited"), "LAST_EDITED");
        assert_eq!(const_ident("type"), "TYPE");
        assert_eq!(const_ident("1st"), "_1ST");
    }

    #[test]
    fn fixed_wire_keys_become_valid_consts() {
        let mut b = SchemaBuilder::new();
        let page = b.declare_concrete_object("Page", None).unwrap();
        b.add_fields(page, [Field::fixed("last-edited", "never"), Field::fixed("type", "page")]).unwrap();
        let src = render(&b.finish().unwrap());
        assert!(src.contains("pub const LAST_EDITED: &'static str = \"never\";"), "{src}");
        assert!(src.contains("pub const TYPE: &'static str = \"page\";"), "{src}");
        assert!(src.contains("    #[serde(rename = \"last-edited\")]\n    pub last_edited: String,"), "{src}");
    }

    #[test]
    fn interface_fields_are_documented() {
        let mut b = SchemaBuilder::new();
        let block = b.declare_adaptive_object("Block", "type", None).unwrap();
        let paragraph = b.add_variant(block, "paragraph", None).unwrap();
        b.add_fields(paragraph, [Field::new("children", TypeRef::named("Block").array_of()).interface()]).unwrap();
        let src = render(&b.finish().unwrap());
        assert!(src.contains("    /// Holds any variant of `Block`.\n    pub children: Vec<Block>,"), "{src}");
    }
}
