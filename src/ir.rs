// Strongly-typed object model. This is the only thing the renderer sees.

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Boolean,
    Integer,
    Number,
    Uuid,
    DateTime,
    Json,                    // arbitrary JSON value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Primitive(Primitive),
    Named(String),           // non-owning; resolved at finalize
    Array(Box<TypeRef>),
    Nullable(Box<TypeRef>),
    Map(Box<TypeRef>),       // string-keyed
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldFlags {
    pub omit_empty: bool,
    pub non_empty_discriminator: bool,
    pub interface: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableField {
    pub name: String,
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub flags: FieldFlags,
}

/// A wire key that always carries exactly one literal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedStringField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Typed-key placeholder: every remaining key maps to `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatchallField {
    pub value: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Field {
    Variable(VariableField),
    Fixed(FixedStringField),
    Catchall(CatchallField),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcreteObject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub fields: Vec<Field>,  // call order == wire order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "payload", content = "object", rename_all = "snake_case")]
pub enum VariantPayload {
    Fields(ConcreteObject),
    Empty,
    Ref(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub payload: VariantPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptiveObject {
    pub name: String,
    pub discriminator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub fields: Vec<Field>,  // shared by every variant
    pub variants: IndexMap<String, Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    Concrete(ConcreteObject),
    Adaptive(AdaptiveObject),
}

/// Fields a translator parsed but deliberately left unattached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub note: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Model {
    pub types: IndexMap<String, TypeDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<DeferredFields>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeRef {
    pub const STRING: TypeRef = TypeRef::Primitive(Primitive::String);
    pub const BOOLEAN: TypeRef = TypeRef::Primitive(Primitive::Boolean);
    pub const INTEGER: TypeRef = TypeRef::Primitive(Primitive::Integer);
    pub const NUMBER: TypeRef = TypeRef::Primitive(Primitive::Number);
    pub const UUID: TypeRef = TypeRef::Primitive(Primitive::Uuid);
    pub const DATE_TIME: TypeRef = TypeRef::Primitive(Primitive::DateTime);
    pub const JSON: TypeRef = TypeRef::Primitive(Primitive::Json);

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
    pub fn array_of(self) -> Self {
        Self::Array(Box::new(self))
    }
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }
    pub fn map_of(self) -> Self {
        Self::Map(Box::new(self))
    }

    /// Every named type this reference mentions, outermost first.
    pub fn named_refs(&self) -> Vec<&str> {
        match self {
            Self::Primitive(_) => Vec::new(),
            Self::Named(name) => vec![name.as_str()],
            Self::Array(inner) | Self::Nullable(inner) | Self::Map(inner) => inner.named_refs(),
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::Variable(VariableField {
            name: name.into(),
            ty,
            comment: None,
            flags: FieldFlags::default(),
        })
    }
    pub fn fixed(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Fixed(FixedStringField { name: name.into(), value: value.into(), comment: None })
    }
    pub fn catchall(value: TypeRef) -> Self {
        Self::Catchall(CatchallField { value, comment: None })
    }

    /// Wire key; empty for the catch-all placeholder.
    pub fn name(&self) -> &str {
        match self {
            Self::Variable(f) => &f.name,
            Self::Fixed(f) => &f.name,
            Self::Catchall(_) => "",
        }
    }

    pub fn ty(&self) -> Option<&TypeRef> {
        match self {
            Self::Variable(f) => Some(&f.ty),
            Self::Catchall(f) => Some(&f.value),
            Self::Fixed(_) => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Variable(f) => f.comment.as_deref(),
            Self::Fixed(f) => f.comment.as_deref(),
            Self::Catchall(f) => f.comment.as_deref(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = Some(comment.into());
        match &mut self {
            Self::Variable(f) => f.comment = comment,
            Self::Fixed(f) => f.comment = comment,
            Self::Catchall(f) => f.comment = comment,
        }
        self
    }

    // Flags only exist on variable fields; constant and catch-all fields
    // ignore them.

    pub fn omit_empty(self) -> Self {
        self.with_flags(|flags| flags.omit_empty = true)
    }
    pub fn non_empty_discriminator(self) -> Self {
        self.with_flags(|flags| flags.non_empty_discriminator = true)
    }
    pub fn interface(self) -> Self {
        self.with_flags(|flags| flags.interface = true)
    }

    fn with_flags(mut self, apply: impl FnOnce(&mut FieldFlags)) -> Self {
        if let Self::Variable(f) = &mut self {
            apply(&mut f.flags);
        }
        self
    }
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Concrete(o) => &o.name,
            Self::Adaptive(o) => &o.name,
        }
    }
}

impl Model {
    pub fn concrete(&self, name: &str) -> Option<&ConcreteObject> {
        match self.types.get(name)? {
            TypeDef::Concrete(o) => Some(o),
            TypeDef::Adaptive(_) => None,
        }
    }
    pub fn adaptive(&self, name: &str) -> Option<&AdaptiveObject> {
        match self.types.get(name)? {
            TypeDef::Adaptive(o) => Some(o),
            TypeDef::Concrete(_) => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NAMING
// ————————————————————————————————————————————————————————————————————————————

/// `heading_1` → `Heading1`, `rich text` → `RichText`.
pub fn pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Name of the embedded object carried by an adaptive variant.
pub fn variant_type_name(adaptive: &str, tag: &str) -> String {
    format!("{adaptive}{}", pascal_case(tag))
}
