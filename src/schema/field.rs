//! Field constructors: parameter rows → `Field` values.
//!
//! The prose type column is interpreted here, so that translators only have
//! to spell out a type when the documentation's wording is not enough.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::element::ParameterRow;
use crate::error::BuildError;
use crate::ir::{pascal_case, Field, FieldFlags, TypeRef};

static ARRAY_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^array of (.+)$").unwrap());
static STRING_QUALIFIED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^string \((.+)\)$").unwrap());
static NAMED_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?) objects?$").unwrap());
static OPTIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?)\s*\(optional\)$").unwrap());
static OR_NULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?)\s*(?:\||\bor\b)\s*null$").unwrap());
static NULLABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^nullable\s+(.+)$").unwrap());

/// Interpret a documentation type column such as `array of rich text objects`.
///
/// Returns the type plus the flags the wording implies (`string (enum)`
/// columns are omitted when empty, `(optional)`, `| null` and `nullable`
/// wording makes the type nullable). `None` when the wording is unknown.
pub fn interpret_type_column(column: &str) -> Option<(TypeRef, FieldFlags)> {
    let column = column.trim();
    let plain = |ty| Some((ty, FieldFlags::default()));

    if let Some(caps) = [&OPTIONAL, &OR_NULL, &NULLABLE].iter().find_map(|re| re.captures(column)) {
        let (ty, flags) = interpret_type_column(&caps[1])?;
        let ty = match ty {
            TypeRef::Nullable(_) => ty,
            ty => ty.nullable(),
        };
        return Some((ty, FieldFlags { omit_empty: true, ..flags }));
    }

    match column.to_ascii_lowercase().as_str() {
        "boolean" => return plain(TypeRef::BOOLEAN),
        "string" => return plain(TypeRef::STRING),
        "number" => return plain(TypeRef::NUMBER),
        "integer" => return plain(TypeRef::INTEGER),
        "uuid" => return plain(TypeRef::UUID),
        "object" => return plain(TypeRef::JSON),
        _ => {}
    }

    if let Some(caps) = STRING_QUALIFIED.captures(column) {
        let qualifier = caps[1].to_ascii_lowercase();
        return if qualifier == "enum" {
            Some((TypeRef::STRING, FieldFlags { omit_empty: true, ..FieldFlags::default() }))
        } else if qualifier.starts_with("uuid") {
            plain(TypeRef::UUID)
        } else if qualifier.contains("date") {
            plain(TypeRef::DATE_TIME)
        } else {
            plain(TypeRef::STRING)
        };
    }

    if let Some(caps) = ARRAY_OF.captures(column) {
        let item = caps[1].trim();
        let singular = item.strip_suffix('s').unwrap_or(item);
        let item_ty = match interpret_type_column(singular).or_else(|| interpret_type_column(item)) {
            Some((ty, _)) => ty,
            None => TypeRef::named(pascal_case(item)),
        };
        return plain(item_ty.array_of());
    }

    if let Some(caps) = NAMED_OBJECT.captures(column) {
        return plain(TypeRef::named(pascal_case(&caps[1])));
    }

    None
}

impl ParameterRow {
    /// Field with an explicitly chosen type. The row's description becomes
    /// the field comment.
    pub fn as_field(&self, ty: TypeRef) -> Field {
        self.commented(Field::new(self.property.as_str(), ty))
    }

    /// Field whose wire value is always `value`.
    pub fn as_fixed(&self, value: &str) -> Field {
        self.commented(Field::fixed(self.property.as_str(), value))
    }

    /// Field typed from the row's own type column.
    pub fn as_inferred_field(&self) -> Result<Field, BuildError> {
        let Some((ty, flags)) = interpret_type_column(&self.type_) else {
            return Err(BuildError::UnrecognizedTypeColumn {
                property: self.property.clone(),
                type_column: self.type_.clone(),
            });
        };
        let mut field = self.as_field(ty);
        if flags.omit_empty {
            field = field.omit_empty();
        }
        Ok(field)
    }

    fn commented(&self, field: Field) -> Field {
        if self.description.trim().is_empty() {
            field
        } else {
            field.with_comment(self.description.trim())
        }
    }
}
