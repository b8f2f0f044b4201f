//! Error taxonomy. Every variant is terminal for a generation run.
use std::fmt;
use thiserror::Error;
use crate::element::{DocElement, ElementKind};
use crate::schema::Site;

// ————————————————————————————————————————————————————————————————————————————
// COMPARATOR
// ————————————————————————————————————————————————————————————————————————————

/// The live documentation no longer matches what a translator expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("documentation drift in {url} at element #{position}: {drift}")]
pub struct CompareError {
    pub url: String,
    pub position: usize,
    pub drift: Drift,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    ElementKindMismatch {
        expected: ElementKind,
        actual: DocElement,
    },
    ElementContentMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    StreamExhausted {
        expected: String,
    },
    TrailingElements {
        count: usize,
        next: DocElement,
    },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementKindMismatch { expected, actual } => write!(
                f,
                "element kind mismatch\n  - expected: {expected}\n  + actual:   {actual}"
            ),
            Self::ElementContentMismatch { field, expected, actual } => write!(
                f,
                "{field} differs\n  - expected: {expected}\n  + actual:   {actual}"
            ),
            Self::StreamExhausted { expected } => write!(
                f,
                "stream exhausted\n  - expected: {expected}\n  + actual:   <end of document>"
            ),
            Self::TrailingElements { count, next } => write!(
                f,
                "{count} element(s) left unconsumed\n  - expected: <end of document>\n  + actual:   {next}"
            ),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA BUILDER
// ————————————————————————————————————————————————————————————————————————————

/// Authoring errors in the translator registrations themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("type `{name}` declared twice (first at {first}, again at {second})")]
    DuplicateName { name: String, first: Site, second: Site },

    #[error("`{adaptive}` already has a variant tagged {tag:?} (first at {first}, again at {second})")]
    DuplicateVariant { adaptive: String, tag: String, first: Site, second: Site },

    #[error("field `{field}` declared twice on `{object}` (first at {first}, again at {second})")]
    DuplicateField { object: String, field: String, first: Site, second: Site },

    #[error("`{referenced_by}` references undeclared type `{name}` (at {site})")]
    UnresolvedTypeReference { name: String, referenced_by: String, site: Site },

    #[error("`{object}` redeclares discriminator field `{field}` (at {site})")]
    DiscriminatorConflict { object: String, field: String, site: Site },

    #[error("`{object}` received a field with an empty name (at {site})")]
    EmptyFieldName { object: String, site: Site },

    #[error("`{adaptive}` received a variant with an empty tag (at {site})")]
    EmptyTag { adaptive: String, site: Site },

    #[error("cannot interpret type column {type_column:?} of property `{property}`")]
    UnrecognizedTypeColumn { property: String, type_column: String },

    #[error("object handle does not belong to this builder (at {site})")]
    UnknownHandle { site: Site },
}

// ————————————————————————————————————————————————————————————————————————————
// SOURCES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {detail}")]
    Parse { path: String, detail: String },
    #[error("{url} is provided by both {first} and {second}")]
    DuplicateUrl { url: String, first: String, second: String },
    #[error("no element stream for {url}")]
    MissingUrl { url: String },
}

// ————————————————————————————————————————————————————————————————————————————
// RUN
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Load(#[from] LoadError),
    /// A handler could not extract what it needed from a matched element.
    #[error("unusable example in {element}: {reason}")]
    Example { element: String, reason: String },
}
