//! Documentation elements: what the live reference says, and what a
//! translator expects it to say.
//!
//! Live elements come from an [`ElementSource`](crate::source::ElementSource)
//! and are never mutated. Expected elements are authored inline by
//! translators and compared against the live stream one at a time.
use std::fmt;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// LIVE ELEMENTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocElement {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    FencedCodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },
    Blockquote {
        text: String,
    },
    List {
        items: Vec<String>,
    },
    ParameterRow(ParameterRow),
}

/// One row of a parameter table (`Property | Type | Description | Example`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub property: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Heading,
    Paragraph,
    FencedCodeBlock,
    Blockquote,
    List,
    ParameterRow,
}

impl DocElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Heading { .. } => ElementKind::Heading,
            Self::Paragraph { .. } => ElementKind::Paragraph,
            Self::FencedCodeBlock { .. } => ElementKind::FencedCodeBlock,
            Self::Blockquote { .. } => ElementKind::Blockquote,
            Self::List { .. } => ElementKind::List,
            Self::ParameterRow(_) => ElementKind::ParameterRow,
        }
    }

    /// Raw text of a block element. Lists join their items with newlines.
    pub fn text(&self) -> String {
        match self {
            Self::Heading { text, .. }
            | Self::Paragraph { text }
            | Self::FencedCodeBlock { text, .. }
            | Self::Blockquote { text } => text.clone(),
            Self::List { items } => items.join("\n"),
            Self::ParameterRow(row) => row.description.clone(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading { level, text: text.into() }
    }
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }
    pub fn code(language: Option<&str>, text: impl Into<String>) -> Self {
        Self::FencedCodeBlock { language: language.map(str::to_owned), text: text.into() }
    }
    pub fn row(property: &str, type_: &str, description: &str) -> Self {
        Self::ParameterRow(ParameterRow {
            property: property.to_owned(),
            type_: type_.to_owned(),
            description: description.to_owned(),
            example: None,
        })
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::FencedCodeBlock => "fenced code block",
            Self::Blockquote => "blockquote",
            Self::List => "list",
            Self::ParameterRow => "parameter row",
        };
        f.write_str(label)
    }
}

impl fmt::Display for DocElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading { level, text } => write!(f, "heading(h{level}) {text:?}"),
            Self::ParameterRow(row) => write!(f, "parameter row {row}"),
            Self::List { items } => write!(f, "list {items:?}"),
            other => write!(f, "{} {:?}", other.kind(), other.text()),
        }
    }
}

impl fmt::Display for ParameterRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.property, self.type_)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXPECTED ELEMENTS (FIXTURES)
// ————————————————————————————————————————————————————————————————————————————

/// How much of a live text value a fixture pins down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedText {
    Exact(String),
    StartsWith(String),
    /// Wildcard: illustrative content that is allowed to change.
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedElement {
    Heading { level: Option<u8>, text: ExpectedText },
    Paragraph { text: ExpectedText },
    FencedCodeBlock { text: ExpectedText },
    Blockquote { text: ExpectedText },
    /// `None` accepts any list.
    List { items: Option<Vec<String>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFixture {
    pub property: String,
    pub type_: String,
    pub description: ExpectedText,
}

impl ExpectedText {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Exact(s) => s == actual,
            Self::StartsWith(prefix) => actual.starts_with(prefix.as_str()),
            Self::Any => true,
        }
    }
}

impl fmt::Display for ExpectedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "{s:?}"),
            Self::StartsWith(s) => write!(f, "{s:?}…"),
            Self::Any => f.write_str("<any>"),
        }
    }
}

impl ExpectedElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Heading { .. } => ElementKind::Heading,
            Self::Paragraph { .. } => ElementKind::Paragraph,
            Self::FencedCodeBlock { .. } => ElementKind::FencedCodeBlock,
            Self::Blockquote { .. } => ElementKind::Blockquote,
            Self::List { .. } => ElementKind::List,
        }
    }

    pub fn heading(text: &str) -> Self {
        Self::Heading { level: None, text: ExpectedText::Exact(text.to_owned()) }
    }
    pub fn heading_level(level: u8, text: &str) -> Self {
        Self::Heading { level: Some(level), text: ExpectedText::Exact(text.to_owned()) }
    }
    pub fn paragraph(text: &str) -> Self {
        Self::Paragraph { text: ExpectedText::Exact(text.to_owned()) }
    }
    pub fn paragraph_starting(prefix: &str) -> Self {
        Self::Paragraph { text: ExpectedText::StartsWith(prefix.to_owned()) }
    }
    pub fn code(text: &str) -> Self {
        Self::FencedCodeBlock { text: ExpectedText::Exact(text.to_owned()) }
    }
    pub fn any_code() -> Self {
        Self::FencedCodeBlock { text: ExpectedText::Any }
    }
    pub fn blockquote_starting(prefix: &str) -> Self {
        Self::Blockquote { text: ExpectedText::StartsWith(prefix.to_owned()) }
    }
    pub fn list(items: &[&str]) -> Self {
        Self::List { items: Some(items.iter().map(|s| (*s).to_owned()).collect()) }
    }
    pub fn any_list() -> Self {
        Self::List { items: None }
    }
}

impl ParameterFixture {
    /// Pins property and type column; the description is a wildcard.
    pub fn new(property: &str, type_: &str) -> Self {
        Self {
            property: property.to_owned(),
            type_: type_.to_owned(),
            description: ExpectedText::Any,
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = ExpectedText::Exact(description.to_owned());
        self
    }
}

impl fmt::Display for ParameterFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.property, self.type_)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
