//! Element stream producers.
//!
//! The generator never parses documentation markup itself; it asks an
//! [`ElementSource`] for the already-tokenized elements of one page.
//! [`FixtureSource`] serves them from JSON files:
//!
//! ```json
//! { "pages": [ { "url": "https://…/reference/block", "elements": [ … ] } ] }
//! ```
use std::path::Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::DocElement;
use crate::error::LoadError;

pub trait ElementSource {
    /// The ordered elements of `url`. Each page is handed out once.
    fn load(&mut self, url: &str) -> Result<Vec<DocElement>, LoadError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureFile {
    pub pages: Vec<FixturePage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePage {
    pub url: String,
    pub elements: Vec<DocElement>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    // url → (origin, elements)
    pages: IndexMap<String, (String, Vec<DocElement>)>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, elements: Vec<DocElement>) -> Result<(), LoadError> {
        self.add_page("<memory>", FixturePage { url: url.to_owned(), elements })
    }

    pub fn add_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let origin = path.to_string_lossy().to_string();
        let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: origin.clone(),
            source,
        })?;
        self.add_str(&origin, &src)
    }

    pub fn add_str(&mut self, origin: &str, src: &str) -> Result<(), LoadError> {
        let file: FixtureFile = from_str_with_path(src).map_err(|detail| LoadError::Parse {
            path: origin.to_owned(),
            detail,
        })?;
        for page in file.pages {
            self.add_page(origin, page)?;
        }
        Ok(())
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    fn add_page(&mut self, origin: &str, page: FixturePage) -> Result<(), LoadError> {
        if let Some((first, _)) = self.pages.get(&page.url) {
            return Err(LoadError::DuplicateUrl {
                url: page.url,
                first: first.clone(),
                second: origin.to_owned(),
            });
        }
        log::debug!("{origin}: {} element(s) for {}", page.elements.len(), page.url);
        self.pages.insert(page.url, (origin.to_owned(), page.elements));
        Ok(())
    }
}

impl ElementSource for FixtureSource {
    fn load(&mut self, url: &str) -> Result<Vec<DocElement>, LoadError> {
        self.pages
            .shift_remove(url)
            .map(|(_, elements)| elements)
            .ok_or_else(|| LoadError::MissingUrl { url: url.to_owned() })
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: serde::de::DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PAGE: &str = r#"{
        "pages": [{
            "url": "https://developers.notion.com/reference/block",
            "elements": [
                {"kind": "heading", "level": 2, "text": "Divider"},
                {"kind": "fenced_code_block", "language": "json", "text": "{}"}
            ]
        }]
    }"#;

    #[test]
    fn pages_are_handed_out_once() {
        let mut source = FixtureSource::new();
        source.add_str("inline", PAGE).unwrap();
        let elements = source.load("https://developers.notion.com/reference/block").unwrap();
        assert_eq!(elements[0], DocElement::heading(2, "Divider"));
        assert!(matches!(
            source.load("https://developers.notion.com/reference/block"),
            Err(LoadError::MissingUrl { .. })
        ));
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let bad = r#"{"pages": [{"url": "u", "elements": [{"kind": "heading", "text": "x"}]}]}"#;
        let err = FixtureSource::new().add_str("bad.json", bad).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad.json"), "{message}");
        assert!(message.contains("pages[0].elements[0]"), "{message}");
    }

    #[test]
    fn the_same_url_in_two_files_is_rejected() {
        let mut source = FixtureSource::new();
        source.add_str("a.json", PAGE).unwrap();
        let err = source.add_str("b.json", PAGE).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateUrl { ref first, ref second, .. } if first == "a.json" && second == "b.json"));
    }

    #[test]
    fn files_are_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        let mut source = FixtureSource::new();
        source.add_file(file.path()).unwrap();
        assert_eq!(source.urls().collect::<Vec<_>>(), ["https://developers.notion.com/reference/block"]);
    }
}
