//! Lockstep comparator.
//!
//! Walks the live element stream of one documentation page in parallel with
//! the expectations a translator declares. The first divergence is fatal;
//! on a match the handler sees the *live* element, never the fixture.
//!
//! The cursor only moves forward, one element per successful expectation.
//! A failed expectation (or a failed handler) leaves it where it was.
use crate::element::{DocElement, ExpectedElement, ExpectedText, ParameterFixture, ParameterRow};
use crate::error::{CompareError, Drift, GenError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub struct Comparator {
    url: String,
    elements: Vec<DocElement>,
    position: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Comparator {
    pub fn new(url: impl Into<String>, elements: Vec<DocElement>) -> Self {
        Self { url: url.into(), elements, position: 0 }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn position(&self) -> usize {
        self.position
    }
    pub fn remaining(&self) -> usize {
        self.elements.len() - self.position
    }

    /// Match the next live block element against `expected`, then hand the
    /// live element to `handle`.
    pub fn expect_block<F>(&mut self, expected: ExpectedElement, handle: F) -> Result<(), GenError>
    where
        F: FnOnce(&DocElement) -> Result<(), GenError>,
    {
        let actual = self.next_live(|| format!("{expected:?}"))?;
        check_block(&expected, actual).map_err(|drift| self.fail(drift))?;
        handle(actual)?;
        log::debug!("{} #{}: matched {}", self.url, self.position, actual.kind());
        self.position += 1;
        Ok(())
    }

    /// Match a block element whose content the translator does not need.
    pub fn expect(&mut self, expected: ExpectedElement) -> Result<(), GenError> {
        self.expect_block(expected, |_| Ok(()))
    }

    /// Match the next live parameter row on property key and type column.
    pub fn expect_parameter<F>(&mut self, expected: ParameterFixture, handle: F) -> Result<(), GenError>
    where
        F: FnOnce(&ParameterRow) -> Result<(), GenError>,
    {
        let actual = self.next_live(|| format!("parameter row {expected}"))?;
        let row = check_parameter(&expected, actual).map_err(|drift| self.fail(drift))?;
        handle(row)?;
        log::debug!("{} #{}: matched parameter {:?}", self.url, self.position, row.property);
        self.position += 1;
        Ok(())
    }

    /// Called once every step of a translator has run.
    ///
    /// Unconsumed elements mean the page grew beyond what the translator
    /// describes. That is only fatal in strict mode.
    pub fn finish(&self, strict: bool) -> Result<(), CompareError> {
        let Some(next) = self.elements.get(self.position) else {
            return Ok(());
        };
        let count = self.remaining();
        if strict {
            return Err(self.fail(Drift::TrailingElements { count, next: next.clone() }));
        }
        log::warn!(
            "{}: {count} element(s) after #{} were not described by any translator step (next: {next})",
            self.url,
            self.position,
        );
        Ok(())
    }

    fn next_live(&self, expected: impl FnOnce() -> String) -> Result<&DocElement, CompareError> {
        self.elements
            .get(self.position)
            .ok_or_else(|| self.fail(Drift::StreamExhausted { expected: expected() }))
    }

    fn fail(&self, drift: Drift) -> CompareError {
        CompareError { url: self.url.clone(), position: self.position, drift }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_block(expected: &ExpectedElement, actual: &DocElement) -> Result<(), Drift> {
    match (expected, actual) {
        (
            ExpectedElement::Heading { level, text },
            DocElement::Heading { level: actual_level, text: actual_text },
        ) => {
            if let Some(level) = level {
                if level != actual_level {
                    return Err(Drift::ElementContentMismatch {
                        field: "heading level",
                        expected: format!("h{level}"),
                        actual: format!("h{actual_level}"),
                    });
                }
            }
            check_text("heading text", text, actual_text)
        }
        (ExpectedElement::Paragraph { text }, DocElement::Paragraph { text: actual_text }) => {
            check_text("paragraph text", text, actual_text)
        }
        (
            ExpectedElement::FencedCodeBlock { text },
            DocElement::FencedCodeBlock { text: actual_text, .. },
        ) => check_text("code block text", text, actual_text),
        (ExpectedElement::Blockquote { text }, DocElement::Blockquote { text: actual_text }) => {
            check_text("blockquote text", text, actual_text)
        }
        (ExpectedElement::List { items }, DocElement::List { items: actual_items }) => match items {
            Some(items) if items != actual_items => Err(Drift::ElementContentMismatch {
                field: "list items",
                expected: format!("{items:?}"),
                actual: format!("{actual_items:?}"),
            }),
            _ => Ok(()),
        },
        _ => Err(Drift::ElementKindMismatch { expected: expected.kind(), actual: actual.clone() }),
    }
}

fn check_parameter<'a>(
    expected: &ParameterFixture,
    actual: &'a DocElement,
) -> Result<&'a ParameterRow, Drift> {
    let DocElement::ParameterRow(row) = actual else {
        return Err(Drift::ElementKindMismatch {
            expected: crate::element::ElementKind::ParameterRow,
            actual: actual.clone(),
        });
    };
    if expected.property != row.property {
        return Err(Drift::ElementContentMismatch {
            field: "property",
            expected: format!("{:?}", expected.property),
            actual: format!("{:?}", row.property),
        });
    }
    if expected.type_ != row.type_ {
        return Err(Drift::ElementContentMismatch {
            field: "type column",
            expected: format!("{:?}", expected.type_),
            actual: format!("{:?}", row.type_),
        });
    }
    check_text("description", &expected.description, &row.description)?;
    Ok(row)
}

fn check_text(field: &'static str, expected: &ExpectedText, actual: &str) -> Result<(), Drift> {
    if expected.matches(actual) {
        return Ok(());
    }
    Err(Drift::ElementContentMismatch {
        field,
        expected: expected.to_string(),
        actual: format!("{actual:?}"),
    })
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
