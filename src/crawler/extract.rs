//! Question/answer extraction
//!
//! Question and answer text live in elements tagged with two fixed CSS
//! classes. A question page carries one of each; a homepage that lists its
//! FAQ inline carries many, which must pair up one-to-one.

use crate::config::MarkerConfig;
use crate::{CardinalityMismatch, HarvestError};
use scraper::{ElementRef, Html, Selector};

/// One extracted question with its answer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Trims surrounding whitespace, then drops every `\n` and `\r`
///
/// Other interior whitespace is left untouched.
pub fn normalize_text(raw: &str) -> String {
    raw.trim().replace(['\n', '\r'], "")
}

/// Compiled selectors for the question and answer containers
#[derive(Debug, Clone)]
pub struct ContentSelectors {
    question: Selector,
    answer: Selector,
}

impl ContentSelectors {
    /// Compiles `.question_class` and `.answer_class` selectors
    pub fn new(question_class: &str, answer_class: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            question: class_selector(question_class)?,
            answer: class_selector(answer_class)?,
        })
    }

    pub fn from_markers(markers: &MarkerConfig) -> Result<Self, HarvestError> {
        Self::new(&markers.question_class, &markers.answer_class)
    }

    /// Single-container mode, used on question pages
    ///
    /// Takes the first question container and the first answer container.
    /// A missing container becomes an empty string.
    pub fn extract_single(&self, document: &Html) -> QaPair {
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(element_text)
                .unwrap_or_default()
        };

        QaPair {
            question: first_text(&self.question),
            answer: first_text(&self.answer),
        }
    }

    /// List mode, used on a homepage without question links
    ///
    /// Pairs every question container with the answer container at the same
    /// position in document order. If the counts differ nothing is paired.
    pub fn extract_list(&self, document: &Html) -> Result<Vec<QaPair>, CardinalityMismatch> {
        let questions: Vec<String> = document.select(&self.question).map(element_text).collect();
        let answers: Vec<String> = document.select(&self.answer).map(element_text).collect();

        if questions.len() != answers.len() {
            return Err(CardinalityMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }

        Ok(questions
            .into_iter()
            .zip(answers)
            .map(|(question, answer)| QaPair { question, answer })
            .collect())
    }
}

fn class_selector(class: &str) -> Result<Selector, HarvestError> {
    let selector = format!(".{}", class);
    Selector::parse(&selector).map_err(|e| HarvestError::Selector {
        message: format!("{:?}", e),
        selector: selector.clone(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}
