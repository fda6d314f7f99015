//! Per-crawl state
//!
//! A [`CrawlSession`] owns everything one crawl accumulates. It is created
//! when a crawl starts, handed to each discovery stage in turn, and consumed
//! once the pairs are extracted.

use crate::crawler::extract::QaPair;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct CrawlSession {
    site_base: String,
    categories: HashSet<String>,
    questions: HashSet<String>,
    pairs: Vec<QaPair>,
    cancel: CancellationToken,
}

impl CrawlSession {
    pub fn new(site_base: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            site_base: site_base.into(),
            categories: HashSet::new(),
            questions: HashSet::new(),
            pairs: Vec::new(),
            cancel,
        }
    }

    pub fn site_base(&self) -> &str {
        &self.site_base
    }

    /// Polled between fetches; a set token stops the crawl at the next
    /// iteration boundary
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Adds category URLs, returning how many were new
    pub fn add_categories(&mut self, urls: impl IntoIterator<Item = String>) -> usize {
        let before = self.categories.len();
        self.categories.extend(urls);
        self.categories.len() - before
    }

    /// Adds question URLs, returning how many were new
    ///
    /// Duplicates across categories collapse into one target.
    pub fn add_questions(&mut self, urls: impl IntoIterator<Item = String>) -> usize {
        let before = self.questions.len();
        self.questions.extend(urls);
        self.questions.len() - before
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Snapshot of the category targets in set iteration order
    pub fn category_targets(&self) -> Vec<String> {
        self.categories.iter().cloned().collect()
    }

    /// Snapshot of the question targets in set iteration order
    pub fn question_targets(&self) -> Vec<String> {
        self.questions.iter().cloned().collect()
    }

    pub fn push_pair(&mut self, pair: QaPair) {
        self.pairs.push(pair);
    }

    pub fn extend_pairs(&mut self, pairs: impl IntoIterator<Item = QaPair>) {
        self.pairs.extend(pairs);
    }

    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<QaPair> {
        self.pairs
    }
}
