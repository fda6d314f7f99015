//! Markdown table output
//!
//! This module writes harvested pairs as a two-column markdown table with
//! `Question` and `Answer` headers.

use crate::crawler::QaPair;
use crate::output::traits::{OutputResult, ResultSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a markdown question/answer table to a file
///
/// # Arguments
///
/// * `pairs` - The pairs, in the order they should appear
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_table(pairs: &[QaPair], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_table(pairs);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats pairs as a markdown table
///
/// An empty pair list still produces the header rows.
pub fn format_markdown_table(pairs: &[QaPair]) -> String {
    let mut md = String::new();

    md.push_str("| Question | Answer |\n");
    md.push_str("|----------|--------|\n");

    for pair in pairs {
        md.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&pair.question),
            escape_cell(&pair.answer)
        ));
    }

    md
}

/// Keeps cell text from breaking the table layout
fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\").replace('|', "\\|")
}

/// Result sink that writes a markdown table
#[derive(Debug, Clone)]
pub struct MarkdownTableSink {
    path: PathBuf,
}

impl MarkdownTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for MarkdownTableSink {
    fn persist(&self, pairs: &[QaPair]) -> OutputResult<()> {
        write_markdown_table(pairs, &self.path)?;
        tracing::info!("Wrote {} pairs to {}", pairs.len(), self.path.display());
        Ok(())
    }
}
