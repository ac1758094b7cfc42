//! Site rendering result with per-page statistics.

use serde::{Deserialize, Serialize};

use super::page::PageOutcome;

/// A page that could not be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    /// Page name
    pub page: String,

    /// Error message
    pub error: String,
}

/// Outcome of rendering every page of a tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderReport {
    /// Paths of Markdown and text files written, with extension
    pub written: Vec<String>,

    /// Paths resources were copied to
    pub copied: Vec<String>,

    /// Number of pages that produced no output
    pub skipped: usize,

    /// Pages that failed
    pub failures: Vec<PageFailure>,
}

impl RenderReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one page.
    pub fn record(&mut self, page: &str, outcome: crate::Result<PageOutcome>) {
        match outcome {
            Ok(PageOutcome::Written(path)) => self.written.push(path),
            Ok(PageOutcome::Copied(path)) => self.copied.push(path),
            Ok(PageOutcome::Skipped) => self.skipped += 1,
            Err(e) => self.failures.push(PageFailure {
                page: page.to_string(),
                error: e.to_string(),
            }),
        }
    }

    /// Whether every page rendered without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of pages accounted for.
    pub fn page_count(&self) -> usize {
        self.written.len() + self.copied.len() + self.skipped + self.failures.len()
    }
}
