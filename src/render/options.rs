//! Rendering options and configuration.

use crate::model::ContentNode;
use std::fmt;
use std::sync::Arc;

/// Default language tag written on fenced code blocks.
pub const DEFAULT_CODE_LANGUAGE: &str = "kotlin";

/// Options for rendering content to Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Language tag on fenced code blocks
    pub code_language: String,

    /// Tag platform-dependent text with the source sets that produced it
    pub tag_platform_content: bool,

    /// Emit "Brief description" / "Content" / "More info" captions in divergent groups
    pub divergent_labels: bool,

    /// Emit an HTML anchor for the identity reference of each table cell
    pub cell_anchors: bool,

    /// Escape Markdown punctuation in text outside code spans
    pub escape_special_chars: bool,

    /// Emit the navigation breadcrumb at the top of content pages
    pub breadcrumbs: bool,

    /// Table rows to leave out
    pub row_filter: Option<RowFilter>,

    /// Render pages on the rayon thread pool
    pub parallel: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code block language tag.
    pub fn with_code_language(mut self, language: impl Into<String>) -> Self {
        self.code_language = language.into();
        self
    }

    /// Enable or disable source-set tags on platform-dependent content.
    pub fn with_platform_tags(mut self, tag: bool) -> Self {
        self.tag_platform_content = tag;
        self
    }

    /// Enable or disable divergent group captions.
    pub fn with_divergent_labels(mut self, labels: bool) -> Self {
        self.divergent_labels = labels;
        self
    }

    /// Enable or disable table cell anchors.
    pub fn with_cell_anchors(mut self, anchors: bool) -> Self {
        self.cell_anchors = anchors;
        self
    }

    /// Enable or disable escaping of Markdown punctuation.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable breadcrumbs.
    pub fn with_breadcrumbs(mut self, breadcrumbs: bool) -> Self {
        self.breadcrumbs = breadcrumbs;
        self
    }

    /// Set the table row filter.
    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.row_filter = Some(filter);
        self
    }

    /// Render pages one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            code_language: DEFAULT_CODE_LANGUAGE.to_string(),
            tag_platform_content: true,
            divergent_labels: true,
            cell_anchors: true,
            escape_special_chars: false,
            breadcrumbs: true,
            row_filter: None,
            parallel: true,
        }
    }
}

/// Predicate deciding which table body rows are dropped.
#[derive(Clone)]
pub struct RowFilter(Arc<dyn Fn(&ContentNode) -> bool + Send + Sync>);

impl RowFilter {
    /// Drop rows for which `skip` returns true.
    pub fn new<F>(skip: F) -> Self
    where
        F: Fn(&ContentNode) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(skip))
    }

    /// Drop rows whose first identity reference is `reference`.
    ///
    /// Typically the root type of a language's hierarchy, to hide rows that
    /// only list members inherited from it.
    pub fn sole_reference(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self::new(move |row| row.dci.primary_ref() == Some(reference.as_str()))
    }

    /// Whether `row` should be dropped.
    pub fn skips(&self, row: &ContentNode) -> bool {
        (self.0)(row)
    }
}

impl fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowFilter(..)")
    }
}
