//! # gfmdoc
//!
//! Render documentation content trees to GitHub-flavored Markdown.
//!
//! A documentation model (pages, and per page a tree of headers, paragraphs,
//! lists, tables, code blocks, cross-reference links and platform variants)
//! is serialized into one Markdown file per page, with navigation links
//! resolved relative to each page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gfmdoc::{load_tree, GfmDoc};
//!
//! fn main() -> gfmdoc::Result<()> {
//!     let tree = load_tree("pages.json")?;
//!
//!     let report = GfmDoc::new()
//!         .with_strip_prefix("libui/")
//!         .render_to_dir(&tree, "docs");
//!     println!("{} files written", report.written.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Verbatim tracking**: backtick spans open and close themselves across
//!   nested, out-of-order composition
//! - **Tables and lists**: nested constructs are pre-rendered and flattened
//!   into cells and `<li>` items
//! - **Platform variants**: per-source-set content is deduplicated and tagged
//! - **Parallel processing**: pages render on the rayon pool
//! - **Async output**: tokio writer behind the `async` feature

pub mod error;
pub mod location;
pub mod model;
pub mod output;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use location::{
    identifier_to_filename, LocationOptions, LocationProvider, MarkdownLocationProvider,
};
pub use model::{
    Content, ContentKind, ContentNode, Dci, DivergentInstance, Page, PageCallback, PageId,
    PageKind, PageSpec, PageTree, RenderingStrategy, SourceSet, SourceSets, Style,
};
pub use output::{FileSystemWriter, MemoryWriter, OutputWriter};
pub use render::{
    render_site, MarkdownBuilder, MarkdownRenderer, PageOutcome, PageOutput, PageWriter,
    RenderOptions, RenderReport, RowFilter,
};

use std::path::Path;

/// Load a page tree from a JSON file.
///
/// # Example
///
/// ```no_run
/// use gfmdoc::load_tree;
///
/// let tree = load_tree("pages.json").unwrap();
/// println!("Pages: {}", tree.len());
/// ```
pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<PageTree> {
    let json = std::fs::read_to_string(path)?;
    PageTree::from_json(&json)
}

/// Builder for rendering page trees.
///
/// # Example
///
/// ```no_run
/// use gfmdoc::{GfmDoc, RowFilter};
///
/// let tree = gfmdoc::load_tree("pages.json")?;
/// let markdown = GfmDoc::new()
///     .with_code_language("kotlin")
///     .with_row_filter(RowFilter::sole_reference("kotlin.Any"))
///     .render_page(&tree, "Window")?;
/// # Ok::<(), gfmdoc::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GfmDoc {
    location_options: LocationOptions,
    render_options: RenderOptions,
}

impl GfmDoc {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip a prefix from every resolved path.
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.location_options = self.location_options.with_strip_prefix(prefix);
        self
    }

    /// Set the file name of pages that have children.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.location_options = self.location_options.with_index_name(name);
        self
    }

    /// Set the language tag of fenced code blocks.
    pub fn with_code_language(mut self, language: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_code_language(language);
        self
    }

    /// Leave out table rows matching `filter`.
    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.render_options = self.render_options.with_row_filter(filter);
        self
    }

    /// Replace all render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Disable parallel page rendering.
    pub fn sequential(mut self) -> Self {
        self.render_options = self.render_options.sequential();
        self
    }

    /// Render every page into `dir`.
    pub fn render_to_dir<P: AsRef<Path>>(&self, tree: &PageTree, dir: P) -> RenderReport {
        let output = FileSystemWriter::new(dir.as_ref());
        self.render_to(tree, &output)
    }

    /// Render every page into `output`.
    pub fn render_to(&self, tree: &PageTree, output: &dyn OutputWriter) -> RenderReport {
        let locations = MarkdownLocationProvider::new(tree, self.location_options.clone());
        render_site(tree, &locations, output, self.render_options.clone())
    }

    /// Render the page called `name` and return its text.
    ///
    /// No-op pages yield an empty string; resource pages have no text and
    /// are an error.
    pub fn render_page(&self, tree: &PageTree, name: &str) -> Result<String> {
        let page = tree
            .find(name)
            .and_then(|id| tree.page(id))
            .ok_or_else(|| Error::Other(format!("Page not found: {}", name)))?;
        let locations = MarkdownLocationProvider::new(tree, self.location_options.clone());
        let renderer = MarkdownRenderer::new(tree, &locations, self.render_options.clone());
        let output = MemoryWriter::new();
        match PageWriter::new(&renderer, &output).prepare(page)? {
            PageOutput::Text { text, .. } => Ok(text),
            PageOutput::Resource { from, .. } => Err(Error::Other(format!(
                "Page {} copies {} and has no text",
                name, from
            ))),
            PageOutput::Nothing => Ok(String::new()),
        }
    }

    /// Output path of every page that produces a file, in tree order.
    pub fn paths(&self, tree: &PageTree) -> Vec<(String, String)> {
        let locations = MarkdownLocationProvider::new(tree, self.location_options.clone());
        tree.pages()
            .iter()
            .filter_map(|page| {
                let skip_extension = match &page.kind {
                    PageKind::Module { .. } | PageKind::Content { .. } => false,
                    PageKind::RendererSpecific { strategy } => match strategy {
                        RenderingStrategy::Callback(_) => false,
                        RenderingStrategy::Copy { .. } | RenderingStrategy::Write { .. } => true,
                        RenderingStrategy::DoNothing => return None,
                    },
                    PageKind::Structural => return None,
                };
                let path = locations.resolve(page.id, None, skip_extension)?;
                Some((page.name.clone(), path))
            })
            .collect()
    }
}
