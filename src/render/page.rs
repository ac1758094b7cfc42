//! Page writing: output strategy selection and site rendering.
//!
//! [`PageWriter`] turns one page into a [`PageOutput`] and hands it to an
//! [`OutputWriter`]. [`render_site`] does that for every page of a tree,
//! optionally on the rayon pool. A page that fails is recorded in the
//! [`RenderReport`] and the remaining pages still render.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::location::{LocationProvider, MARKDOWN_EXTENSION};
use crate::model::{Page, PageKind, PageTree, RenderingStrategy};
use crate::output::OutputWriter;

use super::{MarkdownRenderer, RenderOptions, RenderReport};

/// What a page turns into before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutput {
    /// Text written to `path` plus `extension`
    Text {
        path: String,
        text: String,
        extension: &'static str,
    },

    /// Resource copied from `from` to `path`
    Resource { from: String, path: String },

    /// No output
    Nothing,
}

/// What happened to a page once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Text written; holds the path with extension
    Written(String),

    /// Resource copied; holds the destination
    Copied(String),

    /// Nothing produced
    Skipped,
}

/// Renders single pages and persists them.
pub struct PageWriter<'a> {
    renderer: &'a MarkdownRenderer<'a>,
    output: &'a dyn OutputWriter,
}

impl<'a> PageWriter<'a> {
    /// Create a page writer.
    pub fn new(renderer: &'a MarkdownRenderer<'a>, output: &'a dyn OutputWriter) -> Self {
        Self { renderer, output }
    }

    /// Decide the output of `page` without writing it.
    pub fn prepare(&self, page: &Page) -> Result<PageOutput> {
        prepare_page(self.renderer, page)
    }

    /// Render `page` and write it.
    pub fn render_page(&self, page: &Page) -> Result<PageOutcome> {
        match self.prepare(page)? {
            PageOutput::Text {
                path,
                text,
                extension,
            } => {
                self.output.write(&path, &text, extension)?;
                Ok(PageOutcome::Written(format!("{}{}", path, extension)))
            }
            PageOutput::Resource { from, path } => {
                self.output.write_resources(&from, &path)?;
                Ok(PageOutcome::Copied(path))
            }
            PageOutput::Nothing => Ok(PageOutcome::Skipped),
        }
    }
}

fn prepare_page(renderer: &MarkdownRenderer<'_>, page: &Page) -> Result<PageOutput> {
    let locations = renderer.locations();
    match &page.kind {
        PageKind::Module { .. } | PageKind::Content { .. } => Ok(PageOutput::Text {
            path: locations.output_path(page)?,
            text: renderer.render_page_content(page),
            extension: MARKDOWN_EXTENSION,
        }),
        PageKind::RendererSpecific { strategy } => match strategy {
            RenderingStrategy::Copy { from } => Ok(PageOutput::Resource {
                from: from.clone(),
                path: locations.output_path(page)?,
            }),
            RenderingStrategy::Write { text } => Ok(PageOutput::Text {
                path: locations.output_path(page)?,
                text: text.clone(),
                extension: "",
            }),
            RenderingStrategy::Callback(callback) => {
                let path = locations.output_path(page)?;
                Ok(PageOutput::Text {
                    path,
                    text: callback.invoke(renderer, page),
                    extension: MARKDOWN_EXTENSION,
                })
            }
            RenderingStrategy::DoNothing => Ok(PageOutput::Nothing),
        },
        PageKind::Structural => Err(Error::MalformedPage(page.name.clone())),
    }
}

/// Render every page of `tree` into `output`.
pub fn render_site(
    tree: &PageTree,
    locations: &dyn LocationProvider,
    output: &dyn OutputWriter,
    options: RenderOptions,
) -> RenderReport {
    let parallel = options.parallel;
    let renderer = MarkdownRenderer::new(tree, locations, options);
    let writer = PageWriter::new(&renderer, output);

    let render_one = |page: &Page| {
        let outcome = writer.render_page(page);
        if let Err(e) = &outcome {
            log::warn!("Failed to render page {}: {}", page.name, e);
        }
        outcome
    };

    let outcomes: Vec<Result<PageOutcome>> = if parallel {
        tree.pages().par_iter().map(render_one).collect()
    } else {
        tree.pages().iter().map(render_one).collect()
    };

    let mut report = RenderReport::new();
    for (page, outcome) in tree.pages().iter().zip(outcomes) {
        report.record(&page.name, outcome);
    }
    log::info!(
        "Rendered {} pages: {} written, {} copied, {} skipped, {} failed",
        report.page_count(),
        report.written.len(),
        report.copied.len(),
        report.skipped,
        report.failures.len()
    );
    report
}

/// Render every page of `tree`, awaiting only on file I/O.
///
/// Each page is serialized synchronously; the write is the only suspension
/// point.
#[cfg(feature = "async")]
pub async fn render_site_async(
    tree: &PageTree,
    locations: &dyn LocationProvider,
    output: &crate::output::AsyncFileSystemWriter,
    options: RenderOptions,
) -> RenderReport {
    let renderer = MarkdownRenderer::new(tree, locations, options);
    let mut report = RenderReport::new();
    for page in tree.pages() {
        let outcome = match prepare_page(&renderer, page) {
            Ok(PageOutput::Text {
                path,
                text,
                extension,
            }) => output
                .write(&path, &text, extension)
                .await
                .map(|()| PageOutcome::Written(format!("{}{}", path, extension))),
            Ok(PageOutput::Resource { from, path }) => output
                .write_resources(&from, &path)
                .await
                .map(|()| PageOutcome::Copied(path)),
            Ok(PageOutput::Nothing) => Ok(PageOutcome::Skipped),
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            log::warn!("Failed to render page {}: {}", page.name, e);
        }
        report.record(&page.name, outcome);
    }
    report
}
