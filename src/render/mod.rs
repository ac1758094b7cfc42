//! Rendering module turning content trees into Markdown pages.

mod builder;
mod markdown;
mod options;
mod page;
mod result;

pub use builder::{build_markdown, MarkdownBuilder, VERBATIM_DELIMITER};
pub use markdown::MarkdownRenderer;
pub use options::{RenderOptions, RowFilter, DEFAULT_CODE_LANGUAGE};
pub use page::{render_site, PageOutcome, PageOutput, PageWriter};
pub use result::{PageFailure, RenderReport};

#[cfg(feature = "async")]
pub use page::render_site_async;
