//! Documentation model types consumed by the renderer.
//!
//! The model is built entirely before rendering starts and is only read
//! while pages are rendered. It is split into the content tree of a single
//! page and the page tree that ties pages together.

mod content;
mod page;

pub use content::{
    is_image_address, source_sets, Content, ContentKind, ContentNode, Dci, DivergentInstance,
    SourceSet, SourceSets, Style,
};
pub use page::{
    Page, PageCallback, PageId, PageKind, PageSpec, PageTree, ParentChain, RenderingStrategy,
};
