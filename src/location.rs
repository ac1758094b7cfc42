//! Output locations and navigation paths.
//!
//! Every page maps to a list of path segments: the file names of its parent
//! chain from the root down to the page, plus a fixed index segment when the
//! page has children. Links between pages are the relative walk from the
//! directory of the linking page to the target.
//!
//! # Example
//!
//! ```
//! use gfmdoc::location::{LocationOptions, LocationProvider, MarkdownLocationProvider};
//! use gfmdoc::model::{ContentNode, PageKind, PageTree};
//!
//! let mut tree = PageTree::new();
//! let module = tree.add_page("libui", PageKind::Module { content: ContentNode::group(vec![]) }, None);
//! let window = tree.add_page("Window", PageKind::Content { content: ContentNode::text("w") }, Some(module));
//!
//! let options = LocationOptions::new().with_strip_prefix("libui/");
//! let locations = MarkdownLocationProvider::new(&tree, options);
//! assert_eq!(locations.resolve(module, None, false).as_deref(), Some("README.md"));
//! assert_eq!(locations.resolve(window, None, true).as_deref(), Some("-window"));
//! ```

use crate::error::{Error, Result};
use crate::model::{Page, PageId, PageTree};
use std::collections::HashMap;

/// Extension used for every Markdown page.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// File name used for pages that have children.
pub const DEFAULT_INDEX_NAME: &str = "README";

/// Options for path computation.
#[derive(Debug, Clone)]
pub struct LocationOptions {
    /// Last segment for pages with children
    pub index_name: String,

    /// Prefix removed from every resolved path (e.g. "libui/")
    pub strip_prefix: Option<String>,
}

impl LocationOptions {
    /// Create location options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index file name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set the prefix stripped from resolved paths.
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            strip_prefix: None,
        }
    }
}

/// Path-resolution collaborator used by the renderer and the page writer.
pub trait LocationProvider: Send + Sync {
    /// Resolve the path of `page`.
    ///
    /// Without a context the path is relative to the output root; with one it
    /// is relative to the directory of the context page. Returns `None` when
    /// the page has no known location.
    fn resolve(&self, page: PageId, context: Option<PageId>, skip_extension: bool)
        -> Option<String>;

    /// Ancestors of `page` starting with the page itself, nearest first.
    ///
    /// Renderer-specific pages and the module root are left out.
    fn ancestors<'a>(&'a self, page: PageId) -> Box<dyn Iterator<Item = &'a Page> + 'a>;

    /// Relative path from `from` to `target`.
    fn path_between(&self, target: &Page, from: PageId) -> Result<String> {
        self.resolve(target.id, Some(from), false)
            .ok_or_else(|| Error::UnresolvedPath(target.name.clone()))
    }

    /// Extension-less output path of a page.
    fn output_path(&self, page: &Page) -> Result<String> {
        self.resolve(page.id, None, true)
            .ok_or_else(|| Error::UnresolvedPath(page.name.clone()))
    }
}

/// Default [`LocationProvider`] over a [`PageTree`].
#[derive(Debug, Clone)]
pub struct MarkdownLocationProvider<'a> {
    tree: &'a PageTree,
    options: LocationOptions,
    paths: HashMap<PageId, Vec<String>>,
}

impl<'a> MarkdownLocationProvider<'a> {
    /// Index every page of the tree.
    pub fn new(tree: &'a PageTree, options: LocationOptions) -> Self {
        let paths = tree
            .pages()
            .iter()
            .map(|page| (page.id, Self::segments(tree, page.id, &options)))
            .collect();
        Self {
            tree,
            options,
            paths,
        }
    }

    /// The tree this provider resolves against.
    pub fn tree(&self) -> &'a PageTree {
        self.tree
    }

    /// Location options in use.
    pub fn options(&self) -> &LocationOptions {
        &self.options
    }

    fn segments(tree: &PageTree, id: PageId, options: &LocationOptions) -> Vec<String> {
        let mut segments: Vec<String> = tree
            .parent_chain(id)
            .map(|page| identifier_to_filename(&page.name))
            .collect();
        segments.reverse();
        if !tree.children(id).is_empty() {
            segments.push(options.index_name.clone());
        }
        segments
    }

    fn finish(&self, mut path: String, skip_extension: bool) -> String {
        if !skip_extension {
            path.push_str(MARKDOWN_EXTENSION);
        }
        match &self.options.strip_prefix {
            Some(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(stripped) => stripped.to_string(),
                None => path,
            },
            None => path,
        }
    }
}

impl LocationProvider for MarkdownLocationProvider<'_> {
    fn resolve(
        &self,
        page: PageId,
        context: Option<PageId>,
        skip_extension: bool,
    ) -> Option<String> {
        let target = self.paths.get(&page)?;
        let path = match context {
            None => target.join("/"),
            Some(context) => {
                let from = self.paths.get(&context)?;
                relative_path(target, from)
            }
        };
        Some(self.finish(path, skip_extension))
    }

    fn ancestors<'b>(&'b self, page: PageId) -> Box<dyn Iterator<Item = &'b Page> + 'b> {
        Box::new(
            self.tree
                .parent_chain(page)
                .filter(|p| !p.is_renderer_specific() && !p.is_module()),
        )
    }
}

/// Walk from the directory of `from` to `target`.
fn relative_path(target: &[String], from: &[String]) -> String {
    let from_dir = &from[..from.len().saturating_sub(1)];
    let common = from_dir
        .iter()
        .zip(target)
        .take_while(|(a, b)| a == b)
        .count();
    let mut path = "../".repeat(from_dir.len() - common);
    path.push_str(&target[common..].join("/"));
    path
}

/// Turn a page name into a file name.
///
/// Capitals become `-` plus the lowercase letter so that names differing only
/// in case stay distinct on case-insensitive file systems. A name made only
/// of dots is wrapped in `_` so it never becomes a `.` or `..` segment.
pub fn identifier_to_filename(name: &str) -> String {
    if name.is_empty() {
        return "--root--".to_string();
    }
    if name.chars().all(|c| c == '.') {
        return format!("_{}_", name);
    }
    let mut filename = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            'A'..='Z' => {
                filename.push('-');
                filename.push(c.to_ascii_lowercase());
            }
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => filename.push('_'),
            _ => filename.push(c),
        }
    }
    filename
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, PageKind, RenderingStrategy};

    fn content() -> PageKind {
        PageKind::Content {
            content: ContentNode::text("x"),
        }
    }

    struct Fixture {
        tree: PageTree,
        module: PageId,
        window: PageId,
        show: PageId,
        button: PageId,
        list: PageId,
    }

    fn fixture() -> Fixture {
        let mut tree = PageTree::new();
        let module = tree.add_page(
            "libui",
            PageKind::Module {
                content: ContentNode::group(vec![]),
            },
            None,
        );
        let window = tree.add_page("Window", content(), Some(module));
        let show = tree.add_page("show", content(), Some(window));
        let button = tree.add_page("Button", content(), Some(module));
        let list = tree.add_page(
            "package-list",
            PageKind::RendererSpecific {
                strategy: RenderingStrategy::Write {
                    text: String::new(),
                },
            },
            Some(module),
        );
        Fixture {
            tree,
            module,
            window,
            show,
            button,
            list,
        }
    }

    #[test]
    fn test_absolute_paths() {
        let f = fixture();
        let locations = MarkdownLocationProvider::new(&f.tree, LocationOptions::new());

        assert_eq!(
            locations.resolve(f.module, None, false).as_deref(),
            Some("libui/README.md")
        );
        assert_eq!(
            locations.resolve(f.window, None, false).as_deref(),
            Some("libui/-window/README.md")
        );
        assert_eq!(
            locations.resolve(f.show, None, true).as_deref(),
            Some("libui/-window/show")
        );
        assert_eq!(
            locations.resolve(f.list, None, true).as_deref(),
            Some("libui/package-list")
        );
    }

    #[test]
    fn test_strip_prefix_applies_everywhere() {
        let f = fixture();
        let options = LocationOptions::new().with_strip_prefix("libui/");
        let locations = MarkdownLocationProvider::new(&f.tree, options);

        assert_eq!(
            locations.resolve(f.button, None, false).as_deref(),
            Some("-button.md")
        );
        assert_eq!(
            locations.output_path(f.tree.page(f.show).unwrap()).unwrap(),
            "-window/show"
        );
    }

    #[test]
    fn test_relative_paths() {
        let f = fixture();
        let locations = MarkdownLocationProvider::new(&f.tree, LocationOptions::new());

        assert_eq!(
            locations.path_between(f.tree.page(f.button).unwrap(), f.show).unwrap(),
            "../-button.md"
        );
        assert_eq!(
            locations.path_between(f.tree.page(f.show).unwrap(), f.window).unwrap(),
            "show.md"
        );
        assert_eq!(
            locations.path_between(f.tree.page(f.module).unwrap(), f.show).unwrap(),
            "../README.md"
        );
    }

    #[test]
    fn test_unknown_page_is_unresolved() {
        let f = fixture();
        let locations = MarkdownLocationProvider::new(&f.tree, LocationOptions::new());

        // A page added after the provider indexed the tree has no location.
        let mut grown = f.tree.clone();
        let late = grown.add_page("late", content(), Some(f.module));

        assert!(locations.resolve(late, None, false).is_none());
        assert!(matches!(
            locations.path_between(grown.page(late).unwrap(), f.show),
            Err(Error::UnresolvedPath(name)) if name == "late"
        ));
        assert!(matches!(
            locations.output_path(grown.page(late).unwrap()),
            Err(Error::UnresolvedPath(name)) if name == "late"
        ));
    }

    #[test]
    fn test_ancestors_skip_module_and_renderer_specific() {
        let f = fixture();
        let locations = MarkdownLocationProvider::new(&f.tree, LocationOptions::new());

        let names: Vec<&str> = locations
            .ancestors(f.show)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["show", "Window"]);
        assert_eq!(locations.ancestors(f.list).count(), 0);
    }

    #[test]
    fn test_identifier_to_filename() {
        assert_eq!(identifier_to_filename("Window"), "-window");
        assert_eq!(identifier_to_filename("getHTTPClient"), "get-h-t-t-p-client");
        assert_eq!(identifier_to_filename("a<b>"), "a_b_");
        assert_eq!(identifier_to_filename(""), "--root--");
    }

    #[test]
    fn test_dot_names_are_not_path_segments() {
        assert_eq!(identifier_to_filename("."), "_._");
        assert_eq!(identifier_to_filename(".."), "_.._");
        assert_eq!(identifier_to_filename("..."), "_..._");
        assert_eq!(identifier_to_filename(".hidden"), ".hidden");
        assert_eq!(identifier_to_filename("a..b"), "a..b");
    }
}
