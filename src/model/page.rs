//! Page types and the page tree.

use super::ContentNode;
use crate::error::Result;
use crate::render::MarkdownRenderer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a page inside a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(usize);

impl PageId {
    /// Position of the page in its tree.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Callback producing page text from the renderer and the page itself.
#[derive(Clone)]
pub struct PageCallback(Arc<dyn Fn(&MarkdownRenderer<'_>, &Page) -> String + Send + Sync>);

impl PageCallback {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MarkdownRenderer<'_>, &Page) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the callback.
    pub fn invoke(&self, renderer: &MarkdownRenderer<'_>, page: &Page) -> String {
        (self.0)(renderer, page)
    }
}

impl fmt::Debug for PageCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageCallback(..)")
    }
}

/// How a renderer-specific page produces its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderingStrategy {
    /// Copy a resource from `from` to the page path
    Copy { from: String },

    /// Write precomputed text verbatim
    Write { text: String },

    /// Produce Markdown through a callback
    #[serde(skip)]
    Callback(PageCallback),

    /// Produce nothing
    DoNothing,
}

/// What a page holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageKind {
    /// The module root page; a content page left out of breadcrumbs
    Module { content: ContentNode },

    /// An ordinary content page
    Content { content: ContentNode },

    /// A page written through a strategy instead of content
    RendererSpecific { strategy: RenderingStrategy },

    /// A structural placeholder with neither content nor strategy
    Structural,
}

/// A page in the page tree.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page identifier inside its tree
    pub id: PageId,

    /// Display name, also the source of the file name
    pub name: String,

    /// Content or strategy
    pub kind: PageKind,
}

impl Page {
    /// Content of a content or module page.
    pub fn content(&self) -> Option<&ContentNode> {
        match &self.kind {
            PageKind::Module { content } | PageKind::Content { content } => Some(content),
            _ => None,
        }
    }

    /// Strategy of a renderer-specific page.
    pub fn strategy(&self) -> Option<&RenderingStrategy> {
        match &self.kind {
            PageKind::RendererSpecific { strategy } => Some(strategy),
            _ => None,
        }
    }

    /// Whether the page is renderer specific.
    pub fn is_renderer_specific(&self) -> bool {
        matches!(self.kind, PageKind::RendererSpecific { .. })
    }

    /// Whether the page is the module root.
    pub fn is_module(&self) -> bool {
        matches!(self.kind, PageKind::Module { .. })
    }

    /// Whether other pages may link to this page.
    pub fn is_navigable(&self) -> bool {
        !matches!(self.strategy(), Some(RenderingStrategy::DoNothing))
    }
}

/// Nested page description used to build a [`PageTree`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    /// Display name
    pub name: String,

    /// Content or strategy
    #[serde(flatten)]
    pub kind: PageKind,

    /// Child pages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PageSpec>,
}

impl PageSpec {
    /// Create a page description without children.
    pub fn new(name: impl Into<String>, kind: PageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// Add a child page.
    pub fn with_child(mut self, child: PageSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Pages plus the parent relation between them.
///
/// The parent relation is a plain lookup table. It may be incomplete: a page
/// added without a parent, or with a parent id that is not in the tree, simply
/// ends its ancestor chain.
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    parents: HashMap<PageId, PageId>,
    children: HashMap<PageId, Vec<PageId>>,
    root: Option<PageId>,
}

impl PageTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a nested description. The outermost page is the root.
    pub fn from_spec(spec: PageSpec) -> Self {
        let mut tree = Self::new();
        let root = tree.insert_spec(spec, None);
        tree.root = Some(root);
        tree
    }

    /// Parse a nested page description from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: PageSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(spec))
    }

    fn insert_spec(&mut self, spec: PageSpec, parent: Option<PageId>) -> PageId {
        let id = self.add_page(spec.name, spec.kind, parent);
        for child in spec.children {
            self.insert_spec(child, Some(id));
        }
        id
    }

    /// Add a page. The first page added without a parent becomes the root.
    pub fn add_page(
        &mut self,
        name: impl Into<String>,
        kind: PageKind,
        parent: Option<PageId>,
    ) -> PageId {
        let id = PageId(self.pages.len());
        self.pages.push(Page {
            id,
            name: name.into(),
            kind,
        });
        match parent {
            Some(parent) => {
                self.parents.insert(id, parent);
                self.children.entry(parent).or_default().push(id);
            }
            None if self.root.is_none() => self.root = Some(id),
            None => {}
        }
        id
    }

    /// Look up a page.
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.0)
    }

    /// Parent of a page, if the relation has an entry for it.
    pub fn parent(&self, id: PageId) -> Option<PageId> {
        self.parents.get(&id).copied()
    }

    /// Children of a page in insertion order.
    pub fn children(&self, id: PageId) -> &[PageId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root page, if any.
    pub fn root(&self) -> Option<PageId> {
        self.root
    }

    /// All pages in insertion order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if the tree has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// First page with the given name.
    pub fn find(&self, name: &str) -> Option<PageId> {
        self.pages.iter().find(|p| p.name == name).map(|p| p.id)
    }

    /// The page itself followed by its parents, nearest first.
    pub fn parent_chain(&self, id: PageId) -> ParentChain<'_> {
        ParentChain {
            tree: self,
            next: Some(id),
            remaining: self.pages.len(),
        }
    }
}

/// Lazy walk up the parent relation. See [`PageTree::parent_chain`].
#[derive(Debug, Clone)]
pub struct ParentChain<'a> {
    tree: &'a PageTree,
    next: Option<PageId>,
    remaining: usize,
}

impl<'a> Iterator for ParentChain<'a> {
    type Item = &'a Page;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let page = self.tree.page(self.next?)?;
        self.remaining -= 1;
        self.next = self.tree.parent(page.id);
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_page(name: &str) -> PageSpec {
        PageSpec::new(
            name,
            PageKind::Content {
                content: ContentNode::text(name),
            },
        )
    }

    #[test]
    fn test_from_spec_links_parents() {
        let spec = PageSpec::new(
            "libui",
            PageKind::Module {
                content: ContentNode::group(vec![]),
            },
        )
        .with_child(content_page("Window").with_child(content_page("show")));

        let tree = PageTree::from_spec(spec);
        assert_eq!(tree.len(), 3);
        let show = tree.find("show").unwrap();
        let names: Vec<&str> = tree.parent_chain(show).map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["show", "Window", "libui"]);
        assert_eq!(tree.children(tree.root().unwrap()).len(), 1);
    }

    #[test]
    fn test_missing_parent_ends_chain() {
        let mut tree = PageTree::new();
        let root = tree.add_page("root", PageKind::Structural, None);
        let detached = tree.add_page("detached", PageKind::Structural, None);
        let orphan = tree.add_page("orphan", PageKind::Structural, Some(PageId(99)));

        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.parent_chain(detached).count(), 1);
        assert_eq!(tree.parent_chain(orphan).count(), 1);
    }

    #[test]
    fn test_navigable() {
        let mut tree = PageTree::new();
        let hidden = tree.add_page(
            "hidden",
            PageKind::RendererSpecific {
                strategy: RenderingStrategy::DoNothing,
            },
            None,
        );
        let raw = tree.add_page(
            "package-list",
            PageKind::RendererSpecific {
                strategy: RenderingStrategy::Write {
                    text: "x".to_string(),
                },
            },
            None,
        );
        assert!(!tree.page(hidden).unwrap().is_navigable());
        assert!(tree.page(raw).unwrap().is_navigable());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "libui",
            "kind": "module",
            "content": { "type": "group" },
            "children": [
                { "name": "package-list", "kind": "renderer_specific",
                  "strategy": { "type": "write", "text": "$dokka.format:gfm" } }
            ]
        }"#;
        let tree = PageTree::from_json(json).unwrap();
        assert_eq!(tree.len(), 2);
        let list = tree.page(tree.find("package-list").unwrap()).unwrap();
        assert!(matches!(
            list.strategy(),
            Some(RenderingStrategy::Write { .. })
        ));
    }

    #[test]
    fn test_from_json_accepts_unknown_node_type() {
        let json = r#"{
            "name": "libui",
            "kind": "module",
            "content": { "type": "group", "children": [
                { "type": "text", "text": "before " },
                { "type": "widget", "source_sets": ["jvm"] },
                { "type": "text", "text": "after" }
            ] }
        }"#;
        let tree = PageTree::from_json(json).unwrap();
        let root = tree.page(tree.root().unwrap()).unwrap();
        let children = root.content().unwrap().children();
        assert_eq!(children.len(), 3);
        assert!(matches!(children[1].content, crate::model::Content::Unsupported));
    }
}
