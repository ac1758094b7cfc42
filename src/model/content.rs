//! Content node types.
//!
//! A content tree is produced by an external documentation-model builder and
//! handed to the renderer read-only. Every node carries a style list, the
//! source sets it applies to, and a content-identity tag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named platform or target variant (for example `jvm` or `native`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceSet(String);

impl SourceSet {
    /// Create a source set with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Display name of the source set.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of source sets. Ordering by name keeps output deterministic.
pub type SourceSets = BTreeSet<SourceSet>;

/// Build a [`SourceSets`] from names.
pub fn source_sets<I, S>(names: I) -> SourceSets
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(SourceSet::new).collect()
}

/// Style flags attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Bold,
    Italic,
    Strong,
    Strikethrough,
    Block,
    Paragraph,
    Monospace,
}

impl Style {
    /// Emphasis marker for inline text styles, if the style has one.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Style::Bold | Style::Strong => Some("**"),
            Style::Italic => Some("*"),
            Style::Strikethrough => Some("~~"),
            Style::Block | Style::Paragraph | Style::Monospace => None,
        }
    }
}

/// Semantic role of a node, used to pick a rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Generic content
    #[default]
    Main,
    /// Code sample listing
    Sample,
    /// Parameter list
    Parameters,
    /// Declaration signature
    Symbol,
    /// Documentation comment
    Comment,
}

impl ContentKind {
    /// Tables of this kind are rendered once per source set.
    pub fn renders_per_source_set(self) -> bool {
        matches!(self, ContentKind::Sample | ContentKind::Parameters)
    }
}

/// Content-identity tag: the symbols a node documents and its semantic role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dci {
    /// Identity references, most specific first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,

    /// Semantic role
    #[serde(default)]
    pub kind: ContentKind,
}

impl Dci {
    /// Create a tag of the given kind with no references.
    pub fn of_kind(kind: ContentKind) -> Self {
        Self {
            refs: Vec::new(),
            kind,
        }
    }

    /// First identity reference, if any.
    pub fn primary_ref(&self) -> Option<&str> {
        self.refs.first().map(String::as_str)
    }
}

/// A node in the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// The variant-specific payload
    #[serde(flatten)]
    pub content: Content,

    /// Styles in application order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<Style>,

    /// Source sets this node applies to (empty = all)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub source_sets: SourceSets,

    /// Content-identity tag
    #[serde(default)]
    pub dci: Dci,
}

/// Node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text run
    Text { text: String },

    /// Hard line break
    Break,

    /// Section heading
    Header {
        level: usize,
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Link to an already resolved address
    Link {
        address: String,
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Ordered or unordered list; nested lists appear as items
    List {
        #[serde(default)]
        ordered: bool,
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Table: one header cell per column, each row is a group of cells
    Table {
        #[serde(default)]
        header: Vec<ContentNode>,
        #[serde(default)]
        rows: Vec<ContentNode>,
    },

    /// Fenced code block
    CodeBlock {
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Inline code span
    CodeInline {
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Content whose rendering differs per source set
    PlatformDependent { inner: Box<ContentNode> },

    /// Alternative renderings of the same named thing (e.g. overloads)
    Divergent { instances: Vec<DivergentInstance> },

    /// Embedded image or other resource
    Resource { address: String, alt_text: String },

    /// Plain container; styles decide the wrapping
    Group {
        #[serde(default)]
        children: Vec<ContentNode>,
    },

    /// Any `type` this renderer has no rule for
    #[serde(other)]
    Unsupported,
}

/// One alternative of a divergent group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergentInstance {
    /// Content emitted ahead of the main content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<ContentNode>,

    /// The main content
    pub divergent: ContentNode,

    /// Content emitted after the main content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<ContentNode>,

    /// Source sets the instance is scoped to
    #[serde(default)]
    pub source_sets: SourceSets,
}

impl DivergentInstance {
    /// Create an instance with only main content.
    pub fn new(divergent: ContentNode, source_sets: SourceSets) -> Self {
        Self {
            before: None,
            divergent,
            after: None,
            source_sets,
        }
    }

    /// Set the content emitted before the main content.
    pub fn with_before(mut self, before: ContentNode) -> Self {
        self.before = Some(before);
        self
    }

    /// Set the content emitted after the main content.
    pub fn with_after(mut self, after: ContentNode) -> Self {
        self.after = Some(after);
        self
    }
}

impl ContentNode {
    /// Wrap a payload with empty style, source sets and a generic tag.
    pub fn new(content: Content) -> Self {
        Self {
            content,
            style: Vec::new(),
            source_sets: SourceSets::new(),
            dci: Dci::default(),
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Content::Text { text: text.into() })
    }

    /// Create a hard line break.
    pub fn line_break() -> Self {
        Self::new(Content::Break)
    }

    /// Create a header of the given level.
    pub fn header(level: usize, children: Vec<ContentNode>) -> Self {
        Self::new(Content::Header { level, children })
    }

    /// Create a link.
    pub fn link(address: impl Into<String>, children: Vec<ContentNode>) -> Self {
        Self::new(Content::Link {
            address: address.into(),
            children,
        })
    }

    /// Create a list.
    pub fn list(ordered: bool, children: Vec<ContentNode>) -> Self {
        Self::new(Content::List { ordered, children })
    }

    /// Create a table.
    pub fn table(header: Vec<ContentNode>, rows: Vec<ContentNode>) -> Self {
        Self::new(Content::Table { header, rows })
    }

    /// Create a fenced code block.
    pub fn code_block(children: Vec<ContentNode>) -> Self {
        Self::new(Content::CodeBlock { children })
    }

    /// Create an inline code span.
    pub fn code_inline(children: Vec<ContentNode>) -> Self {
        Self::new(Content::CodeInline { children })
    }

    /// Create platform-dependent content. The node takes the inner source sets.
    pub fn platform_dependent(inner: ContentNode) -> Self {
        let source_sets = inner.source_sets.clone();
        Self::new(Content::PlatformDependent {
            inner: Box::new(inner),
        })
        .with_source_sets(source_sets)
    }

    /// Create a divergent group. The node takes the union of instance source sets.
    pub fn divergent(instances: Vec<DivergentInstance>) -> Self {
        let source_sets: SourceSets = instances
            .iter()
            .flat_map(|i| i.source_sets.iter().cloned())
            .collect();
        Self::new(Content::Divergent { instances }).with_source_sets(source_sets)
    }

    /// Create an embedded resource.
    pub fn resource(address: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self::new(Content::Resource {
            address: address.into(),
            alt_text: alt_text.into(),
        })
    }

    /// Create a group.
    pub fn group(children: Vec<ContentNode>) -> Self {
        Self::new(Content::Group { children })
    }

    /// Add a style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style.push(style);
        self
    }

    /// Replace the source sets.
    pub fn with_source_sets(mut self, source_sets: SourceSets) -> Self {
        self.source_sets = source_sets;
        self
    }

    /// Set the content kind.
    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.dci.kind = kind;
        self
    }

    /// Append an identity reference.
    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.dci.refs.push(reference.into());
        self
    }

    /// Check whether the node carries a style.
    pub fn has_style(&self, style: Style) -> bool {
        self.style.contains(&style)
    }

    /// Direct children. Leaves, tables and variant groups report none.
    pub fn children(&self) -> &[ContentNode] {
        match &self.content {
            Content::Header { children, .. }
            | Content::Link { children, .. }
            | Content::List { children, .. }
            | Content::CodeBlock { children }
            | Content::CodeInline { children }
            | Content::Group { children } => children,
            _ => &[],
        }
    }

    /// Whether the node should render under a source-set restriction.
    ///
    /// Nodes without source sets apply everywhere.
    pub fn applies_to(&self, restriction: Option<&SourceSets>) -> bool {
        match restriction {
            None => true,
            Some(_) if self.source_sets.is_empty() => true,
            Some(allowed) => self.source_sets.iter().any(|s| allowed.contains(s)),
        }
    }

    /// Whether this is a table node.
    pub fn is_table(&self) -> bool {
        matches!(self.content, Content::Table { .. })
    }

    /// Short variant name for diagnostics.
    pub fn variant_name(&self) -> &str {
        match &self.content {
            Content::Text { .. } => "text",
            Content::Break => "break",
            Content::Header { .. } => "header",
            Content::Link { .. } => "link",
            Content::List { .. } => "list",
            Content::Table { .. } => "table",
            Content::CodeBlock { .. } => "code_block",
            Content::CodeInline { .. } => "code_inline",
            Content::PlatformDependent { .. } => "platform_dependent",
            Content::Divergent { .. } => "divergent",
            Content::Resource { .. } => "resource",
            Content::Group { .. } => "group",
            Content::Unsupported => "unsupported",
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "tif", "tiff",
];

/// Check whether a resource address points at an image.
pub fn is_image_address(address: &str) -> bool {
    let path = address.split(['?', '#']).next().unwrap_or(address);
    path.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
