//! Markdown rendering for content trees.
//!
//! Every node variant has one `build_*` method that writes into a
//! [`MarkdownBuilder`]. Constructs GitHub-flavored Markdown cannot nest
//! (list items, table cells, per-source-set variants) are first rendered into
//! a fresh builder and spliced back in as plain text.

use log::warn;
use regex::Regex;

use crate::location::LocationProvider;
use crate::model::{
    is_image_address, Content, ContentKind, ContentNode, Dci, DivergentInstance, Page, PageTree,
    SourceSet, SourceSets, Style,
};

use super::builder::{build_markdown, MarkdownBuilder};
use super::RenderOptions;

/// Markdown renderer for content nodes and pages.
pub struct MarkdownRenderer<'a> {
    tree: &'a PageTree,
    locations: &'a dyn LocationProvider,
    options: RenderOptions,
    heading_markers: Regex,
}

impl<'a> MarkdownRenderer<'a> {
    /// Create a new Markdown renderer.
    pub fn new(
        tree: &'a PageTree,
        locations: &'a dyn LocationProvider,
        options: RenderOptions,
    ) -> Self {
        Self {
            tree,
            locations,
            options,
            heading_markers: Regex::new(r"(?m)^#{1,6} ").expect("valid heading marker pattern"),
        }
    }

    /// Options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Page tree the renderer works on.
    pub fn tree(&self) -> &'a PageTree {
        self.tree
    }

    /// Location provider used for navigation links.
    pub fn locations(&self) -> &'a dyn LocationProvider {
        self.locations
    }

    /// Render the full text of a content page: breadcrumb, then content.
    pub fn render_page_content(&self, page: &Page) -> String {
        build_markdown(|b| {
            if self.options.breadcrumbs {
                self.build_navigation(b, page);
            }
            if let Some(content) = page.content() {
                self.build_node(b, content, None);
            }
        })
    }

    /// Render a single node with no source-set restriction.
    pub fn render_node(&self, node: &ContentNode) -> String {
        build_markdown(|b| self.build_node(b, node, None))
    }

    fn render_restricted(&self, node: &ContentNode, restriction: Option<&SourceSets>) -> String {
        build_markdown(|b| self.build_node(b, node, restriction))
    }

    /// Render `node` into `b`, skipping it when it does not apply to `restriction`.
    pub fn build_node(
        &self,
        b: &mut MarkdownBuilder,
        node: &ContentNode,
        restriction: Option<&SourceSets>,
    ) {
        if !node.applies_to(restriction) {
            return;
        }
        match &node.content {
            Content::Text { text } => self.build_text(b, text, &node.style),
            Content::Break => b.append_new_line(),
            Content::Header { level, children } => {
                self.build_header(b, *level, children, restriction)
            }
            Content::Link { address, children } => {
                self.build_link(b, address, |b| self.build_children(b, children, restriction))
            }
            Content::List { ordered, children } => self.build_list(b, *ordered, children),
            Content::Table { header, rows } => self.build_table(b, node, header, rows, restriction),
            Content::CodeBlock { children } => self.build_code_block(b, children, restriction),
            Content::CodeInline { children } => {
                b.enter_verbatim();
                self.build_children(b, children, restriction);
                b.exit_verbatim();
            }
            Content::PlatformDependent { inner } => {
                self.build_platform_dependent(b, inner, &node.source_sets)
            }
            Content::Divergent { instances } => self.build_divergent(b, instances, restriction),
            Content::Resource { address, alt_text } => self.build_resource(b, address, alt_text),
            Content::Group { children } => self.build_group(b, node, children, restriction),
            Content::Unsupported => self.build_error(node),
        }
    }

    fn build_children(
        &self,
        b: &mut MarkdownBuilder,
        children: &[ContentNode],
        restriction: Option<&SourceSets>,
    ) {
        for child in children {
            self.build_node(b, child, restriction);
        }
    }

    fn build_group(
        &self,
        b: &mut MarkdownBuilder,
        node: &ContentNode,
        children: &[ContentNode],
        restriction: Option<&SourceSets>,
    ) {
        if node.has_style(Style::Monospace) {
            b.enter_verbatim();
            self.build_children(b, children, restriction);
            b.exit_verbatim();
            b.append_new_line();
        } else if node.has_style(Style::Block) {
            self.build_children(b, children, restriction);
            b.append_new_line();
        } else if node.has_style(Style::Paragraph) {
            b.append_new_line();
            self.build_children(b, children, restriction);
            b.append_new_line();
        } else {
            self.build_children(b, children, restriction);
        }
    }

    fn build_header(
        &self,
        b: &mut MarkdownBuilder,
        level: usize,
        children: &[ContentNode],
        restriction: Option<&SourceSets>,
    ) {
        b.append_new_line();
        b.append_non_verbatim(&format!("{} ", "#".repeat(level.clamp(1, 6))));
        self.build_children(b, children, restriction);
        b.append_new_line();
    }

    fn build_link<F>(&self, b: &mut MarkdownBuilder, address: &str, content: F)
    where
        F: FnOnce(&mut MarkdownBuilder),
    {
        b.append_non_verbatim("[");
        content(b);
        b.append_non_verbatim(&format!("]({})", address));
    }

    fn build_list(&self, b: &mut MarkdownBuilder, ordered: bool, items: &[ContentNode]) {
        let (open, close) = if ordered {
            ("<ol>", "</ol>")
        } else {
            ("<ul>", "</ul>")
        };
        b.append_non_verbatim(open);
        for item in items {
            match &item.content {
                Content::List { ordered, children } => self.build_list(b, *ordered, children),
                _ => {
                    let text = self.render_restricted(item, own_restriction(&item.source_sets));
                    b.append_non_verbatim("<li>");
                    b.append_non_verbatim(text.trim());
                    b.append_non_verbatim("</li>");
                }
            }
        }
        b.append_non_verbatim(close);
    }

    fn build_table(
        &self,
        b: &mut MarkdownBuilder,
        node: &ContentNode,
        header: &[ContentNode],
        rows: &[ContentNode],
        restriction: Option<&SourceSets>,
    ) {
        b.append_new_line();
        if node.dci.kind.renders_per_source_set() {
            for source_set in &node.source_sets {
                b.append(source_set.name());
                b.append_new_line();
                let table = table_for_source_set(node, header, rows, source_set);
                self.build_node(b, &table, restriction);
                b.append_new_line();
            }
            return;
        }

        let columns = if header.is_empty() {
            rows.iter().map(|r| r.children().len()).max().unwrap_or(0)
        } else {
            header.len()
        };
        if columns == 0 {
            return;
        }

        let header_cells: Vec<String> = header
            .iter()
            .map(|cell| {
                let text = self.render_restricted(cell, own_restriction(&cell.source_sets));
                with_enters_as_html(text.trim())
            })
            .collect();
        b.append_non_verbatim(&table_row(header_cells, columns));
        b.append_new_line();
        b.append_non_verbatim(&"|---".repeat(columns));
        b.append_non_verbatim("|");
        b.append_new_line();

        for row in rows {
            if let Some(filter) = &self.options.row_filter {
                if filter.skips(row) {
                    continue;
                }
            }
            let cells = row.children();
            if cells.len() > columns {
                warn!(
                    "Table row has {} cells but the table has {} columns; extra cells dropped",
                    cells.len(),
                    columns
                );
            }
            let rendered: Vec<String> = cells
                .iter()
                .take(columns)
                .map(|cell| self.cell_text(cell))
                .collect();
            b.append_non_verbatim(&table_row(rendered, columns));
            b.append_new_line();
        }
    }

    /// Render one body cell on a single line.
    fn cell_text(&self, cell: &ContentNode) -> String {
        let mut text = String::new();
        if self.options.cell_anchors {
            if let Some(reference) = cell.dci.primary_ref() {
                text.push_str(&format!("<a name=\"{}\"></a>", reference));
            }
        }
        let rendered = self.render_node(cell);
        // Headings cannot live inside a table cell.
        let rendered = self.heading_markers.replace_all(&rendered, "");
        text.push_str(rendered.trim());
        with_enters_as_html(&text)
    }

    fn build_code_block(
        &self,
        b: &mut MarkdownBuilder,
        children: &[ContentNode],
        restriction: Option<&SourceSets>,
    ) {
        b.append_non_verbatim(&format!("```{}", self.options.code_language));
        b.append_new_line();
        b.enter_fence();
        self.build_children(b, children, restriction);
        b.exit_fence();
        if !b.at_line_start() {
            b.append_new_line();
        }
        b.append_non_verbatim("```");
    }

    fn build_platform_dependent(
        &self,
        b: &mut MarkdownBuilder,
        inner: &ContentNode,
        source_sets: &SourceSets,
    ) {
        let has_table = inner.is_table() || inner.children().iter().any(ContentNode::is_table);
        if has_table {
            // Tables split themselves by source set.
            self.build_node(b, inner, own_restriction(source_sets));
            return;
        }

        let mut distinct: Vec<(String, SourceSets)> = Vec::new();
        if source_sets.is_empty() {
            distinct.push((self.render_node(inner), SourceSets::new()));
        }
        for source_set in source_sets {
            let only = single(source_set);
            let text = self.render_restricted(inner, Some(&only));
            match distinct.iter_mut().find(|(existing, _)| *existing == text) {
                Some((_, sets)) => {
                    sets.insert(source_set.clone());
                }
                None => distinct.push((text, only)),
            }
        }

        for (text, sets) in distinct.iter().filter(|(text, _)| !text.trim().is_empty()) {
            if self.options.tag_platform_content && !sets.is_empty() {
                b.append_non_verbatim(&source_set_tags(sets));
                b.append_non_verbatim(" ");
            }
            b.append_non_verbatim(text.trim());
            b.append_new_line();
        }
    }

    fn build_divergent(
        &self,
        b: &mut MarkdownBuilder,
        instances: &[DivergentInstance],
        restriction: Option<&SourceSets>,
    ) {
        let mut groups: Vec<((String, String), Vec<Member<'_>>)> = Vec::new();
        for instance in instances {
            for source_set in instance_source_sets(instance, restriction) {
                let only = source_set.map(single);
                let before = instance
                    .before
                    .as_ref()
                    .map(|n| self.render_restricted(n, only.as_ref()))
                    .unwrap_or_default();
                let after = instance
                    .after
                    .as_ref()
                    .map(|n| self.render_restricted(n, only.as_ref()))
                    .unwrap_or_default();
                let key = (before, after);
                let member = Member {
                    instance,
                    source_set,
                };
                match groups.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, members)) => members.push(member),
                    None => groups.push((key, vec![member])),
                }
            }
        }

        for (_, members) in &groups {
            self.build_divergent_group(b, members);
        }
    }

    fn build_divergent_group(&self, b: &mut MarkdownBuilder, members: &[Member<'_>]) {
        let Some(first) = members.first() else {
            return;
        };
        let instance = first.instance;
        let sets = member_source_sets(members);
        // Content scoped to several source sets is rendered for the first one
        // only, so it is emitted exactly once.
        let first_only = first.source_set.map(single);

        if !sets.is_empty() {
            b.append_non_verbatim(&source_set_tags(&sets));
            b.append_new_line();
        }

        if let Some(before) = &instance.before {
            if self.options.divergent_labels {
                b.append("Brief description");
                b.append_new_line();
            }
            self.build_node(b, before, first_only.as_ref());
            b.append_new_line();
        }

        if self.options.divergent_labels {
            b.append("Content");
            b.append_new_line();
        }
        let mut bodies: Vec<(String, Vec<Member<'_>>)> = Vec::new();
        for member in members {
            let only = member.source_set.map(single);
            let text = self.render_restricted(&member.instance.divergent, only.as_ref());
            match bodies.iter_mut().find(|(existing, _)| *existing == text) {
                Some((_, same)) => same.push(*member),
                None => bodies.push((text, vec![*member])),
            }
        }
        for (_, same) in &bodies {
            let inner_sets = member_source_sets(same);
            if sets.len() > 1 && !inner_sets.is_empty() {
                b.append_non_verbatim(&source_set_tags(&inner_sets));
                b.append_new_line();
            }
            let representative = same[0];
            let only = representative.source_set.map(single);
            self.build_node(b, &representative.instance.divergent, only.as_ref());
            b.append_new_line();
        }

        if let Some(after) = &instance.after {
            if self.options.divergent_labels {
                b.append("More info");
                b.append_new_line();
            }
            self.build_node(b, after, first_only.as_ref());
            b.append_new_line();
        }

        b.append_new_line();
    }

    fn build_resource(&self, b: &mut MarkdownBuilder, address: &str, alt_text: &str) {
        if is_image_address(address) {
            b.append_non_verbatim("!");
        }
        b.append_non_verbatim(&format!("[{}]({})", alt_text, address));
    }

    fn build_text(&self, b: &mut MarkdownBuilder, text: &str, styles: &[Style]) {
        if text.trim().is_empty() {
            return;
        }
        let core = text.trim();
        let leading = text.len() - text.trim_start_matches(' ').len();
        let trailing = text.len() - text.trim_end_matches(' ').len();

        let markers: Vec<&str> = if b.is_verbatim() {
            Vec::new()
        } else {
            styles.iter().filter_map(|s| s.marker()).collect()
        };

        b.append(&text[..leading]);
        for marker in &markers {
            b.append(marker);
        }
        if self.options.escape_special_chars && !b.is_verbatim() {
            b.append(&escape_markdown(core));
        } else {
            b.append(core);
        }
        for marker in markers.iter().rev() {
            b.append(marker);
        }
        b.append(&text[text.len() - trailing..]);
    }

    /// Render the breadcrumb of `page`: ancestors from the top down to the page.
    pub fn build_navigation(&self, b: &mut MarkdownBuilder, page: &Page) {
        let mut chain: Vec<&Page> = self.locations.ancestors(page.id).collect();
        if chain.is_empty() {
            return;
        }
        chain.reverse();
        for node in chain {
            b.append_non_verbatim("/");
            if !node.is_navigable() {
                b.append(&node.name);
                continue;
            }
            match self.locations.path_between(node, page.id) {
                Ok(address) => self.build_link(b, &address, |b| b.append(&node.name)),
                Err(e) => {
                    warn!("Breadcrumb for {} has no link to {}: {}", page.name, node.name, e);
                    b.append(&node.name);
                }
            }
        }
        b.append_new_line();
    }

    fn build_error(&self, node: &ContentNode) {
        warn!(
            "Markdown renderer has encountered problem. The unmatched node is {}",
            node.variant_name()
        );
    }
}

/// One (instance, source set) pair of a divergent group.
#[derive(Clone, Copy)]
struct Member<'n> {
    instance: &'n DivergentInstance,
    source_set: Option<&'n SourceSet>,
}

/// Source sets an instance renders for. An instance without source sets
/// renders once, unrestricted.
fn instance_source_sets<'n>(
    instance: &'n DivergentInstance,
    restriction: Option<&SourceSets>,
) -> Vec<Option<&'n SourceSet>> {
    if instance.source_sets.is_empty() {
        return vec![None];
    }
    instance
        .source_sets
        .iter()
        .filter(|s| restriction.map_or(true, |r| r.contains(*s)))
        .map(Some)
        .collect()
}

fn member_source_sets(members: &[Member<'_>]) -> SourceSets {
    members
        .iter()
        .filter_map(|m| m.source_set.cloned())
        .collect()
}

fn single(source_set: &SourceSet) -> SourceSets {
    SourceSets::from([source_set.clone()])
}

fn own_restriction(source_sets: &SourceSets) -> Option<&SourceSets> {
    if source_sets.is_empty() {
        None
    } else {
        Some(source_sets)
    }
}

/// Copy of a per-source-set table with only the rows for `source_set`,
/// retagged as a generic table.
fn table_for_source_set(
    node: &ContentNode,
    header: &[ContentNode],
    rows: &[ContentNode],
    source_set: &SourceSet,
) -> ContentNode {
    let rows = rows
        .iter()
        .filter(|row| row.source_sets.contains(source_set))
        .cloned()
        .collect();
    ContentNode {
        content: Content::Table {
            header: header.to_vec(),
            rows,
        },
        style: node.style.clone(),
        source_sets: node.source_sets.clone(),
        dci: Dci {
            refs: node.dci.refs.clone(),
            kind: ContentKind::Main,
        },
    }
}

/// Format one table row, padding with empty cells up to `columns`.
fn table_row(mut cells: Vec<String>, columns: usize) -> String {
    cells.resize(columns, String::new());
    let mut row = String::new();
    for cell in &cells {
        row.push_str("| ");
        if !cell.is_empty() {
            row.push_str(&escape_cell_pipes(cell));
            row.push(' ');
        }
    }
    row.push('|');
    row
}

fn source_set_tags(sets: &SourceSets) -> String {
    let names: Vec<&str> = sets.iter().map(SourceSet::name).collect();
    format!("[{}]", names.join(", "))
}

fn with_enters_as_html(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Escape `|` inside a cell. GFM splits cells on a bare pipe even within a
/// code span. Pipes already escaped are left alone.
fn escape_cell_pipes(cell: &str) -> String {
    let mut result = String::with_capacity(cell.len());
    let mut backslashes = 0;
    for c in cell.chars() {
        if c == '|' && backslashes % 2 == 0 {
            result.push('\\');
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        result.push(c);
    }
    result
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
