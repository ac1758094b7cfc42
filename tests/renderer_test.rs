//! Integration tests for the Markdown node renderer.

use gfmdoc::model::{source_sets, ContentKind, ContentNode, DivergentInstance, PageTree, Style};
use gfmdoc::{LocationOptions, MarkdownLocationProvider, MarkdownRenderer, RenderOptions};

fn render_with(node: &ContentNode, options: RenderOptions) -> String {
    let tree = PageTree::new();
    let locations = MarkdownLocationProvider::new(&tree, LocationOptions::new());
    let renderer = MarkdownRenderer::new(&tree, &locations, options);
    renderer.render_node(node)
}

fn render(node: &ContentNode) -> String {
    render_with(node, RenderOptions::new())
}

fn text(s: &str) -> ContentNode {
    ContentNode::text(s)
}

#[test]
fn test_header_scenario() {
    let node = ContentNode::header(2, vec![text("Overview")]);
    assert_eq!(render(&node), "\n## Overview\n");
}

#[test]
fn test_code_inline_scenario() {
    let node = ContentNode::code_inline(vec![text("foo")]);
    assert_eq!(render(&node), "`foo`");
}

#[test]
fn test_link_inside_code_span_scenario() {
    let node = ContentNode::code_inline(vec![ContentNode::link("a/b", vec![text("X")])]);
    let out = render(&node);
    assert!(out.contains("[`X`](a/b)"), "got {out:?}");
    assert_eq!(out.matches('`').count(), 2);
}

#[test]
fn test_table_padding_scenario() {
    let node = ContentNode::table(
        vec![text("A"), text("B")],
        vec![ContentNode::group(vec![text("1")])],
    );
    let out = render(&node);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["", "| A | B |", "|---|---|", "| 1 | |"]);
}

#[test]
fn test_every_row_has_column_count_separators() {
    let node = ContentNode::table(
        vec![],
        vec![
            ContentNode::group(vec![text("a")]),
            ContentNode::group(vec![text("b"), text("c"), text("d")]),
            ContentNode::group(vec![]),
        ],
    );
    let out = render(&node);
    for line in out.lines().filter(|l| !l.is_empty()) {
        assert_eq!(line.matches('|').count(), 4, "row {line:?}");
    }
}

#[test]
fn test_table_cell_flattens_nested_markup() {
    let cell = ContentNode::group(vec![
        ContentNode::header(2, vec![text("Title")]),
        ContentNode::group(vec![text("first")]).with_style(Style::Paragraph),
        ContentNode::code_inline(vec![text("x|y")]),
    ]);
    let node = ContentNode::table(vec![text("Doc")], vec![ContentNode::group(vec![cell])]);
    let out = render(&node);
    let row = out.lines().last().unwrap();
    assert!(!row.contains('#'));
    assert!(row.starts_with("| Title<br>"), "got {row:?}");
    assert!(row.contains("`x\\|y`"), "got {row:?}");
}

#[test]
fn test_platform_dependent_dedup() {
    let inner = ContentNode::group(vec![
        text("shared").with_source_sets(source_sets(["jvm", "js"])),
        text(" ").with_source_sets(source_sets(["native"])),
    ])
    .with_source_sets(source_sets(["jvm", "js", "native"]));
    let node = ContentNode::platform_dependent(inner);
    let out = render(&node);
    assert_eq!(out, "[js, jvm] shared\n");
    assert_eq!(out.matches("shared").count(), 1);
}

#[test]
fn test_platform_dependent_with_table_renders_once() {
    let table = ContentNode::table(
        vec![text("Name")],
        vec![ContentNode::group(vec![text("close")])],
    )
    .with_source_sets(source_sets(["jvm", "native"]));
    let node = ContentNode::platform_dependent(ContentNode::group(vec![table]));
    let out = render(&node);
    assert_eq!(out.matches("| close |").count(), 1);
}

#[test]
fn test_divergent_dedup_across_disjoint_source_sets() {
    let body = |set: &str| text("fun close()").with_source_sets(source_sets([set]));
    let node = ContentNode::divergent(vec![
        DivergentInstance::new(body("jvm"), source_sets(["jvm"])),
        DivergentInstance::new(body("native"), source_sets(["native"])),
    ]);
    let out = render_with(&node, RenderOptions::new().with_divergent_labels(false));
    assert_eq!(out.matches("fun close()").count(), 1);
    assert!(out.starts_with("[jvm, native]\n"));
}

#[test]
fn test_divergent_distinct_bodies_stay_apart() {
    let node = ContentNode::divergent(vec![
        DivergentInstance::new(
            text("fun close()").with_source_sets(source_sets(["jvm"])),
            source_sets(["jvm"]),
        ),
        DivergentInstance::new(
            text("fun close(force: Boolean)").with_source_sets(source_sets(["native"])),
            source_sets(["native"]),
        ),
    ]);
    let out = render_with(&node, RenderOptions::new().with_divergent_labels(false));
    assert!(out.contains("[jvm, native]\n"));
    assert!(out.contains("fun close()"));
    assert!(out.contains("fun close(force: Boolean)"));
}

#[test]
fn test_parameter_table_renders_per_source_set() {
    let row = |name: &str, sets: &[&str]| {
        ContentNode::group(vec![text(name)]).with_source_sets(source_sets(sets.iter().copied()))
    };
    let node = ContentNode::table(
        vec![],
        vec![row("title", &["jvm", "native"]), row("handle", &["native"])],
    )
    .with_kind(ContentKind::Parameters)
    .with_source_sets(source_sets(["jvm", "native"]));

    let out = render(&node);
    let jvm = out.find("jvm\n").unwrap();
    let native = out.find("native\n").unwrap();
    assert!(jvm < native);
    assert!(!out[jvm..native].contains("handle"));
    assert!(out[native..].contains("| handle |"));
}

#[test]
fn test_styled_text_inside_code_block_stays_plain() {
    let node = ContentNode::code_block(vec![
        text("val x = 1").with_style(Style::Bold),
        ContentNode::line_break(),
        ContentNode::code_inline(vec![text("x")]),
    ]);
    assert_eq!(render(&node), "```kotlin\nval x = 1\nx\n```");
}

#[test]
fn test_image_resource() {
    assert_eq!(
        render(&ContentNode::resource("images/logo.png", "logo")),
        "![logo](images/logo.png)"
    );
    assert_eq!(
        render(&ContentNode::resource("files/spec.pdf", "spec")),
        "[spec](files/spec.pdf)"
    );
}

#[test]
fn test_rendering_is_idempotent() {
    let node = ContentNode::group(vec![
        ContentNode::header(1, vec![text("Window")]),
        ContentNode::platform_dependent(ContentNode::group(vec![
            text("on jvm").with_source_sets(source_sets(["jvm"])),
            text("on js").with_source_sets(source_sets(["js"])),
        ])
        .with_source_sets(source_sets(["jvm", "js"]))),
        ContentNode::list(false, vec![text("one"), text("two")]),
    ]);
    assert_eq!(render(&node), render(&node));
}
