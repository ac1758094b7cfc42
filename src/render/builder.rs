//! Accumulating Markdown text buffer.
//!
//! The builder tracks whether text is being emitted inside a code span and
//! inserts the backtick delimiters itself. Content for one span is often
//! appended across several recursive calls, so the open/closed state lives
//! here rather than at every call site.
//!
//! Invariant: the delimiter is open iff the verbatim depth is positive and a
//! non-empty string has been appended since entering verbatim mode (or since
//! the last forced close).

/// Delimiter around inline code spans.
pub const VERBATIM_DELIMITER: &str = "`";

/// Markdown text buffer with verbatim span tracking.
#[derive(Debug, Clone, Default)]
pub struct MarkdownBuilder {
    text: String,
    verbatim_depth: usize,
    delimiter_open: bool,
    fence_depth: usize,
}

impl MarkdownBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text, opening the code span delimiter first if needed.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.verbatim_depth > 0 && self.fence_depth == 0 && !self.delimiter_open {
            self.text.push_str(VERBATIM_DELIMITER);
            self.delimiter_open = true;
        }
        self.text.push_str(text);
    }

    /// Append structural markup that must stay outside any open code span.
    pub fn append_non_verbatim(&mut self, text: &str) {
        self.close_delimiter();
        self.text.push_str(text);
    }

    /// Append a line break. Code spans never cross lines.
    pub fn append_new_line(&mut self) {
        self.close_delimiter();
        self.text.push('\n');
    }

    /// Enter a verbatim span. Nested spans share one delimiter pair.
    pub fn enter_verbatim(&mut self) {
        self.verbatim_depth += 1;
    }

    /// Leave a verbatim span; the outermost exit closes the delimiter.
    pub fn exit_verbatim(&mut self) {
        self.verbatim_depth = self.verbatim_depth.saturating_sub(1);
        if self.verbatim_depth == 0 {
            self.close_delimiter();
        }
    }

    /// Enter a fenced code block.
    ///
    /// Inside a fence text is already literal, so verbatim spans emit no
    /// delimiters while styling stays suppressed.
    pub fn enter_fence(&mut self) {
        self.close_delimiter();
        self.fence_depth += 1;
    }

    /// Leave a fenced code block.
    pub fn exit_fence(&mut self) {
        self.fence_depth = self.fence_depth.saturating_sub(1);
    }

    /// Whether text styling and escaping are currently suppressed.
    pub fn is_verbatim(&self) -> bool {
        self.verbatim_depth > 0 || self.fence_depth > 0
    }

    /// Current verbatim nesting depth.
    pub fn verbatim_depth(&self) -> usize {
        self.verbatim_depth
    }

    /// Whether a code span delimiter is currently open.
    pub fn is_delimiter_open(&self) -> bool {
        self.delimiter_open
    }

    /// Whether the text so far ends a line (or is empty).
    pub fn at_line_start(&self) -> bool {
        self.text.is_empty() || self.text.ends_with('\n')
    }

    /// Text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the accumulated text, including a delimiter that is still open.
    pub fn extract_text(self) -> String {
        self.text
    }

    fn close_delimiter(&mut self) {
        if self.delimiter_open {
            self.text.push_str(VERBATIM_DELIMITER);
            self.delimiter_open = false;
        }
    }
}

/// Run `f` against a fresh builder and return its text.
pub fn build_markdown<F>(f: F) -> String
where
    F: FnOnce(&mut MarkdownBuilder),
{
    let mut builder = MarkdownBuilder::new();
    f(&mut builder);
    builder.extract_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_delimiters() {
        let text = build_markdown(|b| {
            b.append("hello");
            b.append_non_verbatim(" [");
            b.append_new_line();
        });
        assert_eq!(text, "hello [\n");
    }

    #[test]
    fn test_verbatim_span_opens_lazily() {
        let text = build_markdown(|b| {
            b.enter_verbatim();
            assert!(!b.is_delimiter_open());
            b.append("foo");
            assert!(b.is_delimiter_open());
            b.exit_verbatim();
        });
        assert_eq!(text, "`foo`");
    }

    #[test]
    fn test_empty_verbatim_span_emits_nothing() {
        let text = build_markdown(|b| {
            b.enter_verbatim();
            b.append("");
            b.exit_verbatim();
        });
        assert_eq!(text, "");
    }

    #[test]
    fn test_nested_spans_share_delimiters() {
        let text = build_markdown(|b| {
            b.enter_verbatim();
            b.append("a");
            b.enter_verbatim();
            b.append("b");
            b.exit_verbatim();
            assert!(b.is_delimiter_open());
            b.append("c");
            b.exit_verbatim();
        });
        assert_eq!(text, "`abc`");
    }

    #[test]
    fn test_structural_markup_closes_and_reopens() {
        let text = build_markdown(|b| {
            b.enter_verbatim();
            b.append_non_verbatim("[");
            b.append("X");
            b.append_non_verbatim("](a/b)");
            b.append(" more");
            b.exit_verbatim();
        });
        assert_eq!(text, "[`X`](a/b)` more`");
    }

    #[test]
    fn test_new_line_closes_span() {
        let text = build_markdown(|b| {
            b.enter_verbatim();
            b.append("one");
            b.append_new_line();
            b.append("two");
            b.exit_verbatim();
        });
        assert_eq!(text, "`one`\n`two`");
    }

    #[test]
    fn test_exit_clamps_at_zero() {
        let mut b = MarkdownBuilder::new();
        b.exit_verbatim();
        b.exit_verbatim();
        assert_eq!(b.verbatim_depth(), 0);
        b.append("plain");
        assert_eq!(b.extract_text(), "plain");
    }

    #[test]
    fn test_extract_keeps_open_delimiter() {
        let mut b = MarkdownBuilder::new();
        b.enter_verbatim();
        b.append("partial");
        assert_eq!(b.extract_text(), "`partial");
    }

    #[test]
    fn test_fence_suppresses_delimiters() {
        let text = build_markdown(|b| {
            b.enter_fence();
            b.enter_verbatim();
            b.append("val x = 1");
            b.exit_verbatim();
            assert!(b.is_verbatim());
            b.exit_fence();
        });
        assert_eq!(text, "val x = 1");
    }

    #[test]
    fn test_delimiters_balance_over_call_sequences() {
        // Each op: 0 = enter, 1 = exit, 2 = append, 3 = newline.
        let sequences: [&[u8]; 5] = [
            &[0, 2, 2, 1],
            &[0, 0, 2, 1, 2, 1],
            &[0, 2, 3, 2, 1, 2],
            &[2, 0, 1, 0, 2, 1, 2],
            &[0, 2, 0, 3, 2, 1, 2, 1, 1],
        ];
        for ops in sequences {
            let mut b = MarkdownBuilder::new();
            for op in ops {
                match op {
                    0 => b.enter_verbatim(),
                    1 => b.exit_verbatim(),
                    2 => b.append("x"),
                    _ => b.append_new_line(),
                }
            }
            while b.verbatim_depth() > 0 {
                b.exit_verbatim();
            }
            let text = b.extract_text();
            for line in text.lines() {
                assert_eq!(line.matches('`').count() % 2, 0, "unbalanced: {text:?}");
            }
        }
    }
}
