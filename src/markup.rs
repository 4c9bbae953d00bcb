//! Handles the one piece of inline markup that documentation comments carry
//! into the output: `<c>...</c>` code spans, which become
//! `<span class="specific-element">...</span>`.
//!
//! Comments are scanned once into [`Token`]s. A `<c>` opened inside another
//! span is folded into the outer one, and an opening tag that is never closed
//! stays plain text, so the scan always terminates and a second pass over the
//! output finds nothing left to rewrite.

use pulldown_cmark::escape::escape_html;

const OPEN: &str = "<c>";
const CLOSE: &str = "</c>";
const SPAN_OPEN: &str = r#"<span class="specific-element">"#;
const SPAN_CLOSE: &str = "</span>";

#[derive(Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),

    /// The contents of a code span, with any nested span tags removed.
    Code(String),
}

/// Splits `text` into plain text and code spans.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(OPEN) {
        let open_at = pos + offset;
        match close_of(text, open_at + OPEN.len()) {
            Some((inner, after)) => {
                if open_at > text_start {
                    tokens.push(Token::Text(&text[text_start..open_at]));
                }
                tokens.push(Token::Code(strip_tags(inner)));
                text_start = after;
                pos = after;
            }
            // Unterminated; this tag is plain text but a later one may still
            // open a span.
            None => pos = open_at + OPEN.len(),
        }
    }

    if text_start < text.len() {
        tokens.push(Token::Text(&text[text_start..]));
    }
    tokens
}

/// Finds the `</c>` matching a `<c>` whose contents start at `start`,
/// counting nested opens. Returns the contents and the index just past the
/// closing tag.
fn close_of(text: &str, start: usize) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    let mut pos = start;
    loop {
        let rest = &text[pos..];
        let next_open = rest.find(OPEN);
        let next_close = rest.find(CLOSE)?;
        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos += open + OPEN.len();
            }
            _ => {
                depth -= 1;
                let close_at = pos + next_close;
                if depth == 0 {
                    return Some((&text[start..close_at], close_at + CLOSE.len()));
                }
                pos = close_at + CLOSE.len();
            }
        }
    }
}

/// Removes span tags from `inner` until none are left. A single pass isn't
/// enough: dropping `<c>` from `<<c>c>` leaves a fresh `<c>` behind.
fn strip_tags(inner: &str) -> String {
    let mut code = inner.to_owned();
    while code.contains(OPEN) || code.contains(CLOSE) {
        code = code.replace(OPEN, "").replace(CLOSE, "");
    }
    code
}

/// Rewrites code spans into styled spans and leaves everything else
/// untouched.
pub fn normalize_code_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        match token {
            Token::Text(s) => out.push_str(s),
            Token::Code(code) => {
                out.push_str(SPAN_OPEN);
                out.push_str(&code);
                out.push_str(SPAN_CLOSE);
            }
        }
    }
    out
}

/// Renders a comment as HTML: text is escaped and code spans become styled
/// spans with escaped contents.
pub fn comment_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        // Writing into a `String` can't fail.
        let _ = match token {
            Token::Text(s) => escape_html(&mut out, s),
            Token::Code(code) => {
                out.push_str(SPAN_OPEN);
                let result = escape_html(&mut out, &code);
                out.push_str(SPAN_CLOSE);
                result
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_span() {
        assert_eq!(
            normalize_code_spans("Returns <c>true</c> when ready."),
            r#"Returns <span class="specific-element">true</span> when ready."#
        );
    }

    #[test]
    fn test_multiple_spans_stay_separate() {
        assert_eq!(
            normalize_code_spans("<c>a</c> or <c>b</c>"),
            r#"<span class="specific-element">a</span> or <span class="specific-element">b</span>"#
        );
    }

    #[test]
    fn test_nested_spans_flatten() {
        assert_eq!(
            normalize_code_spans("x <c>outer <c>inner</c> tail</c> y"),
            r#"x <span class="specific-element">outer inner tail</span> y"#
        );
    }

    #[test]
    fn test_unterminated_span_is_text() {
        assert_eq!(normalize_code_spans("a <c>b"), "a <c>b");
        assert_eq!(
            tokenize("<c><c>a</c>"),
            vec![Token::Text("<c>"), Token::Code("a".to_owned())]
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "plain",
            "<c>a</c>",
            "<c><c>a</c></c></c>",
            "<c><c>a</c>",
            "x </c> <c>y</c> <c>",
            "<c></c>",
            "<c><<c>c>x<</c>/c></c>",
        ];
        for input in inputs.iter() {
            let once = normalize_code_spans(input);
            assert_eq!(normalize_code_spans(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_tags_rebuilt_by_stripping_are_removed() {
        assert_eq!(
            normalize_code_spans("<c><<c>c>x<</c>/c></c>"),
            r#"<span class="specific-element">x</span>"#
        );
    }

    #[test]
    fn test_comment_html_leaves_nothing_to_normalize() {
        let inputs = [
            "Returns <c>true</c>.",
            "<c><<c>c>x<</c>/c></c>",
            "a <c>b",
            "x </c> <c>y</c> <c>",
        ];
        for input in inputs.iter() {
            let html = comment_html(input);
            assert_eq!(normalize_code_spans(&html), html, "input: {:?}", input);
        }
    }

    #[test]
    fn test_comment_html_escapes_text() {
        assert_eq!(
            comment_html("a < b & <c>List<T></c>"),
            r#"a &lt; b &amp; <span class="specific-element">List&lt;T&gt;</span>"#
        );
    }
}
