//! Markup repair ahead of tokenization.
//!
//! Markdown passes raw HTML through untouched, so the expanded document can
//! hold a bare `&`, a `<` that opens no tag, or a comment that never ends.
//! The XML pull reader rejects all of these (or swallows the text after
//! them), so they are escaped here and survive as literal text.

use std::borrow::Cow;

/// What to do with the markup starting at a `<` or `&`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repair {
    /// Well-formed: keep this many bytes as written.
    Keep(usize),
    /// Complete but without content (comment, doctype, processing instruction).
    Drop(usize),
    /// Not markup: replace the single leading character with an entity.
    Escape(&'static str),
}

/// Escape stray markup characters so every `<` starts a complete tag and
/// every `&` a terminated reference.
///
/// Complete comments, doctype declarations and processing instructions are
/// removed. Tags, references and CDATA sections are kept byte for byte, so
/// well-formed input is returned borrowed.
///
/// # Example
///
/// ```
/// use scribe_rtf::repair_html;
///
/// assert_eq!(repair_html("<p>AT&T</p>"), "<p>AT&amp;T</p>");
/// assert_eq!(repair_html("<p>a &lt; b</p>"), "<p>a &lt; b</p>");
/// ```
#[must_use]
pub fn repair_html(html: &str) -> Cow<'_, str> {
    let mut repaired: Option<String> = None;
    let mut copied = 0;
    let mut pos = 0;

    while let Some(offset) = html[pos..].find(['<', '&']) {
        let start = pos + offset;
        let rest = &html[start..];
        let repair = if rest.starts_with('&') {
            reference_len(rest).map_or(Repair::Escape("&amp;"), Repair::Keep)
        } else {
            markup(rest)
        };

        match repair {
            Repair::Keep(len) => pos = start + len,
            Repair::Drop(len) => {
                let out = repaired.get_or_insert_with(|| String::with_capacity(html.len()));
                out.push_str(&html[copied..start]);
                copied = start + len;
                pos = copied;
            }
            Repair::Escape(entity) => {
                let out = repaired.get_or_insert_with(|| String::with_capacity(html.len() + 16));
                out.push_str(&html[copied..start]);
                out.push_str(entity);
                copied = start + 1;
                pos = copied;
            }
        }
    }

    match repaired {
        Some(mut out) => {
            out.push_str(&html[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(html),
    }
}

/// Length of a terminated `&name;`, `&#123;` or `&#x1F;` reference.
fn reference_len(rest: &str) -> Option<usize> {
    let after_amp = &rest[1..];
    let name = after_amp.strip_prefix('#').unwrap_or(after_amp);
    let name_len = name.bytes().take_while(u8::is_ascii_alphanumeric).count();
    let terminated = name_len > 0 && name.as_bytes().get(name_len) == Some(&b';');
    terminated.then(|| rest.len() - name.len() + name_len + 1)
}

/// Classify the markup at a `<`.
fn markup(rest: &str) -> Repair {
    const LT: Repair = Repair::Escape("&lt;");
    let after = &rest[1..];

    if let Some(comment) = after.strip_prefix("!--") {
        return comment
            .find("-->")
            .map_or(LT, |end| Repair::Drop("<!--".len() + end + "-->".len()));
    }
    if after.starts_with("![CDATA[") {
        return after
            .find("]]>")
            .map_or(LT, |end| Repair::Keep(1 + end + "]]>".len()));
    }
    if after.starts_with('!') || after.starts_with('?') {
        let close = if after.starts_with('?') { "?>" } else { ">" };
        return after
            .find(close)
            .map_or(LT, |end| Repair::Drop(1 + end + close.len()));
    }
    if let Some(name) = after.strip_prefix('/') {
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return LT;
        }
        return name.find('>').map_or(LT, |end| Repair::Keep(2 + end + 1));
    }

    if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return LT;
    }
    let name_len = after
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_'))
        .count();
    let attrs = &after[name_len..];
    if !(attrs.is_empty() || attrs.starts_with(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')) {
        return LT;
    }
    tag_end(attrs).map_or(LT, |end| Repair::Keep(1 + name_len + end + 1))
}

/// Offset of the `>` closing a start tag, skipping quoted attribute values.
fn tag_end(attrs: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, byte) in attrs.bytes().enumerate() {
        match (quote, byte) {
            (Some(open), b) if b == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(idx),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_formed_markup_borrowed() {
        let html = "<p class=\"x\">a &amp; b &#8217; &#x2014;<br />\n<![CDATA[<raw>]]></p>";
        assert!(matches!(repair_html(html), Cow::Borrowed(_)));
    }

    #[test]
    fn test_bare_ampersand_escaped() {
        assert_eq!(repair_html("<div>AT&T rocks</div>"), "<div>AT&amp;T rocks</div>");
        assert_eq!(repair_html("a && b &;"), "a &amp;&amp; b &amp;;");
    }

    #[test]
    fn test_unknown_named_reference_kept() {
        assert_eq!(repair_html("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_less_than_without_tag_escaped() {
        assert_eq!(
            repair_html("<p>if a < b then</p>"),
            "<p>if a &lt; b then</p>"
        );
        assert_eq!(repair_html("x <3 y <> z"), "x &lt;3 y &lt;> z");
        assert_eq!(repair_html("if (a<b)"), "if (a&lt;b)");
    }

    #[test]
    fn test_unterminated_tag_escaped() {
        assert_eq!(repair_html("<p>end <br"), "<p>end &lt;br");
        assert_eq!(repair_html(r#"<a href="x>y"#), r#"&lt;a href="x>y"#);
        assert_eq!(repair_html("</p"), "&lt;/p");
    }

    #[test]
    fn test_quoted_greater_than_inside_tag() {
        let html = r#"<a title="1 > 0">x</a>"#;
        assert_eq!(repair_html(html), html);
    }

    #[test]
    fn test_complete_comment_removed() {
        assert_eq!(repair_html("<p>a<!-- note -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_unclosed_comment_kept_as_text() {
        assert_eq!(
            repair_html("<p>Intro</p>\n<!-- draft note\n\nMore text"),
            "<p>Intro</p>\n&lt;!-- draft note\n\nMore text"
        );
    }

    #[test]
    fn test_declarations_removed() {
        assert_eq!(repair_html("<!DOCTYPE html><?php echo 1 ?><p>x</p>"), "<p>x</p>");
        assert_eq!(repair_html("<!doctype"), "&lt;!doctype");
    }
}
