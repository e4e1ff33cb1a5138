//! Markdown to HTML expansion.

use pulldown_cmark::{Options, Parser, html};

/// Parser options for the HTML stage.
///
/// With `extended` set, tables, strikethrough, task lists, footnotes and
/// definition lists are recognized in addition to `CommonMark`.
#[must_use]
pub fn parser_options(extended: bool) -> Options {
    if extended {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_DEFINITION_LIST
    } else {
        Options::empty()
    }
}

/// Expand markdown into HTML.
///
/// # Example
///
/// ```
/// use scribe_rtf::markdown_to_html;
///
/// let html = markdown_to_html("- one\n- two", true);
/// assert_eq!(html, "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n");
/// ```
#[must_use]
pub fn markdown_to_html(markdown: &str, extended: bool) -> String {
    let parser = Parser::new_ext(markdown, parser_options(extended));
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
