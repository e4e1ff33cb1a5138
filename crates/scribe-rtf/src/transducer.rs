//! HTML event stream to RTF body transducer.
//!
//! The transducer consumes [`HtmlToken`]s one at a time and appends RTF
//! control words and escaped text to a body buffer. Every control sequence it
//! emits ends with a space so the following text can never run into the
//! control word.

use std::fmt::Write;

use crate::charmap::{NonAsciiPolicy, escape_text};
use crate::state::{Element, ListState, TableState, TagStack};
use crate::tokenizer::{HtmlToken, StartTag};

/// Paragraph break.
pub const PAR: &str = r"\par ";

/// Body font size in half-points.
const BODY_SIZE: u32 = 24;
/// Code block font size in half-points.
const CODE_SIZE: u32 = 20;
/// Indent per list or blockquote level, in twips.
const INDENT_STEP: usize = 720;
/// Page width minus both margins, in twips.
const TEXT_WIDTH: usize = 9360;

/// Heading font size in half-points.
fn heading_size(level: u8) -> u32 {
    match level {
        1 => 36,
        2 => 32,
        3 => 28,
        4 => 26,
        _ => BODY_SIZE,
    }
}

/// Streaming HTML to RTF transducer.
///
/// # Example
///
/// ```
/// use scribe_rtf::{HtmlTokenizer, NonAsciiPolicy, RtfTransducer};
///
/// let mut transducer = RtfTransducer::new(NonAsciiPolicy::Passthrough);
/// for token in HtmlTokenizer::new("<p><strong>Hi</strong></p>") {
///     transducer.feed(token.unwrap());
/// }
/// assert_eq!(transducer.finish(), r"\pard \b Hi\b0 \par \par ");
/// ```
pub struct RtfTransducer {
    body: String,
    stack: TagStack,
    lists: ListState,
    table: TableState,
    policy: NonAsciiPolicy,
    in_paragraph: bool,
    /// Number of open `li` elements.
    item_depth: usize,
    quote_depth: usize,
    pre_depth: usize,
    /// Level of the open heading, used to restore its font after inline code.
    heading: Option<u8>,
    /// Nothing but a paragraph break has been emitted since the last text.
    line_start: bool,
    /// No text has been emitted in the current block yet.
    block_start: bool,
    ignored_closes: usize,
}

impl RtfTransducer {
    /// Create a transducer with the given non-ASCII policy.
    #[must_use]
    pub fn new(policy: NonAsciiPolicy) -> Self {
        Self {
            body: String::with_capacity(4096),
            stack: TagStack::default(),
            lists: ListState::default(),
            table: TableState::default(),
            policy,
            in_paragraph: false,
            item_depth: 0,
            quote_depth: 0,
            pre_depth: 0,
            heading: None,
            line_start: true,
            block_start: true,
            ignored_closes: 0,
        }
    }

    /// Process one HTML event.
    pub fn feed(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Start(tag) => self.start_tag(tag),
            HtmlToken::End(name) => self.end_tag(&name),
            HtmlToken::Text(text) => self.text(&text),
        }
    }

    /// Number of closing tags ignored because they did not match the open tag.
    #[must_use]
    pub fn ignored_closes(&self) -> usize {
        self.ignored_closes
    }

    /// Close anything still open and return the RTF body.
    #[must_use]
    pub fn finish(mut self) -> String {
        while let Some(open) = self.stack.pop() {
            tracing::debug!(tag = %open.name, "Closing element left open at end of input");
            self.close_element(open.element);
        }
        self.body
    }

    /// Output buffer: the open table cell, or the body.
    fn sink(&mut self) -> &mut String {
        match self.table.cell_mut() {
            Some(cell) => cell,
            None => &mut self.body,
        }
    }

    fn control(&mut self, words: &str) {
        self.sink().push_str(words);
    }

    fn paragraph_break(&mut self) {
        // Table cells hold inline content only.
        if self.table.cell_mut().is_some() {
            return;
        }
        self.body.push_str(PAR);
        self.line_start = true;
        self.block_start = true;
    }

    fn ensure_break(&mut self) {
        if !self.line_start {
            self.paragraph_break();
        }
    }

    fn indent(&self) -> usize {
        INDENT_STEP * (self.lists.depth() + self.quote_depth)
    }

    /// Separate blocks inside a table cell, where `\pard` would end the row.
    ///
    /// Returns `false` outside a cell.
    fn cell_block_break(&mut self) -> bool {
        let block_start = self.block_start;
        let Some(cell) = self.table.cell_mut() else {
            return false;
        };
        if !block_start {
            cell.push_str(r"\line ");
        }
        self.block_start = true;
        true
    }

    /// Reset paragraph formatting, keeping the current indent.
    fn start_block(&mut self, extra_indent: usize) {
        if self.cell_block_break() {
            return;
        }
        let indent = self.indent() + extra_indent;
        if indent == 0 {
            self.control(r"\pard ");
        } else {
            let _ = write!(self.sink(), r"\pard\li{indent} ");
        }
        self.block_start = true;
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: StartTag) {
        let mut element = Element::from_tag(&tag.name);

        match element {
            Element::Heading(level) => {
                if !self.cell_block_break() {
                    self.ensure_break();
                    self.control(r"\pard");
                }
                let size = heading_size(level);
                let _ = write!(self.sink(), r"\f1\fs{size}\b ");
                self.heading = Some(level);
                self.block_start = true;
            }
            Element::Paragraph => {
                if self.item_depth > 0 {
                    // A second paragraph inside a list item continues under its text.
                    if self.line_start {
                        self.start_block(0);
                    }
                } else if !self.in_paragraph {
                    self.ensure_break();
                    self.start_block(0);
                }
                self.in_paragraph = true;
            }
            Element::List(ordered) => {
                if !self.in_paragraph {
                    self.ensure_break();
                }
                let first = tag
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.start(ordered, first);
            }
            Element::ListItem => {
                let in_cell = self.cell_block_break();
                if !in_cell {
                    self.ensure_break();
                }
                self.item_depth += 1;
                let indent = self.indent().max(INDENT_STEP);
                let marker = self.lists.next_marker();
                let sink = self.sink();
                if !in_cell {
                    let _ = write!(sink, r"\pard\fi-360\li{indent} ");
                }
                match marker {
                    Some(number) => {
                        let _ = write!(sink, "{number}. ");
                    }
                    None => sink.push_str(r"{\bullet} "),
                }
                self.line_start = false;
                self.block_start = true;
            }
            Element::Bold => self.control(r"\b "),
            Element::Italic => self.control(r"\i "),
            Element::Strike => self.control(r"\strike "),
            Element::Underline => self.control(r"\ul "),
            Element::Superscript => self.control(r"\super "),
            Element::Subscript => self.control(r"\sub "),
            Element::Link(_) => {
                // Only the styling is kept; the target is not embedded.
                let styled = tag.attr("href").is_some();
                if styled {
                    self.control(r"\cf2\ul ");
                }
                element = Element::Link(styled);
            }
            Element::Code => {
                if self.pre_depth == 0 {
                    self.control(r"\f2 ");
                }
            }
            Element::Preformatted => {
                self.ensure_break();
                self.start_block(0);
                let _ = write!(self.sink(), r"\f2\fs{CODE_SIZE} ");
                self.pre_depth += 1;
            }
            Element::BlockQuote => {
                self.ensure_break();
                self.quote_depth += 1;
            }
            Element::Table => {
                self.ensure_break();
                self.table.start_table();
            }
            Element::TableRow => self.table.start_row(),
            Element::TableCell(header) => {
                self.table.start_cell();
                self.block_start = true;
                if header {
                    self.control(r"\b ");
                }
            }
            Element::DefinitionTerm => {
                self.ensure_break();
                self.start_block(0);
                self.control(r"\b ");
            }
            Element::DefinitionDetail => {
                self.ensure_break();
                self.start_block(INDENT_STEP);
            }
            Element::LineBreak => {
                self.control(r"\line ");
                self.block_start = true;
            }
            Element::Rule => {
                if !self.cell_block_break() {
                    self.ensure_break();
                    self.control(r"\pard\brdrb\brdrs\brdrw10\brsp20 ");
                    self.paragraph_break();
                }
            }
            Element::Image => {
                if let Some(alt) = tag.attr("alt").filter(|alt| !alt.trim().is_empty()) {
                    let label = format!("[{}]", alt.trim());
                    self.write_text(&label);
                }
            }
            Element::Input => {
                if tag.attr("type") == Some("checkbox") {
                    let marker = if tag.attrs.contains_key("checked") {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    self.write_text(marker);
                    self.block_start = true;
                }
            }
            Element::Other => {}
        }

        if element.is_void() {
            return;
        }
        let self_closing = tag.self_closing;
        let name = tag.name;
        self.stack.push(name.clone(), element);
        if self_closing {
            self.end_tag(&name);
        }
    }

    fn end_tag(&mut self, name: &str) {
        let Some(open) = self.stack.pop_matching(name) else {
            self.ignored_closes += 1;
            tracing::debug!(tag = name, "Ignoring unmatched closing tag");
            return;
        };
        self.close_element(open.element);
    }

    fn close_element(&mut self, element: Element) {
        match element {
            Element::Heading(_) => {
                let _ = write!(self.sink(), r"\f0\fs{BODY_SIZE}\b0 ");
                self.heading = None;
                self.paragraph_break();
                self.paragraph_break();
            }
            Element::Paragraph => {
                self.in_paragraph = false;
                self.paragraph_break();
                if self.item_depth == 0 {
                    self.paragraph_break();
                }
            }
            Element::List(_) => {
                self.lists.end();
                self.paragraph_break();
            }
            Element::ListItem => {
                self.item_depth = self.item_depth.saturating_sub(1);
                self.paragraph_break();
            }
            Element::Bold => self.control(r"\b0 "),
            Element::Italic => self.control(r"\i0 "),
            Element::Strike => self.control(r"\strike0 "),
            Element::Underline => self.control(r"\ulnone "),
            Element::Superscript | Element::Subscript => self.control(r"\nosupersub "),
            Element::Link(styled) => {
                if styled {
                    self.control(r"\ulnone\cf0 ");
                }
            }
            Element::Code => {
                if self.pre_depth == 0 {
                    let font = u8::from(self.heading.is_some());
                    let _ = write!(self.sink(), r"\f{font} ");
                }
            }
            Element::Preformatted => {
                self.pre_depth = self.pre_depth.saturating_sub(1);
                let _ = write!(self.sink(), r"\f0\fs{BODY_SIZE} ");
                self.paragraph_break();
                self.paragraph_break();
            }
            Element::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.ensure_break();
            }
            Element::Table => {
                self.table.end_table();
                self.control(r"\pard ");
                self.paragraph_break();
            }
            Element::TableRow => {
                let cells = self.table.end_row();
                self.emit_row(&cells);
            }
            Element::TableCell(header) => {
                if header {
                    self.control(r"\b0 ");
                }
                self.table.end_cell();
            }
            Element::DefinitionTerm => {
                self.control(r"\b0 ");
                self.paragraph_break();
            }
            Element::DefinitionDetail => {
                self.paragraph_break();
                self.paragraph_break();
            }
            Element::LineBreak
            | Element::Rule
            | Element::Image
            | Element::Input
            | Element::Other => {}
        }
    }

    /// Write a buffered table row: row definition, then the cells.
    fn emit_row(&mut self, cells: &[String]) {
        if cells.is_empty() {
            return;
        }
        let width = TEXT_WIDTH / cells.len();
        let mut row = String::from(r"\trowd\trgaph108");
        for boundary in 1..=cells.len() {
            let _ = write!(row, r"\cellx{}", width * boundary);
        }
        row.push_str(r" \pard\intbl ");
        for cell in cells {
            row.push_str(cell);
            row.push_str(r"\cell ");
        }
        row.push_str(r"\row ");

        self.body.push_str(&row);
        self.line_start = true;
        self.block_start = true;
    }

    fn text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.preformatted_text(text);
            return;
        }

        if text.trim().is_empty() {
            // Whitespace between blocks is layout, not content.
            let between_blocks = self.line_start
                || self.block_start
                || self.stack.top().is_none_or(Element::is_container);
            if !between_blocks {
                self.sink().push(' ');
            }
            return;
        }

        if self.line_start && self.stack.top().is_none_or(Element::is_container) {
            self.start_block(0);
        }
        self.write_text(text);
    }

    /// Escape and append flowing text; newlines become spaces.
    fn write_text(&mut self, text: &str) {
        let flowing = text.replace('\n', " ");
        let flowing = if self.block_start {
            flowing.trim_start()
        } else {
            flowing.as_str()
        };
        let policy = self.policy;
        escape_text(flowing, policy, self.sink());
        self.line_start = false;
        self.block_start = false;
    }

    /// Code block text: one `\line` per source line break.
    fn preformatted_text(&mut self, text: &str) {
        let content = text.strip_suffix('\n').unwrap_or(text);
        let policy = self.policy;
        for (idx, line) in content.split('\n').enumerate() {
            if idx > 0 {
                self.control(r"\line ");
            }
            escape_text(line, policy, self.sink());
        }
        self.line_start = false;
        self.block_start = false;
    }
}

impl Default for RtfTransducer {
    fn default() -> Self {
        Self::new(NonAsciiPolicy::default())
    }
}
