//! State tracked by the transducer during a single conversion.

/// Elements the transducer knows how to style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    /// `h1`..`h6` with level.
    Heading(u8),
    Paragraph,
    /// `ul` (`false`) or `ol` (`true`).
    List(bool),
    ListItem,
    Bold,
    Italic,
    Strike,
    Underline,
    Superscript,
    Subscript,
    /// `a`; `true` when it carried an `href` and was styled.
    Link(bool),
    Code,
    Preformatted,
    BlockQuote,
    Table,
    TableRow,
    /// `td` (`false`) or `th` (`true`).
    TableCell(bool),
    DefinitionTerm,
    DefinitionDetail,
    LineBreak,
    Rule,
    Image,
    Input,
    /// Anything else: tracked for close matching, never styled.
    Other,
}

impl Element {
    /// Classify a lowercased tag name.
    #[must_use]
    pub fn from_tag(name: &str) -> Self {
        match name {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "ul" => Self::List(false),
            "ol" => Self::List(true),
            "li" => Self::ListItem,
            "strong" | "b" => Self::Bold,
            "em" | "i" => Self::Italic,
            "del" | "s" | "strike" => Self::Strike,
            "u" | "ins" => Self::Underline,
            "sup" => Self::Superscript,
            "sub" => Self::Subscript,
            "a" => Self::Link(false),
            "code" | "kbd" | "samp" => Self::Code,
            "pre" => Self::Preformatted,
            "blockquote" => Self::BlockQuote,
            "table" => Self::Table,
            "tr" => Self::TableRow,
            "td" => Self::TableCell(false),
            "th" => Self::TableCell(true),
            "dt" => Self::DefinitionTerm,
            "dd" => Self::DefinitionDetail,
            "br" => Self::LineBreak,
            "hr" => Self::Rule,
            "img" => Self::Image,
            "input" => Self::Input,
            _ => Self::Other,
        }
    }

    /// Elements without content. They are never pushed on the stack.
    #[must_use]
    pub fn is_void(self) -> bool {
        matches!(
            self,
            Self::LineBreak | Self::Rule | Self::Image | Self::Input
        )
    }

    /// Elements whose direct text children are formatting whitespace only.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::BlockQuote | Self::Table | Self::TableRow
        )
    }
}

/// An entry of the formatting context stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenElement {
    /// Tag name as it appeared in the start tag.
    pub name: String,
    pub element: Element,
}

/// Ordered record of currently open tags.
///
/// Closing only succeeds when the name matches the top entry.
#[derive(Debug, Default)]
pub struct TagStack {
    entries: Vec<OpenElement>,
}

impl TagStack {
    pub fn push(&mut self, name: impl Into<String>, element: Element) {
        self.entries.push(OpenElement {
            name: name.into(),
            element,
        });
    }

    /// Pop the top entry if its name is `name`.
    ///
    /// Returns `None` and leaves the stack unchanged otherwise.
    pub fn pop_matching(&mut self, name: &str) -> Option<OpenElement> {
        if self.entries.last().is_some_and(|top| top.name == name) {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Pop the top entry unconditionally.
    pub fn pop(&mut self) -> Option<OpenElement> {
        self.entries.pop()
    }

    #[must_use]
    pub fn top(&self) -> Option<Element> {
        self.entries.last().map(|e| e.element)
    }
}

/// Nested list tracking: one entry per open `ul`/`ol`.
#[derive(Debug, Default)]
pub struct ListState {
    /// Next item number for ordered lists, `None` for bullets.
    levels: Vec<Option<u64>>,
}

impl ListState {
    pub fn start(&mut self, ordered: bool, first: u64) {
        self.levels.push(ordered.then_some(first));
    }

    pub fn end(&mut self) {
        self.levels.pop();
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Marker for the next item of the innermost list: `None` for a bullet,
    /// the item number for ordered lists.
    pub fn next_marker(&mut self) -> Option<u64> {
        let current = self.levels.last_mut()?;
        let number = (*current)?;
        *current = Some(number.saturating_add(1));
        Some(number)
    }
}

/// Buffered table row.
///
/// Cell contents are collected until the row closes because the row
/// definition (`\cellx` boundaries) must precede the cells.
#[derive(Debug, Default)]
pub struct TableState {
    row: Option<Vec<String>>,
    in_cell: bool,
}

impl TableState {
    pub fn start_table(&mut self) {
        self.reset();
    }

    /// Drop a row left unfinished by the table.
    pub fn end_table(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.row = None;
        self.in_cell = false;
    }

    pub fn start_row(&mut self) {
        self.row = Some(Vec::new());
    }

    /// Finish the row and return its cells.
    pub fn end_row(&mut self) -> Vec<String> {
        self.in_cell = false;
        self.row.take().unwrap_or_default()
    }

    /// Open a new cell. Cells outside a row start an implicit one.
    pub fn start_cell(&mut self) {
        self.row.get_or_insert_with(Vec::new).push(String::new());
        self.in_cell = true;
    }

    pub fn end_cell(&mut self) {
        self.in_cell = false;
    }

    /// Buffer of the open cell, if any.
    pub fn cell_mut(&mut self) -> Option<&mut String> {
        if !self.in_cell {
            return None;
        }
        self.row.as_mut().and_then(|cells| cells.last_mut())
    }
}
