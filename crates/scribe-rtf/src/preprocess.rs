//! Markdown preprocessing ahead of HTML expansion.
//!
//! Normalizes line endings and guarantees a blank line in front of every ATX
//! heading. Without it a heading written directly under a paragraph line is
//! swallowed into that paragraph by the HTML stage.

use std::sync::LazyLock;

use regex::Regex;

/// ATX heading marker: up to three spaces, one to six `#`, then whitespace or end of line.
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}#{1,6}(?:[ \t]|$)").expect("invalid heading regex"));

/// Prepare markdown text for the HTML stage.
///
/// - `\r\n` and lone `\r` line endings become `\n`
/// - exactly one blank line is inserted before each heading line (levels 1-6)
///   that is not already preceded by a blank line
///
/// Lines inside fenced code blocks are left alone.
///
/// # Example
///
/// ```
/// use scribe_rtf::preprocess;
///
/// assert_eq!(preprocess("Intro\r\n## Details"), "Intro\n\n## Details");
/// ```
#[must_use]
pub fn preprocess(markdown: &str) -> String {
    let normalized = normalize_line_endings(markdown);
    let mut output = String::with_capacity(normalized.len() + 32);
    let mut fence = CodeFence::default();
    // The first line needs no separation.
    let mut previous_blank = true;

    for (idx, line) in normalized.split('\n').enumerate() {
        if idx > 0 {
            output.push('\n');
        }

        let in_code = fence.update(line) || fence.is_open();
        if !in_code && !previous_blank && HEADING_MARKER.is_match(line) {
            output.push('\n');
        }

        output.push_str(line);
        previous_blank = line.trim().is_empty();
    }

    output
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Fenced code block state for line-by-line scanning.
///
/// A fence opens with three or more backticks or tildes and closes with a
/// line of the same character that is at least as long.
#[derive(Debug, Default)]
struct CodeFence {
    open: Option<(char, usize)>,
}

impl CodeFence {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` when the line opens or closes a fence.
    fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let Some(marker) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') else {
            return false;
        };
        let run = trimmed.chars().take_while(|c| *c == marker).count();

        match self.open {
            Some((open_char, open_len)) => {
                let closes = marker == open_char
                    && run >= open_len
                    && trimmed[run..].chars().all(char::is_whitespace);
                if closes {
                    self.open = None;
                }
                closes
            }
            None if run >= 3 => {
                self.open = Some((marker, run));
                true
            }
            None => false,
        }
    }
}
