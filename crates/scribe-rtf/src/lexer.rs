//! Minimal RTF lexer.
//!
//! Splits an RTF body into control words, control symbols, group delimiters
//! and text runs. Every token keeps the exact slice it was read from, so
//! concatenating [`RtfToken::raw`] of all tokens reproduces the input.

/// One lexical unit of RTF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtfToken<'a> {
    /// `\name` with optional numeric parameter. `raw` includes the delimiter
    /// space when present.
    ControlWord {
        name: &'a str,
        param: Option<i32>,
        raw: &'a str,
    },
    /// `\` followed by a non-letter, including `\'hh` hex escapes.
    ControlSymbol(&'a str),
    GroupStart,
    GroupEnd,
    /// Literal text up to the next `\`, `{` or `}`.
    Text(&'a str),
}

impl<'a> RtfToken<'a> {
    /// Source slice of the token.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        match *self {
            Self::ControlWord { raw, .. } | Self::ControlSymbol(raw) | Self::Text(raw) => raw,
            Self::GroupStart => "{",
            Self::GroupEnd => "}",
        }
    }

    /// Whether this is the parameterless control word `\name`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(*self, Self::ControlWord { name, param: None, .. } if name == word)
    }
}

/// Iterator over the tokens of an RTF string.
///
/// # Example
///
/// ```
/// use scribe_rtf::{RtfLexer, RtfToken};
///
/// let tokens: Vec<_> = RtfLexer::new(r"\b0 x").collect();
/// assert_eq!(
///     tokens,
///     vec![
///         RtfToken::ControlWord { name: "b", param: Some(0), raw: r"\b0 " },
///         RtfToken::Text("x"),
///     ]
/// );
/// ```
pub struct RtfLexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> RtfLexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn control(&mut self) -> RtfToken<'a> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut end = start + 1;

        match bytes.get(end) {
            Some(b) if b.is_ascii_alphabetic() => {
                while bytes.get(end).is_some_and(u8::is_ascii_alphabetic) {
                    end += 1;
                }
                let name = &self.input[start + 1..end];

                let param_start = end;
                if bytes.get(end) == Some(&b'-')
                    && bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
                {
                    end += 1;
                }
                while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
                let param = (end > param_start)
                    .then(|| self.input[param_start..end].parse().ok())
                    .flatten();

                if bytes.get(end) == Some(&b' ') {
                    end += 1;
                }
                self.pos = end;
                RtfToken::ControlWord {
                    name,
                    param,
                    raw: &self.input[start..end],
                }
            }
            Some(b'\'') => {
                end += 1;
                let mut digits = 0;
                while digits < 2 && bytes.get(end).is_some_and(u8::is_ascii_hexdigit) {
                    end += 1;
                    digits += 1;
                }
                self.pos = end;
                RtfToken::ControlSymbol(&self.input[start..end])
            }
            Some(_) => {
                // Symbol may be any character, keep the slice on a char boundary.
                let width = self.input[end..].chars().next().map_or(1, char::len_utf8);
                end += width;
                self.pos = end;
                RtfToken::ControlSymbol(&self.input[start..end])
            }
            None => {
                self.pos = end;
                RtfToken::ControlSymbol(&self.input[start..end])
            }
        }
    }
}

impl<'a> Iterator for RtfLexer<'a> {
    type Item = RtfToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.pos..];
        let first = *rest.as_bytes().first()?;

        let token = match first {
            b'{' => {
                self.pos += 1;
                RtfToken::GroupStart
            }
            b'}' => {
                self.pos += 1;
                RtfToken::GroupEnd
            }
            b'\\' => self.control(),
            _ => {
                let len = rest.find(['\\', '{', '}']).unwrap_or(rest.len());
                self.pos += len;
                RtfToken::Text(&rest[..len])
            }
        };
        Some(token)
    }
}
