//! Text escaping and character substitution for RTF output.

use std::fmt::Write;

/// Typographic characters and their Windows-1252 RTF escapes.
///
/// The document preamble declares `\ansicpg1252`, so every entry maps to the
/// hex escape of the matching code page byte. The non-breaking space uses the
/// dedicated `\~` control symbol.
pub const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2018}', r"\'91"), // left single quotation mark
    ('\u{2019}', r"\'92"), // right single quotation mark
    ('\u{201c}', r"\'93"), // left double quotation mark
    ('\u{201d}', r"\'94"), // right double quotation mark
    ('\u{2022}', r"\'95"), // bullet
    ('\u{2013}', r"\'96"), // en dash
    ('\u{2014}', r"\'97"), // em dash
    ('\u{2026}', r"\'85"), // horizontal ellipsis
    ('\u{00a0}', r"\~"),   // no-break space
];

/// Handling of non-ASCII characters missing from [`SUBSTITUTIONS`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NonAsciiPolicy {
    /// Emit the character unchanged (UTF-8 in the output string).
    #[default]
    Passthrough,
    /// Emit `\uN?` Unicode escapes with `?` as the fallback character.
    Escape,
}

/// Look up the substitution for a character.
#[must_use]
pub fn substitution(c: char) -> Option<&'static str> {
    SUBSTITUTIONS
        .iter()
        .find_map(|&(from, to)| (from == c).then_some(to))
}

/// Escape text data for inclusion in an RTF body.
///
/// Backslash and braces get a backslash prefix, substitution table entries are
/// replaced, tabs become `\tab`, and other ASCII control characters are
/// dropped. Both rules run in one left-to-right pass, so replacement output is
/// never escaped a second time.
///
/// # Example
///
/// ```
/// use scribe_rtf::{NonAsciiPolicy, escape_text};
///
/// let mut out = String::new();
/// escape_text("{it\u{2019}s}", NonAsciiPolicy::Passthrough, &mut out);
/// assert_eq!(out, r"\{it\'92s\}");
/// ```
pub fn escape_text(text: &str, policy: NonAsciiPolicy, out: &mut String) {
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str(r"\tab "),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            c => {
                if let Some(replacement) = substitution(c) {
                    out.push_str(replacement);
                } else if policy == NonAsciiPolicy::Escape {
                    push_unicode_escape(c, out);
                } else {
                    out.push(c);
                }
            }
        }
    }
}

/// Write `\uN?` for each UTF-16 code unit of `c`.
///
/// RTF reads the parameter as a signed 16-bit value.
fn push_unicode_escape(c: char, out: &mut String) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        #[allow(clippy::cast_possible_wrap)]
        let signed = *unit as i16;
        let _ = write!(out, r"\u{signed}?");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escape(text: &str) -> String {
        let mut out = String::new();
        escape_text(text, NonAsciiPolicy::Passthrough, &mut out);
        out
    }

    fn escape_strict(text: &str) -> String {
        let mut out = String::new();
        escape_text(text, NonAsciiPolicy::Escape, &mut out);
        out
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(escape("Hello, world! 1 + 2 = 3"), "Hello, world! 1 + 2 = 3");
    }

    #[test]
    fn test_metacharacters_escaped_once() {
        assert_eq!(escape(r"a\b{c}d"), r"a\\b\{c\}d");
    }

    #[test]
    fn test_every_metacharacter_gets_one_backslash() {
        let input = r"\\{{}}";
        let out = escape(input);
        assert_eq!(out, r"\\\\\{\{\}\}");
        assert_eq!(out.len(), input.len() * 2);
    }

    #[test]
    fn test_right_single_quote() {
        assert_eq!(escape("it\u{2019}s"), r"it\'92s");
    }

    #[test]
    fn test_full_table() {
        let input: String = SUBSTITUTIONS.iter().map(|(c, _)| *c).collect();
        let expected: String = SUBSTITUTIONS.iter().map(|(_, s)| *s).collect();
        assert_eq!(escape(&input), expected);
    }

    #[test]
    fn test_substitution_not_reescaped() {
        // The replacement contains a backslash which must survive as-is.
        assert_eq!(escape("\\\u{2014}"), r"\\\'97");
    }

    #[test]
    fn test_lookup() {
        assert_eq!(substitution('\u{2026}'), Some(r"\'85"));
        assert_eq!(substitution('a'), None);
        assert_eq!(substitution('\u{00e9}'), None);
    }

    #[test]
    fn test_tab_and_controls() {
        assert_eq!(escape("a\tb\u{7}c\u{0}"), r"a\tab bc");
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(escape("caf\u{e9} \u{1f600}"), "caf\u{e9} \u{1f600}");
    }

    #[test]
    fn test_non_ascii_escape() {
        assert_eq!(escape_strict("caf\u{e9}"), r"caf\u233?");
    }

    #[test]
    fn test_non_ascii_escape_negative_parameter() {
        // U+FB01 is above 0x7FFF, so the parameter wraps negative.
        assert_eq!(escape_strict("\u{fb01}"), r"\u-1279?");
    }

    #[test]
    fn test_non_ascii_escape_surrogate_pair() {
        assert_eq!(escape_strict("\u{1f600}"), r"\u-10179?\u-8704?");
    }

    #[test]
    fn test_table_wins_over_escape_policy() {
        assert_eq!(escape_strict("\u{2019}"), r"\'92");
    }
}
