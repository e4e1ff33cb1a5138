//! Fix-ups over the transduced RTF body.

use crate::lexer::{RtfLexer, RtfToken};

/// Replacement for a run of two or more paragraph breaks.
pub const SPACED_PAR: &str = r"\sa240\par ";

const MARKER: &str = "***";
const BOLD_ITALIC_ON: &str = r"\b\i ";
const BOLD_ITALIC_OFF: &str = r"\i0\b0 ";

/// Apply both body fix-ups: paragraph run normalization, then literal
/// `***text***` emphasis.
///
/// # Example
///
/// ```
/// use scribe_rtf::postprocess;
///
/// assert_eq!(
///     postprocess(r"a\par \par ***b*** c\par "),
///     r"a\sa240\par \b\i b\i0\b0  c\par "
/// );
/// ```
#[must_use]
pub fn postprocess(body: &str) -> String {
    let collapsed = collapse_paragraph_runs(body);
    emphasize_triple_asterisks(&collapsed)
}

/// Replace each run of adjacent `\par` words with a single spaced break.
fn collapse_paragraph_runs(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut run = 0;
    let mut first = "";

    for token in RtfLexer::new(body) {
        if token.is_word("par") {
            if run == 0 {
                first = token.raw();
            }
            run += 1;
            continue;
        }
        flush_run(&mut out, run, first);
        run = 0;
        out.push_str(token.raw());
    }
    flush_run(&mut out, run, first);
    out
}

fn flush_run(out: &mut String, run: usize, first: &str) {
    match run {
        0 => {}
        1 => out.push_str(first),
        _ => out.push_str(SPACED_PAR),
    }
}

/// Position of a `***` marker: token index and byte offset in its text.
#[derive(Clone, Copy)]
struct Marker {
    token: usize,
    offset: usize,
}

/// Turn literal `***text***` spans into bold italic.
///
/// Markers pair left to right within one paragraph or table cell. Empty
/// spans and unpaired markers stay literal, as does anything in the
/// monospace font.
fn emphasize_triple_asterisks(body: &str) -> String {
    if !body.contains(MARKER) {
        return body.to_owned();
    }

    let tokens: Vec<RtfToken<'_>> = RtfLexer::new(body).collect();
    let mut edits: Vec<(Marker, &'static str)> = Vec::new();
    let mut open: Option<Marker> = None;
    let mut in_code = false;

    for (idx, token) in tokens.iter().enumerate() {
        match *token {
            RtfToken::ControlWord { name, param, .. } => match name {
                "par" | "pard" | "row" | "cell" => open = None,
                "f" => in_code = param == Some(2),
                _ => {}
            },
            RtfToken::Text(text) if !in_code => {
                for (offset, _) in text.match_indices(MARKER) {
                    let marker = Marker { token: idx, offset };
                    match open.take() {
                        None => open = Some(marker),
                        Some(start)
                            if start.token == idx && start.offset + MARKER.len() == offset => {}
                        Some(start) => {
                            edits.push((start, BOLD_ITALIC_ON));
                            edits.push((marker, BOLD_ITALIC_OFF));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if edits.is_empty() {
        return body.to_owned();
    }

    let mut out = String::with_capacity(body.len() + edits.len() * 4);
    let mut edits = edits.into_iter().peekable();
    for (idx, token) in tokens.iter().enumerate() {
        let raw = token.raw();
        let mut copied = 0;
        while let Some((marker, replacement)) = edits.next_if(|(m, _)| m.token == idx) {
            out.push_str(&raw[copied..marker.offset]);
            out.push_str(replacement);
            copied = marker.offset + MARKER.len();
        }
        out.push_str(&raw[copied..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_double_par_collapsed() {
        assert_eq!(
            postprocess(r"\pard A\par \par \pard B\par "),
            r"\pard A\sa240\par \pard B\par "
        );
    }

    #[test]
    fn test_long_par_run_collapsed() {
        assert_eq!(postprocess(r"x\par \par \par \par y"), r"x\sa240\par y");
    }

    #[test]
    fn test_par_without_delimiter() {
        assert_eq!(postprocess(r"x\par\par\pard y"), r"x\sa240\par \pard y");
    }

    #[test]
    fn test_single_par_kept() {
        assert_eq!(postprocess(r"a\par b\par"), r"a\par b\par");
    }

    #[test]
    fn test_escaped_par_text_not_collapsed() {
        assert_eq!(postprocess(r"\\par \\par "), r"\\par \\par ");
    }

    #[test]
    fn test_pard_not_a_par() {
        assert_eq!(postprocess(r"\par \pard \par "), r"\par \pard \par ");
    }

    #[test]
    fn test_triple_asterisk_pair() {
        assert_eq!(
            postprocess(r"\pard ***Acme Widget*** ships\par "),
            r"\pard \b\i Acme Widget\i0\b0  ships\par "
        );
    }

    #[test]
    fn test_triple_asterisk_across_tokens() {
        assert_eq!(
            postprocess(r"***it\'92s***"),
            r"\b\i it\'92s\i0\b0 "
        );
    }

    #[test]
    fn test_two_pairs_in_paragraph() {
        assert_eq!(
            postprocess("***a*** and ***b***"),
            r"\b\i a\i0\b0  and \b\i b\i0\b0 "
        );
    }

    #[test]
    fn test_unpaired_marker_literal() {
        assert_eq!(postprocess("***a*** ***b"), r"\b\i a\i0\b0  ***b");
    }

    #[test]
    fn test_markers_do_not_pair_across_paragraphs() {
        assert_eq!(
            postprocess(r"***a\par b***\par "),
            r"***a\par b***\par "
        );
    }

    #[test]
    fn test_empty_span_literal() {
        assert_eq!(postprocess("x ****** y"), "x ****** y");
    }

    #[test]
    fn test_code_font_untouched() {
        assert_eq!(
            postprocess(r"\f2 /*** doc ***/\f0 "),
            r"\f2 /*** doc ***/\f0 "
        );
    }

    #[test]
    fn test_no_markers_unchanged() {
        let body = r"\pard \b bold\b0 \par ";
        assert_eq!(postprocess(body), body);
    }
}
