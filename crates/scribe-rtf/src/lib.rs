//! Markdown to RTF conversion.
//!
//! Conversion runs as a linear pipeline with no state shared between calls:
//!
//! 1. [`preprocess`]: normalize line endings, separate ATX headings
//! 2. [`markdown_to_html`]: expand markdown with `pulldown-cmark`
//! 3. [`repair_html`]: escape stray `<` and `&` left by raw inline HTML
//! 4. [`HtmlTokenizer`]: lenient HTML event stream over `quick-xml`
//! 5. [`RtfTransducer`]: stack-based tag handler emitting RTF control words
//! 6. [`postprocess`]: paragraph run normalization and `***` emphasis
//! 7. [`assemble`]: wrap the body in the fixed document preamble
//!
//! Text is escaped in a single pass ([`escape_text`]): `\`, `{` and `}` get a
//! backslash prefix and typographic punctuation is replaced with
//! Windows-1252 escapes from [`SUBSTITUTIONS`].
//!
//! # Example
//!
//! ```
//! use scribe_rtf::markdown_to_rtf;
//!
//! let rtf = markdown_to_rtf("# Title\nBody text").unwrap();
//! assert!(rtf.starts_with(r"{\rtf1"));
//! assert!(rtf.contains(r"\f1\fs36\b Title\f0\fs24\b0 "));
//! ```

mod charmap;
mod document;
mod error;
mod html;
mod lexer;
mod postprocess;
mod preprocess;
mod repair;
mod state;
mod tokenizer;
mod transducer;

pub use charmap::{NonAsciiPolicy, SUBSTITUTIONS, escape_text, substitution};
pub use document::{RTF_CLOSING, RTF_PREAMBLE, assemble};
pub use error::ConvertError;
pub use html::{markdown_to_html, parser_options};
pub use lexer::{RtfLexer, RtfToken};
pub use postprocess::{SPACED_PAR, postprocess};
pub use preprocess::preprocess;
pub use repair::repair_html;
pub use tokenizer::{HtmlToken, HtmlTokenizer, StartTag};
pub use transducer::RtfTransducer;

/// Configured markdown to RTF converter.
///
/// Holds options only; every call to [`convert`](Self::convert) builds its
/// own transducer, so one converter can be shared across threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RtfConverter {
    non_ascii: NonAsciiPolicy,
    gfm: bool,
}

impl RtfConverter {
    /// Converter with passthrough for non-ASCII text and GFM extensions on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            non_ascii: NonAsciiPolicy::Passthrough,
            gfm: true,
        }
    }

    /// Set the handling of non-ASCII characters outside the substitution table.
    #[must_use]
    pub fn with_non_ascii(mut self, policy: NonAsciiPolicy) -> Self {
        self.non_ascii = policy;
        self
    }

    /// Enable or disable tables, strikethrough, task lists, footnotes and
    /// definition lists.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Convert markdown to a complete RTF document.
    pub fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        let prepared = preprocess(markdown);
        let html = markdown_to_html(&prepared, self.gfm);
        self.convert_html(&html)
    }

    /// Convert already expanded HTML to a complete RTF document.
    pub fn convert_html(&self, html: &str) -> Result<String, ConvertError> {
        let html = repair_html(html);
        let mut transducer = RtfTransducer::new(self.non_ascii);
        for token in HtmlTokenizer::new(&html) {
            transducer.feed(token?);
        }

        let ignored = transducer.ignored_closes();
        if ignored > 0 {
            tracing::debug!(ignored, "Ignored unmatched closing tags");
        }

        let body = postprocess(&transducer.finish());
        Ok(assemble(&body))
    }
}

impl Default for RtfConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert markdown to RTF with default options.
pub fn markdown_to_rtf(markdown: &str) -> Result<String, ConvertError> {
    RtfConverter::new().convert(markdown)
}
