//! Lenient HTML event tokenizer.
//!
//! Wraps `quick-xml`'s pull reader with end-name checking switched off, so
//! the imperfect HTML a markdown expander can produce (stray closing tags,
//! unclosed inline HTML) still yields a usable event stream. Stray `<` and
//! `&` must be escaped beforehand with [`repair_html`](crate::repair_html);
//! the converter does this for every document. Tag names are
//! lowercased and adjacent text and entity references are merged into a
//! single [`HtmlToken::Text`].

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ConvertError;

/// Opening tag with its attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name.
    pub name: String,
    /// Attribute values with entities resolved.
    pub attrs: HashMap<String, String>,
    /// Whether the tag was written self-closing (`<br />`).
    pub self_closing: bool,
}

impl StartTag {
    /// Create a tag without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// One HTML event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlToken {
    /// Opening or self-closing tag.
    Start(StartTag),
    /// Closing tag (lowercased name).
    End(String),
    /// Character data with entities decoded.
    Text(String),
}

/// Streaming tokenizer over an HTML string.
///
/// # Example
///
/// ```
/// use scribe_rtf::{HtmlToken, HtmlTokenizer};
///
/// let tokens: Vec<HtmlToken> = HtmlTokenizer::new("<p>a &amp; b</p>")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens[1], HtmlToken::Text("a & b".to_owned()));
/// ```
pub struct HtmlTokenizer<'a> {
    reader: Reader<&'a [u8]>,
    /// Token read while collecting text, returned on the next call.
    pending: Option<HtmlToken>,
    done: bool,
}

impl<'a> HtmlTokenizer<'a> {
    /// Create a tokenizer over `html`.
    #[must_use]
    pub fn new(html: &'a str) -> Self {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        Self {
            reader,
            pending: None,
            done: false,
        }
    }

    /// Read the next token, merging consecutive character data.
    fn read_token(&mut self) -> Result<Option<HtmlToken>, ConvertError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }

        let mut text = String::new();
        loop {
            let token = match self.reader.read_event()? {
                Event::Start(e) => HtmlToken::Start(self.start_tag(&e, false)),
                Event::Empty(e) => HtmlToken::Start(self.start_tag(&e, true)),
                Event::End(e) => HtmlToken::End(decode_name(e.name().as_ref())),
                Event::Text(e) => {
                    text.push_str(&self.reader.decoder().decode(&e)?);
                    continue;
                }
                Event::GeneralRef(e) => {
                    let entity = self.reader.decoder().decode(&e)?;
                    push_entity(&entity, &mut text);
                    continue;
                }
                Event::CData(e) => {
                    text.push_str(&String::from_utf8_lossy(&e));
                    continue;
                }
                Event::Eof => {
                    self.done = true;
                    return Ok((!text.is_empty()).then_some(HtmlToken::Text(text)));
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                    continue;
                }
            };

            if text.is_empty() {
                return Ok(Some(token));
            }
            self.pending = Some(token);
            return Ok(Some(HtmlToken::Text(text)));
        }
    }

    fn start_tag(&self, e: &BytesStart<'_>, self_closing: bool) -> StartTag {
        let mut attrs = HashMap::new();
        // Attributes quick-xml cannot parse (bare HTML boolean attributes) are skipped.
        for attr in e.attributes().flatten() {
            let key = decode_name(attr.key.as_ref());
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            attrs.insert(key, value);
        }

        StartTag {
            name: decode_name(e.name().as_ref()),
            attrs,
            self_closing,
        }
    }
}

impl Iterator for HtmlTokenizer<'_> {
    type Item = Result<HtmlToken, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done && self.pending.is_none() {
            return None;
        }
        match self.read_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.done = true;
                self.pending = None;
                Some(Err(err))
            }
        }
    }
}

fn decode_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Append the character(s) an entity reference stands for.
///
/// Unknown entities are kept literally.
fn push_entity(entity: &str, out: &mut String) {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        match value.and_then(char::from_u32) {
            Some(c) => out.push(c),
            None => {
                out.push('&');
                out.push_str(entity);
                out.push(';');
            }
        }
        return;
    }

    match named_entity(entity) {
        Some(c) => out.push(c),
        None => {
            out.push('&');
            out.push_str(entity);
            out.push(';');
        }
    }
}

/// Named entities that appear in markdown output and hand-written inline HTML.
fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00a0}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "copy" => '\u{00a9}',
        "reg" => '\u{00ae}',
        "trade" => '\u{2122}',
        "deg" => '\u{00b0}',
        "times" => '\u{00d7}',
        "middot" => '\u{00b7}',
        "laquo" => '\u{00ab}',
        "raquo" => '\u{00bb}',
        "euro" => '\u{20ac}',
        "pound" => '\u{00a3}',
        "rarr" => '\u{2192}',
        "larr" => '\u{2190}',
        _ => return None,
    })
}
