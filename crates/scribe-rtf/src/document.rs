//! RTF document framing.

/// Fixed document header: character set, font and color tables, page
/// geometry, and the default paragraph and font.
///
/// Font slots: `\f0` body, `\f1` headings, `\f2` monospace.
/// Color slots: `\cf1` black, `\cf2` link blue.
pub const RTF_PREAMBLE: &str = concat!(
    r"{\rtf1\ansi\ansicpg1252\cocoartf2761",
    "\n",
    r"\cocoatextscaling0\cocoaplatform0",
    "\n",
    r"{\fonttbl\f0\fswiss\fcharset0 Helvetica;\f1\fswiss\fcharset0 Helvetica-Bold;\f2\fmodern\fcharset0 Menlo-Regular;}",
    "\n",
    r"{\colortbl;\red0\green0\blue0;\red0\green0\blue255;}",
    "\n",
    r"\paperw12240\paperh15840\margl1440\margr1440\vieww12000\viewh15000\viewkind0",
    "\n",
    r"\pard\tx720\pardeftab720\partightenfactor0",
    "\n",
    r"\f0\fs24 ",
    "\n",
);

/// Closes the document group.
pub const RTF_CLOSING: &str = "\n}";

/// Wrap a body in the preamble and closing delimiter.
#[must_use]
pub fn assemble(body: &str) -> String {
    let mut doc = String::with_capacity(RTF_PREAMBLE.len() + body.len() + RTF_CLOSING.len());
    doc.push_str(RTF_PREAMBLE);
    doc.push_str(body);
    doc.push_str(RTF_CLOSING);
    doc
}
