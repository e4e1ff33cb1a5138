//! Conversion error types.

/// Error during markdown to RTF conversion.
///
/// A failed conversion produces no partial output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The intermediate HTML could not be tokenized.
    #[error("HTML parse error: {0}")]
    Html(#[from] quick_xml::Error),

    /// Character data could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
