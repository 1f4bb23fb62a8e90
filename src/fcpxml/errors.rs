//! Fatal document errors
//!
//! Everything below the document level is recoverable and reported through
//! [`crate::diagnostics::Diagnostics`] instead.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// Input is not well-formed XML
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// Root element is not `<fcpxml>`
    #[error("Unexpected root element <{0}>, expected <fcpxml>")]
    UnexpectedRoot(String),
}

impl From<roxmltree::Error> for DocumentError {
    fn from(e: roxmltree::Error) -> Self {
        DocumentError::InvalidXml(e.to_string())
    }
}
