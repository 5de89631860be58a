use thiserror::Error;

pub mod backend;
pub mod extract;
pub mod types;

pub use extract::{extract, extract_file, extract_with};
pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {page} could not be read: {reason}")]
    Page { page: u32, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
