use serde::{Deserialize, Serialize};

use crate::PdfError;

pub const ENCRYPTED_MESSAGE: &str = "PDF is encrypted and cannot be read.";
pub const NO_TEXT_MESSAGE: &str = "No extractable text found in the uploaded document.";

/// Normalized text of a single page. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: u32,
    pub content: String,
}

/// Outcome of extracting text from a document.
///
/// Extraction never fails outright: unreadable documents come back as
/// [`Extraction::Failed`] and documents without a text layer as
/// [`Extraction::Empty`], which still counts as a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ExtractionReport")]
pub enum Extraction {
    Extracted {
        full_text: String,
        pages: Vec<PageText>,
        total_pages: usize,
    },
    Empty {
        message: String,
        total_pages: usize,
    },
    Failed {
        message: String,
    },
}

impl Extraction {
    pub fn from_error(err: &PdfError) -> Self {
        let message = match err {
            PdfError::Encrypted => ENCRYPTED_MESSAGE.to_string(),
            other => format!("PDF extraction failed: {other}"),
        };
        Extraction::Failed { message }
    }

    pub fn success(&self) -> bool {
        !matches!(self, Extraction::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Extraction::Extracted { .. } => None,
            Extraction::Empty { message, .. } | Extraction::Failed { message } => Some(message),
        }
    }

    pub fn full_text(&self) -> &str {
        match self {
            Extraction::Extracted { full_text, .. } => full_text,
            _ => "",
        }
    }

    pub fn pages(&self) -> &[PageText] {
        match self {
            Extraction::Extracted { pages, .. } => pages,
            _ => &[],
        }
    }

    pub fn total_pages(&self) -> usize {
        match self {
            Extraction::Extracted { total_pages, .. } | Extraction::Empty { total_pages, .. } => {
                *total_pages
            }
            Extraction::Failed { .. } => 0,
        }
    }
}

/// Flat wire shape of an [`Extraction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub success: bool,
    pub error: Option<String>,
    pub full_text: String,
    pub pages: Vec<PageText>,
    pub total_pages: usize,
}

impl From<Extraction> for ExtractionReport {
    fn from(extraction: Extraction) -> Self {
        let success = extraction.success();
        let total_pages = extraction.total_pages();
        match extraction {
            Extraction::Extracted {
                full_text, pages, ..
            } => ExtractionReport {
                success,
                error: None,
                full_text,
                pages,
                total_pages,
            },
            Extraction::Empty { message, .. } | Extraction::Failed { message } => {
                ExtractionReport {
                    success,
                    error: Some(message),
                    full_text: String::new(),
                    pages: Vec::new(),
                    total_pages,
                }
            }
        }
    }
}
