use crate::PdfError;

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a source of per-page text (currently backed by `lopdf`).
///
/// The extraction loop only needs page numbers and a fallible per-page text
/// call, so tests can drive it with a mock instead of a real document.
pub trait PdfBackend {
    /// 1-based page numbers in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Raw text of a single page.
    fn page_text(&self, page: u32) -> Result<String, PdfError>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    ///
    /// Encrypted documents are opened with an empty password; when that is
    /// rejected the load fails with [`PdfError::Encrypted`].
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let mut doc = lopdf::Document::load_mem(data).map_err(|e| classify_load_error(&e.to_string()))?;

        if doc.is_encrypted() && doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

impl PdfBackend for LopdfBackend {
    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn page_text(&self, page: u32) -> Result<String, PdfError> {
        self.doc
            .extract_text(&[page])
            .map_err(|e| PdfError::Page {
                page,
                reason: e.to_string(),
            })
    }
}

/// Map a load error to [`PdfError`], recognising password failures by message.
fn classify_load_error(message: &str) -> PdfError {
    let lower = message.to_lowercase();
    if ["encrypt", "decrypt", "password"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        PdfError::Encrypted
    } else {
        PdfError::Parse(message.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_garbage() {
        let result = LopdfBackend::load_bytes(b"not a pdf at all");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_empty() {
        assert!(LopdfBackend::load_bytes(&[]).is_err());
    }

    #[test]
    fn test_classify_load_error() {
        assert!(matches!(
            classify_load_error("Document is Encrypted"),
            PdfError::Encrypted
        ));
        assert!(matches!(
            classify_load_error("invalid password"),
            PdfError::Encrypted
        ));
        assert!(matches!(
            classify_load_error("invalid file trailer"),
            PdfError::Parse(_)
        ));
    }

    #[test]
    fn test_page_numbers_are_one_based_and_ordered() {
        let bytes = fixtures::pdf_with_pages(&["one", "two", "three"]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        assert_eq!(backend.page_numbers(), vec![1, 2, 3]);
        assert_eq!(backend.page_count(), 3);
    }

    #[test]
    fn test_load_rejects_unknown_password() {
        let bytes = fixtures::encrypted_pdf_with_pages(&["Revenue of $45.2 million"], "secret");
        assert!(matches!(
            LopdfBackend::load_bytes(&bytes),
            Err(PdfError::Encrypted)
        ));
    }

    #[test]
    fn test_load_opens_empty_password() {
        let bytes = fixtures::encrypted_pdf_with_pages(&["Revenue of $45.2 million"], "");
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        assert_eq!(backend.page_count(), 1);
        assert!(backend.page_text(1).unwrap().contains("Revenue of $45.2 million"));
    }

    #[test]
    fn test_page_text() {
        let bytes = fixtures::pdf_with_pages(&["Net income of $3.1 million"]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let text = backend.page_text(1).unwrap();
        assert!(text.contains("Net income of $3.1 million"), "got {text:?}");
    }
}
