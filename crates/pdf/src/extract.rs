use std::path::Path;

use finlens_core::text::normalize_whitespace;

use crate::backend::{LopdfBackend, PdfBackend};
use crate::types::{Extraction, PageText, NO_TEXT_MESSAGE};
use crate::PdfError;

/// Extract normalized text from every page the backend can read.
///
/// A page that fails to extract is skipped; the rest of the document is
/// still returned. Pages whose normalized text is blank contribute to the
/// full text but are not recorded as [`PageText`] entries.
pub fn extract_with<B: PdfBackend + ?Sized>(backend: &B) -> Extraction {
    let page_numbers = backend.page_numbers();
    let total_pages = page_numbers.len();

    let mut full_text = String::new();
    let mut pages = Vec::new();

    for page in page_numbers {
        let raw = match backend.page_text(page) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("Skipping page {page}: {e}");
                continue;
            }
        };
        if raw.is_empty() {
            continue;
        }

        let content = normalize_whitespace(&raw);
        full_text.push_str(&content);
        full_text.push('\n');

        let trimmed = content.trim();
        if !trimmed.is_empty() {
            pages.push(PageText {
                page_number: page,
                content: trimmed.to_string(),
            });
        }
    }

    let full_text = full_text.trim();
    if full_text.is_empty() {
        return Extraction::Empty {
            message: NO_TEXT_MESSAGE.to_string(),
            total_pages,
        };
    }

    Extraction::Extracted {
        full_text: full_text.to_string(),
        pages,
        total_pages,
    }
}

/// Extract text from PDF bytes.
pub fn extract(bytes: &[u8]) -> Extraction {
    match LopdfBackend::load_bytes(bytes) {
        Ok(backend) => extract_with(&backend),
        Err(e) => Extraction::from_error(&e),
    }
}

/// Extract text from a PDF on disk.
pub fn extract_file(path: &Path) -> Extraction {
    match std::fs::read(path) {
        Ok(bytes) => extract(&bytes),
        Err(e) => Extraction::from_error(&PdfError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fixtures::{encrypted_pdf_with_pages, pdf_with_pages};
    use crate::types::ENCRYPTED_MESSAGE;

    /// In-memory backend; `None` entries fail to extract.
    struct MockBackend {
        pages: Vec<Option<String>>,
    }

    impl MockBackend {
        fn new(pages: &[Option<&str>]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.map(str::to_string)).collect(),
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn page_numbers(&self) -> Vec<u32> {
            (1..=self.pages.len() as u32).collect()
        }

        fn page_text(&self, page: u32) -> Result<String, PdfError> {
            self.pages[(page - 1) as usize]
                .clone()
                .ok_or_else(|| PdfError::Page {
                    page,
                    reason: "broken content stream".to_string(),
                })
        }
    }

    #[test]
    fn test_failing_page_is_skipped() {
        let backend = MockBackend::new(&[Some("first page"), None, Some("third page")]);
        let extraction = extract_with(&backend);

        assert!(extraction.success());
        assert_eq!(extraction.total_pages(), 3);
        let numbers: Vec<_> = extraction.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(extraction.full_text(), "first page\nthird page");
    }

    #[test]
    fn test_pages_are_normalized() {
        let backend = MockBackend::new(&[Some("Revenue   of\t\t$10  million\n\n\n")]);
        let extraction = extract_with(&backend);
        assert_eq!(extraction.pages()[0].content, "Revenue of $10 million");
        assert_eq!(extraction.full_text(), "Revenue of $10 million");
    }

    #[test]
    fn test_pages_keep_single_newlines() {
        let backend = MockBackend::new(&[Some("line one\nline two")]);
        let extraction = extract_with(&backend);
        assert_eq!(extraction.pages()[0].content, "line one\nline two");
    }

    #[test]
    fn test_blank_pages_are_not_recorded() {
        let backend = MockBackend::new(&[Some("   "), Some("content"), Some("")]);
        let extraction = extract_with(&backend);
        assert_eq!(extraction.pages().len(), 1);
        assert_eq!(extraction.pages()[0].page_number, 2);
        assert_eq!(extraction.total_pages(), 3);
    }

    #[test]
    fn test_no_text_is_a_soft_success() {
        let backend = MockBackend::new(&[Some(""), Some("  \n "), None]);
        let extraction = extract_with(&backend);

        assert!(extraction.success());
        assert_eq!(extraction.full_text(), "");
        assert!(extraction.pages().is_empty());
        assert_eq!(extraction.error(), Some(NO_TEXT_MESSAGE));
        assert_eq!(extraction.total_pages(), 3);
    }

    #[test]
    fn test_zero_page_document() {
        let backend = MockBackend::new(&[]);
        let extraction = extract_with(&backend);
        assert!(matches!(
            extraction,
            Extraction::Empty { total_pages: 0, .. }
        ));
    }

    #[test]
    fn test_extract_real_document() {
        let bytes = pdf_with_pages(&["Revenue of $45.2 million", "Pending litigation"]);
        let extraction = extract(&bytes);

        assert!(extraction.success(), "{:?}", extraction.error());
        assert_eq!(extraction.total_pages(), 2);
        assert_eq!(extraction.pages().len(), 2);
        assert!(extraction.full_text().contains("Revenue of $45.2 million"));
        assert!(extraction.full_text().contains("Pending litigation"));
    }

    #[test]
    fn test_extract_scanned_document() {
        let bytes = pdf_with_pages(&["", ""]);
        let extraction = extract(&bytes);

        assert!(extraction.success());
        assert_eq!(extraction.full_text(), "");
        assert!(extraction.pages().is_empty());
        assert!(extraction.error().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_extract_encrypted_with_unknown_password() {
        let bytes = encrypted_pdf_with_pages(&["Revenue of $45.2 million"], "secret");
        let extraction = extract(&bytes);

        assert!(!extraction.success());
        assert_eq!(extraction.error(), Some(ENCRYPTED_MESSAGE));
        assert!(extraction.pages().is_empty());
        assert_eq!(extraction.total_pages(), 0);
    }

    #[test]
    fn test_extract_encrypted_with_empty_password() {
        let bytes = encrypted_pdf_with_pages(&["Revenue of $45.2 million"], "");
        let extraction = extract(&bytes);

        assert!(extraction.success(), "{:?}", extraction.error());
        assert_eq!(extraction.error(), None);
        assert_eq!(extraction.full_text(), "Revenue of $45.2 million");
        assert_eq!(extraction.total_pages(), 1);
    }

    #[test]
    fn test_extract_malformed_bytes() {
        let extraction = extract(b"this is not a pdf");
        assert!(!extraction.success());
        assert!(extraction
            .error()
            .is_some_and(|e| e.starts_with("PDF extraction failed:")));
        assert_eq!(extraction.total_pages(), 0);
        assert!(extraction.pages().is_empty());
    }

    #[test]
    fn test_extract_missing_file() {
        let extraction = extract_file(Path::new("/definitely/not/here.pdf"));
        assert!(!extraction.success());
        assert_eq!(extraction.total_pages(), 0);
    }
}
