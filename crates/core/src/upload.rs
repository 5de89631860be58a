use thiserror::Error;

/// Largest upload accepted by the analyzer (10 MiB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Only PDF files are allowed.")]
    NotPdf(Option<String>),
    #[error("File too large. Maximum allowed size is 10MB.")]
    TooLarge(usize),
    #[error("No file provided.")]
    Missing,
}

/// Check an upload's declared content type and size before it reaches the
/// extractor.
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), UploadError> {
    match content_type {
        Some(PDF_CONTENT_TYPE) => {}
        other => return Err(UploadError::NotPdf(other.map(str::to_string))),
    }

    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge(size));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_within_limit() {
        assert_eq!(validate_upload(Some("application/pdf"), 1024), Ok(()));
        assert_eq!(validate_upload(Some("application/pdf"), MAX_FILE_SIZE), Ok(()));
    }

    #[test]
    fn test_rejects_other_content_types() {
        let err = validate_upload(Some("text/plain"), 10).unwrap_err();
        assert_eq!(err, UploadError::NotPdf(Some("text/plain".to_string())));
        assert_eq!(err.to_string(), "Only PDF files are allowed.");
        assert!(matches!(validate_upload(None, 10), Err(UploadError::NotPdf(None))));
    }

    #[test]
    fn test_rejects_oversized() {
        let err = validate_upload(Some("application/pdf"), MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(err, UploadError::TooLarge(MAX_FILE_SIZE + 1));
        assert_eq!(
            err.to_string(),
            "File too large. Maximum allowed size is 10MB."
        );
    }

    #[test]
    fn test_content_type_checked_first() {
        let err = validate_upload(Some("image/png"), MAX_FILE_SIZE + 1).unwrap_err();
        assert!(matches!(err, UploadError::NotPdf(_)));
    }
}
