use std::io::Write;
use std::path::{Path, PathBuf};

use finlens_core::debug::DebugRecord;

/// An uploaded document on disk for the duration of one request.
///
/// The file is named after the request's id and removed when the value is
/// dropped, whether the request succeeded or not.
pub struct TransientUpload {
    file: Option<tempfile::NamedTempFile>,
    path: PathBuf,
}

impl TransientUpload {
    pub fn create(dir: &Path, file_id: &str, bytes: &[u8]) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("financial_document_{file_id}"))
            .suffix(".pdf")
            .rand_bytes(0)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        log::info!("Saved upload to {}", path.display());

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientUpload {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => log::info!("Cleaned up temporary file: {}", self.path.display()),
                Err(e) => log::error!("Cleanup error for {}: {e}", self.path.display()),
            }
        }
    }
}

/// Write a debug record as pretty JSON into `dir`. Failures are logged only.
pub async fn save_debug_info(dir: &Path, record: &DebugRecord) {
    let path = dir.join(record.file_name());

    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    }
    .await;

    match result {
        Ok(()) => log::info!("Debug info saved to {}", path.display()),
        Err(e) => log::error!("Failed to save debug info: {e}"),
    }
}
