use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::analysis::ResponseMetadata;

/// Characters of raw upload kept in a debug record.
pub const PREVIEW_CHARS: usize = 500;

/// Per-request trace persisted next to the analyzer's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugRecord {
    pub file_id: String,
    pub timestamp: DateTime<Local>,
    pub original_filename: Option<String>,
    pub query: String,
    pub file_size: usize,
    pub processing_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DebugRecord {
    pub fn new(
        file_id: impl Into<String>,
        timestamp: DateTime<Local>,
        original_filename: Option<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            timestamp,
            original_filename,
            query: query.into(),
            file_size: 0,
            processing_steps: Vec::new(),
            text_preview: None,
            response_metadata: None,
            processing_time_seconds: None,
            completion_time: None,
            error: None,
        }
    }

    pub fn step(&mut self, step: impl Into<String>) {
        self.processing_steps.push(step.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.step(format!("Error occurred: {message}"));
        self.error = Some(message);
    }

    /// Stamp the completion time and return the elapsed seconds.
    pub fn complete(&mut self, at: DateTime<Local>) -> f64 {
        let elapsed = (at - self.timestamp).num_milliseconds() as f64 / 1000.0;
        self.processing_time_seconds = Some(elapsed);
        self.completion_time = Some(at);
        elapsed
    }

    /// File name the record is persisted under.
    pub fn file_name(&self) -> String {
        format!("debug_{}.json", self.file_id)
    }
}

/// Escaped printable preview of raw bytes, at most `max_chars` characters.
pub fn preview_bytes(bytes: &[u8], max_chars: usize) -> String {
    let escaped: String = bytes
        .iter()
        .take(max_chars)
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect();

    let preview = if bytes.len() > max_chars {
        format!("{escaped}...")
    } else {
        escaped
    };

    preview.chars().take(max_chars).collect()
}
