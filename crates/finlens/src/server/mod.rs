mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use finlens_core::analysis::{sanitize_error, AnalysisResponse, DEFAULT_QUERY};
use finlens_core::debug::{preview_bytes, DebugRecord, PREVIEW_CHARS};
use finlens_core::upload::{validate_upload, UploadError, MAX_FILE_SIZE};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::llm::{Analyst, LlmOptions};
use crate::prelude::{eprintln, *};
use crate::toolkit::{Findings, Toolkit};

use storage::{save_debug_info, TransientUpload};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "FINLENS_PORT", default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "FINLENS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Directory for transient uploads
    #[arg(long, env = "FINLENS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for debug records and the log file
    #[arg(long, env = "FINLENS_OUTPUTS_DIR", default_value = "outputs")]
    pub outputs_dir: PathBuf,

    #[clap(flatten)]
    pub llm: LlmOptions,
}

/// Shared state handed to every request.
pub struct AppState {
    pub toolkit: Toolkit,
    pub analyst: Analyst,
    pub data_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    let addr = format!("{}:{}", options.host, options.port);

    for dir in [&options.data_dir, &options.outputs_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let analyst = Analyst::from_options(&options.llm);

    if global.verbose {
        eprintln!("Provider: {} ({})", analyst.provider().as_str(), analyst.model());
        eprintln!("Data directory: {}", options.data_dir.display());
        eprintln!("Outputs directory: {}", options.outputs_dir.display());
    }

    let state = Arc::new(AppState {
        toolkit: Toolkit::new(),
        analyst,
        data_dir: options.data_dir,
        outputs_dir: options.outputs_dir,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Financial Document Analyzer listening on http://{addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

/// Request bodies may exceed the upload limit so oversized files still reach
/// `validate_upload` and get a precise error.
const BODY_LIMIT: usize = 2 * MAX_FILE_SIZE;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze_document))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    /// Map a multipart read failure. Hitting the body limit is reported the
    /// same way as an oversized upload.
    fn from_multipart(context: &str, err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::from(UploadError::TooLarge(BODY_LIMIT))
        } else {
            ApiError::BadRequest(format!("{context}: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub query: String,
    pub analysis: String,
    pub file_processed: Option<String>,
    pub file_id: String,
    pub processing_time: String,
    pub findings: Findings,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Financial Document Analyzer API is running"
    }))
}

#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
    query: Option<String>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::from_multipart("Invalid multipart body", e))?
        {
            match field.name() {
                Some("file") => {
                    form.file_name = field.file_name().map(str::to_string);
                    form.content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::from_multipart("Failed to read upload", e))?;
                    form.bytes = Some(bytes.to_vec());
                }
                Some("query") => {
                    let query = field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_multipart("Invalid query field", e))?;
                    form.query = Some(query);
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// A blank or missing query falls back to the default analysis request.
fn resolve_query(query: Option<String>) -> String {
    match query {
        Some(q) if !q.trim().is_empty() => q.trim().to_string(),
        _ => DEFAULT_QUERY.to_string(),
    }
}

async fn analyze_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let form = UploadForm::read(&mut multipart).await?;
    let bytes = form.bytes.ok_or(UploadError::Missing)?;
    validate_upload(form.content_type.as_deref(), bytes.len())?;

    let query = resolve_query(form.query);
    let file_id = uuid::Uuid::new_v4().to_string();

    let mut debug = DebugRecord::new(&file_id, Local::now(), form.file_name.clone(), &query);
    debug.file_size = bytes.len();
    debug.text_preview = Some(preview_bytes(&bytes, PREVIEW_CHARS));
    debug.step(format!("File read: {} bytes", bytes.len()));

    log::info!(
        "Processing {} ({} bytes) as {file_id}",
        form.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes.len()
    );

    match process(&state, &file_id, &query, &bytes, &mut debug).await {
        Ok((response, findings)) => {
            debug.response_metadata = Some(response.metadata);
            debug.step("Processing completed successfully");
            let elapsed = debug.complete(Local::now());
            save_debug_info(&state.outputs_dir, &debug).await;

            log::info!("Analysis of {file_id} completed in {elapsed:.2}s");

            Ok(Json(AnalyzeResponse {
                status: "success",
                query,
                analysis: response.text,
                file_processed: form.file_name,
                file_id,
                processing_time: format!("{elapsed:.2}s"),
                findings,
            }))
        }
        Err(err) => {
            let message = sanitize_error(&err.to_string());
            debug.fail(&message);
            debug.complete(Local::now());
            save_debug_info(&state.outputs_dir, &debug).await;

            log::error!("Analysis of {file_id} failed: {message}");

            Err(ApiError::Internal(format!(
                "Error processing financial document: {message}"
            )))
        }
    }
}

/// Run the heuristic tools and the model over one upload. The transient copy
/// on disk is removed when this returns.
async fn process(
    state: &AppState,
    file_id: &str,
    query: &str,
    bytes: &[u8],
    debug: &mut DebugRecord,
) -> Result<(AnalysisResponse, Findings)> {
    let upload = TransientUpload::create(&state.data_dir, file_id, bytes)
        .context("Failed to save uploaded file")?;
    debug.step(format!("File saved to: {}", upload.path().display()));

    let path = upload.path().to_path_buf();
    let toolkit = state.toolkit.clone();
    let findings = tokio::task::spawn_blocking(move || {
        let extraction = toolkit.read_document(&path);
        toolkit.inspect(extraction)
    })
    .await
    .map_err(|e| eyre!("Task join error: {e}"))?;

    debug.step(format!(
        "Extracted {} of {} pages",
        findings.extraction.pages().len(),
        findings.extraction.total_pages()
    ));

    debug.step(format!(
        "Calling {} ({})",
        state.analyst.provider().as_str(),
        state.analyst.model()
    ));
    let response = state
        .analyst
        .analyze(query, bytes, findings.extraction.full_text())
        .await?;
    debug.step(format!("Received response: {} characters", response.text.len()));

    Ok((response, findings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::{FromRequest, Request};

    use crate::llm::Provider;

    const BOUNDARY: &str = "finlens-boundary";

    /// Multipart request with a `file` part and an optional `query` part.
    async fn multipart(file: &[u8], content_type: &str, query: Option<&str>) -> Multipart {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"q3.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
        if let Some(query) = query {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\n{query}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    /// State whose Gemini analyst has no API key, so every model call fails.
    fn keyless_state(root: &std::path::Path) -> AppState {
        let options = LlmOptions {
            provider: Provider::Gemini,
            model: None,
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
        };
        AppState {
            toolkit: Toolkit::new(),
            analyst: Analyst::from_options(&options),
            data_dir: root.join("data"),
            outputs_dir: root.join("outputs"),
        }
    }

    fn entries(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_message() {
        let Json(body) = root().await;
        assert_eq!(body["message"], "Financial Document Analyzer API is running");
    }

    #[tokio::test]
    async fn test_upload_errors_are_bad_requests() {
        let response = ApiError::from(UploadError::NotPdf(Some("text/plain".into()))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Only PDF files are allowed.");
    }

    #[tokio::test]
    async fn test_internal_errors_carry_detail() {
        let response = ApiError::Internal(
            "Error processing financial document: API authentication error (key-related)".into(),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["detail"],
            "Error processing financial document: API authentication error (key-related)"
        );
    }

    #[test]
    fn test_resolve_query() {
        assert_eq!(resolve_query(None), DEFAULT_QUERY);
        assert_eq!(resolve_query(Some("   ".into())), DEFAULT_QUERY);
        assert_eq!(
            resolve_query(Some(" What is the revenue? ".into())),
            "What is the revenue?"
        );
    }

    #[tokio::test]
    async fn test_upload_form_fields() {
        let mut multipart = multipart(b"%PDF-1.4", "application/pdf", Some("Is it a buy?")).await;
        let form = UploadForm::read(&mut multipart).await.unwrap();

        assert_eq!(form.file_name.as_deref(), Some("q3.pdf"));
        assert_eq!(form.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(form.bytes.as_deref(), Some(&b"%PDF-1.4"[..]));
        assert_eq!(form.query.as_deref(), Some("Is it a buy?"));
    }

    #[tokio::test]
    async fn test_body_over_limit_reports_file_too_large() {
        // Without a DefaultBodyLimit layer axum caps bodies at 2 MiB.
        let file = vec![b'a'; 3 * 1024 * 1024];
        let mut multipart = multipart(&file, "application/pdf", None).await;

        let err = UploadForm::read(&mut multipart).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "File too large. Maximum allowed size is 10MB."
        );
    }

    #[tokio::test]
    async fn test_process_removes_upload_when_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let state = keyless_state(dir.path());
        let mut debug = DebugRecord::new("file-1", Local::now(), None, DEFAULT_QUERY);

        let result = process(&state, "file-1", DEFAULT_QUERY, b"%PDF-1.4", &mut debug).await;

        assert!(result.is_err());
        assert!(state.data_dir.exists());
        assert!(entries(&state.data_dir).is_empty());
        assert!(debug.processing_steps[0].starts_with("File saved to:"));
    }

    #[tokio::test]
    async fn test_failed_analysis_is_reported_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(keyless_state(dir.path()));
        let multipart = multipart(b"%PDF-1.4", "application/pdf", None).await;

        let err = analyze_document(State(state.clone()), multipart)
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["detail"],
            "Error processing financial document: API authentication error (key-related)"
        );
        assert!(entries(&state.data_dir).is_empty());

        let records = entries(&state.outputs_dir);
        assert_eq!(records.len(), 1);
        let record: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&records[0]).unwrap()).unwrap();
        assert_eq!(record["error"], "API authentication error (key-related)");
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(keyless_state(dir.path()));
        let multipart = multipart(b"hello", "text/plain", None).await;

        let err = analyze_document(State(state.clone()), multipart)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(ref d) if d == "Only PDF files are allowed."));
        assert!(entries(&state.data_dir).is_empty());
    }
}
