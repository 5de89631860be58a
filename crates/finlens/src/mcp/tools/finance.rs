use super::{CallToolResult, Content, JsonRpcError};
use crate::toolkit::Toolkit;
use serde::Deserialize;

const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

const DEFAULT_DOCUMENT_PATH: &str = "data/sample.pdf";

fn parse_args<T: serde::de::DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    let arguments = match arguments {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };
    serde_json::from_value(arguments).map_err(|e| JsonRpcError {
        code: INVALID_PARAMS,
        message: format!("Invalid arguments: {e}"),
        data: None,
    })
}

fn internal_err(message: String) -> JsonRpcError {
    JsonRpcError {
        code: INTERNAL_ERROR,
        message,
        data: None,
    }
}

fn to_text_result(value: &impl serde::Serialize) -> Result<serde_json::Value, JsonRpcError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| internal_err(format!("Serialization error: {e}")))?;

    serde_json::to_value(CallToolResult {
        content: vec![Content::Text { text: json }],
        is_error: None,
    })
    .map_err(|e| internal_err(format!("Internal error: {e}")))
}

async fn run_blocking<T, F>(f: F) -> Result<T, JsonRpcError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| internal_err(format!("Task join error: {e}")))
}

#[derive(Deserialize)]
struct DocumentData {
    #[serde(default)]
    financial_document_data: String,
}

pub async fn handle_read_financial_document(
    arguments: Option<serde_json::Value>,
    toolkit: &Toolkit,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        #[serde(default = "default_path")]
        path: String,
    }

    fn default_path() -> String {
        DEFAULT_DOCUMENT_PATH.to_string()
    }

    let args: Args = parse_args(arguments)?;

    let toolkit = toolkit.clone();
    let extraction =
        run_blocking(move || toolkit.read_document(std::path::Path::new(&args.path))).await?;

    to_text_result(&extraction)
}

pub fn handle_analyze_investment(
    arguments: Option<serde_json::Value>,
    toolkit: &Toolkit,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: DocumentData = parse_args(arguments)?;
    to_text_result(&toolkit.metrics.analyze(&args.financial_document_data))
}

pub fn handle_assess_risk(
    arguments: Option<serde_json::Value>,
    toolkit: &Toolkit,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: DocumentData = parse_args(arguments)?;
    to_text_result(&toolkit.risks.assess(&args.financial_document_data))
}
