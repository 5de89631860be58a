mod finance;

use serde::{Deserialize, Serialize};

use crate::toolkit::Toolkit;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "finlens".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let document_data = serde_json::json!({
        "type": "object",
        "properties": {
            "financial_document_data": {
                "type": "string",
                "description": "Text of the financial document, usually the full_text returned by read_financial_document"
            }
        },
        "required": ["financial_document_data"]
    });

    let tools = vec![
        Tool {
            name: "read_financial_document".to_string(),
            description: "Reads and extracts text from a financial PDF document. Returns the normalized full text, the non-empty pages with their 1-based page numbers, and the total page count. Encrypted or unreadable files come back with success=false and an error message; documents without a text layer succeed with an empty full_text.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the PDF file (default: data/sample.pdf)"
                    }
                },
                "required": []
            }),
        },
        Tool {
            name: "analyze_investment".to_string(),
            description: "Analyzes financial document data for investment insights. Detects revenue, profit, expenses and growth figures and returns them with short insight strings.".to_string(),
            input_schema: document_data.clone(),
        },
        Tool {
            name: "assess_risk".to_string(),
            description: "Performs risk assessment on financial document data. Finds litigation, financial, market, operational and regulatory risk keywords, each with 50 characters of surrounding context, and counts findings per category.".to_string(),
            input_schema: document_data,
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    toolkit: &Toolkit,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    match params.name.as_str() {
        "read_financial_document" => {
            finance::handle_read_financial_document(params.arguments, toolkit).await
        }
        "analyze_investment" => finance::handle_analyze_investment(params.arguments, toolkit),
        "assess_risk" => finance::handle_assess_risk(params.arguments, toolkit),
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}
