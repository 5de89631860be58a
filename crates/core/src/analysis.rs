use base64::Engine;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "Analyze this financial document for investment insights. \
Return your answer as plain text only, without any formatting, bullet points, or markdown.";

/// System preamble for text-only model providers.
pub const ANALYST_PREAMBLE: &str = "\
You are a Senior Financial Analyst.
Goal: analyze financial documents and provide evidence-based investment insights.
Background: experienced financial analyst with expertise in document analysis, \
market research, and investment strategy.

Rules:
- Base every statement on the supplied document text.
- Say so explicitly when the document does not contain the information asked for.
- Do not invent figures.";

const KEY_ERROR_MESSAGE: &str = "API authentication error (key-related)";

/// Build the analysis prompt for providers that receive extracted text
/// instead of the raw PDF.
pub fn build_prompt(query: &str, document_text: &str) -> String {
    let query = match query.trim() {
        "" => DEFAULT_QUERY,
        q => q,
    };

    format!(
        "Analyze the provided financial document based on user query: {query}

Document Text:
{document_text}

Requirements:
1. Extract and analyze key financial metrics
2. Identify revenue, profit, and growth trends
3. Evaluate market position and competitive landscape
4. Assess potential risks and compliance issues
5. Provide evidence-based investment recommendations

Expected output:
1. Executive Summary: document overview and key findings
2. Financial Analysis: revenue and profit analysis, growth metrics, market position
3. Risk Assessment: identified risks and mitigation strategies
4. Investment Recommendations: evidence-based suggestions and key considerations"
    )
}

/// Hide provider error details that may echo credentials.
pub fn sanitize_error(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("api") && lower.contains("key") {
        KEY_ERROR_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

// ---------------------------------------------------------------------------
// Gemini generateContent wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_token_count: Option<u64>,
    pub candidates_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<TokenUsage>,
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Build a single-turn request carrying the query and the raw PDF inline.
pub fn gemini_request(query: &str, pdf_bytes: &[u8]) -> GenerateContentRequest {
    let encoded = base64::engine::general_purpose::STANDARD.encode(pdf_bytes);

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part {
                    text: Some(query.to_string()),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(Blob {
                        mime_type: crate::upload::PDF_CONTENT_TYPE.to_string(),
                        data: encoded,
                    }),
                },
            ],
        }],
    }
}

/// Provider-independent description of a completed model call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub text: String,
    pub metadata: ResponseMetadata,
}
