use finlens_core::analysis::{
    build_prompt, gemini_request, AnalysisResponse, GenerateContentResponse, ResponseMetadata,
    ANALYST_PREAMBLE,
};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;

use crate::prelude::*;

const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";
const OLLAMA_DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// Google Gemini; receives the raw PDF
    Gemini,
    /// Local Ollama; receives the extracted text
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "google",
            Provider::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_DEFAULT_MODEL,
            Provider::Ollama => OLLAMA_DEFAULT_MODEL,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmOptions {
    /// Model provider used for the analysis
    #[arg(long, env = "FINLENS_PROVIDER", value_enum, default_value_t = Provider::Gemini)]
    pub provider: Provider,

    /// Model name (defaults to gemini-2.0-flash or llama3.1 depending on the provider)
    #[arg(long, env = "FINLENS_MODEL")]
    pub model: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub gemini_base_url: String,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,
}

/// The external model that writes the investment analysis.
#[derive(Debug, Clone)]
pub enum Analyst {
    Gemini(GeminiClient),
    Ollama(OllamaClient),
}

impl Analyst {
    pub fn from_options(options: &LlmOptions) -> Self {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| options.provider.default_model().to_string());

        match options.provider {
            Provider::Gemini => Analyst::Gemini(GeminiClient {
                http: reqwest::Client::new(),
                base_url: options.gemini_base_url.trim_end_matches('/').to_string(),
                api_key: options.gemini_api_key.clone().filter(|k| !k.is_empty()),
                model,
            }),
            Provider::Ollama => Analyst::Ollama(OllamaClient {
                base_url: options.ollama_url.clone(),
                model,
            }),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Analyst::Gemini(client) => &client.model,
            Analyst::Ollama(client) => &client.model,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Analyst::Gemini(_) => Provider::Gemini,
            Analyst::Ollama(_) => Provider::Ollama,
        }
    }

    /// Ask the model to analyze a document.
    ///
    /// Gemini reads `pdf_bytes` directly; Ollama only sees `document_text`.
    pub async fn analyze(
        &self,
        query: &str,
        pdf_bytes: &[u8],
        document_text: &str,
    ) -> Result<AnalysisResponse> {
        log::info!(
            "Calling {} ({}) for analysis",
            self.provider().as_str(),
            self.model()
        );

        match self {
            Analyst::Gemini(client) => client.analyze(query, pdf_bytes).await,
            Analyst::Ollama(client) => client.analyze(query, document_text).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn analyze(&self, query: &str, pdf_bytes: &[u8]) -> Result<AnalysisResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingApiKey("GEMINI_API_KEY"))?;

        let body = gemini_request(query, pdf_bytes);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("Gemini returned {status}: {detail}")).into());
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to decode Gemini response: {e}")))?;

        let text = parsed.text().ok_or(Error::EmptyCompletion)?;

        Ok(AnalysisResponse {
            text,
            metadata: ResponseMetadata {
                model: parsed.model_version.unwrap_or_else(|| self.model.clone()),
                provider: Provider::Gemini.as_str().to_string(),
                tokens_used: parsed.usage_metadata,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
}

impl OllamaClient {
    fn create_client(&self) -> Result<ollama::Client> {
        use rig::client::Nothing;

        ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&self.base_url)
            .build()
            .map_err(|e| eyre!("Failed to create Ollama client: {}", e))
    }

    async fn analyze(&self, query: &str, document_text: &str) -> Result<AnalysisResponse> {
        let prompt = build_prompt(query, document_text);

        let client = self.create_client()?;
        let agent = client.agent(&self.model).preamble(ANALYST_PREAMBLE).build();

        let response = agent
            .prompt(&prompt)
            .await
            .map_err(|e| Error::Provider(format!("Model generation failed: {e}")))?;

        if response.trim().is_empty() {
            return Err(Error::EmptyCompletion.into());
        }

        Ok(AnalysisResponse {
            text: response,
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: Provider::Ollama.as_str().to_string(),
                tokens_used: None,
            },
        })
    }
}
