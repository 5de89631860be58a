use finlens_core::analysis::{sanitize_error, DEFAULT_QUERY};

use crate::llm::{Analyst, LlmOptions};
use crate::prelude::{eprintln, println, *};
use crate::toolkit::Toolkit;

#[derive(Debug, clap::Args)]
pub struct AnalyzeOptions {
    /// Path to the PDF file
    pub path: std::path::PathBuf,

    /// Question to ask about the document
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Output as JSON (analysis text plus response metadata)
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub llm: LlmOptions,
}

pub async fn run(options: AnalyzeOptions, global: crate::Global) -> Result<()> {
    let bytes = tokio::fs::read(&options.path)
        .await
        .with_context(|| format!("Failed to read {}", options.path.display()))?;

    let path = options.path.clone();
    let extraction = tokio::task::spawn_blocking(move || Toolkit::new().read_document(&path))
        .await
        .map_err(|e| eyre!("Task join error: {e}"))?;

    let analyst = Analyst::from_options(&options.llm);

    if global.verbose {
        eprintln!("Provider: {}", analyst.provider().as_str());
        eprintln!("Model: {}", analyst.model());
        eprintln!("Document: {} bytes, {} pages", bytes.len(), extraction.total_pages());
    }

    let response = analyst
        .analyze(&options.query, &bytes, extraction.full_text())
        .await
        .map_err(|e| eyre!(sanitize_error(&e.to_string())))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.text);
    }

    Ok(())
}
