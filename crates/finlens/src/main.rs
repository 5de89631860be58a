use crate::prelude::*;
use clap::Parser;

mod analyze;
mod document;
mod error;
mod llm;
mod logging;
mod mcp;
mod prelude;
mod server;
mod toolkit;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract text, metrics and risk factors from financial PDFs and analyze them with an LLM"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "FINLENS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// Mirror log output to this file (in addition to stderr)
    #[clap(long, env = "FINLENS_LOG_FILE", global = true)]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Run the extraction, metric and risk tools on a local PDF
    Doc(crate::document::App),

    /// Analyze a local PDF with the configured model provider
    Analyze(crate::analyze::AnalyzeOptions),

    /// Start the HTTP analysis server
    Serve(crate::server::ServeOptions),

    /// Model Context Protocol server exposing the document tools
    MCP(crate::mcp::App),
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// `--log-file` wins; `serve` otherwise logs into its outputs directory.
fn log_file(app: &App) -> Option<std::path::PathBuf> {
    match &app.command {
        SubCommands::Serve(options) => app
            .global
            .log_file
            .clone()
            .or_else(|| Some(options.outputs_dir.join("financial_analyzer.log"))),
        _ => app.global.log_file.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    logging::init(DEFAULT_LOG_LEVEL, log_file(&app).as_deref())?;

    match app.command {
        SubCommands::Doc(sub_app) => crate::document::run(sub_app, app.global).await,
        SubCommands::Analyze(options) => crate::analyze::run(options, app.global).await,
        SubCommands::Serve(options) => crate::server::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
