use colored::Colorize;
use finlens_core::metrics::{InvestmentOutcome, MetricSlot};
use finlens_core::risk::RiskOutcome;
use pdf::Extraction;

use crate::prelude::{eprintln, println, *};
use crate::toolkit::Toolkit;

#[derive(Debug, clap::Parser)]
#[command(name = "doc")]
#[command(about = "Run the document tools on a local PDF")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Extract normalized page text
    Extract(DocOptions),
    /// Detect revenue, profit, expenses and growth figures
    Metrics(DocOptions),
    /// Identify risk keywords with surrounding context
    Risks(DocOptions),
}

#[derive(Debug, clap::Args)]
pub struct DocOptions {
    /// Path to the PDF file
    pub path: std::path::PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let toolkit = Toolkit::new();

    match app.command {
        Commands::Extract(options) => {
            let extraction = read(&toolkit, &options, &global).await?;
            if options.json {
                println!("{}", serde_json::to_string_pretty(&extraction)?);
            } else {
                print_extraction(&extraction);
            }
        }
        Commands::Metrics(options) => {
            let extraction = read(&toolkit, &options, &global).await?;
            let outcome = toolkit.metrics.analyze(extraction.full_text());
            if options.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_investment(&outcome);
            }
        }
        Commands::Risks(options) => {
            let extraction = read(&toolkit, &options, &global).await?;
            let outcome = toolkit.risks.assess(extraction.full_text());
            if options.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_risks(&outcome);
            }
        }
    }

    Ok(())
}

async fn read(toolkit: &Toolkit, options: &DocOptions, global: &crate::Global) -> Result<Extraction> {
    let path = options.path.clone();
    let reader = toolkit.clone();
    let extraction = tokio::task::spawn_blocking(move || reader.read_document(&path))
        .await
        .map_err(|e| eyre!("Task join error: {e}"))?;

    if global.verbose {
        eprintln!(
            "{}: {} pages, {} with text",
            options.path.display(),
            extraction.total_pages(),
            extraction.pages().len()
        );
    }

    Ok(extraction)
}

fn print_extraction(extraction: &Extraction) {
    if let Some(message) = extraction.error() {
        let label = if extraction.success() {
            "Note".yellow()
        } else {
            "Error".red()
        };
        println!("{}: {}", label, message);
    }

    for page in extraction.pages() {
        println!(
            "\n{}",
            format!("--- Page {} ---", page.page_number).bright_cyan()
        );
        println!("{}", page.content);
    }

    println!(
        "\n{}: {}",
        "Total pages".green(),
        extraction.total_pages()
    );
}

fn print_investment(outcome: &InvestmentOutcome) {
    let Some(metrics) = outcome.metrics() else {
        println!("{}: {}", "Error".red(), outcome.error().unwrap_or_default());
        return;
    };

    let mut table = new_table();
    table.add_row(prettytable::row!["METRIC", "VALUE"]);
    for slot in MetricSlot::ALL {
        table.add_row(prettytable::row![slot.as_str(), metrics.get(slot).unwrap_or("-")]);
    }
    table.printstd();

    for insight in outcome.insights() {
        println!("{} {}", "•".bright_cyan(), insight);
    }
}

fn print_risks(outcome: &RiskOutcome) {
    if let Some(message) = outcome.error() {
        println!("{}: {}", "Error".red(), message);
        return;
    }

    if outcome.risks().is_empty() {
        println!("No risk factors identified.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["CATEGORY", "FINDINGS"]);
    for (category, count) in outcome.summary() {
        table.add_row(prettytable::row![category.as_str(), count]);
    }
    table.printstd();

    for finding in outcome.risks() {
        println!(
            "\n{} {}",
            format!("[{}]", finding.category).yellow(),
            finding.factor.bold()
        );
        println!("  {}", finding.context.dimmed());
    }

    println!(
        "\n{}: {}",
        "Total risks identified".green(),
        outcome.risks().len()
    );
}
