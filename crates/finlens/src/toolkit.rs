use std::path::Path;

use finlens_core::metrics::{InvestmentOutcome, MetricExtractor};
use finlens_core::risk::{RiskIdentifier, RiskOutcome};
use pdf::Extraction;
use serde::Serialize;

/// The document tools, built once per process and shared by every caller.
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    pub metrics: MetricExtractor,
    pub risks: RiskIdentifier,
}

/// Everything the heuristic pipeline learned about one document.
#[derive(Debug, Clone, Serialize)]
pub struct Findings {
    pub extraction: Extraction,
    pub investment: InvestmentOutcome,
    pub risk: RiskOutcome,
}

impl Toolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_document(&self, path: &Path) -> Extraction {
        let extraction = pdf::extract_file(path);
        match extraction.error() {
            Some(message) if !extraction.success() => {
                log::warn!("Extraction failed for {}: {message}", path.display())
            }
            Some(message) => log::info!("{}: {message}", path.display()),
            None => log::info!(
                "Extracted {} of {} pages from {}",
                extraction.pages().len(),
                extraction.total_pages(),
                path.display()
            ),
        }
        extraction
    }

    /// Run the metric and risk tools over an extraction's full text.
    pub fn inspect(&self, extraction: Extraction) -> Findings {
        let text = extraction.full_text();
        let investment = self.metrics.analyze(text);
        let risk = self.risks.assess(text);
        Findings {
            extraction,
            investment,
            risk,
        }
    }
}
