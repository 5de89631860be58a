use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Message returned when the risk identifier receives no text at all.
pub const NO_RISK_DATA: &str = "No data available for risk assessment";

/// Characters of surrounding text captured on each side of a keyword match.
pub const CONTEXT_RADIUS: usize = 50;

/// Fixed keyword-driven risk classification.
///
/// Variant order is the scan order and the order of the summary map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Litigation Risk")]
    Litigation,
    #[serde(rename = "Financial Risk")]
    Financial,
    #[serde(rename = "Market Risk")]
    Market,
    #[serde(rename = "Operational Risk")]
    Operational,
    #[serde(rename = "Regulatory Risk")]
    Regulatory,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Litigation,
        RiskCategory::Financial,
        RiskCategory::Market,
        RiskCategory::Operational,
        RiskCategory::Regulatory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Litigation => "Litigation Risk",
            RiskCategory::Financial => "Financial Risk",
            RiskCategory::Market => "Market Risk",
            RiskCategory::Operational => "Operational Risk",
            RiskCategory::Regulatory => "Regulatory Risk",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            RiskCategory::Litigation => &["litigation", "lawsuit", "legal proceeding"],
            RiskCategory::Financial => &["debt", "default", "bankruptcy", "loss"],
            RiskCategory::Market => &["competition", "market decline", "market share"],
            RiskCategory::Operational => &["disruption", "supply chain", "operational"],
            RiskCategory::Regulatory => &["regulation", "compliance", "regulatory"],
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single keyword hit with the text around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    #[serde(rename = "type")]
    pub category: RiskCategory,
    pub factor: String,
    pub context: String,
}

/// Finding counts per category. Categories without findings are absent.
pub type RiskSummary = BTreeMap<RiskCategory, usize>;

/// Count findings per category.
pub fn summarize(findings: &[RiskFinding]) -> RiskSummary {
    let mut summary = RiskSummary::new();
    for finding in findings {
        *summary.entry(finding.category).or_insert(0) += 1;
    }
    summary
}

/// Result of running the risk identifier over a document's text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RiskOutcome {
    Assessed {
        risks: Vec<RiskFinding>,
        risk_summary: RiskSummary,
        total_risks_identified: usize,
    },
    NoData {
        error: String,
        risks: Vec<RiskFinding>,
        risk_summary: RiskSummary,
    },
}

impl RiskOutcome {
    pub fn error(&self) -> Option<&str> {
        match self {
            RiskOutcome::Assessed { .. } => None,
            RiskOutcome::NoData { error, .. } => Some(error),
        }
    }

    pub fn risks(&self) -> &[RiskFinding] {
        match self {
            RiskOutcome::Assessed { risks, .. } | RiskOutcome::NoData { risks, .. } => risks,
        }
    }

    pub fn summary(&self) -> &RiskSummary {
        match self {
            RiskOutcome::Assessed { risk_summary, .. }
            | RiskOutcome::NoData { risk_summary, .. } => risk_summary,
        }
    }
}

/// Keyword scanner over the fixed risk-category table.
///
/// Stateless once built; construct one per process and share it.
#[derive(Debug, Clone)]
pub struct RiskIdentifier {
    patterns: Vec<(RiskCategory, Regex)>,
}

impl Default for RiskIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskIdentifier {
    pub fn new() -> Self {
        let patterns = RiskCategory::ALL
            .iter()
            .flat_map(|category| {
                category.keywords().iter().map(move |keyword| {
                    let re = Regex::new(&format!("(?i){}", regex::escape(keyword)))
                        .expect("risk keyword must compile");
                    (*category, re)
                })
            })
            .collect();
        Self { patterns }
    }

    /// Every non-overlapping occurrence of every keyword, grouped by category
    /// then keyword, in document order within each keyword.
    pub fn identify(&self, text: &str) -> Vec<RiskFinding> {
        let mut findings = Vec::new();
        for (category, re) in &self.patterns {
            for m in re.find_iter(text) {
                findings.push(RiskFinding {
                    category: *category,
                    factor: m.as_str().to_lowercase(),
                    context: context_window(text, m.start(), m.end(), CONTEXT_RADIUS).to_string(),
                });
            }
        }
        findings
    }

    pub fn assess(&self, text: &str) -> RiskOutcome {
        if text.is_empty() {
            return RiskOutcome::NoData {
                error: NO_RISK_DATA.to_string(),
                risks: Vec::new(),
                risk_summary: RiskSummary::new(),
            };
        }

        let risks = self.identify(text);
        let risk_summary = summarize(&risks);

        RiskOutcome::Assessed {
            total_risks_identified: risks.len(),
            risks,
            risk_summary,
        }
    }
}

/// Slice `radius` characters either side of `start..end`, clipped to the
/// text and trimmed.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = match radius {
        0 => start,
        _ => text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0),
    };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].trim()
}
