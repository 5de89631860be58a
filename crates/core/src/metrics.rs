use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::collapse_spaces;

/// Message returned when the metric extractor receives no text at all.
pub const NO_FINANCIAL_DATA: &str = "No financial data provided";

/// One of the four fixed financial-figure categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricSlot {
    Revenue,
    Profit,
    Expenses,
    Growth,
}

impl MetricSlot {
    pub const ALL: [MetricSlot; 4] = [
        MetricSlot::Revenue,
        MetricSlot::Profit,
        MetricSlot::Expenses,
        MetricSlot::Growth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSlot::Revenue => "revenue",
            MetricSlot::Profit => "profit",
            MetricSlot::Expenses => "expenses",
            MetricSlot::Growth => "growth",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            MetricSlot::Revenue => {
                r"(?i)revenue[s]?\s*(?:of|:)?\s*[$£€]?([\d,]+(?:\.\d{1,2})?)\s*(?:million|billion)?"
            }
            MetricSlot::Profit => {
                r"(?i)(?:net income|profit)[s]?\s*(?:of|:)?\s*[$£€]?([\d,]+(?:\.\d{1,2})?)\s*(?:million|billion)?"
            }
            MetricSlot::Expenses => {
                r"(?i)(?:expenses|costs)[s]?\s*(?:of|:)?\s*[$£€]?([\d,]+(?:\.\d{1,2})?)\s*(?:million|billion)?"
            }
            MetricSlot::Growth => r"(?i)(?:growth|increase)[s]?\s*(?:of|:)?\s*([\d,]+(?:\.\d{1,2})?)\s*%",
        }
    }
}

impl fmt::Display for MetricSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-valued metric slots. The first match in document order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub revenue: Option<String>,
    pub profit: Option<String>,
    pub expenses: Option<String>,
    pub growth: Option<String>,
}

impl Metrics {
    pub fn get(&self, slot: MetricSlot) -> Option<&str> {
        match slot {
            MetricSlot::Revenue => self.revenue.as_deref(),
            MetricSlot::Profit => self.profit.as_deref(),
            MetricSlot::Expenses => self.expenses.as_deref(),
            MetricSlot::Growth => self.growth.as_deref(),
        }
    }

    fn set(&mut self, slot: MetricSlot, value: String) {
        let target = match slot {
            MetricSlot::Revenue => &mut self.revenue,
            MetricSlot::Profit => &mut self.profit,
            MetricSlot::Expenses => &mut self.expenses,
            MetricSlot::Growth => &mut self.growth,
        };
        if target.is_none() {
            *target = Some(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        MetricSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }
}

/// Result of running the metric extractor over a document's text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InvestmentOutcome {
    Analyzed {
        metrics: Metrics,
        insights: Vec<String>,
        processed_text: String,
    },
    NoData {
        error: String,
        metrics: BTreeMap<String, String>,
        insights: Vec<String>,
    },
}

impl InvestmentOutcome {
    fn no_data() -> Self {
        InvestmentOutcome::NoData {
            error: NO_FINANCIAL_DATA.to_string(),
            metrics: BTreeMap::new(),
            insights: Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InvestmentOutcome::Analyzed { .. } => None,
            InvestmentOutcome::NoData { error, .. } => Some(error),
        }
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            InvestmentOutcome::Analyzed { metrics, .. } => Some(metrics),
            InvestmentOutcome::NoData { .. } => None,
        }
    }

    pub fn insights(&self) -> &[String] {
        match self {
            InvestmentOutcome::Analyzed { insights, .. } => insights,
            InvestmentOutcome::NoData { insights, .. } => insights,
        }
    }
}

/// Heuristic locator for revenue, profit, expenses and growth figures.
///
/// Stateless once built; construct one per process and share it.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    patterns: Vec<(MetricSlot, Regex)>,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor {
    pub fn new() -> Self {
        let patterns = MetricSlot::ALL
            .iter()
            .map(|slot| {
                let re = Regex::new(slot.pattern()).expect("metric pattern must compile");
                (*slot, re)
            })
            .collect();
        Self { patterns }
    }

    /// Search every slot independently and keep the first match for each.
    pub fn extract_metrics(&self, text: &str) -> Metrics {
        let mut metrics = Metrics::default();
        for (slot, re) in &self.patterns {
            if let Some(value) = re.captures(text).and_then(|caps| caps.get(1)) {
                metrics.set(*slot, value.as_str().to_string());
            }
        }
        metrics
    }

    /// Extract metrics and derive insight strings from them.
    pub fn analyze(&self, text: &str) -> InvestmentOutcome {
        if text.is_empty() {
            return InvestmentOutcome::no_data();
        }

        let processed = collapse_spaces(text);
        let metrics = self.extract_metrics(&processed);
        let insights = build_insights(&metrics);

        InvestmentOutcome::Analyzed {
            metrics,
            insights,
            processed_text: processed.trim().to_string(),
        }
    }
}

fn build_insights(metrics: &Metrics) -> Vec<String> {
    let mut insights = Vec::new();
    if let Some(revenue) = metrics.revenue.as_deref().filter(|v| !v.is_empty()) {
        insights.push(format!("Detected revenue: ${revenue}"));
    }
    if let Some(growth) = metrics.growth.as_deref().filter(|v| !v.is_empty()) {
        insights.push(format!("Growth rate: {growth}%"));
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MetricExtractor {
        MetricExtractor::new()
    }

    #[test]
    fn test_revenue_and_growth_with_insights() {
        let outcome = extractor().analyze("Revenue of $45.2 million and growth of 12% year over year.");
        let metrics = outcome.metrics().unwrap();
        assert_eq!(metrics.revenue.as_deref(), Some("45.2"));
        assert_eq!(metrics.growth.as_deref(), Some("12"));
        assert!(outcome.insights().iter().any(|i| i.contains("45.2")));
        assert!(outcome.insights().iter().any(|i| i.contains("12%")));
    }

    #[test]
    fn test_insight_wording() {
        let outcome = extractor().analyze("revenues: 1,200.50 and an increase of 3.5 %");
        assert_eq!(
            outcome.insights(),
            &[
                "Detected revenue: $1,200.50".to_string(),
                "Growth rate: 3.5%".to_string()
            ]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let metrics = extractor().extract_metrics("NET INCOME OF €9,000 and COSTS: £150");
        assert_eq!(metrics.profit.as_deref(), Some("9,000"));
        assert_eq!(metrics.expenses.as_deref(), Some("150"));
    }

    #[test]
    fn test_first_match_wins() {
        let metrics = extractor().extract_metrics("revenue of 10 million, later revenue of 20 million");
        assert_eq!(metrics.revenue.as_deref(), Some("10"));
    }

    #[test]
    fn test_slots_are_independent() {
        let metrics = extractor().extract_metrics("profit of $5 and expenses of $3");
        assert_eq!(metrics.revenue, None);
        assert_eq!(metrics.profit.as_deref(), Some("5"));
        assert_eq!(metrics.expenses.as_deref(), Some("3"));
        assert_eq!(metrics.growth, None);
    }

    #[test]
    fn test_growth_requires_percent_sign() {
        let metrics = extractor().extract_metrics("growth of 12 points");
        assert_eq!(metrics.growth, None);
    }

    #[test]
    fn test_three_decimals_truncate_to_two() {
        let metrics = extractor().extract_metrics("revenue: 1.234");
        assert_eq!(metrics.revenue.as_deref(), Some("1.23"));
    }

    #[test]
    fn test_unmatched_text_leaves_slots_unset() {
        let outcome = extractor().analyze("Nothing to see here.");
        assert!(outcome.metrics().unwrap().is_empty());
        assert!(outcome.insights().is_empty());
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_processed_text_is_collapsed_and_trimmed() {
        match extractor().analyze("  Revenue   of  $1  ") {
            InvestmentOutcome::Analyzed { processed_text, .. } => {
                assert_eq!(processed_text, "Revenue of $1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_error_shaped() {
        let outcome = extractor().analyze("");
        assert_eq!(outcome.error(), Some(NO_FINANCIAL_DATA));
        assert!(outcome.insights().is_empty());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["metrics"], serde_json::json!({}));
        assert_eq!(json["insights"], serde_json::json!([]));
    }

    #[test]
    fn test_serialized_shape() {
        let outcome = extractor().analyze("growth of 4%");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json["metrics"],
            serde_json::json!({
                "revenue": null,
                "profit": null,
                "expenses": null,
                "growth": "4"
            })
        );
        assert_eq!(json["processed_text"], "growth of 4%");
    }
}
