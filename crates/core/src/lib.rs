//! Core library for finlens
//!
//! This crate implements the **Functional Core** of the finlens application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The finlens project splits its work across three crates:
//!
//! - **`finlens_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pdf`**: Page-by-page text extraction from PDF documents
//! - **`finlens`**: I/O operations and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Total**: Empty or unexpected input yields an error-shaped outcome, never a panic
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`text`]: Whitespace normalization applied to extracted page text
//! - [`metrics`]: Heuristic revenue, profit, expenses and growth extraction
//! - [`risk`]: Keyword-driven risk identification with context windows
//! - [`upload`]: Content type and size validation for uploaded documents
//! - [`analysis`]: Prompt construction and model provider wire types
//! - [`debug`]: Per-request debug records
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use finlens_core::metrics::MetricExtractor;
//! use finlens_core::risk::RiskIdentifier;
//!
//! let metrics = MetricExtractor::new();
//! let risks = RiskIdentifier::new();
//!
//! let text = "Revenue of $45.2 million, growth of 12%. Pending litigation.";
//!
//! let investment = metrics.analyze(text);
//! assert_eq!(investment.metrics().unwrap().revenue.as_deref(), Some("45.2"));
//!
//! let assessment = risks.assess(text);
//! assert_eq!(assessment.risks().len(), 1);
//! ```

pub mod analysis;
pub mod debug;
pub mod metrics;
pub mod risk;
pub mod text;
pub mod upload;
