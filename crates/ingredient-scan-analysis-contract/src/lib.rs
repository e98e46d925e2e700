#![warn(missing_docs)]
//! # ingredient-scan-analysis-contract
//!
//! ## Purpose
//! Defines the classifier response schema and its decoding into the core
//! model.
//!
//! ## Responsibilities
//! - Parse success bodies (`extracted_text` + `ingredients`).
//! - Parse failure bodies (`{"error": "..."}`).
//! - Keep per-entry decoding lenient so one malformed ingredient cannot fail
//!   the whole response.
//!
//! ## Data flow
//! Raw JSON response -> [`parse_analysis_response`] -> [`AnalysisResult`] ->
//! ranking and report composition.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or a missing top-level `ingredients` array returns
//! [`AnalysisContractError`]. Per-entry problems become
//! [`ingredient_scan_core::RecordNormalizationWarning`] values instead.

use ingredient_scan_core::AnalysisResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure body carries no `error` field.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to analyze ingredients";

/// Top-level classifier success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResponse {
    /// Text recognized from the image.
    #[serde(default)]
    pub extracted_text: String,
    /// Raw ingredient judgments; decoded one by one during normalization.
    pub ingredients: Vec<Value>,
}

/// Classifier failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierErrorBody {
    /// Failure description reported by the service.
    pub error: String,
}

/// Parses raw JSON into a normalized analysis result.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON or when the
/// `ingredients` array is missing or not an array.
pub fn parse_analysis_response(raw: &str) -> Result<AnalysisResult, AnalysisContractError> {
    let parsed: ClassifierResponse = serde_json::from_str(raw)?;
    Ok(into_analysis_result(parsed))
}

/// Normalizes an already decoded success body.
pub fn into_analysis_result(response: ClassifierResponse) -> AnalysisResult {
    AnalysisResult::from_raw_entries(response.extracted_text, &response.ingredients)
}

/// Extracts the failure message from an error body.
///
/// Returns `None` when the body is not JSON or carries a blank `error`.
pub fn parse_error_message(raw: &str) -> Option<String> {
    serde_json::from_str::<ClassifierErrorBody>(raw)
        .ok()
        .map(|body| body.error.trim().to_string())
        .filter(|message| !message.is_empty())
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure, including missing required top-level fields.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
