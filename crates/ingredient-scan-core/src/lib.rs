#![warn(missing_docs)]
//! # ingredient-scan-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `ingredient-scan` workspace.
//!
//! ## Responsibilities
//! - Represent one classified ingredient as a normalized [`IngredientRecord`].
//! - Normalize loosely-typed classifier entries, clamping out-of-range scores
//!   and defaulting optional fields.
//! - Hold one immutable classifier response as [`AnalysisResult`].
//! - Name request generations with [`Generation`].
//!
//! ## Data flow
//! Classifier JSON entries -> [`normalize_ingredient`] -> [`AnalysisResult`]
//! consumed by ranking and report composition.
//!
//! ## Ownership and lifetimes
//! Records own their strings so an [`AnalysisResult`] can outlive the network
//! buffer it was decoded from. Derived structures are always new values.
//!
//! ## Error model
//! A malformed ingredient entry never fails a whole analysis. It is dropped
//! and described by a [`RecordNormalizationWarning`]. [`CoreError`] covers
//! programmatic construction failures only.
//!
//! ## Example
//! ```rust
//! use ingredient_scan_core::AnalysisResult;
//! use serde_json::json;
//!
//! let entries = vec![
//!     json!({"ingredient": "Talc", "is_harmful": true, "confidence": 0.9}),
//!     json!({"ingredient": "", "is_harmful": false, "confidence": 0.5}),
//! ];
//! let result = AnalysisResult::from_raw_entries("talc, water", &entries);
//! assert_eq!(result.ingredients.len(), 1);
//! assert_eq!(result.warnings.len(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Category assigned when the classifier omits one.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Upper bound of the classifier chemical hazard scale.
pub const CHEMICAL_SCORE_MAX: f64 = 10.0;

/// Monotonically increasing identifier of one user-initiated analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    /// Returns the generation issued after `self`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// One named research reference attached to an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchLink {
    /// Source name (for example `PubChem`).
    pub source: String,
    /// Reference URL as reported by the classifier.
    pub url: String,
}

/// One classified ingredient after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    /// Ingredient name, trimmed and non-empty.
    pub name: String,
    /// Whether the classifier flagged the ingredient as potentially harmful.
    pub is_harmful: bool,
    /// Classifier confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Category label, [`UNKNOWN_CATEGORY`] when absent.
    pub category: String,
    /// Hazard score in [0, 10]; `None` is distinct from zero.
    pub chemical_score: Option<f64>,
    /// Health concerns in classifier order.
    #[serde(default)]
    pub concerns: Vec<String>,
    /// Suggested alternatives in classifier order.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Research links in payload order.
    #[serde(default)]
    pub research_links: Vec<ResearchLink>,
    /// Free-form classifier note.
    pub note: Option<String>,
}

impl IngredientRecord {
    /// Constructs a record with default optional fields.
    ///
    /// `confidence` is clamped into [0.0, 1.0].
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyName`] when `name` is blank after trimming.
    pub fn new(name: impl Into<String>, is_harmful: bool, confidence: f64) -> Result<Self, CoreError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyName);
        }

        Ok(Self {
            name: trimmed.to_string(),
            is_harmful,
            confidence: clamp_confidence(confidence),
            category: UNKNOWN_CATEGORY.to_string(),
            chemical_score: None,
            concerns: Vec::new(),
            alternatives: Vec::new(),
            research_links: Vec::new(),
            note: None,
        })
    }

    /// Sets category; blank values fall back to [`UNKNOWN_CATEGORY`].
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = normalize_category(Some(category));
        self
    }

    /// Sets chemical score, clamped into [0, 10].
    pub fn with_chemical_score(mut self, score: f64) -> Self {
        self.chemical_score = clamp_chemical_score(score);
        self
    }

    /// Appends one concern.
    pub fn with_concern(mut self, concern: impl Into<String>) -> Self {
        self.concerns.push(concern.into());
        self
    }

    /// Appends one alternative.
    pub fn with_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Appends one research link.
    pub fn with_research_link(mut self, source: impl Into<String>, url: impl Into<String>) -> Self {
        self.research_links.push(ResearchLink {
            source: source.into(),
            url: url.into(),
        });
        self
    }

    /// Sets note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Diagnostic recorded when one classifier entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordNormalizationWarning {
    /// Position of the entry in the classifier `ingredients` array.
    pub index: usize,
    /// Human-readable reason.
    pub reason: String,
}

impl fmt::Display for RecordNormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ingredient #{} dropped: {}", self.index, self.reason)
    }
}

/// One classifier response, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Raw text recognized from the image; may be empty.
    pub extracted_text: String,
    /// Normalized ingredients in classifier order.
    pub ingredients: Vec<IngredientRecord>,
    /// Entries dropped during normalization.
    #[serde(default)]
    pub warnings: Vec<RecordNormalizationWarning>,
}

impl AnalysisResult {
    /// Normalizes raw classifier entries into an analysis result.
    ///
    /// Entries failing required-field validation are omitted, logged, and
    /// recorded in [`AnalysisResult::warnings`].
    pub fn from_raw_entries(extracted_text: impl Into<String>, entries: &[Value]) -> Self {
        let mut ingredients = Vec::with_capacity(entries.len());
        let mut warnings = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match normalize_ingredient(index, entry) {
                Ok(record) => ingredients.push(record),
                Err(warning) => {
                    tracing::warn!(
                        stage = "normalize",
                        action = "drop_record",
                        index = warning.index,
                        reason = %warning.reason,
                        "ingredient entry dropped"
                    );
                    warnings.push(warning);
                }
            }
        }

        Self {
            extracted_text: extracted_text.into(),
            ingredients,
            warnings,
        }
    }
}

/// Normalizes one raw classifier entry.
///
/// Required fields: `ingredient` (alias `name`), `is_harmful`, `confidence`.
/// Optional fields fall back to defaults when absent or of the wrong type.
///
/// # Errors
/// Returns a [`RecordNormalizationWarning`] naming the first missing or
/// invalid required field.
pub fn normalize_ingredient(
    index: usize,
    raw: &Value,
) -> Result<IngredientRecord, RecordNormalizationWarning> {
    let warn = |reason: &str| RecordNormalizationWarning {
        index,
        reason: reason.to_string(),
    };

    let object = raw.as_object().ok_or_else(|| warn("entry is not an object"))?;

    let name = object
        .get("ingredient")
        .or_else(|| object.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| warn("missing or empty ingredient name"))?;

    let is_harmful = object
        .get("is_harmful")
        .and_then(Value::as_bool)
        .ok_or_else(|| warn("missing or non-boolean is_harmful"))?;

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| warn("missing or non-numeric confidence"))?;

    Ok(IngredientRecord {
        name: name.to_string(),
        is_harmful,
        confidence: clamp_confidence(confidence),
        category: normalize_category(object.get("category").and_then(Value::as_str)),
        chemical_score: object
            .get("chemical_score")
            .and_then(Value::as_f64)
            .and_then(clamp_chemical_score),
        concerns: string_list(object.get("concerns")),
        alternatives: string_list(object.get("alternatives")),
        research_links: research_links(object.get("research_links")),
        note: object
            .get("note")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
    })
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn clamp_chemical_score(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(0.0, CHEMICAL_SCORE_MAX))
}

fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(category) if !category.is_empty() => category.to_string(),
        _ => UNKNOWN_CATEGORY.to_string(),
    }
}

fn string_list(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn research_links(raw: Option<&Value>) -> Vec<ResearchLink> {
    // Order follows the payload because serde_json is built with
    // `preserve_order`.
    raw.and_then(Value::as_object)
        .map(|links| {
            links
                .iter()
                .filter_map(|(source, url)| {
                    url.as_str().map(|url| ResearchLink {
                        source: source.clone(),
                        url: url.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Error type for programmatic model construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ingredient name is blank.
    #[error("ingredient name is empty")]
    EmptyName,
    /// JSON encoding/decoding error.
    #[error("model codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
