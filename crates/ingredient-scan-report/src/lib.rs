#![warn(missing_docs)]
//! # ingredient-scan-report
//!
//! ## Purpose
//! Composes render-ready reports from ranked analysis output.
//!
//! ## Responsibilities
//! - Split the ranked list into harmful, safe, and total views without
//!   reordering or merging rows.
//! - Summarize harmful ingredients per category.
//! - Provide row labels, the printable text report, and the JSON snapshot.
//!
//! ## Data flow
//! [`ingredient_scan_ranking::RankedReport`] -> [`compose`] ->
//! [`DisplayReport`] -> rendering boundary or [`render_text`].
//!
//! ## Ownership and lifetimes
//! A [`DisplayReport`] is a self-contained snapshot. Every view owns full
//! [`IngredientRecord`] values so detail panels never need the source result.
//!
//! ## Error model
//! Composition is total. Only snapshot encoding/decoding and exporters
//! return [`ReportError`].

use ingredient_scan_core::{AnalysisResult, IngredientRecord};
use ingredient_scan_ranking::{RankedReport, Tier, rank};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Harmful-ingredient count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category label.
    pub category: String,
    /// Harmful ingredients carrying that label.
    pub harmful_count: usize,
}

/// Fully composed, render-ready report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayReport {
    /// Text recognized from the submitted image.
    pub extracted_text: String,
    /// All ingredients in ranking order.
    pub ranked: Vec<IngredientRecord>,
    /// Number of ingredients.
    pub total_count: usize,
    /// Number of harmful ingredients.
    pub harmful_count: usize,
    /// Number of safe ingredients.
    pub safe_count: usize,
    /// Safety score at full precision.
    pub safety_score_percent: f64,
    /// Safety score rounded to one decimal.
    pub safety_score_display: f64,
    /// Safety tier.
    pub tier: Tier,
    /// Icon for `tier`.
    pub tier_icon: String,
    /// Recommendation for `tier`.
    pub recommendation_text: String,
    /// Harmful ingredients in ranking order.
    pub harmful_view: Vec<IngredientRecord>,
    /// Safe ingredients in ranking order.
    pub safe_view: Vec<IngredientRecord>,
    /// All ingredients in ranking order.
    pub total_view: Vec<IngredientRecord>,
    /// Harmful counts per category, first-appearance order.
    pub category_breakdown: Vec<CategoryCount>,
}

/// Named sub-view of a [`DisplayReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    /// Harmful ingredients only.
    Harmful,
    /// Safe ingredients only.
    Safe,
    /// All ingredients.
    Total,
}

impl DisplayReport {
    /// Returns the rows of one named view.
    pub fn view(&self, view: ReportView) -> &[IngredientRecord] {
        match view {
            ReportView::Harmful => &self.harmful_view,
            ReportView::Safe => &self.safe_view,
            ReportView::Total => &self.total_view,
        }
    }

    /// Serializes the snapshot to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`ReportError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec(self).map_err(ReportError::Codec)
    }

    /// Deserializes a snapshot from JSON bytes.
    ///
    /// # Errors
    /// Returns [`ReportError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, ReportError> {
        serde_json::from_slice(raw).map_err(ReportError::Codec)
    }
}

/// Builds the display report for one ranked result.
///
/// Views are filters over `report.ranked`; no row is reordered, re-ranked,
/// or deduplicated.
pub fn compose(report: RankedReport, extracted_text: impl Into<String>) -> DisplayReport {
    let (harmful_view, safe_view): (Vec<IngredientRecord>, Vec<IngredientRecord>) = report
        .ranked
        .iter()
        .cloned()
        .partition(|record| record.is_harmful);

    let category_breakdown = category_breakdown(&harmful_view);
    let safety_score_display = report.safety_score_display();

    DisplayReport {
        extracted_text: extracted_text.into(),
        total_view: report.ranked.clone(),
        ranked: report.ranked,
        total_count: report.total_count,
        harmful_count: report.harmful_count,
        safe_count: report.safe_count,
        safety_score_percent: report.safety_score_percent,
        safety_score_display,
        tier: report.tier,
        tier_icon: report.tier.icon().to_string(),
        recommendation_text: report.recommendation_text,
        harmful_view,
        safe_view,
        category_breakdown,
    }
}

/// Ranks and composes one analysis result.
pub fn derive_report(result: &AnalysisResult) -> DisplayReport {
    compose(rank(&result.ingredients), result.extracted_text.clone())
}

fn category_breakdown(harmful: &[IngredientRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for record in harmful {
        match counts.iter_mut().find(|count| count.category == record.category) {
            Some(count) => count.harmful_count += 1,
            None => counts.push(CategoryCount {
                category: record.category.clone(),
                harmful_count: 1,
            }),
        }
    }
    counts
}

/// Status column label.
pub fn status_label(record: &IngredientRecord) -> &'static str {
    if record.is_harmful { "Harmful" } else { "Safe" }
}

/// Confidence as a one-decimal percentage (`"95.0%"`).
pub fn confidence_label(record: &IngredientRecord) -> String {
    format!("{:.1}%", record.confidence * 100.0)
}

/// Chemical score with one decimal, `None` when the classifier sent none.
pub fn chemical_score_label(record: &IngredientRecord) -> Option<String> {
    record.chemical_score.map(|score| format!("{score:.1}"))
}

/// Renders the printable plain-text report.
pub fn render_text(report: &DisplayReport) -> String {
    let mut lines = vec![
        "Analysis Results:".to_string(),
        format!("Extracted Text: {}", report.extracted_text),
        String::new(),
        "Ingredients Analysis:".to_string(),
        "Ingredient | Status | Confidence | Category | Chemical Score".to_string(),
    ];

    for record in &report.total_view {
        lines.push(format!(
            "{} | {} | {} | {} | {}",
            record.name,
            status_label(record),
            confidence_label(record),
            record.category,
            chemical_score_label(record).unwrap_or_else(|| "-".to_string()),
        ));
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.push(format!(
        "Found {} harmful ingredients out of {} total ingredients.",
        report.harmful_count, report.total_count
    ));
    lines.push(format!("Safety Rating: {:.1}%", report.safety_score_display));
    lines.push(format!("Tier: {} {}", report.tier_icon, report.tier.label()));
    lines.push(format!("Recommendation: {}", report.recommendation_text));

    if !report.category_breakdown.is_empty() {
        lines.push("Harmful categories:".to_string());
        for count in &report.category_breakdown {
            lines.push(format!("  {}: {}", count.category, count.harmful_count));
        }
    }

    lines.join("\n")
}

/// Destination for a finished report.
pub trait ReportExporter {
    /// Exports one report snapshot.
    ///
    /// # Errors
    /// Implementations return [`ReportError`] on encoding or sink failure.
    fn export(&self, report: &DisplayReport) -> Result<(), ReportError>;
}

/// Exporter that accepts every report and writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExporter;

impl ReportExporter for NoopExporter {
    fn export(&self, report: &DisplayReport) -> Result<(), ReportError> {
        tracing::debug!(
            stage = "export",
            action = "noop",
            total = report.total_count,
            "report export requested; export is not enabled"
        );
        Ok(())
    }
}

/// Report snapshot errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON encoding/decoding error.
    #[error("report codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
