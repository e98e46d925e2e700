#![warn(missing_docs)]
//! # ingredient-scan-ranking
//!
//! ## Purpose
//! Ranks classified ingredients and aggregates them into a safety score.
//!
//! ## Responsibilities
//! - Order ingredients harmful-first, then by descending confidence, with the
//!   input index as an explicit tie-break.
//! - Count harmful and safe ingredients.
//! - Compute the safety score and map it to a [`Tier`] and recommendation.
//!
//! ## Data flow
//! [`ingredient_scan_core::AnalysisResult::ingredients`] -> [`rank`] ->
//! [`RankedReport`] consumed by report composition.
//!
//! ## Ownership and lifetimes
//! [`rank`] borrows its input and returns a new owned report; the input slice
//! is never reordered in place.
//!
//! ## Error model
//! Ranking is total. An empty input is reported as fully safe.

use std::cmp::Ordering;

use ingredient_scan_core::IngredientRecord;
use serde::{Deserialize, Serialize};

/// Safety score reported for an empty ingredient list.
pub const EMPTY_SAFETY_SCORE: f64 = 100.0;

/// Lowest score in the [`Tier::Excellent`] band.
pub const EXCELLENT_MIN_SCORE: f64 = 90.0;

/// Lowest score in the [`Tier::Safe`] band.
pub const SAFE_MIN_SCORE: f64 = 70.0;

/// Lowest score in the [`Tier::Caution`] band.
pub const CAUTION_MIN_SCORE: f64 = 50.0;

/// Ordered safety band derived from the safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Score >= 90.
    Excellent,
    /// 70 <= score < 90.
    Safe,
    /// 50 <= score < 70.
    Caution,
    /// Score < 50.
    Unsafe,
}

impl Tier {
    /// Maps an unrounded safety score to its tier.
    ///
    /// Lower bounds are inclusive. Every `f64` maps to exactly one tier;
    /// anything that fails all lower bounds (including NaN) is
    /// [`Tier::Unsafe`].
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_MIN_SCORE {
            Self::Excellent
        } else if score >= SAFE_MIN_SCORE {
            Self::Safe
        } else if score >= CAUTION_MIN_SCORE {
            Self::Caution
        } else {
            Self::Unsafe
        }
    }

    /// Upper-case tier label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Safe => "SAFE",
            Self::Caution => "CAUTION",
            Self::Unsafe => "UNSAFE",
        }
    }

    /// Fixed recommendation text for the tier.
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Excellent => {
                "Excellent choice. No meaningful share of ingredients is flagged as harmful."
            }
            Self::Safe => "Generally safe. Review the flagged ingredients if you have sensitivities.",
            Self::Caution => {
                "Use with caution. A notable share of ingredients is flagged as potentially harmful."
            }
            Self::Unsafe => {
                "Not recommended. Many ingredients are flagged as potentially harmful; consider an alternative product."
            }
        }
    }

    /// Display icon for the tier.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Excellent => "🌟",
            Self::Safe => "✅",
            Self::Caution => "⚠️",
            Self::Unsafe => "⛔",
        }
    }
}

/// Sorted and scored analysis output, before view filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedReport {
    /// Ingredients in ranking order.
    pub ranked: Vec<IngredientRecord>,
    /// Number of ingredients.
    pub total_count: usize,
    /// Number of harmful ingredients.
    pub harmful_count: usize,
    /// Number of safe ingredients.
    pub safe_count: usize,
    /// Safety score in [0, 100] at full precision.
    pub safety_score_percent: f64,
    /// Tier computed from the unrounded score.
    pub tier: Tier,
    /// Recommendation text for `tier`.
    pub recommendation_text: String,
}

impl RankedReport {
    /// Safety score rounded to one decimal place for display.
    pub fn safety_score_display(&self) -> f64 {
        round_one_decimal(self.safety_score_percent)
    }
}

/// Ranks ingredients and aggregates counts, score, and tier.
///
/// # Ordering
/// 1. Harmful before safe.
/// 2. Higher confidence first.
/// 3. Lower input index first.
pub fn rank(ingredients: &[IngredientRecord]) -> RankedReport {
    let ranked: Vec<IngredientRecord> = ranking_order(ingredients)
        .into_iter()
        .map(|index| ingredients[index].clone())
        .collect();

    let total_count = ranked.len();
    let harmful_count = ranked.iter().filter(|record| record.is_harmful).count();
    let safety_score_percent = safety_score_percent(harmful_count, total_count);
    let tier = Tier::from_score(safety_score_percent);

    RankedReport {
        ranked,
        total_count,
        harmful_count,
        safe_count: total_count - harmful_count,
        safety_score_percent,
        tier,
        recommendation_text: tier.recommendation().to_string(),
    }
}

/// Returns input indices in ranking order.
pub fn ranking_order(ingredients: &[IngredientRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ingredients.len()).collect();
    order.sort_by(|&left, &right| compare_ranked(&ingredients[left], left, &ingredients[right], right));
    order
}

fn compare_ranked(
    left: &IngredientRecord,
    left_index: usize,
    right: &IngredientRecord,
    right_index: usize,
) -> Ordering {
    right
        .is_harmful
        .cmp(&left.is_harmful)
        .then_with(|| right.confidence.total_cmp(&left.confidence))
        .then_with(|| left_index.cmp(&right_index))
}

/// Computes the unrounded safety score.
///
/// `total == 0` yields [`EMPTY_SAFETY_SCORE`].
pub fn safety_score_percent(harmful_count: usize, total_count: usize) -> f64 {
    if total_count == 0 {
        return EMPTY_SAFETY_SCORE;
    }
    let harmful_ratio = harmful_count.min(total_count) as f64 / total_count as f64;
    (1.0 - harmful_ratio) * 100.0
}

/// Rounds to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
