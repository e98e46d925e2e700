//! Shared fixtures for report integration tests.

use ingredient_scan_core::{AnalysisResult, IngredientRecord};

/// Three-ingredient scenario used across report tests.
#[allow(dead_code)]
pub fn scenario_result() -> AnalysisResult {
    AnalysisResult {
        extracted_text: "INGREDIENTS: Talc, Glycerin, Fragrance".to_string(),
        ingredients: vec![
            IngredientRecord::new("Talc", true, 0.9)
                .expect("fixture record should build")
                .with_category("Mineral")
                .with_chemical_score(4.0),
            IngredientRecord::new("Glycerin", false, 0.99).expect("fixture record should build"),
            IngredientRecord::new("Fragrance", true, 0.95)
                .expect("fixture record should build")
                .with_category("Synthetic Fragrance")
                .with_concern("allergen")
                .with_alternative("essential oils")
                .with_research_link("EWG", "https://ewg.test/fragrance"),
        ],
        warnings: vec![],
    }
}
