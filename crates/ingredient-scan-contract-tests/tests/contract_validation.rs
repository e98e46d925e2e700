//! Validates contract fixtures and derived reports against frozen JSON schemas.

use ingredient_scan_analysis_contract::{parse_analysis_response, parse_error_message};
use ingredient_scan_report::derive_report;
use jsonschema::JSONSchema;
use serde_json::Value;

const CONTRACTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");

fn read_contract(relative: &str) -> String {
    std::fs::read_to_string(format!("{CONTRACTS_DIR}/{relative}"))
        .expect("contract file should be readable")
}

fn load_json(relative: &str) -> Value {
    serde_json::from_str(&read_contract(relative)).expect("contract file should be valid json")
}

fn compile_validator(schema: &str) -> JSONSchema {
    let schema = load_json(schema);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn analysis_fixture_matches_schema() {
    let validator = compile_validator("analysis-response.schema.json");
    let fixture = load_json("fixtures/analysis-response.valid.json");
    assert!(
        validator.is_valid(&fixture),
        "analysis fixture should validate against schema"
    );
}

#[test]
fn out_of_range_scores_are_accepted_by_schema_and_clamped_by_parser() {
    let validator = compile_validator("analysis-response.schema.json");
    let fixture = load_json("fixtures/analysis-response.out-of-range.json");
    assert!(
        validator.is_valid(&fixture),
        "out-of-range scores are clamped by the client, not rejected by the contract"
    );

    let raw = read_contract("fixtures/analysis-response.out-of-range.json");
    let result = parse_analysis_response(&raw).expect("fixture should parse");
    assert!(result.warnings.is_empty());

    let scores: Vec<(f64, Option<f64>)> = result
        .ingredients
        .iter()
        .map(|record| (record.confidence, record.chemical_score))
        .collect();
    assert_eq!(scores, vec![(1.0, Some(10.0)), (0.0, Some(0.0))]);
}

#[test]
fn analysis_without_ingredients_is_rejected_by_schema_and_parser() {
    let validator = compile_validator("analysis-response.schema.json");
    let fixture = load_json("fixtures/analysis-response.missing-ingredients.json");
    assert!(!validator.is_valid(&fixture));

    let raw = read_contract("fixtures/analysis-response.missing-ingredients.json");
    assert!(parse_analysis_response(&raw).is_err());
}

#[test]
fn error_fixture_matches_schema() {
    let validator = compile_validator("analysis-error.schema.json");
    let fixture = load_json("fixtures/analysis-error.valid.json");
    assert!(validator.is_valid(&fixture));

    let raw = read_contract("fixtures/analysis-error.valid.json");
    assert_eq!(
        parse_error_message(&raw).as_deref(),
        Some("Failed to analyze ingredients")
    );
}

#[test]
fn derived_report_matches_display_schema() {
    let raw = read_contract("fixtures/analysis-response.valid.json");
    let result = parse_analysis_response(&raw).expect("fixture should parse");
    assert!(result.warnings.is_empty());

    let report = derive_report(&result);
    let bytes = report.to_json_bytes().expect("report should serialize");
    let value: Value = serde_json::from_slice(&bytes).expect("report bytes should be json");

    let validator = compile_validator("display-report.schema.json");
    assert!(
        validator.is_valid(&value),
        "derived report should validate against display schema"
    );
    assert_eq!(value["tier"], "CAUTION");
    assert_eq!(value["ranked"][0]["name"], "Sodium Lauryl Sulfate");
}

#[test]
fn empty_report_matches_display_schema() {
    let result = parse_analysis_response(r#"{"ingredients":[]}"#).expect("empty list parses");
    let value: Value = serde_json::from_slice(
        &derive_report(&result)
            .to_json_bytes()
            .expect("report should serialize"),
    )
    .expect("report bytes should be json");

    let validator = compile_validator("display-report.schema.json");
    assert!(validator.is_valid(&value));
    assert_eq!(value["tier"], "EXCELLENT");
}
