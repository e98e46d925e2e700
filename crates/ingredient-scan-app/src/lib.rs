#![warn(missing_docs)]
//! # ingredient-scan-app
//!
//! ## Purpose
//! Orchestrates classifier submission, report derivation, and rendering for
//! `ingredient-scan`.
//!
//! ## Responsibilities
//! - Coordinate overlapping submissions so only the latest is rendered.
//! - Load configuration from the environment.
//! - Provide the HTTP classifier transport and the liveness check.
//! - Install structured logging for the binary.
//!
//! ## Data flow
//! Selected image -> [`RequestCoordinator`] -> classifier -> analysis
//! contract -> ranking -> report composition -> render sink.
//!
//! ## Ownership and lifetimes
//! The coordinator owns only generation bookkeeping; reports are built as
//! fresh values per reply and handed to the sink by value.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Failures crossing into the
//! rendering boundary are converted to structured UI errors instead.
//!
//! ## Security and privacy notes
//! Image bytes and extracted text are never logged; submissions are
//! correlated by image fingerprint.

mod config;
mod coordinator;
mod http_transport;

pub use config::{
    AppConfig, DEFAULT_ENDPOINT, ENDPOINT_ENV, PROBE_ENV, flag_enabled, probe_enabled_from_env,
};
pub use coordinator::{Phase, RequestCoordinator, Resolution, SubmissionTicket, ui_error_for};
pub use http_transport::HttpClassifierTransport;

use std::sync::Arc;

use ingredient_scan_analysis_contract::{AnalysisContractError, parse_analysis_response};
use ingredient_scan_report::{DisplayReport, ReportError, derive_report};
use ingredient_scan_upload::{ClassifierClient, ClassifierTransport, UploadError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("INGREDIENT_SCAN_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Output goes to
/// stderr so stdout stays reserved for the report. Calling twice is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Builds a classifier client for `config` over `transport`.
///
/// # Errors
/// Returns [`AppError::Upload`] when the endpoint violates URL policy.
pub fn build_client(
    config: &AppConfig,
    transport: Arc<dyn ClassifierTransport>,
) -> Result<ClassifierClient, AppError> {
    Ok(ClassifierClient::new(&config.endpoint, transport)?)
}

/// Runs the liveness probe and logs the outcome.
///
/// Failures never reach the rendering boundary.
pub fn check_connectivity(client: &ClassifierClient) -> bool {
    match client.probe() {
        Ok(()) => {
            tracing::info!(
                stage = "network",
                action = "probe",
                endpoint = %client.endpoint(),
                "server connection successful"
            );
            true
        }
        Err(error) => {
            tracing::warn!(
                stage = "network",
                action = "probe",
                endpoint = %client.endpoint(),
                error = %error,
                "server connection failed"
            );
            false
        }
    }
}

/// Parses a raw classifier body and derives its display report.
///
/// # Errors
/// Returns [`AppError::Analysis`] when the body violates the contract.
pub fn derive_display_report(raw: &str) -> Result<DisplayReport, AppError> {
    let result = parse_analysis_response(raw)?;
    Ok(derive_report(&result))
}

/// Local rejection of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No file was selected.
    #[error("Please select an image file")]
    NoFileSelected,
    /// Selected file has no bytes.
    #[error("The selected image file is empty")]
    EmptyImage,
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submission rejected locally.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Configuration value is unusable.
    #[error("configuration error: {0}")]
    Config(String),
    /// Classifier boundary error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Analysis contract error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisContractError),
    /// Report snapshot error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
