//! Environment-backed configuration.

use crate::AppError;

/// Env var holding the classifier base URL.
pub const ENDPOINT_ENV: &str = "INGREDIENT_SCAN_API_URL";

/// Env var toggling the startup liveness probe.
pub const PROBE_ENV: &str = "INGREDIENT_SCAN_PROBE";

/// Classifier base URL used when [`ENDPOINT_ENV`] is unset.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Classifier base URL; validated when the client is built.
    pub endpoint: String,
    /// Whether to run the liveness probe on startup.
    pub probe_on_start: bool,
}

impl AppConfig {
    /// Creates configuration from explicit values.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when `endpoint` is blank.
    pub fn new(endpoint: impl Into<String>, probe_on_start: bool) -> Result<Self, AppError> {
        let endpoint = endpoint.into().trim().to_string();
        if endpoint.is_empty() {
            return Err(AppError::Config("classifier endpoint is empty".to_string()));
        }

        Ok(Self {
            endpoint,
            probe_on_start,
        })
    }

    /// Reads configuration from [`ENDPOINT_ENV`] and [`PROBE_ENV`].
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the endpoint variable is set but
    /// blank.
    pub fn from_env() -> Result<Self, AppError> {
        let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint, probe_enabled_from_env())
    }
}

/// Checks the probe toggle env var.
///
/// Semantics:
/// - Unset => probe enabled.
/// - `0`, `false`, `off` (case-insensitive) => probe disabled.
/// - Any other value => probe enabled.
pub fn probe_enabled_from_env() -> bool {
    flag_enabled(std::env::var(PROBE_ENV).ok().as_deref())
}

/// Interprets an optional on/off flag value, defaulting to enabled.
pub fn flag_enabled(raw: Option<&str>) -> bool {
    match raw {
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        None => true,
    }
}
