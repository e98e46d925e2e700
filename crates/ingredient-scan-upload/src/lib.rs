#![warn(missing_docs)]
//! # ingredient-scan-upload
//!
//! ## Purpose
//! Sends product images to the remote ingredient classifier and turns its
//! replies into analysis results or categorized failures.
//!
//! ## Responsibilities
//! - Validate the classifier endpoint and derive its analyze/probe URLs.
//! - Model the image payload and its log fingerprint.
//! - Execute analyze and liveness calls through an injectable
//!   [`ClassifierTransport`].
//! - Classify failures into transport and malformed-response classes.
//!
//! ## Data flow
//! [`ImageUpload`] -> [`ClassifierClient::analyze`] -> transport ->
//! [`TransportResponse`] -> analysis contract -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! Uploads own their bytes; the client is cheap to clone and shares its
//! transport through `Arc`.
//!
//! ## Error model
//! All failures are [`UploadError`] values. There are no automatic retries;
//! resubmission is a user action.
//!
//! ## Security and privacy notes
//! Image bytes are never logged. Logs carry only the SHA-256 fingerprint and
//! payload size.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ingredient_scan_analysis_contract::{
    DEFAULT_FAILURE_MESSAGE, parse_analysis_response, parse_error_message,
};
use ingredient_scan_core::AnalysisResult;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::{Host, Url};

/// Path of the analyze call, relative to the classifier endpoint.
pub const ANALYZE_PATH: &str = "analyze-ingredients";

/// Path of the liveness probe, relative to the classifier endpoint.
pub const PROBE_PATH: &str = "test-connection";

/// Multipart form field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// One image selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name forwarded to the classifier.
    pub file_name: String,
    /// MIME type forwarded to the classifier.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Creates a validated upload.
    ///
    /// # Errors
    /// Returns [`UploadError::EmptyImage`] when `bytes` is empty.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyImage);
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        })
    }

    /// Reads an image from disk, inferring its content type from the
    /// extension.
    ///
    /// # Errors
    /// Returns [`UploadError::Read`] when the file cannot be read and
    /// [`UploadError::EmptyImage`] when it is empty.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Self::new(file_name, content_type_for(path), bytes)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false` for a constructed upload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Infers an image MIME type from a path extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Lowercase hex SHA-256 of the image bytes, used to correlate log lines.
pub fn image_fingerprint(upload: &ImageUpload) -> String {
    hex::encode(Sha256::digest(&upload.bytes))
}

/// Raw classifier reply before contract decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by [`ClassifierClient`].
pub trait ClassifierTransport: Send + Sync {
    /// Posts one image as multipart field [`IMAGE_FIELD`].
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when no response was received.
    fn post_image(&self, url: &Url, upload: &ImageUpload) -> Result<TransportResponse, UploadError>;

    /// Issues a GET without payload.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] when no response was received.
    fn get(&self, url: &Url) -> Result<TransportResponse, UploadError>;
}

/// Classifier client with validated endpoint URLs.
#[derive(Clone)]
pub struct ClassifierClient {
    endpoint: Url,
    analyze_url: Url,
    probe_url: Url,
    transport: Arc<dyn ClassifierTransport>,
}

impl ClassifierClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the endpoint fails
    /// [`validate_classifier_endpoint`].
    pub fn new(endpoint: &str, transport: Arc<dyn ClassifierTransport>) -> Result<Self, UploadError> {
        let endpoint = validate_classifier_endpoint(endpoint)?;

        let mut base = endpoint.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|error| UploadError::InvalidEndpoint(format!("cannot derive {path} url: {error}")))
        };

        Ok(Self {
            analyze_url: join(ANALYZE_PATH)?,
            probe_url: join(PROBE_PATH)?,
            endpoint,
            transport,
        })
    }

    /// Submits one image and decodes the classifier reply.
    ///
    /// # Errors
    /// - [`UploadError::Transport`] when the call did not complete.
    /// - [`UploadError::Status`] for non-2xx replies, carrying the service's
    ///   `error` message when present.
    /// - [`UploadError::MalformedResponse`] when a 2xx body violates the
    ///   analysis contract.
    pub fn analyze(&self, upload: &ImageUpload) -> Result<AnalysisResult, UploadError> {
        tracing::debug!(
            stage = "upload",
            action = "analyze_request",
            url = %self.analyze_url,
            bytes = upload.len(),
            "posting image to classifier"
        );

        let response = self.transport.post_image(&self.analyze_url, upload)?;
        if !response.is_success() {
            return Err(UploadError::Status {
                status: response.status,
                message: parse_error_message(&response.body)
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            });
        }

        parse_analysis_response(&response.body)
            .map_err(|error| UploadError::MalformedResponse(error.to_string()))
    }

    /// Issues the liveness probe.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] or [`UploadError::Status`] when the
    /// classifier is unreachable or unhealthy.
    pub fn probe(&self) -> Result<(), UploadError> {
        let response = self.transport.get(&self.probe_url)?;
        if response.is_success() {
            return Ok(());
        }

        Err(UploadError::Status {
            status: response.status,
            message: parse_error_message(&response.body)
                .unwrap_or_else(|| "Failed to connect to server".to_string()),
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the derived analyze URL.
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }

    /// Returns the derived probe URL.
    pub fn probe_url(&self) -> &Url {
        &self.probe_url
    }
}

/// Validates a classifier endpoint.
///
/// Plain `http` is accepted; for non-loopback hosts it is logged as a
/// warning.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] when the URL does not parse, uses
/// a scheme other than `http`/`https`, or has no host.
pub fn validate_classifier_endpoint(endpoint: &str) -> Result<Url, UploadError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid classifier url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UploadError::InvalidEndpoint(format!(
            "unsupported scheme {}",
            parsed.scheme()
        )));
    }

    if parsed.host().is_none() {
        return Err(UploadError::InvalidEndpoint(
            "classifier url has no host".to_string(),
        ));
    }

    if parsed.scheme() == "http" && !is_loopback_host(&parsed) {
        tracing::warn!(
            stage = "config",
            action = "endpoint_policy",
            endpoint = %parsed,
            "classifier endpoint is not https; images travel unencrypted"
        );
    }

    Ok(parsed)
}

/// Returns `true` when the URL host is `localhost` or a loopback address.
pub fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(address)) => IpAddr::V4(address).is_loopback(),
        Some(Host::Ipv6(address)) => IpAddr::V6(address).is_loopback(),
        None => false,
    }
}

/// User-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rejected locally before any network call.
    Local,
    /// Network failure or non-success status.
    Transport,
    /// Success status with a contract-violating body.
    MalformedResponse,
}

/// Categorizes an upload error.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::InvalidEndpoint(_) | UploadError::EmptyImage | UploadError::Read { .. } => {
            FailureClass::Local
        }
        UploadError::Transport(_) | UploadError::Status { .. } => FailureClass::Transport,
        UploadError::MalformedResponse(_) => FailureClass::MalformedResponse,
    }
}

/// Errors produced by the classifier boundary.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Image payload has no bytes.
    #[error("image payload is empty")]
    EmptyImage,
    /// Image file could not be read.
    #[error("cannot read image {}: {source}", path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Call did not complete.
    #[error("classifier transport failure: {0}")]
    Transport(String),
    /// Classifier replied with a non-success status.
    #[error("classifier returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Service-provided or default message.
        message: String,
    },
    /// Success reply violated the analysis contract.
    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),
}
