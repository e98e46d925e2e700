//! Blocking HTTP implementation of [`ClassifierTransport`].

use std::time::Duration;

use ingredient_scan_upload::{
    ClassifierTransport, IMAGE_FIELD, ImageUpload, TransportResponse, UploadError,
};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use url::Url;

use crate::AppError;

/// Sends classifier calls over HTTP with `reqwest`.
///
/// The blocking client's default request timeout is disabled; a stuck call
/// only leaves its own generation unresolved.
#[derive(Debug, Clone)]
pub struct HttpClassifierTransport {
    client: Client,
}

impl HttpClassifierTransport {
    /// Builds the HTTP client.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the TLS backend cannot initialize.
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("ingredient-scan/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(|error| AppError::Config(format!("http client: {error}")))?;
        Ok(Self { client })
    }
}

impl ClassifierTransport for HttpClassifierTransport {
    fn post_image(&self, url: &Url, upload: &ImageUpload) -> Result<TransportResponse, UploadError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(transport_error)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .map_err(transport_error)?;
        read_response(response)
    }

    fn get(&self, url: &Url) -> Result<TransportResponse, UploadError> {
        let response = self.client.get(url.clone()).send().map_err(transport_error)?;
        read_response(response)
    }
}

fn read_response(response: Response) -> Result<TransportResponse, UploadError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(transport_error)?;
    Ok(TransportResponse { status, body })
}

fn transport_error(error: reqwest::Error) -> UploadError {
    UploadError::Transport(error.to_string())
}
