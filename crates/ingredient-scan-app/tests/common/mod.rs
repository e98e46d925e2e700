//! Shared fixtures for app integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use ingredient_scan_app::{AppConfig, build_client};
use ingredient_scan_core::Generation;
use ingredient_scan_ui::{RenderOutcome, RenderSink, UiError};
use ingredient_scan_upload::{
    ClassifierClient, ClassifierTransport, ImageUpload, TransportResponse, UploadError,
};
use url::Url;

/// One event observed at the rendering boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Loading signal change.
    Loading(Generation, bool),
    /// Delivered outcome.
    Delivered(Generation, RenderOutcome),
    /// Validation prompt.
    Prompt(UiError),
}

/// Sink recording every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    /// Returns a copy of recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event lock should work").clone()
    }

    /// Returns delivered outcomes only.
    pub fn deliveries(&self) -> Vec<(Generation, RenderOutcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Delivered(generation, outcome) => Some((generation, outcome)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().expect("event lock should work").push(event);
    }
}

impl RenderSink for RecordingSink {
    fn loading_changed(&self, generation: Generation, loading: bool) {
        self.push(Event::Loading(generation, loading));
    }

    fn deliver(&self, generation: Generation, outcome: RenderOutcome) {
        self.push(Event::Delivered(generation, outcome));
    }

    fn prompt(&self, error: UiError) {
        self.push(Event::Prompt(error));
    }
}

/// Transport answering by upload file name, optionally holding one file's
/// reply until released.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: HashMap<String, (u16, String)>,
    held: Mutex<HashMap<String, Receiver<()>>>,
    probe_status: u16,
    /// Number of calls made.
    pub calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Creates a transport; probe replies with 200.
    pub fn new() -> Self {
        Self {
            probe_status: 200,
            ..Self::default()
        }
    }

    /// Scripts the reply for `file_name`.
    pub fn reply(mut self, file_name: &str, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .insert(file_name.to_string(), (status, body.into()));
        self
    }

    /// Holds `file_name`'s reply until `release` receives a message.
    pub fn hold(self, file_name: &str, release: Receiver<()>) -> Self {
        self.held
            .lock()
            .expect("hold lock should work")
            .insert(file_name.to_string(), release);
        self
    }

    /// Sets the probe status.
    pub fn probe_status(mut self, status: u16) -> Self {
        self.probe_status = status;
        self
    }
}

impl ClassifierTransport for ScriptedTransport {
    fn post_image(&self, _url: &Url, upload: &ImageUpload) -> Result<TransportResponse, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let held = self
            .held
            .lock()
            .expect("hold lock should work")
            .remove(&upload.file_name);
        if let Some(release) = held {
            release.recv().expect("test should release held reply");
        }

        match self.replies.get(&upload.file_name) {
            Some((status, body)) => Ok(TransportResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(UploadError::Transport("connection refused".to_string())),
        }
    }

    fn get(&self, _url: &Url) -> Result<TransportResponse, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransportResponse {
            status: self.probe_status,
            body: String::new(),
        })
    }
}

/// Builds a client over `transport`.
pub fn client_for(transport: Arc<ScriptedTransport>) -> ClassifierClient {
    let config = AppConfig::new("http://127.0.0.1:5000", false).expect("config should build");
    build_client(&config, transport).expect("client should build")
}

/// Non-empty upload named `file_name`.
pub fn upload(file_name: &str) -> ImageUpload {
    ImageUpload::new(file_name, "image/png", file_name.as_bytes().to_vec())
        .expect("upload fixture should be valid")
}

/// Classifier body with one ingredient.
pub fn single_ingredient_body(name: &str, is_harmful: bool) -> String {
    format!(
        r#"{{"extracted_text":"{name}","ingredients":[{{"ingredient":"{name}","is_harmful":{is_harmful},"confidence":0.8}}]}}"#
    )
}

/// Talc, glycerin, and fragrance classifier body.
pub fn scenario_body() -> &'static str {
    r#"{
        "extracted_text":"INGREDIENTS: Talc, Glycerin, Fragrance",
        "ingredients":[
            {"ingredient":"Talc","is_harmful":true,"confidence":0.9},
            {"ingredient":"Glycerin","is_harmful":false,"confidence":0.99},
            {"ingredient":"Fragrance","is_harmful":true,"confidence":0.95}
        ]
    }"#
}
