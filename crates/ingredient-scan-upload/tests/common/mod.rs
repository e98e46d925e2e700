//! Shared fixtures for classifier client tests.

use std::sync::{Arc, Mutex};

use ingredient_scan_upload::{
    ClassifierClient, ClassifierTransport, ImageUpload, TransportResponse, UploadError,
};
use url::Url;

/// Canned reply for one transport call.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    /// Response with status and body.
    Respond(u16, String),
    /// Network failure.
    Fail(String),
}

/// Transport that replays canned replies and records requested URLs.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<Vec<Reply>>,
    /// URLs requested, in call order.
    pub requested: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Creates a transport answering with `replies` in order.
    #[allow(dead_code)]
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn next_reply(&self, url: &Url) -> Result<TransportResponse, UploadError> {
        self.requested
            .lock()
            .expect("request log lock should work")
            .push(url.to_string());
        let reply = self
            .replies
            .lock()
            .expect("reply lock should work")
            .pop()
            .expect("test scripted too few replies");
        match reply {
            Reply::Respond(status, body) => Ok(TransportResponse { status, body }),
            Reply::Fail(message) => Err(UploadError::Transport(message)),
        }
    }
}

impl ClassifierTransport for ScriptedTransport {
    fn post_image(&self, url: &Url, _upload: &ImageUpload) -> Result<TransportResponse, UploadError> {
        self.next_reply(url)
    }

    fn get(&self, url: &Url) -> Result<TransportResponse, UploadError> {
        self.next_reply(url)
    }
}

/// Builds a client over a scripted transport.
#[allow(dead_code)]
pub fn scripted_client(replies: Vec<Reply>) -> (ClassifierClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(replies));
    let client = ClassifierClient::new("http://127.0.0.1:5000", transport.clone())
        .expect("client should build");
    (client, transport)
}

/// Small non-empty upload fixture.
#[allow(dead_code)]
pub fn fixture_upload() -> ImageUpload {
    ImageUpload::new("label.png", "image/png", vec![0x89, b'P', b'N', b'G'])
        .expect("upload fixture should be valid")
}
