//! Shared test helpers: a recording HTTP transport double and a ZIP
//! archive builder.

use std::io::{Cursor, Write};
use std::sync::Mutex;

use plugup::update::{HttpRequest, Transport, UpdateError};
use zip::write::SimpleFileOptions;

/// Canned transport response.
pub enum Reply {
    Body(Vec<u8>),
    Failure(String),
}

/// Transport double that replays canned responses in order and records
/// every request URL.
pub struct RecordingTransport {
    replies: Mutex<Vec<Reply>>,
    requests: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }

    /// Number of requests that hit an asset download URL.
    pub fn download_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|u| !u.ends_with("/releases"))
            .count()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, UpdateError> {
        self.requests
            .lock()
            .expect("request log")
            .push(request.url.clone());

        let mut replies = self.replies.lock().expect("reply queue");
        assert!(!replies.is_empty(), "unexpected request: {}", request.url);

        match replies.remove(0) {
            Reply::Body(body) => Ok(body),
            Reply::Failure(message) => Err(UpdateError::Transport(message)),
        }
    }
}

/// Renders a one-release listing with a single asset.
pub fn release_listing(tag: &str, download_url: &str, size: u64) -> Vec<u8> {
    format!(
        r#"[{{"tag_name": "{}", "assets": [{{"browser_download_url": "{}", "content_type": "application/zip", "size": {}}}]}}]"#,
        tag, download_url, size
    )
    .into_bytes()
}

/// Builds an in-memory ZIP archive from (name, contents) entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start file");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }

    writer.finish().expect("finish archive").into_inner()
}
