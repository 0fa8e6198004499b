//! Blocking HTTP transport.
//!
//! One request, one connection: the underlying client is built inside
//! `send` and dropped before it returns, on success and failure alike.
//! Redirects are followed (GitHub asset downloads bounce through a CDN)
//! and every request carries a User-Agent: the GitHub API rejects
//! requests without one.
//!
//! Known limitation: the response status code is not inspected. Callers
//! see only the body bytes, so a short error page from the server is
//! indistinguishable from a short success until it fails to parse.

use std::time::Duration;

use tracing::{debug, warn};

use super::UpdateError;

/// Default request deadline.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A single HTTP request.
///
/// Headers are kept as ordered `"Name: value"` lines and applied in the
/// order they were pushed.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Target URL.
    pub url: String,
    /// Request method. Only GET is exercised by the update engine.
    pub method: HttpMethod,
    /// Header lines in `"Name: value"` form.
    pub headers: Vec<String>,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a GET request for the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a `"Name: value"` header line.
    #[must_use]
    pub fn with_header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Transport seam for issuing HTTP requests.
///
/// The release client and asset fetcher depend on this trait rather than a
/// concrete client, so tests can substitute a recording double.
pub trait Transport: Send + Sync {
    /// Sends the request and returns the raw response body.
    ///
    /// # Errors
    /// Returns `UpdateError::Transport` when the request cannot complete.
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, UpdateError>;
}

/// Blocking HTTP client backed by reqwest.
#[derive(Debug)]
pub struct HttpClient {
    /// User-Agent sent with every request. Mandatory by construction.
    user_agent: String,
    /// Request deadline.
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the given User-Agent and optional deadline.
    ///
    /// # Errors
    /// `EmptyUserAgent` when `user_agent` is empty; requests without one
    /// would be rejected by the GitHub API anyway, so the client refuses
    /// to exist in that state.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, UpdateError> {
        if user_agent.is_empty() {
            return Err(UpdateError::EmptyUserAgent);
        }

        Ok(Self {
            user_agent: user_agent.to_string(),
            timeout: timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Returns the configured User-Agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Transport for HttpClient {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, UpdateError> {
        debug!(
            "[UPDATE] {} {} ({} header(s))",
            request.method.as_str(),
            request.url,
            request.headers.len()
        );

        // Fresh client per request: dropped on every exit path below.
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()
            .map_err(|e| UpdateError::Transport(e.to_string()))?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url),
            HttpMethod::Put => client.put(&request.url),
            HttpMethod::Delete => client.delete(&request.url),
        };

        for line in &request.headers {
            if let Some((name, value)) = line.split_once(':') {
                builder = builder.header(name.trim(), value.trim());
            } else {
                warn!("[UPDATE] Skipping malformed header line: {}", line);
            }
        }

        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| {
            warn!("[UPDATE] HTTP request failed: {}", e);
            UpdateError::Transport(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| UpdateError::Transport(e.to_string()))?;

        debug!("[UPDATE] Response: {} ({} bytes)", status, bytes.len());

        Ok(bytes.to_vec())
    }
}
