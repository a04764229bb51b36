//! Transport layer for the downstream REST APIs
//!
//! Abstracts HTTP for testability. Provides:
//! - Transport trait: JSON POST and multipart file upload
//! - HttpTransport: blocking reqwest client with basic or bearer auth
//! - MockTransport: scripted in-process responses for tests

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Transport trait for the downstream APIs.
///
/// Every call is a single attempt; retries are the caller's concern.
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the decoded JSON response (`Null` when empty)
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;

    /// POST a file as multipart field `file`
    fn upload_file(
        &self,
        url: &str,
        path: &Path,
        headers: &[(&str, &str)],
    ) -> Result<(), TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Response missing field '{0}'")]
    MissingField(String),
}

/// Credentials attached to every request
#[derive(Clone)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Auth::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// HTTP transport for production use
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    auth: Auth,
}

impl HttpTransport {
    pub fn new(auth: Auth) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("tosca-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, auth })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Bearer(token) => builder.bearer_auth(token),
        }
    }

    fn check_status(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        tracing::debug!("POST {}", url);
        let response = self.authorize(self.client.post(url)).json(body).send()?;
        let text = Self::check_status(response)?.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn upload_file(
        &self,
        url: &str,
        path: &Path,
        headers: &[(&str, &str)],
    ) -> Result<(), TransportError> {
        tracing::debug!("POST {} (file {})", url, path.display());
        let form = multipart::Form::new().file("file", path)?;
        let mut request = self.authorize(self.client.post(url)).multipart(form);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Self::check_status(request.send()?)?;
        Ok(())
    }
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Json { url: String, body: Value },
    Upload { url: String, path: PathBuf, headers: Vec<(String, String)> },
}

impl RecordedCall {
    pub fn url(&self) -> &str {
        match self {
            RecordedCall::Json { url, .. } | RecordedCall::Upload { url, .. } => url,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            RecordedCall::Json { body, .. } => Some(body),
            RecordedCall::Upload { .. } => None,
        }
    }
}

/// Mock transport for testing.
///
/// Responses and failures are keyed by URL fragment; when several fragments
/// match a URL the longest one applies. Queued responses are consumed in
/// order and the last one repeats.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response for URLs containing `fragment`
    pub fn respond(self, fragment: impl Into<String>, response: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(fragment.into())
            .or_default()
            .push(response);
        self
    }

    /// Fail every call whose URL contains `fragment`
    pub fn fail_on(self, fragment: impl Into<String>) -> Self {
        self.failures.lock().unwrap().push(fragment.into());
        self
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose URL contains `fragment`
    pub fn calls_to(&self, fragment: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.url().contains(fragment))
            .collect()
    }

    fn check_failure(&self, url: &str) -> Result<(), TransportError> {
        let failures = self.failures.lock().unwrap();
        if failures.iter().any(|f| url.contains(f.as_str())) {
            return Err(TransportError::Status {
                status: 500,
                body: format!("injected failure for {}", url),
            });
        }
        Ok(())
    }

    fn next_response(&self, url: &str) -> Value {
        let mut responses = self.responses.lock().unwrap();
        let fragment = responses
            .keys()
            .filter(|f| url.contains(f.as_str()))
            .max_by_key(|f| f.len())
            .cloned();

        let Some(fragment) = fragment else {
            return Value::Null;
        };
        let Some(queue) = responses.get_mut(&fragment) else {
            return Value::Null;
        };
        if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue.first().cloned().unwrap_or(Value::Null)
        }
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall::Json {
            url: url.to_string(),
            body: body.clone(),
        });
        self.check_failure(url)?;
        Ok(self.next_response(url))
    }

    fn upload_file(
        &self,
        url: &str,
        path: &Path,
        headers: &[(&str, &str)],
    ) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(RecordedCall::Upload {
            url: url.to_string(),
            path: path.to_path_buf(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.check_failure(url)?;
        if !path.exists() {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        Ok(())
    }
}
