use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

static CLIENT: OnceCell<Client> = OnceCell::new();
static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

const ERROR_MESSAGE_MAX: usize = 200;

pub fn http_client(timeout: Duration) -> Result<&'static Client, ApiError> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)
    })
}

/// Structured failure cause parsed from an error body's `kind`/`code` field.
/// Control flow branches on this, never on backend prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    HasDependents,
    NotFound,
    Validation,
    Unauthorized,
    Other(String),
}

impl ErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "HAS_DEPENDENTS" => ErrorKind::HasDependents,
            "NOT_FOUND" => ErrorKind::NotFound,
            "VALIDATION" | "VALIDATION_ERROR" => ErrorKind::Validation,
            "UNAUTHORIZED" => ErrorKind::Unauthorized,
            other => ErrorKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend returned status {status}")]
    Http {
        status: u16,
        kind: Option<ErrorKind>,
        message: Option<String>,
    },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    pub fn is_has_dependents(&self) -> bool {
        matches!(
            self,
            ApiError::Http {
                kind: Some(ErrorKind::HasDependents),
                ..
            }
        )
    }

    /// One line suitable for a pane's error slot.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(err) if err.is_timeout() => "request timed out".to_string(),
            ApiError::Network(_) => "backend unreachable".to_string(),
            ApiError::Http { kind: Some(ErrorKind::HasDependents), .. } => {
                "cannot delete: dependent records exist, remove them first".to_string()
            }
            ApiError::Http { status, message, .. } => message
                .clone()
                .unwrap_or_else(|| format!("request failed with status {status}")),
            ApiError::Decode(_) => "backend sent an unreadable response".to_string(),
        }
    }
}

/// Blocking HTTP transport for one backend origin. Owned by the worker
/// thread; the bearer token is set after login/restore and cleared on logout.
#[derive(Debug)]
pub struct Transport {
    base_url: String,
    timeout: Duration,
    token: Option<String>,
}

impl Transport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send::<()>(Method::GET, path, None)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let body = self.send::<()>(Method::GET, path, None)?;
        parse_value(&body)
    }

    pub fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let body = self.send(Method::POST, path, Some(payload))?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn post_value<B: Serialize>(&self, path: &str, payload: &B) -> Result<Value, ApiError> {
        let body = self.send(Method::POST, path, Some(payload))?;
        parse_value(&body)
    }

    pub fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let body = self.send(Method::PUT, path, Some(payload))?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn put_value<B: Serialize>(&self, path: &str, payload: &B) -> Result<Value, ApiError> {
        let body = self.send(Method::PUT, path, Some(payload))?;
        parse_value(&body)
    }

    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, None)?;
        Ok(())
    }

    fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<String, ApiError> {
        let client = http_client(self.timeout)?;
        let url = format!("{}{}", self.base_url, path);
        let request_id = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let mut builder = client.request(method.clone(), &url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status.is_success() {
            debug!(
                request_id,
                method = %method,
                path,
                status = status.as_u16(),
                elapsed_ms,
                "request ok"
            );
            return Ok(body);
        }

        let (kind, message) = classify_error_body(&body);
        warn!(
            request_id,
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "request failed"
        );
        Err(ApiError::Http {
            status: status.as_u16(),
            kind,
            message,
        })
    }
}

fn parse_value(raw: &str) -> Result<Value, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Best-effort read of an error body: a structured `kind`/`code` field when
/// the backend sends one, plus whatever message text is present.
pub fn classify_error_body(raw: &str) -> (Option<ErrorKind>, Option<String>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return (None, None);
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return (None, Some(truncate(trimmed)));
    };

    let kind = pick_string(&value, &["kind", "code", "error_code", "errorCode"])
        .map(|code| ErrorKind::from_code(&code));
    let message = pick_string(&value, &["message", "error", "detail"]);
    (kind, message.map(|m| truncate(&m)))
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = value.get(*key) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= ERROR_MESSAGE_MAX {
        return text.to_string();
    }
    text.chars().take(ERROR_MESSAGE_MAX).collect()
}
