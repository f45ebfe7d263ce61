use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::UserRole;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token claims did not parse: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("token is expired")]
    Expired,
}

/// Claims read out of the backend-issued JWT. The signature is not checked
/// here; the backend re-verifies every request anyway.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub id: u64,
    #[serde(default)]
    pub role: UserRole,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: u64,
    pub username: String,
    pub role: UserRole,
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(SessionError::Malformed);
    }
    let raw = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('='))?;
    Ok(serde_json::from_slice(&raw)?)
}

fn validate(token: &str) -> Result<SessionUser, SessionError> {
    let claims = decode_claims(token)?;
    if claims.exp <= Utc::now().timestamp() {
        return Err(SessionError::Expired);
    }
    Ok(SessionUser {
        id: claims.id,
        username: claims.sub,
        role: claims.role,
    })
}

/// Holds the active token and mirrors it to disk so a restart resumes the
/// session. Pass `None` as the path to keep everything in memory.
pub struct SessionStore {
    path: Option<PathBuf>,
    token: Option<String>,
    user: Option<SessionUser>,
}

impl SessionStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            token: None,
            user: None,
        }
    }

    /// Reload a persisted token. Stale or unreadable files are purged so the
    /// next start does not trip over them again.
    pub fn restore(&mut self) -> Option<SessionUser> {
        let path = self.path.clone()?;
        let raw = fs::read_to_string(&path).ok()?;
        let stored: StoredSession = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(_) => {
                self.purge();
                return None;
            }
        };
        match validate(&stored.token) {
            Ok(user) => {
                self.token = Some(stored.token);
                self.user = Some(user.clone());
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "discarding persisted session");
                self.purge();
                None
            }
        }
    }

    pub fn login(&mut self, token: &str) -> Result<SessionUser, SessionError> {
        let user = validate(token)?;
        if let Some(path) = &self.path {
            if let Err(err) = persist(path, token) {
                warn!(error = %err, path = %path.display(), "could not persist session");
            }
        }
        self.token = Some(token.to_string());
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
        self.purge();
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    fn purge(&mut self) {
        if let Some(path) = &self.path {
            let _ = fs::remove_file(path);
        }
    }
}

fn persist(path: &Path, token: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(&StoredSession {
        token: token.to_string(),
    })?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)
}
