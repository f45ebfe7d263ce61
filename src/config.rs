use std::env;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "tourney_terminal";
const SESSION_FILE: &str = "session.json";
const LOG_FILE: &str = "tourney_terminal.log";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Duration,
    pub session_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = env::var("API_BASE_URL")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(1, 120);

        Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            session_path: path_from_env("SESSION_FILE").or_else(|| app_cache_file(SESSION_FILE)),
            log_path: path_from_env("LOG_FILE").or_else(|| app_cache_file(LOG_FILE)),
        }
    }
}

fn path_from_env(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn app_cache_file(file: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(file))
}

fn cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}
