use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::time::Duration;

use crate::diagnosis::DiagnosisProfile;

pub const MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub profile: DiagnosisProfile,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .context("GEMINI_API_KEY is not defined in environment variables")?;

        let gemini_base_url = lookup("GEMINI_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        let timeout_secs = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS is not a number: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?;

        let mut profile = match lookup("DIAGNOSIS_PROFILE").as_deref() {
            None | Some("structured") => DiagnosisProfile::structured(),
            Some("arabic") => DiagnosisProfile::arabic(),
            Some(other) => bail!(
                "Unknown DIAGNOSIS_PROFILE '{}', expected 'structured' or 'arabic'",
                other
            ),
        };

        if let Some(language) = lookup("DIAGNOSIS_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            profile.language = language.trim().to_string();
        }

        Ok(Self {
            gemini_api_key,
            gemini_base_url,
            gemini_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            profile,
        })
    }
}
