use std::time::Duration;

use secrecy::SecretString;

use crate::CoachError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, CoachError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `get`, so tests
    /// never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, CoachError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = get("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoachError::Config("GEMINI_API_KEY missing".into()))?;
        let base_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout_secs = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoachError::Config(format!("GEMINI_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
