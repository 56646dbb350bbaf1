//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use reqwest::Url;

pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbx1234567890abcdEFGH/exec";
pub const DEFAULT_IDENTITY_PATH: &str = ".shiftboard/identity.json";
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub identity_path: PathBuf,
    pub max_redirects: usize,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SHIFTBOARD_ENDPOINT_URL`: gateway endpoint (placeholder deployment when absent)
    /// - `SHIFTBOARD_IDENTITY_PATH`: identity file, default `.shiftboard/identity.json`
    /// - `SHIFTBOARD_MAX_REDIRECTS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value is set but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_endpoint = lookup("SHIFTBOARD_ENDPOINT_URL").unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_owned());
        let endpoint = parse_endpoint(&raw_endpoint)?;

        let identity_path = lookup("SHIFTBOARD_IDENTITY_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_IDENTITY_PATH), PathBuf::from);

        let max_redirects = match lookup("SHIFTBOARD_MAX_REDIRECTS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::Invalid { var: "SHIFTBOARD_MAX_REDIRECTS", reason: e.to_string() })?,
            None => DEFAULT_MAX_REDIRECTS,
        };

        Ok(Self { endpoint, identity_path, max_redirects })
    }

    /// Replace the endpoint, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `raw` is not an http(s) URL.
    pub fn with_endpoint(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.endpoint = parse_endpoint(raw)?;
        Ok(self)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::Invalid { var: "SHIFTBOARD_ENDPOINT_URL", reason: e.to_string() })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: "SHIFTBOARD_ENDPOINT_URL",
            reason: format!("unsupported scheme '{other}' (expected 'http' or 'https')"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
