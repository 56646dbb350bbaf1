//! Gateway error taxonomy.
//!
//! DESIGN
//! ======
//! Transport failures (network, status, undecodable body) and domain failures
//! (`success: false`) are separate variants so callers can tell them apart,
//! but the gateway reports and returns both the same way.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Message used when the backend rejects a call without saying why.
pub const FALLBACK_FAILURE_MESSAGE: &str = "API call failed";

/// Errors produced by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The endpoint could not be reached or the request could not be sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The response body was not a JSON response envelope.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The backend answered `success: false`. Displays the backend message verbatim.
    #[error("{message}")]
    Domain { message: String },

    /// No identity is stored and no prompt is available to ask for one.
    #[error("identity required: set an email before calling the gateway")]
    IdentityRequired,

    /// A typed helper could not interpret the `data` field for an action.
    #[error("unexpected data for {action}: {reason}")]
    UnexpectedData { action: &'static str, reason: String },

    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Build a domain failure from the optional backend message.
    #[must_use]
    pub fn domain(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_owned());
        Self::Domain { message }
    }

    /// Grepable code for logs and CLI exit messages.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_REQUEST",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::Domain { .. } => "E_DOMAIN",
            Self::IdentityRequired => "E_IDENTITY_REQUIRED",
            Self::UnexpectedData { .. } => "E_UNEXPECTED_DATA",
            Self::InvalidEndpoint(_) => "E_INVALID_ENDPOINT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// True when the failure happened before a valid envelope was obtained.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { .. } | Self::Decode(_))
    }

    /// Whether repeating the same call unchanged could succeed.
    ///
    /// The gateway never retries on its own; this only informs callers.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 408 | 429 | 500..=599 })
    }
}
