//! Request/response envelopes exchanged with the gateway endpoint.
//!
//! DESIGN
//! ======
//! Writes travel as a JSON body `{action, payload, email}`. Reads carry only
//! `action` and `email`, as query parameters. Every answer is a
//! `{success, message?, data?}` envelope whose `data` stays untyped JSON.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Transport shape for a call. Reads use `Get`, writes use `Post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body sent for POST calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope<'a> {
    pub action: &'a str,
    pub payload: &'a Map<String, Value>,
    pub email: &'a str,
}

/// Query parameters sent for GET calls, in wire order.
#[must_use]
pub fn read_query<'a>(action: &'a str, email: &'a str) -> [(&'static str, &'a str); 2] {
    [("action", action), ("email", email)]
}

/// Envelope returned by the endpoint for every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// An envelope without the flag is a failed call.
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Decode a raw response body. Anything that is not a JSON object is a transport failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not valid envelope JSON.
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Turn `success: false` into a domain failure, passing successful envelopes through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Domain`] carrying the backend message (or the fallback).
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.success { Ok(self) } else { Err(ApiError::domain(self.message)) }
    }

    /// Borrow `data`, treating an absent field as JSON `null`.
    #[must_use]
    pub fn data_or_null(&self) -> &Value {
        self.data.as_ref().unwrap_or(&Value::Null)
    }
}
