//! Named gateway actions and their typed `data` payloads.
//!
//! The gateway itself treats `data` as opaque JSON; these helpers are the
//! only place that assumes a shape for it.

#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::client::Gateway;
use crate::envelope::{Method, ResponseEnvelope};
use crate::error::ApiError;

/// Remote operations exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetUserInfo,
    ClockInOut,
    SubmitMetrics,
    GetGoals,
    GetTeamData,
}

impl Action {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetUserInfo => "getUserInfo",
            Self::ClockInOut => "clockInOut",
            Self::SubmitMetrics => "submitMetrics",
            Self::GetGoals => "getGoals",
            Self::GetTeamData => "getTeamData",
        }
    }

    /// Transport convention for the action: writes POST, reads GET.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::ClockInOut => Method::Post,
            Self::GetUserInfo | Self::SubmitMetrics | Self::GetGoals | Self::GetTeamData => Method::Get,
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// `getUserInfo` data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserInfo {
    /// Name to display, `Guest User` when the backend has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Guest User")
    }
}

/// One entry of `getGoals` data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal: String,
    /// Percent complete. Spreadsheet backends may send numbers as strings.
    #[serde(deserialize_with = "deserialize_f64_lenient")]
    pub progress: f64,
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}%", self.goal, self.progress)
    }
}

/// One entry of `getTeamData` data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
}

impl std::fmt::Display for TeamMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | {} - {}", self.name, self.role, self.status)
    }
}

/// Value of the `status` field sent with `clockInOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockStatus {
    #[serde(rename = "Clocked In")]
    ClockedIn,
    #[serde(rename = "Clocked Out")]
    ClockedOut,
}

impl ClockStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClockedIn => "Clocked In",
            Self::ClockedOut => "Clocked Out",
        }
    }

    fn payload(self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("status".to_owned(), Value::String(self.as_str().to_owned()));
        payload
    }
}

// =============================================================================
// CALLS
// =============================================================================

/// Fetch the signed-in user's name and admin flag.
///
/// # Errors
///
/// Returns the gateway error, or [`ApiError::UnexpectedData`] if `data` is not a user object.
pub async fn fetch_user_info(gateway: &dyn Gateway) -> Result<UserInfo, ApiError> {
    let envelope = invoke(gateway, Action::GetUserInfo, Map::new()).await?;
    if matches!(envelope.data, None | Some(Value::Null)) {
        return Ok(UserInfo::default());
    }
    decode_data(Action::GetUserInfo, envelope)
}

/// Record a clock-in or clock-out for the current identity.
///
/// # Errors
///
/// Returns the gateway error unchanged.
pub async fn clock(gateway: &dyn Gateway, status: ClockStatus) -> Result<ResponseEnvelope, ApiError> {
    invoke(gateway, Action::ClockInOut, status.payload()).await
}

/// Shorthand for [`clock`] with [`ClockStatus::ClockedIn`].
///
/// # Errors
///
/// Returns the gateway error unchanged.
pub async fn clock_in(gateway: &dyn Gateway) -> Result<ResponseEnvelope, ApiError> {
    clock(gateway, ClockStatus::ClockedIn).await
}

/// Shorthand for [`clock`] with [`ClockStatus::ClockedOut`].
///
/// # Errors
///
/// Returns the gateway error unchanged.
pub async fn clock_out(gateway: &dyn Gateway) -> Result<ResponseEnvelope, ApiError> {
    clock(gateway, ClockStatus::ClockedOut).await
}

/// Dashboard metrics. The shape is backend-defined and passed through as-is.
///
/// # Errors
///
/// Returns the gateway error unchanged.
pub async fn submit_metrics(gateway: &dyn Gateway) -> Result<Value, ApiError> {
    let envelope = invoke(gateway, Action::SubmitMetrics, Map::new()).await?;
    Ok(envelope.data.unwrap_or(Value::Null))
}

/// Goals with their progress.
///
/// # Errors
///
/// Returns the gateway error, or [`ApiError::UnexpectedData`] if `data` is not a goal list.
pub async fn fetch_goals(gateway: &dyn Gateway) -> Result<Vec<Goal>, ApiError> {
    let envelope = invoke(gateway, Action::GetGoals, Map::new()).await?;
    decode_list(Action::GetGoals, envelope)
}

/// Team roster.
///
/// # Errors
///
/// Returns the gateway error, or [`ApiError::UnexpectedData`] if `data` is not a member list.
pub async fn fetch_team(gateway: &dyn Gateway) -> Result<Vec<TeamMember>, ApiError> {
    let envelope = invoke(gateway, Action::GetTeamData, Map::new()).await?;
    decode_list(Action::GetTeamData, envelope)
}

/// Team roster as loaded for the admin panel.
///
/// # Errors
///
/// Same as [`fetch_team`].
pub async fn load_admin_team(gateway: &dyn Gateway) -> Result<Vec<TeamMember>, ApiError> {
    let team = fetch_team(gateway).await?;
    tracing::info!(members = team.len(), "admin team data loaded");
    Ok(team)
}

async fn invoke(
    gateway: &dyn Gateway,
    action: Action,
    payload: Map<String, Value>,
) -> Result<ResponseEnvelope, ApiError> {
    gateway.call(action.name(), payload, action.method()).await
}

fn decode_list<T: DeserializeOwned>(action: Action, envelope: ResponseEnvelope) -> Result<Vec<T>, ApiError> {
    if matches!(envelope.data, None | Some(Value::Null)) {
        return Ok(Vec::new());
    }
    decode_data(action, envelope)
}

fn decode_data<T: DeserializeOwned>(action: Action, envelope: ResponseEnvelope) -> Result<T, ApiError> {
    serde_json::from_value(envelope.data.unwrap_or(Value::Null))
        .map_err(|e| ApiError::UnexpectedData { action: action.name(), reason: e.to_string() })
}

fn deserialize_f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("progress {number} is not representable"))),
        Value::String(text) => text
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("progress '{text}' is not a number"))),
        other => Err(D::Error::custom(format!("expected number for progress, got {other}"))),
    }
}
