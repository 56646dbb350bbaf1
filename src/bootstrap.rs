//! Startup sequence: identify the user, then load every dashboard panel.
//!
//! DESIGN
//! ======
//! `getUserInfo` runs first; nothing else is worth loading for an unknown
//! user. The three panel reads then run concurrently with fail-fast
//! semantics: one failure fails the whole startup and discards the other
//! results. For admins the roster load is spawned before the panel reads and
//! never awaited by startup; its failure is only logged.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::actions::{self, Goal, TeamMember, UserInfo};
use crate::client::Gateway;
use crate::error::ApiError;

/// Everything the dashboard shows after a successful startup.
#[derive(Debug)]
pub struct Dashboard {
    pub user: UserInfo,
    pub metrics: Value,
    pub goals: Vec<Goal>,
    pub team: Vec<TeamMember>,
    /// Background roster load, started only for admins.
    pub admin_roster: Option<AdminRoster>,
}

/// Admin roster load running on its own task.
#[derive(Debug)]
pub struct AdminRoster(JoinHandle<Option<Vec<TeamMember>>>);

impl AdminRoster {
    fn spawn(gateway: Arc<dyn Gateway>) -> Self {
        Self(tokio::spawn(async move {
            match actions::load_admin_team(gateway.as_ref()).await {
                Ok(team) => Some(team),
                Err(e) => {
                    tracing::warn!(error = %e, "admin team data unavailable");
                    None
                }
            }
        }))
    }

    /// Wait for the roster. `None` if the load failed.
    pub async fn wait(self) -> Option<Vec<TeamMember>> {
        self.0.await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "admin roster task did not finish");
            None
        })
    }
}

/// Run the startup sequence against `gateway`.
///
/// # Errors
///
/// Returns the first failure among the user lookup and the three panel reads.
pub async fn initialize(gateway: Arc<dyn Gateway>) -> Result<Dashboard, ApiError> {
    let user = actions::fetch_user_info(gateway.as_ref()).await?;
    tracing::info!(user = user.display_name(), is_admin = user.is_admin, "user identified");

    let admin_roster = user.is_admin.then(|| AdminRoster::spawn(Arc::clone(&gateway)));

    let (metrics, goals, team) = tokio::try_join!(
        actions::submit_metrics(gateway.as_ref()),
        actions::fetch_goals(gateway.as_ref()),
        actions::fetch_team(gateway.as_ref()),
    )?;

    Ok(Dashboard { user, metrics, goals, team, admin_roster })
}
