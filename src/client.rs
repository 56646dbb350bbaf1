//! Gateway client: one endpoint, many named actions.
//!
//! DESIGN
//! ======
//! Every call resolves the identity, raises the in-flight indicator, sends a
//! single request (query string for reads, JSON envelope for writes), decodes
//! the response envelope and checks `success`. Failures of either kind are
//! reported through the [`Notifier`] while the indicator is still up, and then
//! returned. There are no retries and no request timeout.

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::Url;
use reqwest::redirect::Policy;
use serde_json::{Map, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::{Method, RequestEnvelope, ResponseEnvelope, read_query};
use crate::error::ApiError;
use crate::feedback::{InFlight, InFlightIndicator, Notifier};
use crate::identity::Session;

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Anything that can execute a named action. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Execute `action` and return the successful response envelope.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, `success: false`
    /// responses, or an unresolved identity.
    async fn call(
        &self,
        action: &str,
        payload: Map<String, Value>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError>;

    /// Read call: `GET` with no payload.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::call`].
    async fn get(&self, action: &str) -> Result<ResponseEnvelope, ApiError> {
        self.call(action, Map::new(), Method::Get).await
    }

    /// Write call: `POST` with `payload`.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::call`].
    async fn post(&self, action: &str, payload: Map<String, Value>) -> Result<ResponseEnvelope, ApiError> {
        self.call(action, payload, Method::Post).await
    }
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Gateway backed by a real HTTP endpoint.
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: Url,
    session: Session,
    in_flight: InFlight,
    notifier: Arc<dyn Notifier>,
}

impl GatewayClient {
    /// Build a client for `config.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        session: Session,
        indicator: Arc<dyn InFlightIndicator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint.clone(), session, in_flight: InFlight::new(indicator), notifier })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Calls currently in flight across all clones of the indicator.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.active()
    }

    async fn exchange(
        &self,
        action: &str,
        payload: &Map<String, Value>,
        method: Method,
        email: &str,
    ) -> Result<ResponseEnvelope, ApiError> {
        let request = match method {
            Method::Get => self.http.get(self.endpoint.clone()).query(&read_query(action, email)),
            Method::Post => {
                let envelope = RequestEnvelope { action, payload, email };
                self.http.post(self.endpoint.clone()).json(&envelope)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        ResponseEnvelope::parse(&body)?.into_result()
    }
}

#[async_trait::async_trait]
impl Gateway for GatewayClient {
    async fn call(
        &self,
        action: &str,
        payload: Map<String, Value>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError> {
        let span = tracing::info_span!("gateway_call", action, %method, request_id = %Uuid::new_v4());
        async {
            let email = self.session.resolve().await?;
            // Held until after the notifier runs.
            let _guard = self.in_flight.begin();
            match self.exchange(action, &payload, method, &email).await {
                Ok(envelope) => {
                    tracing::debug!("gateway call succeeded");
                    Ok(envelope)
                }
                Err(e) => {
                    tracing::error!(code = e.error_code(), error = %e, "API error ({action})");
                    self.notifier.notify(&e.to_string());
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
