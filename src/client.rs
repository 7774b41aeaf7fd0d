//! Remote advisory HTTP client.
//!
//! [`AdvisoryClient`] talks to the advisory service's JSON API and maps
//! every outcome into the typed failure taxonomy:
//!
//! - network / timeout → [`AdvisoryError::Transport`]
//! - non-2xx status → [`AdvisoryError::Server`] (with the structured error
//!   body when one is present)
//! - 2xx but unparsable or missing `data` → [`AdvisoryError::MalformedResponse`]
//!
//! No retry is performed here: retry and fallback policy belong to the
//! caller (see [`crate::advisor`]), which substitutes
//! [`crate::fallback`] data for the read-only views and surfaces errors
//! for the advice-query flow.
//!
//! The [`AdviceSource`] trait is the seam the orchestrator consumes, so
//! tests can script a source without a live endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::envelope::{
    Envelope, HealthCheck, ProfileData, QueryRequest, QueryResponseData, RecommendationsData,
    UpsertProfileRequest,
};
use crate::error::AdvisoryError;
use crate::models::FarmerProfile;

/// Where the orchestrator gets advice and recommendations from.
///
/// [`AdvisoryClient`] is the production implementation; tests implement
/// this with scripted responses.
#[async_trait]
pub trait AdviceSource: Send + Sync {
    async fn submit_query(&self, request: &QueryRequest)
        -> Result<QueryResponseData, AdvisoryError>;

    async fn recommendations(&self, uid: &str) -> Result<RecommendationsData, AdvisoryError>;
}

/// HTTP client for the remote advisory service.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdvisoryClient {
    /// Build a client from configuration. The configured timeout applies
    /// to every request; a hung upstream fails with
    /// [`AdvisoryError::Transport`] when it elapses.
    pub fn new(config: &ApiConfig) -> Result<Self, AdvisoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `POST /query`: submit a text/image/audio query.
    ///
    /// The request already carries the district context; see
    /// [`QueryRequest::builder`](crate::envelope::QueryRequest::builder).
    pub async fn submit_query(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryResponseData, AdvisoryError> {
        let response = self
            .http
            .post(self.endpoint("query"))
            .json(request)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// `GET /recommendations/:uid`: weather, market, schemes, daily plan.
    pub async fn recommendations(&self, uid: &str) -> Result<RecommendationsData, AdvisoryError> {
        let response = self
            .http
            .get(self.endpoint(&format!("recommendations/{uid}")))
            .send()
            .await?;
        read_envelope(response).await
    }

    /// `POST /users`: create or update the farmer profile. Returns the
    /// profile as the remote side now sees it.
    pub async fn upsert_profile(
        &self,
        profile: &FarmerProfile,
    ) -> Result<FarmerProfile, AdvisoryError> {
        let body = UpsertProfileRequest {
            uid: &profile.uid,
            profile,
        };
        let response = self
            .http
            .post(self.endpoint("users"))
            .json(&body)
            .send()
            .await?;
        let data: ProfileData = read_envelope(response).await?;
        Ok(data.user)
    }

    /// `GET /users/:uid`: fetch the remote profile. HTTP 404 means the
    /// user has no profile yet and maps to `Ok(None)`.
    pub async fn fetch_profile(&self, uid: &str) -> Result<Option<FarmerProfile>, AdvisoryError> {
        let response = self
            .http
            .get(self.endpoint(&format!("users/{uid}")))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let data: ProfileData = read_envelope(response).await?;
        Ok(Some(data.user))
    }

    /// `GET /health`: liveness probe. No envelope, no side effects.
    pub async fn health(&self) -> Result<HealthCheck, AdvisoryError> {
        let response = self.http.get(self.endpoint("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(server_error(status.as_u16(), response).await);
        }
        response
            .json::<HealthCheck>()
            .await
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl AdviceSource for AdvisoryClient {
    async fn submit_query(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryResponseData, AdvisoryError> {
        AdvisoryClient::submit_query(self, request).await
    }

    async fn recommendations(&self, uid: &str) -> Result<RecommendationsData, AdvisoryError> {
        AdvisoryClient::recommendations(self, uid).await
    }
}

/// Parse an enveloped 2xx response, or classify the failure.
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AdvisoryError> {
    let status = response.status();
    if !status.is_success() {
        return Err(server_error(status.as_u16(), response).await);
    }

    let body = response.text().await?;
    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
    envelope.into_data()
}

/// Build a [`AdvisoryError::Server`], preferring the structured error body.
async fn server_error(status: u16, response: reqwest::Response) -> AdvisoryError {
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|env| env.error)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                }
            }),
        Err(_) => format!("HTTP {status}"),
    };
    AdvisoryError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_regardless_of_slashes() {
        let client = AdvisoryClient::new(&ApiConfig {
            base_url: "http://localhost:9100/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.endpoint("query"), "http://localhost:9100/query");
        assert_eq!(
            client.endpoint("/users/u1"),
            "http://localhost:9100/users/u1"
        );
    }
}
