//! HTTP client for the notes API conflict endpoints.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ConflictGateway, GatewayError, GatewayResult, NewConflict, ResolveRequest};
use crate::config::GatewayConfig;
use crate::models::{ConflictId, SyncConflict};
use crate::resolution::ResolutionEntry;
use crate::util::compact_text;

#[derive(Clone)]
pub struct HttpConflictGateway {
    conflicts_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpConflictGateway {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpConflictGateway")
            .field("conflicts_url", &self.conflicts_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpConflictGateway {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let base_url = config
            .normalized_base_url()
            .map_err(GatewayError::InvalidConfiguration)?;

        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            conflicts_url: format!("{base_url}/conflicts"),
            access_token: config.access_token(),
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.conflicts_url.clone()
        } else {
            format!("{}/{}", self.conflicts_url, path.trim_start_matches('/'))
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> GatewayResult<reqwest::Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Conflict API request failed");
        Err(GatewayError::Api {
            status: status.as_u16(),
            message: parse_api_error(status, &body),
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> GatewayResult<T> {
        let response = Self::send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_action(&self, id: ConflictId, action: &str) -> GatewayResult<SyncConflict> {
        let request = self
            .request(Method::POST, &format!("{id}/{action}"))
            .json(&serde_json::json!({}));
        Self::send_json(request).await
    }
}

impl ConflictGateway for HttpConflictGateway {
    async fn list_conflicts(&self) -> GatewayResult<Vec<SyncConflict>> {
        Self::send_json(self.request(Method::GET, "")).await
    }

    async fn get_conflict(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        Self::send_json(self.request(Method::GET, &id.to_string())).await
    }

    async fn resolve(
        &self,
        id: ConflictId,
        resolutions: Vec<ResolutionEntry>,
    ) -> GatewayResult<SyncConflict> {
        let request = self
            .request(Method::POST, &format!("{id}/resolve"))
            .json(&ResolveRequest { resolutions });
        Self::send_json(request).await
    }

    async fn ignore(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.post_action(id, "ignore").await
    }

    async fn accept_local(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.post_action(id, "accept-local").await
    }

    async fn accept_remote(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.post_action(id, "accept-remote").await
    }

    async fn create_conflict(&self, request: NewConflict) -> GatewayResult<SyncConflict> {
        Self::send_json(self.request(Method::POST, "").json(&request)).await
    }

    async fn delete_resolved(&self) -> GatewayResult<()> {
        Self::send(self.request(Method::DELETE, "resolved")).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
