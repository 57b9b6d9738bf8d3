//! Gateway configuration.
//!
//! `GatewayConfig` tells the HTTP gateway where the notes API lives and how
//! to authenticate. The CLI layers flag, environment and file values on top of
//! each other before handing one of these to the core.

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};

pub const API_URL_ENV: &str = "NOTESYNC_API_URL";
pub const API_TOKEN_ENV: &str = "NOTESYNC_API_TOKEN";
pub const TIMEOUT_ENV: &str = "NOTESYNC_TIMEOUT_SECS";

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("GatewayConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl GatewayConfig {
    /// Read `NOTESYNC_API_URL`, `NOTESYNC_API_TOKEN` and `NOTESYNC_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable timeouts are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let request_timeout_secs = normalize_text_option(lookup(TIMEOUT_ENV)).and_then(|raw| {
            raw.parse::<u64>()
                .map_err(|_| tracing::warn!(value = %raw, "Ignoring invalid request timeout"))
                .ok()
        });

        Self {
            api_base_url: normalize_text_option(lookup(API_URL_ENV)),
            access_token: normalize_text_option(lookup(API_TOKEN_ENV)),
            request_timeout_secs,
        }
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            api_base_url: normalize_text_option(self.api_base_url)
                .or_else(|| normalize_text_option(fallback.api_base_url)),
            access_token: normalize_text_option(self.access_token)
                .or_else(|| normalize_text_option(fallback.access_token)),
            request_timeout_secs: self.request_timeout_secs.or(fallback.request_timeout_secs),
        }
    }

    /// Validated base URL with the trailing slash trimmed.
    pub fn normalized_base_url(&self) -> Result<String, String> {
        let value = normalize_text_option(self.api_base_url.clone())
            .ok_or_else(|| format!("api_base_url is required (set {API_URL_ENV})"))?;
        if is_http_url(&value) {
            Ok(value.trim_end_matches('/').to_string())
        } else {
            Err("api_base_url must include http:// or https://".to_string())
        }
    }

    pub fn access_token(&self) -> Option<String> {
        normalize_text_option(self.access_token.clone())
    }
}
