//! HTTP client for Supabase's PostgREST RPC endpoint.
//!
//! Every remote procedure is a `POST {base}/rest/v1/rpc/{function}` with the
//! arguments as a JSON object. The anonymous key travels both as `apikey` and
//! as a bearer token, which is what the hosted gateway expects for
//! unauthenticated reads.

use std::time::Duration;

use localmart_core::RawNearbyRecord;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::BackendError;
use crate::retry::retry_with_backoff;
use crate::types::PostgrestErrorBody;

/// Retry settings for transient RPC failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Client for a Supabase project's REST API.
///
/// Use [`SupabaseClient::new`] with the project URL; tests point it at a
/// wiremock server the same way.
pub struct SupabaseClient {
    client: Client,
    anon_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BackendError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, anon_key: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("localmart/0.1 (nearby-discovery)")
            .build()?;

        // Normalise to exactly one trailing slash so `join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| BackendError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            anon_key: anon_key.to_owned(),
            base_url: parsed,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Calls a set-returning remote procedure and parses the rows as
    /// [`RawNearbyRecord`]s.
    ///
    /// A `null` body is treated as zero rows.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Api`] on a non-2xx status (after retries for 5xx/429).
    /// - [`BackendError::Http`] on network failure after retries.
    /// - [`BackendError::Deserialize`] if the body is not an array of objects.
    pub async fn rpc_records<P>(
        &self,
        function: &str,
        params: &P,
    ) -> Result<Vec<RawNearbyRecord>, BackendError>
    where
        P: Serialize + ?Sized,
    {
        let body = self.rpc(function, params).await?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(body).map_err(|e| BackendError::Deserialize {
            context: format!("rpc/{function}"),
            source: e,
        })
    }

    /// Calls a remote procedure and returns the raw JSON body.
    ///
    /// # Errors
    ///
    /// See [`SupabaseClient::rpc_records`].
    pub async fn rpc<P>(&self, function: &str, params: &P) -> Result<serde_json::Value, BackendError>
    where
        P: Serialize + ?Sized,
    {
        let url = self.rpc_url(function)?;
        let payload = serde_json::to_value(params).map_err(|e| BackendError::Deserialize {
            context: format!("rpc/{function} params"),
            source: e,
        })?;

        tracing::debug!(function, %url, "calling remote procedure");
        retry_with_backoff(self.retry.max_retries, self.retry.backoff_base_ms, || {
            let url = url.clone();
            let payload = &payload;
            async move { self.post_json(url, payload).await }
        })
        .await
    }

    /// Builds `{base}/rest/v1/rpc/{function}`.
    fn rpc_url(&self, function: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("rest/v1/rpc/{function}"))
            .map_err(|e| BackendError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends one POST, maps non-2xx statuses to [`BackendError::Api`], and
    /// parses the body as JSON.
    async fn post_json(
        &self,
        url: Url,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .client
            .post(url.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<PostgrestErrorBody>(&text).map_or_else(
                |_| text.chars().take(200).collect::<String>(),
                |body| body.summary(),
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
