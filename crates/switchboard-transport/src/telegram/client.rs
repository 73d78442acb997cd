//! Bot API HTTP client.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use switchboard_core::{TransportError, TransportResult};
use tracing::trace;

use super::types::ApiResponse;

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Connection settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    pub token: String,
    /// API root, without the `/bot<token>` part.
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout: Duration,
}

impl TelegramConfig {
    /// Creates a config for `token` with default endpoint and timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout: Duration::from_secs(30),
        }
    }
}

/// A cheaply clonable Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base: String,
    poll_timeout: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The base URL embeds the token.
        f.debug_struct("TelegramClient")
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Builds the client. The HTTP timeout is the poll timeout plus a margin
    /// so long polls are not cut short.
    pub fn new(config: TelegramConfig) -> TransportResult<Self> {
        let http = ClientBuilder::new()
            .timeout(config.poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.token
            ),
            poll_timeout: config.poll_timeout,
        })
    }

    /// Long-poll timeout.
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Calls a Bot API method with a JSON body.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> TransportResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        trace!(method, "Bot API call");
        let resp = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        decode(status.as_u16(), &body)
    }
}

/// Unwraps a Bot API envelope.
pub(crate) fn decode<R: DeserializeOwned>(status: u16, body: &str) -> TransportResult<R> {
    let envelope: ApiResponse<R> = serde_json::from_str(body).map_err(|e| {
        if (200..300).contains(&status) {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Api {
                status,
                description: format!("non-JSON body ({e})"),
            }
        }
    })?;

    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { ok: true, .. } => {
            Err(TransportError::Decode("missing result field".to_string()))
        }
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(TransportError::Api {
            status: error_code.unwrap_or(status),
            description: description.unwrap_or_default(),
        }),
    }
}
