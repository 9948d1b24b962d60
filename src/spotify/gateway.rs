use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    Error, Result,
    config::Settings,
    management::TokenManager,
    spotify::transport::{HttpRequest, Transport},
};

/// First wait before retrying a 5xx, doubled on every further attempt.
const BASE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Authenticated access to the Web API.
///
/// Implementations report failures precisely and never substitute data;
/// degrading gracefully is the business of the catalog.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Calls `path` (relative to the API base, with query) and returns the
    /// JSON body. An empty 2xx body is `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] when no access token is available; no call is made
    /// - [`Error::Upstream`] for a non-2xx status
    /// - [`Error::Transport`] when no response arrived
    /// - [`Error::Decode`] when a 2xx body is not JSON
    async fn request(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value>;
}

pub struct SpotifyGateway {
    tokens: Arc<TokenManager>,
    transport: Arc<dyn Transport>,
    api_url: String,
    max_retries: u32,
    max_retry_delay: Duration,
}

impl SpotifyGateway {
    pub fn new(
        settings: &Settings,
        tokens: Arc<TokenManager>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            tokens,
            transport,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
            max_retry_delay: settings.max_retry_delay,
        }
    }

    /// How long to wait before retrying a response with `status`, if at all.
    ///
    /// `429` honours `Retry-After` as long as it stays within the maximum
    /// delay; bad gateway and unavailable responses back off exponentially.
    fn retry_delay(
        &self,
        status: u16,
        retry_after: Option<u64>,
        attempt: u32,
    ) -> Option<Duration> {
        match status {
            429 => {
                let delay = Duration::from_secs(retry_after.unwrap_or(1));
                if delay > self.max_retry_delay {
                    warn!(
                        "rate limited for {} seconds, not waiting that long",
                        delay.as_secs()
                    );
                    return None;
                }
                Some(delay)
            }
            502..=504 => Some(
                BASE_RETRY_DELAY
                    .saturating_mul(2u32.saturating_pow(attempt))
                    .min(self.max_retry_delay),
            ),
            _ => None,
        }
    }
}

#[async_trait]
impl Gateway for SpotifyGateway {
    async fn request(&self, path: &str, method: Method, body: Option<Value>) -> Result<Value> {
        let Some(token) = self.tokens.get_valid_token().await else {
            return Err(Error::Unauthenticated);
        };

        let url = format!("{}{}", self.api_url, path);
        let mut attempt = 0;

        loop {
            let mut request = HttpRequest::new(method.clone(), url.as_str()).bearer(&token);
            if let Some(body) = &body {
                request = request.json(body.clone());
            }

            debug!("{method} {path}");
            let response = self.transport.send(request).await?;

            if response.is_success() {
                if response.body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                return Ok(serde_json::from_str(&response.body)?);
            }

            if attempt < self.max_retries {
                let delay = self.retry_delay(response.status, response.retry_after, attempt);
                if let Some(delay) = delay {
                    attempt += 1;
                    debug!(
                        "{path} answered {}, retry {attempt}/{} in {delay:?}",
                        response.status, self.max_retries
                    );
                    sleep(delay).await;
                    continue; // retry
                }
            }

            return Err(Error::Upstream(response.status));
        }
    }
}
