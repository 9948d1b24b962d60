use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::{
    Error, Result,
    config::REFRESH_MARGIN,
    management::{Clock, CredentialStore},
    spotify::{auth, transport::Transport},
    types::{AppCredentials, Credentials},
};

/// App-only token obtained with the client-credentials grant. Never persisted.
struct AppToken {
    client_id: String,
    access_token: String,
    expires_at: i64,
}

/// Hands out access tokens that are valid for at least the refresh margin.
pub struct TokenManager {
    store: CredentialStore,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    token_url: String,
    app_token: Mutex<Option<AppToken>>,
}

impl TokenManager {
    pub fn new(
        store: CredentialStore,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        token_url: String,
    ) -> Self {
        TokenManager {
            store,
            transport,
            clock,
            token_url,
            app_token: Mutex::new(None),
        }
    }

    /// Returns a usable access token or `None` when the session is not
    /// authenticated.
    ///
    /// User credentials take precedence over app-only access. A stored
    /// token is returned without any network call while it is valid for
    /// longer than [`REFRESH_MARGIN`]; otherwise it is refreshed first.
    pub async fn get_valid_token(&self) -> Option<String> {
        if let Some(credentials) = self.store.load() {
            if !self.is_expired(credentials.expires_at) {
                return Some(credentials.access_token);
            }

            debug!("access token is within the refresh margin, refreshing");
            return match self.refresh_token(&credentials).await {
                Ok(refreshed) => Some(refreshed.access_token),
                Err(e) => {
                    warn!("{e}");
                    None
                }
            };
        }

        let app = self.store.app_credentials()?;
        match self.app_access_token(&app).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    /// Exchanges the refresh token for a new access token and persists it.
    ///
    /// When Spotify rejects the refresh token the stored credentials are
    /// removed, the user has to log in again. A transport failure leaves
    /// the stored record untouched.
    pub async fn refresh_token(&self, credentials: &Credentials) -> Result<Credentials> {
        let response = auth::refresh_token(
            self.transport.as_ref(),
            &self.token_url,
            &credentials.client_id,
            &credentials.refresh_token,
        )
        .await;

        let token = match response {
            Ok(token) => token,
            Err(e @ Error::Transport(_)) => return Err(Error::RefreshFailed(e.to_string())),
            Err(e) => {
                if let Err(clear_err) = self.store.clear() {
                    warn!("failed to discard rejected credentials: {clear_err}");
                }
                return Err(Error::RefreshFailed(e.to_string()));
            }
        };

        let expires_at = self.clock.now_ms().saturating_add(token.expires_in_ms());
        let refreshed = Credentials {
            client_id: credentials.client_id.clone(),
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| credentials.refresh_token.clone()),
            expires_at,
            scope: token.scope.unwrap_or_else(|| credentials.scope.clone()),
        };

        if let Err(e) = self.store.save(&refreshed) {
            warn!("failed to persist refreshed token: {e}");
        }

        Ok(refreshed)
    }

    /// Obtains (or reuses) an app-only token for the given client.
    pub async fn app_access_token(&self, app: &AppCredentials) -> Result<String> {
        {
            let cached = self.app_token.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(token) = cached.as_ref() {
                if token.client_id == app.client_id && !self.is_expired(token.expires_at) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("requesting app-only access token");
        let token = auth::client_credentials(self.transport.as_ref(), &self.token_url, app)
            .await
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;

        let access_token = token.access_token.clone();
        let expires_at = self.clock.now_ms().saturating_add(token.expires_in_ms());
        let mut cached = self.app_token.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(AppToken {
            client_id: app.client_id.clone(),
            access_token: token.access_token,
            expires_at,
        });

        Ok(access_token)
    }

    /// Drops the in-memory app-only token.
    pub fn forget_app_token(&self) {
        let mut cached = self.app_token.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    pub fn current_credentials(&self) -> Option<Credentials> {
        self.store.load()
    }

    fn is_expired(&self, expires_at: i64) -> bool {
        let margin_ms = REFRESH_MARGIN.as_millis() as i64;
        expires_at - self.clock.now_ms() <= margin_ms
    }
}
