use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, warn};
use url::Url;

use crate::{
    Error, Result,
    config::Settings,
    management::{Clock, CredentialStore},
    spotify::{
        navigator::Navigator,
        transport::{HttpRequest, Transport},
    },
    types::{AppCredentials, AuthFlowState, Credentials, TokenResponse},
    utils,
};

/// Lifetime Spotify documents for access tokens, used when a response omits it.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Longest token lifetime accepted from the token endpoint (one year).
const MAX_EXPIRES_IN: u64 = 365 * 24 * 3600;

/// A successful answer of the token endpoint.
#[derive(Debug, Clone)]
pub struct GrantedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: u64,
    pub scope: Option<String>,
}

impl GrantedToken {
    pub fn expires_in_ms(&self) -> i64 {
        i64::try_from(self.expires_in)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }
}

/// Drives the authorization code flow with PKCE.
///
/// [`AuthFlow::start_login`] persists a fresh anti-forgery state and code
/// verifier and sends the user to Spotify. Spotify redirects back to the
/// callback address, and the host hands the query of that request to
/// [`AuthFlow::handle_callback`], which verifies the state and exchanges
/// the code for credentials.
///
/// ```text
/// Idle -> AwaitingRedirect -> ExchangingCode -> Authorized
///              |                    |
///              +------> Failed <----+
/// ```
pub struct AuthFlow {
    settings: Settings,
    store: CredentialStore,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<AuthFlowState>,
}

impl AuthFlow {
    pub fn new(
        settings: Settings,
        store: CredentialStore,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            settings,
            store,
            transport,
            clock,
            navigator,
            state: Mutex::new(AuthFlowState::Idle),
        }
    }

    pub fn state(&self) -> AuthFlowState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns to `Idle`, e.g. after logout.
    pub fn reset(&self) {
        self.set_state(AuthFlowState::Idle);
    }

    /// The configured callback address, or `<origin>/callback` by default.
    pub fn callback_address(&self) -> String {
        self.store
            .callback_override()
            .unwrap_or_else(|| self.settings.default_callback_address())
    }

    /// Starts a login for `client_id` and opens the authorization page.
    ///
    /// Returns the authorization URL so the host can show it when no
    /// browser could be opened.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for an empty client id or an
    /// unusable callback address / authorization endpoint. Nothing is
    /// persisted in that case.
    pub fn start_login(&self, client_id: &str) -> Result<Url> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(Error::InvalidConfiguration(
                "client id must not be empty".to_string(),
            ));
        }

        let redirect_uri = self.callback_address();
        Url::parse(&redirect_uri).map_err(|e| {
            Error::InvalidConfiguration(format!("invalid callback address {redirect_uri}: {e}"))
        })?;

        // generate anti-forgery state and PKCE verifier
        let state = utils::generate_state();
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);

        let auth_url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri.as_str()),
                ("state", state.as_str()),
                ("scope", self.settings.scope.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge.as_str()),
            ],
        )
        .map_err(|e| {
            Error::InvalidConfiguration(format!(
                "invalid authorization endpoint {}: {e}",
                self.settings.auth_url
            ))
        })?;

        self.store.set_client_id(client_id)?;
        self.store.set_auth_state(&state)?;
        self.store.set_code_verifier(&code_verifier)?;
        self.set_state(AuthFlowState::AwaitingRedirect);

        if let Err(e) = self.navigator.open(auth_url.as_str()) {
            warn!("failed to open browser: {e}");
        }

        Ok(auth_url)
    }

    /// Completes the login with the query Spotify appended to the callback
    /// address.
    ///
    /// The pending state and verifier are consumed on every call, so a
    /// replayed callback fails with [`Error::StateMismatch`] without
    /// reaching the token endpoint. Once authorized, stray callbacks are
    /// rejected the same way and leave the flow `Authorized`.
    pub async fn handle_callback(&self, query: &HashMap<String, String>) -> Result<Credentials> {
        if self.state() == AuthFlowState::Authorized {
            debug!("ignoring callback after completed login");
            return Err(Error::StateMismatch);
        }

        let result = self.complete_login(query).await;
        match &result {
            Ok(_) => self.set_state(AuthFlowState::Authorized),
            Err(e) => self.set_state(AuthFlowState::Failed(e.clone())),
        }
        result
    }

    async fn complete_login(&self, query: &HashMap<String, String>) -> Result<Credentials> {
        let expected_state = self.store.take_auth_state();
        let code_verifier = self.store.take_code_verifier();

        if let Some(error) = query.get("error") {
            return Err(Error::AuthorizationDenied(error.clone()));
        }

        match (expected_state.as_deref(), query.get("state")) {
            (Some(expected), Some(echoed)) if expected == echoed => {}
            _ => return Err(Error::StateMismatch),
        }

        let code = query
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                Error::TokenExchangeFailed("callback carried no authorization code".to_string())
            })?;

        let client_id = self.store.client_id().ok_or_else(|| {
            Error::InvalidConfiguration("no client id stored, start the login again".to_string())
        })?;

        self.set_state(AuthFlowState::ExchangingCode);
        let redirect_uri = self.callback_address();
        let token = exchange_code_pkce(
            self.transport.as_ref(),
            &self.settings.token_url,
            &client_id,
            code,
            code_verifier.as_deref(),
            &redirect_uri,
        )
        .await
        .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;

        let expires_at = self.clock.now_ms().saturating_add(token.expires_in_ms());
        let Some(refresh_token) = token.refresh_token else {
            return Err(Error::TokenExchangeFailed(
                "token response carried no refresh token".to_string(),
            ));
        };

        let credentials = Credentials {
            client_id,
            access_token: token.access_token,
            refresh_token,
            expires_at,
            scope: token.scope.unwrap_or_default(),
        };
        self.store.save(&credentials)?;
        debug!("authorization code exchanged, credentials stored");

        Ok(credentials)
    }

    fn set_state(&self, next: AuthFlowState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Exchanges an authorization code for tokens.
///
/// The verifier must belong to the challenge sent with the authorization
/// request; Spotify rejects the exchange otherwise.
pub async fn exchange_code_pkce(
    transport: &dyn Transport,
    token_url: &str,
    client_id: &str,
    code: &str,
    verifier: Option<&str>,
    redirect_uri: &str,
) -> Result<GrantedToken> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("client_id", client_id),
        ("code", code),
        ("redirect_uri", redirect_uri),
    ];
    if let Some(verifier) = verifier {
        form.push(("code_verifier", verifier));
    }

    request_token(transport, HttpRequest::post_form(token_url, &form)).await
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may rotate the refresh token; the new one, if any, is in the
/// returned [`GrantedToken`].
pub async fn refresh_token(
    transport: &dyn Transport,
    token_url: &str,
    client_id: &str,
    refresh_token: &str,
) -> Result<GrantedToken> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id),
    ];

    request_token(transport, HttpRequest::post_form(token_url, &form)).await
}

/// Requests an app-only token with the client-credentials grant.
pub async fn client_credentials(
    transport: &dyn Transport,
    token_url: &str,
    app: &AppCredentials,
) -> Result<GrantedToken> {
    let request = HttpRequest::post_form(token_url, &[("grant_type", "client_credentials")])
        .basic_auth(&app.client_id, &app.client_secret);

    request_token(transport, request).await
}

async fn request_token(transport: &dyn Transport, request: HttpRequest) -> Result<GrantedToken> {
    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(Error::Upstream(response.status));
    }

    let token: TokenResponse = serde_json::from_str(&response.body)?;
    let access_token = token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Decode("token response carried no access token".to_string()))?;

    let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
    if expires_in > MAX_EXPIRES_IN {
        return Err(Error::Decode(format!(
            "token lifetime of {expires_in} seconds is out of range"
        )));
    }

    Ok(GrantedToken {
        access_token,
        refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        expires_in,
        scope: token.scope,
    })
}
