use std::{collections::HashMap, sync::Arc};

use log::debug;
use url::Url;

use crate::{
    Error, Result,
    config::Settings,
    management::{Clock, CredentialStore, FileStore, SessionStore, SystemClock, TokenManager},
    spotify::{
        auth::AuthFlow,
        catalog::Catalog,
        gateway::{Gateway, SpotifyGateway},
        navigator::{BrowserNavigator, Navigator},
        transport::{HttpTransport, Transport},
    },
    types::{AppCredentials, AuthFlowState, Category, Credentials, Playlist, Track},
};

/// The client a host application talks to.
///
/// Owns the credential store, the token manager, the authorization flow
/// and the catalog. Build one per process in the composition root and
/// share it behind an `Arc`; tests build isolated instances with a
/// [`MemoryStore`](crate::management::MemoryStore) and fake transports.
pub struct SpotifyClient {
    store: CredentialStore,
    tokens: Arc<TokenManager>,
    auth: AuthFlow,
    catalog: Catalog,
}

impl SpotifyClient {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let store = CredentialStore::new(backend);
        let tokens = Arc::new(TokenManager::new(
            store.clone(),
            Arc::clone(&transport),
            Arc::clone(&clock),
            settings.token_url.clone(),
        ));
        let gateway: Arc<dyn Gateway> = Arc::new(SpotifyGateway::new(
            &settings,
            Arc::clone(&tokens),
            Arc::clone(&transport),
        ));
        let auth = AuthFlow::new(settings, store.clone(), transport, clock, navigator);

        Self {
            store,
            tokens,
            auth,
            catalog: Catalog::new(gateway),
        }
    }

    /// Production wiring: file store in the data directory, `reqwest`
    /// transport, system clock and the default browser.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let transport = HttpTransport::new(settings.request_timeout)?;
        Ok(Self::new(
            settings,
            Arc::new(FileStore::in_data_dir()),
            Arc::new(transport),
            Arc::new(SystemClock),
            Arc::new(BrowserNavigator),
        ))
    }

    /// Whether user credentials or app-only credentials are stored.
    pub fn is_configured(&self) -> bool {
        self.store.load().is_some() || self.store.app_credentials().is_some()
    }

    /// See [`AuthFlow::start_login`].
    pub fn start_login(&self, client_id: &str) -> Result<Url> {
        self.auth.start_login(client_id)
    }

    /// See [`AuthFlow::handle_callback`].
    pub async fn handle_callback(&self, query: &HashMap<String, String>) -> Result<Credentials> {
        self.auth.handle_callback(query).await
    }

    /// Configures app-only access with the client-credentials grant.
    ///
    /// The credentials are verified by requesting a token and only stored
    /// when Spotify accepts them.
    pub async fn connect_app(&self, client_id: &str, client_secret: &str) -> Result<()> {
        let app = AppCredentials {
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
        };
        if app.client_id.is_empty() || app.client_secret.is_empty() {
            return Err(Error::InvalidConfiguration(
                "client id and client secret are both required".to_string(),
            ));
        }

        self.tokens
            .app_access_token(&app)
            .await
            .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;
        self.store.set_app_credentials(&app)?;
        debug!("app-only credentials stored");
        Ok(())
    }

    /// Forgets every piece of persisted session state.
    ///
    /// Idempotent: logging out without a session succeeds.
    pub fn logout(&self) -> Result<()> {
        self.tokens.forget_app_token();
        self.auth.reset();
        self.store.clear_all()?;
        Ok(())
    }

    pub fn callback_address(&self) -> String {
        self.auth.callback_address()
    }

    /// Overrides the callback address. It has to be registered with the
    /// Spotify application exactly as given.
    pub fn set_callback_address(&self, address: &str) -> Result<()> {
        let address = address.trim();
        let url = Url::parse(address).map_err(|e| {
            Error::InvalidConfiguration(format!("invalid callback address {address}: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfiguration(format!(
                "callback address must be http(s): {address}"
            )));
        }
        // `/` serves the landing page the callback redirects to
        if url.path() == "/" {
            return Err(Error::InvalidConfiguration(format!(
                "callback address needs a path, e.g. {}/callback",
                address.trim_end_matches('/')
            )));
        }

        self.store.set_callback_override(address)?;
        Ok(())
    }

    pub fn reset_callback_address(&self) -> Result<()> {
        self.store.clear_callback_override()?;
        Ok(())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.tokens.current_credentials()
    }

    pub fn flow_state(&self) -> AuthFlowState {
        self.auth.state()
    }

    pub async fn valid_access_token(&self) -> Option<String> {
        self.tokens.get_valid_token().await
    }

    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>> {
        self.catalog.search_tracks(query, limit).await
    }

    pub async fn featured_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        self.catalog.featured_playlists(limit).await
    }

    pub async fn new_releases(&self, limit: u32) -> Result<Vec<Track>> {
        self.catalog.new_releases(limit).await
    }

    pub async fn categories(&self, limit: u32) -> Result<Vec<Category>> {
        self.catalog.categories(limit).await
    }

    pub async fn playlist_tracks(&self, playlist_id: &str, limit: u32) -> Result<Vec<Track>> {
        self.catalog.playlist_tracks(playlist_id, limit).await
    }

    pub async fn saved_tracks(&self, limit: u32) -> Result<Vec<Track>> {
        self.catalog.saved_tracks(limit).await
    }

    pub async fn top_tracks(&self, limit: u32) -> Result<Vec<Track>> {
        self.catalog.top_tracks(limit).await
    }

    pub async fn recently_played(&self, limit: u32) -> Result<Vec<Track>> {
        self.catalog.recently_played(limit).await
    }

    pub async fn user_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        self.catalog.user_playlists(limit).await
    }
}
