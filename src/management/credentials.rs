use std::sync::Arc;

use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    management::{SessionStore, StoreError},
    types::{AppCredentials, Credentials},
};

pub const CLIENT_ID_KEY: &str = "spotlite_client_id";
pub const AUTH_STATE_KEY: &str = "spotlite_auth_state";
pub const CODE_VERIFIER_KEY: &str = "spotlite_code_verifier";
pub const REDIRECT_URI_KEY: &str = "spotlite_redirect_uri";
pub const CREDENTIALS_KEY: &str = "spotlite_credentials";
pub const APP_CREDENTIALS_KEY: &str = "spotlite_app_credentials";

const ALL_KEYS: [&str; 6] = [
    CLIENT_ID_KEY,
    AUTH_STATE_KEY,
    CODE_VERIFIER_KEY,
    REDIRECT_URI_KEY,
    CREDENTIALS_KEY,
    APP_CREDENTIALS_KEY,
];

/// Typed access to everything the session persists.
///
/// Reads never fail: an unreadable or malformed value is reported in the
/// log and treated as absent. Writes serialize completely before touching
/// the backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SessionStore>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn SessionStore>) -> Self {
        Self { backend }
    }

    pub fn load(&self) -> Option<Credentials> {
        let credentials: Credentials = self.read(CREDENTIALS_KEY)?;
        if credentials.is_well_formed() {
            return Some(credentials);
        }

        warn!("discarding stored credentials with missing tokens");
        self.discard(CREDENTIALS_KEY);
        None
    }

    pub fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.write(CREDENTIALS_KEY, credentials)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(CREDENTIALS_KEY)
    }

    pub fn client_id(&self) -> Option<String> {
        self.read(CLIENT_ID_KEY)
    }

    pub fn set_client_id(&self, client_id: &str) -> Result<(), StoreError> {
        self.write(CLIENT_ID_KEY, &client_id)
    }

    pub fn set_auth_state(&self, state: &str) -> Result<(), StoreError> {
        self.write(AUTH_STATE_KEY, &state)
    }

    /// Returns the pending anti-forgery state and removes it.
    pub fn take_auth_state(&self) -> Option<String> {
        self.take(AUTH_STATE_KEY)
    }

    pub fn set_code_verifier(&self, verifier: &str) -> Result<(), StoreError> {
        self.write(CODE_VERIFIER_KEY, &verifier)
    }

    pub fn take_code_verifier(&self) -> Option<String> {
        self.take(CODE_VERIFIER_KEY)
    }

    pub fn callback_override(&self) -> Option<String> {
        self.read(REDIRECT_URI_KEY)
    }

    pub fn set_callback_override(&self, address: &str) -> Result<(), StoreError> {
        self.write(REDIRECT_URI_KEY, &address)
    }

    pub fn clear_callback_override(&self) -> Result<(), StoreError> {
        self.backend.remove(REDIRECT_URI_KEY)
    }

    pub fn app_credentials(&self) -> Option<AppCredentials> {
        self.read(APP_CREDENTIALS_KEY)
    }

    pub fn set_app_credentials(&self, app: &AppCredentials) -> Result<(), StoreError> {
        self.write(APP_CREDENTIALS_KEY, app)
    }

    /// Removes every key, continuing past failures. Returns the first error.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in ALL_KEYS {
            if let Err(e) = self.backend.remove(key) {
                warn!("failed to remove {key}: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("failed to read {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding corrupted {key}: {e}");
                self.discard(key);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    fn take(&self, key: &str) -> Option<String> {
        let value = self.read(key);
        self.discard(key);
        value
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!("failed to remove {key}: {e}");
        }
    }
}
