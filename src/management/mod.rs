mod auth;
mod clock;
mod credentials;
mod store;

pub use auth::TokenManager;
pub use clock::{Clock, SystemClock};
pub use credentials::{
    APP_CREDENTIALS_KEY, AUTH_STATE_KEY, CLIENT_ID_KEY, CODE_VERIFIER_KEY, CREDENTIALS_KEY,
    CredentialStore, REDIRECT_URI_KEY,
};
pub use store::{FileStore, MemoryStore, SessionStore, StoreError};
