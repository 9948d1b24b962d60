//! Error taxonomy for the client.
//!
//! Every layer below the catalog surface reports one of these kinds to its
//! direct caller. The catalog surface recovers the transient kinds
//! ([`Error::is_recoverable`]) by substituting fallback data; everything
//! else reaches the host so it can tell the user what to do next.

use thiserror::Error;

/// Standard result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed client setup. The user can correct it.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The echoed `state` did not match the one issued at login.
    #[error("authorization state mismatch, possible forged callback")]
    StateMismatch,

    /// The authorization server redirected back with an `error` parameter.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// No usable access token. The user has to log in (again).
    #[error("not authenticated, please run `spotlite login`")]
    Unauthenticated,

    #[error("Spotify API responded with status {0}")]
    Upstream(u16),

    /// DNS failure, timeout, connection refused and friends.
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether the catalog surface may hide this error behind fallback data.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Upstream(_) | Error::Transport(_) | Error::Decode(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
