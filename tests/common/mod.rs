#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use spotlite::{
    Error, Result,
    config::Settings,
    management::{Clock, CredentialStore, MemoryStore},
    spotify::{
        SpotifyClient,
        gateway::Gateway,
        navigator::Navigator,
        transport::{HttpRequest, HttpResponse, Transport},
    },
    types::Credentials,
};

pub const NOW: i64 = 1_700_000_000_000;
pub const CLIENT_ID: &str = "test-client";
pub const TOKEN_URL: &str = "https://accounts.test/api/token";
pub const API_URL: &str = "https://api.test/v1";

pub fn settings() -> Settings {
    Settings {
        api_url: API_URL.to_string(),
        auth_url: "https://accounts.test/authorize".to_string(),
        token_url: TOKEN_URL.to_string(),
        max_retry_delay: Duration::from_millis(5),
        ..Settings::default()
    }
}

pub fn credentials(expires_at: i64) -> Credentials {
    Credentials {
        client_id: CLIENT_ID.to_string(),
        access_token: "stored-access".to_string(),
        refresh_token: "stored-refresh".to_string(),
        expires_at,
        scope: "user-library-read".to_string(),
    }
}

/// Answers requests from a queue and records what was sent.
///
/// An exhausted queue answers with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<HttpResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse {
            status,
            retry_after: None,
            body: body.to_string(),
        }));
    }

    pub fn push_status(&self, status: u16) {
        self.push(Ok(HttpResponse {
            status,
            retry_after: None,
            body: String::new(),
        }));
    }

    pub fn push_error(&self, message: &str) {
        self.push(Err(Error::Transport(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("no scripted response".to_string())))
    }
}

pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    opened: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, url: &str) -> std::result::Result<(), String> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Fails every request with the same error.
pub struct FailingGateway {
    error: Error,
    calls: AtomicUsize,
}

impl FailingGateway {
    pub fn new(error: Error) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for FailingGateway {
    async fn request(&self, _path: &str, _method: Method, _body: Option<Value>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// A client wired to in-memory fakes, with handles on all of them.
pub struct Harness {
    pub client: SpotifyClient,
    pub backend: Arc<MemoryStore>,
    pub store: CredentialStore,
    pub transport: Arc<ScriptedTransport>,
    pub clock: Arc<FixedClock>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let backend = Arc::new(MemoryStore::new());
        let transport = Arc::new(ScriptedTransport::new());
        let clock = Arc::new(FixedClock::new(NOW));
        let navigator = Arc::new(RecordingNavigator::default());
        let client = SpotifyClient::new(
            settings,
            backend.clone(),
            transport.clone(),
            clock.clone(),
            navigator.clone(),
        );

        Self {
            client,
            store: CredentialStore::new(backend.clone()),
            backend,
            transport,
            clock,
            navigator,
        }
    }

    /// Stores credentials that stay valid for an hour.
    pub fn logged_in(self) -> Self {
        self.store
            .save(&credentials(NOW + 3_600_000))
            .expect("seed credentials");
        self
    }
}
