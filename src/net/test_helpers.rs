//! Scripted transport and recording capabilities shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::api::ApiClient;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::ClientError;
use crate::state::auth::SessionContext;
use crate::state::token::MemoryTokenStore;
use crate::ui::{Notifier, RecordingNavigator};

pub const BASE_URL: &str = "http://api.test";

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// Replays canned responses in order and records every request it sees.
/// Runs out of script -> transport failure.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.push(Scripted::Respond(HttpResponse { status, body: body.to_string() }));
        self
    }

    pub fn respond_raw(self, status: u16, body: &str) -> Self {
        self.push(Scripted::Respond(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Scripted::Fail(message.to_owned()));
        self
    }

    fn push(&self, step: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let step = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match step {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ClientError::Transport(message)),
            None => Err(ClientError::Transport("no scripted response".to_owned())),
        }
    }
}

/// Notifier that keeps every message it is shown.
#[derive(Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }

    fn success(&self, message: &str) {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

/// Everything a test needs to drive and observe an `ApiClient`.
pub struct Harness {
    pub api: ApiClient,
    pub session: Arc<SessionContext>,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

/// Build a harness whose token slot starts with `token`.
pub fn harness(token: Option<&str>, transport: MockTransport) -> Harness {
    let store = token.map_or_else(MemoryTokenStore::new, |t| MemoryTokenStore::with_token(t));
    let session = Arc::new(SessionContext::new(Arc::new(store)));
    let transport = Arc::new(transport);
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::new());
    let api = ApiClient::with_transport(BASE_URL, session.clone(), transport.clone())
        .with_notifier(notifier.clone())
        .with_navigator(navigator.clone());
    Harness { api, session, transport, notifier, navigator }
}

/// Header value as a string, if present.
pub fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
