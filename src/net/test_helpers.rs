//! Scripted transport and wiring shared by gateway, api and guard tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;

use super::error::TransportError;
use super::gateway::ApiGateway;
use super::transport::{Transport, TransportRequest, TransportResponse};
use crate::config::GatewayConfig;
use crate::nav::{Location, Navigator};
use crate::session::{MemoryStorage, SessionStore};

pub(crate) enum MockReply {
    Respond(TransportResponse),
    Fail(String),
    /// Wait for the test to release a response.
    Gated(oneshot::Receiver<TransportResponse>),
}

#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, reply: MockReply) {
        self.replies.lock().expect("mock mutex should lock").push_back(reply);
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.push(MockReply::Respond(json_response(status, &body)));
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("mock mutex should lock").clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().expect("mock mutex should lock").len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("mock mutex should lock").push(request);
        let reply = self.replies.lock().expect("mock mutex should lock").pop_front();
        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(message)) => Err(TransportError::Request(message)),
            Some(MockReply::Gated(rx)) => rx
                .await
                .map_err(|_| TransportError::Request("gate dropped".into())),
            None => Err(TransportError::Request("no mock reply queued".into())),
        }
    }
}

pub(crate) fn json_response(status: u16, body: &Value) -> TransportResponse {
    TransportResponse { status, body: body.to_string().into_bytes() }
}

/// Gateway plus everything it depends on, wired over in-memory storage.
pub(crate) struct TestContext {
    pub storage: MemoryStorage,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub transport: Arc<MockTransport>,
    pub gateway: Arc<ApiGateway>,
}

pub(crate) fn test_context(path: &str) -> TestContext {
    let storage = MemoryStorage::new();
    let session = Arc::new(SessionStore::rehydrate(Arc::new(storage.clone())));
    let config = GatewayConfig::default();
    let navigator = Arc::new(Navigator::new(config.routes.clone(), Location::new("acme.example.test", path)));
    let transport = Arc::new(MockTransport::new());
    let gateway = Arc::new(ApiGateway::new(
        config,
        Arc::clone(&session),
        Arc::clone(&navigator),
        Arc::clone(&transport) as Arc<dyn Transport>,
    ));
    TestContext { storage, session, navigator, transport, gateway }
}
