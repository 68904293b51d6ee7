// Shared test helper: a throwaway HTTP endpoint standing in for the remote
// recommendation service (or the persistence backend).

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the endpoint saw on its last call
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone)]
pub struct MockEndpoint {
    pub url: String,
    status: u16,
    reply: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Captured>>>,
}

impl MockEndpoint {
    /// Serve `reply` with `status` on every path, after `delay`
    pub async fn start(status: u16, reply: &str, delay: Duration) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock endpoint");
        let addr = listener.local_addr().expect("mock endpoint address");

        let mock = MockEndpoint {
            url: format!("http://{}", addr),
            status,
            reply: reply.to_string(),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
            last: Arc::new(Mutex::new(None)),
        };

        let app = Router::new().fallback(handle).with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock endpoint server");
        });

        mock
    }

    pub async fn json(reply: Value) -> Self {
        Self::start(200, &reply.to_string(), Duration::ZERO).await
    }

    pub fn recommend_url(&self) -> String {
        format!("{}/recommend", self.url)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Captured> {
        self.last.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Value {
        self.last().and_then(|c| c.body).expect("no request body captured")
    }
}

async fn handle(
    State(mock): State<MockEndpoint>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    *mock.last.lock().unwrap() = Some(Captured {
        method,
        uri,
        headers,
        body: serde_json::from_slice(&body).ok(),
    });

    tokio::time::sleep(mock.delay).await;
    (StatusCode::from_u16(mock.status).unwrap(), mock.reply.clone())
}
