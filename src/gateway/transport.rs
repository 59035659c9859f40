// src/gateway/transport.rs
//! Transport Invoker: exactly one outbound call per invocation, bounded by a
//! fixed timeout. No retries happen at this layer or above it.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::TransportCode;
use super::request::RequestSpec;

/// Status + raw body of a completed HTTP exchange (any status).
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The call never produced a usable response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub code: TransportCode,
    pub status: Option<u16>,
    pub message: String,
}

impl TransportFailure {
    pub fn new(code: TransportCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        base_url: &str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<RawResponse, TransportFailure>;

    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// reqwest-backed transport
// ------------------------------------------------------------

/// Production transport sharing one pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(Duration::from_secs(4))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn code_for(err: &reqwest::Error) -> TransportCode {
    if err.is_timeout() {
        TransportCode::TimedOut
    } else if err.is_connect() {
        TransportCode::ConnectionRefused
    } else if err.is_body() || err.is_decode() {
        TransportCode::ConnectionAborted
    } else {
        TransportCode::Other
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        base_url: &str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<RawResponse, TransportFailure> {
        let mut req = self
            .client
            .request(spec.method.clone(), spec.url(base_url))
            .timeout(timeout);
        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }
        if let Some(auth) = &spec.auth_header {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(body) = &spec.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| TransportFailure {
            code: code_for(&e),
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| TransportFailure {
            code: code_for(&e),
            status: Some(status),
            message: e.to_string(),
        })?;

        Ok(RawResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// ------------------------------------------------------------
// Scripted transport (tests / local runs)
// ------------------------------------------------------------

/// One call as seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub url: String,
    pub spec: RequestSpec,
    pub timeout: Duration,
}

/// Replays queued outcomes in order and records every call it receives.
/// An exhausted script answers with a `EUNKNOWN` failure.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(RawResponse::new(status, body)))
    }

    pub fn fail(self, code: TransportCode) -> Self {
        self.push(Err(TransportFailure::new(code, format!("scripted {code}"))))
    }

    fn push(self, outcome: Result<RawResponse, TransportFailure>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        base_url: &str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<RawResponse, TransportFailure> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(RecordedCall {
                url: spec.url(base_url),
                spec: spec.clone(),
                timeout,
            });
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportFailure::new(
                    TransportCode::Other,
                    "no scripted response left",
                ))
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_transport_replays_in_order_and_records() {
        let t = ScriptedTransport::new()
            .respond(200, "{}")
            .fail(TransportCode::TimedOut);
        let spec = RequestSpec::get("/x").param("limit", 3);

        let first = t
            .send("http://up", &spec, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(first.status, 200);

        let second = t
            .send("http://up", &spec, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(second.code, TransportCode::TimedOut);

        let third = t
            .send("http://up", &spec, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(third.code, TransportCode::Other);

        let calls = t.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].url, "http://up/x");
        assert_eq!(calls[0].spec.query.get("limit").map(String::as_str), Some("3"));
    }
}
