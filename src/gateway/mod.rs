// src/gateway/mod.rs
//! Upstream Gateway pattern: Request Builder → Transport Invoker →
//! (Normalizer | Error Mapper). The pieces live in the submodules; [`Upstream`]
//! wires one call through them.

pub mod error;
pub mod request;
pub mod transport;

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::de::DeserializeOwned;

pub use error::{classify, ErrorKind, GatewayError, TransportCode};
pub use request::{RequestSpec, MAX_LIMIT};
pub use transport::{HttpTransport, RawResponse, ScriptedTransport, Transport, TransportFailure};

/// One upstream endpoint: a base URL plus the transport used to reach it.
/// Holds no mutable state; safe to share across concurrent calls.
#[derive(Clone)]
pub struct Upstream {
    name: &'static str,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Upstream {
    pub fn new(name: &'static str, base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            name,
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue exactly one call. Non-2xx statuses and transport failures come
    /// back as a classified [`GatewayError`]; a 2xx returns the raw body.
    pub async fn call(
        &self,
        op: &'static str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<RawResponse, GatewayError> {
        let outcome = self.exchange(op, spec, timeout).await;
        self.settle(op, outcome)
    }

    /// Single-entity variant of [`call_json`](Self::call_json): an upstream
    /// 404 is `Ok(None)`, logged at debug and not counted as an error.
    pub async fn lookup_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<Option<T>, GatewayError> {
        match self.exchange(op, spec, timeout).await {
            Ok(resp) if resp.status == 404 => {
                tracing::debug!(target: "gateway", gateway = self.name, op, "upstream has no such entity");
                Ok(None)
            }
            outcome => {
                let resp = self.settle(op, outcome)?;
                self.decode(op, &resp).map(Some)
            }
        }
    }

    async fn exchange(
        &self,
        op: &'static str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<RawResponse, TransportFailure> {
        counter!("gateway_requests_total", "gateway" => self.name, "op" => op).increment(1);
        if spec.auth_header.is_none() {
            tracing::debug!(target: "gateway", gateway = self.name, op, "calling upstream without api key");
        }

        let t0 = Instant::now();
        let outcome = self.transport.send(&self.base_url, spec, timeout).await;
        histogram!("gateway_upstream_ms", "gateway" => self.name)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        outcome
    }

    fn settle(
        &self,
        op: &'static str,
        outcome: Result<RawResponse, TransportFailure>,
    ) -> Result<RawResponse, GatewayError> {
        match outcome {
            Ok(resp) if resp.is_success() => {
                tracing::debug!(
                    target: "gateway",
                    gateway = self.name,
                    op,
                    transport = self.transport.name(),
                    status = resp.status,
                    bytes = resp.body.len(),
                    "upstream ok"
                );
                Ok(resp)
            }
            Ok(resp) => Err(GatewayError::from_failure(
                self.name,
                op,
                Some(resp.status),
                None,
                failure_message(&resp),
            )),
            Err(f) => Err(GatewayError::from_failure(
                self.name,
                op,
                f.status,
                Some(f.code),
                f.message,
            )),
        }
    }

    /// [`call`](Self::call) and decode the 2xx body as `T`. An empty or
    /// undecodable body is a `BadUpstreamResponse`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let resp = self.call(op, spec, timeout).await?;
        self.decode(op, &resp)
    }

    pub fn decode<T: DeserializeOwned>(
        &self,
        op: &'static str,
        resp: &RawResponse,
    ) -> Result<T, GatewayError> {
        if resp.body.trim().is_empty() {
            return Err(GatewayError::from_failure(
                self.name,
                op,
                Some(resp.status),
                Some(TransportCode::InvalidBody),
                "empty response body",
            ));
        }
        serde_json::from_str(&resp.body).map_err(|e| {
            GatewayError::from_failure(
                self.name,
                op,
                Some(resp.status),
                Some(TransportCode::InvalidBody),
                format!("undecodable response body: {e}"),
            )
        })
    }
}

/// Short message for a non-2xx response: the body (capped) or the status.
fn failure_message(resp: &RawResponse) -> String {
    let body = resp.body.trim();
    if body.is_empty() {
        return format!("upstream returned HTTP {}", resp.status);
    }
    let capped: String = body.chars().take(300).collect();
    format!("upstream returned HTTP {}: {capped}", resp.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(t: ScriptedTransport) -> Upstream {
        Upstream::new("test", "http://up", Arc::new(t))
    }

    #[tokio::test]
    async fn non_success_status_is_classified() {
        let up = upstream(ScriptedTransport::new().respond(503, "maintenance"));
        let err = up
            .call("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamUnavailable);
        assert_eq!(err.upstream_status, Some(503));
        assert!(err.message.contains("maintenance"));
    }

    #[tokio::test]
    async fn empty_body_is_bad_upstream_response() {
        let up = upstream(ScriptedTransport::new().respond(200, "  "));
        let err = up
            .call_json::<serde_json::Value>("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadUpstreamResponse);
    }

    #[tokio::test]
    async fn garbage_body_is_bad_upstream_response() {
        let up = upstream(ScriptedTransport::new().respond(200, "<html>oops</html>"));
        let err = up
            .call_json::<serde_json::Value>("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadUpstreamResponse);
        assert_eq!(err.transport_code, Some(TransportCode::InvalidBody));
    }

    #[tokio::test]
    async fn timeout_code_maps_to_timeout() {
        let up = upstream(ScriptedTransport::new().fail(TransportCode::TimedOut));
        let err = up
            .call("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn lookup_recovers_404_only() {
        let up = upstream(ScriptedTransport::new().respond(404, "").respond(500, ""));
        let got: Option<serde_json::Value> = up
            .lookup_json("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(got.is_none());

        let err = up
            .lookup_json::<serde_json::Value>("op", &RequestSpec::get("/x"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamUnavailable);
    }
}
