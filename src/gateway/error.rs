// src/gateway/error.rs
//! Error taxonomy shared by every upstream gateway.
//!
//! Upstream failures arrive as an optional HTTP status plus an optional
//! transport code. [`classify`] turns that pair into exactly one
//! [`ErrorKind`]; [`GatewayError::from_failure`] is the single place where a
//! failed call is logged and counted.

use std::fmt;

use metrics::counter;
use serde::Serialize;

/// Stable local classification of a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Local validation failure; never reaches the network.
    BadRequest,
    Unauthorized,
    NotFound,
    RateLimited,
    UpstreamUnavailable,
    Timeout,
    BadUpstreamResponse,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::BadUpstreamResponse => "BAD_UPSTREAM_RESPONSE",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }

    /// Status code exposed at the local HTTP boundary.
    /// Clients key their retry policy off the status class, so keep this stable.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::RateLimited => 429,
            ErrorKind::Timeout => 504,
            ErrorKind::UpstreamUnavailable
            | ErrorKind::BadUpstreamResponse
            | ErrorKind::Unknown => 502,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure code reported by a [`Transport`](super::transport::Transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransportCode {
    /// The fixed per-call timer expired.
    #[serde(rename = "ETIMEDOUT")]
    TimedOut,
    /// Connection dropped while the response was in flight.
    #[serde(rename = "ECONNABORTED")]
    ConnectionAborted,
    #[serde(rename = "ECONNREFUSED")]
    ConnectionRefused,
    /// A response arrived but its body is empty or not the expected JSON.
    #[serde(rename = "EBADBODY")]
    InvalidBody,
    #[serde(rename = "EUNKNOWN")]
    Other,
}

impl TransportCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportCode::TimedOut => "ETIMEDOUT",
            TransportCode::ConnectionAborted => "ECONNABORTED",
            TransportCode::ConnectionRefused => "ECONNREFUSED",
            TransportCode::InvalidBody => "EBADBODY",
            TransportCode::Other => "EUNKNOWN",
        }
    }
}

impl fmt::Display for TransportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map (status, transport code) to a kind. Status rules take precedence over
/// transport codes; anything unmatched is `Unknown`.
pub fn classify(status: Option<u16>, code: Option<TransportCode>) -> ErrorKind {
    match status {
        Some(401) | Some(403) => return ErrorKind::Unauthorized,
        Some(404) => return ErrorKind::NotFound,
        Some(429) => return ErrorKind::RateLimited,
        Some(s) if s >= 500 => return ErrorKind::UpstreamUnavailable,
        _ => {}
    }
    match code {
        Some(TransportCode::TimedOut) | Some(TransportCode::ConnectionAborted) => {
            ErrorKind::Timeout
        }
        Some(TransportCode::InvalidBody) => ErrorKind::BadUpstreamResponse,
        _ => ErrorKind::Unknown,
    }
}

/// Typed error returned by every gateway operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    pub upstream_status: Option<u16>,
    pub transport_code: Option<TransportCode>,
}

impl GatewayError {
    /// Validation failure raised before any network call.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BadRequest,
            message: message.into(),
            upstream_status: None,
            transport_code: None,
        }
    }

    /// Classify an upstream failure, log it once and count it.
    pub fn from_failure(
        gateway: &'static str,
        op: &'static str,
        status: Option<u16>,
        code: Option<TransportCode>,
        message: impl Into<String>,
    ) -> Self {
        let kind = classify(status, code);
        let message = message.into();

        tracing::warn!(
            target: "gateway",
            gateway,
            op,
            kind = kind.as_str(),
            status = ?status,
            code = ?code,
            detail = %message,
            "upstream call failed"
        );
        counter!("gateway_errors_total", "gateway" => gateway, "kind" => kind.as_str())
            .increment(1);

        Self {
            kind,
            message,
            upstream_status: status,
            transport_code: code,
        }
    }
}
