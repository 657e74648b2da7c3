//! Per-request execution context
//!
//! Carries the request deadline and correlation ID from the transport into
//! the service. Work run through [`RequestContext::run`] is dropped when the
//! deadline passes; dropping the handler future (client went away) aborts it
//! as well.

use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tonic::Request;

use crate::error::{AuthError, Result};

/// Deadline header set by gRPC clients (`Request::set_timeout`)
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Correlation ID metadata key
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Correlation ID stored in request extensions by the server interceptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    correlation_id: Option<String>,
}

impl RequestContext {
    /// Context with no deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            correlation_id: None,
        }
    }

    /// Build from an incoming request
    ///
    /// The deadline is the earlier of the client's `grpc-timeout` and
    /// `max_timeout` from now.
    pub fn from_request<T>(request: &Request<T>, max_timeout: Duration) -> Self {
        let now = Instant::now();
        let server_cap = now.checked_add(max_timeout);
        let client_deadline = request
            .metadata()
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout)
            .and_then(|timeout| now.checked_add(timeout));

        let deadline = match (server_cap, client_deadline) {
            (Some(cap), Some(client)) => Some(cap.min(client)),
            (cap, client) => cap.or(client),
        };

        let correlation_id = request
            .extensions()
            .get::<CorrelationId>()
            .map(|id| id.0.clone());

        Self {
            deadline,
            correlation_id,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Drive `fut` to completion unless the deadline passes first
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        match self.deadline {
            Some(deadline) => timeout_at(deadline, fut)
                .await
                .map_err(|_| AuthError::DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}

/// Parse a `grpc-timeout` value: up to 8 digits followed by a unit
/// (`H`, `M`, `S`, `m`, `u`, `n`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if !value.is_ascii() || value.len() < 2 {
        return None;
    }

    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}
