//! Shared request plumbing for the outbound adapters.

use std::time::Duration;

use payments_types::{CallContext, GatewayError};
use reqwest::StatusCode;

/// Timeout for one outbound request: the adapter default, capped by the
/// time left on the caller's deadline.
pub(crate) fn bounded_timeout(ctx: &CallContext, default: Duration) -> Duration {
    match ctx.remaining() {
        Some(left) => left.min(default),
        None => default,
    }
}

/// Maps a transport failure (no HTTP response) from `service`.
pub(crate) fn send_error(service: &str, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(service.to_string())
    } else {
        GatewayError::Unavailable(format!("{}: {}", service, err))
    }
}

/// Maps a non-success HTTP status from `service`.
///
/// 404 means the addressed entity is missing; 429 and 5xx are transient;
/// every other status is a rejection of the request itself.
pub(crate) fn status_error(
    service: &str,
    entity: impl FnOnce() -> String,
    status: StatusCode,
    message: String,
) -> GatewayError {
    if status == StatusCode::NOT_FOUND {
        GatewayError::NotFound(entity())
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        GatewayError::Unavailable(format!("{} returned {}", service, status))
    } else {
        GatewayError::Rejected(format!("{} returned {}: {}", service, status, message))
    }
}
