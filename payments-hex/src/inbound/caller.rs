//! Caller identity and request deadline extraction.
//!
//! The service does not authenticate callers itself: the upstream gateway
//! asserts the identity in `X-Caller-Id`, and the orchestrator authorizes
//! lookups against it.

use std::time::Duration;

use axum::http::HeaderMap;

use payments_types::{CallContext, Caller};

/// Header carrying the caller's asserted identity.
pub const CALLER_HEADER: &str = "X-Caller-Id";

/// Header carrying the caller's time budget in milliseconds.
pub const TIMEOUT_HEADER: &str = "X-Request-Timeout-Ms";

/// Rate-limit key used when no identity is asserted.
pub const ANONYMOUS: &str = "anonymous";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The asserted caller; anonymous when the header is missing or unreadable.
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    Caller::new(header_str(headers, CALLER_HEADER).unwrap_or_default())
}

/// Key the rate limiter buckets requests by.
pub fn rate_limit_key(headers: &HeaderMap) -> String {
    match header_str(headers, CALLER_HEADER).map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

/// Request context with the caller's budget, or `default` when the header is
/// absent, unparseable or zero.
pub fn context_from_headers(headers: &HeaderMap, default: Duration) -> CallContext {
    let budget = header_str(headers, TIMEOUT_HEADER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(default);
    CallContext::with_timeout(budget)
}
