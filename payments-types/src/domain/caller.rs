//! Caller identity and per-request call context.

use std::time::{Duration, Instant};

/// Identity asserted by the caller of an inbound request.
///
/// Either a customer id or an internal/admin identity. The service trusts the
/// assertion; authorization compares it against the resource owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller(String);

impl Caller {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, case-sensitive identity match. An anonymous caller matches nothing.
    pub fn is(&self, identity: &str) -> bool {
        !self.is_anonymous() && self.0 == identity
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_anonymous() {
            f.write_str("<anonymous>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Request-scoped context propagated to every outbound dependency call.
///
/// Carries the caller-supplied deadline. Cancellation is structural: dropping
/// the request future drops any in-flight outbound call with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context without a deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Time left before the deadline; `Some(ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_exact_match() {
        let caller = Caller::new("admin");
        assert!(caller.is("admin"));
        assert!(!caller.is("Admin"));
        assert!(!Caller::new(" admin ").is("admin"));
        assert_eq!(Caller::new(" admin ").as_str(), " admin ");
    }

    #[test]
    fn test_anonymous_caller_matches_nothing() {
        let caller = Caller::new("");
        assert!(caller.is_anonymous());
        assert!(!caller.is(""));
        assert_eq!(caller.to_string(), "<anonymous>");
    }

    #[test]
    fn test_background_context_has_no_deadline() {
        let ctx = CallContext::background();
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_expired());
    }

    #[test]
    fn test_timeout_context_counts_down() {
        let ctx = CallContext::with_timeout(Duration::from_secs(60));
        let left = ctx.remaining().unwrap();
        assert!(left <= Duration::from_secs(60));
        assert!(left > Duration::from_secs(50));
        assert!(!ctx.is_expired());
    }

    #[test]
    fn test_past_deadline_is_expired() {
        let ctx = CallContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }
}
