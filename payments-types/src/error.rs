//! Error types for the payment service.
//!
//! Lower layers have their own enums (`DomainError`, `RepoError`,
//! `GatewayError`); all of them convert into the closed `AppError` taxonomy
//! before crossing the application service boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{OrderId, PaymentStatus};

/// Key/value context attached to an application error.
pub type ErrorDetails = BTreeMap<String, String>;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(i64),

    #[error("Transaction id cannot be empty")]
    EmptyTransactionId,

    #[error("Order {0} has no items")]
    EmptyOrder(OrderId),

    #[error("Invalid line item {index} ({name}): {reason}")]
    InvalidLineItem {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),
}

/// Unique key of the payments table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Id,
    OrderId,
    TransactionId,
    Unknown,
}

impl UniqueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::OrderId => "order_id",
            Self::TransactionId => "transaction_id",
            Self::Unknown => "unknown",
        }
    }

    /// Best-effort classification from a constraint name or driver message.
    pub fn from_constraint_hint(hint: &str) -> Self {
        if hint.contains("transaction_id") {
            Self::TransactionId
        } else if hint.contains("order_id") {
            Self::OrderId
        } else if hint.contains("pkey") || hint.contains("payments.id") {
            Self::Id
        } else {
            Self::Unknown
        }
    }

    /// Conflict message shared by the pre-check and the store constraint.
    pub fn conflict_message(&self) -> &'static str {
        match self {
            Self::TransactionId => "payment already recorded for this transaction",
            Self::OrderId => "payment already recorded for this order",
            Self::Id | Self::Unknown => "payment already exists",
        }
    }
}

impl std::fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violated on {0}")]
    Conflict(UniqueKey),
}

/// Failures of an outbound collaborator (order system, checkout provider).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

/// Error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    Dependency,
    Internal,
}

impl ErrorKind {
    /// What a caller should do about a failure of this kind.
    pub fn retry_advice(&self) -> RetryAdvice {
        match self {
            Self::Validation | Self::Conflict => RetryAdvice::FixInput,
            Self::Dependency => RetryAdvice::RetryDownstream,
            Self::Authorization | Self::NotFound | Self::Internal => RetryAdvice::DoNotRetry,
        }
    }
}

/// Retry guidance attached to every failure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RetryAdvice {
    /// Fix the input; retrying verbatim fails the same way.
    FixInput,
    /// A downstream step failed; retry that step (local writes may have succeeded).
    RetryDownstream,
    DoNotRetry,
}

/// Application-level errors.
///
/// Closed set of kinds, each with a human message and a detail map.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: ErrorDetails,
    },

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        details: ErrorDetails,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: ErrorDetails,
    },

    #[error("Access denied: {message}")]
    Authorization {
        message: String,
        details: ErrorDetails,
    },

    #[error("Dependency failure: {message}")]
    Dependency {
        message: String,
        details: ErrorDetails,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        details: ErrorDetails,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    /// Adds a detail entry, replacing any previous value for `key`.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details_mut().insert(key.into(), value.to_string());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Dependency { .. } => ErrorKind::Dependency,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Authorization { message, .. }
            | Self::Dependency { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::Authorization { details, .. }
            | Self::Dependency { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        match self {
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::Authorization { details, .. }
            | Self::Dependency { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    pub fn retry_advice(&self) -> RetryAdvice {
        self.kind().retry_advice()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidTransition { from, to } => AppError::conflict(format!(
                "payment cannot move from {} to {}",
                from, to
            ))
            .with_detail("current_status", from)
            .with_detail("requested_status", to),
            DomainError::InvalidLineItem {
                index,
                ref name,
                ref reason,
            } => AppError::validation(reason.clone())
                .with_detail("item_index", index)
                .with_detail("item_name", name),
            DomainError::EmptyOrder(order_id) => {
                AppError::validation("order has no items").with_detail("order_id", order_id)
            }
            e => AppError::validation(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::not_found("payment not found"),
            RepoError::Conflict(key) => {
                AppError::conflict(key.conflict_message()).with_detail("key", key)
            }
            RepoError::Database(e) => AppError::internal(e),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => AppError::not_found(format!("{} not found", what)),
            GatewayError::Rejected(msg) => {
                AppError::dependency(msg).with_detail("cause", "rejected")
            }
            GatewayError::Unavailable(msg) => {
                AppError::dependency(msg).with_detail("cause", "unavailable")
            }
            GatewayError::Timeout(msg) => {
                AppError::dependency(msg).with_detail("cause", "timeout")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_advice_per_kind() {
        assert_eq!(
            AppError::validation("x").retry_advice(),
            RetryAdvice::FixInput
        );
        assert_eq!(AppError::conflict("x").retry_advice(), RetryAdvice::FixInput);
        assert_eq!(
            AppError::dependency("x").retry_advice(),
            RetryAdvice::RetryDownstream
        );
        assert_eq!(
            AppError::authorization("x").retry_advice(),
            RetryAdvice::DoNotRetry
        );
        assert_eq!(
            AppError::not_found("x").retry_advice(),
            RetryAdvice::DoNotRetry
        );
    }

    #[test]
    fn test_with_detail_accumulates() {
        let err = AppError::dependency("order system down")
            .with_detail("order_id", "o-1")
            .with_detail("payment_status", PaymentStatus::Refunded);

        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(err.message(), "order system down");
        assert_eq!(err.details().get("order_id").unwrap(), "o-1");
        assert_eq!(err.details().get("payment_status").unwrap(), "refunded");
    }

    #[test]
    fn test_repo_conflict_maps_to_descriptive_conflict() {
        let err: AppError = RepoError::Conflict(UniqueKey::TransactionId).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.message(),
            "payment already recorded for this transaction"
        );
        assert_eq!(err.details().get("key").unwrap(), "transaction_id");
    }

    #[test]
    fn test_repo_database_error_is_internal() {
        let err: AppError = RepoError::Database("disk full".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_gateway_errors_map_to_dependency_or_not_found() {
        let err: AppError = GatewayError::Timeout("order service".into()).into();
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(err.details().get("cause").unwrap(), "timeout");

        let err: AppError = GatewayError::NotFound("order".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        let err: AppError = DomainError::InvalidTransition {
            from: PaymentStatus::Pending,
            to: PaymentStatus::Refunded,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.details().get("current_status").unwrap(), "pending");
    }

    #[test]
    fn test_unique_key_from_constraint_hint() {
        assert_eq!(
            UniqueKey::from_constraint_hint("payments_transaction_id_key"),
            UniqueKey::TransactionId
        );
        assert_eq!(
            UniqueKey::from_constraint_hint("UNIQUE constraint failed: payments.order_id"),
            UniqueKey::OrderId
        );
        assert_eq!(
            UniqueKey::from_constraint_hint("payments_pkey"),
            UniqueKey::Id
        );
        assert_eq!(UniqueKey::from_constraint_hint("???"), UniqueKey::Unknown);
    }
}
