//! Payment domain model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::caller::Caller;
use super::ids::{CustomerId, OrderId, PaymentId, TransactionId};
use super::order::OrderStatus;
use crate::error::DomainError;

/// Non-negative monetary amount in the smallest currency unit (cents, paise, ...).
///
/// Currency-agnostic: the checkout currency is configured on the provider adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from minor units.
    pub fn from_minor(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount(amount));
        }
        Ok(Self(amount))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in smallest currency unit.
    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_minor(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Lifecycle status of a payment.
///
/// ```text
/// pending ──► successful ──► refunded
///    │
///    └──────► failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Whether `self -> next` is an allowed lifecycle transition.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Successful)
                | (Self::Pending, Self::Failed)
                | (Self::Successful, Self::Refunded)
        )
    }

    /// Validates a transition and returns the new status.
    pub fn transition_to(&self, next: PaymentStatus) -> Result<PaymentStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }

    /// Order-level status the order system should hold for this payment status.
    ///
    /// `Pending` has no order-level counterpart.
    pub fn order_status(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => None,
            Self::Successful => Some(OrderStatus::Paid),
            Self::Failed => Some(OrderStatus::PaymentFailed),
            Self::Refunded => Some(OrderStatus::Refunded),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Payment status as reported by the checkout provider.
///
/// Only `succeeded` counts as a successful payment; every other value is
/// treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Succeeded,
    Unsuccessful(String),
}

impl ProviderOutcome {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("succeeded") {
            Self::Succeeded
        } else {
            Self::Unsuccessful(raw.to_string())
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            Self::Succeeded => PaymentStatus::Successful,
            Self::Unsuccessful(_) => PaymentStatus::Failed,
        }
    }
}

/// A recorded payment for a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Order this payment settles (one payment per order)
    pub order_id: OrderId,
    /// Paying customer
    pub customer_id: CustomerId,
    /// Provider-assigned correlation key (unique)
    pub transaction_id: TransactionId,
    pub amount: Amount,
    pub status: PaymentStatus,
    /// When the payment was recorded
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Records a new payment from a provider outcome.
    pub fn record(
        order_id: OrderId,
        customer_id: CustomerId,
        transaction_id: TransactionId,
        amount: Amount,
        outcome: &ProviderOutcome,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            customer_id,
            transaction_id,
            amount,
            status: outcome.payment_status(),
            // Microseconds, the precision Postgres keeps.
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// Reconstructs a payment from database fields.
    pub fn from_parts(
        id: PaymentId,
        order_id: OrderId,
        customer_id: CustomerId,
        transaction_id: TransactionId,
        amount: Amount,
        status: PaymentStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id,
            customer_id,
            transaction_id,
            amount,
            status,
            created_at,
        }
    }

    /// Whether `caller` may read this payment: the admin identity or the
    /// paying customer, compared exactly.
    pub fn is_visible_to(&self, caller: &Caller, admin_identity: &str) -> bool {
        caller.is(admin_identity) || caller.is(&self.customer_id.to_string())
    }
}
