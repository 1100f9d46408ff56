//! Repository port trait.
//!
//! Keyed persistence for payment records. Adapters (Postgres, SQLite,
//! in-memory test doubles) implement this trait; it carries no business rules.

use crate::domain::{OrderId, Payment, PaymentId, PaymentStatus, TransactionId};
use crate::error::RepoError;

/// Persistence port for payments.
///
/// Implementations MUST enforce uniqueness of `id`, `order_id` and
/// `transaction_id` at the storage level; that constraint is what makes
/// concurrent recordings of the same key safe.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Inserts a new payment.
    ///
    /// Returns `RepoError::Conflict` naming the violated key when a payment with
    /// the same id, order id or transaction id already exists.
    async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, RepoError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Payment>, RepoError>;

    /// Sets the status of the payment for `order_id`.
    ///
    /// Returns `RepoError::NotFound` when no row was affected.
    async fn update_status_by_order_id(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<(), RepoError>;
}
