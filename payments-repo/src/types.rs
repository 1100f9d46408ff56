//! Database row types and error mapping shared by the SQLite and PostgreSQL adapters.

use sqlx::FromRow;

use payments_types::{
    Amount, CustomerId, OrderId, Payment, PaymentId, PaymentStatus, RepoError, TransactionId,
    UniqueKey,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a driver error, turning unique violations into `RepoError::Conflict`.
///
/// PostgreSQL reports the constraint name; SQLite only reports
/// `UNIQUE constraint failed: payments.<column>` in the message.
pub fn map_write_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let hint = db
                .constraint()
                .map(str::to_owned)
                .unwrap_or_else(|| db.message().to_owned());
            return RepoError::Conflict(UniqueKey::from_constraint_hint(&hint));
        }
    }
    RepoError::Database(err.to_string())
}

pub fn db_err(err: sqlx::Error) -> RepoError {
    RepoError::Database(err.to_string())
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("corrupt {} column: {}", column, err))
}

fn status_from_db(raw: &str) -> Result<PaymentStatus, RepoError> {
    PaymentStatus::try_from(raw).map_err(|e| corrupt("status", e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Payment row from PostgreSQL (native uuid / timestamptz columns).
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct DbPayment {
    pub id: uuid::Uuid,
    pub order_id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub transaction_id: String,
    pub amount: i64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl DbPayment {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        Ok(Payment::from_parts(
            PaymentId::from_uuid(self.id),
            OrderId::from_uuid(self.order_id),
            CustomerId::from_uuid(self.customer_id),
            TransactionId::new(self.transaction_id).map_err(|e| corrupt("transaction_id", e))?,
            Amount::from_minor(self.amount).map_err(|e| corrupt("amount", e))?,
            status_from_db(&self.status)?,
            self.created_at,
        ))
    }
}

/// Payment row from SQLite (everything stored as TEXT except the amount).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct DbPaymentText {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub transaction_id: String,
    pub amount: i64,
    pub status: String,
    pub created_at: String,
}

#[cfg(feature = "sqlite")]
impl DbPaymentText {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt("created_at", e))?
            .with_timezone(&chrono::Utc);

        Ok(Payment::from_parts(
            self.id.parse().map_err(|e| corrupt("id", e))?,
            self.order_id.parse().map_err(|e| corrupt("order_id", e))?,
            self.customer_id
                .parse()
                .map_err(|e| corrupt("customer_id", e))?,
            TransactionId::new(self.transaction_id).map_err(|e| corrupt("transaction_id", e))?,
            Amount::from_minor(self.amount).map_err(|e| corrupt("amount", e))?,
            status_from_db(&self.status)?,
            created_at,
        ))
    }
}
