//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use payments_types::{
    OrderId, Payment, PaymentId, PaymentRepository, PaymentStatus, RepoError, TransactionId,
};

use crate::types::{DbPaymentText, db_err, map_write_error};

const SELECT_PAYMENT: &str = r#"SELECT id, order_id, customer_id, transaction_id, amount, status, created_at FROM payments"#;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for ddl in [
            include_str!("../migrations/0001_create_payments.sql"),
            include_str!("../migrations/0002_index_payments_customer.sql"),
        ] {
            sqlx::query(ddl).execute(&self.pool).await.map_err(db_err)?;
        }
        Ok(())
    }

    async fn fetch_one_where(
        &self,
        column: &str,
        value: String,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPaymentText> =
            sqlx::query_as(&format!("{} WHERE {} = ?", SELECT_PAYMENT, column))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(DbPaymentText::into_domain).transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, order_id, customer_id, transaction_id, amount, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.customer_id.to_string())
        .bind(payment.transaction_id.as_str())
        .bind(payment.amount.minor_units())
        .bind(payment.status.as_str())
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("id", id.to_string()).await
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("order_id", order_id.to_string()).await
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("transaction_id", transaction_id.to_string())
            .await
    }

    async fn update_status_by_order_id(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(r#"UPDATE payments SET status = ? WHERE order_id = ?"#)
            .bind(status.as_str())
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
