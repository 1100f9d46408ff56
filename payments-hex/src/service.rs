//! Payment Orchestration Service
//!
//! Owns every payment invariant: duplicate detection, status transitions and
//! propagation of status changes to the order system.
//! Contains NO infrastructure logic - it only talks to the three ports.

use std::collections::BTreeMap;
use std::future::Future;

use payments_types::domain::checkout::{METADATA_CUSTOMER_ID, METADATA_ORDER_ID};
use payments_types::{
    Amount, AppError, CallContext, Caller, CheckoutProvider, CheckoutSessionRequest, CustomerId,
    GatewayError, LineItem, OrderClient, OrderId, OrderStatus, Payment, PaymentId,
    PaymentRepository, PaymentStatus, ProviderOutcome, TransactionId, UniqueKey,
};

/// Settings fixed at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Public base URL the checkout provider redirects back to
    pub success_url_base: String,
    /// Identity allowed to read every payment and used towards the order system
    pub admin_identity: String,
}

impl ServiceConfig {
    pub fn new(success_url_base: impl Into<String>, admin_identity: impl Into<String>) -> Self {
        Self {
            success_url_base: success_url_base.into().trim_end_matches('/').to_string(),
            admin_identity: admin_identity.into(),
        }
    }

    /// `<base>/payments/success?order_id=<id>`
    pub fn success_url(&self, order_id: OrderId) -> String {
        format!(
            "{}/payments/success?order_id={}",
            self.success_url_base, order_id
        )
    }
}

/// Application service for payment operations.
///
/// Generic over the three ports, injected at compile time:
/// - `R: PaymentRepository` - payment persistence
/// - `O: OrderClient` - the external order system
/// - `C: CheckoutProvider` - the hosted checkout provider
pub struct PaymentService<R, O, C>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    repo: R,
    orders: O,
    checkout: C,
    config: ServiceConfig,
    admin: Caller,
}

/// Runs an outbound call bounded by the time left on `ctx`.
async fn within_deadline<T, F>(ctx: &CallContext, service: &str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    if ctx.is_expired() {
        return Err(GatewayError::Timeout(format!("{} deadline exceeded", service)));
    }
    match ctx.remaining() {
        None => call.await,
        Some(left) => tokio::time::timeout(left, call)
            .await
            .map_err(|_| GatewayError::Timeout(format!("{} deadline exceeded", service)))?,
    }
}

/// Outbound failures where "not found" is still a dependency failure.
fn dependency_failure(err: GatewayError) -> AppError {
    match err {
        GatewayError::NotFound(what) => {
            AppError::dependency(format!("{} not found", what)).with_detail("cause", "rejected")
        }
        other => other.into(),
    }
}

impl<R, O, C> PaymentService<R, O, C>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    /// Creates a new payment service from its collaborators.
    pub fn new(repo: R, orders: O, checkout: C, config: ServiceConfig) -> Self {
        let admin = Caller::new(config.admin_identity.clone());
        Self {
            repo,
            orders,
            checkout,
            config,
            admin,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    pub fn checkout(&self) -> &C {
        &self.checkout
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a hosted checkout session for an order and returns its URL.
    ///
    /// The order is read as the admin identity. Each order item becomes one
    /// line item; the order and customer ids travel as session metadata.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn generate_checkout_url(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        customer_id: CustomerId,
    ) -> Result<String, AppError> {
        let order = within_deadline(
            ctx,
            "order service",
            self.orders.fetch_order(ctx, order_id, &self.admin),
        )
        .await?;

        let line_items = LineItem::for_order(&order)?;

        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_ORDER_ID.to_string(), order_id.to_string());
        metadata.insert(METADATA_CUSTOMER_ID.to_string(), customer_id.to_string());

        let request = CheckoutSessionRequest {
            line_items,
            success_url: self.config.success_url(order_id),
            metadata,
        };

        let session = within_deadline(
            ctx,
            "checkout provider",
            self.checkout.create_session(ctx, request),
        )
        .await
        .map_err(dependency_failure)?;

        tracing::info!(session_id = %session.id, "checkout session opened");
        Ok(session.url)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment outcome
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records the provider-reported outcome of a checkout and notifies the
    /// order system.
    ///
    /// Checks run in order: input validation, transaction conflict, order
    /// conflict, persist, notify. A notification failure leaves the payment
    /// persisted and returns a dependency error naming it.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn record_payment_outcome(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        customer_id: CustomerId,
        transaction_id: &str,
        amount: i64,
        provider_status: &str,
    ) -> Result<Payment, AppError> {
        let transaction_id = TransactionId::new(transaction_id)
            .map_err(|e| AppError::from(e).with_detail("field", "transaction_id"))?;
        let amount =
            Amount::from_minor(amount).map_err(|e| AppError::from(e).with_detail("field", "amount"))?;

        if self
            .repo
            .find_by_transaction_id(&transaction_id)
            .await?
            .is_some()
        {
            return Err(conflict(UniqueKey::TransactionId)
                .with_detail("transaction_id", &transaction_id));
        }

        if self.repo.find_by_order_id(order_id).await?.is_some() {
            return Err(conflict(UniqueKey::OrderId).with_detail("order_id", order_id));
        }

        let outcome = ProviderOutcome::parse(provider_status);
        let payment = Payment::record(order_id, customer_id, transaction_id, amount, &outcome);
        self.repo.create_payment(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            status = %payment.status,
            "payment recorded"
        );

        let order_status = payment.status.order_status().ok_or_else(|| {
            AppError::internal("recorded payment has no order status")
                .with_detail("payment_status", payment.status)
        })?;
        self.notify(ctx, &payment, order_status).await?;

        Ok(payment)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refund
    // ─────────────────────────────────────────────────────────────────────────────

    /// Marks a successful payment refunded and tells the order system.
    ///
    /// The local refund stands even when the notification fails.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn refund_payment(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
    ) -> Result<Payment, AppError> {
        let mut payment = self.find_by_transaction(transaction_id).await?;

        let refunded = payment.status.transition_to(PaymentStatus::Refunded)?;
        self.repo
            .update_status_by_order_id(payment.order_id, refunded)
            .await?;
        payment.status = refunded;

        tracing::info!(payment_id = %payment.id, order_id = %payment.order_id, "payment refunded");

        self.notify(ctx, &payment, OrderStatus::Refunded).await?;
        Ok(payment)
    }

    /// Re-sends the order status implied by the payment's current status.
    ///
    /// Repairs a failed notification after `record_payment_outcome` or
    /// `refund_payment`. Never touches the payment record.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn resync_order_status(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
    ) -> Result<(Payment, OrderStatus), AppError> {
        let payment = self.find_by_transaction(transaction_id).await?;

        let order_status = payment.status.order_status().ok_or_else(|| {
            AppError::conflict("payment is pending; there is no order status to push")
                .with_detail("current_status", payment.status)
        })?;

        self.notify(ctx, &payment, order_status).await?;
        tracing::info!(order_id = %payment.order_id, %order_status, "order status resynced");
        Ok((payment, order_status))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment by its provider transaction id.
    pub async fn get_payment_by_transaction_id(
        &self,
        transaction_id: &str,
        caller: &Caller,
    ) -> Result<Payment, AppError> {
        let payment = self.find_by_transaction(transaction_id).await?;
        self.authorize(payment, caller)
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId, caller: &Caller) -> Result<Payment, AppError> {
        let payment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("payment not found").with_detail("payment_id", id))?;
        self.authorize(payment, caller)
    }

    /// Gets the payment of an order.
    pub async fn get_payment_by_order_id(
        &self,
        order_id: OrderId,
        caller: &Caller,
    ) -> Result<Payment, AppError> {
        let payment = self
            .repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("payment not found").with_detail("order_id", order_id)
            })?;
        self.authorize(payment, caller)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn find_by_transaction(&self, transaction_id: &str) -> Result<Payment, AppError> {
        let transaction_id = TransactionId::new(transaction_id)
            .map_err(|e| AppError::from(e).with_detail("field", "transaction_id"))?;
        self.repo
            .find_by_transaction_id(&transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("payment not found")
                    .with_detail("transaction_id", &transaction_id)
            })
    }

    fn authorize(&self, payment: Payment, caller: &Caller) -> Result<Payment, AppError> {
        if payment.is_visible_to(caller, &self.config.admin_identity) {
            Ok(payment)
        } else {
            tracing::warn!(%caller, payment_id = %payment.id, "payment lookup denied");
            Err(AppError::authorization("Access denied"))
        }
    }

    /// Pushes `order_status`; a failure becomes a dependency error carrying
    /// the already-committed local state.
    async fn notify(
        &self,
        ctx: &CallContext,
        payment: &Payment,
        order_status: OrderStatus,
    ) -> Result<(), AppError> {
        within_deadline(
            ctx,
            "order service",
            self.orders.update_status(ctx, payment.order_id, order_status),
        )
        .await
        .map_err(|e| {
            tracing::warn!(
                payment_id = %payment.id,
                order_id = %payment.order_id,
                %order_status,
                error = %e,
                "order status notification failed"
            );
            dependency_failure(e)
                .with_detail("payment_id", payment.id)
                .with_detail("order_id", payment.order_id)
                .with_detail("payment_status", payment.status)
                .with_detail("order_status", order_status)
        })
    }
}

fn conflict(key: UniqueKey) -> AppError {
    AppError::conflict(key.conflict_message()).with_detail("key", key)
}
