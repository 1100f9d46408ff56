//! Payments CLI
//!
//! Command-line interface for the payment orchestration API.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use payments_client::PaymentsClient;
use payments_types::{CustomerId, OrderId, PaymentId, RecordPaymentRequest};

#[derive(Parser)]
#[command(name = "payments")]
#[command(author, version, about = "Payment orchestration API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payments API
    #[arg(
        long,
        env = "PAYMENTS_API_URL",
        default_value = "http://localhost:50054"
    )]
    api_url: String,

    /// Identity sent as X-Caller-Id
    #[arg(long, env = "PAYMENTS_CALLER_ID")]
    caller_id: Option<String>,

    /// Request deadline in milliseconds
    #[arg(long, env = "PAYMENTS_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a hosted checkout URL for an order
    Checkout {
        #[arg(long)]
        order: String,
        #[arg(long)]
        customer: String,
    },
    /// Record a checkout outcome
    Record {
        #[arg(long)]
        order: String,
        #[arg(long)]
        customer: String,
        /// Provider transaction id
        #[arg(long)]
        transaction: String,
        /// Amount in smallest currency unit
        #[arg(long)]
        amount: i64,
        /// Provider status (`succeeded` or anything else)
        #[arg(long, default_value = "succeeded")]
        status: String,
    },
    /// Refund the payment of a transaction
    Refund {
        /// Provider transaction id
        transaction: String,
    },
    /// Re-send the order status for a transaction
    Resync {
        /// Provider transaction id
        transaction: String,
    },
    /// Look up a payment
    Get {
        #[command(subcommand)]
        by: GetCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum GetCommands {
    /// By payment ID (UUID)
    Id { id: String },
    /// By order ID (UUID)
    Order { id: String },
    /// By provider transaction id
    Transaction { id: String },
}

fn parse_uuid<T: std::str::FromStr>(what: &str, s: &str) -> Result<T> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid {}: {}", what, s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = PaymentsClient::new(&cli.api_url);
    if let Some(caller) = cli.caller_id {
        client = client.with_caller_id(caller);
    }
    if let Some(ms) = cli.timeout_ms {
        client = client.with_timeout(Duration::from_millis(ms));
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Checkout { order, customer } => {
            let order_id: OrderId = parse_uuid("order ID", &order)?;
            let customer_id: CustomerId = parse_uuid("customer ID", &customer)?;
            let url = client.create_checkout(order_id, customer_id).await?;
            println!("{}", url);
        }

        Commands::Record {
            order,
            customer,
            transaction,
            amount,
            status,
        } => {
            let req = RecordPaymentRequest {
                order_id: order,
                customer_id: customer,
                transaction_id: transaction,
                amount,
                status,
            };
            let recorded = client.record_payment(&req).await?;
            println!("{}", serde_json::to_string_pretty(&recorded)?);
        }

        Commands::Refund { transaction } => {
            client.refund_payment(&transaction).await?;
            println!("✓ Payment refunded");
        }

        Commands::Resync { transaction } => {
            let synced = client.resync_order_status(&transaction).await?;
            println!("{}", serde_json::to_string_pretty(&synced)?);
        }

        Commands::Get { by } => {
            let payment = match by {
                GetCommands::Id { id } => {
                    let id: PaymentId = parse_uuid("payment ID", &id)?;
                    client.get_payment(id).await?
                }
                GetCommands::Order { id } => {
                    let id: OrderId = parse_uuid("order ID", &id)?;
                    client.get_payment_by_order_id(id).await?
                }
                GetCommands::Transaction { id } => {
                    client.get_payment_by_transaction_id(&id).await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&payment)?);
        }
    }

    Ok(())
}
