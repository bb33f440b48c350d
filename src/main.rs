use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payment_gateway::models::Identified;
use payment_gateway::{CardDetails, Config, Envelope, List, PaymentGateway};

#[derive(Parser)]
#[command(name = "payment-gateway", about = "Charge, refund and list card payments")]
struct Cli {
    /// TOML config file; the environment is used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize a card and charge it.
    Charge {
        #[arg(long)]
        number: String,
        #[arg(long)]
        exp_month: u8,
        #[arg(long)]
        exp_year: u16,
        #[arg(long)]
        cvc: String,
        /// Amount in major units, e.g. 10.50
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List the most recent charges.
    Charges {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        starting_after: Option<String>,
    },
    /// Fetch one charge.
    ChargeGet { id: String },
    /// Fully refund a charge.
    Refund { charge_id: String },
    /// List the most recent refunds.
    Refunds {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        starting_after: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    info!("Using payment processor at {}", config.api_base);

    let gateway = PaymentGateway::from_config(&config).context("building processor client")?;

    match cli.command {
        Command::Charge {
            number,
            exp_month,
            exp_year,
            cvc,
            amount,
            currency,
            description,
        } => {
            let card = CardDetails::new(number, exp_month, exp_year, cvc);
            let envelope = gateway
                .charge(&card, amount, currency.as_deref(), description.as_deref())
                .await;
            print_envelope(&envelope)
        }
        Command::Charges {
            limit,
            starting_after,
        } => {
            let envelope = gateway.list_charges(limit, starting_after.as_deref()).await;
            log_next_cursor(&envelope);
            print_envelope(&envelope)
        }
        Command::ChargeGet { id } => print_envelope(&gateway.retrieve_charge(&id).await),
        Command::Refund { charge_id } => print_envelope(&gateway.refund(&charge_id).await),
        Command::Refunds {
            limit,
            starting_after,
        } => {
            let envelope = gateway.list_refunds(limit, starting_after.as_deref()).await;
            log_next_cursor(&envelope);
            print_envelope(&envelope)
        }
    }
}

fn log_next_cursor<T: Identified>(envelope: &Envelope<List<T>>) {
    if let Some(cursor) = envelope.data.as_ref().and_then(List::next_cursor) {
        info!("More records available, continue with --starting-after {}", cursor);
    }
}

fn print_envelope<T: Serialize>(envelope: &Envelope<T>) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(if envelope.status {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
