//! XPay CLI — command-line interface for XPay nodes and channel payers.
//!
//! Subcommands: init, health, register, keygen, sign, verify, queue,
//! settle, receipts, inspect.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// XPay — offline payment-channel claims.
#[derive(Parser, Debug)]
#[command(name = "xpay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default node configuration file.
    Init(commands::init::InitArgs),
    /// Query the health of a running node.
    Health(commands::health::HealthArgs),
    /// Register a point-of-sale device.
    Register(commands::register::RegisterArgs),
    /// Generate a fresh channel key pair.
    Keygen(commands::keygen::KeygenArgs),
    /// Sign a claim offline.
    Sign(commands::sign::SignArgs),
    /// Verify a claim without queueing it.
    Verify(commands::verify::VerifyArgs),
    /// Submit a claim for admission.
    Queue(commands::queue::QueueArgs),
    /// Settle a queued claim on the ledger.
    Settle(commands::settle::SettleArgs),
    /// List settlement receipts.
    Receipts(commands::receipts::ReceiptsArgs),
    /// Look up a channel's ledger entry.
    Inspect(commands::inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Health(args) => commands::health::run(args).await,
        Commands::Register(args) => commands::register::run(args).await,
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Sign(args) => commands::sign::run(args),
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::Queue(args) => commands::queue::run(args).await,
        Commands::Settle(args) => commands::settle::run(args).await,
        Commands::Receipts(args) => commands::receipts::run(args).await,
        Commands::Inspect(args) => commands::inspect::run(args).await,
    }
}
