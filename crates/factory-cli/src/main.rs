//! Factory CLI - provision devices and inspect enrollment IDs
//!
//! `factory` runs the factory provisioning flow against file-backed stores
//! and offers offline helpers for the enrollment ID of a device certificate.
//!
//! # Examples
//!
//! ```bash
//! # Print the enrollment ID of a device certificate
//! factory enroll-id device.pem
//!
//! # Check an enrollment ID an operator registered
//! factory verify device.pem A-AD:1E:...:30
//!
//! # Provision from the configured blob directory into the item store
//! factory provision --blob-dir ./blobs --store-dir ./store
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod inspect;
mod provision;

/// Factory CLI - device provisioning and enrollment IDs
#[derive(Parser)]
#[command(name = "factory")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FACTORY_CONFIG")]
    #[arg(default_value = "~/.config/factory/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the enrollment ID of a PEM certificate
    EnrollId(inspect::CertArgs),

    /// Print the subject Common Name of a PEM certificate
    CommonName(inspect::CertArgs),

    /// Check that an enrollment ID belongs to a PEM certificate
    Verify(inspect::VerifyArgs),

    /// Run the factory provisioning flow
    Provision(provision::ProvisionArgs),

    /// List the items in a provisioning store
    Items(provision::ItemsArgs),

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("factory=debug,factory_identity=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = shellexpand::tilde(&cli.config).to_string();
    info!(config_path = %config_path, "Starting factory");

    match cli.command {
        Commands::EnrollId(args) => inspect::enroll_id(&args),
        Commands::CommonName(args) => inspect::common_name(&args),
        Commands::Verify(args) => inspect::verify(&args),
        Commands::Provision(args) => provision::execute(args, &config_path),
        Commands::Items(args) => provision::list_items(args, &config_path),
        Commands::Config => config::show(&config_path),
    }
}
