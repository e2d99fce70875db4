//! WC24 mail gateway launcher
//!
//! # Commands
//!
//! - `serve` - Run the gateway (default)
//! - `hash` - Print the salted digest of a credential
//! - `check-id` - Check the format of a friend code
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wc24mail_server::{GatewayConfig, DEFAULT_CONFIG_PATH, DEFAULT_SALT_PATH};

/// WiiConnect24 mail gateway.
#[derive(Parser)]
#[command(name = "wc24mail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(global = true, short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Path to the password salt file
    #[arg(global = true, short, long, default_value = DEFAULT_SALT_PATH)]
    salt: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Print the salted digest of a credential
    Hash {
        /// The credential to hash
        credential: String,
    },

    /// Check the format of a friend code
    CheckId {
        /// Friend code, e.g. w1234567890123456
        mlid: String,
    },

    /// Show version information
    Version,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let mut config = GatewayConfig::from_file(&cli.config)?;
            if let Some(bind) = bind {
                config = config.with_bind_addr(bind);
            }
            init_logging(cli.verbose || config.debug);
            commands::serve::run(config, &cli.salt).await?;
        }
        Commands::Hash { credential } => {
            init_logging(cli.verbose);
            commands::hash::run(&cli.salt, &credential)?;
        }
        Commands::CheckId { mlid } => {
            commands::check_id::run(&mlid)?;
        }
        Commands::Version => {
            println!("wc24mail v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
