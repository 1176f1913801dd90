//! Souk CLI - account management and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create an operator account (account + profile document)
//! souk account create -e op@example.com -p 'a-real-password' -n "Opal Perez"
//!
//! # Seed demo categories and products
//! souk seed --seller <account-id>
//! ```
//!
//! # Commands
//!
//! - `account create` - Create an operator account against the backend
//! - `seed` - Seed the backend with a demo catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "souk")]
#[command(author, version, about = "Souk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage operator accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Seed the backend with a demo catalog
    Seed {
        /// Account id to list the demo products under
        #[arg(short, long)]
        seller: String,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new operator account
    Create {
        /// Operator email address
        #[arg(short, long)]
        email: String,

        /// Operator password
        #[arg(short, long)]
        password: String,

        /// Operator display name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Quiet by default; RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souk_cli=info,souk_admin=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Account {
            action:
                AccountAction::Create {
                    email,
                    password,
                    name,
                },
        } => commands::account::create(&email, &password, &name).await,
        Commands::Seed { seller } => commands::seed::run(&seller).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}
