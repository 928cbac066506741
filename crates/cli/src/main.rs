//! Campus hub CLI - browse the marketplace from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Authenticate (tokens persist under HUB_STORAGE_DIR)
//! hub-cli login -u maria -p hunter2
//!
//! # Browse and search
//! hub-cli items list --category textbook
//! hub-cli items search "calculus"
//! hub-cli items show 42
//!
//! # Cart and checkout
//! hub-cli cart add 42 -q 2
//! hub-cli cart show
//! hub-cli cart checkout -a "12 Dorm Rd" -m cash
//!
//! # Account
//! hub-cli orders list
//! hub-cli profile show
//! ```
//!
//! # Environment Variables
//!
//! - `HUB_API_BASE_URL` - Base URL of the hub API (required)
//! - `HUB_STORAGE_DIR` - Where to persist tokens and preferences
//! - `HUB_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

use commands::{account, auth, cart, items};

#[derive(Parser)]
#[command(name = "hub-cli")]
#[command(author, version, about = "Campus hub marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist tokens locally
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and discard stored tokens
    Logout,
    /// Browse and manage listings
    Items {
        #[command(subcommand)]
        action: items::ItemsAction,
    },
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: cart::CartAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: account::OrdersAction,
    },
    /// Your profile
    Profile {
        #[command(subcommand)]
        action: account::ProfileAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Login { username, password } => auth::login(&username, &password).await?,
        Commands::Logout => auth::logout().await?,
        Commands::Items { action } => items::run(action).await?,
        Commands::Cart { action } => cart::run(action).await?,
        Commands::Orders { action } => account::run_orders(action).await?,
        Commands::Profile { action } => account::run_profile(action).await?,
    }
    Ok(())
}
