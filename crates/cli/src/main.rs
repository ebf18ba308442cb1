//! Uniform Shop CLI - Cart quotes and catalog form checks.
//!
//! # Usage
//!
//! ```bash
//! # Price a stored cart document
//! shop-cli quote cart.json
//!
//! # Replay a scripted cart session
//! shop-cli replay session.json
//!
//! # Validate admin form submissions
//! shop-cli check-product product-form.json
//! shop-cli check-school school-form.json
//! ```
//!
//! # Commands
//!
//! - `quote` - Subtotal, shipping and total for a cart document
//! - `replay` - Run cart steps through the cart store
//! - `check-product` / `check-school` - Admin form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Uniform shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a cart document (JSON)
    Quote {
        /// Path to the cart document
        file: PathBuf,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a scripted cart session (JSON array of steps)
    Replay {
        /// Path to the script
        file: PathBuf,
    },
    /// Validate a product form submission (JSON)
    CheckProduct {
        /// Path to the form
        file: PathBuf,
    },
    /// Validate a school form submission (JSON)
    CheckSchool {
        /// Path to the form
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "uniform_shop_cli=info,uniform_shop_storefront=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Quote { file, json } => commands::quote::run(&file, json)?,
        Commands::Replay { file } => commands::replay::run(&file).await?,
        Commands::CheckProduct { file } => print(&commands::catalog::check_product(&file)?),
        Commands::CheckSchool { file } => print(&commands::catalog::check_school(&file)?),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print(output: &str) {
    println!("{output}");
}
