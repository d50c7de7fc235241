//! MealBridge CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mb-cli migrate
//!
//! # Seed the database with sample meals and demo/admin accounts
//! mb-cli seed
//!
//! # Seed without the demo accounts
//! mb-cli seed --no-demo-user
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with sample data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mb-cli")]
#[command(author, version, about = "MealBridge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample meals and demo/admin accounts
    Seed {
        /// Skip creating the demo and admin users and their API tokens
        #[arg(long)]
        no_demo_user: bool,

        /// Email for the demo user
        #[arg(long, default_value = "demo@mealbridge.test")]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            no_demo_user,
            email,
        } => commands::seed::run(!no_demo_user, &email).await?,
    }
    Ok(())
}
