//! Franklin CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! franklin-cli migrate
//!
//! # Load the item catalog
//! franklin-cli seed items items.yaml
//!
//! # Create a user
//! franklin-cli user create -n "Test User" -p correct-password -z 72701
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "franklin-cli")]
#[command(author, version, about = "Franklin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load catalog items from a YAML file
    Items {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user (no store lookup)
    Create {
        /// Login name
        #[arg(short, long)]
        name: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Zip code
        #[arg(short, long)]
        zipcode: Option<i32>,
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
        Commands::Seed { target } => match target {
            SeedTarget::Items { file } => commands::seed::items(&file).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create {
                name,
                password,
                zipcode,
            } => {
                commands::user::create(&name, &password, zipcode).await?;
            }
        },
    }
    Ok(())
}
