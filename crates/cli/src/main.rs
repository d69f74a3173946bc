//! Loyalty CLI - Database migrations and staff bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply the schema and the session table
//! loyalty-cli migrate
//!
//! # Create the first admin (password read from LOYALTY_STAFF_PASSWORD)
//! LOYALTY_STAFF_PASSWORD=... loyalty-cli staff create -n alice -l "Head office" -r admin
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "loyalty-cli")]
#[command(author, version, about = "Loyalty ledger CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (schema and session store)
    Migrate,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a staff account
    Create {
        /// Login name
        #[arg(short, long)]
        name: String,

        /// Branch the staff member works at
        #[arg(short, long)]
        location: String,

        /// Role (`admin` or `staff`)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create {
                name,
                location,
                role,
            } => {
                commands::staff::create(&name, &location, &role).await?;
            }
        },
    }
    Ok(())
}
