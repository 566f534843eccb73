//! Shop CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! shop-cli migrate
//!
//! # Insert demo products and users into an empty database
//! shop-cli seed
//!
//! # Insert demo rows even if the tables already have data
//! shop-cli seed --force
//! ```
//!
//! Both commands read the same environment as the server
//! (`SHOP_DATABASE_URL`, falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Shop backend CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo products and users
    Seed {
        /// Seed even if the tables already contain rows
        #[arg(long)]
        force: bool,
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

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => commands::seed::run(force).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_force() {
        let cli = Cli::try_parse_from(["shop-cli", "seed", "--force"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Seed { force: true })
        ));
    }
}
