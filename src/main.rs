mod cli;

use clap::Parser;
use dotenvy::dotenv;
use stockflow::config;
use stockflow::core::warehouse;
use stockflow::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let args = cli::Cli::parse();

    // 3. Load warehouse seed configuration (missing config.toml is fine)
    let seed_config = config::warehouses::load_default_config()?;

    // 4. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db).await?;

    // 5. Seed configured warehouses (idempotent)
    warehouse::seed_initial_warehouses(&db, &seed_config.warehouses).await?;

    // 6. Run the requested command
    cli::run(args, &db).await
}
