//! Bootstrap binary: prepares the studio ledger store for local development.
//!
//! Initializes tracing, loads environment configuration and creates the
//! store schema. The API layer that consumes the core lives elsewhere.

use dotenvy::dotenv;
use studio_ledger::config::database;
use studio_ledger::errors::Result;
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
    info!("Attempted to load .env file.");

    // 3. Connect to the store (DATABASE_URL or the local SQLite default)
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    // 4. Create tables from the entity definitions
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Store schema created."))
        .inspect_err(|e| error!("Failed to create store schema: {e}"))?;

    info!("Studio ledger store is ready.");
    Ok(())
}
