use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::config::ApiConfig;
use slotbook_core::ledger::AppointmentLedger;
use slotbook_db::{create_pool, kv::FileKvStore, ledger::PgLedger, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Connect the appointment ledger and the persisted availability state
    let ledger: Arc<dyn AppointmentLedger> = PgLedger::connect(db_pool).await?;
    let kv = Box::new(FileKvStore::open(&config.state_path));

    // Start API server
    slotbook_api::start_server(config, ledger, kv).await?;

    Ok(())
}
