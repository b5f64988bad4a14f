use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = create_pool(&database_url).await?;
    initialize_database(&pool).await?;

    println!("Database schema is up to date.");
    Ok(())
}
