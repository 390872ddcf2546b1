use barbershop_api::config::ApiConfig;
use barbershop_db::{create_pool, prepare_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;

    // Schema and reference data are idempotent
    prepare_database(&db_pool).await?;

    barbershop_api::start_server(config, db_pool).await?;

    Ok(())
}
