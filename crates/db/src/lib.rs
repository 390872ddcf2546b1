//! PostgreSQL persistence for the barbershop booking service.

pub mod models;
pub mod repositories;
pub mod schema;
pub mod seed;
pub mod store;

pub mod mock;

pub use store::PgStore;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Creates the schema and loads reference data. Safe to run repeatedly.
pub async fn prepare_database(pool: &DbPool) -> Result<()> {
    schema::initialize_database(pool).await?;
    seed::seed_reference_data(pool).await?;
    Ok(())
}
