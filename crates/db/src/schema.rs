use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Partial unique index that allows one active appointment per date and slot.
pub const ACTIVE_SLOT_INDEX: &str = "uq_appointments_active_slot";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Operating days, ISO weekday numbers
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS days (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(20) NOT NULL UNIQUE,
            weekday SMALLINT NOT NULL UNIQUE,
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 1 AND 7)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            start_time TIME NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS day_time_slots (
            day_id UUID NOT NULL REFERENCES days(id),
            slot_id UUID NOT NULL REFERENCES time_slots(id),
            PRIMARY KEY (day_id, slot_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_types (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL UNIQUE,
            price INTEGER NOT NULL,
            category VARCHAR(10) NOT NULL,
            duration_minutes INTEGER NULL,
            CONSTRAINT valid_price CHECK (price >= 0),
            CONSTRAINT valid_category CHECK (category IN ('BASE', 'ADDON'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS closed_dates (
            date DATE PRIMARY KEY,
            reason VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(20) NOT NULL,
            rut VARCHAR(16) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id UUID NOT NULL REFERENCES clients(id),
            service_type_id UUID NOT NULL REFERENCES service_types(id),
            day_id UUID NOT NULL REFERENCES days(id),
            slot_id UUID NOT NULL REFERENCES time_slots(id),
            date DATE NOT NULL,
            status CHAR(1) NOT NULL DEFAULT 'P',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('P', 'A', 'C'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointment_extras (
            appointment_id UUID NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
            service_type_id UUID NOT NULL REFERENCES service_types(id),
            PRIMARY KEY (appointment_id, service_type_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Catalogs created before durations were stored explicitly
    sqlx::query("ALTER TABLE service_types ADD COLUMN IF NOT EXISTS duration_minutes INTEGER NULL;")
        .execute(pool)
        .await?;
    backfill_service_durations(pool).await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date);",
        "CREATE INDEX IF NOT EXISTS idx_appointments_service_type_id ON appointments(service_type_id);",
        "CREATE INDEX IF NOT EXISTS idx_appointments_client_id ON appointments(client_id);",
        "CREATE INDEX IF NOT EXISTS idx_clients_rut ON clients(rut);",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_active_slot ON appointments(date, slot_id) WHERE status IN ('P', 'A');",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Fills missing durations with the name-based rule: "perfil" services take
/// an hour, everything else half an hour.
pub async fn backfill_service_durations(pool: &Pool<Postgres>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE service_types
        SET duration_minutes = CASE WHEN lower(name) LIKE '%perfil%' THEN 60 ELSE 30 END
        WHERE duration_minutes IS NULL
        "#,
    )
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!(
            "Backfilled duration for {} service types",
            result.rows_affected()
        );
    }
    Ok(result.rows_affected())
}
