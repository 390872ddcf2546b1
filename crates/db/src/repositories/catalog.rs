use crate::models::{DbDay, DbServiceType};
use chrono::{NaiveTime, Weekday};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_days(pool: &Pool<Postgres>) -> Result<Vec<DbDay>> {
    let days = sqlx::query_as::<_, DbDay>(
        r#"
        SELECT id, name, weekday
        FROM days
        ORDER BY weekday ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(days)
}

pub async fn get_day_by_weekday(pool: &Pool<Postgres>, weekday: Weekday) -> Result<Option<DbDay>> {
    let day = sqlx::query_as::<_, DbDay>(
        r#"
        SELECT id, name, weekday
        FROM days
        WHERE weekday = $1
        "#,
    )
    .bind(weekday.number_from_monday() as i16)
    .fetch_optional(pool)
    .await?;

    Ok(day)
}

/// Start times linked to `weekday`, earliest first.
pub async fn get_slot_times_for_weekday(
    pool: &Pool<Postgres>,
    weekday: Weekday,
) -> Result<Vec<NaiveTime>> {
    tracing::debug!("Loading slots for weekday {}", weekday);

    let times = sqlx::query_scalar::<_, NaiveTime>(
        r#"
        SELECT ts.start_time
        FROM time_slots ts
        JOIN day_time_slots dts ON dts.slot_id = ts.id
        JOIN days d ON d.id = dts.day_id
        WHERE d.weekday = $1
        ORDER BY ts.start_time ASC
        "#,
    )
    .bind(weekday.number_from_monday() as i16)
    .fetch_all(pool)
    .await?;

    Ok(times)
}

pub async fn list_service_types(pool: &Pool<Postgres>) -> Result<Vec<DbServiceType>> {
    let services = sqlx::query_as::<_, DbServiceType>(
        r#"
        SELECT id, name, price, category, duration_minutes
        FROM service_types
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn get_service_type_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbServiceType>> {
    let service = sqlx::query_as::<_, DbServiceType>(
        r#"
        SELECT id, name, price, category, duration_minutes
        FROM service_types
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}
