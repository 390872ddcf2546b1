use crate::models::DbClosedDate;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Postgres};

pub async fn is_date_closed(pool: &Pool<Postgres>, date: NaiveDate) -> Result<bool> {
    let closed = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM closed_dates WHERE date = $1)",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(closed)
}

/// Get-or-create: an existing closure keeps its first reason.
pub async fn close_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    reason: Option<&str>,
) -> Result<DbClosedDate> {
    tracing::debug!("Closing date {} (reason: {:?})", date, reason);

    sqlx::query(
        r#"
        INSERT INTO closed_dates (date, reason)
        VALUES ($1, $2)
        ON CONFLICT (date) DO NOTHING
        "#,
    )
    .bind(date)
    .bind(reason)
    .execute(pool)
    .await?;

    let closure = sqlx::query_as::<_, DbClosedDate>(
        r#"
        SELECT date, reason, created_at
        FROM closed_dates
        WHERE date = $1
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(closure)
}

/// Returns whether a closure was removed.
pub async fn reopen_date(pool: &Pool<Postgres>, date: NaiveDate) -> Result<bool> {
    let result = sqlx::query("DELETE FROM closed_dates WHERE date = $1")
        .bind(date)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_closures_from(pool: &Pool<Postgres>, from: NaiveDate) -> Result<Vec<DbClosedDate>> {
    let closures = sqlx::query_as::<_, DbClosedDate>(
        r#"
        SELECT date, reason, created_at
        FROM closed_dates
        WHERE date >= $1
        ORDER BY date ASC
        "#,
    )
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(closures)
}
