//! Reference data: operating days, their slots and the default service catalog.
//!
//! Every insert is `ON CONFLICT DO NOTHING`, so seeding an existing database
//! leaves edited rows alone.

use barbershop_core::models::catalog::{OPERATING_WEEKDAYS, SEED_SERVICES, day_name, opening_slots};
use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::{debug, info};

pub async fn seed_reference_data(pool: &Pool<Postgres>) -> Result<()> {
    info!("Seeding reference data...");
    let mut tx = pool.begin().await?;

    for weekday in OPERATING_WEEKDAYS {
        let name = day_name(weekday);
        sqlx::query(
            r#"
            INSERT INTO days (name, weekday)
            VALUES ($1, $2)
            ON CONFLICT (weekday) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(weekday.number_from_monday() as i16)
        .execute(&mut *tx)
        .await?;

        for slot in opening_slots(weekday) {
            sqlx::query(
                r#"
                INSERT INTO time_slots (start_time)
                VALUES ($1)
                ON CONFLICT (start_time) DO NOTHING
                "#,
            )
            .bind(slot.time())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO day_time_slots (day_id, slot_id)
                SELECT d.id, ts.id
                FROM days d, time_slots ts
                WHERE d.weekday = $1 AND ts.start_time = $2
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(weekday.number_from_monday() as i16)
            .bind(slot.time())
            .execute(&mut *tx)
            .await?;
        }
        debug!("Seeded {} with its opening hours", name);
    }

    for seed in SEED_SERVICES {
        sqlx::query(
            r#"
            INSERT INTO service_types (name, price, category, duration_minutes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(seed.name)
        .bind(seed.price as i32)
        .bind(seed.category.code())
        .bind(seed.duration_minutes() as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("Reference data seeded successfully.");
    Ok(())
}

