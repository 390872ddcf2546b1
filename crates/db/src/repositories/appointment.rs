use crate::models::{DbAppointment, DbAppointmentDetail, DbAppointmentExtra, DbServiceCount};
use crate::schema::ACTIVE_SLOT_INDEX;
use barbershop_core::models::{
    appointment::{AppointmentStatus, NewBooking},
    report::AppointmentFilter,
};
use chrono::{NaiveDate, NaiveTime};
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

const APPOINTMENT_SELECT: &str = r#"
    SELECT a.id, a.client_id, a.service_type_id, d.name AS day_name, a.date,
           ts.start_time, a.status, a.created_at
    FROM appointments a
    JOIN days d ON d.id = a.day_id
    JOIN time_slots ts ON ts.id = a.slot_id
"#;

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.date, ts.start_time, d.name AS day_name, a.status,
           c.name AS client_name, c.rut AS client_rut, c.phone AS client_phone,
           st.id AS service_id, st.name AS service_name, st.price AS service_price,
           st.category AS service_category, st.duration_minutes AS service_duration
    FROM appointments a
    JOIN days d ON d.id = a.day_id
    JOIN time_slots ts ON ts.id = a.slot_id
    JOIN clients c ON c.id = a.client_id
    JOIN service_types st ON st.id = a.service_type_id
"#;

/// Outcome of [`insert_booking`].
#[derive(Debug)]
pub enum BookingInsert {
    Inserted(DbAppointment),
    /// Another active appointment holds the slot.
    SlotTaken,
}

/// Outcome of [`update_status`].
#[derive(Debug)]
pub enum StatusChange {
    Updated(DbAppointment),
    NotFound,
    /// Reactivating would put a second active appointment on the slot.
    SlotConflict,
}

/// Whether a violated constraint is the one-active-appointment-per-slot index.
/// Any other unique violation stays a storage error.
pub fn is_active_slot_constraint(constraint: Option<&str>) -> bool {
    constraint == Some(ACTIVE_SLOT_INDEX)
}

fn is_active_slot_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => is_active_slot_constraint(db_err.constraint()),
        _ => false,
    }
}

/// Serializes writers on one (date, slot) across processes until the
/// transaction ends.
async fn lock_slot(
    tx: &mut Transaction<'_, Postgres>,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<()> {
    let key = format!("{}|{}", date, start_time.format("%H:%M"));
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(&key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn slot_taken_in(
    tx: &mut Transaction<'_, Postgres>,
    date: NaiveDate,
    slot_id: Uuid,
    excluding: Option<Uuid>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM appointments
            WHERE date = $1 AND slot_id = $2 AND status IN ('P', 'A')
              AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(date)
    .bind(slot_id)
    .bind(excluding)
    .fetch_one(&mut **tx)
    .await?;

    Ok(taken)
}

pub async fn get_occupied_times(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<NaiveTime>> {
    let times = sqlx::query_scalar::<_, NaiveTime>(
        r#"
        SELECT ts.start_time
        FROM appointments a
        JOIN time_slots ts ON ts.id = a.slot_id
        WHERE a.date = $1 AND a.status IN ('P', 'A')
        ORDER BY ts.start_time ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(times)
}

pub async fn is_slot_taken(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    start_time: NaiveTime,
    excluding: Option<Uuid>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM appointments a
            JOIN time_slots ts ON ts.id = a.slot_id
            WHERE a.date = $1 AND ts.start_time = $2 AND a.status IN ('P', 'A')
              AND ($3::uuid IS NULL OR a.id <> $3)
        )
        "#,
    )
    .bind(date)
    .bind(start_time)
    .bind(excluding)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}

/// Inserts the client, the pending appointment and its extras in one transaction.
pub async fn insert_booking(pool: &Pool<Postgres>, booking: &NewBooking) -> Result<BookingInsert> {
    let start_time = booking.slot.time();
    let mut tx = pool.begin().await?;
    lock_slot(&mut tx, booking.date, start_time).await?;

    let slot_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM time_slots WHERE start_time = $1")
        .bind(start_time)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| eyre!("No time slot starts at {}", booking.slot))?;

    if slot_taken_in(&mut tx, booking.date, slot_id, None).await? {
        return Ok(BookingInsert::SlotTaken);
    }

    let client_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO clients (id, name, phone, rut)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&booking.client.name)
    .bind(&booking.client.phone)
    .bind(&booking.client.rut)
    .fetch_one(&mut *tx)
    .await?;

    let appointment_id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO appointments (id, client_id, service_type_id, day_id, slot_id, date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(appointment_id)
    .bind(client_id)
    .bind(booking.service_id)
    .bind(booking.day.id)
    .bind(slot_id)
    .bind(booking.date)
    .bind(AppointmentStatus::Pending.code())
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(e) if is_active_slot_violation(&e) => return Ok(BookingInsert::SlotTaken),
        Err(e) => return Err(e.into()),
    }

    for extra_id in &booking.extra_ids {
        sqlx::query(
            r#"
            INSERT INTO appointment_extras (appointment_id, service_type_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(appointment_id)
        .bind(extra_id)
        .execute(&mut *tx)
        .await?;
    }

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!("{} WHERE a.id = $1", APPOINTMENT_SELECT))
        .bind(appointment_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!("Inserted appointment {} for client {}", appointment_id, client_id);
    Ok(BookingInsert::Inserted(appointment))
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!("{} WHERE a.id = $1", APPOINTMENT_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(appointment)
}

pub async fn get_extra_ids(pool: &Pool<Postgres>, appointment_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT service_type_id
        FROM appointment_extras
        WHERE appointment_id = $1
        ORDER BY service_type_id
        "#,
    )
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Extra services of every listed appointment, in one round trip.
pub async fn get_extras_for(
    pool: &Pool<Postgres>,
    appointment_ids: &[Uuid],
) -> Result<Vec<DbAppointmentExtra>> {
    if appointment_ids.is_empty() {
        return Ok(Vec::new());
    }

    let extras = sqlx::query_as::<_, DbAppointmentExtra>(
        r#"
        SELECT ae.appointment_id, st.id, st.name, st.price, st.category, st.duration_minutes
        FROM appointment_extras ae
        JOIN service_types st ON st.id = ae.service_type_id
        WHERE ae.appointment_id = ANY($1)
        ORDER BY st.name ASC
        "#,
    )
    .bind(appointment_ids)
    .fetch_all(pool)
    .await?;

    Ok(extras)
}

pub async fn get_appointment_detail(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointmentDetail>> {
    let detail = sqlx::query_as::<_, DbAppointmentDetail>(&format!("{} WHERE a.id = $1", DETAIL_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(detail)
}

pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<StatusChange> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (NaiveDate, Uuid, NaiveTime)>(
        r#"
        SELECT a.date, a.slot_id, ts.start_time
        FROM appointments a
        JOIN time_slots ts ON ts.id = a.slot_id
        WHERE a.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((date, slot_id, start_time)) = current else {
        return Ok(StatusChange::NotFound);
    };

    if status.occupies_slot() {
        lock_slot(&mut tx, date, start_time).await?;
        if slot_taken_in(&mut tx, date, slot_id, Some(id)).await? {
            return Ok(StatusChange::SlotConflict);
        }
    }

    let updated = sqlx::query("UPDATE appointments SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.code())
        .execute(&mut *tx)
        .await;

    match updated {
        Ok(_) => {}
        Err(e) if is_active_slot_violation(&e) => return Ok(StatusChange::SlotConflict),
        Err(e) => return Err(e.into()),
    }

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!("{} WHERE a.id = $1", APPOINTMENT_SELECT))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!("Appointment {} status set to {}", id, status.code());
    Ok(StatusChange::Updated(appointment))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AppointmentFilter) {
    builder.push(" WHERE TRUE");
    if let Some(start) = filter.start {
        builder.push(" AND a.date >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        builder.push(" AND a.date < ").push_bind(end);
    }
    if let Some(date) = filter.date {
        builder.push(" AND a.date = ").push_bind(date);
    }
    if let Some(weekday) = filter.weekday {
        builder
            .push(" AND EXTRACT(ISODOW FROM a.date)::int = ")
            .push_bind(weekday.number_from_monday() as i32);
    }
    if let Some(service_id) = filter.service_id {
        builder.push(" AND a.service_type_id = ").push_bind(service_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND a.status = ").push_bind(status.code());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (lower(c.name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(c.rut) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn list_appointment_details(
    pool: &Pool<Postgres>,
    filter: &AppointmentFilter,
) -> Result<Vec<DbAppointmentDetail>> {
    let mut builder = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY a.date ASC, ts.start_time ASC");

    let rows = builder
        .build_query_as::<DbAppointmentDetail>()
        .fetch_all(pool)
        .await?;

    tracing::debug!("Listed {} appointments for {:?}", rows.len(), filter);
    Ok(rows)
}

pub async fn count_by_service(
    pool: &Pool<Postgres>,
    filter: &AppointmentFilter,
) -> Result<Vec<DbServiceCount>> {
    let mut builder = QueryBuilder::<Postgres>::new(
        r#"
        SELECT st.name AS service, COUNT(*) AS total
        FROM appointments a
        JOIN clients c ON c.id = a.client_id
        JOIN service_types st ON st.id = a.service_type_id
        "#,
    );
    push_filter(&mut builder, filter);
    builder.push(" GROUP BY st.name ORDER BY total DESC, st.name ASC");

    let rows = builder
        .build_query_as::<DbServiceCount>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
