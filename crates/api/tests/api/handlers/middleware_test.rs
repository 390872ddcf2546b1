use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse};
use barbershop_api::middleware::error_handling::AppError;
use barbershop_core::{
    errors::BookingError,
    models::catalog::{Day, ServiceCategory, ServiceType, opening_slots},
    store::Stores,
};
use barbershop_db::mock::{MockCatalogRepo, MockClosureRepo, MockReservationRepo};
use eyre::eyre;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{monday_morning, server_with};

#[rstest]
#[case(BookingError::MissingFields("rut".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::InvalidDate("x".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::DayClosed("07-06-2024".into()), StatusCode::BAD_REQUEST)]
#[case(
    BookingError::OutOfWindow { from: "03-06-2024".into(), to: "08-06-2024".into() },
    StatusCode::BAD_REQUEST
)]
#[case(BookingError::ClosedWeekday("Domingo".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::UnknownService("x".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::InvalidRut("1-1".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::InvalidStatus("X".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::SlotUnavailable("12:00".into()), StatusCode::CONFLICT)]
#[case(BookingError::SlotTaken("12:00".into()), StatusCode::CONFLICT)]
#[case(BookingError::SlotConflict("12:00".into()), StatusCode::CONFLICT)]
#[case(BookingError::NotFound("appointment".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Storage(eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_eyre_reports_are_storage_errors() {
    let error = AppError::from(eyre!("pool timed out"));
    assert!(matches!(error.0, BookingError::Storage(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn haircut() -> ServiceType {
    ServiceType {
        id: Uuid::new_v4(),
        name: "Corte de pelo".to_string(),
        price: 8000,
        category: ServiceCategory::Base,
        duration_minutes: 30,
    }
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let mut catalog = MockCatalogRepo::new();
    catalog
        .expect_list_services()
        .returning(|| Err(BookingError::Storage(eyre!("connection refused"))));

    let stores = Stores {
        catalog: Arc::new(catalog),
        closures: Arc::new(MockClosureRepo::new()),
        reservations: Arc::new(MockReservationRepo::new()),
    };
    let server = server_with(stores, monday_morning());

    let response = server.get("/api/services").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["error"],
        "Storage error: connection refused"
    );
}

#[tokio::test]
async fn test_slot_listing_storage_failure_is_not_hidden() {
    let mut closures = MockClosureRepo::new();
    closures
        .expect_is_closed()
        .returning(|_| Err(BookingError::Storage(eyre!("connection refused"))));

    let stores = Stores {
        catalog: Arc::new(MockCatalogRepo::new()),
        closures: Arc::new(closures),
        reservations: Arc::new(MockReservationRepo::new()),
    };
    let server = server_with(stores, monday_morning());

    let response = server
        .get("/api/slots")
        .add_query_param("date", "2024-06-04")
        .add_query_param("service", Uuid::new_v4())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

/// A writer in another process wins the slot between the checks and the commit.
#[tokio::test]
async fn test_commit_time_conflict_is_409() {
    let service = haircut();
    let service_id = service.id;

    let mut catalog = MockCatalogRepo::new();
    catalog
        .expect_day_for_weekday()
        .returning(|weekday| {
            Ok(Some(Day {
                id: Uuid::new_v4(),
                name: "Martes".to_string(),
                weekday,
            }))
        });
    catalog
        .expect_get_service()
        .returning(move |_| Ok(Some(service.clone())));
    catalog
        .expect_slots_for_weekday()
        .returning(|weekday| Ok(opening_slots(weekday)));

    let mut closures = MockClosureRepo::new();
    closures.expect_is_closed().returning(|_| Ok(false));

    let mut reservations = MockReservationRepo::new();
    reservations
        .expect_occupied_slots()
        .returning(|_| Ok(Vec::new()));
    reservations
        .expect_is_slot_taken()
        .returning(|_, _, _| Ok(false));
    reservations
        .expect_insert_booking()
        .times(1)
        .returning(|booking| Err(BookingError::SlotTaken(booking.slot.to_string())));

    let stores = Stores {
        catalog: Arc::new(catalog),
        closures: Arc::new(closures),
        reservations: Arc::new(reservations),
    };
    let server = server_with(stores, monday_morning());

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "name": "Juan Soto",
            "phone": "912345678",
            "rut": "12345678-5",
            "service_id": service_id,
            "date": "2024-06-04",
            "slot": "16:30",
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "The 16:30 slot is already taken, please pick another one"
    );
}
