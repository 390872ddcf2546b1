use std::error::Error;

use barbershop_core::errors::{BookingError, BookingResult};

#[test]
fn test_booking_error_display() {
    let missing = BookingError::MissingFields("name, rut".to_string());
    let invalid_date = BookingError::InvalidDate("2024-13-01".to_string());
    let closed = BookingError::DayClosed("03-06-2024".to_string());
    let window = BookingError::OutOfWindow {
        from: "03-06-2024".to_string(),
        to: "08-06-2024".to_string(),
    };
    let taken = BookingError::SlotTaken("12:00".to_string());
    let not_found = BookingError::NotFound("Appointment not found".to_string());

    assert_eq!(missing.to_string(), "Missing required fields: name, rut");
    assert_eq!(invalid_date.to_string(), "Invalid date: 2024-13-01");
    assert_eq!(
        closed.to_string(),
        "The shop is closed on 03-06-2024. Please pick another date"
    );
    assert_eq!(
        window.to_string(),
        "Bookings are only accepted between 03-06-2024 and 08-06-2024"
    );
    assert_eq!(
        taken.to_string(),
        "The 12:00 slot is already taken, please pick another one"
    );
    assert_eq!(
        not_found.to_string(),
        "Resource not found: Appointment not found"
    );
}

#[test]
fn test_storage_error_keeps_source() {
    let report = eyre::eyre!("connection refused");
    let error: BookingError = report.into();

    assert!(error.to_string().contains("Storage error:"));
    assert!(error.to_string().contains("connection refused"));
    assert!(error.source().is_some());
}

#[test]
fn test_validation_classification() {
    assert!(BookingError::SlotConflict("12:00".into()).is_validation());
    assert!(BookingError::InvalidRut("1-1".into()).is_validation());
    assert!(!BookingError::NotFound("x".into()).is_validation());
    assert!(!BookingError::Storage(eyre::eyre!("down")).is_validation());
}

#[test]
fn test_booking_result() {
    let result: BookingResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BookingResult<i32> = Err(BookingError::InvalidStatus("X".to_string()));
    assert!(result.is_err());
}
