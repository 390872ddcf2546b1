//! # Barbershop Core
//!
//! Domain types and booking rules for the barbershop booking service.
//!
//! - **Models**: catalog, appointments, closures and report shapes
//! - **Store**: persistence traits plus an in-memory implementation
//! - **Booking**: slot availability, the booking transaction and status changes
//! - **Reporting**: panel listings, stats, calendar events and receipts

pub mod booking;
pub mod clock;
pub mod errors;
pub mod models;
pub mod phone;
pub mod reporting;
pub mod rut;
pub mod store;
