//! Store mocks for failure injection in service and handler tests.

pub mod repositories;

pub use repositories::{MockCatalogRepo, MockClosureRepo, MockReservationRepo};
