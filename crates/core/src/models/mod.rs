pub mod appointment;
pub mod catalog;
pub mod closure;
pub mod report;
