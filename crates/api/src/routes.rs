/// Liveness and version endpoints
pub mod health;
/// Staff panel endpoints
pub mod panel;
/// Client-facing booking endpoints
pub mod public;
