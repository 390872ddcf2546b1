/// Client-facing booking endpoints
pub mod public;
/// Staff panel endpoints
pub mod panel;

use serde::{Deserialize, Serialize};

/// `{"rows": [...]}` wrapper used by the table endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RowsResponse<T> {
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for RowsResponse<T> {
    fn from(rows: Vec<T>) -> Self {
        Self { rows }
    }
}

/// Treats blank query values as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
