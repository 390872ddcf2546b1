use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("The shop is closed on {0}. Please pick another date")]
    DayClosed(String),

    #[error("Bookings are only accepted between {from} and {to}")]
    OutOfWindow { from: String, to: String },

    #[error("{0} is not an operating day")]
    ClosedWeekday(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("The {0} slot is not available for the selected service")]
    SlotUnavailable(String),

    #[error("The {0} slot is already taken, please pick another one")]
    SlotTaken(String),

    #[error("Invalid RUT: {0}")]
    InvalidRut(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Cannot reactivate: the {0} slot was taken by another appointment")]
    SlotConflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] eyre::Report),
}

impl BookingError {
    /// True for failures caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, BookingError::Storage(_) | BookingError::NotFound(_))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
