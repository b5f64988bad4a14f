use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date unavailable: {0}")]
    DateUnavailable(String),

    #[error("No time slot selected")]
    MissingSlot,

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Stored availability state is corrupt: {0}")]
    StoreCorrupt(String),

    #[error("Appointment ledger unavailable: {0}")]
    Ledger(#[from] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type BookingResult<T> = Result<T, BookingError>;
