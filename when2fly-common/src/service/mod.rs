use std::fmt;

use crate::db::DaoError;

pub mod flight;
pub mod notification;

pub use flight::FlightService;
pub use notification::NotificationService;

#[derive(Debug)]
pub enum ServiceError {
    Validation(String),
    NotFound,
    Dependency(DaoError),
}

impl std::error::Error for ServiceError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "ServiceError: Validation failed: {msg}"),
            ServiceError::NotFound => write!(f, "ServiceError: Not found"),
            ServiceError::Dependency(e) => write!(f, "ServiceError: {e}"),
        }
    }
}

impl From<DaoError> for ServiceError {
    fn from(error: DaoError) -> Self {
        if error.is_not_found() {
            ServiceError::NotFound
        } else {
            ServiceError::Dependency(error)
        }
    }
}
