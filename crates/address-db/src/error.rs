//! Error types for the address store

use std::fmt;

/// Rejected input. Expected user error, never logged as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Field {
        field: &'static str,
        message: String,
    },
    EmptyUpdate,
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => write!(f, "{} {}", field, message),
            ValidationError::EmptyUpdate => write!(f, "No fields provided for update"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound(i64),
    Storage(Box<sqlx::Error>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "Validation error: {}", err),
            StoreError::NotFound(id) => write!(f, "Address with id {} not found", id),
            StoreError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Validation(err) => Some(err),
            StoreError::Storage(err) => Some(err.as_ref()),
            StoreError::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
