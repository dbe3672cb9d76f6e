//! Copyright 2024 Cosmian Tech SAS

use std::time::Duration;

use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by a remote crypto gateway.
///
/// `Cancelled` and `Timeout` are raised on the caller side when the
/// operation context fires before the remote call completes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Default(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}
