use std::{future::Future, sync::Arc};

use entity::{Employee, EmployeeFilter, NewEmployee};
use thiserror::Error;

pub mod client;
pub mod memory;

pub use client::{ApiSettings, HttpEmployeeApi};
pub use memory::InMemoryEmployeeApi;

/// Shared employee API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Any failed call against the employee API.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("employee not found")]
    NotFound,
    #[error("bad request: {0}")]
    InvalidInput(String),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(Arc<reqwest::Error>),
    #[error("internal error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Status { .. } => "SERVER",
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            400 | 422 => ApiError::InvalidInput(body),
            _ => ApiError::Status {
                status,
                message: body,
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(Arc::new(value))
    }
}

/// Operations the console needs from the remote employee store.
///
/// Futures are `Send` so callers may fan deletes out onto the runtime.
pub trait EmployeeApi: Send + Sync {
    /// Server-side filtered listing; an empty filter returns every record.
    fn list(&self, filter: &EmployeeFilter) -> impl Future<Output = ApiResult<Vec<Employee>>> + Send;

    fn create(&self, employee: &NewEmployee) -> impl Future<Output = ApiResult<Employee>> + Send;

    /// Fails with [`ApiError::NotFound`] when `employee.id` does not exist.
    fn update(&self, employee: &Employee) -> impl Future<Output = ApiResult<Employee>> + Send;

    /// Fails with [`ApiError::NotFound`] when `id` does not exist.
    fn delete(&self, id: i64) -> impl Future<Output = ApiResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            ApiError::from_status(404, String::new()),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from_status(403, String::new()),
            ApiError::Unauthorized
        ));
        let err = ApiError::from_status(422, "salary must be positive".into());
        assert_eq!(err.to_string(), "bad request: salary must be positive");
        let err = ApiError::from_status(503, "maintenance".into());
        assert_eq!(err.code(), "SERVER");
        assert_eq!(err.to_string(), "server responded 503: maintenance");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from(anyhow::anyhow!("lock poisoned"));
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(err.code(), "INTERNAL");
    }
}
