use lambda_http::http::StatusCode;
use lambda_http::{Error as LambdaError, Response as LambdaResponse};
use thiserror::Error as ThisError;
use tracing::{error, warn};

use super::utils::error_response;

/// Failures of a todo operation, from request validation down to storage.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Auth(String),
    #[error("Todo not found: {todo_id}")]
    NotFound { todo_id: String },
    #[error("Storage write failed: {0}")]
    StorageWrite(String),
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl TodoError {
    pub fn not_found(todo_id: impl Into<String>) -> Self {
        TodoError::NotFound {
            todo_id: todo_id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            TodoError::Validation(_) => StatusCode::BAD_REQUEST,
            TodoError::Auth(_) => StatusCode::UNAUTHORIZED,
            TodoError::NotFound { .. } => StatusCode::NOT_FOUND,
            TodoError::StorageWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TodoError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;

/// Handler-level error.
///
/// `HttpError` is an already rendered response that goes back to API Gateway
/// as a normal reply; `LambdaError` is reported to the runtime as an
/// invocation failure.
#[derive(Debug)]
pub enum Error {
    HttpError(LambdaResponse<String>),
    LambdaError(LambdaError),
}

impl From<TodoError> for Error {
    fn from(err: TodoError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }

        Error::HttpError(error_response(status, &err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::LambdaError(Box::new(err))
    }
}

impl From<lambda_http::http::Error> for Error {
    fn from(err: lambda_http::http::Error) -> Self {
        Error::LambdaError(Box::new(err))
    }
}

pub fn into_lambda_result(
    result: std::result::Result<LambdaResponse<String>, Error>,
) -> std::result::Result<LambdaResponse<String>, LambdaError> {
    match result {
        Ok(val) => Ok(val),
        Err(Error::HttpError(val)) => Ok(val),
        Err(Error::LambdaError(err)) => Err(err),
    }
}
