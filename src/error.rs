use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised by the persistence core.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to start database storage: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("unable to stop database storage: {message}")]
    Shutdown {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("database storage is not connected")]
    NotReady,

    #[error(transparent)]
    Query(#[from] DbErr),
}

impl StorageError {
    pub fn connection(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection { message: message.into(), source: Some(source.into()) }
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown { message: message.into(), source: None }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage failure while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };

        let message = match &self {
            AppError::Storage(_) => "internal storage error".to_string(),
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
