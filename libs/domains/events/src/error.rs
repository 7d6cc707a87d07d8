use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::Error as ObjectIdError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use tracing::{debug, error, warn};

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {field} id '{value}'")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: ObjectIdError,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EventResult<T> = Result<T, EventError>;

impl EventError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shared reporting hook: every failed operation passes through here
    /// before the error is handed back to the caller.
    pub fn report(&self) {
        match self {
            Self::NotFound { .. } | Self::InvalidId { .. } | Self::Validation(_) => {
                debug!(error = %self, "Event operation rejected");
            }
            Self::Conflict(_) => warn!(error = %self, "Event operation conflicted"),
            Self::Database(_) | Self::Internal(_) => error!(error = %self, "Event operation failed"),
        }
    }
}

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound { .. } => AppError::NotFound(err.to_string()),
            EventError::InvalidId { source, .. } => AppError::InvalidObjectId(source),
            EventError::Validation(errors) => AppError::ValidationError(errors),
            EventError::Conflict(msg) => AppError::Conflict(msg),
            EventError::Database(msg) => AppError::Database(msg),
            EventError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY =>
            {
                EventError::Conflict(write_error.message.clone())
            }
            ErrorKind::BsonDeserialization(e) => {
                EventError::Internal(format!("failed to decode event document: {e}"))
            }
            ErrorKind::BsonSerialization(e) => {
                EventError::Internal(format!("failed to encode event document: {e}"))
            }
            _ => EventError::Database(err.to_string()),
        }
    }
}
