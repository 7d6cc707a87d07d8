//! ObjectId path parameter extractor with automatic validation.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;

/// Extractor for MongoDB ObjectId path parameters.
///
/// Parses the single path segment as a 24 character hex ObjectId and rejects
/// with `400 INVALID_OBJECT_ID` otherwise.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::ObjectIdPath;
///
/// async fn get_event(ObjectIdPath(id): ObjectIdPath) -> String {
///     format!("Event ID: {}", id)
/// }
///
/// let app = Router::new().route("/events/{id}", get(get_event));
/// ```
pub struct ObjectIdPath(pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        ObjectId::parse_str(&id)
            .map(ObjectIdPath)
            .map_err(|e| AppError::InvalidObjectId(e).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn echo(ObjectIdPath(id): ObjectIdPath) -> String {
        id.to_hex()
    }

    fn app() -> Router {
        Router::new().route("/{id}", get(echo))
    }

    #[tokio::test]
    async fn test_valid_object_id() {
        let id = ObjectId::new();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", id.to_hex()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_object_id() {
        let response = app()
            .oneshot(Request::builder().uri("/123").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
