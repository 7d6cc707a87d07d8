//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with the standard [`ErrorResponse`](crate::ErrorResponse)
//! body so handlers never format their own 400s.

pub mod object_id_path;
pub mod validated_json;

pub use object_id_path::ObjectIdPath;
pub use validated_json::ValidatedJson;
