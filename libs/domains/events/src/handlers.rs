use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ObjectIdPath, ValidatedJson,
    errors::responses::{
        BadRequestObjectIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EventResult;
use crate::models::{
    CategorySummary, CreateEvent, CreateEventRequest, DeleteEventParams, EventPage, EventQuery,
    EventRecord, OrganizerSummary, RelatedEventsQuery,
};
use crate::repository::EventRepository;
use crate::service::EventService;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(list_events, create_event, related_events, get_event, delete_event),
    components(
        schemas(
            EventRecord,
            EventPage,
            CreateEvent,
            CreateEventRequest,
            OrganizerSummary,
            CategorySummary
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestObjectIdResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Events", description = "Event listing and management (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the events router with all HTTP endpoints
pub fn router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/related", get(related_events))
        .route("/{id}", get(get_event).delete(delete_event))
        .with_state(shared_service)
}

/// List events, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Events",
    params(EventQuery),
    responses(
        (status = 200, description = "Page of events", body = EventPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(query): Query<EventQuery>,
) -> EventResult<Json<EventPage>> {
    let page = service.get_all_events(query).await?;
    Ok(Json(page))
}

/// Create an event on behalf of an organizer
#[utoipa::path(
    post,
    path = "",
    tag = "Events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = EventRecord),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Other events in the same category
#[utoipa::path(
    get,
    path = "/related",
    tag = "Events",
    params(RelatedEventsQuery),
    responses(
        (status = 200, description = "Page of related events", body = EventPage),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn related_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(query): Query<RelatedEventsQuery>,
) -> EventResult<Json<EventPage>> {
    let page = service.get_events_by_category(query).await?;
    Ok(Json(page))
}

/// Get an event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = String, Path, description = "Event ObjectId (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event found", body = EventRecord),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
) -> EventResult<Json<EventRecord>> {
    let event = service.get_event(id).await?;
    Ok(Json(event))
}

/// Delete an event.
///
/// Unknown ids are not an error; the response is 204 either way.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = String, Path, description = "Event ObjectId (24 hex characters)"),
        DeleteEventParams
    ),
    responses(
        (status = 204, description = "Event deleted or already absent"),
        (status = 400, response = BadRequestObjectIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ObjectIdPath(id): ObjectIdPath,
    Query(params): Query<DeleteEventParams>,
) -> EventResult<impl IntoResponse> {
    service.delete_event(id, params.path).await?;
    Ok(StatusCode::NO_CONTENT)
}
