//! Events Domain
//!
//! Data access for community events stored in MongoDB. Events reference an
//! organizer (a document in `users`) and a category (a document in
//! `categories`); both are resolved into small summaries when events are read.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────────┐
//! │   Service   │ ───► │ InvalidationBus  │  ← EventDeleted signals
//! └──────┬──────┘      └──────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Documents, DTOs, EventFilter
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_events::{handlers, MongoEventRepository, EventService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("events");
//!
//! let repository = MongoEventRepository::new(&db);
//! repository.create_indexes().await?;
//! let service = EventService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod handlers;
pub mod invalidation;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{EventError, EventResult};
pub use filter::{CategoryMatch, EventFilter};
pub use handlers::ApiDoc;
pub use invalidation::{EventDeleted, InvalidationBus};
pub use models::{
    CategorySummary, CreateEvent, CreateEventRequest, DeleteEventParams, EventPage, EventQuery,
    EventRecord, OrganizerSummary, RelatedEventsQuery,
};
pub use self::mongodb::MongoEventRepository;
pub use repository::{EventRepository, InMemoryEventRepository};
pub use service::EventService;
