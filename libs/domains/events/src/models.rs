//! Event domain models
//!
//! Three layers live here:
//! - persistence documents (`EventDocument`, `Organizer`, `Category`) as stored in MongoDB
//! - input DTOs (`CreateEvent`, `CreateEventRequest`, query parameter structs)
//! - output records (`EventRecord`, `EventPage`) with string ids and RFC 3339 timestamps

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{EventError, EventResult};

/// Page size used by the general listing when none is given
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Page size used by the related-events listing when none is given
pub const RELATED_PAGE_SIZE: u32 = 3;

/// Upper bound accepted for any page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Event as stored in the `events` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    pub start_date_time: bson::DateTime,
    pub end_date_time: bson::DateTime,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub url: String,
    /// Reference into the `categories` collection
    pub category: ObjectId,
    /// Reference into the `users` collection
    pub organizer: ObjectId,
    /// Ordering timestamp for listings
    pub created_at: bson::DateTime,
}

impl EventDocument {
    /// Build a new document from validated input and already-resolved references
    pub fn new(input: CreateEvent, organizer: ObjectId, category: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            title: input.title,
            description: input.description,
            location: input.location,
            image_url: input.image_url,
            start_date_time: to_bson_datetime(input.start_date_time),
            end_date_time: to_bson_datetime(input.end_date_time),
            price: input.price,
            is_free: input.is_free,
            url: input.url.unwrap_or_default(),
            category,
            organizer,
            created_at: bson::DateTime::now(),
        }
    }
}

/// Organizer projection of a document in the `users` collection.
///
/// Only these three fields are ever read from users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Document in the `categories` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

/// Event with its organizer and category references resolved.
///
/// A reference is `None` when the referenced document no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedEvent {
    pub event: EventDocument,
    pub organizer: Option<Organizer>,
    pub category: Option<Category>,
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_schedule"))]
pub struct CreateEvent {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 400))]
    pub location: String,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub is_free: bool,
    #[validate(url(message = "URL must be a valid URL"))]
    pub url: Option<String>,
    /// Hex ObjectId of an existing category
    #[validate(length(equal = 24, message = "Category id must be a 24 character hex string"))]
    pub category_id: String,
}

fn validate_schedule(event: &CreateEvent) -> Result<(), ValidationError> {
    if event.end_date_time < event.start_date_time {
        let mut error = ValidationError::new("schedule");
        error.message = Some("End date must not be before the start date".into());
        return Err(error);
    }
    Ok(())
}

/// Create request: the event plus the organizing user's id
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(nested)]
    pub event: CreateEvent,
    /// Hex ObjectId of the organizing user
    pub user_id: String,
}

/// Query parameters for the general event listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Case-insensitive substring of the title
    #[serde(default)]
    pub query: Option<String>,
    /// Case-insensitive substring of a category name
    #[serde(default)]
    pub category: Option<String>,
    /// Page size (default 6)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub limit: u32,
    /// 1-indexed page number
    #[serde(default = "first_page")]
    #[validate(range(min = 1))]
    pub page: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            limit: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl EventQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Query parameters for events related to a given event by category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelatedEventsQuery {
    /// Hex ObjectId of the category to match
    pub category_id: String,
    /// Hex ObjectId of the event to leave out
    pub event_id: String,
    /// Page size (default 3)
    #[serde(default = "related_page_size")]
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    pub limit: u32,
    /// 1-indexed page number
    #[serde(default = "first_page")]
    #[validate(range(min = 1))]
    pub page: u32,
}

impl RelatedEventsQuery {
    pub fn new(category_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            event_id: event_id.into(),
            limit: RELATED_PAGE_SIZE,
            page: 1,
        }
    }

    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Query parameters for deletion
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteEventParams {
    /// Route to invalidate once the event is gone
    #[serde(default)]
    pub path: Option<String>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn related_page_size() -> u32 {
    RELATED_PAGE_SIZE
}

fn first_page() -> u32 {
    1
}

/// A 1-indexed page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// Documents to skip before this page starts
    pub fn skip(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Reduced organizer as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrganizerSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Organizer> for OrganizerSummary {
    fn from(organizer: Organizer) -> Self {
        Self {
            id: organizer.id.to_hex(),
            first_name: organizer.first_name,
            last_name: organizer.last_name,
        }
    }
}

/// Reduced category as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
}

impl From<Category> for CategorySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_hex(),
            name: category.name,
        }
    }
}

/// Plain event record handed to callers.
///
/// Carries no driver types: ids are hex strings, timestamps are UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub price: String,
    pub is_free: bool,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub organizer: Option<OrganizerSummary>,
    pub category: Option<CategorySummary>,
}

impl From<PopulatedEvent> for EventRecord {
    fn from(populated: PopulatedEvent) -> Self {
        let PopulatedEvent {
            event,
            organizer,
            category,
        } = populated;

        Self {
            id: event.id.to_hex(),
            title: event.title,
            description: event.description,
            location: event.location,
            image_url: event.image_url,
            start_date_time: from_bson_datetime(event.start_date_time),
            end_date_time: from_bson_datetime(event.end_date_time),
            price: event.price,
            is_free: event.is_free,
            url: event.url,
            created_at: from_bson_datetime(event.created_at),
            organizer: organizer.map(Into::into),
            category: category.map(Into::into),
        }
    }
}

/// One page of event records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventPage {
    pub data: Vec<EventRecord>,
    /// `ceil(matching / page size)`
    pub total_pages: u64,
}

impl EventPage {
    pub fn new(data: Vec<EventRecord>, matching: u64, page_size: u32) -> Self {
        Self {
            data,
            total_pages: matching.div_ceil(u64::from(page_size.max(1))),
        }
    }
}

/// Parse a hex ObjectId supplied by a caller
pub fn parse_object_id(field: &'static str, raw: &str) -> EventResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|source| EventError::InvalidId {
        field,
        value: raw.to_string(),
        source,
    })
}

pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub(crate) fn from_bson_datetime(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}
