//! Event service layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::filter::EventFilter;
use crate::invalidation::{EventDeleted, InvalidationBus};
use crate::models::{
    CreateEventRequest, EventDocument, EventPage, EventQuery, EventRecord, Page, PopulatedEvent,
    RelatedEventsQuery, parse_object_id,
};
use crate::repository::EventRepository;

/// Event service providing the create, list, fetch and delete operations.
///
/// Every failure is passed through [`EventError::report`] before it is
/// returned to the caller.
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
    invalidation: InvalidationBus,
}

impl<R: EventRepository> Clone for EventService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            invalidation: self.invalidation.clone(),
        }
    }
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            invalidation: InvalidationBus::default(),
        }
    }

    /// Publish deletions on an existing bus instead of a private one
    pub fn with_invalidation(mut self, bus: InvalidationBus) -> Self {
        self.invalidation = bus;
        self
    }

    pub fn invalidation(&self) -> &InvalidationBus {
        &self.invalidation
    }

    /// Create an event organized by `request.user_id`.
    ///
    /// Both the organizer and the category must exist.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, title = %request.event.title))]
    pub async fn create_event(&self, request: CreateEventRequest) -> EventResult<EventRecord> {
        async {
            request.validate()?;
            let organizer_id = parse_object_id("user", &request.user_id)?;
            let category_id = parse_object_id("category", &request.event.category_id)?;

            let organizer = self
                .repository
                .find_organizer(organizer_id)
                .await?
                .ok_or_else(|| EventError::not_found("User", organizer_id))?;
            let category = self
                .repository
                .find_category(category_id)
                .await?
                .ok_or_else(|| EventError::not_found("Category", category_id))?;

            let document = EventDocument::new(request.event, organizer.id, category.id);
            let event = self.repository.insert(document).await?;
            info!(event_id = %event.id, "Event created");

            Ok::<_, EventError>(
                PopulatedEvent {
                    event,
                    organizer: Some(organizer),
                    category: Some(category),
                }
                .into(),
            )
        }
        .await
        .inspect_err(EventError::report)
    }

    /// List events, newest first, optionally filtered by title text and category name.
    ///
    /// A category name that matches no category yields an empty page.
    #[instrument(skip(self))]
    pub async fn get_all_events(&self, query: EventQuery) -> EventResult<EventPage> {
        async {
            query.validate()?;

            let mut conditions = Vec::new();
            if let Some(text) = query.query.as_deref().filter(|q| !q.is_empty()) {
                conditions.push(EventFilter::text(text));
            }
            if let Some(name) = query.category.as_deref().filter(|c| !c.is_empty()) {
                let condition = match self.repository.find_category_by_name(name).await? {
                    Some(category) => EventFilter::category(category.id),
                    None => {
                        debug!(category = name, "No category matches name");
                        EventFilter::unresolved_category(name)
                    }
                };
                conditions.push(condition);
            }

            self.paginate(EventFilter::all(conditions), query.page())
                .await
        }
        .await
        .inspect_err(EventError::report)
    }

    /// Fetch a single event with its references populated
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: ObjectId) -> EventResult<EventRecord> {
        self.repository
            .find_by_id(event_id)
            .await
            .and_then(|event| event.ok_or_else(|| EventError::not_found("Event", event_id)))
            .map(EventRecord::from)
            .inspect_err(EventError::report)
    }

    /// Events sharing a category with `query.event_id`, excluding that event
    #[instrument(skip(self))]
    pub async fn get_events_by_category(
        &self,
        query: RelatedEventsQuery,
    ) -> EventResult<EventPage> {
        async {
            query.validate()?;
            let category_id = parse_object_id("category", &query.category_id)?;
            let event_id = parse_object_id("event", &query.event_id)?;

            let filter = EventFilter::all([
                EventFilter::category(category_id),
                EventFilter::exclude(event_id),
            ]);
            self.paginate(filter, query.page()).await
        }
        .await
        .inspect_err(EventError::report)
    }

    /// Delete an event.
    ///
    /// Publishes [`EventDeleted`] only when a document was removed. Deleting an
    /// unknown id succeeds without a signal.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: ObjectId, path: Option<String>) -> EventResult<()> {
        let deleted = self
            .repository
            .delete(event_id)
            .await
            .inspect_err(EventError::report)?;

        if deleted {
            let receivers = self.invalidation.publish(EventDeleted {
                event_id: event_id.to_hex(),
                path,
            });
            info!(%event_id, receivers, "Event deleted");
        } else {
            debug!(%event_id, "Delete matched no event");
        }

        Ok(())
    }

    /// Fetch one page and the total match count concurrently.
    ///
    /// The two reads are not isolated from each other.
    async fn paginate(&self, filter: EventFilter, page: Page) -> EventResult<EventPage> {
        let (events, matching) = tokio::try_join!(
            self.repository.find_page(&filter, page),
            self.repository.count(&filter),
        )?;

        let data = events.into_iter().map(EventRecord::from).collect();
        Ok(EventPage::new(data, matching, page.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CreateEvent, Organizer};
    use crate::repository::mock::MockEventRepository;
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;
    use mongodb::bson::DateTime;

    fn organizer() -> Organizer {
        Organizer {
            id: ObjectId::new(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    fn category(name: &str) -> Category {
        Category {
            id: ObjectId::new(),
            name: name.to_string(),
        }
    }

    fn create_request(user_id: ObjectId, category_id: ObjectId) -> CreateEventRequest {
        let start = Utc::now() + Duration::days(1);
        CreateEventRequest {
            event: CreateEvent {
                title: "Rust Meetup".to_string(),
                description: "Talks and pizza".to_string(),
                location: "Berlin".to_string(),
                image_url: "https://cdn.example.com/meetup.png".to_string(),
                start_date_time: start,
                end_date_time: start + Duration::hours(3),
                price: "0".to_string(),
                is_free: true,
                url: None,
                category_id: category_id.to_hex(),
            },
            user_id: user_id.to_hex(),
        }
    }

    fn populated(title: &str, category: &Category) -> PopulatedEvent {
        PopulatedEvent {
            event: EventDocument {
                id: ObjectId::new(),
                title: title.to_string(),
                description: String::new(),
                location: String::new(),
                image_url: String::new(),
                start_date_time: DateTime::now(),
                end_date_time: DateTime::now(),
                price: String::new(),
                is_free: true,
                url: String::new(),
                category: category.id,
                organizer: ObjectId::new(),
                created_at: DateTime::now(),
            },
            organizer: None,
            category: Some(category.clone()),
        }
    }

    #[tokio::test]
    async fn test_create_event_uses_resolved_references() {
        let organizer = organizer();
        let tech = category("Tech");
        let (organizer_id, category_id) = (organizer.id, tech.id);

        let mut mock_repo = MockEventRepository::new();
        let found = organizer.clone();
        mock_repo
            .expect_find_organizer()
            .with(eq(organizer_id))
            .returning(move |_| Ok(Some(found.clone())));
        let found = tech.clone();
        mock_repo
            .expect_find_category()
            .with(eq(category_id))
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo
            .expect_insert()
            .withf(move |doc| doc.organizer == organizer_id && doc.category == category_id)
            .times(1)
            .returning(Ok);

        let service = EventService::new(mock_repo);
        let record = service
            .create_event(create_request(organizer_id, category_id))
            .await
            .unwrap();

        assert_eq!(record.title, "Rust Meetup");
        assert_eq!(record.organizer.unwrap().id, organizer_id.to_hex());
        assert_eq!(record.category.unwrap().name, "Tech");
    }

    #[tokio::test]
    async fn test_create_event_unknown_user_persists_nothing() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_organizer().returning(|_| Ok(None));
        mock_repo.expect_find_category().never();
        mock_repo.expect_insert().never();

        let service = EventService::new(mock_repo);
        let result = service
            .create_event(create_request(ObjectId::new(), ObjectId::new()))
            .await;

        assert!(matches!(
            result,
            Err(EventError::NotFound { entity: "User", .. })
        ));
    }

    #[tokio::test]
    async fn test_create_event_unknown_category_persists_nothing() {
        let organizer = organizer();
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_organizer()
            .returning(move |_| Ok(Some(organizer.clone())));
        mock_repo.expect_find_category().returning(|_| Ok(None));
        mock_repo.expect_insert().never();

        let service = EventService::new(mock_repo);
        let result = service
            .create_event(create_request(ObjectId::new(), ObjectId::new()))
            .await;

        assert!(matches!(
            result,
            Err(EventError::NotFound {
                entity: "Category",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_event_rejects_malformed_user_id() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_organizer().never();

        let service = EventService::new(mock_repo);
        let mut request = create_request(ObjectId::new(), ObjectId::new());
        request.user_id = "not-an-object-id".to_string();

        let result = service.create_event(request).await;
        assert!(matches!(
            result,
            Err(EventError::InvalidId { field: "user", .. })
        ));
    }

    #[tokio::test]
    async fn test_get_all_events_second_page() {
        let tech = category("Tech");
        let mut mock_repo = MockEventRepository::new();
        let page_events: Vec<PopulatedEvent> =
            (7..=12).map(|i| populated(&format!("event {i}"), &tech)).collect();

        mock_repo
            .expect_find_page()
            .withf(|filter, page| *filter == EventFilter::Any && *page == Page::new(2, 6))
            .returning(move |_, _| Ok(page_events.clone()));
        mock_repo.expect_count().returning(|_| Ok(13));

        let service = EventService::new(mock_repo);
        let page = service
            .get_all_events(EventQuery {
                page: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 6);
        assert_eq!(page.data[0].title, "event 7");
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_get_all_events_combines_text_and_category() {
        let tech = category("Technology");
        let tech_id = tech.id;
        let expected = EventFilter::all([EventFilter::text("rust"), EventFilter::category(tech_id)]);
        let expected_count = expected.clone();

        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_category_by_name()
            .withf(|name| name == "tech")
            .returning(move |_| Ok(Some(tech.clone())));
        mock_repo
            .expect_find_page()
            .withf(move |filter, _| *filter == expected)
            .returning(|_, _| Ok(vec![]));
        mock_repo
            .expect_count()
            .withf(move |filter| *filter == expected_count)
            .returning(|_| Ok(0));

        let service = EventService::new(mock_repo);
        let page = service
            .get_all_events(EventQuery {
                query: Some("rust".to_string()),
                category: Some("tech".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_events_unknown_category_matches_nothing() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_category_by_name()
            .returning(|_| Ok(None));
        mock_repo
            .expect_find_page()
            .withf(|filter, _| *filter == EventFilter::unresolved_category("Nonexistent"))
            .returning(|_, _| Ok(vec![]));
        mock_repo
            .expect_count()
            .withf(|filter| !filter.is_unconstrained())
            .returning(|_| Ok(0));

        let service = EventService::new(mock_repo);
        let page = service
            .get_all_events(EventQuery {
                category: Some("Nonexistent".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_get_all_events_rejects_zero_page() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_page().never();

        let service = EventService::new(mock_repo);
        let result = service
            .get_all_events(EventQuery {
                page: 0,
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_event_not_found() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let service = EventService::new(mock_repo);
        let result = service.get_event(ObjectId::new()).await;

        assert!(matches!(
            result,
            Err(EventError::NotFound { entity: "Event", .. })
        ));
    }

    #[tokio::test]
    async fn test_get_events_by_category_excludes_event() {
        let tech = category("Tech");
        let excluded = ObjectId::new();
        let expected = EventFilter::all([
            EventFilter::category(tech.id),
            EventFilter::exclude(excluded),
        ]);
        let expected_count = expected.clone();

        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_page()
            .withf(move |filter, page| *filter == expected && *page == Page::new(1, 3))
            .returning(|_, _| Ok(vec![]));
        mock_repo
            .expect_count()
            .withf(move |filter| *filter == expected_count)
            .returning(|_| Ok(4));

        let service = EventService::new(mock_repo);
        let page = service
            .get_events_by_category(RelatedEventsQuery::new(tech.id.to_hex(), excluded.to_hex()))
            .await
            .unwrap();

        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_delete_event_signals_once() {
        let id = ObjectId::new();
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));

        let service = EventService::new(mock_repo);
        let mut rx = service.invalidation().subscribe();

        service
            .delete_event(id, Some("/events".to_string()))
            .await
            .unwrap();

        let signal = rx.try_recv().unwrap();
        assert_eq!(signal.event_id, id.to_hex());
        assert_eq!(signal.path.as_deref(), Some("/events"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_silent() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = EventService::new(mock_repo);
        let mut rx = service.invalidation().subscribe();

        assert!(service.delete_event(ObjectId::new(), None).await.is_ok());
        assert!(rx.try_recv().is_err());
    }
}
