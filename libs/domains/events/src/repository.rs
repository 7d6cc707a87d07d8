//! Event repository trait

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{EventError, EventResult};
use crate::filter::EventFilter;
use crate::models::{Category, EventDocument, Organizer, Page, PopulatedEvent};

/// Persistence operations behind the event service.
///
/// Listing methods return events with organizer and category populated,
/// ordered by `created_at` descending (newest first, ties by id descending).
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Organizer projection of a user, if the user exists
    async fn find_organizer(&self, id: ObjectId) -> EventResult<Option<Organizer>>;

    async fn find_category(&self, id: ObjectId) -> EventResult<Option<Category>>;

    /// First category whose name contains `name`, ignoring case
    async fn find_category_by_name(&self, name: &str) -> EventResult<Option<Category>>;

    async fn insert(&self, event: EventDocument) -> EventResult<EventDocument>;

    async fn find_by_id(&self, id: ObjectId) -> EventResult<Option<PopulatedEvent>>;

    async fn find_page(&self, filter: &EventFilter, page: Page)
    -> EventResult<Vec<PopulatedEvent>>;

    async fn count(&self, filter: &EventFilter) -> EventResult<u64>;

    /// Returns whether a document was actually removed
    async fn delete(&self, id: ObjectId) -> EventResult<bool>;
}

/// In-memory implementation of EventRepository (for development/testing)
///
/// Users and categories are owned elsewhere; seed them with
/// [`seed_organizer`](Self::seed_organizer) and [`seed_category`](Self::seed_category).
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<ObjectId, EventDocument>>>,
    organizers: Arc<RwLock<HashMap<ObjectId, Organizer>>>,
    categories: Arc<RwLock<HashMap<ObjectId, Category>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_organizer(&self, first_name: &str, last_name: &str) -> Organizer {
        let organizer = Organizer {
            id: ObjectId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.organizers
            .write()
            .await
            .insert(organizer.id, organizer.clone());
        organizer
    }

    pub async fn seed_category(&self, name: &str) -> Category {
        let category = Category {
            id: ObjectId::new(),
            name: name.to_string(),
        };
        self.categories
            .write()
            .await
            .insert(category.id, category.clone());
        category
    }

    async fn populate(&self, event: EventDocument) -> PopulatedEvent {
        let organizer = self.organizers.read().await.get(&event.organizer).cloned();
        let category = self.categories.read().await.get(&event.category).cloned();
        PopulatedEvent {
            event,
            organizer,
            category,
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_organizer(&self, id: ObjectId) -> EventResult<Option<Organizer>> {
        Ok(self.organizers.read().await.get(&id).cloned())
    }

    async fn find_category(&self, id: ObjectId) -> EventResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> EventResult<Option<Category>> {
        let needle = name.to_lowercase();
        let categories = self.categories.read().await;

        // Lowest id first, the same order MongoDB's natural scan tends to give
        let mut matching: Vec<&Category> = categories
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();
        matching.sort_by_key(|c| c.id);

        Ok(matching.first().map(|c| (*c).clone()))
    }

    async fn insert(&self, event: EventDocument) -> EventResult<EventDocument> {
        let mut events = self.events.write().await;

        if events.contains_key(&event.id) {
            return Err(EventError::Conflict(format!(
                "event {} already exists",
                event.id
            )));
        }

        events.insert(event.id, event.clone());
        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn find_by_id(&self, id: ObjectId) -> EventResult<Option<PopulatedEvent>> {
        let event = self.events.read().await.get(&id).cloned();
        match event {
            Some(event) => Ok(Some(self.populate(event).await)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: &EventFilter,
        page: Page,
    ) -> EventResult<Vec<PopulatedEvent>> {
        let mut matching: Vec<EventDocument> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        matching.sort_by_key(|e| Reverse((e.created_at, e.id)));

        let window = matching
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.size as usize);

        let mut result = Vec::new();
        for event in window {
            result.push(self.populate(event).await);
        }
        Ok(result)
    }

    async fn count(&self, filter: &EventFilter) -> EventResult<u64> {
        let events = self.events.read().await;
        Ok(events.values().filter(|e| filter.matches(e)).count() as u64)
    }

    async fn delete(&self, id: ObjectId) -> EventResult<bool> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub EventRepository {}

        #[async_trait]
        impl EventRepository for EventRepository {
            async fn find_organizer(&self, id: ObjectId) -> EventResult<Option<Organizer>>;
            async fn find_category(&self, id: ObjectId) -> EventResult<Option<Category>>;
            async fn find_category_by_name(&self, name: &str) -> EventResult<Option<Category>>;
            async fn insert(&self, event: EventDocument) -> EventResult<EventDocument>;
            async fn find_by_id(&self, id: ObjectId) -> EventResult<Option<PopulatedEvent>>;
            async fn find_page(&self, filter: &EventFilter, page: Page) -> EventResult<Vec<PopulatedEvent>>;
            async fn count(&self, filter: &EventFilter) -> EventResult<u64>;
            async fn delete(&self, id: ObjectId) -> EventResult<bool>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    fn event_at(title: &str, category: ObjectId, organizer: ObjectId, millis: i64) -> EventDocument {
        EventDocument {
            id: ObjectId::new(),
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
            image_url: String::new(),
            start_date_time: DateTime::from_millis(millis),
            end_date_time: DateTime::from_millis(millis),
            price: String::new(),
            is_free: true,
            url: String::new(),
            category,
            organizer,
            created_at: DateTime::from_millis(millis),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_populates_references() {
        let repo = InMemoryEventRepository::new();
        let organizer = repo.seed_organizer("Grace", "Hopper").await;
        let category = repo.seed_category("Tech").await;

        let event = event_at("Compilers", category.id, organizer.id, 1_000);
        let id = event.id;
        repo.insert(event).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.organizer, Some(organizer));
        assert_eq!(found.category, Some(category));
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let repo = InMemoryEventRepository::new();
        let event = event_at("Once", ObjectId::new(), ObjectId::new(), 1_000);

        repo.insert(event.clone()).await.unwrap();
        let result = repo.insert(event).await;
        assert!(matches!(result, Err(EventError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_page_orders_newest_first() {
        let repo = InMemoryEventRepository::new();
        let category = ObjectId::new();
        let organizer = ObjectId::new();

        for i in 0..5 {
            repo.insert(event_at(&format!("e{i}"), category, organizer, i * 1_000))
                .await
                .unwrap();
        }

        let first = repo.find_page(&EventFilter::Any, Page::new(1, 2)).await.unwrap();
        let titles: Vec<_> = first.iter().map(|e| e.event.title.as_str()).collect();
        assert_eq!(titles, ["e4", "e3"]);

        let last = repo.find_page(&EventFilter::Any, Page::new(3, 2)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].event.title, "e0");
    }

    #[tokio::test]
    async fn test_find_category_by_name_ignores_case() {
        let repo = InMemoryEventRepository::new();
        let category = repo.seed_category("Technology").await;

        let found = repo.find_category_by_name("TECH").await.unwrap();
        assert_eq!(found, Some(category));
        assert!(repo.find_category_by_name("music").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryEventRepository::new();
        let event = event_at("Gone", ObjectId::new(), ObjectId::new(), 1_000);
        let id = event.id;
        repo.insert(event).await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert_eq!(repo.count(&EventFilter::Any).await.unwrap(), 0);
    }
}
