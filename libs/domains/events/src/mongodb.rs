//! MongoDB implementation of EventRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database, IndexModel};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

use crate::error::EventResult;
use crate::filter::EventFilter;
use crate::models::{Category, EventDocument, Organizer, Page, PopulatedEvent};
use crate::repository::EventRepository;

pub const EVENTS_COLLECTION: &str = "events";
pub const USERS_COLLECTION: &str = "users";
pub const CATEGORIES_COLLECTION: &str = "categories";

/// MongoDB-based event repository.
///
/// Reads organizers from `users` and categories from `categories`, but never
/// writes to either.
#[derive(Clone)]
pub struct MongoEventRepository {
    events: Collection<EventDocument>,
    users: Collection<Organizer>,
    categories: Collection<Category>,
}

impl MongoEventRepository {
    /// Create a new MongoDB event repository
    pub fn new(database: &Database) -> Self {
        Self {
            events: database.collection(EVENTS_COLLECTION),
            users: database.collection(USERS_COLLECTION),
            categories: database.collection(CATEGORIES_COLLECTION),
        }
    }

    /// Create indexes for the listing queries
    pub async fn create_indexes(&self) -> EventResult<()> {
        let indexes = vec![
            // Newest-first listing with id tiebreak
            IndexModel::builder()
                .keys(doc! { "created_at": -1, "_id": -1 })
                .build(),
            // Related events by category
            IndexModel::builder()
                .keys(doc! { "category": 1, "created_at": -1 })
                .build(),
            IndexModel::builder().keys(doc! { "organizer": 1 }).build(),
        ];

        self.events.create_indexes(indexes).await?;
        info!(collection = EVENTS_COLLECTION, "Event indexes ensured");
        Ok(())
    }

    fn sort_order() -> Document {
        doc! { "created_at": -1, "_id": -1 }
    }

    fn organizer_projection() -> Document {
        doc! { "first_name": 1, "last_name": 1 }
    }

    fn category_projection() -> Document {
        doc! { "name": 1 }
    }

    async fn organizers_by_id(
        &self,
        ids: Vec<ObjectId>,
    ) -> EventResult<HashMap<ObjectId, Organizer>> {
        let options = FindOptions::builder()
            .projection(Self::organizer_projection())
            .build();
        let cursor = self
            .users
            .find(doc! { "_id": { "$in": ids } })
            .with_options(options)
            .await?;
        let organizers: Vec<Organizer> = cursor.try_collect().await?;
        Ok(organizers.into_iter().map(|o| (o.id, o)).collect())
    }

    async fn categories_by_id(
        &self,
        ids: Vec<ObjectId>,
    ) -> EventResult<HashMap<ObjectId, Category>> {
        let options = FindOptions::builder()
            .projection(Self::category_projection())
            .build();
        let cursor = self
            .categories
            .find(doc! { "_id": { "$in": ids } })
            .with_options(options)
            .await?;
        let categories: Vec<Category> = cursor.try_collect().await?;
        Ok(categories.into_iter().map(|c| (c.id, c)).collect())
    }

    /// Resolve organizer and category references with one `$in` query each
    async fn populate(&self, events: Vec<EventDocument>) -> EventResult<Vec<PopulatedEvent>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let organizer_ids: HashSet<ObjectId> = events.iter().map(|e| e.organizer).collect();
        let category_ids: HashSet<ObjectId> = events.iter().map(|e| e.category).collect();

        let (organizers, categories) = tokio::try_join!(
            self.organizers_by_id(organizer_ids.into_iter().collect()),
            self.categories_by_id(category_ids.into_iter().collect()),
        )?;

        Ok(events
            .into_iter()
            .map(|event| PopulatedEvent {
                organizer: organizers.get(&event.organizer).cloned(),
                category: categories.get(&event.category).cloned(),
                event,
            })
            .collect())
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self))]
    async fn find_organizer(&self, id: ObjectId) -> EventResult<Option<Organizer>> {
        let organizer = self
            .users
            .find_one(doc! { "_id": id })
            .projection(Self::organizer_projection())
            .await?;
        Ok(organizer)
    }

    #[instrument(skip(self))]
    async fn find_category(&self, id: ObjectId) -> EventResult<Option<Category>> {
        let category = self.categories.find_one(doc! { "_id": id }).await?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn find_category_by_name(&self, name: &str) -> EventResult<Option<Category>> {
        let filter = doc! { "name": { "$regex": regex::escape(name), "$options": "i" } };
        let category = self.categories.find_one(filter).await?;
        Ok(category)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert(&self, event: EventDocument) -> EventResult<EventDocument> {
        self.events.insert_one(&event).await?;
        info!(event_id = %event.id, "Event stored in MongoDB");
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> EventResult<Option<PopulatedEvent>> {
        let Some(event) = self.events.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        Ok(self.populate(vec![event]).await?.pop())
    }

    #[instrument(skip(self, filter), fields(page = page.number, size = page.size))]
    async fn find_page(
        &self,
        filter: &EventFilter,
        page: Page,
    ) -> EventResult<Vec<PopulatedEvent>> {
        let options = FindOptions::builder()
            .sort(Self::sort_order())
            .skip(page.skip())
            .limit(page.limit())
            .build();

        let cursor = self
            .events
            .find(filter.to_document())
            .with_options(options)
            .await?;
        let events: Vec<EventDocument> = cursor.try_collect().await?;

        self.populate(events).await
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &EventFilter) -> EventResult<u64> {
        let count = self.events.count_documents(filter.to_document()).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> EventResult<bool> {
        let result = self.events.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
