//! Typed filter expression for event queries.
//!
//! Filters are built from caller input, then either rendered to a MongoDB
//! query document or evaluated against documents held in memory. Both
//! renderings must agree.

use mongodb::bson::{Bson, Document, doc, oid::ObjectId};

use crate::models::EventDocument;

/// How an event's category is constrained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMatch {
    /// Category resolved to this id
    Id(ObjectId),
    /// A category name was given but no category matched it; matches no event
    Unresolved(String),
}

/// Filter over the `events` collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// No constraint
    #[default]
    Any,
    /// Case-insensitive substring of the title; empty text is unconstrained
    TextMatch(String),
    CategoryMatch(CategoryMatch),
    /// Every event except this one
    ExcludeId(ObjectId),
    /// All parts must hold
    And(Vec<EventFilter>),
}

impl EventFilter {
    /// Title contains `text`, ignoring case
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextMatch(text.into())
    }

    pub fn category(id: ObjectId) -> Self {
        Self::CategoryMatch(CategoryMatch::Id(id))
    }

    /// Category lookup by `name` found nothing
    pub fn unresolved_category(name: impl Into<String>) -> Self {
        Self::CategoryMatch(CategoryMatch::Unresolved(name.into()))
    }

    pub fn exclude(id: ObjectId) -> Self {
        Self::ExcludeId(id)
    }

    /// Conjunction of `parts`, collapsing trivial cases
    pub fn all(parts: impl IntoIterator<Item = EventFilter>) -> Self {
        let mut parts: Vec<EventFilter> = parts
            .into_iter()
            .filter(|part| !part.is_unconstrained())
            .collect();

        match parts.len() {
            0 => Self::Any,
            1 => parts.remove(0),
            _ => Self::And(parts),
        }
    }

    /// True when the filter accepts every event
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::Any => true,
            Self::TextMatch(text) => text.is_empty(),
            Self::And(parts) => parts.iter().all(Self::is_unconstrained),
            Self::CategoryMatch(_) | Self::ExcludeId(_) => false,
        }
    }

    /// Render as a MongoDB query document
    pub fn to_document(&self) -> Document {
        match self {
            Self::Any => doc! {},
            Self::TextMatch(text) if text.is_empty() => doc! {},
            Self::TextMatch(text) => doc! {
                "title": { "$regex": regex::escape(text), "$options": "i" }
            },
            Self::CategoryMatch(CategoryMatch::Id(id)) => doc! { "category": *id },
            // `$in: []` never matches, so the listing comes back empty
            Self::CategoryMatch(CategoryMatch::Unresolved(_)) => doc! {
                "category": { "$in": Vec::<Bson>::new() }
            },
            Self::ExcludeId(id) => doc! { "_id": { "$ne": *id } },
            Self::And(parts) => {
                let mut rendered: Vec<Document> = parts
                    .iter()
                    .map(Self::to_document)
                    .filter(|d| !d.is_empty())
                    .collect();

                match rendered.len() {
                    0 => doc! {},
                    1 => rendered.remove(0),
                    _ => doc! { "$and": rendered },
                }
            }
        }
    }

    /// Evaluate against a document in memory
    pub fn matches(&self, event: &EventDocument) -> bool {
        match self {
            Self::Any => true,
            Self::TextMatch(text) => event.title.to_lowercase().contains(&text.to_lowercase()),
            Self::CategoryMatch(CategoryMatch::Id(id)) => event.category == *id,
            Self::CategoryMatch(CategoryMatch::Unresolved(_)) => false,
            Self::ExcludeId(id) => event.id != *id,
            Self::And(parts) => parts.iter().all(|part| part.matches(event)),
        }
    }
}
