//! Shared application state passed to route builders.

use domain_events::InvalidationBus;
use mongodb::{Client, Database};

/// Cloned into each router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Pooled client, also pinged by `/api/ready`
    pub mongo_client: Client,
    pub db: Database,
    /// Deletions fan out here to the revalidation subscriber
    pub invalidation: InvalidationBus,
}
