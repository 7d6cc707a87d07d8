use crate::state::AppState;
use axum::Router;
use domain_events::{EventService, MongoEventRepository};
use tracing::info;

/// Events routes backed by MongoDB, publishing deletions on the shared bus
pub fn router(state: &AppState) -> Router {
    let repository = MongoEventRepository::new(&state.db);
    let service = EventService::new(repository).with_invalidation(state.invalidation.clone());

    domain_events::handlers::router(service)
}

/// Create the event collection indexes; safe to run on every start
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoEventRepository::new(db)
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}
