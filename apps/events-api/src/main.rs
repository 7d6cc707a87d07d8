use axum_helpers::server::{ShutdownCoordinator, create_production_app, health_router};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use domain_events::InvalidationBus;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let retry = RetryConfig::new().with_max_retries(config.connect_retries);
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, Some(retry)).await?;
    let db = mongo_client.database(config.mongodb.database());

    api::events::init_indexes(&db).await?;

    let state = AppState {
        config,
        mongo_client,
        db,
        invalidation: InvalidationBus::default(),
    };

    // Subscribe before serving so no deletion goes unobserved
    let coordinator = ShutdownCoordinator::default();
    let revalidation =
        api::revalidation::spawn(state.invalidation.subscribe(), coordinator.clone());

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;
    let app = router.merge(health_router(state.config.app));

    info!("Starting Events API with graceful shutdown (30s timeout)");

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        coordinator,
        async move {
            if let Ok(handled) = revalidation.await {
                info!(handled, "Revalidation subscriber stopped");
            }
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Events API shutdown complete");
    Ok(())
}
