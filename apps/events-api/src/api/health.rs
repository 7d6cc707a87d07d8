//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health_detailed;
use serde_json::Value;
use tracing::debug;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// 200 when MongoDB answers a ping, 503 otherwise
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async {
            let status = check_health_detailed(&state.mongo_client).await;
            debug!(
                healthy = status.healthy,
                elapsed_ms = status.response_time.as_millis() as u64,
                "MongoDB readiness ping"
            );
            status.into_result()
        }),
    )];

    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use domain_events::InvalidationBus;
    use mongodb::{Client, options::ClientOptions};
    use std::time::Duration;

    async fn state_with_unreachable_mongo() -> AppState {
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1/?directConnection=true")
            .await
            .unwrap();
        options.server_selection_timeout = Some(Duration::from_millis(200));
        let client = Client::with_options(options).unwrap();

        AppState {
            config: Config {
                app: app_info!(),
                mongodb: MongoConfig::new("mongodb://127.0.0.1:1"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                connect_retries: 0,
            },
            db: client.database("events_ready_test"),
            mongo_client: client,
            invalidation: InvalidationBus::new(4),
        }
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_mongodb() {
        let state = state_with_unreachable_mongo().await;

        let (status, Json(body)) = readiness_check(State(state)).await.unwrap_err();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["mongodb"], "disconnected");
    }
}
