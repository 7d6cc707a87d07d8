use mongodb::{
    Client,
    bson::doc,
    options::ClientOptions,
};
use tracing::info;

use super::MongoConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Parse the connection string and apply pool and timeout settings
pub async fn client_options(config: &MongoConfig) -> DatabaseResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}

/// Round-trip a `ping` against the admin database
pub async fn ping(client: &Client) -> DatabaseResult<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(())
}

/// Build a client from config and verify the server answers
///
/// The driver connects lazily, so the ping is what surfaces a bad host or
/// bad credentials at startup rather than on the first request.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "events");
/// let client = connect_from_config(&config).await?;
/// let db = client.database(config.database());
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> DatabaseResult<Client> {
    info!(url = %config.redacted_url(), "Connecting to MongoDB");

    let client = Client::with_options(client_options(config).await?)?;

    ping(&client)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(database = %config.database, "Connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] with exponential backoff
///
/// `None` uses the default [`RetryConfig`].
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config_with_retry};
/// use database::common::RetryConfig;
///
/// let config = MongoConfig::from_env()?;
/// let client = connect_from_config_with_retry(&config, Some(RetryConfig::new().with_max_retries(5))).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    match retry_config {
        Some(schedule) => retry_with_backoff(|| connect_from_config(config), schedule).await,
        None => retry(|| connect_from_config(config)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_client_options_apply_config() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "events")
            .with_app_name("events-api")
            .with_pool_size(20, 2)
            .with_server_selection_timeout(Duration::from_secs(3));

        let options = client_options(&config).await.unwrap();

        assert_eq!(options.max_pool_size, Some(20));
        assert_eq!(options.min_pool_size, Some(2));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.app_name.as_deref(), Some("events-api"));
    }

    #[tokio::test]
    async fn test_client_options_reject_bad_scheme() {
        let config = MongoConfig::new("postgres://localhost:5432");
        let err = client_options(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Mongo(_)));
    }

    #[tokio::test]
    async fn test_connect_fails_when_server_is_unreachable() {
        let config = MongoConfig::new("mongodb://127.0.0.1:1/?directConnection=true")
            .with_server_selection_timeout(Duration::from_millis(200));

        let err = connect_from_config_with_retry(
            &config,
            Some(
                RetryConfig::new()
                    .with_max_retries(1)
                    .with_initial_delay(Duration::from_millis(10))
                    .without_jitter(),
            ),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DatabaseError::ConnectionFailed(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_connect_from_config_with_container() {
        let mongo = test_utils::TestMongo::new().await;
        let config = MongoConfig::with_database(mongo.connection_string(), "connector_test");

        let client = connect_from_config(&config).await.unwrap();
        ping(&client).await.unwrap();
    }
}
