use mongodb::Client;
use std::time::{Duration, Instant};

use super::connector::ping;

/// Outcome of a timed ping
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Driver error text when unhealthy
    pub message: Option<String>,
    pub response_time: Duration,
}

impl HealthStatus {
    /// Shape expected by readiness aggregation: `Err` carries the driver message
    pub fn into_result(self) -> Result<(), String> {
        if self.healthy {
            Ok(())
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "ping failed".to_string()))
        }
    }
}

/// Ping with timing and the failure message
pub async fn check_health_detailed(client: &Client) -> HealthStatus {
    let start = Instant::now();
    let result = ping(client).await;

    HealthStatus {
        healthy: result.is_ok(),
        message: result.err().map(|e| e.to_string()),
        response_time: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ClientOptions;

    async fn unreachable_client() -> Client {
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1/?directConnection=true")
            .await
            .unwrap();
        options.server_selection_timeout = Some(Duration::from_millis(200));
        Client::with_options(options).unwrap()
    }

    #[tokio::test]
    async fn test_check_health_detailed_reports_error() {
        let status = check_health_detailed(&unreachable_client().await).await;
        assert!(!status.healthy);
        assert!(status.message.is_some());
        assert!(status.response_time < Duration::from_secs(5));
    }

    #[test]
    fn test_into_result_carries_message() {
        let healthy = HealthStatus {
            healthy: true,
            message: None,
            response_time: Duration::from_millis(3),
        };
        assert_eq!(healthy.into_result(), Ok(()));

        let down = HealthStatus {
            healthy: false,
            message: Some("connection refused".to_string()),
            response_time: Duration::from_millis(200),
        };
        assert_eq!(down.into_result(), Err("connection refused".to_string()));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_check_health_with_container() {
        let mongo = test_utils::TestMongo::new().await;
        let status = check_health_detailed(&mongo.client()).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }
}
