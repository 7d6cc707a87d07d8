//! Cache revalidation driven by event deletions.
//!
//! The subscriber reacts to every [`EventDeleted`] on the bus by revalidating
//! the route the caller named. Rendering is not cached inside this process,
//! so revalidating is logging the path for the edge cache to pick up.

use axum_helpers::server::ShutdownCoordinator;
use domain_events::EventDeleted;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Run [`run`] on its own task
pub fn spawn(
    rx: broadcast::Receiver<EventDeleted>,
    shutdown: ShutdownCoordinator,
) -> JoinHandle<usize> {
    tokio::spawn(run(rx, shutdown))
}

/// Consume signals until shutdown or until every publisher is gone.
///
/// Returns how many signals were handled.
pub async fn run(mut rx: broadcast::Receiver<EventDeleted>, shutdown: ShutdownCoordinator) -> usize {
    let mut handled = 0;

    loop {
        tokio::select! {
            biased;
            received = rx.recv() => match received {
                Ok(signal) => {
                    revalidate(&signal);
                    handled += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Revalidation subscriber lagged, signals dropped");
                }
                Err(RecvError::Closed) => {
                    debug!("Invalidation bus closed");
                    break;
                }
            },
            _ = shutdown.wait_for_shutdown() => break,
        }
    }

    handled
}

fn revalidate(signal: &EventDeleted) {
    match signal.path.as_deref() {
        Some(path) => info!(event_id = %signal.event_id, path, "Revalidating path"),
        None => debug!(event_id = %signal.event_id, "Event deleted, no path to revalidate"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_events::InvalidationBus;

    fn deleted(id: &str, path: Option<&str>) -> EventDeleted {
        EventDeleted {
            event_id: id.to_string(),
            path: path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_handles_signals_until_shutdown() {
        let bus = InvalidationBus::default();
        let shutdown = ShutdownCoordinator::default();
        let task = spawn(bus.subscribe(), shutdown.clone());

        bus.publish(deleted("a", Some("/events")));
        bus.publish(deleted("b", None));
        // Queued signals drain before the shutdown branch is polled
        tokio::task::yield_now().await;
        shutdown.shutdown();

        assert_eq!(task.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stops_when_bus_is_dropped() {
        let bus = InvalidationBus::default();
        let rx = bus.subscribe();
        bus.publish(deleted("a", Some("/")));
        drop(bus);

        assert_eq!(run(rx, ShutdownCoordinator::default()).await, 1);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_running() {
        let bus = InvalidationBus::new(1);
        let rx = bus.subscribe();
        bus.publish(deleted("a", None));
        bus.publish(deleted("b", None));
        drop(bus);

        // "a" was overwritten; only "b" is delivered after the lag notice
        assert_eq!(run(rx, ShutdownCoordinator::default()).await, 1);
    }
}
