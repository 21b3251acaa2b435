use mongodb::Client;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::health::check_health;
use crate::common::ConnectionStatus;

/// Change observed by one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Restored,
    Lost,
}

/// Store a probe result in `status` and report what changed.
pub fn record_probe(status: &ConnectionStatus, healthy: bool) -> Transition {
    match (status.mark(healthy), healthy) {
        (false, true) => Transition::Restored,
        (true, false) => Transition::Lost,
        _ => Transition::Unchanged,
    }
}

/// Handle to the background probe task
pub struct LivenessMonitor {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl LivenessMonitor {
    /// Stop probing and wait for the task to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// Ping the server every `interval` and keep `status` current.
///
/// This task is the only writer of `status` after startup.
pub fn spawn_liveness_monitor(
    client: Client,
    status: ConnectionStatus,
    interval: Duration,
) -> LivenessMonitor {
    spawn_liveness_monitor_with(client, status, interval, || async {})
}

/// Like [`spawn_liveness_monitor`], running `on_restore` each time the
/// connection comes back. Probing pauses until it completes.
pub fn spawn_liveness_monitor_with<F, Fut>(
    client: Client,
    status: ConnectionStatus,
    interval: Duration,
    on_restore: F,
) -> LivenessMonitor
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (stop, mut stopped) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stopped.changed() => break,
            }

            let transition = record_probe(&status, check_health(&client).await);
            react(transition, &on_restore).await;
        }

        info!("Liveness monitor stopped");
    });

    LivenessMonitor { stop, handle }
}

async fn react<F, Fut>(transition: Transition, on_restore: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    match transition {
        Transition::Restored => {
            info!("MongoDB connection restored");
            on_restore().await;
        }
        Transition::Lost => warn!("MongoDB connection lost, degraded mode until it returns"),
        Transition::Unchanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_record_probe_transitions() {
        let status = ConnectionStatus::disconnected();

        assert_eq!(record_probe(&status, false), Transition::Unchanged);
        assert_eq!(record_probe(&status, true), Transition::Restored);
        assert!(status.is_connected());
        assert_eq!(record_probe(&status, true), Transition::Unchanged);
        assert_eq!(record_probe(&status, false), Transition::Lost);
        assert!(!status.is_connected());
    }

    #[tokio::test]
    async fn test_restore_hook_runs_only_on_restored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            }
        };

        let status = ConnectionStatus::disconnected();
        for healthy in [false, true, true, false, true] {
            react(record_probe(&status, healthy), &hook).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_monitor_without_restore_skips_hook() {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100")
            .await
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);

        let monitor = spawn_liveness_monitor_with(
            client,
            ConnectionStatus::disconnected(),
            Duration::from_millis(20),
            move || {
                let calls = Arc::clone(&hook_calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        monitor.stop().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_monitor_marks_unreachable_server_and_stops() {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100")
            .await
            .unwrap();
        let status = ConnectionStatus::connected();

        let monitor = spawn_liveness_monitor(client, status.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(400)).await;
        monitor.stop().await;

        assert!(!status.is_connected());
    }
}
