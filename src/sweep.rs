/// Periodic expiry sweep
///
/// Reclassifies addresses whose expiry timestamp has passed. The sweep is
/// the only writer of derived status, and it is idempotent, so the coarse
/// cadence just bounds how stale the classification can get.

use crate::store::SharedStore;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawn the sweep loop
///
/// Runs until a value arrives on `shutdown` (or its sender is dropped).
pub fn spawn_expiry_sweep(
    store: SharedStore,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    store.write().await.sweep_expirations(Utc::now());
                }
                _ = shutdown.changed() => break,
            }
        }
    })
}
