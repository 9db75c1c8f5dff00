/// Per-second countdown against a displayed expiry timestamp
///
/// Publishes remaining whole seconds over a watch channel. Presentation
/// only: it never touches `expires_at` or status. Stop it (or drop it)
/// when the view goes away so the ticker cannot outlive its target.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Whole seconds until `expires_at`, clamped at zero
pub fn seconds_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_seconds().max(0)
}

/// Render remaining seconds as `M:SS`, the way the generator card shows it
pub fn format_remaining(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// A running countdown ticker for one expiry timestamp
pub struct Countdown {
    rx: watch::Receiver<i64>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start ticking against `expires_at`, recomputing once per `tick`
    ///
    /// The ticker ends on its own once the countdown reaches zero.
    pub fn start(expires_at: DateTime<Utc>, tick: Duration) -> Self {
        let (tx, rx) = watch::channel(seconds_remaining(expires_at, Utc::now()));
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            // the initial value was published at channel creation
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let left = seconds_remaining(expires_at, Utc::now());
                tx.send_replace(left);
                if left == 0 {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    /// Latest remaining-seconds value
    pub fn remaining(&self) -> i64 {
        *self.rx.borrow()
    }

    /// Whether the countdown has run out
    pub fn is_elapsed(&self) -> bool {
        self.remaining() == 0
    }

    /// Subscribe for change notifications
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.rx.clone()
    }

    /// Stop the ticker
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_seconds_remaining_clamps_at_zero() {
        let now = Utc::now();
        assert_eq!(seconds_remaining(now + ChronoDuration::seconds(90), now), 90);
        assert_eq!(seconds_remaining(now - ChronoDuration::seconds(5), now), 0);
        assert_eq!(seconds_remaining(now, now), 0);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(65), "1:05");
        assert_eq!(format_remaining(600), "10:00");
        assert_eq!(format_remaining(3600), "60:00");
    }

    #[tokio::test]
    async fn test_countdown_publishes_initial_value() {
        let countdown = Countdown::start(
            Utc::now() + ChronoDuration::hours(1),
            Duration::from_secs(1),
        );
        let remaining = countdown.remaining();
        assert!((3598..=3600).contains(&remaining), "got {}", remaining);
        assert!(!countdown.is_elapsed());
        countdown.stop();
    }

    #[tokio::test]
    async fn test_countdown_for_past_expiry_reads_zero_and_ends() {
        let countdown = Countdown::start(
            Utc::now() - ChronoDuration::minutes(1),
            Duration::from_millis(10),
        );
        let mut rx = countdown.subscribe();
        // first recompute publishes the clamped zero and the task ends
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("countdown tick")
            .unwrap();
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_elapsed());
    }
}
