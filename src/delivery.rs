/// Simulated inbound delivery
///
/// Every generated address receives one synthetic verification message
/// after a short delay, standing in for "mail eventually arrives". Each
/// pending delivery is a tracked task: deleting the address cancels it,
/// and the store's own existence check catches whatever slips through.

use crate::store::SharedStore;
use crate::types::IncomingMessage;
use crate::verbose;
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Platforms the synthetic messages pretend to come from
const PLATFORMS: &[&str] = &["Streamly", "Shoply", "Chatter", "Papergram"];

/// Schedules and tracks the one-shot simulated deliveries
pub struct Mailroom {
    store: SharedStore,
    delay: Duration,
    pending: Arc<RwLock<HashMap<Uuid, JoinHandle<()>>>>,
}

impl Mailroom {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Schedule the simulated delivery for a freshly generated address
    pub async fn schedule(&self, email_id: Uuid) {
        let store = self.store.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let incoming = synthetic_verification(email_id);
            if store.write().await.receive_message(incoming).is_none() {
                verbose!("Delivery for deleted email {} dropped", email_id);
            }
        });

        let mut pending = self.pending.write().await;
        pending.retain(|_, task| !task.is_finished());
        pending.insert(email_id, handle);
    }

    /// Cancel the pending delivery for a deleted address, if it has not fired
    pub async fn cancel(&self, email_id: Uuid) {
        if let Some(handle) = self.pending.write().await.remove(&email_id) {
            handle.abort();
        }
    }

    /// Number of deliveries still in flight
    pub async fn pending_count(&self) -> usize {
        self.pending
            .read()
            .await
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

/// Build the synthetic verification message for one delivery
fn synthetic_verification(email_id: Uuid) -> IncomingMessage {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS[rng.gen_range(0..PLATFORMS.len())];
    let code: u32 = rng.gen_range(100_000..1_000_000);
    IncomingMessage {
        email_id,
        sender: platform.to_string(),
        subject: format!("Your {} verification code is {}", platform, code),
        body: format!(
            "Hi,\n\nThanks for signing up for {platform}! To finish setting up your account, use the verification code: {code}\n\nThe code expires in 10 minutes. If you did not request it, you can ignore this message.\n\nThe {platform} Team"
        ),
        platform: platform.to_string(),
        received_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::otp;
    use crate::store::create_shared_store;

    #[tokio::test]
    async fn test_delivery_arrives_with_matching_code() {
        let store = create_shared_store(EngineConfig::default());
        let mailroom = Mailroom::new(store.clone(), Duration::from_millis(10));

        let email = store.write().await.create_email("signup");
        mailroom.schedule(email.id).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let store = store.read().await;
        assert_eq!(store.messages().len(), 1);
        let message = &store.messages()[0];
        assert_eq!(message.email_id, email.id);
        assert!(message.has_otp());
        // the extracted code is the one embedded in the body
        assert_eq!(message.otp, otp::extract_otp(&message.body));
        assert!(!message.is_read);
    }

    #[tokio::test]
    async fn test_cancel_prevents_delivery() {
        let store = create_shared_store(EngineConfig::default());
        let mailroom = Mailroom::new(store.clone(), Duration::from_millis(50));

        let email = store.write().await.create_email("signup");
        mailroom.schedule(email.id).await;
        assert_eq!(mailroom.pending_count().await, 1);

        store.write().await.delete_email(email.id);
        mailroom.cancel(email.id).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(store.read().await.messages().is_empty());
        assert_eq!(mailroom.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_late_delivery_for_deleted_email_is_dropped() {
        let store = create_shared_store(EngineConfig::default());
        let mailroom = Mailroom::new(store.clone(), Duration::from_millis(10));

        let email = store.write().await.create_email("signup");
        mailroom.schedule(email.id).await;
        // delete without cancelling: the store-side check must hold
        store.write().await.delete_email(email.id);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let store = store.read().await;
        assert!(store.messages().is_empty());
        assert!(store.emails().is_empty());
    }

    #[tokio::test]
    async fn test_each_email_gets_its_own_delivery() {
        let store = create_shared_store(EngineConfig::default());
        let mailroom = Mailroom::new(store.clone(), Duration::from_millis(10));

        let first = store.write().await.create_email("a");
        let second = store.write().await.create_email("b");
        mailroom.schedule(first.id).await;
        mailroom.schedule(second.id).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let store = store.read().await;
        assert_eq!(store.messages().len(), 2);
        let mut owners: Vec<Uuid> = store.messages().iter().map(|m| m.email_id).collect();
        owners.sort();
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(owners, expected);
    }
}
