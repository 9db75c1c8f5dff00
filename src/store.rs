/// In-memory mail store
///
/// Single source of truth for generated addresses, their inbox, and the
/// view state on top of them. Views dispatch intents through the named
/// operations here and re-render from the resulting snapshot; nothing
/// mutates a field from outside. Every operation is total: stale or
/// unknown ids are no-ops, never errors.

use crate::config::{AddressConfig, EngineConfig};
use crate::otp;
use crate::types::{
    EmailStatus, IncomingMessage, InboxMessage, MessageCategory, MessageFilter, MessagePage,
    TempEmail, UsageStats,
};
use crate::verbose;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const ADDRESS_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default label for addresses generated without one
const DEFAULT_LABEL: &str = "unlabeled";

/// Generate one candidate address; uniqueness is the caller's concern
pub fn generate_address(address: &AddressConfig) -> String {
    let mut rng = rand::thread_rng();
    let mut local = String::with_capacity(address.prefix.len() + address.local_len);
    local.push_str(&address.prefix);
    for _ in 0..address.local_len {
        let idx = rng.gen_range(0..ADDRESS_CHARS.len());
        local.push(ADDRESS_CHARS[idx] as char);
    }
    format!("{}@{}", local, address.domain)
}

/// The store behind a lock, for sharing with the background tasks
pub type SharedStore = Arc<RwLock<MailStore>>;

/// Create a shared store instance
pub fn create_shared_store(config: EngineConfig) -> SharedStore {
    Arc::new(RwLock::new(MailStore::new(config)))
}

/// Owns all domain state: addresses and messages newest-first, plus the
/// active-address, selected-message and filter view state
pub struct MailStore {
    config: EngineConfig,
    emails: Vec<TempEmail>,
    messages: Vec<InboxMessage>,
    active_email: Option<Uuid>,
    selected_message: Option<Uuid>,
    filter: MessageFilter,
}

impl MailStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            emails: Vec::new(),
            messages: Vec::new(),
            active_email: None,
            selected_message: None,
            filter: MessageFilter::All,
        }
    }

    /// A store pre-populated the way the demo UI boots: one address mid-life,
    /// one long expired, and a small inbox on the live one
    pub fn with_demo_data(config: EngineConfig) -> Self {
        let mut store = Self::new(config);
        let now = Utc::now();

        let trial = TempEmail {
            id: Uuid::new_v4(),
            address: format!(
                "{}x7k9m2@{}",
                store.config.address.prefix, store.config.address.domain
            ),
            label: "streaming-trial".to_string(),
            created_at: now - chrono::Duration::minutes(30),
            expires_at: now + chrono::Duration::minutes(30),
            status: EmailStatus::Active,
        };
        let signup = TempEmail {
            id: Uuid::new_v4(),
            address: format!(
                "{}a3b2c1@{}",
                store.config.address.prefix, store.config.address.domain
            ),
            label: "shop-signup".to_string(),
            created_at: now - chrono::Duration::hours(2),
            expires_at: now - chrono::Duration::hours(1),
            status: EmailStatus::Expired,
        };
        let trial_id = trial.id;
        store.emails.push(trial);
        store.emails.push(signup);

        // Oldest first, so prepends leave the inbox newest-first
        let verified = store.receive_message(IncomingMessage {
            email_id: trial_id,
            sender: "Chatter".to_string(),
            subject: "Verify your Chatter account".to_string(),
            body: "Hello,\n\nYour Chatter verification code is: 123456\n\nIf you did not request this, you can ignore this message.\n\nChatter Team".to_string(),
            platform: "Chatter".to_string(),
            received_at: now - chrono::Duration::minutes(60),
        });
        store.receive_message(IncomingMessage {
            email_id: trial_id,
            sender: "Shoply".to_string(),
            subject: "Welcome to Shoply Plus".to_string(),
            body: "Welcome to Shoply Plus!\n\nYou now have free shipping, early access to drops, and more.\n\nThe Shoply Team".to_string(),
            platform: "Shoply".to_string(),
            received_at: now - chrono::Duration::minutes(15),
        });
        let latest = store.receive_message(IncomingMessage {
            email_id: trial_id,
            sender: "Streamly".to_string(),
            subject: "Your verification code is 847392".to_string(),
            body: "Hi there,\n\nThanks for signing up for Streamly! To complete your registration, use the verification code: 847392\n\nThis code expires in 10 minutes.\n\nThe Streamly Team".to_string(),
            platform: "Streamly".to_string(),
            received_at: now - chrono::Duration::minutes(2),
        });
        if let Some(id) = verified {
            store.mark_read(id);
        }

        store.active_email = Some(trial_id);
        store.selected_message = latest;
        store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Wrap this store for sharing with the background tasks
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Generate a fresh address and make it the active one
    ///
    /// The address is retried against the live collection until unique.
    /// An empty label gets the default placeholder. Always succeeds.
    pub fn create_email(&mut self, label: &str) -> TempEmail {
        let now = Utc::now();
        let label = label.trim();
        let email = TempEmail {
            id: Uuid::new_v4(),
            address: self.unique_address(),
            label: if label.is_empty() {
                DEFAULT_LABEL.to_string()
            } else {
                label.to_string()
            },
            created_at: now,
            expires_at: now + self.config.lifetime(),
            status: EmailStatus::Active,
        };
        verbose!("Generated {} ({})", email.address, email.label);
        self.emails.insert(0, email.clone());
        self.active_email = Some(email.id);
        email
    }

    fn unique_address(&self) -> String {
        loop {
            let candidate = generate_address(&self.config.address);
            if !self.emails.iter().any(|e| e.address == candidate) {
                return candidate;
            }
        }
    }

    /// Remove an address and every message it owns
    ///
    /// Clears the active/selected references if they pointed into the
    /// deleted set. Returns false (and changes nothing) on an unknown id.
    pub fn delete_email(&mut self, id: Uuid) -> bool {
        let before = self.emails.len();
        self.emails.retain(|e| e.id != id);
        if self.emails.len() == before {
            return false;
        }
        self.messages.retain(|m| m.email_id != id);
        if self.active_email == Some(id) {
            self.active_email = None;
        }
        if let Some(selected) = self.selected_message {
            if self.message(selected).is_none() {
                self.selected_message = None;
            }
        }
        verbose!("Deleted email {}", id);
        true
    }

    /// Replace the active-address reference
    ///
    /// An id that is not in the collection is refused and the current
    /// reference stays put. Returns whether the reference changed.
    pub fn set_active_email(&mut self, id: Option<Uuid>) -> bool {
        match id {
            None => {
                self.active_email = None;
                true
            }
            Some(id) if self.email(id).is_some() => {
                self.active_email = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    /// Ingest an inbound message addressed to one of our emails
    ///
    /// Extracts the passcode and classifies before storing. A message for
    /// an address that no longer exists is dropped silently; this is what
    /// keeps a late simulated delivery from resurrecting a deleted inbox.
    pub fn receive_message(&mut self, incoming: IncomingMessage) -> Option<Uuid> {
        if self.email(incoming.email_id).is_none() {
            verbose!(
                "Dropping message from {} for unknown email {}",
                incoming.sender,
                incoming.email_id
            );
            return None;
        }
        let otp = otp::extract_from_message(&incoming.subject, &incoming.body);
        let category = if otp.is_some() {
            MessageCategory::Otp
        } else {
            MessageCategory::Social
        };
        let message = InboxMessage {
            id: Uuid::new_v4(),
            email_id: incoming.email_id,
            sender: incoming.sender,
            subject: incoming.subject,
            body: incoming.body,
            platform: incoming.platform,
            received_at: incoming.received_at,
            is_read: false,
            otp,
            category,
        };
        let id = message.id;
        self.messages.insert(0, message);
        Some(id)
    }

    /// Mark a message read; idempotent, unknown ids are a no-op
    pub fn mark_read(&mut self, id: Uuid) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.is_read = true;
        }
    }

    /// Select a message for display, marking it read as part of the intent
    ///
    /// Selecting a stale id changes nothing; `None` clears the selection.
    pub fn select_message(&mut self, id: Option<Uuid>) {
        match id {
            None => self.selected_message = None,
            Some(id) if self.message(id).is_some() => {
                self.selected_message = Some(id);
                self.mark_read(id);
            }
            Some(_) => {}
        }
    }

    /// Replace the inbox filter; takes effect on subsequent reads
    pub fn set_filter(&mut self, filter: MessageFilter) {
        self.filter = filter;
    }

    /// Reclassify every address whose expiry has passed as of `now`
    ///
    /// Purely derived and idempotent; safe at any cadence. Never deletes
    /// and never touches any other field.
    pub fn sweep_expirations(&mut self, now: DateTime<Utc>) {
        for email in &mut self.emails {
            if email.status == EmailStatus::Active && email.is_expired_at(now) {
                email.status = EmailStatus::Expired;
                verbose!("{} expired", email.address);
            }
        }
    }

    // ==================== Queries ====================

    pub fn email(&self, id: Uuid) -> Option<&TempEmail> {
        self.emails.iter().find(|e| e.id == id)
    }

    pub fn message(&self, id: Uuid) -> Option<&InboxMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn active_email(&self) -> Option<&TempEmail> {
        self.active_email.and_then(|id| self.email(id))
    }

    pub fn selected_message(&self) -> Option<&InboxMessage> {
        self.selected_message.and_then(|id| self.message(id))
    }

    pub fn emails(&self) -> &[TempEmail] {
        &self.emails
    }

    pub fn messages(&self) -> &[InboxMessage] {
        &self.messages
    }

    pub fn filter(&self) -> MessageFilter {
        self.filter
    }

    /// Messages passing the current filter, store order preserved
    pub fn filtered_messages(&self) -> Vec<&InboxMessage> {
        self.messages
            .iter()
            .filter(|m| self.filter.accepts(m.category))
            .collect()
    }

    /// One page of the filtered inbox
    ///
    /// `page` is 1-based and clamped into range, so page 0 and past-the-end
    /// requests return the nearest real page instead of an empty slice.
    pub fn message_page(&self, page: usize) -> MessagePage {
        let filtered = self.filtered_messages();
        let total = filtered.len();
        let size = self.config.inbox.page_size.max(1);
        let page_count = total.div_ceil(size).max(1);
        let page = page.clamp(1, page_count);
        let messages = filtered
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect();
        MessagePage {
            page,
            page_count,
            total,
            messages,
        }
    }

    /// Counts for the history/usage dashboard
    pub fn usage_stats(&self) -> UsageStats {
        UsageStats {
            total_emails: self.emails.len(),
            active_emails: self
                .emails
                .iter()
                .filter(|e| e.status == EmailStatus::Active)
                .count(),
            expired_emails: self
                .emails
                .iter()
                .filter(|e| e.status == EmailStatus::Expired)
                .count(),
            otp_messages: self.messages.iter().filter(|m| m.has_otp()).count(),
            unread_messages: self.messages.iter().filter(|m| !m.is_read).count(),
        }
    }
}
