use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a temporary address
///
/// The only transition is `Active` -> `Expired`, taken by the expiry sweep
/// once the address has passed its expiry timestamp. `Expired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Active,
    Expired,
}

/// A generated temporary email address and its lifecycle metadata
///
/// All fields except `status` are fixed at creation. `status` is derived
/// from `expires_at` and the clock; it is refreshed by the sweep and may be
/// momentarily stale between sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempEmail {
    pub id: Uuid,
    /// Generated address, e.g. `temp_x7k9m2@tempmail.io`
    pub address: String,
    /// User-supplied label, or the default placeholder
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: EmailStatus,
}

impl TempEmail {
    /// Whether the address has passed its expiry timestamp at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Content classification of an inbox message
///
/// `Otp` when a passcode was extracted at ingestion, `Social` otherwise.
/// The "all" filter tab is a wildcard on [`MessageFilter`], not a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    Otp,
    Social,
}

/// Inbox filter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFilter {
    #[default]
    All,
    Otp,
    Social,
}

impl MessageFilter {
    /// Whether a message with `category` passes this filter
    pub fn accepts(&self, category: MessageCategory) -> bool {
        match self {
            MessageFilter::All => true,
            MessageFilter::Otp => category == MessageCategory::Otp,
            MessageFilter::Social => category == MessageCategory::Social,
        }
    }
}

impl std::str::FromStr for MessageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(MessageFilter::All),
            "otp" => Ok(MessageFilter::Otp),
            "social" => Ok(MessageFilter::Social),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

/// A single inbox message addressed to one temporary email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: Uuid,
    /// Owning [`TempEmail`] id
    pub email_id: Uuid,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub platform: String,
    pub received_at: DateTime<Utc>,
    /// Flips false -> true on mark-read, never back
    pub is_read: bool,
    /// First standalone 4-8 digit run found in subject/body at ingestion
    pub otp: Option<String>,
    pub category: MessageCategory,
}

impl InboxMessage {
    pub fn has_otp(&self) -> bool {
        self.otp.is_some()
    }
}

/// An inbound message before ingestion
///
/// This is the seam where a real mail-receiving backend would attach; the
/// simulated delivery task is its only producer here.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub email_id: Uuid,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub platform: String,
    pub received_at: DateTime<Utc>,
}

/// One page of the filtered inbox
#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    /// The 1-based page actually returned, after clamping
    pub page: usize,
    pub page_count: usize,
    /// Size of the filtered set the page was cut from
    pub total: usize,
    pub messages: Vec<InboxMessage>,
}

/// Aggregate counts for the history/usage dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub total_emails: usize,
    pub active_emails: usize,
    pub expired_emails: usize,
    pub otp_messages: usize,
    pub unread_messages: usize,
}
