pub mod clipboard;
pub mod config;
pub mod countdown;
pub mod delivery;
pub mod logging;
pub mod otp;
pub mod store;
pub mod sweep;
pub mod types;

pub use clipboard::{Clipboard, CopyIndicator, MemoryClipboard};
pub use config::{ConfigError, EngineConfig, CONFIG_FILE};
pub use countdown::{format_remaining, seconds_remaining, Countdown};
pub use delivery::Mailroom;
pub use otp::{extract_from_message, extract_otp};
pub use store::{create_shared_store, generate_address, MailStore, SharedStore};
pub use sweep::spawn_expiry_sweep;
pub use types::{
    EmailStatus, IncomingMessage, InboxMessage, MessageCategory, MessageFilter, MessagePage,
    TempEmail, UsageStats,
};
