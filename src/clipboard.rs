/// Clipboard side effects
///
/// Copying an address or a passcode is fire and forget: a failed write is
/// logged and swallowed, and the transient "copied" indicator resets after
/// a fixed delay whether or not the write landed.

use crate::log_error;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Where copied text lands
///
/// Real front ends hand this to the platform clipboard; tests and headless
/// runs use [`MemoryClipboard`].
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> io::Result<()>;
}

/// In-process clipboard holding the last copied string
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> io::Result<()> {
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

/// Transient "copied" indicator behind the copy buttons
pub struct CopyIndicator {
    state: watch::Sender<bool>,
    reset_after: Duration,
}

impl CopyIndicator {
    pub fn new(reset_after: Duration) -> Self {
        let (state, _) = watch::channel(false);
        Self { state, reset_after }
    }

    /// Copy `text`, flash the indicator, and schedule its reset
    ///
    /// A clipboard failure is logged and otherwise invisible: the caller
    /// never sees an error and the indicator resets on schedule anyway.
    pub fn copy(&self, clipboard: &dyn Clipboard, text: &str) {
        if let Err(e) = clipboard.write_text(text) {
            log_error!("Clipboard write failed: {}", e);
        }
        self.state.send_replace(true);

        let state = self.state.clone();
        let reset_after = self.reset_after;
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            state.send_replace(false);
        });
    }

    /// Whether the indicator is currently lit
    pub fn is_copied(&self) -> bool {
        *self.state.borrow()
    }

    /// Subscribe for indicator changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&self, _text: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[tokio::test]
    async fn test_copy_stores_text_and_flashes_indicator() {
        let clipboard = MemoryClipboard::new();
        let indicator = CopyIndicator::new(Duration::from_millis(30));

        indicator.copy(&clipboard, "temp_x7k9m2@tempmail.io");
        assert_eq!(
            clipboard.contents().as_deref(),
            Some("temp_x7k9m2@tempmail.io")
        );
        assert!(indicator.is_copied());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!indicator.is_copied());
    }

    #[tokio::test]
    async fn test_failed_copy_is_swallowed_and_still_resets() {
        let indicator = CopyIndicator::new(Duration::from_millis(30));

        indicator.copy(&BrokenClipboard, "847392");
        assert!(indicator.is_copied());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!indicator.is_copied());
    }
}
