//! Share helper
//!
//! Shares a post through the platform share sheet when one exists, and
//! otherwise copies the canonical post URL, showing a short-lived
//! acknowledgment. The capabilities are traits so the same decision logic
//! drives tests and the browser script in [`script`].

mod links;
pub mod script;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use links::ShareLinks;

/// How long the "copied" acknowledgment stays visible
pub const ACK_DURATION: Duration = Duration::from_millis(2000);

/// Result of one share activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The native share sheet completed
    Shared,
    /// The native share sheet was dismissed or failed
    Cancelled,
    /// The URL was written to the clipboard
    Copied,
    /// The clipboard was unavailable; the legacy copy path was used
    CopiedWithFallback,
}

/// Failures reported by a native share sheet
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Share cancelled")]
    Cancelled,

    #[error("Share failed: {0}")]
    Failed(String),
}

/// Failures reported by a clipboard
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable")]
    Unavailable,

    #[error("Clipboard write failed: {0}")]
    Failed(String),
}

/// What gets handed to a share sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    /// Share payload for a post at `<origin>/post/<slug>`
    pub fn for_post(origin: &str, slug: &str, title: &str, excerpt: &str) -> Self {
        Self {
            title: title.to_string(),
            text: excerpt.to_string(),
            url: crate::helpers::canonical_post_url(origin, slug),
        }
    }
}

/// Platform share sheet
#[async_trait]
pub trait NativeShare: Send + Sync {
    async fn share(&self, data: &ShareData) -> Result<(), ShareError>;
}

/// Asynchronous clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Select-and-copy fallback; best effort, never fails
pub trait LegacyCopy: Send + Sync {
    fn copy(&self, text: &str);
}

#[derive(Debug, Default)]
struct AckState {
    acknowledged: bool,
    generation: u64,
}

/// Boolean flag that clears itself [`ACK_DURATION`] after the last set
///
/// Each set bumps a generation counter; a pending reset only clears the
/// flag if no newer set happened in between.
#[derive(Debug, Clone, Default)]
pub struct Acknowledgment {
    state: Arc<Mutex<AckState>>,
}

impl Acknowledgment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the acknowledgment is currently shown
    pub fn is_set(&self) -> bool {
        self.lock().acknowledged
    }

    /// Show the acknowledgment and schedule its reset
    ///
    /// Must be called from within a tokio runtime.
    pub fn set(&self) {
        let generation = {
            let mut state = self.lock();
            state.acknowledged = true;
            state.generation = state.generation.wrapping_add(1);
            state.generation
        };

        let deadline = tokio::time::Instant::now() + ACK_DURATION;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == generation {
                state.acknowledged = false;
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AckState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Share/copy decision logic for one share button
///
/// This is the reference model for the browser script in
/// [`script::SHARE_SCRIPT`]: the script follows the same order (native
/// share, then clipboard, then legacy copy) and the same
/// [`ACK_DURATION`] generation-guarded reset. Change both together.
pub struct ShareHelper {
    native: Option<Arc<dyn NativeShare>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    legacy: Arc<dyn LegacyCopy>,
    ack: Acknowledgment,
}

impl ShareHelper {
    /// Create a helper with only the legacy copy path available
    pub fn new(legacy: Arc<dyn LegacyCopy>) -> Self {
        Self {
            native: None,
            clipboard: None,
            legacy,
            ack: Acknowledgment::new(),
        }
    }

    pub fn with_native(mut self, native: Arc<dyn NativeShare>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Whether the "copied" acknowledgment is currently shown
    pub fn acknowledged(&self) -> bool {
        self.ack.is_set()
    }

    /// Handle one activation of the share button
    pub async fn activate(&self, data: &ShareData) -> ShareOutcome {
        if let Some(native) = &self.native {
            return match native.share(data).await {
                Ok(()) => ShareOutcome::Shared,
                Err(e) => {
                    tracing::debug!("Native share did not complete: {}", e);
                    ShareOutcome::Cancelled
                }
            };
        }

        let copied = match &self.clipboard {
            Some(clipboard) => match clipboard.write_text(&data.url).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!("{}, using legacy copy", e);
                    false
                }
            },
            None => false,
        };

        if !copied {
            self.legacy.copy(&data.url);
        }
        self.ack.set();

        if copied {
            ShareOutcome::Copied
        } else {
            ShareOutcome::CopiedWithFallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNative {
        calls: Mutex<Vec<ShareData>>,
        cancel: bool,
    }

    #[async_trait]
    impl NativeShare for RecordingNative {
        async fn share(&self, data: &ShareData) -> Result<(), ShareError> {
            self.calls.lock().unwrap().push(data.clone());
            if self.cancel {
                Err(ShareError::Cancelled)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
        broken: bool,
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable);
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLegacy {
        copies: Mutex<Vec<String>>,
    }

    impl LegacyCopy for RecordingLegacy {
        fn copy(&self, text: &str) {
            self.copies.lock().unwrap().push(text.to_string());
        }
    }

    fn data() -> ShareData {
        ShareData::for_post("https://blog.pikembipresje.com", "s1", "Titulli", "Përmbledhje")
    }

    #[tokio::test]
    async fn test_native_share_skips_clipboard() {
        let native = Arc::new(RecordingNative::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let legacy = Arc::new(RecordingLegacy::default());
        let helper = ShareHelper::new(legacy.clone())
            .with_native(native.clone())
            .with_clipboard(clipboard.clone());

        assert_eq!(helper.activate(&data()).await, ShareOutcome::Shared);

        let calls = native.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://blog.pikembipresje.com/post/s1");
        assert_eq!(calls[0].title, "Titulli");
        assert_eq!(calls[0].text, "Përmbledhje");
        assert!(clipboard.writes.lock().unwrap().is_empty());
        assert!(legacy.copies.lock().unwrap().is_empty());
        assert!(!helper.acknowledged());
    }

    #[tokio::test]
    async fn test_cancelled_native_share_is_silent() {
        let native = Arc::new(RecordingNative {
            cancel: true,
            ..Default::default()
        });
        let clipboard = Arc::new(RecordingClipboard::default());
        let helper = ShareHelper::new(Arc::new(RecordingLegacy::default()))
            .with_native(native)
            .with_clipboard(clipboard.clone());

        assert_eq!(helper.activate(&data()).await, ShareOutcome::Cancelled);
        assert!(clipboard.writes.lock().unwrap().is_empty());
        assert!(!helper.acknowledged());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_copy_acknowledges_for_two_seconds() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let helper =
            ShareHelper::new(Arc::new(RecordingLegacy::default())).with_clipboard(clipboard.clone());

        assert_eq!(helper.activate(&data()).await, ShareOutcome::Copied);
        assert_eq!(
            *clipboard.writes.lock().unwrap(),
            vec!["https://blog.pikembipresje.com/post/s1".to_string()]
        );
        assert!(helper.acknowledged());

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(helper.acknowledged());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!helper.acknowledged());
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_clipboard_uses_legacy_copy() {
        let legacy = Arc::new(RecordingLegacy::default());
        let helper = ShareHelper::new(legacy.clone()).with_clipboard(Arc::new(RecordingClipboard {
            broken: true,
            ..Default::default()
        }));

        assert_eq!(helper.activate(&data()).await, ShareOutcome::CopiedWithFallback);
        assert_eq!(legacy.copies.lock().unwrap().len(), 1);
        assert!(helper.acknowledged());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_clipboard_uses_legacy_copy() {
        let legacy = Arc::new(RecordingLegacy::default());
        let helper = ShareHelper::new(legacy.clone());

        assert_eq!(helper.activate(&data()).await, ShareOutcome::CopiedWithFallback);
        assert_eq!(
            legacy.copies.lock().unwrap()[0],
            "https://blog.pikembipresje.com/post/s1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_activation_restarts_timer() {
        let helper = ShareHelper::new(Arc::new(RecordingLegacy::default()))
            .with_clipboard(Arc::new(RecordingClipboard::default()));

        helper.activate(&data()).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        helper.activate(&data()).await;

        // First timer has fired by now but must not clear the newer acknowledgment
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(helper.acknowledged());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(!helper.acknowledged());
    }
}
