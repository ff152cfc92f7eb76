//! Handle to the embedded browsing frame.
//!
//! The frame renders the proxied destination full-screen once a launch
//! succeeds. Its inner document lives behind the proxy wrapper and is only
//! reachable once wrapping has completed; until then every access fails and
//! callers are expected to retry on their own schedule.

use thiserror::Error;

/// Errors raised when touching the embedded content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// The inner document is not reachable yet (proxy wrapper still
    /// attaching, or transient cross-origin isolation).
    #[error("content document is not reachable yet")]
    AccessDenied,

    /// No session is attached to the frame.
    #[error("no embedded content is attached")]
    Detached,
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// The embedded content frame shown while a session is active.
///
/// Navigation calls delegate to the frame's own history; going back or
/// forward past the end of that history is a no-op, not an error.
pub trait EmbeddedContent: Send + Sync {
    /// Point the frame at a new proxied address.
    fn navigate(&self, proxied_url: &str);

    /// Drop the displayed content. Called when the session ends.
    fn detach(&self);

    /// Reload the current document in place.
    fn reload(&self);

    /// Step back in the frame's own history.
    fn history_back(&self);

    /// Step forward in the frame's own history.
    fn history_forward(&self);

    /// Access the wrapped document for script injection.
    fn document(&self) -> ContentResult<Box<dyn ContentDocument + '_>>;
}

/// The embedded frame's document, reachable only once the proxy wrapper
/// has finished attaching.
pub trait ContentDocument {
    /// Whether a script tagged with `marker` has already been injected.
    fn script_present(&self, marker: &str) -> bool;

    /// Append a script tagged with `marker` to the document.
    fn append_script(&mut self, marker: &str, source: &str) -> ContentResult<()>;

    /// Invoke a global hook exposed by previously injected content.
    fn invoke(&mut self, hook: &str) -> ContentResult<()>;
}
