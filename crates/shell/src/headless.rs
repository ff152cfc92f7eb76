//! In-process collaborators for running the shell without a browser.
//!
//! These stand in for the pieces the real deployment gets from the page
//! environment: the embedded frame, the outer page identity, and the
//! pre-built proxy engine. The binary and the integration tests drive the
//! full control flow through them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use eternity_policy::OuterPage;
use eternity_session::bridge::EncoderBridge;
use eternity_session::content::{ContentDocument, ContentError, ContentResult, EmbeddedContent};

#[derive(Default)]
struct FrameInner {
    /// Navigation history with a cursor, like the frame's own history API.
    history: Vec<String>,
    cursor: usize,
    /// Markers of injected scripts, in order.
    scripts: Vec<String>,
    reloads: usize,
}

/// An embedded frame that records everything done to it. The inner
/// document becomes reachable after `wrap_delay` denied accesses, imitating
/// the proxy wrapper attaching late.
pub struct HeadlessFrame {
    inner: Mutex<Option<FrameInner>>,
    wrap_delay: AtomicUsize,
}

impl HeadlessFrame {
    /// A frame whose document is reachable immediately.
    pub fn new() -> Self {
        Self::with_wrap_delay(0)
    }

    /// A frame whose document denies the first `denials` accesses.
    pub fn with_wrap_delay(denials: usize) -> Self {
        Self {
            inner: Mutex::new(None),
            wrap_delay: AtomicUsize::new(denials),
        }
    }

    /// The address currently loaded, if any.
    pub fn current_url(&self) -> Option<String> {
        self.inner
            .lock()
            .as_ref()
            .and_then(|inner| inner.history.get(inner.cursor).cloned())
    }

    /// Markers of every script injected so far.
    pub fn injected_markers(&self) -> Vec<String> {
        self.inner
            .lock()
            .as_ref()
            .map(|inner| inner.scripts.clone())
            .unwrap_or_default()
    }

    /// How many in-place reloads happened.
    pub fn reload_count(&self) -> usize {
        self.inner.lock().as_ref().map(|inner| inner.reloads).unwrap_or(0)
    }
}

impl Default for HeadlessFrame {
    fn default() -> Self {
        Self::new()
    }
}

struct HeadlessDocument<'a> {
    frame: &'a HeadlessFrame,
}

impl ContentDocument for HeadlessDocument<'_> {
    fn script_present(&self, marker: &str) -> bool {
        self.frame
            .inner
            .lock()
            .as_ref()
            .map(|inner| inner.scripts.iter().any(|m| m == marker))
            .unwrap_or(false)
    }

    fn append_script(&mut self, marker: &str, _source: &str) -> ContentResult<()> {
        match self.frame.inner.lock().as_mut() {
            Some(inner) => {
                inner.scripts.push(marker.to_string());
                Ok(())
            }
            None => Err(ContentError::Detached),
        }
    }

    fn invoke(&mut self, _hook: &str) -> ContentResult<()> {
        Ok(())
    }
}

impl EmbeddedContent for HeadlessFrame {
    fn navigate(&self, proxied_url: &str) {
        let mut guard = self.inner.lock();
        let inner = guard.get_or_insert_with(FrameInner::default);
        // A new navigation drops any forward entries.
        inner.history.truncate(inner.cursor + 1);
        inner.history.push(proxied_url.to_string());
        inner.cursor = inner.history.len() - 1;
    }

    fn detach(&self) {
        *self.inner.lock() = None;
    }

    fn reload(&self) {
        if let Some(inner) = self.inner.lock().as_mut() {
            inner.reloads += 1;
        }
    }

    fn history_back(&self) {
        if let Some(inner) = self.inner.lock().as_mut() {
            // No-op at the boundary.
            inner.cursor = inner.cursor.saturating_sub(1);
        }
    }

    fn history_forward(&self) {
        if let Some(inner) = self.inner.lock().as_mut() {
            if inner.cursor + 1 < inner.history.len() {
                inner.cursor += 1;
            }
        }
    }

    fn document(&self) -> ContentResult<Box<dyn ContentDocument + '_>> {
        if self.inner.lock().is_none() {
            return Err(ContentError::Detached);
        }
        let remaining = self.wrap_delay.load(Ordering::SeqCst);
        if remaining > 0 {
            self.wrap_delay.store(remaining - 1, Ordering::SeqCst);
            return Err(ContentError::AccessDenied);
        }
        Ok(Box::new(HeadlessDocument { frame: self }))
    }
}

/// Outer-page recorder: title, icon and location swaps land here.
pub struct HeadlessPage {
    title: Mutex<String>,
    icon: Mutex<String>,
    location: Mutex<Option<String>>,
    close_allowed: bool,
    closed: AtomicBool,
}

impl HeadlessPage {
    pub fn new(close_allowed: bool) -> Self {
        Self {
            title: Mutex::new(String::new()),
            icon: Mutex::new(String::new()),
            location: Mutex::new(None),
            close_allowed,
            closed: AtomicBool::new(false),
        }
    }

    pub fn title(&self) -> String {
        self.title.lock().clone()
    }

    pub fn icon(&self) -> String {
        self.icon.lock().clone()
    }

    /// Where a panic action sent the page, if anywhere.
    pub fn location(&self) -> Option<String> {
        self.location.lock().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl OuterPage for HeadlessPage {
    fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
    }

    fn set_icon(&self, href: &str) {
        *self.icon.lock() = href.to_string();
    }

    fn navigate(&self, url: &str) {
        *self.location.lock() = Some(url.to_string());
    }

    fn close(&self) -> bool {
        if self.close_allowed {
            self.closed.store(true, Ordering::SeqCst);
        }
        self.close_allowed
    }
}

/// A bridge with an identity-like codec: percent-encodes the destination
/// under a fixed path prefix. Loading can be toggled to exercise the
/// engine-not-ready path.
pub struct PrefixBridge {
    prefix: String,
    ready: AtomicBool,
}

impl PrefixBridge {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ready: AtomicBool::new(true),
        }
    }

    pub fn loading(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl EncoderBridge for PrefixBridge {
    fn available(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn prefix(&self) -> String {
        self.prefix.clone()
    }

    fn encode_url(&self, url: &str) -> String {
        urlencoding::encode(url).into_owned()
    }
}
