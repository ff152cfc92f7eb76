//! Best-effort ad-element suppression inside the embedded content.
//!
//! Ad networks re-insert elements after removal and the content's inner
//! document is unreachable until the proxy wrapper attaches, so suppression
//! is a supervised polling task rather than a single pass. Every tick the
//! agent tries to plant one marker-guarded bootstrap script; the payload
//! itself re-sweeps a fixed selector allowlist on a short interval inside
//! the content. Injection failures are expected and swallowed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::content::EmbeddedContent;

/// How often the outer poll retries injection.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How often the injected payload re-sweeps, in milliseconds.
pub const SWEEP_INTERVAL_MS: u64 = 1_000;

/// Marker left in the content once the bootstrap script is planted.
pub const SUPPRESSION_MARKER: &str = "eternity-ad-suppression";

/// Structural patterns for ad-carrying elements. A heuristic allowlist,
/// not a filter-list engine; false negatives are acceptable.
pub const AD_SELECTORS: &[&str] = &[
    ".adsbygoogle",
    "ins.adsbygoogle",
    "[id^=\"google_ads_\"]",
    "#ad-container",
    ".ad-box",
    ".footer-ads",
    ".sidebar-ads",
    "iframe[src*=\"doubleclick.net\"]",
    "iframe[src*=\"adservice\"]",
];

/// The bootstrap payload executed inside the embedded content.
pub fn suppression_script() -> String {
    let selectors = AD_SELECTORS
        .iter()
        .map(|s| format!("'{}'", s.replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "(function() {{\n\
         \x20\x20const block = () => {{\n\
         \x20\x20\x20\x20const selectors = [{selectors}];\n\
         \x20\x20\x20\x20selectors.forEach(s => {{\n\
         \x20\x20\x20\x20\x20\x20document.querySelectorAll(s).forEach(el => el.remove());\n\
         \x20\x20\x20\x20}});\n\
         \x20\x20}};\n\
         \x20\x20setInterval(block, {interval});\n\
         \x20\x20block();\n\
         }})();",
        selectors = selectors,
        interval = SWEEP_INTERVAL_MS,
    )
}

/// Supervised periodic injector for the suppression payload.
///
/// The poll loop runs exactly while adblock is enabled and a session is
/// active; either condition going false cancels the timer deterministically,
/// so at most one timer exists per agent at any time. A tick that fires
/// after the session ended sees the detached frame and no-ops.
pub struct AdSuppressionAgent {
    frame: Arc<dyn EmbeddedContent>,
    poll_interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AdSuppressionAgent {
    /// Create a stopped agent over the given content handle.
    pub fn new(frame: Arc<dyn EmbeddedContent>) -> Self {
        Self::with_interval(frame, POLL_INTERVAL)
    }

    /// Create a stopped agent with a custom poll interval.
    pub fn with_interval(frame: Arc<dyn EmbeddedContent>, poll_interval: Duration) -> Self {
        Self {
            frame,
            poll_interval,
            task: Mutex::new(None),
        }
    }

    /// Reconcile the poll loop with the triggering conditions. Idempotent:
    /// repeated calls with the same inputs neither stack timers nor restart
    /// the running loop.
    pub fn sync(&self, adblock_enabled: bool, session_active: bool) {
        if adblock_enabled && session_active {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Whether the poll loop is currently running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return;
        }

        log::debug!("starting ad suppression poll");
        let frame = Arc::clone(&self.frame);
        let poll_interval = self.poll_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                try_inject(frame.as_ref());
            }
        }));
    }

    fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            log::debug!("stopping ad suppression poll");
            handle.abort();
        }
    }
}

impl Drop for AdSuppressionAgent {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One independent, idempotent injection attempt. Failures mean the proxy
/// wrapper has not attached yet (or the session just ended); the next tick
/// retries.
fn try_inject(frame: &dyn EmbeddedContent) {
    let mut document = match frame.document() {
        Ok(document) => document,
        Err(e) => {
            log::debug!("ad suppression injection pending: {}", e);
            return;
        }
    };

    if document.script_present(SUPPRESSION_MARKER) {
        return;
    }

    match document.append_script(SUPPRESSION_MARKER, &suppression_script()) {
        Ok(()) => log::debug!("ad suppression bootstrap injected"),
        Err(e) => log::debug!("ad suppression injection failed: {}", e),
    }
}
