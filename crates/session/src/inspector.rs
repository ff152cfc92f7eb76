//! Lazy injection of a third-party DOM inspection tool into the embedded
//! content.
//!
//! The tool (eruda) is fetched from a CDN on first use and shown on every
//! subsequent request. The marker guard keeps repeated toggles from loading
//! it twice.

use std::sync::Arc;

use tokio::sync::watch;

use crate::content::EmbeddedContent;
use crate::SessionState;

/// Marker left in the content once the loader is planted.
pub const INSPECTOR_MARKER: &str = "eternity-inspector";

/// CDN address of the inspection tool.
pub const INSPECTOR_CDN: &str = "https://cdn.jsdelivr.net/npm/eruda";

/// Hook invoked when the tool is already loaded.
pub const SHOW_HOOK: &str = "eruda.show";

/// Loader payload: fetches the tool and initializes and shows it once the
/// fetch completes.
pub fn loader_script() -> String {
    format!(
        "(function() {{\n\
         \x20\x20const script = document.createElement('script');\n\
         \x20\x20script.src = '{cdn}';\n\
         \x20\x20script.onload = () => {{ eruda.init(); eruda.show(); }};\n\
         \x20\x20document.body.appendChild(script);\n\
         }})();",
        cdn = INSPECTOR_CDN,
    )
}

/// On-demand launcher for the inspection tool.
pub struct InspectorLauncher {
    frame: Arc<dyn EmbeddedContent>,
    state_rx: watch::Receiver<SessionState>,
}

impl InspectorLauncher {
    /// Create a launcher over the content handle and the controller's state
    /// feed.
    pub fn new(frame: Arc<dyn EmbeddedContent>, state_rx: watch::Receiver<SessionState>) -> Self {
        Self { frame, state_rx }
    }

    /// Load the tool if absent, show it if present. No-op while idle or
    /// while the content document is unreachable; the user simply toggles
    /// again.
    pub fn toggle(&self) {
        if *self.state_rx.borrow() != SessionState::Active {
            log::debug!("inspector toggle ignored while idle");
            return;
        }

        let mut document = match self.frame.document() {
            Ok(document) => document,
            Err(e) => {
                log::debug!("inspector unavailable: {}", e);
                return;
            }
        };

        if document.script_present(INSPECTOR_MARKER) {
            if let Err(e) = document.invoke(SHOW_HOOK) {
                log::debug!("inspector show failed: {}", e);
            }
            return;
        }

        match document.append_script(INSPECTOR_MARKER, &loader_script()) {
            Ok(()) => log::debug!("inspector loader injected"),
            Err(e) => log::debug!("inspector injection failed: {}", e),
        }
    }
}
