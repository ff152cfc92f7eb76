//! Eternity proxy session and navigation controller.
//!
//! This crate owns the browsing-session state machine. A launch request
//! flows through the URL resolver, is handed to the external encoder bridge
//! to obtain a proxied address, and transitions the controller from the
//! dashboard (`Idle`) into a full-screen embedded session (`Active`). The
//! ad suppression agent and the inspector launcher ride on the same
//! embedded-content handle and observe session state through a watch
//! channel.

pub mod adblock;
pub mod bridge;
pub mod content;
pub mod inspector;
pub mod resolver;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use url::Url;
use uuid::Uuid;

pub use adblock::AdSuppressionAgent;
pub use bridge::EncoderBridge;
pub use content::{ContentError, ContentResult, ContentDocument, EmbeddedContent};
pub use inspector::InspectorLauncher;

/// Errors that can occur during session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Launch was requested with no text. Swallowed by callers, never
    /// surfaced to the user.
    #[error("launch requested with empty input")]
    EmptyInput,

    /// The proxy engine has not finished loading. Surfaced to the user;
    /// the attempt is terminal and must be re-invoked manually.
    #[error("proxy engine is still loading")]
    EngineNotReady,

    /// The bridge produced an address that does not resolve against the
    /// outer page origin.
    #[error("proxied address did not resolve: {0}")]
    InvalidProxyAddress(#[from] url::ParseError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// The controller's one state value. Either the dashboard is showing or an
/// embedded session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Dashboard visible, no embedded content.
    Idle,
    /// Embedded content visible, dashboard hidden.
    Active,
}

/// An active browsing session. Created on a successful launch, destroyed by
/// the home action. Never persisted: reloading the shell itself starts over
/// at the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowsingSession {
    /// Session identifier.
    pub id: Uuid,
    /// The canonical URL the user asked for. This is what the address
    /// field shows.
    pub requested_url: String,
    /// The encoded address actually loaded in the frame.
    pub proxied_url: String,
    /// Session creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Owns the browsing-session state machine and the navigation actions.
///
/// The session slot is the single source of truth for `Idle` vs `Active`:
/// a session value exists exactly while the controller is `Active`, so
/// "active but no content" is unrepresentable. The nav-bar flag is
/// orthogonal and purely cosmetic.
pub struct SessionController {
    /// External proxy encoder.
    bridge: Arc<dyn EncoderBridge>,
    /// The embedded content frame.
    frame: Arc<dyn EmbeddedContent>,
    /// Outer page origin proxied addresses are resolved against.
    origin: Url,
    /// Current session, present iff Active.
    session: RwLock<Option<BrowsingSession>>,
    /// Whether the navigation bar is shown.
    nav_visible: RwLock<bool>,
    /// Human-readable address shown to the user. Never the proxied form.
    address: RwLock<String>,
    /// State broadcast for the agents.
    state_tx: watch::Sender<SessionState>,
}

impl SessionController {
    /// Create an idle controller over the given collaborators.
    pub fn new(
        bridge: Arc<dyn EncoderBridge>,
        frame: Arc<dyn EmbeddedContent>,
        origin: Url,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            bridge,
            frame,
            origin,
            session: RwLock::new(None),
            nav_visible: RwLock::new(true),
            address: RwLock::new(String::new()),
            state_tx,
        }
    }

    /// Resolve `input`, encode it through the bridge and enter (or replace)
    /// the embedded session.
    ///
    /// Fails with [`SessionError::EmptyInput`] for blank input and
    /// [`SessionError::EngineNotReady`] when the bridge is unavailable; in
    /// both cases the state machine is untouched and the bridge is not
    /// asked to encode anything it cannot.
    pub fn launch(&self, input: &str) -> SessionResult<BrowsingSession> {
        let requested = resolver::resolve(input).ok_or(SessionError::EmptyInput)?;
        let proxied = bridge::proxied_address(self.bridge.as_ref(), &self.origin, &requested)?;

        let session = BrowsingSession {
            id: Uuid::new_v4(),
            requested_url: requested.clone(),
            proxied_url: proxied.to_string(),
            created_at: Utc::now(),
        };

        log::info!("launching session {} -> {}", session.id, requested);

        *self.address.write() = requested;
        *self.nav_visible.write() = true;
        *self.session.write() = Some(session.clone());
        self.frame.navigate(&session.proxied_url);
        self.state_tx.send_replace(SessionState::Active);

        Ok(session)
    }

    /// Leave the embedded session and return to the dashboard. Settings are
    /// untouched. No-op when already idle.
    pub fn go_home(&self) {
        let previous = self.session.write().take();
        if let Some(session) = previous {
            log::info!("closing session {}", session.id);
            self.frame.detach();
            self.state_tx.send_replace(SessionState::Idle);
        }
    }

    /// Reload the embedded content in place. Callers disable the control
    /// while idle; an idle reload is a silent no-op.
    pub fn reload(&self) {
        if self.is_active() {
            self.frame.reload();
        } else {
            log::debug!("reload ignored while idle");
        }
    }

    /// Step back in the embedded content's own history. Empty history is a
    /// no-op inside the handle.
    pub fn back(&self) {
        if self.is_active() {
            self.frame.history_back();
        } else {
            log::debug!("back ignored while idle");
        }
    }

    /// Step forward in the embedded content's own history.
    pub fn forward(&self) {
        if self.is_active() {
            self.frame.history_forward();
        } else {
            log::debug!("forward ignored while idle");
        }
    }

    /// Flip nav-bar visibility. Always allowed, purely cosmetic.
    pub fn toggle_nav(&self) {
        let mut visible = self.nav_visible.write();
        *visible = !*visible;
    }

    /// Whether the navigation bar is currently shown.
    pub fn nav_visible(&self) -> bool {
        *self.nav_visible.read()
    }

    /// Current state value.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Whether an embedded session is active.
    pub fn is_active(&self) -> bool {
        self.session.read().is_some()
    }

    /// Snapshot of the current session, if any.
    pub fn current_session(&self) -> Option<BrowsingSession> {
        self.session.read().clone()
    }

    /// The human-readable address shown to the user.
    pub fn address(&self) -> String {
        self.address.read().clone()
    }

    /// Subscribe to state transitions. Receivers observe a change within
    /// one tick of the transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The embedded content handle the agents operate on.
    pub fn content(&self) -> Arc<dyn EmbeddedContent> {
        Arc::clone(&self.frame)
    }
}
