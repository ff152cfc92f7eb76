//! Application wiring: settings, session controller, policies and agents
//! composed into one shell.
//!
//! The shell owns the supervisor task that keeps the ad suppression agent
//! in sync with its two triggering conditions (adblock enabled, session
//! active); both are observed through watch channels, so the agent reacts
//! within one tick of either changing. Policy settings are re-applied
//! synchronously inside every settings update, making them visible to the
//! very next event.

use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use eternity_policy::{
    CloakSettings, KeyEvent, PageIdentity, PanicAction, PanicSettings, PolicyGuard, OuterPage,
};
use eternity_session::{
    AdSuppressionAgent, BrowsingSession, EncoderBridge, EmbeddedContent, InspectorLauncher,
    SessionController, SessionError, SessionResult, SessionState,
};

use crate::quickapps::{self, QuickApp};
use crate::settings::{Settings, SettingsStore};

/// The shell's true identity, restored when cloaking is disabled.
pub const TRUE_TITLE: &str = "Eternity";
pub const TRUE_ICON: &str = "https://picsum.photos/32/32";

/// The assembled shell. Construct inside a tokio runtime: the supervisor
/// task is spawned on creation and aborted on drop.
pub struct ShellApp {
    store: Arc<SettingsStore>,
    controller: Arc<SessionController>,
    guard: Arc<PolicyGuard>,
    adblock: Arc<AdSuppressionAgent>,
    inspector: InspectorLauncher,
    supervisor: JoinHandle<()>,
}

impl ShellApp {
    /// Wire the shell over its external collaborators.
    pub fn new(
        store: SettingsStore,
        bridge: Arc<dyn EncoderBridge>,
        frame: Arc<dyn EmbeddedContent>,
        page: Arc<dyn OuterPage>,
        origin: Url,
    ) -> Self {
        let store = Arc::new(store);
        let identity = PageIdentity {
            title: TRUE_TITLE.to_string(),
            icon: TRUE_ICON.to_string(),
        };
        let guard = Arc::new(PolicyGuard::new(page, identity));

        // Apply the persisted policies on load. A bad persisted snapshot
        // leaves the defaults in force.
        let initial = store.current();
        if let Err(e) = guard.apply_settings(initial.panic.clone(), initial.cloak.clone()) {
            log::warn!("persisted policy settings rejected: {}", e);
        }

        let controller = Arc::new(SessionController::new(bridge, frame, origin));
        let adblock = Arc::new(AdSuppressionAgent::new(controller.content()));
        let inspector = InspectorLauncher::new(controller.content(), controller.subscribe());

        let supervisor = Self::spawn_supervisor(
            store.subscribe(),
            controller.subscribe(),
            Arc::clone(&adblock),
        );

        Self {
            store,
            controller,
            guard,
            adblock,
            inspector,
            supervisor,
        }
    }

    /// Keep the agent's poll loop reconciled with (adblock enabled AND
    /// session active). Ends when either feed closes, releasing the timer.
    fn spawn_supervisor(
        mut settings_rx: tokio::sync::watch::Receiver<Settings>,
        mut state_rx: tokio::sync::watch::Receiver<SessionState>,
        agent: Arc<AdSuppressionAgent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let enabled = settings_rx.borrow_and_update().adblock_enabled;
                let active = *state_rx.borrow_and_update() == SessionState::Active;
                agent.sync(enabled, active);

                tokio::select! {
                    changed = settings_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            agent.sync(false, false);
        })
    }

    /// Launch a destination from raw address-bar or quick-app input.
    ///
    /// Empty input is swallowed (`Ok(None)`); an unavailable proxy engine
    /// is surfaced to the caller exactly once per attempt, with the
    /// dashboard left untouched.
    pub fn launch(&self, input: &str) -> SessionResult<Option<BrowsingSession>> {
        match self.controller.launch(input) {
            Ok(session) => Ok(Some(session)),
            Err(SessionError::EmptyInput) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Feed a key press from the process-wide listener. Returns the panic
    /// action that fired, if any; callers stop normal UI handling when one
    /// did.
    pub fn handle_key(&self, event: &KeyEvent) -> Option<PanicAction> {
        self.guard.handle_key(event)
    }

    /// Apply a settings change through the single update entry point.
    /// Policies are re-applied before this returns.
    pub fn update_settings<F>(&self, apply: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let settings = self.store.update(apply);
        if let Err(e) = self
            .guard
            .apply_settings(settings.panic.clone(), settings.cloak.clone())
        {
            log::warn!("policy settings rejected: {}", e);
        }
        settings
    }

    /// Configure the panic key.
    pub fn set_panic(&self, panic: PanicSettings) -> Settings {
        self.update_settings(|s| s.panic = panic)
    }

    /// Configure cloaking.
    pub fn set_cloak(&self, cloak: CloakSettings) -> Settings {
        self.update_settings(|s| s.cloak = cloak)
    }

    /// Add a user-defined quick-launch tile.
    pub fn add_custom_app(&self, app: QuickApp) -> Settings {
        self.update_settings(|s| s.custom_apps.push(app))
    }

    /// Built-in catalog followed by the user's custom tiles.
    pub fn quick_apps(&self) -> Vec<QuickApp> {
        let mut apps = quickapps::default_apps();
        apps.extend(self.store.current().custom_apps);
        apps
    }

    /// Show (or lazily load) the inspection tool in the active session.
    pub fn toggle_inspector(&self) {
        self.inspector.toggle();
    }

    /// The session controller, for navigation actions.
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Settings {
        self.store.current()
    }

    /// The ad suppression agent, exposed for state inspection.
    pub fn ad_suppression(&self) -> &AdSuppressionAgent {
        &self.adblock
    }
}

impl Drop for ShellApp {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessFrame, HeadlessPage, PrefixBridge};
    use eternity_session::adblock::SUPPRESSION_MARKER;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::tempdir;

    struct Harness {
        app: ShellApp,
        frame: Arc<HeadlessFrame>,
        page: Arc<HeadlessPage>,
        bridge: Arc<PrefixBridge>,
        _dir: tempfile::TempDir,
    }

    fn harness(ready: bool) -> Harness {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open_at(dir.path().join("settings.json"));
        let frame = Arc::new(HeadlessFrame::new());
        let page = Arc::new(HeadlessPage::new(false));
        let bridge = Arc::new(if ready {
            PrefixBridge::new("/service/")
        } else {
            PrefixBridge::loading("/service/")
        });
        let origin = Url::parse("https://shell.example/").unwrap();

        let app = ShellApp::new(
            store,
            bridge.clone(),
            frame.clone(),
            page.clone(),
            origin,
        );
        Harness {
            app,
            frame,
            page,
            bridge,
            _dir: dir,
        }
    }

    /// One scheduler breath: enough for the supervisor and agent ticks.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn launch_scenario_end_to_end() {
        let h = harness(true);

        let session = h.app.launch("example.com").unwrap().unwrap();
        assert_eq!(session.requested_url, "https://example.com");
        assert!(session.proxied_url.starts_with("https://shell.example/service/"));
        assert_eq!(h.app.controller().state(), SessionState::Active);

        // Adblock defaults on: the bootstrap lands once the agent ticks.
        settle().await;
        assert!(h.app.ad_suppression().is_running());
        assert_eq!(h.frame.injected_markers(), vec![SUPPRESSION_MARKER.to_string()]);
    }

    #[tokio::test]
    async fn engine_not_ready_is_surfaced_and_leaves_the_dashboard() {
        let h = harness(false);

        let err = h.app.launch("example.com").unwrap_err();
        assert!(matches!(err, SessionError::EngineNotReady));
        assert_eq!(h.app.controller().state(), SessionState::Idle);

        // The user re-invokes after the engine loads; nothing retried for
        // them in between.
        settle().await;
        assert!(!h.app.ad_suppression().is_running());
        h.bridge.set_ready(true);
        assert!(h.app.launch("example.com").unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_input_is_swallowed() {
        let h = harness(true);
        assert!(h.app.launch("").unwrap().is_none());
        assert_eq!(h.app.controller().state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn going_home_stops_the_suppression_timer() {
        let h = harness(true);

        h.app.launch("example.com").unwrap();
        settle().await;
        assert!(h.app.ad_suppression().is_running());

        h.app.controller().go_home();
        settle().await;
        assert!(!h.app.ad_suppression().is_running());
    }

    #[tokio::test]
    async fn toggling_adblock_follows_within_one_tick() {
        let h = harness(true);

        h.app.launch("example.com").unwrap();
        settle().await;
        assert!(h.app.ad_suppression().is_running());

        h.app.update_settings(|s| s.adblock_enabled = false);
        settle().await;
        assert!(!h.app.ad_suppression().is_running());

        h.app.update_settings(|s| s.adblock_enabled = true);
        settle().await;
        assert!(h.app.ad_suppression().is_running());
    }

    #[tokio::test]
    async fn cloak_changes_apply_before_update_returns() {
        let h = harness(true);
        assert_eq!(h.page.title(), TRUE_TITLE);

        h.app.set_cloak(CloakSettings {
            enabled: true,
            title: "Dashboard".to_string(),
            icon: "https://www.google.com/favicon.ico".to_string(),
        });
        assert_eq!(h.page.title(), "Dashboard");

        h.app.set_cloak(CloakSettings::default());
        assert_eq!(h.page.title(), TRUE_TITLE);
        assert_eq!(h.page.icon(), TRUE_ICON);
    }

    #[tokio::test]
    async fn panic_key_works_regardless_of_session_state() {
        let h = harness(true);
        h.app.set_panic(PanicSettings {
            key: Some("p".to_string()),
            action: PanicAction::Redirect,
        });

        // From the dashboard.
        assert_eq!(
            h.app.handle_key(&KeyEvent::new("P")),
            Some(PanicAction::Redirect)
        );
        assert_eq!(h.page.location().as_deref(), Some("https://clever.com"));

        // And mid-session.
        h.app.launch("example.com").unwrap();
        assert_eq!(
            h.app.handle_key(&KeyEvent::new("p")),
            Some(PanicAction::Redirect)
        );
        assert_eq!(h.app.handle_key(&KeyEvent::new("q")), None);
    }

    #[tokio::test]
    async fn custom_apps_append_to_the_catalog() {
        let h = harness(true);
        let before = h.app.quick_apps().len();

        h.app.add_custom_app(QuickApp::custom(
            "School",
            "https://example.edu",
            "https://example.edu/icon.png",
        ));
        let apps = h.app.quick_apps();
        assert_eq!(apps.len(), before + 1);
        assert!(apps.last().unwrap().is_custom);
    }
}
