//! The global policy guard: a process-wide keyboard listener enforcing the
//! panic key and keeping the cloak applied.
//!
//! The guard is registered once at startup and outlives every screen; its
//! policy logic is decoupled from any single tab's lifecycle. It only
//! covers the outer page's listener: embedded content stealing focus is a
//! known limitation of the platform, not of this module.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::cloak::{self, CloakSettings, PageIdentity};
use crate::{OuterPage, PolicyError};

/// Key values that name modifier keys. A panic trigger must be a real
/// keystroke, so these never match.
const MODIFIER_KEYS: &[&str] = &[
    "alt", "altgraph", "capslock", "control", "fn", "hyper", "meta", "numlock", "scrolllock",
    "shift", "super", "symbol",
];

/// A keyboard event as seen by the outer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key value, e.g. `"p"`, `"Escape"`, `"Shift"`.
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Whether this is a modifier-only press.
    pub fn is_modifier(&self) -> bool {
        MODIFIER_KEYS
            .iter()
            .any(|m| self.key.eq_ignore_ascii_case(m))
    }
}

/// What the panic key does when pressed. At most one action fires per
/// trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicAction {
    /// Navigate the whole outer page to a neutral destination.
    #[default]
    Redirect,
    /// Attempt to close the window, falling back to a blank destination.
    Close,
}

/// Panic-key configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanicSettings {
    /// The configured trigger, or None to disable the panic key.
    pub key: Option<String>,
    pub action: PanicAction,
}

impl PanicSettings {
    /// Check that the trigger is a single physical key.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if let Some(key) = &self.key {
            if key.chars().count() != 1 {
                return Err(PolicyError::InvalidPanicKey(key.clone()));
            }
        }
        Ok(())
    }
}

/// Where the panic actions send the outer page. The exact destinations are
/// configuration, not semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicTargets {
    /// Destination for [`PanicAction::Redirect`].
    pub redirect: String,
    /// Fallback destination when the close attempt is refused.
    pub blank: String,
}

impl Default for PanicTargets {
    fn default() -> Self {
        Self {
            redirect: "https://clever.com".to_string(),
            blank: "about:blank".to_string(),
        }
    }
}

/// Process-wide enforcement of the panic key and the cloak.
pub struct PolicyGuard {
    page: Arc<dyn OuterPage>,
    identity: PageIdentity,
    targets: PanicTargets,
    panic: RwLock<PanicSettings>,
    cloak: RwLock<CloakSettings>,
}

impl PolicyGuard {
    /// Create a guard over the outer page, recording its true identity for
    /// later restoration. The page starts uncloaked.
    pub fn new(page: Arc<dyn OuterPage>, identity: PageIdentity) -> Self {
        Self::with_targets(page, identity, PanicTargets::default())
    }

    /// Create a guard with custom panic destinations.
    pub fn with_targets(
        page: Arc<dyn OuterPage>,
        identity: PageIdentity,
        targets: PanicTargets,
    ) -> Self {
        let guard = Self {
            page,
            identity,
            targets,
            panic: RwLock::new(PanicSettings::default()),
            cloak: RwLock::new(CloakSettings::default()),
        };
        cloak::apply(guard.page.as_ref(), &guard.cloak.read(), &guard.identity);
        guard
    }

    /// Apply a new settings snapshot. The cloak is re-applied synchronously
    /// on every call, so the change is visible to the very next event.
    pub fn apply_settings(
        &self,
        panic: PanicSettings,
        cloak_settings: CloakSettings,
    ) -> Result<(), PolicyError> {
        panic.validate()?;
        cloak_settings.validate()?;

        *self.panic.write() = panic;
        cloak::apply(self.page.as_ref(), &cloak_settings, &self.identity);
        *self.cloak.write() = cloak_settings;
        Ok(())
    }

    /// Handle a key press from the process-wide listener.
    ///
    /// Returns the action that fired, if any, so the caller can stop the
    /// event from reaching normal UI handling. Matching is case-insensitive
    /// on the single configured key; modifier-only presses never match.
    pub fn handle_key(&self, event: &KeyEvent) -> Option<PanicAction> {
        let panic = self.panic.read();
        let trigger = panic.key.as_deref()?;

        if event.is_modifier() || !event.key.eq_ignore_ascii_case(trigger) {
            return None;
        }

        let action = panic.action;
        drop(panic);

        log::warn!("panic key pressed, action {:?}", action);
        match action {
            PanicAction::Redirect => {
                self.page.navigate(&self.targets.redirect);
            }
            PanicAction::Close => {
                if !self.page.close() {
                    self.page.navigate(&self.targets.blank);
                }
            }
        }
        Some(action)
    }

    /// The currently applied cloak settings.
    pub fn cloak(&self) -> CloakSettings {
        self.cloak.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingPage {
        titles: Mutex<Vec<String>>,
        icons: Mutex<Vec<String>>,
        navigations: Mutex<Vec<String>>,
        close_allowed: bool,
        closes: Mutex<usize>,
    }

    impl RecordingPage {
        fn closable(allowed: bool) -> Self {
            Self {
                close_allowed: allowed,
                ..Self::default()
            }
        }
    }

    impl OuterPage for RecordingPage {
        fn set_title(&self, title: &str) {
            self.titles.lock().push(title.to_string());
        }

        fn set_icon(&self, href: &str) {
            self.icons.lock().push(href.to_string());
        }

        fn navigate(&self, url: &str) {
            self.navigations.lock().push(url.to_string());
        }

        fn close(&self) -> bool {
            *self.closes.lock() += 1;
            self.close_allowed
        }
    }

    fn identity() -> PageIdentity {
        PageIdentity {
            title: "Eternity".to_string(),
            icon: "https://picsum.photos/32/32".to_string(),
        }
    }

    fn guard(page: Arc<RecordingPage>) -> PolicyGuard {
        PolicyGuard::new(page, identity())
    }

    fn armed(page: Arc<RecordingPage>, key: &str, action: PanicAction) -> PolicyGuard {
        let guard = guard(page);
        guard
            .apply_settings(
                PanicSettings {
                    key: Some(key.to_string()),
                    action,
                },
                CloakSettings::default(),
            )
            .unwrap();
        guard
    }

    #[test]
    fn no_configured_key_means_no_action() {
        let page = Arc::new(RecordingPage::default());
        let guard = guard(page.clone());

        assert_eq!(guard.handle_key(&KeyEvent::new("p")), None);
        assert!(page.navigations.lock().is_empty());
    }

    #[test]
    fn matching_key_fires_exactly_one_redirect() {
        let page = Arc::new(RecordingPage::default());
        let guard = armed(page.clone(), "p", PanicAction::Redirect);

        assert_eq!(guard.handle_key(&KeyEvent::new("P")), Some(PanicAction::Redirect));
        assert_eq!(page.navigations.lock().as_slice(), ["https://clever.com"]);

        // A different key fires nothing.
        assert_eq!(guard.handle_key(&KeyEvent::new("q")), None);
        assert_eq!(page.navigations.lock().len(), 1);
    }

    #[test]
    fn close_falls_back_to_blank_when_refused() {
        let page = Arc::new(RecordingPage::closable(false));
        let guard = armed(page.clone(), "x", PanicAction::Close);

        assert_eq!(guard.handle_key(&KeyEvent::new("x")), Some(PanicAction::Close));
        assert_eq!(*page.closes.lock(), 1);
        assert_eq!(page.navigations.lock().as_slice(), ["about:blank"]);
    }

    #[test]
    fn successful_close_skips_the_fallback() {
        let page = Arc::new(RecordingPage::closable(true));
        let guard = armed(page.clone(), "x", PanicAction::Close);

        guard.handle_key(&KeyEvent::new("x"));
        assert_eq!(*page.closes.lock(), 1);
        assert!(page.navigations.lock().is_empty());
    }

    #[test]
    fn modifier_only_presses_are_ignored() {
        let page = Arc::new(RecordingPage::default());
        let guard = armed(page.clone(), "s", PanicAction::Redirect);

        assert_eq!(guard.handle_key(&KeyEvent::new("Shift")), None);
        assert!(page.navigations.lock().is_empty());
    }

    #[test]
    fn multi_character_panic_keys_are_rejected() {
        let page = Arc::new(RecordingPage::default());
        let guard = guard(page);

        let err = guard
            .apply_settings(
                PanicSettings {
                    key: Some("ab".to_string()),
                    action: PanicAction::Redirect,
                },
                CloakSettings::default(),
            )
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPanicKey(_)));
    }

    #[test]
    fn enabling_the_cloak_swaps_title_and_icon() {
        let page = Arc::new(RecordingPage::default());
        let guard = guard(page.clone());

        guard
            .apply_settings(
                PanicSettings::default(),
                CloakSettings {
                    enabled: true,
                    title: "Dashboard".to_string(),
                    icon: "https://www.google.com/favicon.ico".to_string(),
                },
            )
            .unwrap();
        assert_eq!(page.titles.lock().last().unwrap(), "Dashboard");
        assert_eq!(
            page.icons.lock().last().unwrap(),
            "https://www.google.com/favicon.ico"
        );
    }

    #[test]
    fn disabling_the_cloak_restores_the_true_identity() {
        let page = Arc::new(RecordingPage::default());
        let guard = guard(page.clone());

        guard
            .apply_settings(
                PanicSettings::default(),
                CloakSettings {
                    enabled: true,
                    ..CloakSettings::default()
                },
            )
            .unwrap();
        guard
            .apply_settings(PanicSettings::default(), CloakSettings::default())
            .unwrap();
        assert_eq!(page.titles.lock().last().unwrap(), "Eternity");
        assert_eq!(page.icons.lock().last().unwrap(), "https://picsum.photos/32/32");
    }
}
