//! Ambient policy enforcement for the Eternity shell.
//!
//! Two process-wide policies live here: the panic key (an immediate escape
//! hatch away from the current session) and tab cloaking (disguising the
//! outer page's title and icon). Both are registered once at startup and
//! keep working regardless of which tab or session state is active.

pub mod cloak;
mod error;
pub mod guard;

pub use cloak::{CloakPreset, CloakSettings, PageIdentity, CLOAK_PRESETS};
pub use error::PolicyError;
pub use guard::{KeyEvent, PanicAction, PanicSettings, PanicTargets, PolicyGuard};

/// The outer page's mutable identity and location, as far as the policies
/// are concerned.
pub trait OuterPage: Send + Sync {
    /// Replace the displayed page title.
    fn set_title(&self, title: &str);

    /// Replace the page icon link.
    fn set_icon(&self, href: &str);

    /// Navigate the entire outer page away.
    fn navigate(&self, url: &str);

    /// Attempt to close the window. Returns false when the environment
    /// refuses (script-opened windows only, in most browsers).
    fn close(&self) -> bool;
}
