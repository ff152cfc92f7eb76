//! Eternity shell: the tabbed unblocker dashboard and its proxy-backed
//! browsing session.
//!
//! The heavy lifting lives in `eternity-session` (session state machine,
//! resolver, agents) and `eternity-policy` (panic key, cloaking). This
//! crate adds the durable settings store, the quick-launch catalog, the
//! application wiring, and headless collaborators for running without a
//! browser environment.

pub mod app;
pub mod headless;
pub mod quickapps;
pub mod settings;

pub use app::ShellApp;
pub use quickapps::QuickApp;
pub use settings::{Settings, SettingsStore};
