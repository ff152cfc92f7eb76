//! Durable settings for the whole shell.
//!
//! The persisted snapshot is merged over hardcoded defaults on load:
//! missing or unknown fields fall back silently, and a corrupt file falls
//! back to all defaults. Saving is fire-and-forget on every change. All
//! writes funnel through [`SettingsStore::update`], so every reader
//! observes a consistent snapshot, and change notification goes out over a
//! watch channel.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use eternity_policy::{CloakSettings, PanicSettings};

use crate::quickapps::QuickApp;

/// Settings errors. Only opening the store can fail loudly; saves are
/// fire-and-forget.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration directory not found")]
    ConfigDirNotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decorative canvas effect behind the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundEffect {
    #[default]
    None,
    Rain,
    Stars,
    Grid,
}

/// Which pre-built proxy engine the shell targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyBackend {
    #[default]
    Ultraviolet,
    Scramjet,
    Rammerhead,
}

/// The full settings snapshot. The core components only consume a subset
/// (panic, cloak, adblock flag); the rest drives the dashboard surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background image URL, or "black" for a plain backdrop.
    pub background: String,
    /// User-uploaded background, overriding `background` when set.
    pub custom_background: Option<String>,
    pub active_effect: BackgroundEffect,
    pub rain_seed: f64,
    pub glow_intensity: f32,
    pub brand_color: String,
    pub panic: PanicSettings,
    pub cloak: CloakSettings,
    pub backend: ProxyBackend,
    pub custom_apps: Vec<QuickApp>,
    pub adblock_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background: "black".to_string(),
            custom_background: None,
            active_effect: BackgroundEffect::None,
            rain_seed: 0.5,
            glow_intensity: 1.0,
            brand_color: "#ffffff".to_string(),
            panic: PanicSettings::default(),
            cloak: CloakSettings::default(),
            backend: ProxyBackend::default(),
            custom_apps: Vec::new(),
            adblock_enabled: true,
        }
    }
}

/// Settings store: load-or-default at open, single update entry point,
/// watch-channel snapshots for readers.
pub struct SettingsStore {
    path: PathBuf,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store in the user's configuration directory.
    pub fn open() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("eternity");
        std::fs::create_dir_all(&dir)?;
        Ok(Self::open_at(dir.join("settings.json")))
    }

    /// Open the store against an explicit file path.
    pub fn open_at(path: PathBuf) -> Self {
        let settings = Self::load(&path);
        let (tx, _) = watch::channel(settings);
        Self { path, tx }
    }

    /// Load the last saved snapshot merged over defaults. Unreadable or
    /// corrupt data silently falls back to all defaults.
    fn load(path: &Path) -> Settings {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Settings::default(),
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("settings file corrupt, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    /// Current snapshot.
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Apply a change, persist it (fire-and-forget) and notify every
    /// subscriber. Returns the new snapshot.
    pub fn update<F>(&self, apply: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.tx.borrow().clone();
        apply(&mut settings);
        self.save(&settings);
        self.tx.send_replace(settings.clone());
        settings
    }

    /// Subscribe to settings snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    fn save(&self, settings: &Settings) {
        let content = match serde_json::to_string_pretty(settings) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("failed to serialize settings: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, content) {
            log::warn!("failed to save settings: {}", e);
        }
    }
}
