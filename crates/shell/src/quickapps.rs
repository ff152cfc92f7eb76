//! Quick-launch application catalog for the dashboard.

use serde::{Deserialize, Serialize};

/// A quick-launch tile. The core only ever consumes `url` (as resolver
/// input); the rest is dashboard presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickApp {
    pub name: String,
    pub url: String,
    pub icon: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl QuickApp {
    /// A user-added tile.
    pub fn custom(name: impl Into<String>, url: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
            is_custom: true,
        }
    }
}

/// The built-in catalog shown before any custom apps.
pub fn default_apps() -> Vec<QuickApp> {
    const BUILTIN: &[(&str, &str, &str)] = &[
        ("YouTube", "https://youtube.com", "https://www.youtube.com/favicon.ico"),
        ("TikTok", "https://tiktok.com", "https://www.tiktok.com/favicon.ico"),
        ("Discord", "https://discord.com", "https://discord.com/assets/favicon.ico"),
        ("Twitter", "https://twitter.com", "https://abs.twimg.com/favicons/twitter.ico"),
        (
            "Roblox",
            "https://now.gg/apps/roblox-corporation/5349/roblox.html",
            "https://www.roblox.com/favicon.ico",
        ),
        (
            "GeForce Now",
            "https://play.geforcenow.com",
            "https://play.geforcenow.com/favicon.ico",
        ),
        ("Xbox Cloud", "https://www.xbox.com/play", "https://www.xbox.com/favicon.ico"),
    ];

    BUILTIN
        .iter()
        .map(|(name, url, icon)| QuickApp {
            name: (*name).to_string(),
            url: (*url).to_string(),
            icon: (*icon).to_string(),
            is_custom: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_apps_have_absolute_urls() {
        for app in default_apps() {
            assert!(app.url.starts_with("https://"), "bad url for {}", app.name);
            assert!(!app.is_custom);
        }
    }

    #[test]
    fn custom_apps_are_flagged() {
        let app = QuickApp::custom("School", "https://example.edu", "https://example.edu/icon.png");
        assert!(app.is_custom);
    }
}
