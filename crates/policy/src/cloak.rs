//! Tab cloaking: disguising the outer page as an innocuous application.
//!
//! Cloaking has no control surface beyond Settings. Whenever the cloak
//! settings change (including on load) the outer page's title and icon are
//! swapped to the decoy values, and restored to the true identity when
//! disabled.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{OuterPage, PolicyError};

/// The page's true title and icon, restored when cloaking is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    pub title: String,
    pub icon: String,
}

/// Cloaking configuration. The decoy fields are only meaningful while
/// `enabled` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloakSettings {
    pub enabled: bool,
    pub title: String,
    pub icon: String,
}

impl Default for CloakSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Dashboard".to_string(),
            icon: "https://www.google.com/favicon.ico".to_string(),
        }
    }
}

impl CloakSettings {
    /// Check that the decoy icon is an absolute URL.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.enabled && Url::parse(&self.icon).is_err() {
            return Err(PolicyError::InvalidDecoyIcon(self.icon.clone()));
        }
        Ok(())
    }
}

/// A ready-made decoy identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloakPreset {
    pub name: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

/// Decoy identities for common school portals.
pub const CLOAK_PRESETS: &[CloakPreset] = &[
    CloakPreset {
        name: "Google",
        title: "Google",
        icon: "https://www.google.com/favicon.ico",
    },
    CloakPreset {
        name: "Google Drive",
        title: "My Drive - Google Drive",
        icon: "https://ssl.gstatic.com/docs/doclist/images/drive_2022q3_32dp.png",
    },
    CloakPreset {
        name: "Canvas",
        title: "Dashboard",
        icon: "https://du11hjcvx0uqb.cloudfront.net/br/dist/images/favicon-e106157072.ico",
    },
    CloakPreset {
        name: "Clever",
        title: "Clever | Portal",
        icon: "https://assets.clever.com/launchpad/8061327/favicon.ico",
    },
];

/// Apply the cloak (or restore the true identity) to the outer page.
pub fn apply(page: &dyn OuterPage, settings: &CloakSettings, identity: &PageIdentity) {
    if settings.enabled {
        log::debug!("cloaking as {:?}", settings.title);
        page.set_title(&settings.title);
        page.set_icon(&settings.icon);
    } else {
        page.set_title(&identity.title);
        page.set_icon(&identity.icon);
    }
}
