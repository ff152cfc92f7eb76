use std::sync::Arc;

use url::Url;

use eternity_shell::app::ShellApp;
use eternity_shell::headless::{HeadlessFrame, HeadlessPage, PrefixBridge};
use eternity_shell::settings::SettingsStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    log::info!(
        "Starting Eternity Shell v{} (headless harness)",
        env!("CARGO_PKG_VERSION")
    );

    let store = match SettingsStore::open() {
        Ok(store) => store,
        Err(e) => {
            log::error!("failed to open settings store: {}", e);
            std::process::exit(1);
        }
    };

    let frame = Arc::new(HeadlessFrame::new());
    let page = Arc::new(HeadlessPage::new(false));
    let bridge = Arc::new(PrefixBridge::new("/service/"));
    let origin = match Url::parse("https://localhost/") {
        Ok(origin) => origin,
        Err(e) => {
            log::error!("bad origin: {}", e);
            std::process::exit(1);
        }
    };

    let shell = ShellApp::new(store, bridge, frame.clone(), page, origin);
    log::info!("dashboard ready with {} quick apps", shell.quick_apps().len());

    if let Some(input) = std::env::args().nth(1) {
        match shell.launch(&input) {
            Ok(Some(session)) => {
                log::info!(
                    "session {} active: {} -> {}",
                    session.id,
                    session.requested_url,
                    session.proxied_url
                );
                // Give the suppression agent a tick before reporting.
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                log::info!("injected scripts: {:?}", frame.injected_markers());
                shell.controller().go_home();
            }
            Ok(None) => log::info!("nothing to launch"),
            Err(e) => log::warn!("launch failed: {}", e),
        }
    }
}
