pub mod channel;
pub mod cli;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod logging;
pub mod navigation;
pub mod tags;

#[cfg(feature = "desktop")]
use commands::*;

#[cfg(feature = "desktop")]
pub fn run() {
    use config::AppConfig;
    use tags::{FinderTagStore, TagAccessor};

    let config = AppConfig::load();
    logging::init_tracing(&config);

    let tag_state: TagState = TagAccessor::new(FinderTagStore, config.tag_mode);
    tracing::info!(
        capability = ?tag_state.capability(),
        channel = channel::TAG_CHANNEL,
        "Tag bridge ready"
    );

    tauri::Builder::default()
        .manage(tag_state)
        .invoke_handler(tauri::generate_handler![
            // Tag commands
            tag_channel,
            get_tag,
            set_tag,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(handle_run_event);
}

#[cfg(feature = "desktop")]
fn handle_run_event(app: &tauri::AppHandle, event: tauri::RunEvent) {
    #[cfg(target_os = "macos")]
    if let tauri::RunEvent::Opened { urls } = &event {
        navigation::forward_opened(app, urls);
    }

    #[cfg(not(target_os = "macos"))]
    let _ = (app, event);
}
