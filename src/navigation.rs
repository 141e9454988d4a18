//! Forwarding of OS "open file" requests to the UI.

use serde::Serialize;

/// Channel the UI listens on for navigation requests
pub const NAVIGATION_CHANNEL: &str = "xplor/navigation";

pub const OPEN_FILE: &str = "openFile";

/// Message pushed to the UI; `arguments` is the filename as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationMessage {
    pub method: String,
    pub arguments: String,
}

impl NavigationMessage {
    pub fn open_file(filename: impl Into<String>) -> Self {
        Self {
            method: OPEN_FILE.to_string(),
            arguments: filename.into(),
        }
    }
}

/// Emit one `openFile` message per file URL the OS handed us.
#[cfg(all(feature = "desktop", target_os = "macos"))]
pub fn forward_opened(app: &tauri::AppHandle, urls: &[tauri::Url]) {
    use tauri::Emitter;

    for url in urls {
        let Ok(path) = url.to_file_path() else {
            tracing::debug!(%url, "Ignoring non-file open request");
            continue;
        };
        let message = NavigationMessage::open_file(path.to_string_lossy());
        tracing::info!(file = %message.arguments, "Forwarding open-file request");
        if let Err(e) = app.emit(NAVIGATION_CHANNEL, &message) {
            tracing::warn!(error = %e, "Failed to emit navigation message");
        }
    }
}
