use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tauri::{AppHandle, Manager};

const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted user settings. Window geometry is handled by the
/// window-state plugin, so only the notes pad lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub notes: String,
    pub version: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            notes: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn config_path(app_handle: &AppHandle) -> Result<PathBuf, String> {
    app_handle
        .path()
        .app_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .map_err(|error| error.to_string())
}

#[tauri::command]
pub fn load_config(app_handle: AppHandle) -> Result<OverlayConfig, String> {
    let path = config_path(&app_handle)?;
    let Ok(text) = std::fs::read_to_string(&path) else {
        return Ok(OverlayConfig::default());
    };

    match serde_json::from_str(&text) {
        Ok(config) => Ok(config),
        Err(error) => {
            tracing::warn!(config_error = %error, "Failed to parse config, using defaults");
            Ok(OverlayConfig::default())
        }
    }
}

#[tauri::command]
pub fn save_config(app_handle: AppHandle, config: OverlayConfig) -> Result<(), String> {
    let path = config_path(&app_handle)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| error.to_string())?;
    }

    let text = serde_json::to_string_pretty(&config).map_err(|error| error.to_string())?;
    std::fs::write(&path, text).map_err(|error| error.to_string())
}
