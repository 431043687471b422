use std::sync::Mutex;
use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

pub const TOGGLE_HOTKEY: &str = "ctrl+alt+o";
pub const EXIT_HOTKEY: &str = "ctrl+alt+x";

lazy_static::lazy_static! {
    static ref HOTKEYS_REGISTERED: Mutex<bool> = Mutex::new(false);
}

#[tauri::command]
pub async fn register_overlay_hotkeys(app_handle: AppHandle) -> Result<(), String> {
    let mut registered = HOTKEYS_REGISTERED.lock().map_err(|e| e.to_string())?;
    if *registered {
        return Ok(());
    }

    let toggle_handle = app_handle.clone();
    app_handle
        .global_shortcut()
        .on_shortcut(TOGGLE_HOTKEY, move |_app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                toggle_overlay(&toggle_handle);
            }
        })
        .map_err(|e| format!("Failed to register hotkey '{}': {}. This key might already be in use by another application.", TOGGLE_HOTKEY, e))?;

    let exit_handle = app_handle.clone();
    app_handle
        .global_shortcut()
        .on_shortcut(EXIT_HOTKEY, move |_app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                exit_handle.exit(0);
            }
        })
        .map_err(|e| {
            let _ = app_handle.global_shortcut().unregister(TOGGLE_HOTKEY);
            format!("Failed to register hotkey '{}': {}", EXIT_HOTKEY, e)
        })?;

    *registered = true;

    Ok(())
}

#[tauri::command]
pub async fn unregister_overlay_hotkeys(app_handle: AppHandle) -> Result<(), String> {
    let mut registered = HOTKEYS_REGISTERED.lock().map_err(|e| e.to_string())?;
    if !*registered {
        return Ok(());
    }

    app_handle
        .global_shortcut()
        .unregister(TOGGLE_HOTKEY)
        .map_err(|e| format!("Failed to unregister hotkey: {}", e))?;
    app_handle
        .global_shortcut()
        .unregister(EXIT_HOTKEY)
        .map_err(|e| format!("Failed to unregister hotkey: {}", e))?;

    *registered = false;

    Ok(())
}

fn toggle_overlay(app_handle: &AppHandle) {
    let Some(window) = app_handle.get_webview_window("main") else {
        tracing::warn!("Overlay window not found for toggle hotkey");
        return;
    };

    let visible = window.is_visible().unwrap_or(true);
    let result = if visible {
        window.hide()
    } else {
        window.show().and_then(|_| window.set_focus())
    };

    if let Err(error) = result {
        tracing::warn!(window_error = %error, "Failed to toggle overlay visibility");
    }
}
