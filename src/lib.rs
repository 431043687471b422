mod activities;
mod builds;
mod hotkey;
mod http;
mod projector;
mod reference;
mod search;
mod settings;
mod worldfeed;
mod worldstate;

use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let world_feed: worldfeed::SharedWorldFeed =
        Arc::new(RwLock::new(worldfeed::WorldFeedState::new()));

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .manage(world_feed.clone())
        .setup(move |app| {
            builds::load_cache_from_disk(app.handle());
            worldfeed::spawn_world_loop(app.handle().clone(), world_feed.clone());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            worldfeed::get_world_text,
            worldfeed::get_activities_text,
            worldfeed::force_refresh,
            search::search_item,
            reference::get_reference_text,
            builds::lookup_build,
            builds::update_build_cache,
            settings::load_config,
            settings::save_config,
            hotkey::register_overlay_hotkeys,
            hotkey::unregister_overlay_hotkeys,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
