use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tauri::{AppHandle, Emitter, Manager};
use tokio::sync::RwLock;

use crate::projector::{CountdownProjector, Projection};
use crate::worldstate::WorldState;

pub const WORLD_STATE_URL: &str = "https://api.warframestat.us/pc";

const FETCH_INTERVAL_SECS: u64 = 120;
const PROJECTION_TICK_SECS: u64 = 1;
const CACHE_FILE_NAME: &str = "worldstate_cache.json";
const FIRST_FETCH_FAILURE_TEXT: &str = "World state unavailable. Retrying...";

/// The world store, the projector, and the in-flight fetch gate, owned
/// together behind one lock so `ingest` calls are always serialized.
pub struct WorldFeedState {
    world: WorldState,
    projector: CountdownProjector,
    fetch_in_flight: bool,
}

pub type SharedWorldFeed = Arc<RwLock<WorldFeedState>>;

impl WorldFeedState {
    pub fn new() -> Self {
        Self {
            world: WorldState::new(),
            projector: CountdownProjector::new(),
            fetch_in_flight: false,
        }
    }

    /// Claims the fetch gate. A request arriving while another fetch is
    /// outstanding is dropped, not queued; every claimed attempt counts
    /// against the refresh guard whether or not it later succeeds.
    fn try_begin_fetch(&mut self, now: DateTime<Utc>) -> bool {
        if self.fetch_in_flight {
            return false;
        }
        self.fetch_in_flight = true;
        self.projector.record_fetch_attempt(now);
        true
    }

    fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    fn project(&self, now: DateTime<Utc>) -> Projection {
        self.projector.tick(&self.world, now)
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldTextPayload {
    pub text: String,
}

/// Seeds the store from the snapshot cache, then drives the fixed cadence:
/// a full fetch every 120 s, a local projection every second, and an
/// expiry-triggered refetch subject to the projector's guard.
pub fn spawn_world_loop(app_handle: AppHandle, state: SharedWorldFeed) {
    tauri::async_runtime::spawn(async move {
        seed_from_cache(&app_handle, &state).await;

        let mut fetch_timer = tokio::time::interval(Duration::from_secs(FETCH_INTERVAL_SECS));
        let mut tick_timer = tokio::time::interval(Duration::from_secs(PROJECTION_TICK_SECS));

        loop {
            tokio::select! {
                _ = fetch_timer.tick() => {
                    run_fetch(&app_handle, &state).await;
                }
                _ = tick_timer.tick() => {
                    let projection = {
                        let feed = state.read().await;
                        feed.project(Utc::now())
                    };
                    emit_cycles(&app_handle, projection.text);
                    if projection.refresh_due {
                        run_fetch(&app_handle, &state).await;
                    }
                }
            }
        }
    });
}

pub async fn run_fetch(app_handle: &AppHandle, state: &SharedWorldFeed) {
    {
        let mut feed = state.write().await;
        if !feed.try_begin_fetch(Utc::now()) {
            tracing::debug!("World-state fetch already in flight, dropping request");
            return;
        }
    }

    let result = fetch_world_state(crate::http::client()).await;

    let mut feed = state.write().await;
    feed.finish_fetch();
    match result {
        Ok(raw) => {
            let now = Utc::now();
            feed.world.ingest(&raw, now);
            let projection = feed.project(now);
            let activities = feed.world.activities().to_string();
            drop(feed);

            persist_cache(app_handle, &raw);
            emit_cycles(app_handle, projection.text);
            emit_activities(app_handle, activities);
        }
        Err(error) => {
            let never_fetched = feed.world.last_fetch_time().is_none();
            drop(feed);

            tracing::warn!(fetch_error = %error, "World-state fetch failed");
            if never_fetched {
                emit_cycles(app_handle, FIRST_FETCH_FAILURE_TEXT.to_string());
            }
        }
    }
}

async fn fetch_world_state(client: &reqwest::Client) -> Result<Value, String> {
    // The cache-busting query parameter and no-cache headers keep some
    // intermediaries from serving a stale snapshot.
    let url = format!("{WORLD_STATE_URL}/?language=en&_={}", Utc::now().timestamp());

    let response = client
        .get(&url)
        .header("Cache-Control", "no-cache")
        .header("Pragma", "no-cache")
        .send()
        .await
        .map_err(|error| error.to_string())?
        .error_for_status()
        .map_err(|error| error.to_string())?;

    response
        .json::<Value>()
        .await
        .map_err(|error| error.to_string())
}

/// Pre-seeds the store from the last persisted snapshot so the overlay is
/// never blank on launch. Not a fetch attempt: the stale expiries will flag
/// `refresh_due` and the startup fetch must not be throttled by the guard.
async fn seed_from_cache(app_handle: &AppHandle, state: &SharedWorldFeed) {
    let Some(path) = cache_path(app_handle) else {
        return;
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return;
    };
    let Ok(raw) = serde_json::from_str::<Value>(&text) else {
        tracing::debug!(path = %path.display(), "Snapshot cache unreadable, starting empty");
        return;
    };

    let (projection, activities) = {
        let mut feed = state.write().await;
        let now = Utc::now();
        feed.world.ingest(&raw, now);
        (feed.project(now), feed.world.activities().to_string())
    };

    tracing::info!(path = %path.display(), "Seeded world state from snapshot cache");
    emit_cycles(app_handle, projection.text);
    emit_activities(app_handle, activities);
}

/// Writes the verbatim raw snapshot next to the app's data. Failures are
/// logged and ignored; the cache is an optimization, not state.
fn persist_cache(app_handle: &AppHandle, raw: &Value) {
    let Some(path) = cache_path(app_handle) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(error) = std::fs::create_dir_all(parent) {
            tracing::warn!(cache_error = %error, "Failed to create snapshot cache directory");
            return;
        }
    }
    match serde_json::to_string(raw) {
        Ok(text) => {
            if let Err(error) = std::fs::write(&path, text) {
                tracing::warn!(
                    path = %path.display(),
                    cache_error = %error,
                    "Failed to persist snapshot cache"
                );
            }
        }
        Err(error) => {
            tracing::warn!(cache_error = %error, "Failed to serialize snapshot cache");
        }
    }
}

fn cache_path(app_handle: &AppHandle) -> Option<PathBuf> {
    app_handle
        .path()
        .app_data_dir()
        .ok()
        .map(|dir| dir.join(CACHE_FILE_NAME))
}

fn emit_cycles(app_handle: &AppHandle, text: String) {
    if let Err(error) = app_handle.emit("cycles-update", WorldTextPayload { text }) {
        tracing::warn!(emit_error = %error, "Failed to emit cycles update");
    }
}

fn emit_activities(app_handle: &AppHandle, text: String) {
    if let Err(error) = app_handle.emit("activities-update", WorldTextPayload { text }) {
        tracing::warn!(emit_error = %error, "Failed to emit activities update");
    }
}

#[tauri::command]
pub async fn get_world_text(
    state: tauri::State<'_, SharedWorldFeed>,
) -> Result<WorldTextPayload, String> {
    let feed = state.read().await;
    Ok(WorldTextPayload {
        text: feed.project(Utc::now()).text,
    })
}

#[tauri::command]
pub async fn get_activities_text(
    state: tauri::State<'_, SharedWorldFeed>,
) -> Result<WorldTextPayload, String> {
    let feed = state.read().await;
    Ok(WorldTextPayload {
        text: feed.world.activities().to_string(),
    })
}

#[tauri::command]
pub async fn force_refresh(
    app_handle: AppHandle,
    state: tauri::State<'_, SharedWorldFeed>,
) -> Result<(), String> {
    run_fetch(&app_handle, state.inner()).await;
    Ok(())
}
