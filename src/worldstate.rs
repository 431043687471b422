use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_NIGHTWAVE_CHALLENGES: usize = 3;

/// A tracked world location and where its cycle lives in the upstream feed.
#[derive(Debug, Clone, Copy)]
pub struct TrackedCycle {
    /// Internal key, also the key in the store's cycle map.
    pub key: &'static str,
    /// Field name in the raw world-state snapshot.
    pub feed_field: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Some locations report their active state under a different key
    /// (cambion uses `active` instead of `state`). Checked first.
    pub alt_state_field: Option<&'static str>,
}

/// Fixed display order.
pub const TRACKED_CYCLES: [TrackedCycle; 5] = [
    TrackedCycle {
        key: "earth",
        feed_field: "earthCycle",
        label: "Earth",
        alt_state_field: None,
    },
    TrackedCycle {
        key: "cetus",
        feed_field: "cetusCycle",
        label: "Cetus",
        alt_state_field: None,
    },
    TrackedCycle {
        key: "vallis",
        feed_field: "vallisCycle",
        label: "Vallis",
        alt_state_field: None,
    },
    TrackedCycle {
        key: "cambion",
        feed_field: "cambionCycle",
        label: "Cambion",
        alt_state_field: Some("active"),
    },
    TrackedCycle {
        key: "zariman",
        feed_field: "zarimanCycle",
        label: "Zariman",
        alt_state_field: None,
    },
];

/// One location's server-reported cycle at the time of the last fetch.
///
/// `state` is opaque text: the server introduces new labels over time, so no
/// enumeration here. `expiry` is absent whenever the feed omits it or the
/// timestamp fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub state: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl CycleSnapshot {
    /// Sentinel for locations the feed never reported.
    pub fn unknown() -> Self {
        Self {
            state: "N/A".to_string(),
            expiry: None,
        }
    }

    fn from_feed(cycle: &TrackedCycle, entry: &Value) -> Self {
        let state = cycle
            .alt_state_field
            .and_then(|field| entry.get(field))
            .or_else(|| entry.get("state"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();

        Self {
            state,
            expiry: parse_expiry(entry.get("expiry").and_then(Value::as_str)),
        }
    }
}

/// Latest server-reported snapshot of all tracked cycles plus the rendered
/// nightwave and activities text blocks.
///
/// Replaced wholesale on every successful ingest; mutated only by the fetch
/// controller that owns it, read by the projector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    cycles: HashMap<String, CycleSnapshot>,
    nightwave: String,
    activities: String,
    last_fetch: Option<DateTime<Utc>>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole snapshot from a raw world-state payload.
    ///
    /// A fresh cycle map is built first and swapped in at the end, so a
    /// reader never sees a mix of old and new entries. Missing locations are
    /// simply absent from the new map; malformed expiries become `None`.
    pub fn ingest(&mut self, raw: &Value, fetched_at: DateTime<Utc>) {
        let mut cycles = HashMap::new();
        for cycle in &TRACKED_CYCLES {
            if let Some(entry) = raw.get(cycle.feed_field) {
                cycles.insert(cycle.key.to_string(), CycleSnapshot::from_feed(cycle, entry));
            }
        }

        self.cycles = cycles;
        self.nightwave = render_nightwave(raw);
        self.activities = crate::activities::render_activities(raw);
        self.last_fetch = Some(fetched_at);
    }

    /// Snapshot for a location, or the `N/A` sentinel when the feed never
    /// reported it (or the key is not tracked at all).
    pub fn get(&self, key: &str) -> CycleSnapshot {
        self.cycles
            .get(key)
            .cloned()
            .unwrap_or_else(CycleSnapshot::unknown)
    }

    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    pub fn nightwave(&self) -> &str {
        &self.nightwave
    }

    pub fn activities(&self) -> &str {
        &self.activities
    }
}

/// Parses an ISO-8601 expiry from the feed. A trailing `Z` UTC designator is
/// normalized to an explicit `+00:00` offset first. Anything unparseable is
/// treated as "no expiry known".
pub fn parse_expiry(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn render_nightwave(raw: &Value) -> String {
    let challenges = raw
        .get("nightwave")
        .and_then(|nightwave| nightwave.get("activeChallenges"))
        .and_then(Value::as_array);

    let Some(challenges) = challenges.filter(|list| !list.is_empty()) else {
        return String::new();
    };

    let mut block = String::from("Nightwave:");
    for challenge in challenges.iter().take(MAX_NIGHTWAVE_CHALLENGES) {
        let title = challenge
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        let reputation = challenge
            .get("reputation")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        block.push_str(&format!("\n- {title} ({reputation})"));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn cycle_entry(state: &str, expiry: &str) -> Value {
        json!({ "state": state, "expiry": expiry })
    }

    #[test]
    fn z_suffix_parses_to_same_instant_as_explicit_offset() {
        let with_z = parse_expiry(Some("2026-02-08T20:00:00.558Z"));
        let with_offset = parse_expiry(Some("2026-02-08T20:00:00.558+00:00"));

        assert!(with_z.is_some());
        assert_eq!(with_z, with_offset);
    }

    #[test]
    fn malformed_expiry_becomes_none() {
        assert_eq!(parse_expiry(Some("not a timestamp")), None);
        assert_eq!(parse_expiry(Some("2026-13-45T99:00:00Z")), None);
        assert_eq!(parse_expiry(Some("")), None);
        assert_eq!(parse_expiry(None), None);
    }

    #[test]
    fn ingest_tolerates_malformed_expiry() {
        let mut world = WorldState::new();
        let raw = json!({
            "earthCycle": { "state": "day", "expiry": "garbage" }
        });

        world.ingest(&raw, Utc::now());

        let earth = world.get("earth");
        assert_eq!(earth.state, "day");
        assert_eq!(earth.expiry, None);
    }

    #[test]
    fn cambion_reads_alternate_active_key_first() {
        let mut world = WorldState::new();
        let raw = json!({
            "cambionCycle": { "active": "fass", "expiry": "2026-02-08T20:00:00.558Z" }
        });

        world.ingest(&raw, Utc::now());

        let cambion = world.get("cambion");
        assert_eq!(cambion.state, "fass");
        assert_eq!(
            cambion.expiry,
            Some(Utc.with_ymd_and_hms(2026, 2, 8, 20, 0, 0).unwrap()
                + chrono::Duration::milliseconds(558))
        );
    }

    #[test]
    fn cambion_falls_back_to_standard_state_key() {
        let mut world = WorldState::new();
        let raw = json!({
            "cambionCycle": { "state": "vome" }
        });

        world.ingest(&raw, Utc::now());

        assert_eq!(world.get("cambion").state, "vome");
    }

    #[test]
    fn missing_state_defaults_to_unknown() {
        let mut world = WorldState::new();
        let raw = json!({
            "vallisCycle": { "expiry": "2026-02-08T20:00:00Z" }
        });

        world.ingest(&raw, Utc::now());

        assert_eq!(world.get("vallis").state, "Unknown");
    }

    #[test]
    fn never_ingested_location_yields_sentinel() {
        let world = WorldState::new();

        let earth = world.get("earth");
        assert_eq!(earth.state, "N/A");
        assert_eq!(earth.expiry, None);

        let untracked = world.get("duviri");
        assert_eq!(untracked.state, "N/A");
    }

    #[test]
    fn ingest_replaces_snapshot_wholesale() {
        let mut world = WorldState::new();
        world.ingest(
            &json!({
                "earthCycle": cycle_entry("day", "2026-02-08T20:00:00Z"),
                "cetusCycle": cycle_entry("night", "2026-02-08T20:30:00Z")
            }),
            Utc::now(),
        );

        // Second feed drops cetus entirely; no stale entry may survive.
        world.ingest(
            &json!({ "earthCycle": cycle_entry("night", "2026-02-09T08:00:00Z") }),
            Utc::now(),
        );

        assert_eq!(world.get("earth").state, "night");
        assert_eq!(world.get("cetus").state, "N/A");
    }

    #[test]
    fn last_fetch_time_tracks_ingest() {
        let mut world = WorldState::new();
        assert_eq!(world.last_fetch_time(), None);

        let at = Utc.with_ymd_and_hms(2026, 2, 8, 19, 0, 0).unwrap();
        world.ingest(&json!({}), at);
        assert_eq!(world.last_fetch_time(), Some(at));
    }

    #[test]
    fn nightwave_block_caps_at_three_challenges() {
        let raw = json!({
            "nightwave": {
                "activeChallenges": [
                    { "title": "First", "reputation": 1000 },
                    { "title": "Second", "reputation": 3000 },
                    { "title": "Third", "reputation": 4500 },
                    { "title": "Fourth", "reputation": 7000 }
                ]
            }
        });

        let block = render_nightwave(&raw);
        assert_eq!(
            block,
            "Nightwave:\n- First (1000)\n- Second (3000)\n- Third (4500)"
        );
    }

    #[test]
    fn missing_nightwave_renders_empty() {
        assert_eq!(render_nightwave(&json!({})), "");
        assert_eq!(
            render_nightwave(&json!({ "nightwave": { "activeChallenges": [] } })),
            ""
        );
    }
}
