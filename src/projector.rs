use chrono::{DateTime, Utc};

use crate::worldstate::{WorldState, TRACKED_CYCLES};

/// Minimum gap between fetch attempts when a local expiry asks for a
/// refresh. The server-side state lags the expiry moment by a few seconds,
/// so re-fetching every tick would just hammer the API.
pub const REFRESH_GUARD_SECS: i64 = 15;

/// One render-ready projection of the store at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub text: String,
    pub refresh_due: bool,
}

/// Projects wall-clock countdowns from the last ingested snapshot.
///
/// Stateless apart from the last fetch-attempt timestamp used by the
/// refresh guard; `tick` is deterministic given the store contents and
/// `now`, and never performs any I/O itself.
#[derive(Debug, Default)]
pub struct CountdownProjector {
    last_fetch_attempt: Option<DateTime<Utc>>,
}

impl CountdownProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called on every fetch attempt, successful or not, so the
    /// refresh guard stays meaningful.
    pub fn record_fetch_attempt(&mut self, at: DateTime<Utc>) {
        self.last_fetch_attempt = Some(at);
    }

    pub fn tick(&self, world: &WorldState, now: DateTime<Utc>) -> Projection {
        let mut lines = Vec::with_capacity(TRACKED_CYCLES.len() + 1);
        lines.push("Cycles:".to_string());

        let mut any_expired = false;
        for cycle in &TRACKED_CYCLES {
            let snapshot = world.get(cycle.key);
            let state = capitalize(&snapshot.state);

            let line = match snapshot.expiry {
                None => format!("{}: {}", cycle.label, state),
                Some(expiry) => {
                    let remaining = (expiry - now).num_seconds();
                    if remaining <= 0 {
                        any_expired = true;
                        format!("{}: {} (Syncing...)", cycle.label, state)
                    } else {
                        format!("{}: {} ({})", cycle.label, state, format_remaining(remaining))
                    }
                }
            };
            lines.push(line);
        }

        let mut text = lines.join("\n");
        if !world.nightwave().is_empty() {
            text.push_str("\n\n");
            text.push_str(world.nightwave());
        }

        Projection {
            text,
            refresh_due: any_expired && self.guard_elapsed(now),
        }
    }

    fn guard_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.last_fetch_attempt
            .map(|at| (now - at).num_seconds() >= REFRESH_GUARD_SECS)
            .unwrap_or(true)
    }
}

/// `3661` -> `"1h 1m 1s"`, `59` -> `"0m 59s"`. Hours are omitted when zero;
/// minutes and seconds are always shown.
fn format_remaining(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Uppercases the first character only. Feed labels are lowercase; leaving
/// the tail untouched also keeps the `N/A` sentinel as-is.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
