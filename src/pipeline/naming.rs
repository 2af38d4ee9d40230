//! Timestamped object names.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

const STAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Formats `{source}_{YYYY-MM-DD_HHMMSS}.json` for a UTC instant.
pub fn object_name(source: &str, at: DateTime<Utc>) -> String {
    format!("{source}_{}.json", at.format(STAMP_FORMAT))
}

/// Hands out per-second timestamps that strictly increase per source, so
/// back-to-back runs within the same second still get distinct object names.
///
/// The bump is unbounded: N runs inside one second stamp their objects up to
/// N seconds ahead of the wall clock.
#[derive(Default)]
pub struct StampSequence {
    last: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl StampSequence {
    pub fn next(&self, source: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = now.duration_trunc(TimeDelta::seconds(1)).unwrap_or(now);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let stamp = match last.get(source) {
            Some(&prev) if now <= prev => prev + TimeDelta::seconds(1),
            _ => now,
        };
        last.insert(source.to_string(), stamp);
        stamp
    }
}
