//! Raw event translation
//!
//! A raw record looks like:
//!
//! ```text
//! {"time":"2024-05-01T12:00:01.123456+08:00","event":{"TunDeviceReady":"tun0"}}
//! ```
//!
//! Translation is pure: one record in, one [`EventRecord`] out.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use meshlens_core::{EventError, EventRecord, EventResult, RawEvent};

use crate::kind::EngineEvent;

#[derive(Deserialize)]
struct WireEvent {
    time: String,
    event: Map<String, Value>,
}

/// Translate one raw record
pub fn translate(raw: &RawEvent) -> EventResult<EventRecord> {
    let wire: WireEvent = serde_json::from_str(raw.as_str())?;
    let time = time_label(&wire.time)?;

    let (tag, payload) = wire.event.into_iter().next().ok_or(EventError::EmptyEvent)?;
    let event = EngineEvent::from_tagged(&tag, payload)?;

    Ok(EventRecord::new(time, event.message(), event.level(), wire.time))
}

/// Translate a batch, skipping records that fail
///
/// The surviving records keep their relative order.
pub fn translate_batch<'a, I>(raw_events: I) -> Vec<EventRecord>
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    raw_events
        .into_iter()
        .filter_map(|raw| match translate(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, raw = %raw, "Skipping untranslatable event record");
                None
            }
        })
        .collect()
}

/// `HH:MM:SS` in the timestamp's own offset
fn time_label(timestamp: &str) -> EventResult<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Ok(parsed.format("%H:%M:%S").to_string());
    }

    // Fall back to the fixed position used by ISO-8601 timestamps.
    timestamp
        .get(11..19)
        .filter(|clock| clock.as_bytes().get(2) == Some(&b':'))
        .map(str::to_string)
        .ok_or_else(|| EventError::InvalidTimestamp(timestamp.to_string()))
}
