//! Integration tests for event collection
//!
//! Feeds successive engine snapshots through the decoder into an
//! `EventHistory`, the way the poll loop does.

use serde_json::json;

use meshlens_events::{Absorbed, EventHistory, EventLevel, RawEvent, translate_batch};
use meshlens_topology::extract_raw_events;
use meshlens_topology::fixture::{SnapshotBuilder, event};

fn listener(second: u32) -> String {
    event(
        &format!("2024-05-01T12:00:{:02}+00:00", second),
        "ListenerAdded",
        json!(format!("tcp://0.0.0.0:{}", 11000 + second)),
    )
}

fn snapshot(oldest_first: &[String]) -> String {
    SnapshotBuilder::new("mesh-a")
        .raw_events_oldest_first(oldest_first.iter().cloned())
        .build()
}

fn poll(history: &mut EventHistory, oldest_first: &[String]) -> Absorbed {
    let raw = extract_raw_events(&snapshot(oldest_first), "mesh-a").unwrap();
    history.absorb(&raw)
}

#[test]
fn test_successive_polls() {
    let all: Vec<String> = (0..5).map(listener).collect();
    let mut history = EventHistory::new();

    assert_eq!(poll(&mut history, &all[..3]), Absorbed::New(3));
    assert_eq!(poll(&mut history, &all), Absorbed::New(2));
    assert_eq!(poll(&mut history, &all), Absorbed::Nothing);

    let messages: Vec<String> = history.records().into_iter().map(|r| r.message).collect();
    assert_eq!(
        messages,
        (0..5)
            .map(|s| format!("listening on tcp://0.0.0.0:{}", 11000 + s))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_bounded_buffer_slides() {
    let all: Vec<String> = (0..6).map(listener).collect();
    let mut history = EventHistory::new();

    poll(&mut history, &all[0..3]);
    // The ring dropped the two oldest records but still holds the cursor.
    assert_eq!(poll(&mut history, &all[2..5]), Absorbed::New(2));
    assert_eq!(history.len(), 5);
}

#[test]
fn test_wraparound_between_polls() {
    let all: Vec<String> = (0..9).map(listener).collect();
    let mut history = EventHistory::new();

    poll(&mut history, &all[0..3]);
    let outcome = poll(&mut history, &all[6..9]);

    assert_eq!(outcome, Absorbed::Gap(3));
    assert_eq!(history.len(), 6);
    assert_eq!(history.last().map(RawEvent::as_str), Some(all[8].as_str()));
}

#[test]
fn test_corrupt_record_is_isolated() {
    let batch: Vec<RawEvent> = vec![
        RawEvent::from(listener(1)),
        RawEvent::from(listener(2)),
        RawEvent::from(r#"{"time":"2024-05-01T12:00:03+00:00","event":"#),
        RawEvent::from(event("2024-05-01T12:00:04+00:00", "TunDeviceReady", json!("tun0"))),
        RawEvent::from(event(
            "2024-05-01T12:00:05+00:00",
            "ConnectionError",
            json!(["tcp://a", "tcp://b", "timed out"]),
        )),
    ];

    let records = translate_batch(&batch);
    assert_eq!(records.len(), 4);
    let times: Vec<&str> = records.iter().map(|r| r.time.as_str()).collect();
    assert_eq!(times, vec!["12:00:01", "12:00:02", "12:00:04", "12:00:05"]);
    assert_eq!(records[2].level, EventLevel::Success);
    assert_eq!(records[3].level, EventLevel::Error);
}

#[test]
fn test_text_export() {
    let mut history = EventHistory::new();
    assert_eq!(history.export_text(), None);

    history.absorb(&[
        RawEvent::from(listener(1)),
        RawEvent::from(event("2024-05-01T12:00:02+00:00", "PeerRemoved", json!(987654))),
    ]);

    assert_eq!(
        history.export_text().unwrap(),
        "[12:00:01] [INFO] listening on tcp://0.0.0.0:11001\n[12:00:02] [WARNING] peer (7654) removed"
    );
}
