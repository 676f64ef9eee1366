//! Test helper utilities for event pipeline tests

use crate::event::{Event, Hit};
use crate::geometry::DetectorLayer;
use crate::ingest::{IngestConfig, IngestReport};
use crate::store::EventStore;
use glam::DVec3;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Check if two floating point values are approximately equal within tolerance
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Path to a fixture under `tests/data`
pub fn data_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(relative)
}

/// Load a fixture stream as text
pub fn load_fixture(relative: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(data_path(relative))?)
}

/// Ingest a stream with the default configuration
pub fn ingest_source(
    source: &str,
) -> Result<(EventStore, IngestReport), Box<dyn std::error::Error>> {
    Ok(crate::load_from_source(source, &IngestConfig::default())?)
}

/// Render an `ID`/`OD` record line
pub fn hit_line(tag: &str, hit: i64, pos: (f64, f64, f64), charge: f64, time: f64) -> String {
    format!(
        "{tag} 0 {hit} {} {} {} 0 0 -1 {charge} {time}\n",
        pos.0, pos.1, pos.2
    )
}

/// Render a minimal event: the given hit lines, a TIME record and the terminator
pub fn event_block(hit_lines: &[String], time: f64) -> String {
    let mut block = String::new();
    for line in hit_lines {
        block.push_str(line);
    }
    writeln!(block, "TIME {time}").unwrap();
    block.push_str("NEXTEVENT\n");
    block
}

/// A hand-built event, bypassing the reader
pub fn synthetic_event(start_time: f64, end_time: f64, hits: &[(DVec3, f64)]) -> Event {
    let mut event = Event::starting_at(start_time);
    event.hits = hits
        .iter()
        .enumerate()
        .map(|(idx, &(position, charge))| Hit {
            sequence_number: idx as i64,
            layer: DetectorLayer::Inner,
            position,
            direction: DVec3::NEG_Z,
            charge,
            time: start_time,
            radius: 1.0,
        })
        .collect();
    event.close_at(end_time);
    event
}

/// Check the time-chaining invariants over a whole sequence
pub fn assert_time_chain(events: &[Event], tol: f64) {
    for (idx, event) in events.iter().enumerate() {
        assert!(
            approx_eq(event.duration, event.end_time - event.start_time, tol),
            "event {idx}: duration {} != {} - {}",
            event.duration,
            event.end_time,
            event.start_time
        );
    }
    for (idx, pair) in events.windows(2).enumerate() {
        assert!(
            approx_eq(pair[1].start_time, pair[0].end_time, tol),
            "event {}: start {} != previous end {}",
            idx + 1,
            pair[1].start_time,
            pair[0].end_time
        );
    }
}
