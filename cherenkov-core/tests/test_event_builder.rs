//! Tests for folding records into sealed events

use cherenkov_core::geometry::FEET_PER_METRE;
use cherenkov_core::tests::test_helpers::{approx_eq, load_fixture};
use cherenkov_core::{
    BuilderState, DetectorGeometry, DetectorLayer, Event, EventBuilder, Medium, NoMoreEvents,
    ParticleKind, RecordReader,
};
use glam::DVec3;

fn build_all(source: &str) -> (Vec<Event>, NoMoreEvents) {
    let mut reader = RecordReader::new(source.as_bytes());
    let mut builder = EventBuilder::new(DetectorGeometry::default(), Medium::default());
    let mut events = Vec::new();
    loop {
        match builder.next_event(&mut reader) {
            Ok(event) => events.push(event),
            Err(end) => return (events, end),
        }
    }
}

#[test]
fn test_scenario_a_single_electron() {
    let source = load_fixture("single_electron.txt").expect("fixture");
    let (events, end) = build_all(&source);

    assert_eq!(events.len(), 1);
    assert!(end.cause.is_end_of_stream());
    assert_eq!(end.discarded_records, 0);

    let event = &events[0];
    assert_eq!(event.start_time, 0.0);
    assert_eq!(event.hits.len(), 1);
    assert!(event.outer_hits.is_empty());

    let hit = &event.hits[0];
    assert_eq!(hit.sequence_number, 1);
    assert_eq!(hit.position, DVec3::ZERO);
    assert_eq!(hit.charge, 5.0);
    assert_eq!(hit.time, 10.0);
    assert_eq!(hit.layer, DetectorLayer::Inner);
    assert_eq!(hit.radius, 0.3 * FEET_PER_METRE);

    assert_eq!(event.particles.len(), 1);
    let electron = &event.particles[0];
    assert_eq!(electron.name, "Electron");
    assert_eq!(electron.kind, ParticleKind::Electron);
    assert_eq!(electron.direction, DVec3::new(0.0, 0.0, -1.0));
    assert!(electron.display_enabled);
    assert!(electron.has_cone());
}

#[test]
fn test_scenario_b_start_time_chains() {
    let source = load_fixture("two_events.txt").expect("fixture");
    let (events, _) = build_all(&source);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].start_time, 0.0);
    assert_eq!(events[0].end_time, 5.0);
    assert_eq!(events[0].duration, 5.0);
    assert_eq!(events[1].start_time, 5.0);
    assert_eq!(events[1].end_time, 8.0);
    assert_eq!(events[1].duration, 3.0);
}

#[test]
fn test_unit_conversions() {
    let source = load_fixture("two_events.txt").expect("fixture");
    let (events, _) = build_all(&source);
    let event = &events[0];

    // Inner hits are scaled only
    assert_eq!(
        event.hits[0].position,
        DVec3::new(1.5, -2.0, 3.0) * FEET_PER_METRE
    );

    // Outer hits: x, y in centimetres; z through the 1810 -> 20 map, offset 20
    let outer = &event.outer_hits[0];
    assert_eq!(outer.layer, DetectorLayer::Outer);
    assert!(approx_eq(outer.position.x, 3.0 * FEET_PER_METRE, 1e-12));
    assert!(approx_eq(outer.position.y, -1.0 * FEET_PER_METRE, 1e-12));
    assert!(approx_eq(outer.position.z, 30.0 * FEET_PER_METRE, 1e-9));
    assert_eq!(outer.radius, 0.2 * FEET_PER_METRE);

    // Vertex follows the outer rule
    let v = event.vertex_position;
    assert!(approx_eq(v.x, 1.2 * FEET_PER_METRE, 1e-12));
    assert!(approx_eq(v.y, -0.4 * FEET_PER_METRE, 1e-12));
    assert!(approx_eq(v.z, 30.0 * FEET_PER_METRE, 1e-9));
}

#[test]
fn test_metres_geometry() {
    let source = "ID 0 1 1.5 2 3 0 0 -1 1 1\nVERTEX 100 200 0\nNEXTEVENT";
    let mut reader = RecordReader::new(source.as_bytes());
    let mut builder = EventBuilder::new(DetectorGeometry::metres(), Medium::default());
    let event = builder.next_event(&mut reader).expect("event");

    assert_eq!(event.hits[0].position, DVec3::new(1.5, 2.0, 3.0));
    assert_eq!(event.vertex_position, DVec3::new(1.0, 2.0, 20.0));
}

#[test]
fn test_particles_keep_order_and_default_display() {
    let source = load_fixture("two_events.txt").expect("fixture");
    let (events, _) = build_all(&source);
    let particles = &events[0].particles;

    assert_eq!(particles.len(), 2);
    assert_eq!(particles[0].name, "Muon");
    assert_eq!(particles[0].track_id, 1);
    assert_eq!(particles[0].direction, DVec3::new(0.0, 0.0, -1.0));
    assert!(particles[0].display_enabled);

    assert_eq!(particles[1].name, "Positron");
    assert_eq!(particles[1].direction, DVec3::X);
    assert!(!particles[1].display_enabled);

    assert_eq!(events[1].particles[0].name, "Pion+");
    assert!(events[1].particles[0].display_enabled);
}

#[test]
fn test_last_time_and_vertex_win() {
    let source = "TIME 1.0\nVERTEX 100 0 0\nTIME 4.0\nVERTEX 0 100 0\nNEXTEVENT";
    let (events, _) = build_all(source);

    assert_eq!(events[0].end_time, 4.0);
    assert_eq!(events[0].vertex_position.x, 0.0);
    assert!(approx_eq(events[0].vertex_position.y, FEET_PER_METRE, 1e-12));
}

#[test]
fn test_event_without_time_has_zero_duration() {
    let source = "TIME 2.0\nNEXTEVENT\nID 0 1 0 0 0 0 0 -1 1 1\nNEXTEVENT";
    let (events, _) = build_all(source);

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].start_time, 2.0);
    assert_eq!(events[1].end_time, 2.0);
    assert_eq!(events[1].duration, 0.0);
    assert_eq!(events[1].vertex_position, DVec3::ZERO);
}

#[test]
fn test_state_does_not_leak_between_events() {
    let source = "VERTEX 100 100 0\nPARTICLE 13 0 0 1 500 1\nTIME 1\nNEXTEVENT\nTIME 2\nNEXTEVENT";
    let (events, _) = build_all(source);

    assert_eq!(events[1].particles.len(), 0);
    assert_eq!(events[1].vertex_position, DVec3::ZERO);
}

#[test]
fn test_zero_direction_particle() {
    let (events, _) = build_all("PARTICLE 11 0 0 0 5.0 1\nNEXTEVENT");
    let particle = &events[0].particles[0];

    assert_eq!(particle.direction, DVec3::ZERO);
    // kinematics do not depend on direction
    assert!(particle.has_cone());
}

#[test]
fn test_unterminated_event_is_discarded() {
    let source = load_fixture("broken/unterminated.txt").expect("fixture");
    let (events, end) = build_all(&source);

    assert_eq!(events.len(), 2);
    assert!(end.cause.is_end_of_stream());
    assert_eq!(end.discarded_records, 2);
}

#[test]
fn test_exhausted_builder_stays_exhausted() {
    let mut reader = RecordReader::new("TIME 1\nNEXTEVENT\n".as_bytes());
    let mut builder = EventBuilder::new(DetectorGeometry::default(), Medium::default());

    assert!(builder.next_event(&mut reader).is_ok());
    assert_eq!(builder.state(), BuilderState::Accumulating);
    assert_eq!(builder.sealed(), 1);

    assert!(builder.next_event(&mut reader).is_err());
    assert_eq!(builder.state(), BuilderState::Exhausted);

    let again = builder.next_event(&mut reader).unwrap_err();
    assert!(again.cause.is_end_of_stream());
    assert_eq!(again.discarded_records, 0);
}

#[test]
fn test_malformed_record_ends_build() {
    let source = load_fixture("broken/malformed_field.txt").expect("fixture");
    let (events, end) = build_all(&source);

    assert_eq!(events.len(), 1);
    assert!(end.cause.is_malformed());
    assert_eq!(end.cause.line(), Some(4));
}

#[test]
fn test_every_record_kind_counts_toward_discarded() {
    let source = "TIME 1\nNEXTEVENT\n\
                  ID 0 1 0 0 0 0 0 -1 1 1\n\
                  OD 0 2 0 0 0 0 0 -1 1 1\n\
                  TIME 2\n\
                  VERTEX 1 2 3\n\
                  PARTICLE 11 0 0 1 2.0 1\n";
    let (events, end) = build_all(source);

    assert_eq!(events.len(), 1);
    assert!(end.cause.is_end_of_stream());
    assert_eq!(end.discarded_records, 5);
}
