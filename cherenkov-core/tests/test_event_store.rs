//! Tests for the event store and its cursor

use cherenkov_core::tests::test_helpers::{ingest_source, load_fixture, synthetic_event};
use cherenkov_core::{Event, EventStore, StoreError};

fn store_of(n: usize) -> EventStore {
    let mut store = EventStore::new();
    for i in 0..n {
        store.append(synthetic_event(i as f64, i as f64 + 1.0, &[]));
    }
    store
}

#[test]
fn test_append_and_at() {
    let store = store_of(3);
    assert_eq!(store.count(), 3);
    assert!(!store.is_empty());
    assert_eq!(store.at(2).unwrap().start_time, 2.0);
    assert_eq!(
        store.at(3).unwrap_err(),
        StoreError::IndexOutOfRange { index: 3, len: 3 }
    );
}

#[test]
fn test_empty_store() {
    let mut store = EventStore::new();
    assert_eq!(store.count(), 0);
    assert_eq!(store.current_index(), 0);
    assert!(store.current().is_none());
    assert!(store.at(0).is_err());
    assert!(store.set_current_index(0).is_err());
    assert!(!store.advance());
    assert!(!store.retreat());
    assert_eq!(store.index_at_time(1.0), None);
}

#[test]
fn test_cursor_bounds() {
    let mut store = store_of(3);
    assert_eq!(store.current_index(), 0);

    store.set_current_index(2).unwrap();
    assert_eq!(store.current().unwrap().start_time, 2.0);

    let err = store.set_current_index(5).unwrap_err();
    assert_eq!(err, StoreError::IndexOutOfRange { index: 5, len: 3 });
    // a failed move leaves the cursor alone
    assert_eq!(store.current_index(), 2);
}

#[test]
fn test_advance_and_retreat_clamp() {
    let mut store = store_of(2);
    assert!(!store.retreat());
    assert!(store.advance());
    assert_eq!(store.current_index(), 1);
    assert!(!store.advance());
    assert_eq!(store.current_index(), 1);
    assert!(store.retreat());
    assert_eq!(store.current_index(), 0);
}

#[test]
fn test_replace_resets_cursor() {
    let mut store = store_of(4);
    store.set_current_index(3).unwrap();

    let old = store.replace(vec![Event::starting_at(0.0)]);
    assert_eq!(old.len(), 4);
    assert_eq!(store.count(), 1);
    assert_eq!(store.current_index(), 0);
}

#[test]
fn test_index_at_time() {
    let store = store_of(3); // [0,1) [1,2) [2,3)
    assert_eq!(store.index_at_time(0.0), Some(0));
    assert_eq!(store.index_at_time(1.5), Some(1));
    assert_eq!(store.index_at_time(2.999), Some(2));
    assert_eq!(store.index_at_time(10.0), Some(2));
    assert_eq!(store.index_at_time(-1.0), None);
}

#[test]
fn test_display_toggles() {
    let source = load_fixture("two_events.txt").expect("fixture");
    let (mut store, _) = ingest_source(&source).expect("ingest");

    assert!(store.at(0).unwrap().particles[0].display_enabled);
    assert!(!store.at(0).unwrap().particles[1].display_enabled);

    assert_eq!(store.toggle_display(0, 1), Ok(true));
    assert!(store.at(0).unwrap().particles[1].display_enabled);
    assert_eq!(store.toggle_display(0, 1), Ok(false));

    store.set_display(0, 0, false).unwrap();
    assert!(!store.at(0).unwrap().particles[0].display_enabled);

    assert_eq!(
        store.toggle_display(0, 2),
        Err(StoreError::IndexOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        store.toggle_display(7, 0),
        Err(StoreError::IndexOutOfRange { index: 7, len: 2 })
    );

    // the default policy switches the first particle back on
    store.set_display(0, 1, true).unwrap();
    store.apply_default_display();
    let particles = &store.at(0).unwrap().particles;
    assert!(particles[0].display_enabled);
    assert!(!particles[1].display_enabled);
}
