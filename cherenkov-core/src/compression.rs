//! Time compression: re-bucket a long run of short events into fixed-width
//! time windows
//!
//! Bucket boundaries sit at `k * width` for `k = 0, 1, 2, ...`. The first
//! input event is passed through untouched. Every later event either closes
//! one or more buckets (when it starts at or past the next boundary) or has
//! its hits folded into the open bucket. Hits landing on exactly the same
//! converted coordinate are merged by summing their charge.

use crate::event::{Event, Hit};
use glam::DVec3;
use std::collections::HashMap;
use thiserror::Error;

/// Default bucket width, in event time units
pub const DEFAULT_BUCKET_WIDTH: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompressionError {
    #[error("bucket width must be positive and finite, got {0}")]
    InvalidBucketWidth(f64),
    #[error("event {index} has a non-finite start time ({start_time})")]
    NonFiniteStartTime { index: usize, start_time: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub bucket_width: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }
}

impl CompressionConfig {
    pub fn enabled(bucket_width: f64) -> Self {
        Self {
            enabled: true,
            bucket_width,
        }
    }
}

/// Exact-coordinate key; `-0.0` and `0.0` share a key since they compare equal
fn position_key(position: DVec3) -> [u64; 3] {
    let bits = |v: f64| (v + 0.0).to_bits();
    [bits(position.x), bits(position.y), bits(position.z)]
}

/// Hits of one layer in the open bucket, indexed by position
#[derive(Default)]
struct MergedHits {
    hits: Vec<Hit>,
    index: HashMap<[u64; 3], usize>,
}

impl MergedHits {
    fn merge(&mut self, hit: &Hit) {
        let key = position_key(hit.position);
        match self.index.get(&key) {
            Some(&slot) => self.hits[slot].charge += hit.charge,
            None => {
                self.index.insert(key, self.hits.len());
                self.hits.push(hit.clone());
            }
        }
    }
}

/// The bucket currently being filled
struct Bucket {
    start_time: f64,
    hits: MergedHits,
    outer_hits: MergedHits,
    merged_vertices: Vec<DVec3>,
}

impl Bucket {
    fn open(start_time: f64) -> Self {
        Self {
            start_time,
            hits: MergedHits::default(),
            outer_hits: MergedHits::default(),
            merged_vertices: Vec::new(),
        }
    }

    fn absorb(&mut self, event: &Event) {
        for hit in &event.hits {
            self.hits.merge(hit);
        }
        for hit in &event.outer_hits {
            self.outer_hits.merge(hit);
        }
        self.merged_vertices.push(event.vertex_position);
    }

    fn close(self, end_time: f64) -> Event {
        let mut event = Event::starting_at(self.start_time);
        event.hits = self.hits.hits;
        event.outer_hits = self.outer_hits.hits;
        event.merged_vertices = self.merged_vertices;
        event.close_at(end_time);
        event
    }
}

/// Compress `events` into buckets of `bucket_width`
///
/// An empty input produces an empty output.
pub fn compress(events: &[Event], bucket_width: f64) -> Result<Vec<Event>, CompressionError> {
    if !(bucket_width.is_finite() && bucket_width > 0.0) {
        return Err(CompressionError::InvalidBucketWidth(bucket_width));
    }
    let Some((first, rest)) = events.split_first() else {
        return Ok(Vec::new());
    };

    let mut output = vec![first.clone()];
    let mut bucket = Bucket::open(0.0);
    let mut k: u64 = 0;

    for (offset, event) in rest.iter().enumerate() {
        if !event.start_time.is_finite() {
            return Err(CompressionError::NonFiniteStartTime {
                index: offset + 1,
                start_time: event.start_time,
            });
        }
        // one event may close several buckets before it lands in one
        loop {
            let boundary = k as f64 * bucket_width;
            if event.start_time < boundary {
                break;
            }
            let closed = std::mem::replace(&mut bucket, Bucket::open(boundary)).close(boundary);
            log::debug!(
                "closed bucket [{}, {}] with {} hits",
                closed.start_time,
                closed.end_time,
                closed.hit_count()
            );
            output.push(closed);
            k += 1;
        }
        bucket.absorb(event);
    }

    let last_end = events[events.len() - 1].end_time;
    output.push(bucket.close(last_end));

    log::info!(
        "compressed {} events into {} (bucket width {})",
        events.len(),
        output.len(),
        bucket_width
    );
    Ok(output)
}
