//! Event builder: folds records into events
//!
//! The builder owns the in-progress event. Each call to
//! [`EventBuilder::next_event`] pulls records until a `NEXTEVENT`
//! terminator seals an event, or until the reader stops, in which case the
//! partial event is discarded and [`NoMoreEvents`] is returned.

use crate::event::{Event, Hit, Particle};
use crate::geometry::{DetectorGeometry, DetectorLayer};
use crate::kinematics::Medium;
use crate::record::{HitRecord, ParticleRecord, ReadError, Record, RecordReader};
use glam::DVec3;
use std::io::BufRead;
use thiserror::Error;

/// The stream has no further complete events
#[derive(Debug, Error)]
#[error("no more events ({cause})")]
pub struct NoMoreEvents {
    /// What stopped the reader
    #[source]
    pub cause: ReadError,
    /// Records belonging to an unterminated trailing event
    pub discarded_records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Accumulating,
    Exhausted,
}

/// Records collected for the event currently being built
#[derive(Debug, Default)]
struct PendingEvent {
    end_time: Option<f64>,
    vertex: Option<DVec3>,
    hits: Vec<Hit>,
    outer_hits: Vec<Hit>,
    particles: Vec<ParticleRecord>,
    records: usize,
}

pub struct EventBuilder {
    geometry: DetectorGeometry,
    medium: Medium,
    state: BuilderState,
    pending: PendingEvent,
    previous_end: Option<f64>,
    sealed: usize,
}

impl EventBuilder {
    pub fn new(geometry: DetectorGeometry, medium: Medium) -> Self {
        Self {
            geometry,
            medium,
            state: BuilderState::Accumulating,
            pending: PendingEvent::default(),
            previous_end: None,
            sealed: 0,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Number of events sealed so far
    pub fn sealed(&self) -> usize {
        self.sealed
    }

    /// Read records until the next event is sealed
    pub fn next_event<R: BufRead>(
        &mut self,
        reader: &mut RecordReader<R>,
    ) -> Result<Event, NoMoreEvents> {
        if self.state == BuilderState::Exhausted {
            return Err(NoMoreEvents {
                cause: ReadError::EndOfStream,
                discarded_records: 0,
            });
        }

        loop {
            match reader.next_record() {
                Ok(Record::NextEvent) => return Ok(self.seal()),
                Ok(Record::InnerHit(raw)) => {
                    let hit = self.hit(DetectorLayer::Inner, raw);
                    self.pending.hits.push(hit);
                }
                Ok(Record::OuterHit(raw)) => {
                    let hit = self.hit(DetectorLayer::Outer, raw);
                    self.pending.outer_hits.push(hit);
                }
                // last TIME and VERTEX win
                Ok(Record::Time(t)) => self.pending.end_time = Some(t),
                Ok(Record::Vertex(raw)) => {
                    self.pending.vertex = Some(self.geometry.vertex_position(raw));
                }
                Ok(Record::Particle(raw)) => self.pending.particles.push(raw),
                Err(cause) => {
                    self.state = BuilderState::Exhausted;
                    let discarded = std::mem::take(&mut self.pending);
                    if discarded.records > 0 {
                        log::warn!(
                            "discarding unterminated event ({} records)",
                            discarded.records
                        );
                    }
                    return Err(NoMoreEvents {
                        cause,
                        discarded_records: discarded.records,
                    });
                }
            }
            self.pending.records += 1;
        }
    }

    fn hit(&self, layer: DetectorLayer, raw: HitRecord) -> Hit {
        Hit::from_raw(
            &self.geometry,
            layer,
            raw.sequence_number,
            raw.position,
            raw.direction,
            raw.charge,
            raw.time,
        )
    }

    fn seal(&mut self) -> Event {
        let pending = std::mem::take(&mut self.pending);
        let start_time = self.previous_end.unwrap_or(0.0);

        let particles = pending
            .particles
            .into_iter()
            .map(|raw| {
                Particle::new(
                    self.medium,
                    raw.type_code,
                    raw.direction,
                    raw.momentum,
                    raw.track_id,
                )
            })
            .collect();

        let mut event = Event::starting_at(start_time);
        event.vertex_position = pending.vertex.unwrap_or(DVec3::ZERO);
        event.hits = pending.hits;
        event.outer_hits = pending.outer_hits;
        event.particles = particles;
        event.close_at(pending.end_time.unwrap_or(start_time));
        event.apply_default_display();

        self.previous_end = Some(event.end_time);
        self.sealed += 1;
        log::debug!(
            "sealed event {} [{}, {}] with {} hits, {} particles",
            self.sealed - 1,
            event.start_time,
            event.end_time,
            event.hit_count(),
            event.particles.len()
        );
        event
    }
}
