use crate::event::Event;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("index {index} out of range (store holds {len} events)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered sequence of sealed events with a navigation cursor
///
/// The cursor always satisfies `current_index() < count()` unless the store
/// is empty, in which case it is 0.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    cursor: usize,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events, cursor: 0 }
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&Event, StoreError> {
        self.events.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.events.len(),
        })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Event, StoreError> {
        let len = self.events.len();
        self.events
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Swap in a new event sequence and reset the cursor
    pub fn replace(&mut self, events: Vec<Event>) -> Vec<Event> {
        self.cursor = 0;
        std::mem::replace(&mut self.events, events)
    }

    // Cursor

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn set_current_index(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.events.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.events.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    pub fn current(&self) -> Option<&Event> {
        self.events.get(self.cursor)
    }

    /// Step forward; stays on the last event. Returns whether the cursor moved.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.events.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Step back; stays on the first event. Returns whether the cursor moved.
    pub fn retreat(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Index of the event whose `[start_time, end_time)` window contains `time`
    ///
    /// Times past the last event map to the last event. Zero-width windows
    /// never match.
    pub fn index_at_time(&self, time: f64) -> Option<usize> {
        let last = self.events.len().checked_sub(1)?;
        self.events
            .iter()
            .position(|e| e.start_time <= time && time < e.end_time)
            .or_else(|| (time >= self.events[last].end_time).then_some(last))
    }

    // Display toggles

    pub fn set_display(
        &mut self,
        event: usize,
        particle: usize,
        enabled: bool,
    ) -> Result<(), StoreError> {
        let event = self.at_mut(event)?;
        let len = event.particles.len();
        let particle = event
            .particles
            .get_mut(particle)
            .ok_or(StoreError::IndexOutOfRange {
                index: particle,
                len,
            })?;
        particle.display_enabled = enabled;
        Ok(())
    }

    /// Flip one particle's cone display; returns the new state
    pub fn toggle_display(&mut self, event: usize, particle: usize) -> Result<bool, StoreError> {
        let particles = &self.at(event)?.particles;
        let current = particles
            .get(particle)
            .ok_or(StoreError::IndexOutOfRange {
                index: particle,
                len: particles.len(),
            })?
            .display_enabled;
        self.set_display(event, particle, !current)?;
        Ok(!current)
    }

    /// Show the first particle's cone in every event, hide the rest
    pub fn apply_default_display(&mut self) {
        for event in &mut self.events {
            event.apply_default_display();
        }
    }
}
