use crate::geometry::{DetectorGeometry, DetectorLayer};
use crate::kinematics::{self, Kinematics, Medium, ParticleKind};
use glam::DVec3;

/// A single detector pulse
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub sequence_number: i64,
    pub layer: DetectorLayer,
    /// Converted position in detector units
    pub position: DVec3,
    /// Not normalized
    pub direction: DVec3,
    pub charge: f64,
    pub time: f64,
    /// Fixed per layer, only used for drawing
    pub radius: f64,
}

impl Hit {
    /// Build a hit from raw source values, converting the position for its layer
    pub fn from_raw(
        geometry: &DetectorGeometry,
        layer: DetectorLayer,
        sequence_number: i64,
        raw_position: DVec3,
        direction: DVec3,
        charge: f64,
        time: f64,
    ) -> Self {
        Self {
            sequence_number,
            layer,
            position: geometry.hit_position(layer, raw_position),
            direction,
            charge,
            time,
            radius: geometry.hit_radius(layer),
        }
    }
}

/// A final-state particle leaving the event vertex
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub type_code: i32,
    pub track_id: i64,
    /// Unit vector, or zero when the source direction had no length
    pub direction: DVec3,
    /// MeV/c, as supplied
    pub momentum: f64,
    pub kind: ParticleKind,
    /// kg
    pub mass: f64,
    /// MeV
    pub cherenkov_threshold: f64,
    /// m/s
    pub velocity: f64,
    /// MeV
    pub energy: f64,
    /// Degrees
    pub cone_half_angle: f64,
    pub display_enabled: bool,
    pub name: String,
}

impl Particle {
    /// Build a particle and derive its kinematics in the given medium
    pub fn new(
        medium: Medium,
        type_code: i32,
        raw_direction: DVec3,
        momentum: f64,
        track_id: i64,
    ) -> Self {
        let direction = raw_direction.try_normalize().unwrap_or_else(|| {
            log::warn!("particle {track_id} (type {type_code}) has no direction");
            DVec3::ZERO
        });
        let Kinematics {
            kind,
            mass,
            threshold,
            velocity,
            energy,
            cone_half_angle,
            name,
            ..
        } = kinematics::compute_in(medium, type_code, momentum);

        Self {
            type_code,
            track_id,
            direction,
            momentum,
            kind,
            mass,
            cherenkov_threshold: threshold,
            velocity,
            energy,
            cone_half_angle,
            display_enabled: false,
            name,
        }
    }

    pub fn has_cone(&self) -> bool {
        self.cone_half_angle > 0.0
    }
}

/// One detector trigger window
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub vertex_position: DVec3,
    /// Inner detector
    pub hits: Vec<Hit>,
    /// Outer detector / veto
    pub outer_hits: Vec<Hit>,
    pub particles: Vec<Particle>,
    /// Vertices of the events folded into a time-compressed bucket, in
    /// arrival order. Empty for events read straight from a stream.
    pub merged_vertices: Vec<DVec3>,
}

impl Event {
    /// An empty event opening at `start_time`
    pub fn starting_at(start_time: f64) -> Self {
        Self {
            start_time,
            end_time: start_time,
            ..Self::default()
        }
    }

    /// Fix the end time and derive the duration from it
    pub fn close_at(&mut self, end_time: f64) {
        self.end_time = end_time;
        self.duration = end_time - self.start_time;
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len() + self.outer_hits.len()
    }

    /// Summed charge over both detector layers
    pub fn total_charge(&self) -> f64 {
        self.hits
            .iter()
            .chain(self.outer_hits.iter())
            .map(|hit| hit.charge)
            .sum()
    }

    /// Comma-separated particle names, `-` when there are none
    pub fn display_label(&self) -> String {
        if self.particles.is_empty() {
            return "-".to_string();
        }
        self.particles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Enable the first particle's cone and disable the rest
    pub fn apply_default_display(&mut self) {
        for (idx, particle) in self.particles.iter_mut().enumerate() {
            particle.display_enabled = idx == 0;
        }
    }
}
