//! Detector geometry: the conversion constants that map source coordinates
//! into display units.
//!
//! Inner-detector hits, outer-detector hits and the event vertex are all
//! recorded in different source units. A single [`DetectorGeometry`] value
//! carries every constant needed to bring them into a common frame.

use glam::DVec3;

/// Which detector layer a hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorLayer {
    /// Inner detector (`ID` records)
    Inner,
    /// Outer detector / veto (`OD` records)
    Outer,
}

/// Conversion constants for one detector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorGeometry {
    /// Linear factor applied last to every converted coordinate
    pub length_scale: f64,
    /// Outer hits and the vertex record x/y in centimetres
    pub outer_xy_divisor: f64,
    /// Outer z is mapped by `z * outer_z_scale + outer_z_offset`
    pub outer_z_scale: f64,
    pub outer_z_offset: f64,
    /// Display radius of an inner-detector hit
    pub inner_hit_radius: f64,
    /// Display radius of an outer-detector hit
    pub outer_hit_radius: f64,
}

/// Metres to feet
pub const FEET_PER_METRE: f64 = 3.28;

impl DetectorGeometry {
    /// Geometry with coordinates expressed in feet (the historical default)
    pub fn feet() -> Self {
        Self::with_length_scale(FEET_PER_METRE)
    }

    /// Geometry with coordinates left in metres
    pub fn metres() -> Self {
        Self::with_length_scale(1.0)
    }

    fn with_length_scale(length_scale: f64) -> Self {
        Self {
            length_scale,
            outer_xy_divisor: 100.0,
            outer_z_scale: 20.0 / 1810.0,
            outer_z_offset: 20.0,
            inner_hit_radius: 0.3 * length_scale,
            outer_hit_radius: 0.2 * length_scale,
        }
    }

    /// Display radius for hits on the given layer
    pub fn hit_radius(&self, layer: DetectorLayer) -> f64 {
        match layer {
            DetectorLayer::Inner => self.inner_hit_radius,
            DetectorLayer::Outer => self.outer_hit_radius,
        }
    }

    /// Convert a raw hit position for the given layer
    pub fn hit_position(&self, layer: DetectorLayer, raw: DVec3) -> DVec3 {
        match layer {
            DetectorLayer::Inner => raw * self.length_scale,
            DetectorLayer::Outer => {
                let x = raw.x / self.outer_xy_divisor;
                let y = raw.y / self.outer_xy_divisor;
                let z = self.outer_z(raw.z);
                DVec3::new(x, y, z) * self.length_scale
            }
        }
    }

    /// Convert a raw vertex position
    ///
    /// x and y go through the centimetre divisor, z through the same
    /// affine map as outer-detector z.
    pub fn vertex_position(&self, raw: DVec3) -> DVec3 {
        DVec3::new(
            raw.x / self.outer_xy_divisor * self.length_scale,
            raw.y / self.outer_xy_divisor * self.length_scale,
            self.outer_z(raw.z) * self.length_scale,
        )
    }

    fn outer_z(&self, z: f64) -> f64 {
        z * self.outer_z_scale + self.outer_z_offset
    }
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self::feet()
    }
}

/// Named geometry presets, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryPreset {
    #[default]
    Feet,
    Metres,
}

impl From<GeometryPreset> for DetectorGeometry {
    fn from(preset: GeometryPreset) -> Self {
        match preset {
            GeometryPreset::Feet => DetectorGeometry::feet(),
            GeometryPreset::Metres => DetectorGeometry::metres(),
        }
    }
}
