//! Relativistic kinematics and Cherenkov cone geometry for final-state particles
//!
//! Given a GEANT-style particle code and a momentum in MeV, [`compute`]
//! derives the particle's mass, Cherenkov threshold, velocity, total energy
//! and cone half-angle.

use std::f64::consts::PI;
use thiserror::Error;

/// Speed of light in m/s
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Rest masses in kg
pub const ELECTRON_MASS: f64 = 9.11e-31;
pub const MUON_MASS: f64 = 1.88352473e-28;
pub const PION_MASS: f64 = 2.483e-28;

/// Cherenkov thresholds in MeV (total energy, water)
pub const ELECTRON_THRESHOLD: f64 = 0.768;
pub const MUON_THRESHOLD: f64 = 158.7;
pub const PION_THRESHOLD: f64 = 209.7;

/// Constants used when converting MeV/c momenta to SI
const ELEMENTARY_CHARGE: f64 = 1.6e-19;
const MOMENTUM_LIGHT_SPEED: f64 = 2.998e8;

/// Joules per MeV
const JOULES_PER_MEV: f64 = 1.602e-13;

/// Refractive index of water
pub const WATER_REFRACTIVE_INDEX: f64 = 1.33;

/// Errors from the cone-angle formula
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    #[error("no Cherenkov cone: beta * n = {beta} * {refractive_index} is below 1")]
    InvalidCherenkovGeometry { beta: f64, refractive_index: f64 },
}

/// The radiating medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Medium {
    pub refractive_index: f64,
}

impl Medium {
    pub const WATER: Medium = Medium {
        refractive_index: WATER_REFRACTIVE_INDEX,
    };
}

impl Default for Medium {
    fn default() -> Self {
        Self::WATER
    }
}

/// Particle species, classified from the absolute type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Electron,
    Muon,
    Pion,
    /// Anything else is treated as an electron for mass and threshold
    Unknown,
}

impl ParticleKind {
    pub fn from_type_code(type_code: i32) -> Self {
        match type_code.unsigned_abs() {
            11 => ParticleKind::Electron,
            13 => ParticleKind::Muon,
            211 => ParticleKind::Pion,
            _ => ParticleKind::Unknown,
        }
    }

    /// Rest mass in kg
    pub fn mass(self) -> f64 {
        match self {
            ParticleKind::Muon => MUON_MASS,
            ParticleKind::Pion => PION_MASS,
            ParticleKind::Electron | ParticleKind::Unknown => ELECTRON_MASS,
        }
    }

    /// Cherenkov threshold in MeV
    pub fn threshold(self) -> f64 {
        match self {
            ParticleKind::Muon => MUON_THRESHOLD,
            ParticleKind::Pion => PION_THRESHOLD,
            ParticleKind::Electron | ParticleKind::Unknown => ELECTRON_THRESHOLD,
        }
    }
}

/// Display label for an exact signed type code
pub fn particle_name(type_code: i32) -> String {
    let label = match type_code {
        11 => "Electron",
        -11 => "Positron",
        13 => "Muon",
        -13 => "Antimuon",
        211 => "Pion+",
        -211 => "Pion-",
        other => return other.to_string(),
    };
    label.to_string()
}

/// Everything derived from a particle's type code and momentum
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    pub kind: ParticleKind,
    /// kg
    pub mass: f64,
    /// MeV
    pub threshold: f64,
    /// m/s
    pub velocity: f64,
    pub beta: f64,
    /// Total energy in MeV
    pub energy: f64,
    /// Degrees; 0 when no cone is emitted
    pub cone_half_angle: f64,
    pub name: String,
}

/// Derive kinematics in water
pub fn compute(type_code: i32, momentum_mev: f64) -> Kinematics {
    compute_in(Medium::WATER, type_code, momentum_mev)
}

/// Derive kinematics in an arbitrary medium
pub fn compute_in(medium: Medium, type_code: i32, momentum_mev: f64) -> Kinematics {
    let kind = ParticleKind::from_type_code(type_code);
    let mass = kind.mass();
    let threshold = kind.threshold();

    let p = momentum_to_si(momentum_mev);
    let c = SPEED_OF_LIGHT;
    let velocity = (p.powi(2) / (mass.powi(2) + p.powi(2) / c.powi(2))).sqrt();
    let energy = (p.powi(2) * c.powi(2) + mass.powi(2) * c.powi(4)).sqrt() / JOULES_PER_MEV;
    let beta = velocity / c;

    let cone_half_angle = if energy > threshold {
        match cone_angle(beta, medium.refractive_index) {
            Ok(angle) => angle,
            Err(err) => {
                log::warn!("{}: {err}; using no cone", particle_name(type_code));
                0.0
            }
        }
    } else {
        0.0
    };

    Kinematics {
        kind,
        mass,
        threshold,
        velocity,
        beta,
        energy,
        cone_half_angle,
        name: particle_name(type_code),
    }
}

/// Convert a momentum in MeV/c to kg·m/s
pub fn momentum_to_si(momentum_mev: f64) -> f64 {
    momentum_mev * 1e6 * ELEMENTARY_CHARGE / MOMENTUM_LIGHT_SPEED
}

/// Cherenkov half-angle in degrees: `cos(theta) = 1 / (beta * n)`
pub fn cone_angle(beta: f64, refractive_index: f64) -> Result<f64, KinematicsError> {
    let cos_theta = 1.0 / (beta * refractive_index);
    if cos_theta.is_nan() || cos_theta > 1.0 {
        return Err(KinematicsError::InvalidCherenkovGeometry {
            beta,
            refractive_index,
        });
    }
    Ok(cos_theta.acos() * 180.0 / PI)
}
