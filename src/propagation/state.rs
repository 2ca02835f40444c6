//! Position and state representations
//!
//! Positions carry the frame they were computed in. The engine never converts
//! between frames implicitly; callers mixing an inertial position with a
//! body-fixed one without converting get meaningless geometry.

use nalgebra::Vector3;
use serde::Serialize;

use crate::error::Confidence;

/// Reference frame a position is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// Orbital plane, x toward periapsis, z along the orbit normal
    Perifocal,
    /// Non-rotating, centered on the orbited body, z along the polar axis
    Inertial,
    /// Rotates with the orbited body, x through the prime meridian
    BodyFixed,
}

/// A 3-vector in meters, tagged with its frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub vector: Vector3<f64>,
    pub frame: Frame,
}

impl Position {
    pub fn new(vector: Vector3<f64>, frame: Frame) -> Self {
        Self { vector, frame }
    }

    pub fn inertial(vector: Vector3<f64>) -> Self {
        Self::new(vector, Frame::Inertial)
    }

    pub fn body_fixed(vector: Vector3<f64>) -> Self {
        Self::new(vector, Frame::BodyFixed)
    }

    /// Distance from the body center in meters
    pub fn radius(&self) -> f64 {
        self.vector.norm()
    }

    /// Altitude above a spherical body of the given radius (meters)
    pub fn altitude(&self, body_radius: f64) -> f64 {
        self.radius() - body_radius
    }

    /// Altitude in kilometers
    pub fn altitude_km(&self, body_radius: f64) -> f64 {
        self.altitude(body_radius) / 1000.0
    }
}

/// Output of the Kepler propagator, still in the orbital plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerifocalPosition {
    /// (r·cosν, r·sinν, 0) in meters
    pub vector: Vector3<f64>,
    /// Mean anomaly at the requested time, in [0, 2π)
    pub mean_anomaly: f64,
    /// Eccentric anomaly solving Kepler's equation, in [0, 2π)
    pub eccentric_anomaly: f64,
    /// True anomaly, in [0, 2π)
    pub true_anomaly: f64,
    /// Orbital radius in meters
    pub radius: f64,
    /// Newton-Raphson iterations spent
    pub iterations: u32,
    pub confidence: Confidence,
}

impl PerifocalPosition {
    pub fn position(&self) -> Position {
        Position::new(self.vector, Frame::Perifocal)
    }
}

/// Propagated state of one tracked object
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateEstimate {
    pub position: Position,
    /// Which branch produced the position
    pub class: super::OrbitClass,
    pub confidence: Confidence,
    /// Kepler iterations spent (0 for fixed geostationary positions)
    pub iterations: u32,
}

// Physical constants
/// Earth's gravitational parameter (GM) in m³/s²
pub const MU_EARTH: f64 = 3.986004418e14;

/// Earth's WGS-84 equatorial radius in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Earth's rotation rate in rad/s
pub const OMEGA_EARTH: f64 = 7.2921150e-5;
