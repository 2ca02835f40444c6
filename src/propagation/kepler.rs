//! Two-body Kepler propagation for elliptical orbits
//!
//! Solves the time-of-flight problem in the orbital plane. Orientation of the
//! plane is applied separately by [`super::frames`].

use std::f64::consts::TAU;

use nalgebra::Vector3;

use super::state::PerifocalPosition;
use crate::elements::OrbitalElements;
use crate::error::{Confidence, OrbitError, OrbitResult};
use crate::settings::{CentralBody, KeplerSettings};

/// Wrap an angle into [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Result of solving E − e·sinE = M
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly in [0, 2π)
    pub eccentric_anomaly: f64,
    pub iterations: u32,
    pub converged: bool,
}

impl KeplerSolution {
    pub fn confidence(&self) -> Confidence {
        if self.converged {
            Confidence::Nominal
        } else {
            Confidence::Low
        }
    }
}

/// Newton-Raphson on Kepler's equation, seeded at E₀ = M
///
/// Runs out of budget gracefully: the last iterate is returned with
/// `converged == false`.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64, settings: &KeplerSettings) -> KeplerSolution {
    let m = normalize_angle(mean_anomaly);
    let mut ea = m;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < settings.max_iterations {
        let residual = ea - eccentricity * ea.sin() - m;
        let delta = residual / (1.0 - eccentricity * ea.cos());
        ea -= delta;
        iterations += 1;

        if delta.abs() <= settings.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        log::debug!(
            "Kepler solver hit {} iterations (M = {:.6}, e = {:.6}, residual = {:.3e})",
            iterations,
            m,
            eccentricity,
            ea - eccentricity * ea.sin() - m
        );
    }

    KeplerSolution {
        eccentric_anomaly: normalize_angle(ea),
        iterations,
        converged,
    }
}

/// True anomaly from eccentric anomaly, in [0, 2π)
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let beta = (1.0 - eccentricity * eccentricity).sqrt();
    normalize_angle((beta * eccentric_anomaly.sin()).atan2(eccentric_anomaly.cos() - eccentricity))
}

/// Mean anomaly reached at a given true anomaly, in [0, 2π)
pub fn mean_anomaly_from_true(true_anomaly: f64, eccentricity: f64) -> f64 {
    let nu = normalize_angle(true_anomaly);
    let beta = (1.0 - eccentricity * eccentricity).sqrt();
    let ea = (beta * nu.sin()).atan2(eccentricity + nu.cos());
    normalize_angle(ea - eccentricity * ea.sin())
}

/// Mean anomaly at `elapsed` seconds past the reference epoch, in [0, 2π)
pub fn mean_anomaly_at(elements: &OrbitalElements, elapsed: f64, mu: f64) -> f64 {
    let m0 = elements.mean_anomaly_at_epoch.to_radians();
    normalize_angle(m0 + elements.mean_motion(mu) * elapsed)
}

/// Position in the perifocal plane `elapsed` seconds past the reference epoch
pub fn propagate(
    elements: &OrbitalElements,
    elapsed: f64,
    body: &CentralBody,
    settings: &KeplerSettings,
) -> OrbitResult<PerifocalPosition> {
    elements.validate(body)?;
    if !elapsed.is_finite() {
        return Err(OrbitError::InvalidQuery(format!(
            "elapsed time must be finite, got {}",
            elapsed
        )));
    }
    Ok(propagate_validated(elements, elapsed, body, settings))
}

/// Propagation for element sets that already passed validation
pub(crate) fn propagate_validated(
    elements: &OrbitalElements,
    elapsed: f64,
    body: &CentralBody,
    settings: &KeplerSettings,
) -> PerifocalPosition {
    let e = elements.eccentricity;
    let mean_anomaly = mean_anomaly_at(elements, elapsed, body.mu);
    let solution = solve_kepler(mean_anomaly, e, settings);

    let nu = true_anomaly(solution.eccentric_anomaly, e);
    let radius = elements.semi_latus_rectum() / (1.0 + e * nu.cos());

    PerifocalPosition {
        vector: Vector3::new(radius * nu.cos(), radius * nu.sin(), 0.0),
        mean_anomaly,
        eccentric_anomaly: solution.eccentric_anomaly,
        true_anomaly: nu,
        radius,
        iterations: solution.iterations,
        confidence: solution.confidence(),
    }
}
