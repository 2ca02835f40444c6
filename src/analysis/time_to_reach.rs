//! Time until a satellite reaches a point on its orbit

use nalgebra::Vector3;
use serde::Serialize;

use super::nearest::nearest_point_on_path;
use crate::elements::OrbitalElements;
use crate::error::{Confidence, OrbitError, OrbitResult};
use crate::propagation::kepler::{self, mean_anomaly_from_true, normalize_angle};
use crate::propagation::{orbit_normal, perifocal_rotation, sample_path, OrbitClass, OrbitPath};
use crate::settings::{EngineSettings, ReachMethod};

/// Result of a time-to-reach query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeToReach {
    /// Forward (prograde) travel time in seconds, in [0, period)
    Eta { seconds: f64, confidence: Confidence },
    /// Target is too far from the orbit for an ETA to mean anything
    OffOrbit { distance: f64, tolerance: f64 },
}

impl TimeToReach {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Eta { seconds, .. } => Some(*seconds),
            Self::OffOrbit { .. } => None,
        }
    }

    pub fn is_off_orbit(&self) -> bool {
        matches!(self, Self::OffOrbit { .. })
    }
}

/// Seconds until the satellite, `current_elapsed` seconds past the reference
/// epoch, reaches `target`
///
/// `target` must be in the frame the orbit is drawn in: inertial for
/// Keplerian orbits, body-fixed for geostationary ones. Geostationary
/// satellites are already everywhere on their fixed ring, so the answer is 0.
pub fn time_to_reach(
    current_elapsed: f64,
    target: &Vector3<f64>,
    elements: &OrbitalElements,
    settings: &EngineSettings,
) -> OrbitResult<TimeToReach> {
    validate_inputs(current_elapsed, target, elements, settings)?;
    if OrbitClass::of(elements, settings).is_fixed() {
        return Ok(geostationary_eta());
    }

    let path = sample_path(elements, settings.sampling.effective_query_points(), settings)?;
    time_to_reach_validated(current_elapsed, target, elements, &path, settings)
}

/// Same as [`time_to_reach`] against a path the caller already holds
///
/// The path must have been sampled from `elements` at query density: its
/// class has to match the element set and it needs at least
/// [`MIN_QUERY_POINTS`](crate::settings::MIN_QUERY_POINTS) samples.
pub fn time_to_reach_on_path(
    current_elapsed: f64,
    target: &Vector3<f64>,
    elements: &OrbitalElements,
    path: &OrbitPath,
    settings: &EngineSettings,
) -> OrbitResult<TimeToReach> {
    validate_inputs(current_elapsed, target, elements, settings)?;
    let class = OrbitClass::of(elements, settings);
    if path.class() != class {
        return Err(OrbitError::InvalidQuery(format!(
            "path was sampled as {:?} but the elements are {:?}",
            path.class(),
            class
        )));
    }
    if class.is_fixed() {
        return Ok(geostationary_eta());
    }
    time_to_reach_validated(current_elapsed, target, elements, path, settings)
}

fn geostationary_eta() -> TimeToReach {
    TimeToReach::Eta {
        seconds: 0.0,
        confidence: Confidence::Nominal,
    }
}

fn validate_inputs(
    current_elapsed: f64,
    target: &Vector3<f64>,
    elements: &OrbitalElements,
    settings: &EngineSettings,
) -> OrbitResult<()> {
    elements.validate(&settings.body)?;
    if !current_elapsed.is_finite() {
        return Err(OrbitError::InvalidQuery(format!(
            "elapsed time must be finite, got {}",
            current_elapsed
        )));
    }
    if !target.iter().all(|c| c.is_finite()) {
        return Err(OrbitError::InvalidQuery(format!(
            "target must be finite, got {:?}",
            target
        )));
    }
    Ok(())
}

fn time_to_reach_validated(
    current_elapsed: f64,
    target: &Vector3<f64>,
    elements: &OrbitalElements,
    path: &OrbitPath,
    settings: &EngineSettings,
) -> OrbitResult<TimeToReach> {
    let tolerance = settings.query.off_orbit_tolerance;
    let nearest = nearest_point_on_path(target, path, tolerance)?;
    if !nearest.within_tolerance {
        log::warn!(
            "Target is {:.1} km off the orbit (tolerance {:.1} km); no ETA",
            nearest.distance / 1000.0,
            tolerance / 1000.0
        );
        return Ok(TimeToReach::OffOrbit {
            distance: nearest.distance,
            tolerance,
        });
    }

    let current = kepler::propagate_validated(
        elements,
        current_elapsed,
        &settings.body,
        &settings.kepler,
    );
    let rotation = perifocal_rotation(
        elements.inclination,
        elements.right_ascension,
        elements.argument_of_periapsis,
    );
    let satellite = rotation * current.vector;

    let normal = orbit_normal(elements.inclination, elements.right_ascension);
    let from = in_plane_direction(&satellite, &normal)?;
    let to = in_plane_direction(target, &normal)?;

    let n = elements.mean_motion(settings.body.mu);
    let seconds = match settings.query.reach_method {
        ReachMethod::AngularRate => {
            let sin = from.cross(&to).dot(&normal);
            let cos = from.dot(&to);
            normalize_angle(sin.atan2(cos)) / n
        }
        ReachMethod::TimeOfFlight => {
            let perifocal = rotation.inverse() * to;
            let target_true_anomaly = perifocal.y.atan2(perifocal.x);
            let target_mean = mean_anomaly_from_true(target_true_anomaly, elements.eccentricity);
            normalize_angle(target_mean - current.mean_anomaly) / n
        }
    };

    Ok(TimeToReach::Eta {
        seconds,
        confidence: current.confidence,
    })
}

/// Unit projection of a point onto the orbital plane
fn in_plane_direction(point: &Vector3<f64>, normal: &Vector3<f64>) -> OrbitResult<Vector3<f64>> {
    let projected = point - normal * point.dot(normal);
    let len = projected.norm();
    if len <= f64::EPSILON * point.norm().max(1.0) {
        return Err(OrbitError::InvalidQuery(
            "point lies on the orbit normal axis".to_string(),
        ));
    }
    Ok(projected / len)
}
