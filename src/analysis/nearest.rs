//! Nearest point on a sampled orbit

use nalgebra::Vector3;
use serde::Serialize;

use crate::elements::OrbitalElements;
use crate::error::{OrbitError, OrbitResult};
use crate::propagation::{sample_path, Frame, OrbitPath};
use crate::settings::{EngineSettings, MIN_QUERY_POINTS};

/// Closest point of an orbit path to a query point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestPoint {
    /// Closest point on the interpolated path, in the path's frame
    pub point: Vector3<f64>,
    /// Normalized orbital position of `point`, in [0, 1)
    ///
    /// Interpolated: `(index + offset) / samples`, where `offset` places
    /// `point` along the refined segment. For a query exactly on a sample
    /// this is `index / samples`; `index` keeps the raw sample.
    pub phase: f64,
    /// Euclidean distance from the query to `point` (meters)
    pub distance: f64,
    /// Index of the closest raw sample
    pub index: usize,
    pub frame: Frame,
    /// Whether `distance` is within the off-orbit tolerance
    pub within_tolerance: bool,
}

/// Nearest point on a freshly sampled orbit
///
/// Samples at the configured query density (at least 720 points). Callers
/// that repeat queries against the same object should sample once, or use a
/// `PathCache`, and call [`nearest_point_on_path`].
pub fn nearest_point(
    query: &Vector3<f64>,
    elements: &OrbitalElements,
    settings: &EngineSettings,
) -> OrbitResult<NearestPoint> {
    let path = sample_path(elements, settings.sampling.effective_query_points(), settings)?;
    nearest_point_on_path(query, &path, settings.query.off_orbit_tolerance)
}

/// Nearest point on an existing path
///
/// A linear scan finds the closest sample, then the query is projected onto
/// the two segments joining that sample to its neighbours. The better
/// projection replaces the raw sample, which keeps the error well below the
/// sample spacing. Paths below [`MIN_QUERY_POINTS`] samples are rejected.
pub fn nearest_point_on_path(
    query: &Vector3<f64>,
    path: &OrbitPath,
    tolerance: f64,
) -> OrbitResult<NearestPoint> {
    if !query.iter().all(|c| c.is_finite()) {
        return Err(OrbitError::InvalidQuery(format!(
            "query point must be finite, got {:?}",
            query
        )));
    }

    if path.sample_count() < MIN_QUERY_POINTS {
        return Err(OrbitError::InvalidQuery(format!(
            "path has {} samples, queries need at least {}",
            path.sample_count(),
            MIN_QUERY_POINTS
        )));
    }

    let samples = path.samples();
    let n = samples.len();

    let (index, _) = samples
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p - query).norm_squared()))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        });

    let current = samples[index];
    let prev = samples[(index + n - 1) % n];
    let next = samples[(index + 1) % n];

    // Offsets are in units of samples relative to `index`
    let (before, t_before) = project_onto_segment(query, &prev, &current);
    let (after, t_after) = project_onto_segment(query, &current, &next);
    let d_before = (before - query).norm();
    let d_after = (after - query).norm();

    let (point, distance, offset) = if d_after <= d_before {
        (after, d_after, t_after)
    } else {
        (before, d_before, t_before - 1.0)
    };

    let mut phase = ((index as f64 + offset) / n as f64).rem_euclid(1.0);
    if phase >= 1.0 {
        phase = 0.0;
    }

    let within_tolerance = distance <= tolerance;
    if !within_tolerance {
        log::trace!(
            "Query is {:.0} m from the orbit (tolerance {:.0} m)",
            distance,
            tolerance
        );
    }

    Ok(NearestPoint {
        point,
        phase,
        distance,
        index,
        frame: path.frame(),
        within_tolerance,
    })
}

/// Closest point on segment a→b and its parameter in [0, 1]
fn project_onto_segment(
    query: &Vector3<f64>,
    a: &Vector3<f64>,
    b: &Vector3<f64>,
) -> (Vector3<f64>, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (*a, 0.0);
    }
    let t = ((query - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::Propagator;

    fn leo() -> OrbitalElements {
        OrbitalElements::new(6_978_137.0, 0.001, 51.6, 30.0, 45.0, 0.0)
    }

    #[test]
    fn test_query_on_sample() {
        let settings = EngineSettings::default();
        let path = sample_path(&leo(), 720, &settings).unwrap();

        for &k in &[0usize, 1, 181, 360, 719] {
            let query = path.points()[k];
            let hit = nearest_point_on_path(&query, &path, 1_000.0).unwrap();

            assert!(hit.distance < 1e-6, "distance {} at {}", hit.distance, k);
            assert_eq!(hit.index, k);
            assert!((hit.phase - k as f64 / 720.0).abs() < 1e-12);
            assert!(hit.within_tolerance);
            assert_eq!(hit.frame, Frame::Inertial);
        }
    }

    #[test]
    fn test_refinement_beats_sampling() {
        let settings = EngineSettings::default();
        let elements = leo();
        let path = sample_path(&elements, 720, &settings).unwrap();

        // Halfway in time between samples 100 and 101, slightly above the orbit
        let period = elements.period(settings.body.mu);
        let engine = Propagator::new();
        let between = engine
            .propagate(&elements, period * 100.5 / 720.0)
            .unwrap()
            .position
            .vector;
        let query = between * 1.0001;

        let hit = nearest_point_on_path(&query, &path, 50_000.0).unwrap();
        let raw = (path.points()[100] - query).norm().min((path.points()[101] - query).norm());

        assert!(hit.distance < raw);
        assert!(hit.distance < 1_000.0);
        assert!((hit.phase - 100.5 / 720.0).abs() < 0.5 / 720.0);
    }

    #[test]
    fn test_phase_wraps_below_zero() {
        let settings = EngineSettings::default();
        let path = sample_path(&leo(), 720, &settings).unwrap();

        // Between the last sample and the first
        let query = (path.points()[719] + path.points()[0]) * 0.5;
        let hit = nearest_point_on_path(&query, &path, 50_000.0).unwrap();

        assert!(hit.phase >= 0.0 && hit.phase < 1.0);
        assert!(hit.phase > 719.0 / 720.0 || hit.phase < 1.0 / 720.0);
        assert!(hit.distance < 1.0);
    }

    #[test]
    fn test_off_orbit_flag() {
        let settings = EngineSettings::default();
        let hit = nearest_point(&Vector3::new(0.0, 0.0, 2.0e7), &leo(), &settings).unwrap();

        assert!(!hit.within_tolerance);
        assert!(hit.distance > settings.query.off_orbit_tolerance);
    }

    #[test]
    fn test_geostationary_ring_query() {
        let settings = EngineSettings::default();
        let geo = OrbitalElements::new(42_164_000.0, 0.0, 0.0, 0.0, 0.0, 0.0);

        // Above the equator at longitude 90°
        let query = Vector3::new(0.0, 42_164_000.0, 0.0);
        let hit = nearest_point(&query, &geo, &settings).unwrap();

        assert_eq!(hit.frame, Frame::BodyFixed);
        assert!(hit.distance < 1.0);
        assert!((hit.phase - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_paths_below_query_density() {
        let settings = EngineSettings::default();
        let path = sample_path(&leo(), settings.sampling.render_points, &settings).unwrap();
        let query = path.points()[10];

        assert!(matches!(
            nearest_point_on_path(&query, &path, 50_000.0),
            Err(OrbitError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_query() {
        let settings = EngineSettings::default();
        let result = nearest_point(&Vector3::new(f64::NAN, 0.0, 0.0), &leo(), &settings);
        assert!(matches!(result, Err(OrbitError::InvalidQuery(_))));
    }
}
