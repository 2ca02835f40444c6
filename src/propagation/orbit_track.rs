//! Orbit path sampling

use glam::Vec3;
use nalgebra::Vector3;
use serde::Serialize;

use super::frames::{perifocal_rotation, to_render_point, Geodetic};
use super::geostationary::{station_longitude, OrbitClass};
use super::kepler::propagate_validated;
use super::state::Frame;
use crate::elements::OrbitalElements;
use crate::error::{Confidence, OrbitError, OrbitResult};
use crate::settings::EngineSettings;

/// Closed polyline approximating one full orbit
///
/// Holds `samples + 1` points; the last repeats the first. Point `k` sits at
/// phase `k / samples`: one period after the reference epoch, sampled
/// uniformly in time, for Keplerian orbits, and uniformly in longitude from the
/// station for the geostationary ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitPath {
    points: Vec<Vector3<f64>>,
    frame: Frame,
    class: OrbitClass,
    samples: usize,
    confidence: Confidence,
}

impl OrbitPath {
    /// All points, including the closing duplicate
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Distinct sample points (closing duplicate excluded)
    pub fn samples(&self) -> &[Vector3<f64>] {
        &self.points[..self.samples]
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn class(&self) -> OrbitClass {
        self.class
    }

    /// Low if any sample came from an unconverged Kepler solve
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Normalized position of sample `index` along the path, in [0, 1)
    pub fn phase_of(&self, index: usize) -> f64 {
        (index % self.samples) as f64 / self.samples as f64
    }

    /// Points in render space (body radii, Y up)
    pub fn to_render_points(&self, body_radius: f64) -> Vec<Vec3> {
        self.points
            .iter()
            .map(|p| to_render_point(p, body_radius))
            .collect()
    }
}

/// Sample `num_points` positions around one full orbit
///
/// Geostationary element sets yield a fixed ring in the body-fixed equatorial
/// plane; everything else is propagated at equal time steps over one period
/// and rotated into the inertial frame. Output depends only on the inputs.
pub fn sample_path(
    elements: &OrbitalElements,
    num_points: usize,
    settings: &EngineSettings,
) -> OrbitResult<OrbitPath> {
    elements.validate(&settings.body)?;
    if num_points < 2 {
        return Err(OrbitError::InvalidSampleCount {
            requested: num_points,
        });
    }

    let path = match OrbitClass::of(elements, settings) {
        OrbitClass::GeostationaryFixed => sample_ring(elements, num_points, settings),
        OrbitClass::Keplerian => sample_keplerian(elements, num_points, settings),
    };

    log::trace!(
        "Sampled {} points ({:?}, {:?} frame)",
        num_points,
        path.class,
        path.frame
    );

    Ok(path)
}

fn sample_ring(elements: &OrbitalElements, num_points: usize, settings: &EngineSettings) -> OrbitPath {
    let radius = settings.body.radius;
    let altitude = elements.altitude(&settings.body);
    let start = station_longitude(elements);
    let step = 360.0 / num_points as f64;

    let mut points = Vec::with_capacity(num_points + 1);
    for k in 0..num_points {
        let lon = start + step * k as f64;
        points.push(Geodetic::new(0.0, lon, altitude).to_body_fixed(radius).vector);
    }
    points.push(points[0]);

    OrbitPath {
        points,
        frame: Frame::BodyFixed,
        class: OrbitClass::GeostationaryFixed,
        samples: num_points,
        confidence: Confidence::Nominal,
    }
}

fn sample_keplerian(
    elements: &OrbitalElements,
    num_points: usize,
    settings: &EngineSettings,
) -> OrbitPath {
    let period = elements.period(settings.body.mu);
    let step = period / num_points as f64;
    let rotation = perifocal_rotation(
        elements.inclination,
        elements.right_ascension,
        elements.argument_of_periapsis,
    );

    let mut points = Vec::with_capacity(num_points + 1);
    let mut confidence = Confidence::Nominal;
    for k in 0..num_points {
        let p = propagate_validated(elements, step * k as f64, &settings.body, &settings.kepler);
        confidence = confidence.min(p.confidence);
        points.push(rotation * p.vector);
    }
    points.push(points[0]);

    OrbitPath {
        points,
        frame: Frame::Inertial,
        class: OrbitClass::Keplerian,
        samples: num_points,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::frames::orbit_normal;
    use crate::settings::KeplerSettings;

    fn leo() -> OrbitalElements {
        OrbitalElements::new(6_978_137.0, 0.001, 51.6, 30.0, 45.0, 0.0)
    }

    fn geo() -> OrbitalElements {
        OrbitalElements::new(42_164_000.0, 0.0, 0.1, 0.0, 0.0, 75.0)
    }

    #[test]
    fn test_path_is_closed() {
        let settings = EngineSettings::default();
        let path = sample_path(&leo(), 360, &settings).unwrap();

        assert_eq!(path.points().len(), 361);
        assert_eq!(path.samples().len(), 360);
        assert_eq!(path.points()[0], path.points()[360]);
        assert_eq!(path.frame(), Frame::Inertial);
        assert_eq!(path.class(), OrbitClass::Keplerian);
        assert_eq!(path.confidence(), Confidence::Nominal);
    }

    #[test]
    fn test_path_is_idempotent() {
        let settings = EngineSettings::default();
        let a = sample_path(&leo(), 720, &settings).unwrap();
        let b = sample_path(&leo(), 720, &settings).unwrap();
        assert_eq!(a, b);

        let ga = sample_path(&geo(), 360, &settings).unwrap();
        let gb = sample_path(&geo(), 360, &settings).unwrap();
        assert_eq!(ga, gb);
    }

    #[test]
    fn test_keplerian_points_lie_in_orbit_plane() {
        let settings = EngineSettings::default();
        let elements = leo();
        let path = sample_path(&elements, 90, &settings).unwrap();
        let normal = orbit_normal(elements.inclination, elements.right_ascension);

        for p in path.points() {
            assert!(p.dot(&normal).abs() / p.norm() < 1e-12);
            let r = p.norm();
            assert!(r >= elements.perigee_radius() - 1e-3);
            assert!(r <= elements.apogee_radius() + 1e-3);
        }
    }

    #[test]
    fn test_geostationary_ring() {
        let settings = EngineSettings::default();
        let path = sample_path(&geo(), 360, &settings).unwrap();

        assert_eq!(path.frame(), Frame::BodyFixed);
        assert_eq!(path.class(), OrbitClass::GeostationaryFixed);

        for p in path.points() {
            assert!((p.norm() - 42_164_000.0).abs() < 1e-3);
            assert!(p.z.abs() < 1e-6);
        }

        // Ring starts at the station
        let first = path.points()[0];
        let lon = first.y.atan2(first.x).to_degrees();
        assert!((lon - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_of() {
        let settings = EngineSettings::default();
        let path = sample_path(&leo(), 720, &settings).unwrap();
        assert_eq!(path.phase_of(0), 0.0);
        assert!((path.phase_of(180) - 0.25).abs() < 1e-15);
        assert_eq!(path.phase_of(720), 0.0);
    }

    #[test]
    fn test_rejects_degenerate_requests() {
        let settings = EngineSettings::default();
        assert!(matches!(
            sample_path(&leo(), 1, &settings),
            Err(OrbitError::InvalidSampleCount { requested: 1 })
        ));

        let mut bad = leo();
        bad.eccentricity = 1.5;
        assert!(matches!(
            sample_path(&bad, 360, &settings),
            Err(OrbitError::InvalidElements { .. })
        ));
    }

    #[test]
    fn test_render_points() {
        let settings = EngineSettings::default();
        let path = sample_path(&geo(), 4, &settings).unwrap();
        let render = path.to_render_points(settings.body.radius);

        assert_eq!(render.len(), 5);
        let expected_radius = (42_164_000.0 / settings.body.radius) as f32;
        for v in render {
            assert!((v.length() - expected_radius).abs() < 1e-4);
            assert!(v.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_path_carries_low_confidence() {
        let mut settings = EngineSettings::default();
        settings.kepler = KeplerSettings {
            tolerance: 1e-15,
            max_iterations: 1,
        };
        let eccentric = OrbitalElements::new(20_000_000.0, 0.9, 30.0, 0.0, 0.0, 0.0);

        let path = sample_path(&eccentric, 360, &settings).unwrap();
        assert_eq!(path.confidence(), Confidence::Low);
        assert_eq!(path.points().len(), 361);
        assert!(path.points().iter().all(|p| p.iter().all(|c| c.is_finite())));

        // The geostationary ring never runs the solver
        let ring = sample_path(&geo(), 360, &settings).unwrap();
        assert_eq!(ring.confidence(), Confidence::Nominal);
    }
}
