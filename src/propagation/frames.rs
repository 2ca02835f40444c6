//! Frame transforms
//!
//! Rotation from the perifocal plane into the parent inertial frame, plus the
//! body-fixed, geodetic and render-space conversions used around it.

use glam::Vec3;
use nalgebra::{Rotation3, Vector3};
use serde::Serialize;

use super::kepler::normalize_angle;
use super::state::{Frame, PerifocalPosition, Position};

/// Perifocal → inertial rotation
///
/// Applied to a vector in order: argument of periapsis about the orbit
/// normal, then inclination about the line of nodes, then RAAN about the
/// polar axis. Angles in degrees.
pub fn perifocal_rotation(inclination: f64, raan: f64, arg_periapsis: f64) -> Rotation3<f64> {
    let z = Vector3::z_axis();
    let x = Vector3::x_axis();

    let r_raan = Rotation3::from_axis_angle(&z, raan.to_radians());
    let r_inc = Rotation3::from_axis_angle(&x, inclination.to_radians());
    let r_argp = Rotation3::from_axis_angle(&z, arg_periapsis.to_radians());

    r_raan * r_inc * r_argp
}

/// Rotate a perifocal position into the inertial frame
pub fn to_inertial(
    perifocal: &PerifocalPosition,
    inclination: f64,
    raan: f64,
    arg_periapsis: f64,
) -> Position {
    let rotation = perifocal_rotation(inclination, raan, arg_periapsis);
    Position::inertial(rotation * perifocal.vector)
}

/// Unit orbit normal (angular momentum direction) in the inertial frame
pub fn orbit_normal(inclination: f64, raan: f64) -> Vector3<f64> {
    // ω only spins the orbit within its plane
    perifocal_rotation(inclination, raan, 0.0) * Vector3::z()
}

/// Rotation angle of the body's prime meridian at `elapsed` seconds, in [0, 2π)
///
/// `theta0` is the angle at the reference epoch in radians.
pub fn earth_rotation_angle(elapsed: f64, theta0: f64, rotation_rate: f64) -> f64 {
    normalize_angle(theta0 + rotation_rate * elapsed)
}

/// Inertial → body-fixed for a body rotated by `rotation_angle` radians
///
/// Positions that are already body-fixed pass through unchanged.
pub fn inertial_to_body_fixed(position: &Position, rotation_angle: f64) -> Position {
    match position.frame {
        Frame::BodyFixed => *position,
        _ => {
            let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), -rotation_angle);
            Position::body_fixed(rotation * position.vector)
        }
    }
}

/// Body-fixed → inertial for a body rotated by `rotation_angle` radians
pub fn body_fixed_to_inertial(position: &Position, rotation_angle: f64) -> Position {
    match position.frame {
        Frame::BodyFixed => {
            let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation_angle);
            Position::inertial(rotation * position.vector)
        }
        _ => *position,
    }
}

/// Latitude/longitude/altitude over a spherical body
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geodetic {
    /// Degrees, [-90, 90]
    pub latitude_deg: f64,
    /// Degrees, (-180, 180]
    pub longitude_deg: f64,
    /// Meters above the surface
    pub altitude_m: f64,
}

impl Geodetic {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Body-fixed position of this point
    pub fn to_body_fixed(&self, body_radius: f64) -> Position {
        let r = body_radius + self.altitude_m;
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        Position::body_fixed(Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        ))
    }

    /// Geodetic coordinates of a body-fixed position
    pub fn from_body_fixed(vector: &Vector3<f64>, body_radius: f64) -> Self {
        let r = vector.norm();
        let latitude = if r > 0.0 { (vector.z / r).clamp(-1.0, 1.0).asin() } else { 0.0 };
        Self {
            latitude_deg: latitude.to_degrees(),
            longitude_deg: vector.y.atan2(vector.x).to_degrees(),
            altitude_m: r - body_radius,
        }
    }
}

/// Render-space point in body radii, Y up
///
/// Frame Z (polar) becomes render Y and frame Y becomes render -Z, which
/// keeps the basis right-handed.
pub fn to_render_point(vector: &Vector3<f64>, body_radius: f64) -> Vec3 {
    let scale = 1.0 / body_radius;
    Vec3::new(
        (vector.x * scale) as f32,
        (vector.z * scale) as f32,
        (-vector.y * scale) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Confidence;
    use std::f64::consts::FRAC_PI_2;

    fn perifocal(vector: Vector3<f64>) -> PerifocalPosition {
        PerifocalPosition {
            vector,
            mean_anomaly: 0.0,
            eccentric_anomaly: 0.0,
            true_anomaly: 0.0,
            radius: vector.norm(),
            iterations: 0,
            confidence: Confidence::Nominal,
        }
    }

    #[test]
    fn test_identity_for_zero_angles() {
        let p = perifocal(Vector3::new(7.0e6, 1.0e6, 0.0));
        let inertial = to_inertial(&p, 0.0, 0.0, 0.0);
        assert!((inertial.vector - p.vector).norm() < 1e-6);
        assert_eq!(inertial.frame, Frame::Inertial);
    }

    #[test]
    fn test_rotation_order() {
        // Periapsis at the ascending node with Ω = 90°: lands on +y
        let p = perifocal(Vector3::new(1.0, 0.0, 0.0));
        let r = to_inertial(&p, 90.0, 90.0, 0.0);
        assert!((r.vector - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);

        // ω = 90° on a polar orbit with Ω = 0: periapsis over the north pole.
        // Applying Ω or i before ω would leave it on +y instead.
        let r = to_inertial(&p, 90.0, 0.0, 90.0);
        assert!((r.vector - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);

        let r = to_inertial(&p, 90.0, 90.0, 90.0);
        assert!((r.vector - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let p = perifocal(Vector3::new(3.0e6, -4.0e6, 0.0));
        let r = to_inertial(&p, 51.6, 123.0, 287.0);
        assert!((r.vector.norm() - 5.0e6).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_normal() {
        assert!((orbit_normal(0.0, 45.0) - Vector3::z()).norm() < 1e-12);

        // Polar orbit with Ω = 0: normal along -y
        let n = orbit_normal(90.0, 0.0);
        assert!((n - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-12);

        // Normal is perpendicular to every in-plane point
        let p = perifocal(Vector3::new(1.0, 2.0, 0.0));
        let r = to_inertial(&p, 33.0, 71.0, 12.0);
        assert!(r.vector.dot(&orbit_normal(33.0, 71.0)).abs() < 1e-12);
    }

    #[test]
    fn test_body_fixed_roundtrip() {
        let inertial = Position::inertial(Vector3::new(7.0e6, 0.0, 1.0e6));
        let fixed = inertial_to_body_fixed(&inertial, FRAC_PI_2);

        assert_eq!(fixed.frame, Frame::BodyFixed);
        assert!((fixed.vector - Vector3::new(0.0, -7.0e6, 1.0e6)).norm() < 1e-6);

        let back = body_fixed_to_inertial(&fixed, FRAC_PI_2);
        assert!((back.vector - inertial.vector).norm() < 1e-6);
        assert_eq!(inertial_to_body_fixed(&fixed, 1.0), fixed);
    }

    #[test]
    fn test_geodetic_roundtrip() {
        let radius = 6_378_137.0;
        let point = Geodetic::new(35.0, -120.0, 550_000.0);
        let fixed = point.to_body_fixed(radius);
        let back = Geodetic::from_body_fixed(&fixed.vector, radius);

        assert!((back.latitude_deg - 35.0).abs() < 1e-9);
        assert!((back.longitude_deg + 120.0).abs() < 1e-9);
        assert!((back.altitude_m - 550_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_axes() {
        let radius = 6_378_137.0;
        let v = to_render_point(&Vector3::new(radius, 2.0 * radius, 3.0 * radius), radius);
        assert!((v - Vec3::new(1.0, 3.0, -2.0)).length() < 1e-6);
    }
}
