//! Geostationary detection and fixed-position handling
//!
//! A geostationary satellite is station-kept against the rotating Earth, so a
//! static element set propagated in the inertial frame drifts away from where
//! it is drawn on a body-fixed globe. Element sets that pass the detector are
//! pinned to a longitude in the body-fixed frame instead of being propagated.

use serde::Serialize;

use super::frames::Geodetic;
use super::kepler::normalize_degrees;
use super::state::Position;
use crate::elements::OrbitalElements;
use crate::settings::{CentralBody, EngineSettings, GeostationaryWindow};

/// Which branch of the engine handles an element set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitClass {
    /// Two-body propagation in the inertial frame
    Keplerian,
    /// Longitude-locked position in the body-fixed frame
    GeostationaryFixed,
}

impl OrbitClass {
    pub fn of(elements: &OrbitalElements, settings: &EngineSettings) -> Self {
        if is_geostationary_with(elements, &settings.body, &settings.geostationary) {
            Self::GeostationaryFixed
        } else {
            Self::Keplerian
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::GeostationaryFixed)
    }
}

/// Geostationary test against Earth and the default thresholds
pub fn is_geostationary(elements: &OrbitalElements) -> bool {
    is_geostationary_with(
        elements,
        &CentralBody::earth(),
        &GeostationaryWindow::default(),
    )
}

/// Altitude window ∧ |inclination| < limit ∧ eccentricity < limit
pub fn is_geostationary_with(
    elements: &OrbitalElements,
    body: &CentralBody,
    window: &GeostationaryWindow,
) -> bool {
    let altitude_km = elements.altitude_km(body);
    (window.min_altitude_km..=window.max_altitude_km).contains(&altitude_km)
        && elements.inclination.abs() < window.max_inclination_deg
        && elements.eccentricity < window.max_eccentricity
}

/// Station longitude in (-180, 180] degrees
///
/// Taken from the mean longitude of the element set, so the satellite sits
/// where the elements place it at the reference epoch.
pub fn station_longitude(elements: &OrbitalElements) -> f64 {
    let lon = normalize_degrees(elements.mean_longitude());
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Fixed latitude/longitude/altitude of a geostationary satellite
pub fn station_geodetic(elements: &OrbitalElements, body: &CentralBody) -> Geodetic {
    Geodetic::new(0.0, station_longitude(elements), elements.altitude(body))
}

/// Body-fixed position of a geostationary satellite, independent of time
pub fn fixed_position(elements: &OrbitalElements, body: &CentralBody) -> Position {
    station_geodetic(elements, body).to_body_fixed(body.radius)
}
