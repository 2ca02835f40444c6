//! Classical orbital elements
//!
//! Distances are in meters and angles in degrees, matching the element sets
//! supplied by the satellite catalog. Conversion to radians happens inside
//! the propagator.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};
use crate::propagation::{is_geostationary_with, normalize_degrees};
use crate::settings::{CentralBody, EngineSettings};

/// Upper altitude bound of low Earth orbit (km)
const LEO_CEILING_KM: f64 = 2_000.0;

/// Eccentricity at and above which an orbit counts as highly elliptical
const HIGHLY_ELLIPTICAL_ECCENTRICITY: f64 = 0.25;

/// Six Keplerian elements plus an optional supplied period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitalElements {
    /// Semi-major axis in meters
    pub semi_major_axis: f64,
    /// Eccentricity, in [0, 1)
    pub eccentricity: f64,
    /// Inclination in degrees
    pub inclination: f64,
    /// Right ascension of the ascending node in degrees
    #[serde(alias = "raan")]
    pub right_ascension: f64,
    /// Argument of periapsis in degrees
    pub argument_of_periapsis: f64,
    /// Mean anomaly at the reference epoch in degrees
    #[serde(default)]
    pub mean_anomaly_at_epoch: f64,
    /// Orbital period in seconds; derived from the semi-major axis when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_period: Option<f64>,
}

impl OrbitalElements {
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        right_ascension: f64,
        argument_of_periapsis: f64,
        mean_anomaly_at_epoch: f64,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination,
            right_ascension,
            argument_of_periapsis,
            mean_anomaly_at_epoch,
            orbit_period: None,
        }
    }

    /// Attach a period supplied by the data source
    pub fn with_period(mut self, seconds: f64) -> Self {
        self.orbit_period = Some(seconds);
        self
    }

    /// Build elements from perigee/apogee altitudes, as catalog records list them
    ///
    /// Altitudes are in meters above the body's surface.
    #[allow(clippy::too_many_arguments)]
    pub fn from_apsides(
        perigee_altitude: f64,
        apogee_altitude: f64,
        inclination: f64,
        right_ascension: f64,
        argument_of_periapsis: f64,
        mean_anomaly_at_epoch: f64,
        body: &CentralBody,
    ) -> OrbitResult<Self> {
        if !perigee_altitude.is_finite() || !apogee_altitude.is_finite() {
            return Err(OrbitError::invalid("apsides", "altitudes must be finite"));
        }
        if apogee_altitude < perigee_altitude {
            return Err(OrbitError::invalid(
                "apsides",
                format!(
                    "apogee {:.0} m is below perigee {:.0} m",
                    apogee_altitude, perigee_altitude
                ),
            ));
        }

        let rp = body.radius + perigee_altitude;
        let ra = body.radius + apogee_altitude;
        if rp <= 0.0 {
            return Err(OrbitError::invalid(
                "apsides",
                "perigee radius must be positive",
            ));
        }

        let elements = Self::new(
            0.5 * (rp + ra),
            (ra - rp) / (ra + rp),
            inclination,
            right_ascension,
            argument_of_periapsis,
            mean_anomaly_at_epoch,
        );
        elements.validate(body)?;
        Ok(elements)
    }

    /// Reject element sets no solver should see
    pub fn validate(&self, body: &CentralBody) -> OrbitResult<()> {
        let angles = [
            ("inclination", self.inclination),
            ("rightAscension", self.right_ascension),
            ("argumentOfPeriapsis", self.argument_of_periapsis),
            ("meanAnomalyAtEpoch", self.mean_anomaly_at_epoch),
        ];
        for (field, value) in angles {
            if !value.is_finite() {
                return Err(OrbitError::invalid(field, format!("must be finite, got {}", value)));
            }
        }

        let a = self.semi_major_axis;
        if !a.is_finite() || a <= 0.0 {
            return Err(OrbitError::invalid(
                "semiMajorAxis",
                format!("must be a positive finite distance, got {}", a),
            ));
        }
        if a <= body.radius {
            return Err(OrbitError::invalid(
                "semiMajorAxis",
                format!("{:.0} m does not exceed body radius {:.0} m", a, body.radius),
            ));
        }

        let e = self.eccentricity;
        if !e.is_finite() || !(0.0..1.0).contains(&e) {
            return Err(OrbitError::invalid(
                "eccentricity",
                format!("must be in [0, 1), got {}", e),
            ));
        }

        if let Some(period) = self.orbit_period {
            if !period.is_finite() || period <= 0.0 {
                return Err(OrbitError::invalid(
                    "orbitPeriod",
                    format!("must be a positive finite duration, got {}", period),
                ));
            }
        }

        Ok(())
    }

    /// Mean motion in rad/s
    pub fn mean_motion(&self, mu: f64) -> f64 {
        match self.orbit_period {
            Some(period) => TAU / period,
            None => (mu / self.semi_major_axis.powi(3)).sqrt(),
        }
    }

    /// Orbital period in seconds
    pub fn period(&self, mu: f64) -> f64 {
        self.orbit_period
            .unwrap_or_else(|| TAU * (self.semi_major_axis.powi(3) / mu).sqrt())
    }

    /// Altitude of the semi-major axis above the body surface (meters)
    pub fn altitude(&self, body: &CentralBody) -> f64 {
        self.semi_major_axis - body.radius
    }

    pub fn altitude_km(&self, body: &CentralBody) -> f64 {
        self.altitude(body) / 1000.0
    }

    pub fn perigee_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    pub fn apogee_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Perigee and apogee altitudes in meters
    pub fn apsis_altitudes(&self, body: &CentralBody) -> (f64, f64) {
        (
            self.perigee_radius() - body.radius,
            self.apogee_radius() - body.radius,
        )
    }

    /// p = a(1 − e²)
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Ω + ω + M₀ in [0, 360) degrees
    pub fn mean_longitude(&self) -> f64 {
        normalize_degrees(
            self.right_ascension + self.argument_of_periapsis + self.mean_anomaly_at_epoch,
        )
    }

    /// Broad orbit class used for display and filtering
    pub fn regime(&self, settings: &EngineSettings) -> OrbitRegime {
        OrbitRegime::classify(self, settings)
    }
}

/// Coarse orbit regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrbitRegime {
    /// Below 2 000 km
    Leo,
    /// Between LEO and the geosynchronous altitude window
    Meo,
    /// In the geosynchronous window but inclined or eccentric
    Geosynchronous,
    /// Passes the geostationary detector
    Geostationary,
    /// Eccentricity of 0.25 or more
    HighlyElliptical,
    /// Above the geosynchronous window
    High,
}

impl OrbitRegime {
    pub fn classify(elements: &OrbitalElements, settings: &EngineSettings) -> Self {
        let window = &settings.geostationary;
        if is_geostationary_with(elements, &settings.body, window) {
            return Self::Geostationary;
        }
        if elements.eccentricity >= HIGHLY_ELLIPTICAL_ECCENTRICITY {
            return Self::HighlyElliptical;
        }

        let altitude_km = elements.altitude_km(&settings.body);
        if altitude_km < LEO_CEILING_KM {
            Self::Leo
        } else if altitude_km < window.min_altitude_km {
            Self::Meo
        } else if altitude_km <= window.max_altitude_km {
            Self::Geosynchronous
        } else {
            Self::High
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Leo => "LEO",
            Self::Meo => "MEO",
            Self::Geosynchronous => "GSO",
            Self::Geostationary => "GEO",
            Self::HighlyElliptical => "HEO",
            Self::High => "High Earth orbit",
        }
    }
}
