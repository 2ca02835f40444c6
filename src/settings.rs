//! Engine configuration
//!
//! All settings deserialize from JSON with every field optional, so a
//! settings file only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

use crate::propagation::{EARTH_RADIUS_M, MU_EARTH, OMEGA_EARTH};

/// Physical constants of the orbited body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralBody {
    /// Gravitational parameter (GM) in m³/s²
    pub mu: f64,
    /// Equatorial radius in meters
    pub radius: f64,
    /// Sidereal rotation rate in rad/s
    pub rotation_rate: f64,
}

impl Default for CentralBody {
    fn default() -> Self {
        Self::earth()
    }
}

impl CentralBody {
    /// WGS-84 Earth
    pub fn earth() -> Self {
        Self {
            mu: MU_EARTH,
            radius: EARTH_RADIUS_M,
            rotation_rate: OMEGA_EARTH,
        }
    }
}

/// Newton-Raphson controls for Kepler's equation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerSettings {
    /// Stop once |ΔE| drops to this value (radians)
    pub tolerance: f64,
    /// Iteration budget before the result is flagged low-confidence
    pub max_iterations: u32,
}

impl Default for KeplerSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 100,
        }
    }
}

/// Thresholds that classify an element set as geostationary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeostationaryWindow {
    /// Lowest qualifying altitude of the semi-major axis (km)
    pub min_altitude_km: f64,
    /// Highest qualifying altitude of the semi-major axis (km)
    pub max_altitude_km: f64,
    /// Inclination must be strictly below this (degrees)
    pub max_inclination_deg: f64,
    /// Eccentricity must be strictly below this
    pub max_eccentricity: f64,
}

impl Default for GeostationaryWindow {
    fn default() -> Self {
        Self {
            min_altitude_km: 35_000.0,
            max_altitude_km: 36_500.0,
            max_inclination_deg: 5.0,
            max_eccentricity: 0.01,
        }
    }
}

/// Path sampling densities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Points per orbit for rendering
    pub render_points: usize,
    /// Points per orbit for geometric queries (never fewer than 720)
    pub query_points: usize,
}

/// Lowest sample density used for nearest-point and time-to-reach queries
pub const MIN_QUERY_POINTS: usize = 720;

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            render_points: 360,
            query_points: MIN_QUERY_POINTS,
        }
    }
}

impl SamplingSettings {
    /// Query density with the floor applied
    pub fn effective_query_points(&self) -> usize {
        self.query_points.max(MIN_QUERY_POINTS)
    }
}

/// How an angular separation along the orbit becomes a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachMethod {
    /// Plane angle divided by mean motion
    #[default]
    AngularRate,
    /// Mean-anomaly difference divided by mean motion (exact for eccentric orbits)
    TimeOfFlight,
}

/// Geometric query controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Distance from the sampled orbit beyond which a query point is off-orbit (m)
    pub off_orbit_tolerance: f64,
    pub reach_method: ReachMethod,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            off_orbit_tolerance: 50_000.0,
            reach_method: ReachMethod::AngularRate,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub body: CentralBody,
    pub kepler: KeplerSettings,
    pub geostationary: GeostationaryWindow,
    pub sampling: SamplingSettings,
    pub query: QuerySettings,
}

impl EngineSettings {
    /// Interactive settings (coarser solver, minimum query density)
    pub fn fast() -> Self {
        Self {
            kepler: KeplerSettings {
                tolerance: 1e-6,
                max_iterations: 30,
            },
            sampling: SamplingSettings {
                render_points: 180,
                query_points: MIN_QUERY_POINTS,
            },
            ..Default::default()
        }
    }

    /// Sub-kilometer query precision
    pub fn high_precision() -> Self {
        Self {
            kepler: KeplerSettings {
                tolerance: 1e-12,
                max_iterations: 100,
            },
            sampling: SamplingSettings {
                render_points: 720,
                query_points: 2880,
            },
            query: QuerySettings {
                off_orbit_tolerance: 10_000.0,
                reach_method: ReachMethod::TimeOfFlight,
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = EngineSettings::default();
        assert_eq!(settings.kepler.max_iterations, 100);
        assert_eq!(settings.kepler.tolerance, 1e-8);
        assert_eq!(settings.sampling.render_points, 360);
        assert_eq!(settings.sampling.query_points, 720);
        assert_eq!(settings.geostationary.max_inclination_deg, 5.0);
        assert_eq!(settings.body.radius, 6_378_137.0);
    }

    #[test]
    fn test_query_floor() {
        let sampling = SamplingSettings {
            render_points: 90,
            query_points: 100,
        };
        assert_eq!(sampling.effective_query_points(), MIN_QUERY_POINTS);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "kepler": { "max_iterations": 12 }, "query": { "reach_method": "time_of_flight" } }"#;
        let settings: EngineSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.kepler.max_iterations, 12);
        assert_eq!(settings.kepler.tolerance, 1e-8);
        assert_eq!(settings.query.reach_method, ReachMethod::TimeOfFlight);
        assert_eq!(settings.query.off_orbit_tolerance, 50_000.0);
        assert_eq!(settings.body, CentralBody::earth());
    }
}
