//! Engine facade: class dispatch, reference epoch and batch propagation

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use nalgebra::Vector3;

use super::frames::to_inertial;
use super::geostationary::{fixed_position, OrbitClass};
use super::kepler;
use super::orbit_track::{sample_path, OrbitPath};
use super::state::StateEstimate;
use crate::analysis::{self, NearestPoint, TimeToReach};
use crate::elements::OrbitalElements;
use crate::error::{Confidence, OrbitError, OrbitResult};
use crate::settings::EngineSettings;

/// Shared time origin for one update cycle
///
/// Set once by the caller and reused for every object so all tracked
/// satellites stay temporally synchronized. The engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEpoch {
    epoch: DateTime<Utc>,
}

impl ReferenceEpoch {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// Epoch at the current UTC time
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Seconds from the epoch to `instant` (negative before the epoch)
    pub fn elapsed_at(&self, instant: DateTime<Utc>) -> f64 {
        let delta = instant - self.epoch;
        match delta.num_microseconds() {
            Some(us) => us as f64 * 1e-6,
            None => delta.num_milliseconds() as f64 * 1e-3,
        }
    }

    /// Instant `elapsed` seconds after the epoch
    ///
    /// Fails for non-finite times and for instants chrono cannot represent.
    pub fn instant_at(&self, elapsed: f64) -> OrbitResult<DateTime<Utc>> {
        let out_of_range = || {
            OrbitError::InvalidQuery(format!(
                "elapsed time {} s is outside the representable range",
                elapsed
            ))
        };
        if !elapsed.is_finite() {
            return Err(OrbitError::InvalidQuery(format!(
                "elapsed time must be finite, got {}",
                elapsed
            )));
        }

        let micros = (elapsed * 1e6).round();
        if micros.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        self.epoch
            .checked_add_signed(TimeDelta::microseconds(micros as i64))
            .ok_or_else(out_of_range)
    }

    /// Format an instant relative to this epoch for display
    pub fn format_elapsed(&self, elapsed: f64) -> OrbitResult<String> {
        Ok(self
            .instant_at(elapsed)?
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string())
    }
}

/// Stateless orbit engine
///
/// Holds only immutable configuration, so one instance can be shared by
/// reference across threads.
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    settings: EngineSettings,
}

impl Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn classify(&self, elements: &OrbitalElements) -> OrbitClass {
        OrbitClass::of(elements, &self.settings)
    }

    pub fn is_geostationary(&self, elements: &OrbitalElements) -> bool {
        self.classify(elements).is_fixed()
    }

    /// Position of an object `elapsed` seconds after the reference epoch
    pub fn propagate(&self, elements: &OrbitalElements, elapsed: f64) -> OrbitResult<StateEstimate> {
        state_at(elements, elapsed, &self.settings)
    }

    /// Position of an object at an absolute instant
    pub fn propagate_at(
        &self,
        elements: &OrbitalElements,
        epoch: &ReferenceEpoch,
        instant: DateTime<Utc>,
    ) -> OrbitResult<StateEstimate> {
        self.propagate(elements, epoch.elapsed_at(instant))
    }

    /// Propagate every object to the same elapsed time
    ///
    /// Objects with invalid elements are logged and left out.
    pub fn propagate_all(
        &self,
        objects: &HashMap<String, OrbitalElements>,
        elapsed: f64,
    ) -> HashMap<String, StateEstimate> {
        let mut results = HashMap::with_capacity(objects.len());

        for (name, elements) in objects {
            match self.propagate(elements, elapsed) {
                Ok(state) => {
                    results.insert(name.clone(), state);
                }
                Err(e) => log::warn!("Skipping {}: {}", name, e),
            }
        }

        results
    }

    /// Path at an explicit density
    pub fn sample_path(&self, elements: &OrbitalElements, num_points: usize) -> OrbitResult<OrbitPath> {
        sample_path(elements, num_points, &self.settings)
    }

    /// Path at the configured render density
    pub fn render_path(&self, elements: &OrbitalElements) -> OrbitResult<OrbitPath> {
        self.sample_path(elements, self.settings.sampling.render_points)
    }

    /// Path at the configured query density
    pub fn query_path(&self, elements: &OrbitalElements) -> OrbitResult<OrbitPath> {
        self.sample_path(elements, self.settings.sampling.effective_query_points())
    }

    pub fn nearest_point(
        &self,
        query: &Vector3<f64>,
        elements: &OrbitalElements,
    ) -> OrbitResult<NearestPoint> {
        analysis::nearest_point(query, elements, &self.settings)
    }

    pub fn time_to_reach(
        &self,
        current_elapsed: f64,
        target: &Vector3<f64>,
        elements: &OrbitalElements,
    ) -> OrbitResult<TimeToReach> {
        analysis::time_to_reach(current_elapsed, target, elements, &self.settings)
    }
}

/// Class-dispatching propagation
///
/// Geostationary element sets get their fixed body-fixed position; all others
/// are propagated and rotated into the inertial frame.
pub fn state_at(
    elements: &OrbitalElements,
    elapsed: f64,
    settings: &EngineSettings,
) -> OrbitResult<StateEstimate> {
    elements.validate(&settings.body)?;
    if !elapsed.is_finite() {
        return Err(OrbitError::InvalidQuery(format!(
            "elapsed time must be finite, got {}",
            elapsed
        )));
    }

    let state = match OrbitClass::of(elements, settings) {
        OrbitClass::GeostationaryFixed => StateEstimate {
            position: fixed_position(elements, &settings.body),
            class: OrbitClass::GeostationaryFixed,
            confidence: Confidence::Nominal,
            iterations: 0,
        },
        OrbitClass::Keplerian => {
            let perifocal =
                kepler::propagate_validated(elements, elapsed, &settings.body, &settings.kepler);
            StateEstimate {
                position: to_inertial(
                    &perifocal,
                    elements.inclination,
                    elements.right_ascension,
                    elements.argument_of_periapsis,
                ),
                class: OrbitClass::Keplerian,
                confidence: perifocal.confidence,
                iterations: perifocal.iterations,
            }
        }
    };

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::state::Frame;
    use crate::settings::KeplerSettings;
    use chrono::TimeZone;

    fn epoch() -> ReferenceEpoch {
        ReferenceEpoch::new(Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_reference_epoch_elapsed() {
        let epoch = epoch();
        let later = Utc.with_ymd_and_hms(2026, 1, 29, 13, 30, 0).unwrap();
        assert!((epoch.elapsed_at(later) - 5400.0).abs() < 1e-9);
        assert!((epoch.elapsed_at(epoch.epoch()) - 0.0).abs() < 1e-12);

        let earlier = Utc.with_ymd_and_hms(2026, 1, 29, 11, 59, 0).unwrap();
        assert!((epoch.elapsed_at(earlier) + 60.0).abs() < 1e-9);

        assert_eq!(epoch.instant_at(5400.0).unwrap(), later);
        assert_eq!(epoch.format_elapsed(60.0).unwrap(), "2026-01-29 12:01:00 UTC");
    }

    #[test]
    fn test_reference_epoch_rejects_unrepresentable_times() {
        let epoch = epoch();
        for elapsed in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                epoch.instant_at(elapsed),
                Err(OrbitError::InvalidQuery(_))
            ));
        }

        // Finite, but past what chrono can represent
        assert!(epoch.instant_at(1.0e13).is_err());
        assert!(epoch.format_elapsed(1.0e13).is_err());
        assert!(epoch.instant_at(-1.0e13).is_err());
        // Past i64 microseconds
        assert!(epoch.instant_at(1.0e300).is_err());
    }

    #[test]
    fn test_non_convergence_reaches_state_estimate() {
        let mut settings = EngineSettings::default();
        settings.kepler = KeplerSettings {
            tolerance: 1e-15,
            max_iterations: 1,
        };
        let engine = Propagator::with_settings(settings);
        let elements = OrbitalElements::new(20_000_000.0, 0.9, 30.0, 0.0, 0.0, 10.0);

        let state = engine.propagate(&elements, 0.0).unwrap();
        assert_eq!(state.class, OrbitClass::Keplerian);
        assert_eq!(state.confidence, Confidence::Low);
        assert_eq!(state.iterations, 1);
        assert!(state.position.vector.iter().all(|c| c.is_finite()));

        // Default budget converges on the same orbit
        let nominal = Propagator::new().propagate(&elements, 0.0).unwrap();
        assert_eq!(nominal.confidence, Confidence::Nominal);
    }

    #[test]
    fn test_keplerian_state() {
        let engine = Propagator::new();
        let elements = OrbitalElements::new(6_978_137.0, 0.0, 51.6, 0.0, 0.0, 0.0);
        let state = engine.propagate(&elements, 0.0).unwrap();

        assert_eq!(state.class, OrbitClass::Keplerian);
        assert_eq!(state.position.frame, Frame::Inertial);
        assert_eq!(state.confidence, Confidence::Nominal);
        // Periapsis on the ascending node with Ω = 0 lies on +x
        assert!((state.position.vector - Vector3::new(6_978_137.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_geostationary_state_does_not_move() {
        let engine = Propagator::new();
        let elements = OrbitalElements::new(42_164_000.0, 0.0001, 0.02, 100.0, 0.0, 20.0);

        let a = engine.propagate(&elements, 0.0).unwrap();
        let b = engine.propagate(&elements, 43_200.0).unwrap();

        assert_eq!(a.class, OrbitClass::GeostationaryFixed);
        assert_eq!(a.position.frame, Frame::BodyFixed);
        assert_eq!(a.iterations, 0);
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn test_state_and_path_agree_on_class() {
        let engine = Propagator::new();
        for elements in [
            OrbitalElements::new(42_164_000.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            OrbitalElements::new(6_978_137.0, 0.0, 51.6, 0.0, 0.0, 0.0),
        ] {
            let state = engine.propagate(&elements, 0.0).unwrap();
            let path = engine.render_path(&elements).unwrap();
            assert_eq!(state.class, path.class());
            assert_eq!(state.position.frame, path.frame());
            // The satellite sits on its own path at the epoch
            assert!((state.position.vector - path.points()[0]).norm() < 1e-6);
        }
    }

    #[test]
    fn test_propagate_at_matches_elapsed() {
        let engine = Propagator::new();
        let elements = OrbitalElements::new(7_000_000.0, 0.01, 98.0, 10.0, 20.0, 30.0);
        let epoch = epoch();
        let instant = Utc.with_ymd_and_hms(2026, 1, 29, 12, 10, 0).unwrap();

        let a = engine.propagate_at(&elements, &epoch, instant).unwrap();
        let b = engine.propagate(&elements, 600.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_propagate_all_skips_invalid() {
        let engine = Propagator::new();
        let mut objects = HashMap::new();
        objects.insert(
            "ISS".to_string(),
            OrbitalElements::new(6_798_000.0, 0.0005, 51.6, 0.0, 0.0, 0.0),
        );
        objects.insert(
            "GOES".to_string(),
            OrbitalElements::new(42_164_000.0, 0.0, 0.05, 0.0, 0.0, 285.0),
        );
        objects.insert(
            "broken".to_string(),
            OrbitalElements::new(7_000_000.0, 1.1, 0.0, 0.0, 0.0, 0.0),
        );

        let states = engine.propagate_all(&objects, 120.0);
        assert_eq!(states.len(), 2);
        assert_eq!(states["GOES"].class, OrbitClass::GeostationaryFixed);
        assert_eq!(states["ISS"].class, OrbitClass::Keplerian);
        assert!(!states.contains_key("broken"));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Propagator>();
    }
}
