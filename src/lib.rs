//! orbitcore - orbital mechanics core for satellite visualization
//!
//! Turns six Keplerian elements into positions at arbitrary times, samples
//! closed orbit paths, and answers "where is the object now" and "how long
//! until it reaches this point". Geostationary element sets are pinned to a
//! fixed longitude in the body-fixed frame so they render stationary.
//!
//! The engine holds no clock and no mutable state. Elapsed time is always
//! measured from a caller-owned [`ReferenceEpoch`], and every call is safe to
//! run concurrently.

pub mod analysis;
pub mod data;
pub mod elements;
pub mod error;
pub mod propagation;
pub mod settings;

pub use analysis::{nearest_point, time_to_reach, NearestPoint, TimeToReach};
pub use elements::{OrbitRegime, OrbitalElements};
pub use error::{Confidence, OrbitError, OrbitResult};
pub use propagation::{
    is_geostationary, sample_path, Frame, OrbitClass, OrbitPath, PathCache, Position, Propagator,
    ReferenceEpoch, StateEstimate,
};
pub use settings::EngineSettings;
