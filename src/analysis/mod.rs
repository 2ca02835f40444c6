//! Geometric queries against sampled orbits
//!
//! Both queries work on an [`OrbitPath`](crate::propagation::OrbitPath) at
//! query density. The `*_on_path` variants accept a path the caller already
//! holds (for example from a `PathCache`) instead of resampling.

mod nearest;
mod time_to_reach;

pub use nearest::{nearest_point, nearest_point_on_path, NearestPoint};
pub use time_to_reach::{time_to_reach, time_to_reach_on_path, TimeToReach};
