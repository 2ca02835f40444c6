//! Orbital propagation module
//!
//! Everything here is a pure function of its inputs: element sets, elapsed
//! seconds since a caller-supplied reference epoch and engine settings.
//!
//! ## Kepler propagation
//!
//! `kepler` solves the two-body time-of-flight problem in the orbital plane and
//! `frames` rotates the result into the inertial frame (argument of periapsis,
//! then inclination, then RAAN).
//!
//! ## Geostationary objects
//!
//! `geostationary` pins near-equatorial, near-circular GEO element sets to a
//! fixed longitude in the body-fixed frame. The `propagator` facade and the
//! `orbit_track` sampler both dispatch on [`OrbitClass`], so a drawn satellite
//! always sits on its drawn orbit.
//!
//! # Example
//!
//! ```ignore
//! use orbitcore::propagation::Propagator;
//! use orbitcore::OrbitalElements;
//!
//! let engine = Propagator::new();
//! let iss = OrbitalElements::new(6_798_000.0, 0.0005, 51.6, 120.0, 90.0, 0.0);
//!
//! let state = engine.propagate(&iss, 600.0)?;
//! let path = engine.render_path(&iss)?;
//! ```

pub mod frames;
pub mod geostationary;
pub mod kepler;
mod orbit_track;
mod path_cache;
mod propagator;
mod state;

pub use frames::{
    body_fixed_to_inertial, earth_rotation_angle, inertial_to_body_fixed, orbit_normal,
    perifocal_rotation, to_inertial, to_render_point, Geodetic,
};
pub use geostationary::{
    fixed_position, is_geostationary, is_geostationary_with, station_geodetic, OrbitClass,
};
pub use kepler::{normalize_angle, normalize_degrees, propagate, solve_kepler, KeplerSolution};
pub use orbit_track::*;
pub use path_cache::*;
pub use propagator::*;
pub use state::*;
