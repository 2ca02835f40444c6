//! Caller-owned cache of sampled orbit paths
//!
//! Resampling at query density is the one costly operation in the engine.
//! Callers that query the same objects every frame can keep a `PathCache`
//! next to their engine; the engine itself never caches.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::orbit_track::{sample_path, OrbitPath};
use crate::elements::OrbitalElements;
use crate::error::OrbitResult;
use crate::settings::EngineSettings;

/// Bit-exact identity of an element set plus a sample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    bits: [u64; 6],
    period_bits: Option<u64>,
    samples: usize,
}

impl PathKey {
    pub fn new(elements: &OrbitalElements, samples: usize) -> Self {
        Self {
            bits: [
                elements.semi_major_axis.to_bits(),
                elements.eccentricity.to_bits(),
                elements.inclination.to_bits(),
                elements.right_ascension.to_bits(),
                elements.argument_of_periapsis.to_bits(),
                elements.mean_anomaly_at_epoch.to_bits(),
            ],
            period_bits: elements.orbit_period.map(f64::to_bits),
            samples,
        }
    }
}

/// Thread-safe map from element sets to sampled paths
///
/// Entries are only valid for the settings they were sampled with; use one
/// cache per engine configuration.
pub struct PathCache {
    paths: RwLock<HashMap<PathKey, Arc<OrbitPath>>>,
    capacity: usize,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` paths
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            paths: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, elements: &OrbitalElements, samples: usize) -> Option<Arc<OrbitPath>> {
        self.paths.read().get(&PathKey::new(elements, samples)).cloned()
    }

    /// Return the cached path or sample and store it
    pub fn get_or_sample(
        &self,
        elements: &OrbitalElements,
        samples: usize,
        settings: &EngineSettings,
    ) -> OrbitResult<Arc<OrbitPath>> {
        let key = PathKey::new(elements, samples);
        if let Some(path) = self.paths.read().get(&key) {
            log::trace!("Path cache hit ({} samples)", samples);
            return Ok(Arc::clone(path));
        }

        log::trace!("Path cache miss ({} samples)", samples);
        let path = Arc::new(sample_path(elements, samples, settings)?);

        let mut paths = self.paths.write();
        if paths.len() >= self.capacity && !paths.contains_key(&key) {
            // Evict an arbitrary entry
            if let Some(evict) = paths.keys().next().copied() {
                paths.remove(&evict);
            }
        }
        let entry = paths.entry(key).or_insert(path);
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }

    pub fn clear(&self) {
        self.paths.write().clear();
    }
}
