//! Loading element sets, catalogs and settings from JSON files
//!
//! Files ending in `.gz` are decompressed transparently.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use super::Catalog;
use crate::elements::OrbitalElements;
use crate::settings::EngineSettings;

fn open_json(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(file);

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let reader = open_json(path)?;
    serde_json::from_reader(reader).with_context(|| format!("Failed to parse {} from {:?}", what, path))
}

/// Load a JSON map of object name → orbital elements
pub fn load_element_sets(path: impl AsRef<Path>) -> Result<HashMap<String, OrbitalElements>> {
    let path = path.as_ref();
    log::info!("Loading element sets from {:?}", path);

    let sets: HashMap<String, OrbitalElements> = read_json(path, "element sets")?;

    log::info!("Loaded {} element sets", sets.len());
    Ok(sets)
}

/// Load a satellite catalog export
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    log::info!("Loading satellite catalog from {:?}", path);

    let catalog: Catalog = read_json(path, "satellite catalog")?;

    log::info!(
        "Loaded {} catalog records (generated at {})",
        catalog.satellites.len(),
        catalog.generated_at.as_deref().unwrap_or("unknown")
    );
    Ok(catalog)
}

/// Load engine settings; missing fields keep their defaults
pub fn load_settings(path: impl AsRef<Path>) -> Result<EngineSettings> {
    let path = path.as_ref();
    log::info!("Loading engine settings from {:?}", path);
    read_json(path, "engine settings")
}
