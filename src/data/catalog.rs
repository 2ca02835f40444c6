//! Satellite catalog records as supplied by the attribute service

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elements::OrbitalElements;
use crate::error::{OrbitError, OrbitResult};
use crate::settings::CentralBody;

/// Root structure of a catalog export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub generated_at: Option<String>,
    pub satellites: Vec<SatelliteRecord>,
}

/// One catalog entry
///
/// Records either carry full elements or only the summary orbit parameters
/// (apogee/perigee in km, inclination in degrees, period in minutes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteRecord {
    pub name: String,
    #[serde(default)]
    pub norad_id: Option<u32>,
    #[serde(default)]
    pub orbit_type: Option<String>,
    #[serde(default)]
    pub elements: Option<OrbitalElements>,
    #[serde(default)]
    pub apogee: Option<f64>,
    #[serde(default)]
    pub perigee: Option<f64>,
    #[serde(default)]
    pub inclination: Option<f64>,
    #[serde(default)]
    pub period: Option<f64>,
}

impl SatelliteRecord {
    /// Get display name (falls back to NORAD ID if the name is blank)
    pub fn display_name(&self) -> String {
        match (self.name.trim().is_empty(), self.norad_id) {
            (true, Some(id)) => format!("NORAD {}", id),
            _ => self.name.clone(),
        }
    }

    /// Element set for this record, if it carries enough orbit data
    ///
    /// Summary-only records place the node, periapsis and epoch anomaly at
    /// zero since the catalog does not list them.
    pub fn to_elements(&self, body: &CentralBody) -> OrbitResult<Option<OrbitalElements>> {
        if let Some(elements) = self.elements {
            elements.validate(body)?;
            return Ok(Some(elements));
        }

        let (Some(perigee_km), Some(apogee_km)) = (self.perigee, self.apogee) else {
            return Ok(None);
        };

        let mut elements = OrbitalElements::from_apsides(
            perigee_km * 1000.0,
            apogee_km * 1000.0,
            self.inclination.unwrap_or(0.0),
            0.0,
            0.0,
            0.0,
            body,
        )?;

        if let Some(minutes) = self.period {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(OrbitError::invalid(
                    "period",
                    format!("must be a positive number of minutes, got {}", minutes),
                ));
            }
            elements = elements.with_period(minutes * 60.0);
        }

        Ok(Some(elements))
    }
}

impl Catalog {
    /// Element sets keyed by display name
    ///
    /// Records without usable orbit data are logged and skipped.
    pub fn element_sets(&self, body: &CentralBody) -> HashMap<String, OrbitalElements> {
        let mut sets = HashMap::with_capacity(self.satellites.len());

        for record in &self.satellites {
            match record.to_elements(body) {
                Ok(Some(elements)) => {
                    sets.insert(record.display_name(), elements);
                }
                Ok(None) => log::debug!("{} has no orbit data", record.display_name()),
                Err(e) => log::warn!("Skipping {}: {}", record.display_name(), e),
            }
        }

        sets
    }
}
