use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::constants::MAX_CITY_RESULTS;

const EMBEDDED_CITIES: &str = include_str!("../data/cities.json");

/// A birthplace with geographic coordinates in degrees (east and north positive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Read-only city lookup table, cheap to clone into handlers.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    cities: Arc<Vec<City>>,
}

impl CityDirectory {
    /// The directory bundled with the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CITIES).context("Embedded city list is malformed")
    }

    /// Loads a JSON array of `{name, lat, lon}` records from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read city list {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid city list {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let cities: Vec<City> = serde_json::from_str(raw)?;
        Self::new(cities)
    }

    pub fn new(cities: Vec<City>) -> Result<Self> {
        for city in &cities {
            if city.name.trim().is_empty() {
                anyhow::bail!("City with empty name");
            }
            if !(-90.0..=90.0).contains(&city.lat) || !(-180.0..=180.0).contains(&city.lon) {
                anyhow::bail!(
                    "City {} has coordinates out of range: {}, {}",
                    city.name,
                    city.lat,
                    city.lon
                );
            }
        }
        Ok(Self {
            cities: Arc::new(cities),
        })
    }

    /// Case-insensitive substring search, at most 50 results in directory order.
    /// An empty query lists the first 50 cities.
    pub fn search(&self, query: &str) -> Vec<City> {
        let needle = query.trim().to_lowercase();
        self.cities
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .take(MAX_CITY_RESULTS)
            .cloned()
            .collect()
    }

    /// Exact name match, falling back to a case-insensitive one.
    pub fn find(&self, name: &str) -> Option<&City> {
        let name = name.trim();
        self.cities.iter().find(|city| city.name == name).or_else(|| {
            let lowered = name.to_lowercase();
            self.cities
                .iter()
                .find(|city| city.name.to_lowercase() == lowered)
        })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
