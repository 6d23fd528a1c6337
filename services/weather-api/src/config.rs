//! Station catalogue: stations, regions and fetch settings loaded from YAML.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use station_sources::{FetchConfig, StationConfig};
use weather_common::{RegionConfig, WeatherError, WeatherResult};

/// Catalogue file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub fetch: FetchConfig,
    pub stations: Vec<StationConfig>,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

/// Validated, read-only lookup of stations and regions.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    pub fetch: FetchConfig,
    stations: Vec<StationConfig>,
    regions: Vec<RegionConfig>,
    station_index: HashMap<String, usize>,
    region_index: HashMap<String, usize>,
}

impl StationCatalog {
    /// Load and validate a catalogue file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read station catalogue: {:?}", path))?;
        let catalog = Self::from_yaml(&content)
            .with_context(|| format!("Invalid station catalogue: {:?}", path))?;

        tracing::info!(
            stations = catalog.stations.len(),
            regions = catalog.regions.len(),
            path = %path.display(),
            "Loaded station catalogue"
        );
        Ok(catalog)
    }

    pub fn from_yaml(yaml: &str) -> WeatherResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| WeatherError::InvalidConfig(format!("YAML parse error: {}", e)))?;
        Self::from_file(file)
    }

    /// Index a parsed catalogue, rejecting duplicate ids, unknown station
    /// references and regions without exactly three stations.
    pub fn from_file(file: CatalogFile) -> WeatherResult<Self> {
        let mut station_index = HashMap::new();
        for (i, station) in file.stations.iter().enumerate() {
            if station_index.insert(station.id.clone(), i).is_some() {
                return Err(WeatherError::InvalidConfig(format!(
                    "duplicate station id '{}'",
                    station.id
                )));
            }
        }

        let mut region_index = HashMap::new();
        for (i, region) in file.regions.iter().enumerate() {
            region.validate()?;
            if region_index.insert(region.id.clone(), i).is_some() {
                return Err(WeatherError::InvalidConfig(format!(
                    "duplicate region id '{}'",
                    region.id
                )));
            }
            let mut seen = HashSet::new();
            for station in &region.stations {
                if !station_index.contains_key(station) {
                    return Err(WeatherError::InvalidConfig(format!(
                        "region '{}' references unknown station '{}'",
                        region.id, station
                    )));
                }
                if !seen.insert(station) {
                    return Err(WeatherError::InvalidConfig(format!(
                        "region '{}' lists station '{}' twice",
                        region.id, station
                    )));
                }
            }
        }

        for station in file.stations.iter().filter(|s| s.source.missing_credentials()) {
            tracing::warn!(
                station = %station.id,
                "Station has no auth token; set its token or token_env variable"
            );
        }

        Ok(Self {
            fetch: file.fetch,
            stations: file.stations,
            regions: file.regions,
            station_index,
            region_index,
        })
    }

    pub fn stations(&self) -> &[StationConfig] {
        &self.stations
    }

    pub fn regions(&self) -> &[RegionConfig] {
        &self.regions
    }

    pub fn station(&self, id: &str) -> WeatherResult<&StationConfig> {
        self.station_index
            .get(id)
            .map(|&i| &self.stations[i])
            .ok_or_else(|| WeatherError::UnknownStation(id.to_string()))
    }

    pub fn region(&self, id: &str) -> WeatherResult<&RegionConfig> {
        self.region_index
            .get(id)
            .map(|&i| &self.regions[i])
            .ok_or_else(|| WeatherError::UnknownRegion(id.to_string()))
    }

    /// Ids of token-authenticated stations with no usable token.
    pub fn stations_missing_credentials(&self) -> Vec<&str> {
        self.stations
            .iter()
            .filter(|s| s.source.missing_credentials())
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Display name of a station, falling back to its id.
    pub fn station_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.station(id).map(|s| s.name.as_str()).unwrap_or(id)
    }
}
