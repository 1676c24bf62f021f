//! Configuration models and loaders for the Space Logistics workspace.
//!
//! Body catalogs and planner settings are authored in kilometres and degrees; conversion
//! to SI happens when the catalog is resolved, not here.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Celestial body entry in a catalog file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub mass_kg: f64,
    pub radius_km: f64,
    pub soi_radius_km: f64,
    #[serde(default)]
    pub atmosphere: bool,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

/// Orbital elements of a body about its parent. Mean motion is derived, not configured.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    pub semi_major_axis_km: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub longitude_of_ascending_node_deg: f64,
    #[serde(default)]
    pub argument_of_periapsis_deg: f64,
    #[serde(default)]
    pub mean_anomaly_at_epoch_deg: f64,
    #[serde(default)]
    pub epoch_s: f64,
}

impl BodyConfig {
    /// Structural checks that do not need the rest of the catalog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("body name is empty".into()));
        }
        if !(self.mass_kg > 0.0 && self.radius_km > 0.0) {
            return Err(invalid("mass and radius must be positive".into()));
        }
        if !(self.soi_radius_km > self.radius_km) {
            return Err(invalid(format!(
                "SOI radius {} km must exceed body radius {} km",
                self.soi_radius_km, self.radius_km
            )));
        }
        match (&self.parent, &self.orbit) {
            (Some(_), None) => Err(invalid("parent given without orbital elements".into())),
            (None, Some(_)) => Err(invalid("orbital elements given without a parent".into())),
            (Some(_), Some(orbit)) if !(orbit.semi_major_axis_km > 0.0) => {
                Err(invalid("semi-major axis must be positive".into()))
            }
            (Some(_), Some(orbit)) if !(orbit.eccentricity >= 0.0) => {
                Err(invalid("eccentricity must be non-negative".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Capture direction as written in planner files.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSenseSetting {
    #[default]
    Prograde,
    Retrograde,
}

/// Mission planner tuning. Every field has a default so partial files are accepted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub parking_altitude_km: f64,
    pub capture_altitude_km: f64,
    /// Coast in the parking orbit before the injection burn.
    pub parking_wait_s: f64,
    /// Length of the terminal capture orbit segment.
    pub capture_duration_s: f64,
    pub apogee_search_iterations: usize,
    pub apogee_search_tolerance_m: f64,
    pub capture_sense: CaptureSenseSetting,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            parking_altitude_km: 200.0,
            capture_altitude_km: 500.0,
            parking_wait_s: 600.0,
            capture_duration_s: 7.0 * 86_400.0,
            apogee_search_iterations: 30,
            apogee_search_tolerance_m: 100.0,
            capture_sense: CaptureSenseSetting::Prograde,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name: "planner".into(),
            reason: reason.into(),
        };
        if !(self.parking_altitude_km >= 0.0 && self.capture_altitude_km >= 0.0) {
            return Err(invalid("altitudes must be non-negative"));
        }
        if !(self.parking_wait_s >= 0.0 && self.capture_duration_s >= 0.0) {
            return Err(invalid("durations must be non-negative"));
        }
        if self.apogee_search_iterations == 0 || !(self.apogee_search_tolerance_m > 0.0) {
            return Err(invalid("apogee search needs iterations and a positive tolerance"));
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Load body configurations from a YAML list, a single TOML file, or a directory of
/// TOML files (one body per file, read in file-name order).
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    let bodies: Vec<BodyConfig> = load_records(path)?;
    for body in &bodies {
        body.validate()?;
    }
    Ok(bodies)
}

/// Load planner settings from a TOML or YAML file.
pub fn load_planner<P: AsRef<Path>>(path: P) -> Result<PlannerConfig, ConfigError> {
    let path = path.as_ref();
    let planner: PlannerConfig = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    planner.validate()?;
    Ok(planner)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
