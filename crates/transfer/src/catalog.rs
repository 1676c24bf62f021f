//! Shared read-only body handles resolved from configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::info;
use logistics_config::{BodyConfig, ConfigError, load_bodies};
use logistics_core::constants::G;
use logistics_core::units::km_to_m;
use logistics_orbits::{Body, OrbitError, OrbitParameters};
use thiserror::Error;

/// Errors surfaced when building or querying a body catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to load body configs: {0}")]
    Config(#[from] ConfigError),
    #[error("body '{0}' not found in catalog")]
    UnknownBody(String),
    #[error("body '{0}' is defined more than once")]
    DuplicateBody(String),
    #[error("body '{body}' orbits unknown parent '{parent}'")]
    MissingParent { body: String, parent: String },
    #[error("orbit of '{body}' is invalid: {source}")]
    Orbit {
        body: String,
        #[source]
        source: OrbitError,
    },
}

/// Bodies keyed by upper-case name.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    bodies: BTreeMap<String, Arc<Body>>,
}

impl BodyCatalog {
    /// Load configs from `path` (see [`load_bodies`]) and resolve them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let configs = load_bodies(path)?;
        let catalog = Self::from_configs(&configs)?;
        info!("loaded {} bodies from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Convert configs to SI bodies, deriving each orbit's mean motion from its parent.
    pub fn from_configs(configs: &[BodyConfig]) -> Result<Self, CatalogError> {
        let mut by_name: BTreeMap<String, &BodyConfig> = BTreeMap::new();
        for config in configs {
            let key = config.name.to_uppercase();
            if by_name.insert(key, config).is_some() {
                return Err(CatalogError::DuplicateBody(config.name.clone()));
            }
        }

        let mut bodies = BTreeMap::new();
        for (key, config) in &by_name {
            let mut body = Body::new(
                key.clone(),
                config.mass_kg,
                km_to_m(config.radius_km),
                km_to_m(config.soi_radius_km),
            )
            .with_atmosphere(config.atmosphere);

            if let (Some(parent), Some(orbit)) = (&config.parent, &config.orbit) {
                let parent_key = parent.to_uppercase();
                let parent_config =
                    by_name
                        .get(&parent_key)
                        .ok_or_else(|| CatalogError::MissingParent {
                            body: config.name.clone(),
                            parent: parent.clone(),
                        })?;
                let mu = G * parent_config.mass_kg;
                let params = OrbitParameters::planar(
                    mu,
                    km_to_m(orbit.semi_major_axis_km),
                    orbit.eccentricity,
                    orbit.argument_of_periapsis_deg.to_radians(),
                    orbit.mean_anomaly_at_epoch_deg.to_radians(),
                )
                .map(|p| {
                    p.with_orientation(
                        orbit.inclination_deg.to_radians(),
                        orbit.longitude_of_ascending_node_deg.to_radians(),
                    )
                })
                .map_err(|source| CatalogError::Orbit {
                    body: config.name.clone(),
                    source,
                })?;
                body = body.with_orbit(parent_key, params, orbit.epoch_s);
            }
            bodies.insert(key.clone(), Arc::new(body));
        }
        Ok(Self { bodies })
    }

    pub fn insert(&mut self, body: Body) -> Arc<Body> {
        let handle = Arc::new(body);
        self.bodies
            .insert(handle.name.to_uppercase(), Arc::clone(&handle));
        handle
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Result<Arc<Body>, CatalogError> {
        self.bodies
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| CatalogError::UnknownBody(name.to_string()))
    }

    /// Parent handle of `body`, `None` for roots.
    pub fn parent_of(&self, body: &Body) -> Result<Option<Arc<Body>>, CatalogError> {
        body.parent.as_deref().map(|parent| self.get(parent)).transpose()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Body>> {
        self.bodies.values()
    }
}
