//! Tunable AI parameters.
//!
//! Every field has a default, so a config file only needs to name the
//! values it changes:
//!
//! ```ron
//! (
//!     reclaim: (search_radius: 800.0),
//!     debug: true,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Complete AI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Reclaim target selection.
    pub reclaim: ReclaimConfig,
    /// Constructor behaviour.
    pub constructors: ConstructorConfig,
    /// Factory behaviour.
    pub factories: FactoryConfig,
    /// Combat unit behaviour.
    pub tanks: TankConfig,
    /// Draw debug markers and log extra detail.
    pub debug: bool,
    /// Draw a marker at each constructor build site.
    pub show_next_build_site: bool,
    /// Seed for the nudge and unit choice RNGs.
    pub seed: u64,
    /// Re-check idle builders every this many frames; 0 disables.
    pub idle_sweep_frames: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            reclaim: ReclaimConfig::default(),
            constructors: ConstructorConfig::default(),
            factories: FactoryConfig::default(),
            tanks: TankConfig::default(),
            debug: false,
            show_next_build_site: false,
            seed: 0,
            idle_sweep_frames: 900,
        }
    }
}

impl AiConfig {
    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: AiConfig = ron::from_str(ron)?;
        Ok(config)
    }
}

/// Reclaim target selection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// Radius around the constructor searched for features.
    pub search_radius: f64,
    /// How far a constructor should travel for one hundred metal.
    ///
    /// Sets the minimum metal/distance score: `1 / (100 * this)`.
    pub radius_per_hundred_metal: f64,
    /// Radius of the area reclaim order issued at the target.
    pub order_radius: f64,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            search_radius: 500.0,
            radius_per_hundred_metal: 150.0,
            order_radius: 10.0,
        }
    }
}

impl ReclaimConfig {
    /// Score a target must exceed to be worth the trip.
    #[must_use]
    pub fn min_score(&self) -> f64 {
        1.0 / (100.0 * self.radius_per_hundred_metal)
    }
}

/// Constructor controller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructorConfig {
    /// Constructors to keep requesting from factories.
    pub optimal_count: usize,
    /// Maximum nudge offset on each ground axis.
    pub nudge_size: i32,
    /// Minimum frames between two nudges.
    pub nudge_cooldown_frames: u64,
    /// Build energy when energy stock is below this percentage.
    pub low_energy_percent: f64,
    /// Gather metal when metal stock is below this percentage.
    pub low_metal_percent: f64,
    /// Search radius passed to the host build-site query.
    pub build_site_search_radius: f64,
    /// Minimum spacing passed to the host build-site query.
    pub build_site_min_distance: f64,
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            optimal_count: 2,
            nudge_size: 50,
            nudge_cooldown_frames: 10,
            low_energy_percent: 10.0,
            low_metal_percent: 50.0,
            build_site_search_radius: 1400.0,
            build_site_min_distance: 2.0,
        }
    }
}

/// Factory controller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Factories to keep requesting from constructors.
    pub optimal_count: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self { optimal_count: 1 }
    }
}

/// Tank controller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Tanks to gather before attacking; below this requests are urgent.
    pub min_tanks_for_attack: usize,
    /// Re-plan the pack every this many frames; 0 disables.
    pub think_frames: u64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            min_tanks_for_attack: 5,
            think_frames: 30,
        }
    }
}
