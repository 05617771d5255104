//! Unit definitions indexed by name and id.

use std::collections::HashMap;

use crate::error::{AiError, Result};
use crate::units::UnitDef;

/// Metal extractor.
pub const ARM_MEX: &str = "armmex";
/// Moho extractor; its larger footprint keeps extractors centred on spots.
pub const ARM_MOHO: &str = "armmoho";
/// Solar collector.
pub const ARM_SOLAR: &str = "armsolar";
/// Vehicle plant.
pub const ARM_VEHICLE_FACTORY: &str = "armvp";
/// Kbot lab.
pub const ARM_KBOT_LAB: &str = "armlab";
/// Construction vehicle.
pub const ARM_CONSTRUCTION_VEHICLE: &str = "armcv";
/// Construction kbot.
pub const ARM_CONSTRUCTION_KBOT: &str = "armck";
/// Construction aircraft.
pub const ARM_CONSTRUCTION_AIRCRAFT: &str = "armca";
/// Arm commander.
pub const ARM_COMMANDER: &str = "armcom";
/// Level 1 radar tower.
pub const ARM_RADAR: &str = "armrad";
/// Aircraft plant.
pub const ARM_AIR_PLANT: &str = "armap";
/// Stumpy medium tank.
pub const ARM_STUMPY: &str = "armstump";
/// Samson missile truck.
pub const ARM_SAMSON: &str = "armsam";
/// Rocko rocket kbot.
pub const ARM_ROCKO: &str = "armrock";
/// Jethro anti-air kbot.
pub const ARM_JETHRO: &str = "armjeth";
/// Freedom Fighter fighter.
pub const ARM_FREEDOM_FIGHTER: &str = "armsfig";

/// All unit definitions the host reported.
#[derive(Debug, Clone, Default)]
pub struct BuildTable {
    by_name: HashMap<String, UnitDef>,
    name_by_id: HashMap<i32, String>,
}

impl BuildTable {
    /// Build the table from host definitions.
    #[must_use]
    pub fn new(defs: Vec<UnitDef>) -> Self {
        let mut table = Self::default();
        for def in defs {
            let name = def.name.to_lowercase();
            table.name_by_id.insert(def.id, name.clone());
            table.by_name.insert(name, def);
        }
        table
    }

    /// Definition by name, case-insensitive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UnitDef> {
        self.by_name.get(&name.to_lowercase())
    }

    /// Definition by name, or [`AiError::UnknownUnitDef`].
    pub fn require(&self, name: &str) -> Result<&UnitDef> {
        self.get(name)
            .ok_or_else(|| AiError::UnknownUnitDef(name.to_string()))
    }

    /// Definition by host id.
    #[must_use]
    pub fn by_id(&self, id: i32) -> Option<&UnitDef> {
        self.name_by_id
            .get(&id)
            .and_then(|name| self.by_name.get(name))
    }

    /// Number of known definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
