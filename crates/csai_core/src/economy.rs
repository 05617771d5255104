//! Team resource state as reported by the host.
//!
//! Metal is the primary building resource and the one recovered by
//! reclaiming features; energy powers construction.

use serde::{Deserialize, Serialize};

use crate::units::UnitDef;

/// Snapshot of the team's stockpiles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Current metal stock.
    pub metal: f64,
    /// Maximum metal storage.
    pub metal_storage: f64,
    /// Current energy stock.
    pub energy: f64,
    /// Maximum energy storage.
    pub energy_storage: f64,
}

impl ResourceSnapshot {
    /// Create a new snapshot.
    #[must_use]
    pub const fn new(metal: f64, metal_storage: f64, energy: f64, energy_storage: f64) -> Self {
        Self {
            metal,
            metal_storage,
            energy,
            energy_storage,
        }
    }

    /// Metal storage still free. Never negative.
    #[must_use]
    pub fn free_metal_storage(&self) -> f64 {
        (self.metal_storage - self.metal).max(0.0)
    }

    /// Metal stock as a percentage of storage.
    ///
    /// Empty storage counts as full so that a storage-less team never
    /// looks starved.
    #[must_use]
    pub fn metal_percent(&self) -> f64 {
        percent_of(self.metal, self.metal_storage)
    }

    /// Energy stock as a percentage of storage.
    #[must_use]
    pub fn energy_percent(&self) -> f64 {
        percent_of(self.energy, self.energy_storage)
    }

    /// Whether current metal stock covers the unit's metal cost.
    #[must_use]
    pub fn has_metal_for(&self, def: &UnitDef) -> bool {
        self.metal >= def.metal_cost
    }

    /// Whether current energy stock covers the unit's energy cost.
    #[must_use]
    pub fn has_energy_for(&self, def: &UnitDef) -> bool {
        self.energy >= def.energy_cost
    }
}

fn percent_of(stock: f64, storage: f64) -> f64 {
    if storage <= 0.0 {
        return 100.0;
    }
    stock * 100.0 / storage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_metal_storage() {
        let res = ResourceSnapshot::new(200.0, 1000.0, 0.0, 0.0);
        assert_eq!(res.free_metal_storage(), 800.0);
    }

    #[test]
    fn test_free_metal_storage_never_negative() {
        // Stock can briefly exceed storage after a storage building dies
        let res = ResourceSnapshot::new(1200.0, 1000.0, 0.0, 0.0);
        assert_eq!(res.free_metal_storage(), 0.0);
    }

    #[test]
    fn test_percentages() {
        let res = ResourceSnapshot::new(250.0, 1000.0, 90.0, 1000.0);
        assert_eq!(res.metal_percent(), 25.0);
        assert_eq!(res.energy_percent(), 9.0);
    }

    #[test]
    fn test_zero_storage_counts_as_full() {
        let res = ResourceSnapshot::default();
        assert_eq!(res.metal_percent(), 100.0);
        assert_eq!(res.energy_percent(), 100.0);
    }

    #[test]
    fn test_affordability() {
        let def = UnitDef {
            metal_cost: 50.0,
            energy_cost: 500.0,
            ..UnitDef::named(1, "armmex")
        };
        let res = ResourceSnapshot::new(60.0, 1000.0, 400.0, 1000.0);
        assert!(res.has_metal_for(&def));
        assert!(!res.has_energy_for(&def));
    }
}
