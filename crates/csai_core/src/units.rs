//! Unit definitions, lifecycle events and the owned unit registry.
//!
//! The registry is ordinary state owned by whoever needs it; lifecycle
//! changes arrive as [`UnitEvent`] values and are applied with
//! [`UnitRegistry::apply`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::host::{MovementClass, UnitId};

/// Static description of a unit type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitDef {
    /// Host-assigned unit definition id. Build orders use its negation.
    pub id: i32,
    /// Internal name, lower-case (`armcv`, `armmex`, ...).
    pub name: String,
    /// Display name.
    pub human_name: String,
    /// Whether this is a commander.
    pub is_commander: bool,
    /// Whether this unit can construct others.
    pub is_builder: bool,
    /// Movement class for mobile units; `None` for structures.
    pub movement_class: Option<MovementClass>,
    /// Metal cost to build.
    pub metal_cost: f64,
    /// Energy cost to build.
    pub energy_cost: f64,
    /// Names of the unit types this unit can build.
    pub build_options: Vec<String>,
}

impl UnitDef {
    /// A bare definition with the given id and name.
    ///
    /// The name is normalized to lower case and reused as the display name.
    #[must_use]
    pub fn named(id: i32, name: &str) -> Self {
        let name = name.to_lowercase();
        Self {
            id,
            human_name: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Whether `name` is among this unit's build options.
    #[must_use]
    pub fn can_build(&self, name: &str) -> bool {
        self.build_options
            .iter()
            .any(|option| option.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A change in the set of units the AI owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitEvent {
    /// A unit finished construction and joined the team.
    Added {
        /// The new unit.
        unit: UnitId,
        /// Its definition.
        def: UnitDef,
    },
    /// A unit was destroyed or given away.
    Removed {
        /// The departed unit.
        unit: UnitId,
    },
}

/// Owned table of units keyed by id.
///
/// Iteration is always in ascending id order so that decisions driven by
/// the registry do not depend on hash ordering.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, UnitDef>,
}

impl UnitRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a lifecycle event.
    ///
    /// Returns `true` if the registry changed.
    pub fn apply(&mut self, event: &UnitEvent) -> bool {
        match event {
            UnitEvent::Added { unit, def } => self.add(*unit, def.clone()),
            UnitEvent::Removed { unit } => self.remove(*unit).is_some(),
        }
    }

    /// Register a unit. Returns `false` if it was already known.
    pub fn add(&mut self, unit: UnitId, def: UnitDef) -> bool {
        if self.units.contains_key(&unit) {
            return false;
        }
        self.units.insert(unit, def);
        true
    }

    /// Forget a unit, returning its definition if it was known.
    pub fn remove(&mut self, unit: UnitId) -> Option<UnitDef> {
        self.units.remove(&unit)
    }

    /// Definition of a registered unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitDef> {
        self.units.get(&unit)
    }

    /// Whether the unit is registered.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains_key(&unit)
    }

    /// Registered unit ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Iterate over registered units in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitDef)> {
        self.units.iter().map(|(id, def)| (*id, def))
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remove every unit.
    pub fn clear(&mut self) {
        self.units.clear();
    }
}
