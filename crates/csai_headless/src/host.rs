//! Scripted host backed by a scenario.
//!
//! [`ScenarioHost`] answers the AI's queries from the scenario's static map
//! and records every order, chat line and debug marker with the frame it
//! happened on. It does not simulate movement or construction; those are
//! scripted in the scenario instead.

use std::collections::BTreeMap;

use csai_core::command::WireCommand;
use csai_core::economy::ResourceSnapshot;
use csai_core::error::{AiError, Result};
use csai_core::host::{
    AiCallback, AreaId, DebugMarker, FeatureId, FeatureInfo, MovementClass, UnitId,
};
use csai_core::math::Position;
use csai_core::units::UnitDef;
use serde::Serialize;

use crate::scenario::{AreaRegion, EnemyPlacement, FeaturePlacement, Scenario, UnitPlacement};

/// A unit as the host tracks it.
#[derive(Debug, Clone, PartialEq)]
struct HostUnit {
    def: String,
    position: Position,
    busy: bool,
}

/// An order the AI gave.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedOrder {
    /// Frame it was given on.
    pub frame: u64,
    /// Receiving unit.
    pub unit: UnitId,
    /// Command in wire form.
    pub command: WireCommand,
}

/// A chat line the AI sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentMessage {
    /// Frame it was sent on.
    pub frame: u64,
    /// Text.
    pub text: String,
}

/// A marker the AI drew.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnMarker {
    /// Frame it was drawn on.
    pub frame: u64,
    /// The marker.
    pub marker: DebugMarker,
}

/// Host state for one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioHost {
    frame: u64,
    team: i32,
    defs: Vec<UnitDef>,
    units: BTreeMap<UnitId, HostUnit>,
    enemies: BTreeMap<UnitId, Position>,
    features: BTreeMap<FeatureId, FeatureInfo>,
    areas: Vec<AreaRegion>,
    metal_spots: Vec<Position>,
    resources: ResourceSnapshot,
    orders: Vec<IssuedOrder>,
    messages: Vec<SentMessage>,
    markers: Vec<DrawnMarker>,
}

impl ScenarioHost {
    /// Build the frame-0 host state for `scenario`.
    #[must_use]
    pub fn new(scenario: &Scenario) -> Self {
        let mut host = Self {
            frame: 0,
            team: scenario.team,
            defs: scenario.unit_defs.clone(),
            units: BTreeMap::new(),
            enemies: BTreeMap::new(),
            features: BTreeMap::new(),
            areas: scenario.areas.clone(),
            metal_spots: scenario.metal_spots.clone(),
            resources: scenario.resources,
            orders: Vec::new(),
            messages: Vec::new(),
            markers: Vec::new(),
        };
        for placement in &scenario.units {
            host.place_unit(placement);
        }
        for enemy in &scenario.enemies {
            host.add_enemy(*enemy);
        }
        for feature in &scenario.features {
            host.add_feature(*feature);
        }
        host
    }

    /// Advance to `frame`.
    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Add or replace an idle unit.
    pub fn place_unit(&mut self, placement: &UnitPlacement) {
        self.units.insert(
            placement.id,
            HostUnit {
                def: placement.def.clone(),
                position: placement.position,
                busy: false,
            },
        );
    }

    /// Remove a unit. Returns whether it existed.
    pub fn remove_unit(&mut self, unit: UnitId) -> bool {
        self.units.remove(&unit).is_some()
    }

    /// Clear a unit's orders.
    pub fn set_idle(&mut self, unit: UnitId) {
        if let Some(host_unit) = self.units.get_mut(&unit) {
            host_unit.busy = false;
        }
    }

    /// Add or move a visible enemy.
    pub fn add_enemy(&mut self, enemy: EnemyPlacement) {
        self.enemies.insert(enemy.id, enemy.position);
    }

    /// Remove an enemy. Returns whether it was visible.
    pub fn remove_enemy(&mut self, unit: UnitId) -> bool {
        self.enemies.remove(&unit).is_some()
    }

    /// Add or replace a feature.
    pub fn add_feature(&mut self, feature: FeaturePlacement) {
        self.features.insert(
            feature.id,
            FeatureInfo {
                position: feature.position,
                metal: feature.metal,
            },
        );
    }

    /// Remove a feature. Returns whether it existed.
    pub fn remove_feature(&mut self, feature: FeatureId) -> bool {
        self.features.remove(&feature).is_some()
    }

    /// Replace team resources.
    pub fn set_resources(&mut self, resources: ResourceSnapshot) {
        self.resources = resources;
    }

    /// Ids of units on the map.
    #[must_use]
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Orders received so far.
    #[must_use]
    pub fn orders(&self) -> &[IssuedOrder] {
        &self.orders
    }

    /// Chat lines received so far.
    #[must_use]
    pub fn messages(&self) -> &[SentMessage] {
        &self.messages
    }

    /// Markers drawn so far.
    #[must_use]
    pub fn markers(&self) -> &[DrawnMarker] {
        &self.markers
    }

    /// Hand over the recorded output.
    #[must_use]
    pub fn into_records(self) -> (Vec<IssuedOrder>, Vec<SentMessage>, Vec<DrawnMarker>) {
        (self.orders, self.messages, self.markers)
    }

    fn unit(&self, unit: UnitId) -> Result<&HostUnit> {
        self.units.get(&unit).ok_or(AiError::UnknownUnit(unit))
    }
}

impl AiCallback for ScenarioHost {
    fn current_frame(&self) -> u64 {
        self.frame
    }

    fn team(&self) -> i32 {
        self.team
    }

    fn unit_defs(&self) -> Result<Vec<UnitDef>> {
        Ok(self.defs.clone())
    }

    fn unit_def(&self, unit: UnitId) -> Result<UnitDef> {
        let name = &self.unit(unit)?.def;
        self.defs
            .iter()
            .find(|def| def.is(name))
            .cloned()
            .ok_or_else(|| AiError::UnknownUnitDef(name.clone()))
    }

    fn unit_position(&self, unit: UnitId) -> Result<Position> {
        match self.enemies.get(&unit) {
            Some(position) => Ok(*position),
            None => Ok(self.unit(unit)?.position),
        }
    }

    fn unit_is_busy(&self, unit: UnitId) -> Result<bool> {
        Ok(self.unit(unit)?.busy)
    }

    fn enemy_units(&self) -> Result<Vec<UnitId>> {
        Ok(self.enemies.keys().copied().collect())
    }

    fn features_within(&self, center: Position, radius: f64) -> Result<Vec<FeatureId>> {
        Ok(self
            .features
            .iter()
            .filter(|(_, info)| center.distance(info.position) <= radius)
            .map(|(id, _)| *id)
            .collect())
    }

    fn feature(&self, feature: FeatureId) -> Result<FeatureInfo> {
        self.features
            .get(&feature)
            .copied()
            .ok_or(AiError::UnknownFeature(feature))
    }

    fn resources(&self) -> Result<ResourceSnapshot> {
        Ok(self.resources)
    }

    fn area_of(&self, _class: &MovementClass, position: Position) -> Result<AreaId> {
        Ok(self
            .areas
            .iter()
            .find(|region| region.contains(position))
            .map_or(0, |region| region.area))
    }

    fn metal_spots(&self) -> Result<Vec<Position>> {
        Ok(self.metal_spots.clone())
    }

    fn closest_build_site(
        &self,
        _def: &UnitDef,
        near: Position,
        _search_radius: f64,
        _min_distance: f64,
    ) -> Result<Option<Position>> {
        Ok(Some(near))
    }

    fn give_order(&mut self, unit: UnitId, command: WireCommand) -> Result<()> {
        let frame = self.frame;
        let host_unit = self.units.get_mut(&unit).ok_or(AiError::UnknownUnit(unit))?;
        host_unit.busy = true;
        self.orders.push(IssuedOrder {
            frame,
            unit,
            command,
        });
        Ok(())
    }

    fn send_text_message(&mut self, text: &str) {
        tracing::info!(frame = self.frame, text, "AI chat");
        self.messages.push(SentMessage {
            frame: self.frame,
            text: text.to_string(),
        });
    }

    fn draw_marker(&mut self, marker: DebugMarker) {
        self.markers.push(DrawnMarker {
            frame: self.frame,
            marker,
        });
    }
}
