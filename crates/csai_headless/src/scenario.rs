//! Scenario loading and validation.
//!
//! A scenario describes a small static map (unit definitions, starting
//! units, visible enemies, features, movement areas, metal spots,
//! resources) and a script of host callbacks to replay against the AI,
//! frame by frame.

use std::collections::BTreeSet;
use std::path::Path;

use csai_core::ai::AiEvent;
use csai_core::economy::ResourceSnapshot;
use csai_core::error::AiError;
use csai_core::host::{AreaId, FeatureId, UnitId};
use csai_core::math::Position;
use csai_core::units::UnitDef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario is inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    /// The AI could not start.
    #[error("AI failed: {0}")]
    Ai(#[from] AiError),
}

/// A unit present on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit id.
    pub id: UnitId,
    /// Unit definition name.
    pub def: String,
    /// Starting position.
    pub position: Position,
}

/// A visible enemy unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    /// Unit id, distinct from every friendly unit.
    pub id: UnitId,
    /// Position.
    pub position: Position,
}

/// A reclaimable feature on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePlacement {
    /// Feature id.
    pub id: FeatureId,
    /// Position.
    pub position: Position,
    /// Metal it yields.
    pub metal: f64,
}

/// A ground rectangle belonging to one movement area.
///
/// Positions outside every region are in area 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaRegion {
    /// Minimum x, inclusive.
    pub min_x: f64,
    /// Maximum x, exclusive.
    pub max_x: f64,
    /// Minimum z, inclusive.
    pub min_z: f64,
    /// Maximum z, exclusive.
    pub max_z: f64,
    /// Area id.
    pub area: AreaId,
}

impl AreaRegion {
    /// Whether `position` lies inside on the ground plane.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..self.max_x).contains(&position.x)
            && (self.min_z..self.max_z).contains(&position.z)
    }
}

/// Something that happens during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioAction {
    /// Deliver a raw host callback.
    Event(AiEvent),
    /// Place a new unit, then report it created and finished.
    Spawn(UnitPlacement),
    /// Report a unit destroyed, then remove it.
    Destroy(UnitId),
    /// Mark a unit idle and report it.
    Idle(UnitId),
    /// Replace team resources.
    SetResources(ResourceSnapshot),
    /// Add a feature.
    AddFeature(FeaturePlacement),
    /// Remove a feature.
    RemoveFeature(FeatureId),
    /// An enemy unit comes into view.
    AddEnemy(EnemyPlacement),
    /// An enemy unit dies or leaves view.
    RemoveEnemy(UnitId),
}

/// An action bound to a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    /// Frame the action runs on, before the AI's update.
    pub frame: u64,
    /// The action.
    pub action: ScenarioAction,
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Team the AI plays as.
    pub team: i32,
    /// Last frame simulated.
    pub duration_frames: u64,
    /// Every unit definition in the game.
    pub unit_defs: Vec<UnitDef>,
    /// Units present at frame 0, reported finished on frame 0.
    pub units: Vec<UnitPlacement>,
    /// Enemy units visible at frame 0.
    pub enemies: Vec<EnemyPlacement>,
    /// Features present at frame 0.
    pub features: Vec<FeaturePlacement>,
    /// Movement area overrides.
    pub areas: Vec<AreaRegion>,
    /// Metal extraction spots.
    pub metal_spots: Vec<Position>,
    /// Starting resources.
    pub resources: ResourceSnapshot,
    /// Scripted actions.
    pub events: Vec<ScriptedEvent>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            description: String::new(),
            team: 0,
            duration_frames: 900,
            unit_defs: Vec::new(),
            units: Vec::new(),
            enemies: Vec::new(),
            features: Vec::new(),
            areas: Vec::new(),
            metal_spots: Vec::new(),
            resources: ResourceSnapshot::new(500.0, 1000.0, 5000.0, 10000.0),
            events: Vec::new(),
        }
    }
}

impl Scenario {
    /// Load and validate a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load and validate from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check ids are unique and every unit names a known definition.
    ///
    /// Friendly and enemy units share one id space.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let known = |name: &str| self.unit_defs.iter().any(|def| def.is(name));

        let mut unit_ids = BTreeSet::new();
        let spawned = self.events.iter().filter_map(|event| match &event.action {
            ScenarioAction::Spawn(placement) => Some(placement),
            _ => None,
        });
        for placement in self.units.iter().chain(spawned) {
            if !known(&placement.def) {
                return Err(ScenarioError::Invalid(format!(
                    "unit {} uses unknown definition {}",
                    placement.id, placement.def
                )));
            }
            if !unit_ids.insert(placement.id) {
                return Err(ScenarioError::Invalid(format!(
                    "unit id {} used twice",
                    placement.id
                )));
            }
        }

        let spotted = self.events.iter().filter_map(|event| match &event.action {
            ScenarioAction::AddEnemy(enemy) => Some(enemy),
            _ => None,
        });
        for enemy in self.enemies.iter().chain(spotted) {
            if !unit_ids.insert(enemy.id) {
                return Err(ScenarioError::Invalid(format!(
                    "unit id {} used twice",
                    enemy.id
                )));
            }
        }

        let mut feature_ids = BTreeSet::new();
        let added = self.events.iter().filter_map(|event| match &event.action {
            ScenarioAction::AddFeature(feature) => Some(feature),
            _ => None,
        });
        for feature in self.features.iter().chain(added) {
            if !feature_ids.insert(feature.id) {
                return Err(ScenarioError::Invalid(format!(
                    "feature id {} used twice",
                    feature.id
                )));
            }
        }

        if let Some(late) = self
            .events
            .iter()
            .find(|event| event.frame > self.duration_frames)
        {
            return Err(ScenarioError::Invalid(format!(
                "event at frame {} is after the last frame {}",
                late.frame, self.duration_frames
            )));
        }
        Ok(())
    }

    /// Scripted events for one frame, in file order.
    pub fn events_at(&self, frame: u64) -> impl Iterator<Item = &ScenarioAction> {
        self.events
            .iter()
            .filter(move |event| event.frame == frame)
            .map(|event| &event.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"(
        name: "small",
        duration_frames: 60,
        unit_defs: [(id: 1, name: "armcom", is_commander: true)],
        units: [(id: 1, def: "armcom", position: (x: 0.0, y: 0.0, z: 0.0))],
        events: [(frame: 30, action: Idle(1))],
    )"#;

    #[test]
    fn test_parse_small_scenario() {
        let scenario = Scenario::from_ron_str(SMALL).expect("scenario should parse");
        assert_eq!(scenario.name, "small");
        assert_eq!(scenario.units.len(), 1);
        assert_eq!(scenario.events_at(30).count(), 1);
        assert_eq!(scenario.events_at(31).count(), 0);
    }

    #[test]
    fn test_unknown_def_rejected() {
        let ron = r#"(
            unit_defs: [(id: 1, name: "armcom")],
            units: [(id: 1, def: "corcom", position: (x: 0.0, y: 0.0, z: 0.0))],
        )"#;
        assert!(matches!(
            Scenario::from_ron_str(ron),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let ron = r#"(
            unit_defs: [(id: 1, name: "armcom")],
            units: [(id: 1, def: "armcom", position: (x: 0.0, y: 0.0, z: 0.0))],
            events: [(
                frame: 5,
                action: Spawn((id: 1, def: "armcom", position: (x: 1.0, y: 0.0, z: 0.0))),
            )],
        )"#;
        assert!(matches!(
            Scenario::from_ron_str(ron),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_enemy_id_clash_rejected() {
        let ron = r#"(
            unit_defs: [(id: 1, name: "armcom")],
            units: [(id: 1, def: "armcom", position: (x: 0.0, y: 0.0, z: 0.0))],
            events: [(frame: 5, action: AddEnemy((id: 1, position: (x: 9.0, y: 0.0, z: 0.0))))],
        )"#;
        assert!(matches!(
            Scenario::from_ron_str(ron),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_late_event_rejected() {
        let ron = "(duration_frames: 10, events: [(frame: 11, action: Destroy(1))])";
        assert!(matches!(
            Scenario::from_ron_str(ron),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load("/nonexistent/scenario.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_area_region_bounds() {
        let region = AreaRegion {
            min_x: 0.0,
            max_x: 100.0,
            min_z: 0.0,
            max_z: 100.0,
            area: 3,
        };
        assert!(region.contains(Position::new(0.0, 50.0, 99.0)));
        assert!(!region.contains(Position::new(100.0, 0.0, 50.0)));
    }
}
