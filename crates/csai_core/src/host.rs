//! Host engine callback interface.
//!
//! This module defines the `AiCallback` trait through which the AI sees
//! the game. The engine owns the simulation, the unit and feature state,
//! pathfinding and rendering; the AI only queries and issues orders.
//!
//! Every query returns [`Result`] so that a failing host call propagates
//! to the caller unchanged. Nothing in this crate retries or masks host
//! failures.

use serde::{Deserialize, Serialize};

use crate::command::WireCommand;
use crate::economy::ResourceSnapshot;
use crate::error::Result;
use crate::math::Position;
use crate::units::UnitDef;

/// Identifier of a unit owned by any team.
pub type UnitId = i32;

/// Identifier of a map feature (wreck, rock, tree).
pub type FeatureId = i32;

/// Identifier of a connected traversable region for one movement class.
///
/// Two positions are mutually reachable iff they resolve to the same area.
pub type AreaId = i32;

/// Which terrain a unit can traverse, named after the host's move definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementClass(pub String);

impl MovementClass {
    /// Create a movement class from its move definition name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The move definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Metadata the host reports for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Position in world space.
    pub position: Position,
    /// Metal recovered by reclaiming this feature.
    pub metal: f64,
}

/// A cosmetic debug marker drawn in the game world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugMarker {
    /// Unit definition name whose model is drawn as the marker.
    pub unit_name: String,
    /// Where to draw it.
    pub position: Position,
    /// Display duration in frames.
    pub duration_frames: u32,
}

/// Callbacks the host engine exposes to the AI.
///
/// # Frames
///
/// `current_frame` is 0 at match start and increases monotonically.
/// Several host values (notably feature metal) are unreliable on frame 0.
///
/// # Orders
///
/// All unit control flows through `give_order`. Orders are converted to
/// the host wire format by [`crate::command::Order::to_wire`] before they
/// reach this trait.
pub trait AiCallback {
    /// Current simulation frame.
    fn current_frame(&self) -> u64;

    /// Team number this AI plays as.
    fn team(&self) -> i32;

    /// Every unit definition the game knows about.
    fn unit_defs(&self) -> Result<Vec<UnitDef>>;

    /// Definition of a specific unit.
    fn unit_def(&self, unit: UnitId) -> Result<UnitDef>;

    /// Current position of a unit.
    fn unit_position(&self, unit: UnitId) -> Result<Position>;

    /// Whether the unit is currently executing an order.
    fn unit_is_busy(&self, unit: UnitId) -> Result<bool>;

    /// Enemy units the team can currently see, in host order.
    ///
    /// Their positions are available through `unit_position`.
    fn enemy_units(&self) -> Result<Vec<UnitId>>;

    /// Features within `radius` of `center`, in host order.
    fn features_within(&self, center: Position, radius: f64) -> Result<Vec<FeatureId>>;

    /// Metadata for a feature.
    fn feature(&self, feature: FeatureId) -> Result<FeatureInfo>;

    /// Current team resources.
    fn resources(&self) -> Result<ResourceSnapshot>;

    /// Which traversable area `position` belongs to for `class`.
    fn area_of(&self, class: &MovementClass, position: Position) -> Result<AreaId>;

    /// Metal extraction spots on the map.
    fn metal_spots(&self) -> Result<Vec<Position>>;

    /// Closest position to `near` where `def` can be built, if any.
    fn closest_build_site(
        &self,
        def: &UnitDef,
        near: Position,
        search_radius: f64,
        min_distance: f64,
    ) -> Result<Option<Position>>;

    /// Hand an order to a unit.
    fn give_order(&mut self, unit: UnitId, command: WireCommand) -> Result<()>;

    /// Send a chat line to all players.
    fn send_text_message(&mut self, text: &str);

    /// Draw a cosmetic marker. Hosts without debug drawing may ignore it.
    fn draw_marker(&mut self, _marker: DebugMarker) {}
}
