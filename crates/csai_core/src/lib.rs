//! # CSAI Core
//!
//! Decision logic for the CSAI skirmish AI.
//!
//! The host engine owns the simulation, pathfinding, line of sight and
//! rendering. This crate only:
//! - Reads host state through the [`host::AiCallback`] trait
//! - Reacts to host callbacks delivered as [`ai::AiEvent`] values
//! - Issues [`command::Order`]s back through the same trait
//!
//! Everything runs synchronously on the host's thread. No state is
//! global; an [`ai::Ai`] owns everything for one team.
//!
//! ## Crate Structure
//!
//! - [`ai`] - Event dispatch and unit registry ownership
//! - [`reclaim`] - Reclaim target selection
//! - [`constructor`] - Constructor decisions
//! - [`factory`] - Factory production
//! - [`tanks`] - Combat unit requests and pack orders
//! - [`requester`] - Builder/requester negotiation
//! - [`command`] - Orders and their host wire format
//! - [`host`] - Host callback interface

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod build_table;
pub mod chat;
pub mod command;
pub mod config;
pub mod constructor;
pub mod economy;
pub mod error;
pub mod factory;
pub mod host;
pub mod math;
pub mod metal;
pub mod reclaim;
pub mod requester;
pub mod tanks;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{Ai, AiEvent};
    pub use crate::build_table::BuildTable;
    pub use crate::command::{Order, WireCommand};
    pub use crate::config::AiConfig;
    pub use crate::economy::ResourceSnapshot;
    pub use crate::error::{AiError, Result};
    pub use crate::host::{
        AiCallback, AreaId, DebugMarker, FeatureId, FeatureInfo, MovementClass, UnitId,
    };
    pub use crate::math::Position;
    pub use crate::reclaim::{
        find_best_reclaim_target, ReclaimCandidate, ReclaimQuery, ReclaimSelector,
        ReclaimableFeature,
    };
    pub use crate::units::{UnitDef, UnitEvent, UnitRegistry};
}
