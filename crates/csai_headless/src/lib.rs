//! Headless scenario runner for AI testing and CI verification.
//!
//! Runs the AI against a scripted host loaded from a RON scenario, with no
//! engine attached. This enables:
//!
//! - **Regression checks**: Compare order logs between AI versions
//! - **Tuning**: Try configuration changes against a fixed map
//! - **CI verification**: Catch errors and non-determinism automatically
//!
//! # Output
//!
//! - **stdout** (or `--output`): JSON [`RunReport`]
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! cargo run -p csai_headless -- run --scenario scenarios/reclaim_field.ron
//! cargo run -p csai_headless -- check-config csai.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod host;
pub mod runner;
pub mod scenario;

pub use host::{DrawnMarker, IssuedOrder, ScenarioHost, SentMessage};
pub use runner::{order_kind, EventFailure, RunReport, ScenarioRunner};
pub use scenario::{
    AreaRegion, EnemyPlacement, FeaturePlacement, Scenario, ScenarioAction, ScenarioError,
    ScriptedEvent, UnitPlacement,
};
