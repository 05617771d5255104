//! Scenario runner.
//!
//! Replays a scenario against a fresh [`Ai`] and collects what the AI did
//! into a [`RunReport`].

use std::collections::BTreeMap;

use csai_core::ai::{Ai, AiEvent};
use csai_core::command::{CMD_ATTACK, CMD_GUARD, CMD_MOVE, CMD_RECLAIM, CMD_SELFD, CMD_STOP};
use csai_core::config::AiConfig;
use csai_core::host::AiCallback;
use csai_core::units::UnitDef;
use serde::Serialize;

use crate::host::{DrawnMarker, IssuedOrder, ScenarioHost, SentMessage};
use crate::scenario::{Scenario, ScenarioAction, ScenarioError};

/// A callback the AI rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFailure {
    /// Frame of the failing callback.
    pub frame: u64,
    /// The callback.
    pub event: AiEvent,
    /// Error text.
    pub error: String,
}

/// Everything the AI did during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Frames simulated, including frame 0.
    pub frames: u64,
    /// Orders by kind (`build armsolar`, `reclaim`, ...).
    pub order_counts: BTreeMap<String, usize>,
    /// Every order, in issue order.
    pub orders: Vec<IssuedOrder>,
    /// Chat lines.
    pub messages: Vec<SentMessage>,
    /// Debug markers.
    pub markers: Vec<DrawnMarker>,
    /// Callbacks that returned an error.
    pub failures: Vec<EventFailure>,
    /// Units the AI tracked at the end.
    pub final_units: Vec<i32>,
}

impl RunReport {
    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs one scenario with one configuration.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    scenario: Scenario,
    config: AiConfig,
}

impl ScenarioRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(scenario: Scenario, config: AiConfig) -> Self {
        Self { scenario, config }
    }

    /// The scenario being run.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Replay the scenario.
    ///
    /// Failing callbacks are recorded in the report; only a failure to start
    /// the AI aborts the run.
    pub fn run(&self) -> Result<RunReport, ScenarioError> {
        let scenario = &self.scenario;
        tracing::info!(
            scenario = %scenario.name,
            frames = scenario.duration_frames,
            "Starting scenario"
        );

        let mut host = ScenarioHost::new(scenario);
        let mut ai = Ai::new(self.config.clone());
        ai.init(&mut host)?;

        let mut session = Session {
            host,
            ai,
            failures: Vec::new(),
        };
        for placement in &scenario.units {
            session.deliver(AiEvent::UnitFinished { unit: placement.id });
        }

        for frame in 0..=scenario.duration_frames {
            session.host.set_frame(frame);
            for action in scenario.events_at(frame) {
                session.apply(action);
            }
            session.deliver(AiEvent::Update { frame });
        }

        let Session {
            host,
            ai,
            failures,
        } = session;
        let final_units = ai.units().ids();
        let (orders, messages, markers) = host.into_records();
        let order_counts = count_orders(&orders, &scenario.unit_defs);
        tracing::info!(
            orders = orders.len(),
            failures = failures.len(),
            "Scenario finished"
        );

        Ok(RunReport {
            scenario: scenario.name.clone(),
            frames: scenario.duration_frames + 1,
            order_counts,
            orders,
            messages,
            markers,
            failures,
            final_units,
        })
    }
}

struct Session {
    host: ScenarioHost,
    ai: Ai,
    failures: Vec<EventFailure>,
}

impl Session {
    fn apply(&mut self, action: &ScenarioAction) {
        match action {
            ScenarioAction::Event(event) => self.deliver(event.clone()),
            ScenarioAction::Spawn(placement) => {
                self.host.place_unit(placement);
                self.deliver(AiEvent::UnitCreated { unit: placement.id });
                self.deliver(AiEvent::UnitFinished { unit: placement.id });
            }
            ScenarioAction::Destroy(unit) => {
                self.deliver(AiEvent::UnitDestroyed { unit: *unit });
                if !self.host.remove_unit(*unit) {
                    tracing::warn!(unit, "Scripted destroy of unknown unit");
                }
            }
            ScenarioAction::Idle(unit) => {
                self.host.set_idle(*unit);
                self.deliver(AiEvent::UnitIdle { unit: *unit });
            }
            ScenarioAction::SetResources(resources) => self.host.set_resources(*resources),
            ScenarioAction::AddFeature(feature) => self.host.add_feature(*feature),
            ScenarioAction::RemoveFeature(feature) => {
                if !self.host.remove_feature(*feature) {
                    tracing::warn!(feature, "Scripted removal of unknown feature");
                }
            }
            ScenarioAction::AddEnemy(enemy) => self.host.add_enemy(*enemy),
            ScenarioAction::RemoveEnemy(unit) => {
                if !self.host.remove_enemy(*unit) {
                    tracing::warn!(unit, "Scripted removal of unknown enemy");
                }
            }
        }
    }

    fn deliver(&mut self, event: AiEvent) {
        if let Err(err) = self.ai.handle(&mut self.host, event.clone()) {
            self.failures.push(EventFailure {
                frame: self.host.current_frame(),
                event,
                error: err.to_string(),
            });
        }
    }
}

/// Short label for a wire command.
#[must_use]
pub fn order_kind(id: i32, defs: &[UnitDef]) -> String {
    match id {
        CMD_STOP => "stop".to_string(),
        CMD_MOVE => "move".to_string(),
        CMD_ATTACK => "attack".to_string(),
        CMD_GUARD => "guard".to_string(),
        CMD_SELFD => "self-destruct".to_string(),
        CMD_RECLAIM => "reclaim".to_string(),
        id if id < 0 => defs
            .iter()
            .find(|def| def.id == -id)
            .map_or_else(|| format!("build #{}", -id), |def| format!("build {}", def.name)),
        id => format!("command {id}"),
    }
}

fn count_orders(orders: &[IssuedOrder], defs: &[UnitDef]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for order in orders {
        *counts.entry(order_kind(order.command.id, defs)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_kind_labels() {
        let defs = vec![UnitDef::named(22, "armsolar")];
        assert_eq!(order_kind(CMD_RECLAIM, &defs), "reclaim");
        assert_eq!(order_kind(-22, &defs), "build armsolar");
        assert_eq!(order_kind(-5, &defs), "build #5");
        assert_eq!(order_kind(70, &defs), "command 70");
    }

    #[test]
    fn test_empty_scenario_runs() {
        let scenario = Scenario {
            duration_frames: 10,
            ..Scenario::default()
        };
        let report = ScenarioRunner::new(scenario, AiConfig::default())
            .run()
            .expect("run should succeed");
        assert_eq!(report.frames, 11);
        assert!(report.orders.is_empty());
        assert!(report.failures.is_empty());
    }
}
