//! Tank controller.
//!
//! Asks factories for combat units and moves them as one pack. Until
//! enough tanks have gathered the pack guards the commander; after that it
//! attacks the visible enemy nearest the last point it attacked.
//!
//! The pack is re-planned every few frames. Tanks only receive new orders
//! when the mission changes, when they join, or when they fall idle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::build_table::{
    ARM_AIR_PLANT, ARM_FREEDOM_FIGHTER, ARM_JETHRO, ARM_KBOT_LAB, ARM_ROCKO, ARM_SAMSON,
    ARM_STUMPY, ARM_VEHICLE_FACTORY,
};
use crate::command::{give_order, Order};
use crate::config::{AiConfig, TankConfig};
use crate::error::Result;
use crate::host::{AiCallback, UnitId};
use crate::math::Position;
use crate::requester::{Builder, UnitRequester};
use crate::units::{UnitDef, UnitRegistry};

/// Priority of a tank request while the pack is too small to attack.
pub const TANK_REQUEST_PRIORITY: f64 = 1.0;

/// Priority of a tank request once the pack can attack.
pub const TANK_REINFORCE_PRIORITY: f64 = 0.5;

/// Combat units the pack takes in.
pub const COMBAT_UNITS: [&str; 11] = [
    "armstump", "armsam", "armrock", "armjeth", "armkam", "armanac", "armsfig", "armmh", "armah",
    "armbull", "armmart",
];

/// Weighted unit choices for each factory type.
const FACTORY_CHOICES: [(&str, &[(&str, u32)]); 3] = [
    (ARM_VEHICLE_FACTORY, &[(ARM_STUMPY, 4), (ARM_SAMSON, 1)]),
    (ARM_KBOT_LAB, &[(ARM_ROCKO, 4), (ARM_JETHRO, 1)]),
    (ARM_AIR_PLANT, &[(ARM_FREEDOM_FIGHTER, 1)]),
];

/// What the pack is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mission {
    /// Guard a friendly unit.
    Guard(UnitId),
    /// Attack an enemy unit.
    Attack(UnitId),
}

impl Mission {
    /// The order each tank receives.
    #[must_use]
    pub const fn order(self) -> Order {
        match self {
            Self::Guard(target) => Order::Guard { target },
            Self::Attack(target) => Order::Attack { target },
        }
    }
}

/// Drives combat units.
#[derive(Debug)]
pub struct TankController {
    config: TankConfig,
    tanks: UnitRegistry,
    commander: Option<UnitId>,
    mission: Option<Mission>,
    last_attack_position: Option<Position>,
    rng: ChaCha8Rng,
}

impl TankController {
    /// Create a controller.
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        // Stream 0 belongs to the constructor nudges
        rng.set_stream(1);
        Self {
            config: config.tanks,
            tanks: UnitRegistry::new(),
            commander: None,
            mission: None,
            last_attack_position: None,
            rng,
        }
    }

    /// Whether units of this type join the pack.
    #[must_use]
    pub fn is_tank(def: &UnitDef) -> bool {
        COMBAT_UNITS.iter().any(|name| def.is(name))
    }

    /// Tanks in the pack.
    #[must_use]
    pub fn tanks(&self) -> &UnitRegistry {
        &self.tanks
    }

    /// Current pack mission.
    #[must_use]
    pub const fn mission(&self) -> Option<Mission> {
        self.mission
    }

    /// The commander the pack falls back to guarding.
    #[must_use]
    pub const fn commander(&self) -> Option<UnitId> {
        self.commander
    }

    /// How often the pack is re-planned, in frames.
    #[must_use]
    pub const fn think_frames(&self) -> u64 {
        self.config.think_frames
    }

    /// Pick up every tank and the commander from `units`, then plan.
    pub fn activate<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        units: &UnitRegistry,
    ) -> Result<()> {
        self.tanks.clear();
        self.commander = None;
        self.mission = None;
        for (unit, def) in units.iter() {
            self.track(unit, def);
        }
        tracing::info!(count = self.tanks.len(), "Tank controller activated");
        self.think(host).map(|_| ())
    }

    /// A unit joined the team.
    pub fn on_unit_added<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        unit: UnitId,
        def: &UnitDef,
    ) -> Result<Option<Order>> {
        if !self.track(unit, def) {
            return Ok(None);
        }
        tracing::info!(unit, name = %def.human_name, tanks = self.tanks.len(), "New tank");
        self.follow_mission(host, unit)
    }

    /// A unit left the team.
    pub fn on_unit_removed(&mut self, unit: UnitId) {
        if self.commander == Some(unit) {
            tracing::info!(unit, "Commander lost");
            self.commander = None;
        }
        if self.tanks.remove(unit).is_some() {
            tracing::info!(unit, tanks = self.tanks.len(), "Tank destroyed");
        }
    }

    /// A unit ran out of orders.
    pub fn on_unit_idle<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        unit: UnitId,
    ) -> Result<Option<Order>> {
        if !self.tanks.contains(unit) {
            return Ok(None);
        }
        self.follow_mission(host, unit)
    }

    /// Re-plan the pack and order every tank if the mission changed.
    ///
    /// Returns the mission now in force.
    pub fn think<H: AiCallback + ?Sized>(&mut self, host: &mut H) -> Result<Option<Mission>> {
        let mission = if self.tanks.len() >= self.config.min_tanks_for_attack {
            match self.choose_target(host)? {
                Some((enemy, position)) => {
                    self.last_attack_position = Some(position);
                    Some(Mission::Attack(enemy))
                }
                None => self.commander.map(Mission::Guard),
            }
        } else {
            self.commander.map(Mission::Guard)
        };
        if mission == self.mission {
            return Ok(mission);
        }

        tracing::info!(?mission, tanks = self.tanks.len(), "Pack mission changed");
        self.mission = mission;
        if let Some(mission) = mission {
            for unit in self.tanks.ids() {
                give_order(host, unit, mission.order())?;
            }
        }
        Ok(mission)
    }

    fn track(&mut self, unit: UnitId, def: &UnitDef) -> bool {
        if def.is_commander {
            self.commander = Some(unit);
        }
        Self::is_tank(def) && self.tanks.add(unit, def.clone())
    }

    fn follow_mission<H: AiCallback + ?Sized>(
        &self,
        host: &mut H,
        unit: UnitId,
    ) -> Result<Option<Order>> {
        match self.mission {
            Some(mission) => give_order(host, unit, mission.order()).map(Some),
            None => Ok(None),
        }
    }

    /// Visible enemy nearest the last attack point, or the commander, or
    /// failing both the first tank.
    fn choose_target<H: AiCallback + ?Sized>(
        &self,
        host: &H,
    ) -> Result<Option<(UnitId, Position)>> {
        let enemies = host.enemy_units()?;
        if enemies.is_empty() {
            return Ok(None);
        }
        let anchor = match (self.last_attack_position, self.commander) {
            (Some(position), _) => position,
            (None, Some(commander)) => host.unit_position(commander)?,
            (None, None) => match self.tanks.ids().first() {
                Some(tank) => host.unit_position(*tank)?,
                None => return Ok(None),
            },
        };

        let mut best: Option<(UnitId, Position, f64)> = None;
        for enemy in enemies {
            let position = host.unit_position(enemy)?;
            let distance = anchor.distance(position);
            if best.map_or(true, |(_, _, nearest)| distance < nearest) {
                best = Some((enemy, position, distance));
            }
        }
        Ok(best.map(|(enemy, position, _)| (enemy, position)))
    }
}

/// Combat units `builder` can make, with their weights.
fn choices_for(builder: &Builder) -> Vec<(&'static str, u32)> {
    FACTORY_CHOICES
        .iter()
        .filter(|(factory, _)| builder.def.is(factory))
        .flat_map(|(_, choices)| choices.iter().copied())
        .filter(|(name, _)| builder.can_build(name))
        .collect()
}

impl UnitRequester for TankController {
    fn requester_name(&self) -> &str {
        "tanks"
    }

    fn priority_for(&self, builder: &Builder) -> f64 {
        if choices_for(builder).is_empty() {
            0.0
        } else if self.tanks.len() < self.config.min_tanks_for_attack {
            TANK_REQUEST_PRIORITY
        } else {
            TANK_REINFORCE_PRIORITY
        }
    }

    fn unit_wanted(&mut self, builder: &Builder) -> Option<String> {
        let choices = choices_for(builder);
        let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.rng.gen_range(0..total);
        for (name, weight) in choices {
            if roll < weight {
                tracing::debug!(builder = builder.name(), unit = name, "Tank chosen");
                return Some(name.to_string());
            }
            roll -= weight;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(name: &str, options: &[&str]) -> Builder {
        let def = UnitDef {
            build_options: options.iter().map(|o| (*o).to_string()).collect(),
            ..UnitDef::named(10, name)
        };
        Builder::new(5, def)
    }

    fn controller() -> TankController {
        TankController::new(&AiConfig::default())
    }

    #[test]
    fn test_is_tank() {
        assert!(TankController::is_tank(&UnitDef::named(1, "ARMSTUMP")));
        assert!(TankController::is_tank(&UnitDef::named(2, "armjeth")));
        assert!(!TankController::is_tank(&UnitDef::named(3, "armcv")));
        assert!(!TankController::is_tank(&UnitDef::named(4, "armflash")));
    }

    #[test]
    fn test_priority_drops_once_pack_can_attack() {
        let mut controller = controller();
        let plant = factory(ARM_VEHICLE_FACTORY, &[ARM_STUMPY, ARM_SAMSON]);
        assert_eq!(controller.priority_for(&plant), TANK_REQUEST_PRIORITY);

        for unit in 0..5 {
            controller.tanks.add(unit, UnitDef::named(31, ARM_STUMPY));
        }
        assert_eq!(controller.priority_for(&plant), TANK_REINFORCE_PRIORITY);
    }

    #[test]
    fn test_no_request_without_combat_options() {
        let mut controller = controller();
        let plant = factory(ARM_VEHICLE_FACTORY, &["armcv", "armflash"]);
        let commander = factory("armcom", &[ARM_VEHICLE_FACTORY, ARM_STUMPY]);

        assert_eq!(controller.priority_for(&plant), 0.0);
        assert_eq!(controller.unit_wanted(&plant), None);
        assert_eq!(controller.priority_for(&commander), 0.0);
    }

    #[test]
    fn test_choice_limited_to_build_options() {
        let mut controller = controller();
        let lab = factory(ARM_KBOT_LAB, &[ARM_JETHRO]);
        for _ in 0..20 {
            assert_eq!(controller.unit_wanted(&lab).as_deref(), Some(ARM_JETHRO));
        }
    }

    #[test]
    fn test_choice_mostly_first_option() {
        let mut controller = controller();
        let plant = factory(ARM_VEHICLE_FACTORY, &[ARM_STUMPY, ARM_SAMSON]);
        let picks: Vec<String> = (0..200)
            .filter_map(|_| controller.unit_wanted(&plant))
            .collect();
        let stumpies = picks.iter().filter(|name| *name == ARM_STUMPY).count();

        assert_eq!(picks.len(), 200);
        assert!(stumpies > 120 && stumpies < 200, "stumpies = {stumpies}");
        assert!(picks.iter().any(|name| name == ARM_SAMSON));
    }

    #[test]
    fn test_choice_is_seeded() {
        let plant = factory(ARM_VEHICLE_FACTORY, &[ARM_STUMPY, ARM_SAMSON]);
        let picks = |seed: u64| {
            let config = AiConfig {
                seed,
                ..AiConfig::default()
            };
            let mut controller = TankController::new(&config);
            (0..20)
                .map(|_| controller.unit_wanted(&plant))
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
    }

    #[test]
    fn test_mission_orders() {
        assert_eq!(Mission::Guard(1).order(), Order::Guard { target: 1 });
        assert_eq!(Mission::Attack(9).order(), Order::Attack { target: 9 });
    }

    #[test]
    fn test_removed_units_forgotten() {
        let mut controller = controller();
        let commander = UnitDef {
            is_commander: true,
            ..UnitDef::named(1, "armcom")
        };
        assert!(!controller.track(1, &commander));
        assert!(controller.track(2, &UnitDef::named(31, ARM_STUMPY)));
        assert_eq!(controller.commander(), Some(1));

        controller.on_unit_removed(1);
        controller.on_unit_removed(2);
        assert_eq!(controller.commander(), None);
        assert!(controller.tanks().is_empty());
    }
}
