//! Factory controller.
//!
//! Factories build whatever the requesters ask for, at their own
//! position. The controller also asks constructors for more factories
//! while fewer than the configured number exist.

use crate::build_table::{BuildTable, ARM_KBOT_LAB, ARM_VEHICLE_FACTORY};
use crate::command::{give_order, Order};
use crate::config::FactoryConfig;
use crate::error::{AiError, Result};
use crate::host::{AiCallback, UnitId};
use crate::requester::{negotiate, Builder, UnitRequester};
use crate::units::{UnitDef, UnitRegistry};

/// Priority of a factory request while below the optimal count.
pub const FACTORY_REQUEST_PRIORITY: f64 = 0.5;

/// Drives factory production.
#[derive(Debug, Default)]
pub struct FactoryController {
    config: FactoryConfig,
    factories: UnitRegistry,
    pending: usize,
}

impl FactoryController {
    /// Create a controller.
    #[must_use]
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            factories: UnitRegistry::new(),
            pending: 0,
        }
    }

    /// Whether units of this type are managed here.
    #[must_use]
    pub fn is_factory(def: &UnitDef) -> bool {
        def.is(ARM_VEHICLE_FACTORY) || def.is(ARM_KBOT_LAB)
    }

    /// Managed factories.
    #[must_use]
    pub fn factories(&self) -> &UnitRegistry {
        &self.factories
    }

    /// Factories ordered from constructors but not finished yet.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Pick up every factory in `units` and restart idle ones.
    pub fn activate<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        table: &BuildTable,
        units: &UnitRegistry,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<()> {
        self.factories.clear();
        for (unit, def) in units.iter() {
            if Self::is_factory(def) {
                self.factories.add(unit, def.clone());
            }
        }
        tracing::info!(count = self.factories.len(), "Factory controller activated");

        for unit in self.factories.ids() {
            if !host.unit_is_busy(unit)? {
                self.put_to_work(host, table, unit, requesters)?;
            }
        }
        Ok(())
    }

    /// A unit joined the team.
    pub fn on_unit_added<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        table: &BuildTable,
        unit: UnitId,
        def: &UnitDef,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        if !Self::is_factory(def) || !self.factories.add(unit, def.clone()) {
            return Ok(None);
        }
        self.pending = self.pending.saturating_sub(1);
        tracing::info!(unit, name = %def.human_name, "New factory");
        self.put_to_work(host, table, unit, requesters)
    }

    /// A unit left the team.
    pub fn on_unit_removed(&mut self, unit: UnitId) {
        if self.factories.remove(unit).is_some() {
            tracing::info!(unit, "Factory destroyed");
        }
    }

    /// A unit ran out of orders.
    pub fn on_unit_idle<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        table: &BuildTable,
        unit: UnitId,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        if !self.factories.contains(unit) {
            return Ok(None);
        }
        self.put_to_work(host, table, unit, requesters)
    }

    /// Ask requesters what to build next and start it.
    pub fn put_to_work<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        table: &BuildTable,
        unit: UnitId,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        let def = self
            .factories
            .get(unit)
            .cloned()
            .ok_or(AiError::UnknownUnit(unit))?;
        let builder = Builder::new(unit, def);

        let Some(request) = negotiate(requesters, &builder, table)? else {
            tracing::debug!(unit, "No requests for factory");
            return Ok(None);
        };

        let position = host.unit_position(unit)?;
        let order = Order::Build {
            unit_def_id: request.def.id,
            position,
        };
        let order = give_order(host, unit, order)?;
        request.grant(requesters);
        Ok(Some(order))
    }
}

impl UnitRequester for FactoryController {
    fn requester_name(&self) -> &str {
        "factories"
    }

    fn priority_for(&self, builder: &Builder) -> f64 {
        if self.factories.len() + self.pending < self.config.optimal_count
            && builder.can_build(ARM_VEHICLE_FACTORY)
        {
            FACTORY_REQUEST_PRIORITY
        } else {
            0.0
        }
    }

    fn unit_wanted(&mut self, builder: &Builder) -> Option<String> {
        builder
            .can_build(ARM_VEHICLE_FACTORY)
            .then(|| ARM_VEHICLE_FACTORY.to_string())
    }

    fn building_for_you(&mut self, def: &UnitDef) {
        if Self::is_factory(def) {
            self.pending += 1;
        }
    }

    fn request_destroyed(&mut self, def: &UnitDef) {
        if Self::is_factory(def) {
            self.pending = self.pending.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commander() -> Builder {
        Builder::new(
            1,
            UnitDef {
                is_commander: true,
                build_options: vec![ARM_VEHICLE_FACTORY.to_string(), "armsolar".to_string()],
                ..UnitDef::named(1, "armcom")
            },
        )
    }

    #[test]
    fn test_requests_first_factory() {
        let mut controller = FactoryController::new(FactoryConfig::default());
        assert_eq!(controller.priority_for(&commander()), FACTORY_REQUEST_PRIORITY);
        assert_eq!(controller.unit_wanted(&commander()).as_deref(), Some("armvp"));
    }

    #[test]
    fn test_pending_request_counts_toward_optimal() {
        let mut controller = FactoryController::new(FactoryConfig::default());
        controller.building_for_you(&UnitDef::named(5, ARM_VEHICLE_FACTORY));
        assert_eq!(controller.pending(), 1);
        assert_eq!(controller.priority_for(&commander()), 0.0);

        controller.request_destroyed(&UnitDef::named(5, ARM_VEHICLE_FACTORY));
        assert_eq!(controller.pending(), 0);
        assert_eq!(controller.priority_for(&commander()), FACTORY_REQUEST_PRIORITY);
    }

    #[test]
    fn test_other_units_do_not_touch_pending() {
        let mut controller = FactoryController::new(FactoryConfig::default());
        controller.building_for_you(&UnitDef::named(6, "armsolar"));
        controller.request_destroyed(&UnitDef::named(6, "armsolar"));
        assert_eq!(controller.pending(), 0);
    }

    #[test]
    fn test_builder_without_option_not_asked() {
        let controller = FactoryController::new(FactoryConfig::default());
        let builder = Builder::new(2, UnitDef::named(2, "armcv"));
        assert_eq!(controller.priority_for(&builder), 0.0);
    }

    #[test]
    fn test_is_factory() {
        assert!(FactoryController::is_factory(&UnitDef::named(1, "ARMVP")));
        assert!(FactoryController::is_factory(&UnitDef::named(2, "armlab")));
        assert!(!FactoryController::is_factory(&UnitDef::named(3, "armcv")));
    }
}
