//! Constructor controller.
//!
//! Owns every constructor (construction vehicles, kbots, aircraft and the
//! commander) and decides what each one does when it falls idle:
//!
//! 1. Energy low: build a solar collector.
//! 2. Metal low: reclaim the best nearby feature, or build an extractor.
//! 3. Otherwise: build whatever the most urgent requester asks for.
//!
//! Constructors that report a failed move are nudged by a small random
//! offset, rate-limited across all constructors.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::build_table::{
    BuildTable, ARM_COMMANDER, ARM_CONSTRUCTION_AIRCRAFT, ARM_CONSTRUCTION_KBOT,
    ARM_CONSTRUCTION_VEHICLE, ARM_KBOT_LAB, ARM_MEX, ARM_MOHO, ARM_SOLAR, ARM_VEHICLE_FACTORY,
};
use crate::command::{give_order, Order};
use crate::config::{AiConfig, ConstructorConfig};
use crate::error::{AiError, Result};
use crate::host::{AiCallback, DebugMarker, UnitId};
use crate::math::Position;
use crate::metal::MetalSpots;
use crate::reclaim::ReclaimSelector;
use crate::requester::{negotiate, Builder, UnitRequester};
use crate::units::{UnitDef, UnitRegistry};

const BUILD_SITE_MARKER_FRAMES: u32 = 500;

/// Priority of a constructor request while below the optimal count.
pub const CONSTRUCTOR_REQUEST_PRIORITY: f64 = 0.8;

/// Shared lookup tables a controller needs to place buildings.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Unit definitions by name.
    pub build_table: &'a BuildTable,
    /// Metal extraction spots.
    pub metal_spots: &'a MetalSpots,
}

/// Decides what constructors do.
#[derive(Debug)]
pub struct ConstructorController {
    config: ConstructorConfig,
    reclaim: ReclaimSelector,
    constructors: UnitRegistry,
    show_next_build_site: bool,
    last_nudge_frame: u64,
    rng: ChaCha8Rng,
}

impl ConstructorController {
    /// Create a controller.
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        Self {
            config: config.constructors,
            reclaim: ReclaimSelector::new(config.reclaim, config.debug),
            constructors: UnitRegistry::new(),
            show_next_build_site: config.show_next_build_site,
            last_nudge_frame: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Whether units of this type are managed here.
    #[must_use]
    pub fn is_constructor(def: &UnitDef) -> bool {
        def.is_commander
            || [
                ARM_CONSTRUCTION_VEHICLE,
                ARM_CONSTRUCTION_KBOT,
                ARM_CONSTRUCTION_AIRCRAFT,
            ]
            .iter()
            .any(|name| def.is(name))
    }

    /// Managed constructors.
    #[must_use]
    pub fn constructors(&self) -> &UnitRegistry {
        &self.constructors
    }

    /// Toggle build-site markers.
    pub fn set_show_next_build_site(&mut self, show: bool) {
        self.show_next_build_site = show;
    }

    /// Toggle reclaim debug markers.
    pub fn set_debug(&mut self, debug: bool) {
        self.reclaim.set_debug(debug);
    }

    /// Pick up every constructor in `units` and put idle ones to work.
    pub fn activate<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        units: &UnitRegistry,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<()> {
        self.constructors.clear();
        for (unit, def) in units.iter() {
            if Self::is_constructor(def) {
                self.constructors.add(unit, def.clone());
            }
        }
        tracing::info!(count = self.constructors.len(), "Constructor controller activated");

        for unit in self.constructors.ids() {
            if !host.unit_is_busy(unit)? {
                tracing::info!(unit, "Constructor detected as idle, putting to work");
                self.put_to_work(host, ctx, unit, requesters)?;
            }
        }
        Ok(())
    }

    /// A unit joined the team.
    pub fn on_unit_added<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
        def: &UnitDef,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        if def.is_commander && !def.is(ARM_COMMANDER) {
            warn_wrong_side(host);
        }
        if !Self::is_constructor(def) || !self.constructors.add(unit, def.clone()) {
            return Ok(None);
        }
        tracing::info!(unit, name = %def.human_name, "New constructor");
        self.put_to_work(host, ctx, unit, requesters)
    }

    /// A unit left the team.
    pub fn on_unit_removed(&mut self, unit: UnitId) {
        if self.constructors.remove(unit).is_some() {
            tracing::info!(unit, "Constructor destroyed");
        }
    }

    /// A unit ran out of orders.
    pub fn on_unit_idle<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        if !self.constructors.contains(unit) {
            return Ok(None);
        }
        tracing::debug!(unit, "Constructor idle");
        self.put_to_work(host, ctx, unit, requesters)
    }

    /// A unit could not reach its destination.
    pub fn on_move_failed<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        unit: UnitId,
    ) -> Result<Option<Order>> {
        let frame = host.current_frame();
        if !self.constructors.contains(unit)
            || frame.saturating_sub(self.last_nudge_frame) <= self.config.nudge_cooldown_frames
        {
            return Ok(None);
        }
        tracing::info!(unit, "Constructor move failed, nudging");
        self.last_nudge_frame = frame;
        self.nudge(host, unit).map(Some)
    }

    /// Decide and issue the next order for a constructor.
    pub fn put_to_work<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
        requesters: &mut [&mut dyn UnitRequester],
    ) -> Result<Option<Order>> {
        let def = self
            .constructors
            .get(unit)
            .cloned()
            .ok_or(AiError::UnknownUnit(unit))?;
        let resources = host.resources()?;

        if resources.energy_percent() < self.config.low_energy_percent {
            tracing::debug!(unit, "Constructor building energy");
            return self.build_near_self(host, ctx, unit, ARM_SOLAR);
        }
        if resources.metal_percent() < self.config.low_metal_percent {
            tracing::debug!(unit, "Constructor gathering metal");
            return self.gather_metal(host, ctx, unit, &def);
        }

        let builder = Builder::new(unit, def.clone());
        let Some(request) = negotiate(requesters, &builder, ctx.build_table)? else {
            tracing::debug!(unit, "No requests for constructor");
            return Ok(None);
        };

        if !resources.has_metal_for(&request.def) {
            self.gather_metal(host, ctx, unit, &def)
        } else if !resources.has_energy_for(&request.def) {
            self.build_near_self(host, ctx, unit, ARM_SOLAR)
        } else {
            let order = self.build_near_self(host, ctx, unit, &request.def.name)?;
            if order.is_some() {
                request.grant(requesters);
            }
            Ok(order)
        }
    }

    fn gather_metal<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
        def: &UnitDef,
    ) -> Result<Option<Order>> {
        if let Some(class) = &def.movement_class {
            if let Some(target) = self.reclaim.select(host, unit, class)? {
                let order = Order::Reclaim {
                    position: target.feature.position,
                    radius: self.reclaim.config().order_radius,
                };
                return give_order(host, unit, order).map(Some);
            }
        }
        self.build_extractor(host, ctx, unit)
    }

    fn build_extractor<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
    ) -> Result<Option<Order>> {
        let mex = ctx.build_table.require(ARM_MEX)?;
        let position = host.unit_position(unit)?;
        let Some(spot) = ctx.metal_spots.nearest(position) else {
            tracing::warn!(unit, "No metal spot known, cannot build extractor");
            return Ok(None);
        };

        // Place the larger moho footprint first so the extractor ends up on the spot
        let near = match ctx.build_table.get(ARM_MOHO) {
            Some(moho) => self.build_site(host, moho, spot)?.unwrap_or(spot),
            None => spot,
        };
        let Some(site) = self.build_site(host, mex, near)? else {
            tracing::warn!(unit, spot = %spot, "No build site for extractor");
            return Ok(None);
        };
        self.build_at(host, unit, mex, site)
    }

    fn build_near_self<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &BuildContext<'_>,
        unit: UnitId,
        name: &str,
    ) -> Result<Option<Order>> {
        let def = ctx.build_table.require(name)?;
        let position = host.unit_position(unit)?;
        let Some(site) = self.build_site(host, def, position)? else {
            tracing::warn!(unit, name, "No build site found");
            return Ok(None);
        };
        self.build_at(host, unit, def, site)
    }

    fn build_site<H: AiCallback + ?Sized>(
        &self,
        host: &H,
        def: &UnitDef,
        near: Position,
    ) -> Result<Option<Position>> {
        host.closest_build_site(
            def,
            near,
            self.config.build_site_search_radius,
            self.config.build_site_min_distance,
        )
    }

    fn build_at<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        unit: UnitId,
        def: &UnitDef,
        site: Position,
    ) -> Result<Option<Order>> {
        tracing::info!(unit, name = %def.name, site = %site, "Building");
        if self.show_next_build_site {
            host.draw_marker(DebugMarker {
                unit_name: def.name.clone(),
                position: site,
                duration_frames: BUILD_SITE_MARKER_FRAMES,
            });
        }
        let order = Order::Build {
            unit_def_id: def.id,
            position: site,
        };
        give_order(host, unit, order).map(Some)
    }

    fn nudge<H: AiCallback + ?Sized>(&mut self, host: &mut H, unit: UnitId) -> Result<Order> {
        let size = self.config.nudge_size.max(1);
        let dx = self.rng.gen_range(-size..size);
        let dz = self.rng.gen_range(-size..size);
        let position = host
            .unit_position(unit)?
            .offset_ground(f64::from(dx), f64::from(dz));
        give_order(host, unit, Order::MoveTo { position })
    }
}

fn warn_wrong_side<H: AiCallback + ?Sized>(host: &mut H) {
    host.send_text_message("Warning: please make sure the AI is running as ARM");
    host.send_text_message("CSAI will not function correctly if not running as ARM");
    tracing::warn!("Commander is not an ARM commander; build choices assume ARM");
}

/// Constructor type `builder` should make, if it can make one.
fn constructor_for(builder: &Builder) -> Option<&'static str> {
    let name = if builder.def.is(ARM_VEHICLE_FACTORY) {
        ARM_CONSTRUCTION_VEHICLE
    } else if builder.def.is(ARM_KBOT_LAB) {
        ARM_CONSTRUCTION_KBOT
    } else {
        return None;
    };
    builder.can_build(name).then_some(name)
}

impl UnitRequester for ConstructorController {
    fn requester_name(&self) -> &str {
        "constructors"
    }

    fn priority_for(&self, builder: &Builder) -> f64 {
        if self.constructors.len() < self.config.optimal_count
            && constructor_for(builder).is_some()
        {
            CONSTRUCTOR_REQUEST_PRIORITY
        } else {
            0.0
        }
    }

    fn unit_wanted(&mut self, builder: &Builder) -> Option<String> {
        constructor_for(builder).map(str::to_string)
    }
}
