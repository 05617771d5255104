//! Test fixtures and helpers.
//!
//! [`FakeHost`] is an in-memory host for driving the AI without an engine.
//! It answers queries from plain fields and records every order, chat line
//! and marker the AI produces so tests can assert on them.

use std::collections::BTreeMap;

use csai_core::command::{Order, WireCommand};
use csai_core::economy::ResourceSnapshot;
use csai_core::error::{AiError, Result};
use csai_core::host::{
    AiCallback, AreaId, DebugMarker, FeatureId, FeatureInfo, MovementClass, UnitId,
};
use csai_core::math::Position;
use csai_core::units::UnitDef;

/// Movement class of ARM vehicles.
pub const TANK_CLASS: &str = "tank2";

/// Movement class of ARM kbots.
pub const KBOT_CLASS: &str = "kbot2";

/// A unit as the fake host sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeUnit {
    /// Definition name.
    pub def_name: String,
    /// Current position.
    pub position: Position,
    /// Whether the unit has orders.
    pub busy: bool,
}

/// A ground-plane rectangle that resolves to one area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRect {
    /// Minimum x, inclusive.
    pub min_x: f64,
    /// Maximum x, exclusive.
    pub max_x: f64,
    /// Minimum z, inclusive.
    pub min_z: f64,
    /// Maximum z, exclusive.
    pub max_z: f64,
    /// Area reported for positions inside.
    pub area: AreaId,
}

impl AreaRect {
    /// Every position with `x < boundary` is in `area`.
    #[must_use]
    pub fn west_of(boundary: f64, area: AreaId) -> Self {
        Self {
            min_x: f64::NEG_INFINITY,
            max_x: boundary,
            min_z: f64::NEG_INFINITY,
            max_z: f64::INFINITY,
            area,
        }
    }

    fn contains(&self, position: Position) -> bool {
        (self.min_x..self.max_x).contains(&position.x)
            && (self.min_z..self.max_z).contains(&position.z)
    }
}

/// In-memory host.
///
/// Positions outside every [`AreaRect`] are in area 0. Build sites are the
/// requested position itself unless `build_sites_blocked` is set.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    /// Current frame.
    pub frame: u64,
    /// Team number.
    pub team: i32,
    /// Known unit definitions.
    pub defs: Vec<UnitDef>,
    /// Units by id.
    pub units: BTreeMap<UnitId, FakeUnit>,
    /// Visible enemy units and their positions, in host order.
    pub enemies: Vec<(UnitId, Position)>,
    /// Features in host order.
    pub features: Vec<(FeatureId, FeatureInfo)>,
    /// Team resources.
    pub resources: ResourceSnapshot,
    /// Area overrides, first match wins.
    pub areas: Vec<AreaRect>,
    /// Metal spots.
    pub metal_spots: Vec<Position>,
    /// Make every build site query come back empty.
    pub build_sites_blocked: bool,
    /// Make every area query fail.
    pub fail_area_queries: bool,
    /// Orders received, in order.
    pub orders: Vec<(UnitId, WireCommand)>,
    /// Chat lines sent.
    pub messages: Vec<String>,
    /// Markers drawn.
    pub markers: Vec<DebugMarker>,
    /// Area queries answered.
    pub area_queries: usize,
}

impl FakeHost {
    /// A host on frame 1 with the standard ARM definitions and plenty of
    /// resources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: 1,
            defs: arm_unit_defs(),
            resources: rich_resources(),
            ..Self::default()
        }
    }

    /// Set the current frame.
    #[must_use]
    pub fn at_frame(mut self, frame: u64) -> Self {
        self.frame = frame;
        self
    }

    /// Set team resources.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceSnapshot) -> Self {
        self.resources = resources;
        self
    }

    /// Add an idle unit of the named definition.
    #[must_use]
    pub fn with_unit(mut self, unit: UnitId, def_name: &str, position: Position) -> Self {
        self.insert_unit(unit, def_name, position);
        self
    }

    /// Add a feature.
    #[must_use]
    pub fn with_feature(mut self, id: FeatureId, position: Position, metal: f64) -> Self {
        self.features.push((id, FeatureInfo { position, metal }));
        self
    }

    /// Add an area override.
    #[must_use]
    pub fn with_area(mut self, rect: AreaRect) -> Self {
        self.areas.push(rect);
        self
    }

    /// Add a visible enemy unit.
    #[must_use]
    pub fn with_enemy(mut self, unit: UnitId, position: Position) -> Self {
        self.enemies.push((unit, position));
        self
    }

    /// Add a metal spot.
    #[must_use]
    pub fn with_metal_spot(mut self, position: Position) -> Self {
        self.metal_spots.push(position);
        self
    }

    /// Add or replace an idle unit.
    pub fn insert_unit(&mut self, unit: UnitId, def_name: &str, position: Position) {
        self.units.insert(
            unit,
            FakeUnit {
                def_name: def_name.to_lowercase(),
                position,
                busy: false,
            },
        );
    }

    /// Mark a unit busy or idle.
    pub fn set_busy(&mut self, unit: UnitId, busy: bool) {
        if let Some(fake) = self.units.get_mut(&unit) {
            fake.busy = busy;
        }
    }

    /// Let the named definition build `options` as well.
    ///
    /// # Panics
    ///
    /// Panics if the definition is unknown.
    pub fn allow_build(&mut self, builder: &str, options: &[&str]) {
        let def = self
            .defs
            .iter_mut()
            .find(|def| def.is(builder))
            .unwrap_or_else(|| panic!("unknown unit definition {builder}"));
        def.build_options
            .extend(options.iter().map(|name| (*name).to_string()));
    }

    /// Definition by name.
    #[must_use]
    pub fn def(&self, name: &str) -> Option<&UnitDef> {
        self.defs.iter().find(|def| def.is(name))
    }

    /// Orders given to one unit.
    #[must_use]
    pub fn orders_for(&self, unit: UnitId) -> Vec<&WireCommand> {
        self.orders
            .iter()
            .filter(|(target, _)| *target == unit)
            .map(|(_, command)| command)
            .collect()
    }

    /// The most recent order, if any.
    #[must_use]
    pub fn last_order(&self) -> Option<&(UnitId, WireCommand)> {
        self.orders.last()
    }

    /// Wire form of a build order for the named definition at `position`.
    ///
    /// # Panics
    ///
    /// Panics if the definition is unknown.
    #[must_use]
    pub fn build_order(&self, name: &str, position: Position) -> WireCommand {
        let def = self
            .def(name)
            .unwrap_or_else(|| panic!("unknown unit definition {name}"));
        Order::Build {
            unit_def_id: def.id,
            position,
        }
        .to_wire()
    }
}

impl AiCallback for FakeHost {
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
        let fake = self.units.get(&unit).ok_or(AiError::UnknownUnit(unit))?;
        self.def(&fake.def_name)
            .cloned()
            .ok_or_else(|| AiError::UnknownUnitDef(fake.def_name.clone()))
    }

    fn unit_position(&self, unit: UnitId) -> Result<Position> {
        self.units
            .get(&unit)
            .map(|fake| fake.position)
            .or_else(|| {
                self.enemies
                    .iter()
                    .find(|(enemy, _)| *enemy == unit)
                    .map(|(_, position)| *position)
            })
            .ok_or(AiError::UnknownUnit(unit))
    }

    fn unit_is_busy(&self, unit: UnitId) -> Result<bool> {
        self.units
            .get(&unit)
            .map(|fake| fake.busy)
            .ok_or(AiError::UnknownUnit(unit))
    }

    fn enemy_units(&self) -> Result<Vec<UnitId>> {
        Ok(self.enemies.iter().map(|(unit, _)| *unit).collect())
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
            .iter()
            .find(|(id, _)| *id == feature)
            .map(|(_, info)| *info)
            .ok_or(AiError::UnknownFeature(feature))
    }

    fn resources(&self) -> Result<ResourceSnapshot> {
        Ok(self.resources)
    }

    fn area_of(&self, _class: &MovementClass, position: Position) -> Result<AreaId> {
        if self.fail_area_queries {
            tracing::debug!(%position, "Fake host failing area query");
            return Err(AiError::Host("area query failed".to_string()));
        }
        Ok(self
            .areas
            .iter()
            .find(|rect| rect.contains(position))
            .map_or(0, |rect| rect.area))
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
        if self.build_sites_blocked {
            tracing::debug!(%near, "Fake host has no build site");
            return Ok(None);
        }
        Ok(Some(near))
    }

    fn give_order(&mut self, unit: UnitId, command: WireCommand) -> Result<()> {
        let fake = self.units.get_mut(&unit).ok_or(AiError::UnknownUnit(unit))?;
        fake.busy = true;
        self.orders.push((unit, command));
        Ok(())
    }

    fn send_text_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn draw_marker(&mut self, marker: DebugMarker) {
        self.markers.push(marker);
    }
}

/// Resources that satisfy every threshold and cost.
#[must_use]
pub fn rich_resources() -> ResourceSnapshot {
    ResourceSnapshot::new(900.0, 1000.0, 9000.0, 10000.0)
}

fn def(id: i32, name: &str, human_name: &str, metal: f64, energy: f64) -> UnitDef {
    UnitDef {
        human_name: human_name.to_string(),
        metal_cost: metal,
        energy_cost: energy,
        ..UnitDef::named(id, name)
    }
}

fn mobile_builder(mut def: UnitDef, class: &str, options: &[&str]) -> UnitDef {
    def.is_builder = true;
    def.movement_class = Some(MovementClass::new(class));
    def.build_options = options.iter().map(|name| (*name).to_string()).collect();
    def
}

fn tank(def: UnitDef) -> UnitDef {
    UnitDef {
        movement_class: Some(MovementClass::new(TANK_CLASS)),
        ..def
    }
}

/// The ARM unit definitions the AI relies on.
///
/// Combat units are defined but no factory lists them as build options;
/// tests opt in with [`FakeHost::allow_build`].
#[must_use]
pub fn arm_unit_defs() -> Vec<UnitDef> {
    let structures = ["armmex", "armsolar", "armvp", "armlab", "armrad"];
    let mut commander = mobile_builder(
        def(1, "armcom", "Commander", 2500.0, 25000.0),
        KBOT_CLASS,
        &structures,
    );
    commander.is_commander = true;

    let mut vehicle_plant = def(10, "armvp", "Vehicle Plant", 600.0, 1200.0);
    vehicle_plant.is_builder = true;
    vehicle_plant.build_options = vec!["armcv".to_string(), "armflash".to_string()];
    let mut kbot_lab = def(11, "armlab", "Kbot Lab", 500.0, 1000.0);
    kbot_lab.is_builder = true;
    kbot_lab.build_options = vec!["armck".to_string()];

    vec![
        commander,
        mobile_builder(
            def(2, "armcv", "Construction Vehicle", 120.0, 1500.0),
            TANK_CLASS,
            &structures,
        ),
        mobile_builder(
            def(3, "armck", "Construction Kbot", 110.0, 1400.0),
            KBOT_CLASS,
            &structures,
        ),
        mobile_builder(
            def(4, "armca", "Construction Aircraft", 100.0, 3000.0),
            "air",
            &structures,
        ),
        vehicle_plant,
        kbot_lab,
        def(20, "armmex", "Metal Extractor", 50.0, 500.0),
        def(21, "armmoho", "Moho Mine", 500.0, 8000.0),
        def(22, "armsolar", "Solar Collector", 150.0, 0.0),
        def(23, "armrad", "Radar Tower", 50.0, 600.0),
        tank(def(30, "armflash", "Flash", 100.0, 1000.0)),
        tank(def(31, "armstump", "Stumpy", 100.0, 1100.0)),
        tank(def(32, "armsam", "Samson", 130.0, 1600.0)),
        UnitDef {
            movement_class: Some(MovementClass::new(KBOT_CLASS)),
            ..def(33, "armrock", "Rocko", 100.0, 1000.0)
        },
        UnitDef {
            is_commander: true,
            ..def(40, "corcom", "Commander", 2500.0, 25000.0)
        },
    ]
}
