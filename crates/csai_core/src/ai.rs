//! The AI driver.
//!
//! [`Ai`] receives host callbacks as [`AiEvent`] values, keeps the unit
//! registry, and routes lifecycle changes to the controllers. The host is
//! passed into every call; the driver keeps no reference to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::build_table::BuildTable;
use crate::chat::{help_text, parse_chat, ChatCommand, ChatParse};
use crate::config::AiConfig;
use crate::constructor::{BuildContext, ConstructorController};
use crate::error::Result;
use crate::factory::FactoryController;
use crate::host::{AiCallback, UnitId};
use crate::metal::MetalSpots;
use crate::requester::UnitRequester;
use crate::tanks::TankController;
use crate::units::{UnitDef, UnitEvent, UnitRegistry};

/// A callback from the host engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AiEvent {
    /// Construction of a unit started.
    UnitCreated {
        /// The unfinished unit.
        unit: UnitId,
    },
    /// A unit finished construction.
    UnitFinished {
        /// The new unit.
        unit: UnitId,
    },
    /// A unit was destroyed.
    UnitDestroyed {
        /// The destroyed unit.
        unit: UnitId,
    },
    /// A unit has no orders left.
    UnitIdle {
        /// The idle unit.
        unit: UnitId,
    },
    /// A unit could not reach its destination.
    UnitMoveFailed {
        /// The stuck unit.
        unit: UnitId,
    },
    /// A simulation frame passed.
    Update {
        /// The new frame number.
        frame: u64,
    },
    /// Someone wrote in chat.
    ChatMessage {
        /// Message text.
        text: String,
        /// Sending player.
        player: i32,
    },
}

/// Skirmish AI instance for one team.
#[derive(Debug)]
pub struct Ai {
    config: AiConfig,
    units: UnitRegistry,
    under_construction: BTreeMap<UnitId, UnitDef>,
    build_table: BuildTable,
    metal_spots: MetalSpots,
    constructors: ConstructorController,
    factories: FactoryController,
    tanks: TankController,
}

impl Ai {
    /// Create an AI. Call [`Ai::init`] before feeding events.
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        Self {
            constructors: ConstructorController::new(&config),
            factories: FactoryController::new(config.factories),
            tanks: TankController::new(&config),
            units: UnitRegistry::new(),
            under_construction: BTreeMap::new(),
            build_table: BuildTable::default(),
            metal_spots: MetalSpots::default(),
            config,
        }
    }

    /// Load static game data and activate the controllers.
    pub fn init<H: AiCallback + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        self.build_table = BuildTable::new(host.unit_defs()?);
        self.metal_spots = MetalSpots::new(host.metal_spots()?);
        tracing::info!(
            team = host.team(),
            unit_defs = self.build_table.len(),
            metal_spots = self.metal_spots.len(),
            "AI initialised"
        );

        let ctx = BuildContext {
            build_table: &self.build_table,
            metal_spots: &self.metal_spots,
        };
        let mut requesters: [&mut dyn UnitRequester; 1] = [&mut self.factories];
        self.constructors
            .activate(host, &ctx, &self.units, &mut requesters)?;
        let mut requesters: [&mut dyn UnitRequester; 2] =
            [&mut self.constructors, &mut self.tanks];
        self.factories
            .activate(host, &self.build_table, &self.units, &mut requesters)?;
        self.tanks.activate(host, &self.units)
    }

    /// Handle one host callback.
    ///
    /// Errors are logged and returned; the AI stays usable afterwards.
    pub fn handle<H: AiCallback + ?Sized>(&mut self, host: &mut H, event: AiEvent) -> Result<()> {
        let result = self.dispatch(host, &event);
        if let Err(err) = &result {
            tracing::warn!(?event, error = %err, "Event handling failed");
        }
        result
    }

    /// Every unit the AI owns.
    #[must_use]
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Constructor controller.
    #[must_use]
    pub fn constructors(&self) -> &ConstructorController {
        &self.constructors
    }

    /// Factory controller.
    #[must_use]
    pub fn factories(&self) -> &FactoryController {
        &self.factories
    }

    /// Tank controller.
    #[must_use]
    pub fn tanks(&self) -> &TankController {
        &self.tanks
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn dispatch<H: AiCallback + ?Sized>(&mut self, host: &mut H, event: &AiEvent) -> Result<()> {
        match event {
            AiEvent::UnitCreated { unit } => {
                let def = host.unit_def(*unit)?;
                self.under_construction.insert(*unit, def);
                Ok(())
            }
            AiEvent::UnitFinished { unit } => {
                self.under_construction.remove(unit);
                let def = host.unit_def(*unit)?;
                self.apply_unit_event(host, UnitEvent::Added { unit: *unit, def })
            }
            AiEvent::UnitDestroyed { unit } => {
                if let Some(def) = self.under_construction.remove(unit) {
                    tracing::info!(unit, name = %def.name, "Unit destroyed before completion");
                    self.constructors.request_destroyed(&def);
                    self.factories.request_destroyed(&def);
                    self.tanks.request_destroyed(&def);
                }
                self.apply_unit_event(host, UnitEvent::Removed { unit: *unit })
            }
            AiEvent::UnitIdle { unit } => self.unit_idle(host, *unit),
            AiEvent::UnitMoveFailed { unit } => {
                self.constructors.on_move_failed(host, *unit)?;
                Ok(())
            }
            AiEvent::Update { frame } => {
                let think = self.tanks.think_frames();
                if think > 0 && *frame > 0 && frame % think == 0 {
                    self.tanks.think(host)?;
                }
                let interval = self.config.idle_sweep_frames;
                if interval > 0 && *frame > 0 && frame % interval == 0 {
                    self.sweep_idle(host)?;
                }
                Ok(())
            }
            AiEvent::ChatMessage { text, player } => self.chat(host, text, *player),
        }
    }

    fn apply_unit_event<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        event: UnitEvent,
    ) -> Result<()> {
        if !self.units.apply(&event) {
            return Ok(());
        }
        match event {
            UnitEvent::Added { unit, def } => {
                let ctx = BuildContext {
                    build_table: &self.build_table,
                    metal_spots: &self.metal_spots,
                };
                let mut requesters: [&mut dyn UnitRequester; 1] = [&mut self.factories];
                self.constructors
                    .on_unit_added(host, &ctx, unit, &def, &mut requesters)?;
                let mut requesters: [&mut dyn UnitRequester; 2] =
                    [&mut self.constructors, &mut self.tanks];
                self.factories
                    .on_unit_added(host, &self.build_table, unit, &def, &mut requesters)?;
                self.tanks.on_unit_added(host, unit, &def)?;
            }
            UnitEvent::Removed { unit } => {
                self.constructors.on_unit_removed(unit);
                self.factories.on_unit_removed(unit);
                self.tanks.on_unit_removed(unit);
            }
        }
        Ok(())
    }

    fn unit_idle<H: AiCallback + ?Sized>(&mut self, host: &mut H, unit: UnitId) -> Result<()> {
        let ctx = BuildContext {
            build_table: &self.build_table,
            metal_spots: &self.metal_spots,
        };
        let mut requesters: [&mut dyn UnitRequester; 1] = [&mut self.factories];
        self.constructors
            .on_unit_idle(host, &ctx, unit, &mut requesters)?;
        let mut requesters: [&mut dyn UnitRequester; 2] =
            [&mut self.constructors, &mut self.tanks];
        self.factories
            .on_unit_idle(host, &self.build_table, unit, &mut requesters)?;
        self.tanks.on_unit_idle(host, unit)?;
        Ok(())
    }

    fn sweep_idle<H: AiCallback + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let builders: Vec<UnitId> = self
            .constructors
            .constructors()
            .ids()
            .into_iter()
            .chain(self.factories.factories().ids())
            .collect();
        for unit in builders {
            if !host.unit_is_busy(unit)? {
                tracing::debug!(unit, "Idle sweep found idle builder");
                self.unit_idle(host, unit)?;
            }
        }
        Ok(())
    }

    fn chat<H: AiCallback + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        player: i32,
    ) -> Result<()> {
        let command = match parse_chat(text, host.team()) {
            ChatParse::NotForUs => return Ok(()),
            ChatParse::Command(command) => command,
            ChatParse::Unknown(word) => {
                tracing::debug!(player, word = %word, "Unknown chat command");
                ChatCommand::Help
            }
        };
        tracing::info!(player, ?command, "Chat command");

        match command {
            ChatCommand::Help => {
                for line in help_text(host.team()) {
                    host.send_text_message(&line);
                }
            }
            ChatCommand::ShowNextBuildSiteOn => self.constructors.set_show_next_build_site(true),
            ChatCommand::ShowNextBuildSiteOff => {
                self.constructors.set_show_next_build_site(false);
            }
            ChatCommand::TanksCount => {
                host.send_text_message(&format!("Number tanks: {}", self.tanks.tanks().len()));
            }
            ChatCommand::DebugOn => self.set_debug(true),
            ChatCommand::DebugOff => self.set_debug(false),
        }
        Ok(())
    }

    fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
        self.constructors.set_debug(debug);
    }
}
