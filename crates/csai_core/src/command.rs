//! Orders the AI gives to units.
//!
//! [`Order`] is the closed set of orders this AI issues. Each variant
//! carries only what it needs. [`Order::to_wire`] is the single place
//! where orders become host commands.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::{AiCallback, UnitId};
use crate::math::Position;

/// Host command id: stop all actions.
pub const CMD_STOP: i32 = 0;
/// Host command id: move to a position.
pub const CMD_MOVE: i32 = 10;
/// Host command id: attack a unit.
pub const CMD_ATTACK: i32 = 20;
/// Host command id: guard a unit.
pub const CMD_GUARD: i32 = 25;
/// Host command id: self-destruct.
pub const CMD_SELFD: i32 = 65;
/// Host command id: reclaim features in an area.
pub const CMD_RECLAIM: i32 = 90;

/// An order for a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Order {
    /// Build a unit type at a position.
    Build {
        /// Definition id of the unit to build.
        unit_def_id: i32,
        /// Build site.
        position: Position,
    },
    /// Attack a specific unit.
    Attack {
        /// Unit to attack.
        target: UnitId,
    },
    /// Move to a position.
    MoveTo {
        /// Destination.
        position: Position,
    },
    /// Guard another unit.
    Guard {
        /// Unit to guard.
        target: UnitId,
    },
    /// Reclaim features around a position.
    Reclaim {
        /// Centre of the reclaim area.
        position: Position,
        /// Radius of the reclaim area.
        radius: f64,
    },
    /// Self-destruct.
    SelfDestruct,
    /// Stop all actions.
    Stop,
}

/// A command in the host's native shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireCommand {
    /// Command id; negative ids are build orders for that unit definition.
    pub id: i32,
    /// Positional parameters.
    pub params: Vec<f64>,
}

impl Order {
    /// Convert to the host command format.
    #[must_use]
    pub fn to_wire(&self) -> WireCommand {
        match self {
            Self::Build {
                unit_def_id,
                position,
            } => WireCommand {
                id: -unit_def_id,
                params: position.to_params().to_vec(),
            },
            Self::Attack { target } => WireCommand {
                id: CMD_ATTACK,
                params: vec![f64::from(*target)],
            },
            Self::MoveTo { position } => WireCommand {
                id: CMD_MOVE,
                params: position.to_params().to_vec(),
            },
            Self::Guard { target } => WireCommand {
                id: CMD_GUARD,
                params: vec![f64::from(*target)],
            },
            Self::Reclaim { position, radius } => {
                let [x, y, z] = position.to_params();
                WireCommand {
                    id: CMD_RECLAIM,
                    params: vec![x, y, z, *radius],
                }
            }
            Self::SelfDestruct => WireCommand {
                id: CMD_SELFD,
                params: Vec::new(),
            },
            Self::Stop => WireCommand {
                id: CMD_STOP,
                params: Vec::new(),
            },
        }
    }
}

/// Issue `order` to `unit` through the host.
///
/// Returns the order so callers can report what they did.
pub fn give_order<H: AiCallback + ?Sized>(
    host: &mut H,
    unit: UnitId,
    order: Order,
) -> Result<Order> {
    tracing::info!(unit, ?order, "Giving order");
    host.give_order(unit, order.to_wire())?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uses_negated_def_id() {
        let order = Order::Build {
            unit_def_id: 42,
            position: Position::new(1.0, 2.0, 3.0),
        };
        let wire = order.to_wire();
        assert_eq!(wire.id, -42);
        assert_eq!(wire.params, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reclaim_carries_radius() {
        let order = Order::Reclaim {
            position: Position::new(100.0, 0.0, 50.0),
            radius: 10.0,
        };
        let wire = order.to_wire();
        assert_eq!(wire.id, CMD_RECLAIM);
        assert_eq!(wire.params, vec![100.0, 0.0, 50.0, 10.0]);
    }

    #[test]
    fn test_target_orders() {
        assert_eq!(
            Order::Attack { target: 9 }.to_wire(),
            WireCommand {
                id: CMD_ATTACK,
                params: vec![9.0]
            }
        );
        assert_eq!(Order::Guard { target: 3 }.to_wire().id, CMD_GUARD);
    }

    #[test]
    fn test_parameterless_orders() {
        assert_eq!(Order::Stop.to_wire().id, CMD_STOP);
        assert!(Order::Stop.to_wire().params.is_empty());
        assert_eq!(Order::SelfDestruct.to_wire().id, CMD_SELFD);
        assert_eq!(
            Order::MoveTo {
                position: Position::ZERO
            }
            .to_wire()
            .id,
            CMD_MOVE
        );
    }
}
