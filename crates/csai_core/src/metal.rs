//! Known metal extraction spots.

use crate::math::Position;

/// Metal spots reported by the host at startup.
#[derive(Debug, Clone, Default)]
pub struct MetalSpots {
    spots: Vec<Position>,
}

impl MetalSpots {
    /// Create from a list of spots.
    #[must_use]
    pub fn new(spots: Vec<Position>) -> Self {
        Self { spots }
    }

    /// Closest spot to `position` on the ground plane.
    ///
    /// Ties keep the first spot in host order.
    #[must_use]
    pub fn nearest(&self, position: Position) -> Option<Position> {
        let ground = |p: Position| {
            let dx = p.x - position.x;
            let dz = p.z - position.z;
            dx * dx + dz * dz
        };
        let mut best: Option<(Position, f64)> = None;
        for &spot in &self.spots {
            let d = ground(spot);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((spot, d));
            }
        }
        best.map(|(spot, _)| spot)
    }

    /// Number of spots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// Whether the map has no spots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}
