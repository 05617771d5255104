//! World-space math.
//!
//! The host engine reports positions as three `f64` components with `y`
//! as the vertical axis. Ground distances for scoring use all three.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (height).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Offset along the ground plane, keeping the height.
    #[must_use]
    pub fn offset_ground(self, dx: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y,
            z: self.z + dz,
        }
    }

    /// Components as host command parameters.
    #[must_use]
    pub const fn to_params(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Position::new(3.0, 0.0, 0.0);
        let b = Position::new(0.0, 0.0, 4.0);
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_distance_includes_height() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(0.0, 12.0, 5.0);
        assert_eq!(a.distance(b), 13.0);
    }

    #[test]
    fn test_offset_ground_keeps_height() {
        let p = Position::new(10.0, 7.0, 10.0).offset_ground(-5.0, 3.0);
        assert_eq!(p, Position::new(5.0, 7.0, 13.0));
    }

    #[test]
    fn test_add_sub() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Position::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Position::new(3.0, 3.0, 3.0));
    }
}
