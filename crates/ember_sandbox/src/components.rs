//! Sandbox components and world bounds.

/// Width of the simulated area.
pub const WORLD_WIDTH: f32 = 1600.0;

/// Height of the simulated area.
pub const WORLD_HEIGHT: f32 = 900.0;

/// Speed of freshly split particles.
pub const SPLIT_SPEED: f32 = 150.0;

/// Particles at or below this radius do not split when they die.
pub const MIN_SPLIT_RADIUS: f32 = 5.0;

/// Hit points of freshly split particles.
pub const SPLIT_HP: i32 = 5;

/// A bouncing disc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Centre.
    pub pos: [f32; 2],
    /// Velocity in units per second.
    pub vel: [f32; 2],
    /// Radius.
    pub radius: f32,
    /// Collisions left before the particle dies.
    pub hp: i32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: [0.0; 2],
            vel: [0.0; 2],
            radius: 1.0,
            hp: 1,
        }
    }
}
