//! # Systems
//!
//! A system is a per-tick pass over the entity manager. Systems run in
//! registration order, one after another, and the end-of-tick flush runs
//! after the last one.

use super::manager::EntityManager;

/// Per-tick update pass.
///
/// Implemented for any `FnMut(&mut EntityManager, f32)` closure, so simple
/// systems need no type of their own.
///
/// # Example
///
/// ```rust,ignore
/// struct Gravity(f32);
///
/// impl System for Gravity {
///     fn update(&mut self, entities: &mut EntityManager, dt: f32) {
///         let g = self.0;
///         entities.for_each::<Velocity, _>(|_, vel| vel.y -= g * dt);
///     }
/// }
/// ```
pub trait System: 'static {
    /// Runs one tick. `dt` is the tick duration in seconds.
    fn update(&mut self, entities: &mut EntityManager, dt: f32);

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> System for F
where
    F: FnMut(&mut EntityManager, f32) + 'static,
{
    fn update(&mut self, entities: &mut EntityManager, dt: f32) {
        self(entities, dt);
    }
}
