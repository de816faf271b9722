//! # Simulation Context
//!
//! The one object a frame driver holds: the entity manager plus the frame
//! clock that turns wall-clock time into fixed ticks. Constructed once from a
//! [`SimulationConfig`] and passed to whatever needs it.

use std::time::{Duration, Instant};

use crate::clock::{FrameClock, TickStats};
use crate::config::SimulationConfig;
use crate::ecs::{EntityManager, FlushStats};
use crate::error::ConfigError;

/// Entity manager driven by a fixed-timestep clock.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = Simulation::new(SimulationConfig::default())?;
/// sim.entities_mut().register_dense::<Particle>(4096);
/// sim.entities_mut().add_system(move_particles);
///
/// loop {
///     let ticks = sim.advance(frame_time);
///     render(sim.entities());
/// }
/// ```
pub struct Simulation {
    entities: EntityManager,
    clock: FrameClock,
}

impl Simulation {
    /// Creates a simulation from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not validate.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            "Simulation at {} Hz, {}-bit entity ids, {:?} id recycling",
            config.clock.tick_rate,
            config.ecs.id_bits,
            config.ecs.recycling
        );

        Ok(Self {
            clock: FrameClock::new(&config.clock),
            entities: EntityManager::with_config(config.ecs),
        })
    }

    /// The entity manager.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The entity manager, mutably (registration, seeding).
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// The frame clock.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Runs exactly one fixed tick and records its duration.
    pub fn step(&mut self) -> FlushStats {
        let start = Instant::now();
        let stats = self.entities.update(self.clock.fixed_dt());
        self.clock.record_tick(start.elapsed());
        stats
    }

    /// Adds a frame's elapsed time and runs every tick that became due.
    ///
    /// Returns how many ticks ran.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            self.step();
        }
        due
    }

    /// Runs `ticks` fixed ticks back to back, ignoring wall-clock time.
    pub fn run_ticks(&mut self, ticks: u64) -> FlushStats {
        let mut total = FlushStats::default();
        for _ in 0..ticks {
            total += self.step();
        }
        total
    }

    /// Tick timing statistics.
    #[must_use]
    pub fn stats(&self) -> &TickStats {
        self.clock.stats()
    }
}
