//! # Ember Sandbox
//!
//! Headless particle stress test for the entity manager. Large particles
//! bounce around, lose a hit point per collision, and split in two when they
//! die until they are too small to split.
//!
//! ```bash
//! # 600 ticks with the default configuration
//! ember_sandbox
//!
//! # 3000 ticks, configuration from a file, debug logging
//! RUST_LOG=debug ember_sandbox 3000 sandbox.toml
//! ```

mod components;
mod systems;

use std::path::PathBuf;
use std::time::Instant;

use ember_core::{Simulation, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use components::{Particle, WORLD_HEIGHT, WORLD_WIDTH};
use systems::{collide_particles, move_particles, random_velocity, spawn_particle, SpawnSystem};

/// Ticks run when none are given on the command line.
const DEFAULT_TICKS: u64 = 600;

/// Particles alive at startup.
const INITIAL_PARTICLES: usize = 300;

/// Dense store capacity. Every initial particle can split twice.
const PARTICLE_CAPACITY: usize = 2048;

/// Seed for every random stream.
const SEED: u64 = 1234;

/// Ticks between population reports.
const REPORT_INTERVAL: u64 = 60;

/// Command line: `[TICKS] [CONFIG]`.
struct Args {
    ticks: u64,
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let ticks = match args.next() {
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("invalid tick count: {raw}"))?,
            None => DEFAULT_TICKS,
        };
        Ok(Self {
            ticks,
            config: args.next().map(PathBuf::from),
        })
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    let mut sim = Simulation::new(config)?;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let entities = sim.entities_mut();
    entities.register_dense::<Particle>(PARTICLE_CAPACITY);
    for _ in 0..INITIAL_PARTICLES {
        spawn_particle(
            entities,
            Particle {
                pos: [
                    rng.gen_range(0.0..WORLD_WIDTH),
                    rng.gen_range(0.0..WORLD_HEIGHT),
                ],
                vel: random_velocity(&mut rng, 150.0),
                radius: 20.0,
                hp: rng.gen_range(20..40),
            },
        );
    }
    entities.flush();

    entities.add_system(move_particles);
    entities.add_system(collide_particles);
    entities.add_system(SpawnSystem::new(ChaCha8Rng::seed_from_u64(SEED + 1)));

    tracing::info!(
        "Seeded {} particles, running {} ticks",
        sim.entities().store::<Particle>().len(),
        args.ticks
    );

    let start = Instant::now();
    for tick in 1..=args.ticks {
        sim.step();
        if tick % REPORT_INTERVAL == 0 {
            tracing::info!(
                "tick {:>5}: {:>4} particles, {:>4} entities alive",
                tick,
                sim.entities().store::<Particle>().len(),
                sim.entities().alive_count()
            );
        }
    }

    let stats = sim.stats();
    tracing::info!(
        "Done in {:?}: {} particles left, tick min/avg/max {}/{}/{} us, {} late",
        start.elapsed(),
        sim.entities().store::<Particle>().len(),
        stats.min_tick_us,
        stats.avg_tick_us,
        stats.max_tick_us,
        stats.late_ticks
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("usage: ember_sandbox [TICKS] [CONFIG]");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&args) {
        tracing::error!("Sandbox failed: {}", err);
        std::process::exit(1);
    }
}
