//! Sandbox systems, registered in this order: move, collide, spawn.

use std::f32::consts::TAU;

use ember_core::{EntityId, EntityManager, System};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::components::{
    Particle, MIN_SPLIT_RADIUS, SPLIT_HP, SPLIT_SPEED, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Random direction scaled to `speed`.
pub fn random_velocity(rng: &mut impl Rng, speed: f32) -> [f32; 2] {
    let angle = rng.gen_range(0.0..TAU);
    [angle.cos() * speed, angle.sin() * speed]
}

/// Creates an entity holding `particle`.
pub fn spawn_particle(entities: &mut EntityManager, particle: Particle) -> EntityId {
    let id = entities.create_entity();
    if let Err(err) = entities.add_component(id, particle) {
        tracing::warn!("Particle not spawned: {}", err);
    }
    id
}

/// Integrates positions and bounces particles off the world edges.
pub fn move_particles(entities: &mut EntityManager, dt: f32) {
    entities.for_each::<Particle, _>(|_, particle| {
        particle.pos[0] += particle.vel[0] * dt;
        particle.pos[1] += particle.vel[1] * dt;

        let r = particle.radius;
        for (axis, extent) in [WORLD_WIDTH, WORLD_HEIGHT].into_iter().enumerate() {
            if particle.pos[axis] - r < 0.0 {
                particle.pos[axis] = r;
                particle.vel[axis] = -particle.vel[axis];
            }
            if particle.pos[axis] + r > extent {
                particle.pos[axis] = extent - r;
                particle.vel[axis] = -particle.vel[axis];
            }
        }
    });
}

fn dot(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

fn reflect(v: [f32; 2], normal: [f32; 2]) -> [f32; 2] {
    let d = 2.0 * dot(v, normal);
    [v[0] - d * normal[0], v[1] - d * normal[1]]
}

/// Resolves overlapping pairs: pushes them apart, reflects their velocities
/// along the contact normal and takes one hit point from each.
pub fn collide_particles(entities: &mut EntityManager, _dt: f32) {
    let mut particles: Vec<(EntityId, Particle)> = entities
        .store::<Particle>()
        .iter()
        .map(|(id, particle)| (id, *particle))
        .collect();

    let mut hits = 0usize;
    for i in 0..particles.len() {
        let (head, tail) = particles.split_at_mut(i + 1);
        let a = &mut head[i].1;
        for (_, b) in tail.iter_mut() {
            let delta = [b.pos[0] - a.pos[0], b.pos[1] - a.pos[1]];
            let dist2 = dot(delta, delta);
            let reach = a.radius + b.radius;
            if dist2 >= reach * reach {
                continue;
            }

            let mut dist = dist2.sqrt();
            if dist == 0.0 {
                dist = 0.01;
            }
            let normal = [delta[0] / dist, delta[1] / dist];
            let overlap = 0.5 * (reach - dist);

            a.pos[0] -= normal[0] * overlap;
            a.pos[1] -= normal[1] * overlap;
            b.pos[0] += normal[0] * overlap;
            b.pos[1] += normal[1] * overlap;

            a.vel = reflect(a.vel, normal);
            b.vel = reflect(b.vel, [-normal[0], -normal[1]]);
            a.hp -= 1;
            b.hp -= 1;
            hits += 1;
        }
    }

    let store = entities.store_mut::<Particle>();
    for (id, particle) in particles {
        if let Some(slot) = store.get_component_mut(id) {
            *slot = particle;
        }
    }
    if hits > 0 {
        tracing::trace!("{} collisions", hits);
    }
}

/// Destroys dead particles and splits the large ones in two.
pub struct SpawnSystem {
    rng: ChaCha8Rng,
}

impl SpawnSystem {
    /// Creates the system with its own random stream.
    #[must_use]
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl System for SpawnSystem {
    fn update(&mut self, entities: &mut EntityManager, _dt: f32) {
        let rng = &mut self.rng;
        entities.for_each_entity::<Particle, _>(|entities, id| {
            let Some(particle) = entities.get_component::<Particle>(id).copied() else {
                return;
            };
            if particle.hp > 0 {
                return;
            }
            if entities.destroy_entity(id).is_err() || particle.radius <= MIN_SPLIT_RADIUS {
                return;
            }

            let radius = particle.radius / 2.0;
            for _ in 0..2 {
                spawn_particle(
                    entities,
                    Particle {
                        pos: particle.pos,
                        vel: random_velocity(&mut *rng, SPLIT_SPEED),
                        radius,
                        hp: SPLIT_HP,
                    },
                );
            }
        });
    }

    fn name(&self) -> &str {
        "spawn"
    }
}
