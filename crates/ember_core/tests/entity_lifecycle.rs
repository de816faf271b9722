//! # Entity Lifecycle Tests
//!
//! Id issuing and recycling, teardown, system ordering and in-tick walks,
//! driven through the public `EntityManager` API.
//!
//! Run with: cargo test -p ember_core --test entity_lifecycle

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ember_core::{EcsConfig, EcsError, EntityId, EntityManager, IdRecycling, System};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Health(i32);

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Poisoned;

fn manager(recycling: IdRecycling) -> EntityManager {
    let mut entities = EntityManager::with_config(EcsConfig {
        recycling,
        ..EcsConfig::default()
    });
    entities.register_dense::<Position>(1024);
    entities.register_dense::<Health>(1024);
    entities.register_sparse::<Poisoned>();
    entities
}

// ============================================================================
// ID RECYCLING
// ============================================================================

#[test]
fn destroyed_id_comes_back() {
    let mut entities = manager(IdRecycling::Immediate);
    let ids: Vec<EntityId> = (0..10).map(|_| entities.create_entity()).collect();

    let victim = ids[4];
    entities.destroy_entity(victim).unwrap();
    entities.destroy_entity(ids[7]).unwrap();

    // Free list depth is 2; the victim comes back within 2 creations.
    let reissued: Vec<EntityId> = (0..2).map(|_| entities.create_entity()).collect();
    assert!(reissued.contains(&victim));
}

#[test]
fn alive_ids_are_never_reissued() {
    let mut entities = manager(IdRecycling::Immediate);
    let mut alive = HashSet::new();

    for round in 0..50u32 {
        for _ in 0..8 {
            let id = entities.create_entity();
            assert!(alive.insert(id), "id {id} issued while alive");
        }
        // Destroy a rotating subset.
        let doomed: Vec<EntityId> = alive
            .iter()
            .copied()
            .filter(|id| (id.index() + round) % 3 == 0)
            .collect();
        for id in doomed {
            entities.destroy_entity(id).unwrap();
            alive.remove(&id);
        }
        entities.update(0.016);
    }

    assert_eq!(entities.alive_count(), alive.len());
    assert!(alive.iter().all(|&id| entities.is_entity_alive(id)));
}

#[test]
fn double_destroy_does_not_duplicate_free_id() {
    let mut entities = manager(IdRecycling::Immediate);
    let a = entities.create_entity();
    entities.destroy_entity(a).unwrap();
    assert_eq!(entities.destroy_entity(a), Err(EcsError::DeadEntity(a)));

    let first = entities.create_entity();
    let second = entities.create_entity();
    assert_eq!(first, a);
    assert_ne!(second, a);
}

#[test]
fn immediate_recycling_exposes_stale_components_until_flush() {
    let mut entities = manager(IdRecycling::Immediate);
    let old = entities.create_entity();
    entities.add_component(old, Health(7)).unwrap();
    entities.flush();

    entities.destroy_entity(old).unwrap();
    let new = entities.create_entity();
    assert_eq!(new, old);

    // The old entity's component is still committed for the reissued id.
    assert!(entities.has_component::<Health>(new));
    assert!(matches!(
        entities.add_component(new, Health(1)),
        Ok(())
    ));

    entities.update(0.016);
    assert_eq!(entities.get_component::<Health>(new), Some(&Health(1)));
}

#[test]
fn after_flush_recycling_waits_for_teardown() {
    let mut entities = manager(IdRecycling::AfterFlush);
    let old = entities.create_entity();
    entities.add_component(old, Health(7)).unwrap();
    entities.flush();

    entities.destroy_entity(old).unwrap();
    let other = entities.create_entity();
    assert_ne!(other, old);

    entities.update(0.016);
    let reissued = entities.create_entity();
    assert_eq!(reissued, old);
    assert!(!entities.has_component::<Health>(reissued));
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn destroy_strips_every_store() {
    let mut entities = manager(IdRecycling::Immediate);
    let e = entities.create_entity();
    entities.add_component(e, Position { x: 1.0, y: 2.0 }).unwrap();
    entities.add_component(e, Health(3)).unwrap();
    entities.add_component(e, Poisoned).unwrap();
    entities.flush();

    // A removal already queued by the caller is not queued twice.
    entities.remove_component::<Health>(e).unwrap();
    entities.destroy_entity(e).unwrap();

    let stats = entities.flush();
    assert_eq!(stats.removed, 3);
    assert!(!entities.has_component::<Position>(e));
    assert!(!entities.has_component::<Health>(e));
    assert!(!entities.has_component::<Poisoned>(e));
}

#[test]
fn destroy_discards_queued_additions() {
    let mut entities = manager(IdRecycling::Immediate);
    let e = entities.create_entity();
    entities.add_component(e, Poisoned).unwrap();
    entities.add_component(e, Health(1)).unwrap();
    entities.destroy_entity(e).unwrap();

    let stats = entities.flush();
    assert_eq!(stats.added, 0);
    assert!(entities.store::<Health>().is_empty());
    assert!(entities.store::<Poisoned>().is_empty());
}

// ============================================================================
// SYSTEMS
// ============================================================================

struct Recorder {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl System for Recorder {
    fn update(&mut self, entities: &mut EntityManager, _dt: f32) {
        self.log
            .borrow_mut()
            .push(format!("{}@{}", self.label, entities.tick()));
    }

    fn name(&self) -> &str {
        self.label
    }
}

#[test]
fn systems_run_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut entities = manager(IdRecycling::Immediate);
    for label in ["input", "physics", "render"] {
        entities.add_system(Recorder {
            label,
            log: Rc::clone(&log),
        });
    }

    entities.update(0.016);
    entities.update(0.016);

    assert_eq!(
        *log.borrow(),
        vec!["input@0", "physics@0", "render@0", "input@1", "physics@1", "render@1"]
    );
}

#[test]
fn system_added_mid_tick_runs_next_tick() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut entities = manager(IdRecycling::Immediate);

    let spawner_log = Rc::clone(&log);
    let mut added = false;
    entities.add_system(move |entities: &mut EntityManager, _dt: f32| {
        spawner_log.borrow_mut().push(format!("spawner@{}", entities.tick()));
        if !added {
            added = true;
            entities.add_system(Recorder {
                label: "late",
                log: Rc::clone(&spawner_log),
            });
        }
    });

    entities.update(0.016);
    assert_eq!(entities.system_count(), 2);
    entities.update(0.016);

    assert_eq!(*log.borrow(), vec!["spawner@0", "spawner@1", "late@1"]);
}

#[test]
fn mutations_from_systems_become_visible_next_tick() {
    let mut entities = manager(IdRecycling::Immediate);
    let e = entities.create_entity();
    entities.add_component(e, Health(10)).unwrap();
    entities.flush();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_by_system = Rc::clone(&seen);
    entities.add_system(move |entities: &mut EntityManager, _dt: f32| {
        seen_by_system
            .borrow_mut()
            .push(entities.has_component::<Poisoned>(e));
        if !entities.has_component::<Poisoned>(e) {
            entities.add_component(e, Poisoned).unwrap();
            // Not visible within the same tick.
            assert!(!entities.has_component::<Poisoned>(e));
        }
    });

    entities.update(0.016);
    entities.update(0.016);
    assert_eq!(*seen.borrow(), vec![false, true]);
}

// ============================================================================
// WALKS
// ============================================================================

#[test]
fn for_each_entity_visits_ascending_and_skips_new_entities() {
    let mut entities = manager(IdRecycling::Immediate);
    let ids: Vec<EntityId> = (0..6).map(|_| entities.create_entity()).collect();
    for &id in ids.iter().rev() {
        entities.add_component(id, Health(1)).unwrap();
    }
    entities.flush();

    let mut visited = Vec::new();
    entities.for_each_entity::<Health, _>(|entities, id| {
        visited.push(id.index());
        if let Some(health) = entities.get_component_mut::<Health>(id) {
            health.0 += 1;
        }

        // Spawn a child for each visited entity; the walk must not see it.
        let child = entities.create_entity();
        entities.add_component(child, Health(100)).unwrap();
    });

    assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
    assert!(ids
        .iter()
        .all(|&id| entities.get_component::<Health>(id) == Some(&Health(2))));

    entities.flush();
    assert_eq!(entities.store::<Health>().len(), 12);
}

#[test]
fn walk_reads_committed_values_of_walked_type() {
    let mut entities = manager(IdRecycling::Immediate);
    for hp in [10, 20] {
        let e = entities.create_entity();
        entities.add_component(e, Health(hp)).unwrap();
    }
    entities.flush();

    let mut seen = Vec::new();
    entities.for_each_entity::<Health, _>(|entities, id| {
        let total: i32 = entities
            .store::<Health>()
            .iter()
            .map(|(_, health)| health.0)
            .sum();
        seen.push((id.index(), entities.get_component::<Health>(id).copied(), total));
    });

    assert_eq!(
        seen,
        vec![(0, Some(Health(10)), 30), (1, Some(Health(20)), 30)]
    );
}

#[test]
fn nested_walk_writes_are_kept() {
    let mut entities = manager(IdRecycling::Immediate);
    for hp in [10, 20] {
        let e = entities.create_entity();
        entities.add_component(e, Health(hp)).unwrap();
    }
    entities.flush();

    let mut seen = Vec::new();
    entities.for_each_entity::<Health, _>(|entities, id| {
        entities.for_each::<Health, _>(|_, health| health.0 += 1);
        seen.push(entities.get_component::<Health>(id).copied());
    });

    assert_eq!(seen, vec![Some(Health(11)), Some(Health(22))]);
    let values: Vec<i32> = entities
        .store::<Health>()
        .iter()
        .map(|(_, health)| health.0)
        .collect();
    assert_eq!(values, vec![12, 22]);
}

#[test]
fn for_each_entity_may_destroy_and_remove() {
    let mut entities = manager(IdRecycling::Immediate);
    for hp in [5, 0, 3, 0] {
        let e = entities.create_entity();
        entities.add_component(e, Health(hp)).unwrap();
        entities.add_component(e, Position::default()).unwrap();
    }
    entities.flush();

    entities.for_each_entity::<Health, _>(|entities, id| {
        let hp = entities.get_component::<Health>(id).map_or(0, |health| health.0);
        if hp <= 0 {
            entities.destroy_entity(id).unwrap();
        } else {
            entities.remove_component::<Position>(id).unwrap();
        }
    });

    // Nothing applied mid-walk.
    assert_eq!(entities.store::<Health>().len(), 4);

    entities.flush();
    let survivors: Vec<u32> = entities
        .store::<Health>()
        .iter()
        .map(|(id, _)| id.index())
        .collect();
    assert_eq!(survivors, vec![0, 2]);
    assert!(entities.store::<Position>().is_empty());
    assert_eq!(entities.alive_count(), 2);
}

#[test]
fn flush_inside_walk_is_refused() {
    let mut entities = manager(IdRecycling::Immediate);
    let e = entities.create_entity();
    entities.add_component(e, Health(1)).unwrap();
    entities.flush();

    entities.for_each_entity::<Health, _>(|entities, id| {
        entities.remove_component::<Health>(id).unwrap();
        let stats = entities.flush();
        assert!(stats.is_empty());
        assert!(entities.has_component::<Health>(id));
    });

    entities.flush();
    assert!(!entities.has_component::<Health>(e));
}

#[test]
fn for_each_mutates_in_place() {
    let mut entities = manager(IdRecycling::Immediate);
    let e = entities.create_entity();
    entities
        .add_component(e, Position { x: 1.5, y: -2.0 })
        .unwrap();
    entities.flush();

    entities.for_each::<Position, _>(|_, position| {
        position.x *= 2.0;
    });

    assert_eq!(
        entities.get_component::<Position>(e),
        Some(&Position { x: 3.0, y: -2.0 })
    );
}
