use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use region_spawner::prelude::*;
use region_spawner_examples::{init_tracing, Arena, Loot, Mobs, Walker};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(2025);
    let mut arena = Arena::default();

    // An armory in the west and a graveyard for team 1 in the east.
    let armory = SpawnerDefinition::new(
        SpawnerId(0),
        Cylinder::new(Vec3::new(-30.0, 0.0, 0.0), 10.0, 4.0),
        Cuboid::from_center_extent(Vec3::new(-30.0, 0.5, 0.0), Vec3::new(4.0, 1.0, 4.0)),
    )
    .with_name("armory")
    .with_object(Loot {
        kind: "arrow".into(),
        amount: 16,
    })
    .with_delay(Duration::from_secs(3))
    .with_max_entities(64);

    let graveyard = SpawnerDefinition::new(
        SpawnerId(1),
        Sphere::new(Vec3::new(30.0, 0.0, 0.0), 15.0),
        Sphere::new(Vec3::new(30.0, 0.0, 0.0), 5.0),
    )
    .with_name("graveyard")
    .with_filter(TeamFilter::new([TeamId(1)]))
    .with_object(Mobs {
        kind: "zombie".into(),
        count: 2,
    })
    .with_delay_range(Duration::from_secs(2), Duration::from_secs(6))
    .with_max_entities(8);

    let mut group =
        SpawnerGroup::from_definitions([Arc::new(armory), Arc::new(graveyard)], 0, &mut rng)?;

    let walkers = [
        (Walker::new(1, Some(1), Vec3::ZERO), Vec3::new(-30.0, 0.0, 0.0)),
        (Walker::new(2, Some(2), Vec3::ZERO), Vec3::new(30.0, 0.0, 0.0)),
        (Walker::new(3, Some(1), Vec3::new(60.0, 0.0, 0.0)), Vec3::new(30.0, 0.0, 0.0)),
    ];

    let mut sink = VecSink::only([SpawnerEventKind::Fired, SpawnerEventKind::Released]);
    let one_minute = to_ticks(Duration::from_secs(60));
    for now in 1..=one_minute {
        for (walker, target) in &walkers {
            walker.step_towards(*target, 0.25);
            group.on_observer_moved_with_events(walker.clone(), &mut sink);
        }
        group.tick_with_events(now, &mut arena, &mut rng, &mut sink);

        // Every five seconds player 1 picks up what lies around them and team 1 kills a
        // zombie.
        if now % (5 * TICKS_PER_SECOND) == 0 {
            let here = walkers[0].0.location();
            for (unit, amount) in arena.stacks_near(here, 6.0) {
                group.on_unit_consumed_with_events(unit, amount, false, &mut arena, &mut sink);
                arena.remove(unit);
            }
            let zombie = arena.mobs.keys().next().copied();
            if let Some(zombie) = zombie {
                group.on_unit_destroyed_with_events(zombie, &arena, &mut sink);
                arena.remove(zombie);
            }
        }
    }

    // A dropped stack must never merge into a spawned one.
    let dropped = arena.drop_stack(Vec3::new(-30.0, 0.0, 0.0), 3);
    if let Some(&spawned) = arena.stacks.keys().find(|id| **id != dropped) {
        let decision = group.on_merge_requested(dropped, spawned, &arena);
        info!("Merging dropped {} into {}: {:?}", dropped, spawned, decision);
    }

    group.on_session_end();
    for spawner in group.iter() {
        info!(
            "{}: live={} observers={} next fire at tick {}",
            spawner.definition().display_name(),
            spawner.live_count(),
            spawner.observers().len(),
            spawner.next_fire_tick()
        );
    }
    info!(
        "fires={} releases={} effects={} stacks={} mobs={}",
        sink.count(SpawnerEventKind::Fired),
        sink.count(SpawnerEventKind::Released),
        arena.effects,
        arena.stacks.len(),
        arena.mobs.len()
    );

    Ok(())
}
