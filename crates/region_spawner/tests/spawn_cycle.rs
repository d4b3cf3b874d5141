mod common;

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use common::{room, Arena, Loot, Player, Zombies};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use region_spawner::prelude::*;

fn run(
    spawner: &mut Spawner<Arena>,
    arena: &mut Arena,
    rng: &mut StdRng,
    ticks: RangeInclusive<Tick>,
) -> usize {
    ticks
        .filter(|&t| spawner.tick(t, arena, rng).fired().is_some())
        .count()
}

#[test]
fn population_cap_holds_until_units_are_picked_up() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut arena = Arena::default();
    let definition = Arc::new(
        room(0)
            .with_object(Loot { amount: 3 })
            .with_delay(Duration::from_secs(1))
            .with_max_entities(5),
    );
    let mut spawner = Spawner::try_new(definition, 0, &mut rng).expect("valid definition");
    let player = Player::new(1, Vec3::new(5.0, 1.0, 5.0));
    assert!(spawner.on_observer_moved(player.clone()));

    // Fires at 20 (3 live) and 40 (6 live, overshoot), then the cap closes the gate.
    assert_eq!(run(&mut spawner, &mut arena, &mut rng, 1..=200), 2);
    assert_eq!(spawner.live_count(), 6);
    assert_eq!(arena.stacks.len(), 2);
    assert!(!spawner.can_spawn());

    let first = *arena.stacks.keys().min().expect("two stacks");
    assert!(!spawner.on_unit_consumed(first, 3, true, &mut arena));
    assert_eq!(spawner.live_count(), 6);

    assert!(spawner.on_unit_consumed(first, 3, false, &mut arena));
    arena.remove(first);
    assert_eq!(spawner.live_count(), 3);
    assert!(find_tag(&arena, first, SPAWNER_TAG_OWNER).is_none());

    // The window elapsed long ago, so the next tick fires immediately.
    assert!(spawner.tick(201, &mut arena, &mut rng).fired().is_some());
    assert_eq!(spawner.live_count(), 6);
}

#[test]
fn units_land_inside_the_spawn_region() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut arena = Arena::default();
    let spawn_area = Cuboid::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 1.0, 2.0));
    let definition = Arc::new(
        room(0)
            .with_object(Zombies { count: 2 })
            .with_object(Loot { amount: 1 })
            .with_delay(Duration::from_millis(500)),
    );
    let mut spawner = Spawner::new(definition, 0, &mut rng);
    spawner.on_observer_moved(Player::new(1, Vec3::ZERO));

    let fires = run(&mut spawner, &mut arena, &mut rng, 1..=100);
    assert_eq!(fires, 10);
    assert_eq!(arena.mobs.len(), 20);
    assert_eq!(arena.stacks.len(), 10);
    assert_eq!(arena.effects, 20);
    assert_eq!(spawner.live_count(), 30);
    assert!(arena.mobs.values().all(|p| spawn_area.contains((*p).into())));
    assert!(arena
        .stacks
        .values()
        .all(|(p, _)| spawn_area.contains((*p).into())));
}

#[test]
fn gate_follows_observer_movement_and_teams() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut arena = Arena::default();
    let definition = Arc::new(
        room(0)
            .with_object(Loot { amount: 1 })
            .with_filter(TeamFilter::new([TeamId(2)]))
            .with_delay(Duration::from_secs(1)),
    );
    let mut spawner = Spawner::new(definition, 0, &mut rng);
    let player = Player::new(7, Vec3::new(50.0, 0.0, 0.0));

    assert!(!spawner.on_observer_moved(player.clone()));
    assert_eq!(spawner.tick(20, &mut arena, &mut rng), TickOutcome::Blocked);

    player.move_to(Vec3::new(1.0, 1.0, 1.0));
    assert!(spawner.on_observer_moved(player.clone()));
    assert_eq!(spawner.tick(21, &mut arena, &mut rng), TickOutcome::Blocked);

    // Team changes take effect without a move.
    player.join_team(2);
    assert!(spawner.tick(22, &mut arena, &mut rng).fired().is_some());

    player.move_to(Vec3::new(50.0, 0.0, 0.0));
    assert!(!spawner.on_observer_moved(player.clone()));
    assert_eq!(spawner.tick(100, &mut arena, &mut rng), TickOutcome::Blocked);
}

#[test]
fn spectators_neither_enter_nor_leave() {
    let mut rng = StdRng::seed_from_u64(14);
    let mut spawner = Spawner::new(
        Arc::new(room(0).with_object(Loot { amount: 1 })),
        0,
        &mut rng,
    );
    let player = Player::new(3, Vec3::ZERO);
    spawner.on_observer_moved(player.clone());
    player.spectate();
    player.move_to(Vec3::new(100.0, 0.0, 0.0));

    assert!(spawner.on_observer_moved(player.clone()));
    assert_eq!(spawner.observers().len(), 1);

    assert!(spawner.on_observer_left(ObserverId(3)));
    assert!(spawner.observers().is_empty());
}

#[test]
fn one_fire_emits_events_in_order() {
    let mut rng = StdRng::seed_from_u64(15);
    let mut arena = Arena::default();
    let definition = Arc::new(
        room(4)
            .with_object(Loot { amount: 2 })
            .with_object(Zombies { count: 3 })
            .with_delay(Duration::from_secs(1)),
    );
    let mut spawner = Spawner::new(definition, 0, &mut rng);
    let mut sink = VecSink::new();
    spawner.on_observer_moved_with_events(Player::new(1, Vec3::ZERO), &mut sink);
    spawner.tick_with_events(20, &mut arena, &mut rng, &mut sink);

    let kinds: Vec<_> = sink.as_slice().iter().map(SpawnerEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            SpawnerEventKind::ObserverEntered,
            SpawnerEventKind::Fired,
            SpawnerEventKind::BatchSpawned,
            SpawnerEventKind::BatchSpawned,
            SpawnerEventKind::DelayRolled,
        ]
    );
    assert!(sink
        .as_slice()
        .iter()
        .all(|e| e.spawner() == Some(SpawnerId(4))));
}

#[test]
fn group_session_round_trip() {
    let mut rng = StdRng::seed_from_u64(16);
    let mut arena = Arena::default();
    let east = SpawnerDefinition::new(
        SpawnerId(1),
        Cuboid::from_center_extent(Vec3::new(100.0, 0.0, 0.0), Vec3::splat(20.0)),
        Sphere::new(Vec3::new(100.0, 0.0, 0.0), 2.0),
    )
    .with_object(Loot { amount: 4 })
    .with_delay(Duration::from_secs(2));
    let mut group = SpawnerGroup::from_definitions(
        [
            Arc::new(
                room(0)
                    .with_object(Loot { amount: 4 })
                    .with_delay(Duration::from_secs(2)),
            ),
            Arc::new(east),
        ],
        0,
        &mut rng,
    )
    .expect("valid group");

    let west_player = Player::new(1, Vec3::ZERO);
    let east_player = Player::new(2, Vec3::new(100.0, 0.0, 0.0));
    group.on_observer_moved(west_player);
    group.on_observer_moved(east_player);

    let mut sink = VecSink::only([SpawnerEventKind::MergeVetoed, SpawnerEventKind::SessionEnded]);
    let fired = group.tick(40, &mut arena, &mut rng);
    assert_eq!(fired.len(), 2);
    let west_stack = fired[0].1.units[0];
    let east_stack = fired[1].1.units[0];

    assert!(group
        .on_merge_requested_with_events(west_stack, east_stack, &arena, &mut sink)
        .is_veto());
    let stray = arena.drop_stack(Vec3::ZERO, 1);
    let stray2 = arena.drop_stack(Vec3::ZERO, 1);
    assert!(group
        .on_merge_requested_with_events(stray, west_stack, &arena, &mut sink)
        .is_veto());
    assert_eq!(
        group.on_merge_requested_with_events(stray, stray2, &arena, &mut sink),
        MergeDecision::Allow
    );

    group.on_session_end_with_events(&mut sink);
    assert!(group.tick(1_000, &mut arena, &mut rng).is_empty());

    // Late lifecycle events after the session still release capacity.
    assert_eq!(group.on_unit_expired(east_stack, 4, &arena), Some(SpawnerId(1)));
    assert_eq!(group.live_count(SpawnerId(1)).ok(), Some(0));
    assert_eq!(group.live_count(SpawnerId(0)).ok(), Some(4));

    assert_eq!(sink.count(SpawnerEventKind::MergeVetoed), 2);
    assert_eq!(sink.count(SpawnerEventKind::SessionEnded), 1);
    assert_eq!(sink.len(), 3);
}
