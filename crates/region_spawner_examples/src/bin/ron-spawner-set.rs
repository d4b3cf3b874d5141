use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use region_spawner::prelude::*;
use region_spawner_examples::{init_tracing, Arena, Walker};
use tracing::info;

const SET: &str = include_str!("../../assets/arena.spawner");

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Pass a path to load another set.
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SET.to_owned(),
    };
    let set: SpawnerSetDef = ron::from_str(&text)?;
    let definitions = set.build(Arena::spawnable)?;

    let mut rng = StdRng::seed_from_u64(7);
    let mut arena = Arena::default();
    let mut group = SpawnerGroup::from_definitions(definitions, 0, &mut rng)?;

    let player = Walker::new(1, Some(1), Vec3::new(30.0, 0.0, 0.0));
    group.on_observer_moved(player.clone());

    let mut sink = VecSink::only([SpawnerEventKind::BatchSpawned, SpawnerEventKind::Warning]);
    for now in 1..=to_ticks(std::time::Duration::from_secs(30)) {
        group.tick_with_events(now, &mut arena, &mut rng, &mut sink);
    }

    for event in sink.as_slice() {
        if let SpawnerEvent::BatchSpawned {
            spawner,
            point,
            count,
            ..
        } = event
        {
            info!("spawner {} produced {} at {:?}", spawner, count, point);
        }
    }
    for spawner in group.iter() {
        info!(
            "{}: live {} / {}",
            spawner.definition().display_name(),
            spawner.live_count(),
            spawner.definition().max_entities
        );
    }

    Ok(())
}
