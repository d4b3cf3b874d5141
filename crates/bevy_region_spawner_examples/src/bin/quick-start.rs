use std::time::Duration;

use bevy::prelude::*;
use bevy_region_spawner::prelude::*;

#[derive(Resource, Default)]
struct SetHandle(Handle<SpawnerSetAsset>);

/// Player marker for the walking system.
#[derive(Component)]
struct Player;

fn main() {
    App::new()
        .init_resource::<SetHandle>()
        .add_plugins(DefaultPlugins)
        // Spawner delays are authored at 20 ticks per second.
        .insert_resource(Time::<Fixed>::from_duration(Duration::from_millis(50)))
        .add_plugins(RegionSpawnerPlugin)
        .add_systems(Startup, (load_set, spawn_player))
        .add_systems(Update, (walk_player, pick_up_loot, log_messages))
        .run();
}

/// Loads the spawner set and hands it to the session.
fn load_set(
    mut handle: ResMut<SetHandle>,
    assets: Res<AssetServer>,
    mut session: ResMut<SpawnerSession>,
) {
    handle.0 = assets.load("arena.spawner");
    session.load(handle.0.clone());
}

fn spawn_player(mut commands: Commands) {
    commands.spawn((
        Player,
        SpawnObserver {
            team: Some(TeamId(1)),
            spectating: false,
        },
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));
}

/// Walks the player back and forth between the armory and the graveyard.
fn walk_player(time: Res<Time>, mut players: Query<&mut Transform, With<Player>>) {
    for mut transform in &mut players {
        transform.translation.x = (time.elapsed_secs() * 0.2).sin() * 40.0;
    }
}

/// Picks up every spawned stack within reach of the player.
fn pick_up_loot(
    mut commands: Commands,
    players: Query<&Transform, With<Player>>,
    units: Query<(Entity, &SpawnerUnit, &Transform)>,
    mut lifecycle: MessageWriter<UnitLifecycle>,
) {
    for player in &players {
        for (entity, unit, transform) in &units {
            if unit.kind == "zombie" || transform.translation.distance(player.translation) > 3.0 {
                continue;
            }
            lifecycle.write(UnitLifecycle::Consumed {
                entity,
                quantity: unit.quantity,
                cancelled: false,
            });
            commands.entity(entity).despawn();
        }
    }
}

fn log_messages(mut messages: MessageReader<SpawnerMessage>) {
    for message in messages.read() {
        info!("{:?}", message.event);
    }
}
