//! Bevy plugin for region_spawner: runs a session's spawners on the fixed timestep and
//! materializes their output as entities.
#![forbid(unsafe_code)]

use std::sync::Arc;

pub use assets::{SpawnerSetAsset, SpawnerSetAssetLoader};
use bevy::prelude::*;
pub use events::{
    EndSpawnerSession, SpawnEffect, SpawnerMessage, SpawnerMessageConfig, UnitLifecycle,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use region_spawner::config::SpawnerSetDef;
use region_spawner::definition::{SpawnerDefinition, SpawnerId};
use region_spawner::error::Result as SpawnerResult;
use region_spawner::group::SpawnerGroup;
use region_spawner::merge::MergeDecision;
use region_spawner::observer::{Observer, ObserverId, TeamId};
use region_spawner::tag::find_tag;
use region_spawner::time::Tick;
pub use world::{unit_spawnable, PendingUnit, SpawnableFactory, SpawnerWorld, UnitSpawnable};

mod assets;
mod events;
mod world;

/// Convenient re-exports for common types. Import with `use bevy_region_spawner::prelude::*;`.
///
/// Core types whose names clash with Bevy's (`Observer`, `Cuboid`, `Sphere`, `Cylinder`,
/// `Result`) are not re-exported; use them through `region_spawner` paths.
pub mod prelude {
    pub use region_spawner::config::{
        DurationDef, FilterDef, RegionDef, SpawnableDef, SpawnerDef, SpawnerSetDef,
    };
    pub use region_spawner::definition::{SpawnerDefinition, SpawnerId};
    pub use region_spawner::events::{ReleaseCause, SpawnerEvent, SpawnerEventKind};
    pub use region_spawner::group::SpawnerGroup;
    pub use region_spawner::merge::MergeDecision;
    pub use region_spawner::observer::{ObserverId, TeamId};
    pub use region_spawner::spawnable::Spawnable;
    pub use region_spawner::tag::UnitId;

    pub use crate::assets::{SpawnerSetAsset, SpawnerSetAssetLoader};
    pub use crate::events::{
        EndSpawnerSession, SpawnEffect, SpawnerMessage, SpawnerMessageConfig, UnitLifecycle,
    };
    pub use crate::world::{
        unit_spawnable, PendingUnit, SpawnableFactory, SpawnerWorld, UnitSpawnable,
    };
    pub use crate::{
        RegionSpawnerPlugin, SpawnObserver, SpawnerRng, SpawnerSession, SpawnerTick, SpawnerUnit,
    };
}

/// Bevy plugin providing assets, resources, message types, and fixed-step systems.
pub struct RegionSpawnerPlugin;

/// Spawner clock. Advanced once per `FixedUpdate`; the fixed timestep should match the
/// 20 ticks per second durations are converted with.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnerTick(pub Tick);

/// RNG used for spawn points and delays.
#[derive(Resource)]
pub struct SpawnerRng(pub StdRng);

impl SpawnerRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SpawnerRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}

/// Marks an entity (usually a player) whose [`GlobalTransform`] activates spawners.
#[derive(Component, Debug, Clone, Default)]
pub struct SpawnObserver {
    pub team: Option<TeamId>,
    /// Spectators are never tracked.
    pub spectating: bool,
}

/// Component added to each entity a spawner produced.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SpawnerUnit {
    pub unit: region_spawner::tag::UnitId,
    pub spawner: Option<SpawnerId>,
    pub kind: String,
    pub quantity: u32,
}

/// The running session's spawners.
///
/// Call [`SpawnerSession::load`] with a loaded-or-loading [`SpawnerSetAsset`]; it is
/// installed on the first fixed step after the asset is available.
#[derive(Resource, Default)]
pub struct SpawnerSession {
    pending: Option<Handle<SpawnerSetAsset>>,
    group: Option<SpawnerGroup<SpawnerWorld>>,
    resync: bool,
}

impl SpawnerSession {
    /// Replace the session with the spawners of `set` once it has loaded.
    pub fn load(&mut self, set: Handle<SpawnerSetAsset>) {
        self.pending = Some(set);
    }

    /// Replace the session with spawners built from `definitions`.
    ///
    /// Units of the previous session are detached from `world`: their entities stay, but
    /// their lifecycle messages no longer reach the new spawners.
    pub fn install(
        &mut self,
        definitions: Vec<Arc<SpawnerDefinition<SpawnerWorld>>>,
        now: Tick,
        rng: &mut StdRng,
        world: &mut SpawnerWorld,
    ) -> SpawnerResult<()> {
        let group = SpawnerGroup::from_definitions(definitions, now, rng)?;
        if self.group.replace(group).is_some() {
            debug!("Spawner session replaced; previous units detached.");
        }
        world.reset();
        self.resync = true;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.group.is_some()
    }

    pub fn group(&self) -> Option<&SpawnerGroup<SpawnerWorld>> {
        self.group.as_ref()
    }

    pub fn group_mut(&mut self) -> Option<&mut SpawnerGroup<SpawnerWorld>> {
        self.group.as_mut()
    }

    /// Answer a merge request between two item entities. Call it synchronously, before
    /// merging.
    pub fn on_merge_requested(&self, a: Entity, b: Entity, world: &SpawnerWorld) -> MergeDecision {
        let Some(group) = &self.group else {
            return MergeDecision::Allow;
        };
        match (world.unit_of(a), world.unit_of(b)) {
            (None, None) => MergeDecision::Allow,
            (Some(a), Some(b)) => group.on_merge_requested(a, b, world),
            // Only one side was spawned: never mix it with foreign stacks.
            _ => MergeDecision::Veto,
        }
    }
}

impl Plugin for RegionSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SpawnerMessage>()
            .add_message::<SpawnEffect>()
            .add_message::<UnitLifecycle>()
            .add_message::<EndSpawnerSession>()
            .init_asset::<SpawnerSetAsset>()
            .init_asset_loader::<SpawnerSetAssetLoader>()
            .init_resource::<SpawnerTick>()
            .init_resource::<SpawnerRng>()
            .init_resource::<SpawnerWorld>()
            .init_resource::<SpawnerSession>()
            .init_resource::<SpawnableFactory>()
            .init_resource::<SpawnerMessageConfig>()
            .add_systems(
                FixedUpdate,
                (
                    install_spawner_sets,
                    sync_observers,
                    apply_unit_lifecycle,
                    tick_spawners,
                    end_sessions,
                )
                    .chain(),
            )
            .add_systems(PostUpdate, track_despawned_units);
    }
}

/// Observer state captured when the observer last changed.
struct ObserverSnapshot {
    id: ObserverId,
    position: Vec3,
    team: Option<TeamId>,
    participant: bool,
}

impl Observer for ObserverSnapshot {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn position(&self) -> mint::Vector3<f32> {
        self.position.into()
    }

    fn is_participant(&self) -> bool {
        self.participant
    }

    fn team(&self) -> Option<TeamId> {
        self.team
    }
}

fn observer_id(entity: Entity) -> ObserverId {
    ObserverId(entity.to_bits())
}

fn install_spawner_sets(
    mut session: ResMut<SpawnerSession>,
    assets: Res<Assets<SpawnerSetAsset>>,
    factory: Res<SpawnableFactory>,
    tick: Res<SpawnerTick>,
    mut rng: ResMut<SpawnerRng>,
    mut world: ResMut<SpawnerWorld>,
) {
    let Some(handle) = session.pending.clone() else {
        return;
    };
    let Some(asset) = assets.get(&handle) else {
        return;
    };
    session.pending = None;

    let set = SpawnerSetDef::from(asset);
    let installed = set
        .build(|def| factory.build(def))
        .and_then(|definitions| session.install(definitions, tick.0, &mut rng.0, &mut world));
    match installed {
        Ok(()) => info!("Installed spawner set {:?}.", handle),
        Err(err) => error!("Spawner set {:?} rejected: {}", handle, err),
    }
}

fn sync_observers(
    mut session: ResMut<SpawnerSession>,
    observers: Query<(Entity, Ref<SpawnObserver>, Ref<GlobalTransform>)>,
    mut removed: RemovedComponents<SpawnObserver>,
) {
    let resync = std::mem::take(&mut session.resync);
    let Some(group) = session.group_mut() else {
        removed.clear();
        return;
    };

    for entity in removed.read() {
        group.on_observer_left(observer_id(entity));
    }

    for (entity, observer, transform) in &observers {
        if !(resync || observer.is_changed() || transform.is_changed()) {
            continue;
        }
        group.on_observer_moved(Arc::new(ObserverSnapshot {
            id: observer_id(entity),
            position: transform.translation(),
            team: observer.team,
            participant: !observer.spectating,
        }));
    }
}

fn apply_unit_lifecycle(
    mut reader: MessageReader<UnitLifecycle>,
    mut session: ResMut<SpawnerSession>,
    mut world: ResMut<SpawnerWorld>,
    config: Res<SpawnerMessageConfig>,
    mut messages: ResMut<Messages<SpawnerMessage>>,
) {
    let mut sink = config.sink();
    for lifecycle in reader.read() {
        let entity = lifecycle.entity();
        let Some(unit) = world.unit_of(entity) else {
            continue;
        };
        if let Some(group) = session.group_mut() {
            match *lifecycle {
                UnitLifecycle::Destroyed { .. } => {
                    group.on_unit_destroyed_with_events(unit, &*world, &mut sink);
                }
                UnitLifecycle::Expired { quantity, .. } => {
                    group.on_unit_expired_with_events(unit, quantity, &*world, &mut sink);
                }
                UnitLifecycle::Consumed {
                    quantity,
                    cancelled,
                    ..
                } => {
                    group.on_unit_consumed_with_events(
                        unit,
                        quantity,
                        cancelled,
                        &mut *world,
                        &mut sink,
                    );
                }
            }
        }
        if !matches!(lifecycle, UnitLifecycle::Consumed { cancelled: true, .. }) {
            world.release(entity);
        }
    }
    world.release_despawned();
    events::forward(sink, &mut messages);
}

/// Runs every frame so no removal is missed between fixed steps.
fn track_despawned_units(
    mut removed: RemovedComponents<SpawnerUnit>,
    mut world: ResMut<SpawnerWorld>,
) {
    for entity in removed.read() {
        world.mark_despawned(entity);
    }
}

#[allow(clippy::too_many_arguments)]
fn tick_spawners(
    mut commands: Commands,
    mut tick: ResMut<SpawnerTick>,
    mut session: ResMut<SpawnerSession>,
    mut world: ResMut<SpawnerWorld>,
    mut rng: ResMut<SpawnerRng>,
    config: Res<SpawnerMessageConfig>,
    mut messages: ResMut<Messages<SpawnerMessage>>,
    mut effects: ResMut<Messages<SpawnEffect>>,
) {
    tick.0 += 1;
    let Some(group) = session.group_mut() else {
        return;
    };

    let mut sink = config.sink();
    let owner = group.owner();
    group.tick_with_events(tick.0, &mut *world, &mut rng.0, &mut sink);

    for pending in world.drain_pending() {
        let spawner = find_tag(&*world, pending.unit, owner).map(|tag| tag.spawner);
        let entity = commands
            .spawn((
                SpawnerUnit {
                    unit: pending.unit,
                    spawner,
                    kind: pending.kind,
                    quantity: pending.quantity,
                },
                Transform::from_translation(pending.point),
            ))
            .id();
        world.bind(entity, pending.unit);
    }
    for point in world.drain_effects() {
        effects.write(SpawnEffect { point });
    }
    events::forward(sink, &mut messages);
}

fn end_sessions(
    mut reader: MessageReader<EndSpawnerSession>,
    mut session: ResMut<SpawnerSession>,
    config: Res<SpawnerMessageConfig>,
    mut messages: ResMut<Messages<SpawnerMessage>>,
) {
    if reader.read().count() == 0 {
        return;
    }
    let Some(group) = session.group_mut() else {
        return;
    };
    let mut sink = config.sink();
    group.on_session_end_with_events(&mut sink);
    events::forward(sink, &mut messages);
}
