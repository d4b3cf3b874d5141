use std::collections::HashMap;

use bevy::prelude::*;
use mint::Vector3;
use region_spawner::config::SpawnableDef;
use region_spawner::error::Result;
use region_spawner::spawnable::{SpawnWorld, Spawnable, SpawnedUnit};
use region_spawner::tag::{TagOwner, TagStore, TagTable, UnitId, UnitTag};

/// A unit produced during a tick, waiting to be spawned as an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUnit {
    pub unit: UnitId,
    pub kind: String,
    pub quantity: u32,
    pub point: Vec3,
}

/// Host world the spawners write into.
///
/// Spawnables cannot reach [`Commands`], so they reserve a [`UnitId`] and queue a
/// [`PendingUnit`]; the tick system turns the queue into entities right after the spawners
/// ran and binds each entity to its unit.
#[derive(Resource, Default)]
pub struct SpawnerWorld {
    tags: TagTable,
    pending: Vec<PendingUnit>,
    effects: Vec<Vec3>,
    entities: HashMap<Entity, UnitId>,
    despawned: Vec<Entity>,
    next_unit: u64,
}

impl SpawnerWorld {
    /// Reserve an id for a unit of `kind` at `point`.
    pub fn reserve(&mut self, kind: &str, quantity: u32, point: Vec3) -> UnitId {
        let unit = UnitId(self.next_unit);
        self.next_unit += 1;
        self.pending.push(PendingUnit {
            unit,
            kind: kind.to_owned(),
            quantity,
            point,
        });
        unit
    }

    /// Unit bound to `entity`, if it was spawned by a spawner.
    pub fn unit_of(&self, entity: Entity) -> Option<UnitId> {
        self.entities.get(&entity).copied()
    }

    pub fn pending(&self) -> &[PendingUnit] {
        &self.pending
    }

    pub(crate) fn bind(&mut self, entity: Entity, unit: UnitId) {
        self.entities.insert(entity, unit);
    }

    /// Drop the entity binding and every tag of its unit.
    pub(crate) fn release(&mut self, entity: Entity) {
        if let Some(unit) = self.entities.remove(&entity) {
            self.tags.forget(unit);
        }
    }

    /// Queue a bound entity that was despawned for [`SpawnerWorld::release_despawned`].
    pub(crate) fn mark_despawned(&mut self, entity: Entity) {
        if self.entities.contains_key(&entity) {
            self.despawned.push(entity);
        }
    }

    /// Release every entity queued by [`SpawnerWorld::mark_despawned`] that no lifecycle
    /// message released first.
    pub(crate) fn release_despawned(&mut self) {
        for entity in std::mem::take(&mut self.despawned) {
            self.release(entity);
        }
    }

    /// Detach every unit of the previous session. Unit ids keep counting up.
    pub(crate) fn reset(&mut self) {
        self.tags.clear();
        self.entities.clear();
        self.despawned.clear();
        self.pending.clear();
        self.effects.clear();
    }

    pub(crate) fn drain_pending(&mut self) -> Vec<PendingUnit> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn drain_effects(&mut self) -> Vec<Vec3> {
        std::mem::take(&mut self.effects)
    }
}

impl TagStore for SpawnerWorld {
    fn tag(&mut self, unit: UnitId, tag: UnitTag) {
        self.tags.tag(unit, tag);
    }

    fn untag(&mut self, unit: UnitId, owner: TagOwner) -> bool {
        self.tags.untag(unit, owner)
    }

    fn tags(&self, unit: UnitId) -> &[UnitTag] {
        self.tags.tags(unit)
    }

    fn forget(&mut self, unit: UnitId) {
        self.tags.forget(unit);
    }
}

impl SpawnWorld for SpawnerWorld {
    fn spawn_effect(&mut self, point: Vector3<f32>) {
        self.effects.push(Vec3::from(point));
    }
}

/// `count` units of `kind`, each a stack of `quantity`.
#[derive(Debug, Clone)]
pub struct UnitSpawnable {
    pub kind: String,
    pub quantity: u32,
    pub count: u32,
}

impl UnitSpawnable {
    /// One stack of `amount`.
    pub fn item(kind: impl Into<String>, amount: u32) -> Self {
        Self {
            kind: kind.into(),
            quantity: amount,
            count: 1,
        }
    }

    /// `count` single entities.
    pub fn entities(kind: impl Into<String>, count: u32) -> Self {
        Self {
            kind: kind.into(),
            quantity: 1,
            count,
        }
    }
}

impl Spawnable<SpawnerWorld> for UnitSpawnable {
    fn spawn(&self, point: Vector3<f32>, world: &mut SpawnerWorld) -> Vec<SpawnedUnit> {
        let point = Vec3::from(point);
        (0..self.count)
            .map(|_| {
                let unit = world.reserve(&self.kind, self.quantity, point);
                SpawnedUnit::new(unit, self.quantity)
            })
            .collect()
    }

    fn spawn_count(&self) -> u64 {
        self.quantity as u64 * self.count as u64
    }

    fn label(&self) -> &str {
        &self.kind
    }
}

/// Default mapping from config entries to [`UnitSpawnable`]s.
pub fn unit_spawnable(def: &SpawnableDef) -> Result<Box<dyn Spawnable<SpawnerWorld>>> {
    let spawnable = match def {
        SpawnableDef::Item { kind, amount } => UnitSpawnable::item(kind.clone(), *amount),
        SpawnableDef::Entity { kind, count } => UnitSpawnable::entities(kind.clone(), *count),
    };
    Ok(Box::new(spawnable))
}

type FactoryFn =
    dyn Fn(&SpawnableDef) -> Result<Box<dyn Spawnable<SpawnerWorld>>> + Send + Sync + 'static;

/// Turns config entries into producers when a spawner set is installed.
/// Replace it to spawn custom content.
#[derive(Resource)]
pub struct SpawnableFactory(Box<FactoryFn>);

impl SpawnableFactory {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&SpawnableDef) -> Result<Box<dyn Spawnable<SpawnerWorld>>> + Send + Sync + 'static,
    {
        Self(Box::new(factory))
    }

    pub fn build(&self, def: &SpawnableDef) -> Result<Box<dyn Spawnable<SpawnerWorld>>> {
        (self.0)(def)
    }
}

impl Default for SpawnableFactory {
    fn default() -> Self {
        Self::new(unit_spawnable)
    }
}
