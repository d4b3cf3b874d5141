use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use glam::Vec3;
use mint::Vector3;
use region_spawner::prelude::*;

/// A headless game world: item stacks on the ground and mobs, keyed by unit id.
#[derive(Default)]
pub struct Arena {
    pub tags: TagTable,
    pub stacks: HashMap<UnitId, (Vec3, u32)>,
    pub mobs: HashMap<UnitId, Vec3>,
    pub effects: usize,
    next_unit: u64,
}

impl Arena {
    fn alloc(&mut self) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        id
    }

    /// Drop a stack no spawner produced, e.g. from a player's inventory.
    pub fn drop_stack(&mut self, at: Vec3, amount: u32) -> UnitId {
        let id = self.alloc();
        self.stacks.insert(id, (at, amount));
        id
    }

    /// Stacks within `radius` of `at`.
    pub fn stacks_near(&self, at: Vec3, radius: f32) -> Vec<(UnitId, u32)> {
        self.stacks
            .iter()
            .filter(|(_, (p, _))| p.distance(at) <= radius)
            .map(|(id, (_, amount))| (*id, *amount))
            .collect()
    }

    pub fn remove(&mut self, unit: UnitId) {
        self.stacks.remove(&unit);
        self.mobs.remove(&unit);
        self.tags.forget(unit);
    }
}

impl TagStore for Arena {
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

impl SpawnWorld for Arena {
    fn spawn_effect(&mut self, _point: Vector3<f32>) {
        self.effects += 1;
    }
}

/// One item stack.
pub struct Loot {
    pub kind: String,
    pub amount: u32,
}

impl Spawnable<Arena> for Loot {
    fn spawn(&self, point: Vector3<f32>, world: &mut Arena) -> Vec<SpawnedUnit> {
        let id = world.alloc();
        world.stacks.insert(id, (point.into(), self.amount));
        vec![SpawnedUnit::new(id, self.amount)]
    }

    fn spawn_count(&self) -> u64 {
        self.amount as u64
    }

    fn label(&self) -> &str {
        &self.kind
    }
}

/// A pack of mobs.
pub struct Mobs {
    pub kind: String,
    pub count: u32,
}

impl Spawnable<Arena> for Mobs {
    fn spawn(&self, point: Vector3<f32>, world: &mut Arena) -> Vec<SpawnedUnit> {
        (0..self.count)
            .map(|_| {
                let id = world.alloc();
                world.mobs.insert(id, point.into());
                SpawnedUnit::single(id)
            })
            .collect()
    }

    fn spawn_count(&self) -> u64 {
        self.count as u64
    }

    fn label(&self) -> &str {
        &self.kind
    }
}

impl Arena {
    /// Factory for [`SpawnerSetDef::build`].
    pub fn spawnable(def: &SpawnableDef) -> Result<Box<dyn Spawnable<Arena>>> {
        let spawnable: Box<dyn Spawnable<Arena>> = match def {
            SpawnableDef::Item { kind, amount } => Box::new(Loot {
                kind: kind.clone(),
                amount: *amount,
            }),
            SpawnableDef::Entity { kind, count } => Box::new(Mobs {
                kind: kind.clone(),
                count: *count,
            }),
        };
        Ok(spawnable)
    }
}

/// A player walking between waypoints.
pub struct Walker {
    id: ObserverId,
    team: Option<TeamId>,
    position: RwLock<Vec3>,
}

impl Walker {
    pub fn new(id: u64, team: Option<u32>, position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            id: ObserverId(id),
            team: team.map(TeamId),
            position: RwLock::new(position),
        })
    }

    /// Move up to `step` towards `target`. Returns whether the target was reached.
    pub fn step_towards(&self, target: Vec3, step: f32) -> bool {
        let Ok(mut position) = self.position.write() else {
            return false;
        };
        let delta = target - *position;
        if delta.length() <= step {
            *position = target;
            return true;
        }
        *position += delta.normalize() * step;
        false
    }

    pub fn location(&self) -> Vec3 {
        self.position.read().map(|p| *p).unwrap_or(Vec3::ZERO)
    }
}

impl Observer for Walker {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn position(&self) -> Vector3<f32> {
        self.location().into()
    }

    fn team(&self) -> Option<TeamId> {
        self.team
    }
}
