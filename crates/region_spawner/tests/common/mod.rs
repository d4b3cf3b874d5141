#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use glam::Vec3;
use mint::Vector3;
use region_spawner::prelude::*;

/// A tiny arena: loose item stacks and mobs, plus the tag table.
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

    /// A stack nobody spawned.
    pub fn drop_stack(&mut self, at: Vec3, amount: u32) -> UnitId {
        let id = self.alloc();
        self.stacks.insert(id, (at, amount));
        id
    }

    pub fn remove(&mut self, unit: UnitId) {
        self.stacks.remove(&unit);
        self.mobs.remove(&unit);
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

pub struct Loot {
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
        "loot"
    }
}

pub struct Zombies {
    pub count: u32,
}

impl Spawnable<Arena> for Zombies {
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
        "zombies"
    }
}

struct PlayerState {
    position: Vec3,
    team: Option<TeamId>,
    participant: bool,
}

pub struct Player {
    id: ObserverId,
    state: RwLock<PlayerState>,
}

impl Player {
    pub fn new(id: u64, position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            id: ObserverId(id),
            state: RwLock::new(PlayerState {
                position,
                team: None,
                participant: true,
            }),
        })
    }

    pub fn move_to(&self, position: Vec3) {
        self.state.write().unwrap().position = position;
    }

    pub fn join_team(&self, team: u32) {
        self.state.write().unwrap().team = Some(TeamId(team));
    }

    pub fn spectate(&self) {
        self.state.write().unwrap().participant = false;
    }
}

impl Observer for Player {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn position(&self) -> Vector3<f32> {
        self.state.read().unwrap().position.into()
    }

    fn is_participant(&self) -> bool {
        self.state.read().unwrap().participant
    }

    fn team(&self) -> Option<TeamId> {
        self.state.read().unwrap().team
    }
}

/// A 20x20 room at the origin that spawns into its inner 4x4 floor.
pub fn room(id: u32) -> SpawnerDefinition<Arena> {
    SpawnerDefinition::new(
        SpawnerId(id),
        Cuboid::from_center_extent(Vec3::ZERO, Vec3::new(20.0, 10.0, 20.0)),
        Cuboid::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 1.0, 2.0)),
    )
}
