#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use mint::Vector3;
use region_spawner::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// World that only keeps tags and counts units.
#[derive(Default)]
pub struct BenchWorld {
    pub tags: TagTable,
    next_unit: u64,
}

impl TagStore for BenchWorld {
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

impl SpawnWorld for BenchWorld {}

pub struct Stack(pub u32);

impl Spawnable<BenchWorld> for Stack {
    fn spawn(&self, _point: Vector3<f32>, world: &mut BenchWorld) -> Vec<SpawnedUnit> {
        let id = UnitId(world.next_unit);
        world.next_unit += 1;
        vec![SpawnedUnit::new(id, self.0)]
    }

    fn spawn_count(&self) -> u64 {
        self.0 as u64
    }
}

pub struct StaticObserver {
    pub id: ObserverId,
    pub position: Vector3<f32>,
}

impl Observer for StaticObserver {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn position(&self) -> Vector3<f32> {
        self.position
    }
}
