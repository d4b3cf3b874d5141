//! Producer interface invoked by the spawn cycle.
//!
//! What a spawner produces is up to the host: a [`Spawnable`] materializes its output in
//! the host world `W` and reports the units it created so the spawner can tag them.
use mint::Vector3;

use crate::tag::{TagStore, UnitId};

/// A unit materialized by a [`Spawnable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedUnit {
    /// Host identity of the unit.
    pub id: UnitId,
    /// Stack size for stackable output, 1 for single entities.
    pub quantity: u32,
}

impl SpawnedUnit {
    pub fn new(id: UnitId, quantity: u32) -> Self {
        Self { id, quantity }
    }

    /// A single (non-stackable) entity.
    pub fn single(id: UnitId) -> Self {
        Self { id, quantity: 1 }
    }
}

/// Host world the spawn cycle writes into.
pub trait SpawnWorld: TagStore {
    /// Fire-and-forget cosmetic marker at a spawn point.
    fn spawn_effect(&mut self, _point: Vector3<f32>) {}
}

/// Something a spawner can produce at a point.
pub trait Spawnable<W: ?Sized>: Send + Sync {
    /// Materialize output at `point`. Returning no units is a valid no-op.
    fn spawn(&self, point: Vector3<f32>, world: &mut W) -> Vec<SpawnedUnit>;

    /// Nominal quantity one call to [`Spawnable::spawn`] adds to the live count
    /// (the stack size for items, 1 for entities).
    fn spawn_count(&self) -> u64;

    /// Short name used in logs and events.
    fn label(&self) -> &str {
        "spawnable"
    }
}
