use bevy::prelude::*;
use region_spawner::events::{EventSink, SpawnerEvent, SpawnerEventKind, VecSink};

/// Bevy message wrapping a core [`SpawnerEvent`].
#[derive(Message, Debug, Clone)]
pub struct SpawnerMessage {
    pub event: SpawnerEvent,
}

/// Cosmetic marker at a spawn point, one per produced batch.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SpawnEffect {
    pub point: Vec3,
}

/// Lifecycle of an entity a spawner produced. Write these from gameplay systems.
///
/// `Consumed` must only be written once the pickup is final; pass `cancelled: true` if
/// another system vetoed it.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLifecycle {
    Destroyed {
        entity: Entity,
    },
    Expired {
        entity: Entity,
        quantity: u32,
    },
    Consumed {
        entity: Entity,
        quantity: u32,
        cancelled: bool,
    },
}

impl UnitLifecycle {
    pub fn entity(&self) -> Entity {
        match *self {
            UnitLifecycle::Destroyed { entity }
            | UnitLifecycle::Expired { entity, .. }
            | UnitLifecycle::Consumed { entity, .. } => entity,
        }
    }
}

/// Ends the running session: every spawner forgets its observers.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct EndSpawnerSession;

/// Which core events are re-broadcast as [`SpawnerMessage`]s.
#[derive(Resource, Clone, Debug)]
pub struct SpawnerMessageConfig {
    /// `None` forwards every kind.
    pub kinds: Option<Vec<SpawnerEventKind>>,
}

impl Default for SpawnerMessageConfig {
    fn default() -> Self {
        Self {
            kinds: Some(vec![
                SpawnerEventKind::Fired,
                SpawnerEventKind::Released,
                SpawnerEventKind::MergeVetoed,
                SpawnerEventKind::SessionEnded,
                SpawnerEventKind::Warning,
            ]),
        }
    }
}

impl SpawnerMessageConfig {
    pub fn all() -> Self {
        Self { kinds: None }
    }

    pub(crate) fn sink(&self) -> VecSink {
        match &self.kinds {
            Some(kinds) => VecSink::only(kinds.iter().copied()),
            None => VecSink::new(),
        }
    }
}

/// Write everything collected in `sink` as messages.
pub(crate) fn forward(sink: VecSink, messages: &mut Messages<SpawnerMessage>) {
    for event in sink.into_inner() {
        messages.write(SpawnerMessage { event });
    }
}
