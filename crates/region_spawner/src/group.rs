//! All spawners of one session.
//!
//! [`SpawnerGroup`] owns the spawners built from a session's definitions and is the single
//! entry point for the host: it ticks spawners in definition order and routes observer,
//! lifecycle and merge events.
//!
//! Hook order the host must respect within a tick:
//! 1. merge requests are answered synchronously, before the merge happens;
//! 2. consumption is delivered only once cancellation of the pickup is final, with that
//!    outcome passed as `cancelled`;
//! 3. lifecycle events for a unit arrive after the tick that spawned it.
use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use crate::definition::{SpawnerDefinition, SpawnerId};
use crate::error::{Error, Result};
use crate::events::{EventSink, SpawnerEvent, SpawnerEventKind};
use crate::merge::{resolve_merge_for_owner, MergeDecision};
use crate::observer::{ObserverHandle, ObserverId};
use crate::spawnable::SpawnWorld;
use crate::spawner::{FireSummary, Spawner, TickOutcome};
use crate::tag::{find_tag, TagOwner, TagStore, UnitId, SPAWNER_TAG_OWNER};
use crate::time::Tick;

/// A session's spawners, in definition order.
pub struct SpawnerGroup<W: ?Sized> {
    spawners: Vec<Spawner<W>>,
    index: HashMap<SpawnerId, usize>,
    owner: TagOwner,
}

impl<W: ?Sized> Default for SpawnerGroup<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ?Sized> SpawnerGroup<W> {
    pub fn new() -> Self {
        Self {
            spawners: Vec::new(),
            index: HashMap::new(),
            owner: SPAWNER_TAG_OWNER,
        }
    }

    /// Use `owner` for tags written and read by every spawner in the group.
    pub fn with_owner(mut self, owner: TagOwner) -> Self {
        self.owner = owner;
        self.spawners = self
            .spawners
            .into_iter()
            .map(|s| s.with_owner(owner))
            .collect();
        self
    }

    /// Build spawners for all `definitions`, opening their first windows at `now`.
    pub fn from_definitions<I>(definitions: I, now: Tick, rng: &mut dyn Rng) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<SpawnerDefinition<W>>>,
    {
        let mut group = Self::new();
        for definition in definitions {
            group.try_insert(definition, now, rng)?;
        }
        info!("Spawner group ready with {} spawner(s).", group.len());
        Ok(group)
    }

    /// Validate `definition` and add a spawner for it.
    pub fn try_insert(
        &mut self,
        definition: Arc<SpawnerDefinition<W>>,
        now: Tick,
        rng: &mut dyn Rng,
    ) -> Result<SpawnerId> {
        let id = definition.id;
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateSpawner { id });
        }
        let spawner = Spawner::try_new(definition, now, rng)?.with_owner(self.owner);
        self.index.insert(id, self.spawners.len());
        self.spawners.push(spawner);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    pub fn owner(&self) -> TagOwner {
        self.owner
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spawner<W>> {
        self.spawners.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = SpawnerId> + '_ {
        self.spawners.iter().map(|s| s.id())
    }

    pub fn get(&self, id: SpawnerId) -> Option<&Spawner<W>> {
        self.index.get(&id).map(|&i| &self.spawners[i])
    }

    pub fn get_mut(&mut self, id: SpawnerId) -> Option<&mut Spawner<W>> {
        self.index.get(&id).map(|&i| &mut self.spawners[i])
    }

    /// Like [`SpawnerGroup::get`], but unknown ids are an error.
    pub fn spawner(&self, id: SpawnerId) -> Result<&Spawner<W>> {
        self.get(id).ok_or(Error::UnknownSpawner { id })
    }

    pub fn live_count(&self, id: SpawnerId) -> Result<u64> {
        self.spawner(id).map(Spawner::live_count)
    }

    /// Sum of all spawners' live counts.
    pub fn total_live_count(&self) -> u64 {
        self.spawners
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.live_count()))
    }

    /// Forward an observer position update to every spawner.
    pub fn on_observer_moved(&mut self, observer: ObserverHandle) {
        self.on_observer_moved_with_events(observer, &mut ());
    }

    pub fn on_observer_moved_with_events(
        &mut self,
        observer: ObserverHandle,
        sink: &mut dyn EventSink,
    ) {
        for spawner in &mut self.spawners {
            spawner.on_observer_moved_with_events(observer.clone(), sink);
        }
    }

    /// Drop a disconnected observer from every spawner.
    pub fn on_observer_left(&mut self, id: ObserverId) {
        self.on_observer_left_with_events(id, &mut ());
    }

    pub fn on_observer_left_with_events(&mut self, id: ObserverId, sink: &mut dyn EventSink) {
        for spawner in &mut self.spawners {
            spawner.on_observer_left_with_events(id, sink);
        }
    }

    /// Clear every spawner's observers. Live counts are kept.
    pub fn on_session_end(&mut self) {
        self.on_session_end_with_events(&mut ());
    }

    pub fn on_session_end_with_events(&mut self, sink: &mut dyn EventSink) {
        for spawner in &mut self.spawners {
            spawner.on_session_end();
        }
        info!(
            "Session ended; cleared observers of {} spawner(s).",
            self.spawners.len()
        );
        if sink.wants(SpawnerEventKind::SessionEnded) {
            sink.send(SpawnerEvent::SessionEnded {
                spawners: self.spawners.len(),
            });
        }
    }

    /// Route a destruction to the spawner that tagged `unit`. Returns that spawner.
    pub fn on_unit_destroyed(&mut self, unit: UnitId, tags: &dyn TagStore) -> Option<SpawnerId> {
        self.on_unit_destroyed_with_events(unit, tags, &mut ())
    }

    pub fn on_unit_destroyed_with_events(
        &mut self,
        unit: UnitId,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> Option<SpawnerId> {
        let spawner = self.owning_spawner(unit, tags, sink)?;
        spawner
            .on_unit_destroyed_with_events(unit, tags, sink)
            .then(|| spawner.id())
    }

    /// Route an expiry to the spawner that tagged `unit`.
    pub fn on_unit_expired(
        &mut self,
        unit: UnitId,
        quantity: u32,
        tags: &dyn TagStore,
    ) -> Option<SpawnerId> {
        self.on_unit_expired_with_events(unit, quantity, tags, &mut ())
    }

    pub fn on_unit_expired_with_events(
        &mut self,
        unit: UnitId,
        quantity: u32,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> Option<SpawnerId> {
        let spawner = self.owning_spawner(unit, tags, sink)?;
        spawner
            .on_unit_expired_with_events(unit, quantity, tags, sink)
            .then(|| spawner.id())
    }

    /// Route a finalized pickup to the spawner that tagged `unit`.
    pub fn on_unit_consumed(
        &mut self,
        unit: UnitId,
        quantity: u32,
        cancelled: bool,
        tags: &mut dyn TagStore,
    ) -> Option<SpawnerId> {
        self.on_unit_consumed_with_events(unit, quantity, cancelled, tags, &mut ())
    }

    pub fn on_unit_consumed_with_events(
        &mut self,
        unit: UnitId,
        quantity: u32,
        cancelled: bool,
        tags: &mut dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> Option<SpawnerId> {
        if cancelled {
            return None;
        }
        let spawner = self.owning_spawner(unit, &*tags, sink)?;
        spawner
            .on_unit_consumed_with_events(unit, quantity, cancelled, tags, sink)
            .then(|| spawner.id())
    }

    /// Answer a merge request between stacks `a` and `b`.
    pub fn on_merge_requested(&self, a: UnitId, b: UnitId, tags: &dyn TagStore) -> MergeDecision {
        self.on_merge_requested_with_events(a, b, tags, &mut ())
    }

    pub fn on_merge_requested_with_events(
        &self,
        a: UnitId,
        b: UnitId,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> MergeDecision {
        let decision = resolve_merge_for_owner(tags, a, b, self.owner);
        if decision.is_veto() && sink.wants(SpawnerEventKind::MergeVetoed) {
            sink.send(SpawnerEvent::MergeVetoed { a, b });
        }
        decision
    }

    fn owning_spawner(
        &mut self,
        unit: UnitId,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> Option<&mut Spawner<W>> {
        let tag = find_tag(tags, unit, self.owner)?;
        let Some(&i) = self.index.get(&tag.spawner) else {
            warn!(
                "{} is tagged by unknown spawner {}; ignoring.",
                unit, tag.spawner
            );
            if sink.wants(SpawnerEventKind::Warning) {
                sink.send(SpawnerEvent::Warning {
                    context: format!("{unit}"),
                    message: format!("Tagged by unknown spawner {}", tag.spawner),
                });
            }
            return None;
        };
        Some(&mut self.spawners[i])
    }
}

impl<W: SpawnWorld + ?Sized> SpawnerGroup<W> {
    /// Tick every spawner in definition order. Returns the fires that happened.
    pub fn tick(
        &mut self,
        now: Tick,
        world: &mut W,
        rng: &mut dyn Rng,
    ) -> Vec<(SpawnerId, FireSummary)> {
        self.tick_with_events(now, world, rng, &mut ())
    }

    pub fn tick_with_events(
        &mut self,
        now: Tick,
        world: &mut W,
        rng: &mut dyn Rng,
        sink: &mut dyn EventSink,
    ) -> Vec<(SpawnerId, FireSummary)> {
        let mut fired = Vec::new();
        for spawner in &mut self.spawners {
            if let TickOutcome::Fired(summary) = spawner.tick_with_events(now, world, rng, sink) {
                fired.push((spawner.id(), summary));
            }
        }
        fired
    }
}
