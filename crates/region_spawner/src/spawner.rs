//! A single spawner: eligibility gate, spawn cycle and lifecycle tracking.
//!
//! A [`Spawner`] is driven by the host through three kinds of calls:
//! - [`Spawner::tick`] once per simulation tick, which may fire a batch;
//! - observer hooks ([`Spawner::on_observer_moved`], [`Spawner::on_observer_left`],
//!   [`Spawner::on_session_end`]) maintaining the set of observers in the trigger region;
//! - unit lifecycle hooks ([`Spawner::on_unit_destroyed`], [`Spawner::on_unit_expired`],
//!   [`Spawner::on_unit_consumed`]) releasing live count for units this spawner tagged.
//!
//! All calls are expected on one thread, serially, and never suspend. A lifecycle hook for
//! a unit must not be delivered before the tick that produced it, and consumption must be
//! delivered only once any cancellation decision for it is final.
use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::definition::{SpawnerDefinition, SpawnerId};
use crate::delay::{roll_delay, DelayWindow};
use crate::error::Result;
use crate::events::{EventSink, ReleaseCause, SpawnerEvent, SpawnerEventKind};
use crate::observer::{ObserverHandle, ObserverId, ObserverTracker};
use crate::spawnable::SpawnWorld;
use crate::tag::{find_tag, TagOwner, TagStore, UnitId, UnitTag, SPAWNER_TAG_OWNER};
use crate::time::Tick;

/// What a call to [`Spawner::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The gate is closed: live count at the ceiling or no eligible observer.
    Blocked,
    /// The gate is open but the delay window has not elapsed.
    Waiting {
        /// Ticks left in the window.
        remaining: Tick,
    },
    /// A batch was produced.
    Fired(FireSummary),
}

impl TickOutcome {
    pub fn fired(&self) -> Option<&FireSummary> {
        match self {
            TickOutcome::Fired(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Result of one fire.
#[derive(Debug, Clone, PartialEq)]
pub struct FireSummary {
    /// Tick the fire happened at (also the start of the new window).
    pub tick: Tick,
    /// Units the producers reported, in emission order.
    pub units: Vec<UnitId>,
    /// Nominal quantity added to the live count.
    pub added: u64,
    /// Producers skipped because no spawn point could be drawn.
    pub skipped: usize,
    /// Length of the new delay window.
    pub next_delay: Tick,
}

/// Runtime state of one spawner. Owned and mutated only by the host loop.
pub struct Spawner<W: ?Sized> {
    definition: Arc<SpawnerDefinition<W>>,
    owner: TagOwner,
    window: DelayWindow,
    live_count: u64,
    observers: ObserverTracker,
}

impl<W: ?Sized> Spawner<W> {
    /// Create a spawner whose first window opens at `now`. The definition is not validated.
    pub fn new(definition: Arc<SpawnerDefinition<W>>, now: Tick, rng: &mut dyn Rng) -> Self {
        debug_assert!(
            definition.max_delay >= definition.min_delay,
            "max_delay must not be shorter than min_delay"
        );

        let window = roll_delay(&definition, rng, now);
        Self {
            definition,
            owner: SPAWNER_TAG_OWNER,
            window,
            live_count: 0,
            observers: ObserverTracker::new(),
        }
    }

    /// Create a spawner after validating the definition.
    pub fn try_new(
        definition: Arc<SpawnerDefinition<W>>,
        now: Tick,
        rng: &mut dyn Rng,
    ) -> Result<Self> {
        definition.validate()?;
        Ok(Self::new(definition, now, rng))
    }

    /// Tag units under a different owner than [`SPAWNER_TAG_OWNER`].
    pub fn with_owner(mut self, owner: TagOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn id(&self) -> SpawnerId {
        self.definition.id
    }

    pub fn definition(&self) -> &Arc<SpawnerDefinition<W>> {
        &self.definition
    }

    pub fn owner(&self) -> TagOwner {
        self.owner
    }

    /// Units currently attributed to this spawner.
    pub fn live_count(&self) -> u64 {
        self.live_count
    }

    pub fn window(&self) -> DelayWindow {
        self.window
    }

    pub fn observers(&self) -> &ObserverTracker {
        &self.observers
    }

    /// Earliest tick the next fire can happen at, if the gate is open then.
    pub fn next_fire_tick(&self) -> Tick {
        self.window.next_fire_tick()
    }

    /// Whether spawning may occur right now.
    ///
    /// The ceiling is checked per fire: a batch that starts below `max_entities` runs in
    /// full even if it ends above it.
    pub fn can_spawn(&self) -> bool {
        if self.live_count >= self.definition.max_entities || self.observers.is_empty() {
            return false;
        }
        self.observers.any_allowed(self.definition.filter.as_ref())
    }

    /// Track or drop `observer` depending on whether it stands in the trigger region.
    /// Spectators (non-participants) are ignored. Returns whether the observer is tracked.
    pub fn on_observer_moved(&mut self, observer: ObserverHandle) -> bool {
        self.on_observer_moved_with_events(observer, &mut ())
    }

    pub fn on_observer_moved_with_events(
        &mut self,
        observer: ObserverHandle,
        sink: &mut dyn EventSink,
    ) -> bool {
        let id = observer.id();
        if !observer.is_participant() {
            return self.observers.contains(id);
        }

        if self.definition.trigger_region.contains(observer.position()) {
            if self.observers.insert(observer) && sink.wants(SpawnerEventKind::ObserverEntered) {
                sink.send(SpawnerEvent::ObserverEntered {
                    spawner: self.id(),
                    observer: id,
                });
            }
            true
        } else {
            self.drop_observer(id, sink);
            false
        }
    }

    /// Drop an observer that disconnected.
    pub fn on_observer_left(&mut self, id: ObserverId) -> bool {
        self.on_observer_left_with_events(id, &mut ())
    }

    pub fn on_observer_left_with_events(
        &mut self,
        id: ObserverId,
        sink: &mut dyn EventSink,
    ) -> bool {
        self.drop_observer(id, sink)
    }

    fn drop_observer(&mut self, id: ObserverId, sink: &mut dyn EventSink) -> bool {
        let removed = self.observers.remove(id);
        if removed && sink.wants(SpawnerEventKind::ObserverLeft) {
            sink.send(SpawnerEvent::ObserverLeft {
                spawner: self.id(),
                observer: id,
            });
        }
        removed
    }

    /// Forget all observers. Live count is untouched: units still in the world keep
    /// their tags and release count if their lifecycle events arrive later.
    pub fn on_session_end(&mut self) {
        self.observers.clear();
    }

    /// A spawned entity died.
    pub fn on_unit_destroyed(&mut self, unit: UnitId, tags: &dyn TagStore) -> bool {
        self.on_unit_destroyed_with_events(unit, tags, &mut ())
    }

    pub fn on_unit_destroyed_with_events(
        &mut self,
        unit: UnitId,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> bool {
        if !self.owns(unit, tags) {
            return false;
        }
        self.release(unit, 1, ReleaseCause::Destroyed, sink);
        true
    }

    /// A spawned stack of `quantity` timed out.
    pub fn on_unit_expired(&mut self, unit: UnitId, quantity: u32, tags: &dyn TagStore) -> bool {
        self.on_unit_expired_with_events(unit, quantity, tags, &mut ())
    }

    pub fn on_unit_expired_with_events(
        &mut self,
        unit: UnitId,
        quantity: u32,
        tags: &dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> bool {
        if !self.owns(unit, tags) {
            return false;
        }
        self.release(unit, quantity as u64, ReleaseCause::Expired, sink);
        true
    }

    /// A spawned stack of `quantity` was picked up. `cancelled` is the final outcome of
    /// the pickup; cancelled pickups release nothing. The tag is stripped so the unit can
    /// no longer be attributed.
    pub fn on_unit_consumed(
        &mut self,
        unit: UnitId,
        quantity: u32,
        cancelled: bool,
        tags: &mut dyn TagStore,
    ) -> bool {
        self.on_unit_consumed_with_events(unit, quantity, cancelled, tags, &mut ())
    }

    pub fn on_unit_consumed_with_events(
        &mut self,
        unit: UnitId,
        quantity: u32,
        cancelled: bool,
        tags: &mut dyn TagStore,
        sink: &mut dyn EventSink,
    ) -> bool {
        if cancelled || !self.owns(unit, tags) {
            return false;
        }
        tags.untag(unit, self.owner);
        self.release(unit, quantity as u64, ReleaseCause::Consumed, sink);
        true
    }

    fn owns(&self, unit: UnitId, tags: &dyn TagStore) -> bool {
        find_tag(tags, unit, self.owner).is_some_and(|tag| tag.spawner == self.definition.id)
    }

    fn release(&mut self, unit: UnitId, amount: u64, cause: ReleaseCause, sink: &mut dyn EventSink) {
        self.live_count = self.live_count.saturating_sub(amount);
        trace!(
            "Spawner {} released {} ({:?}, {}): live count {}.",
            self.definition.id,
            amount,
            cause,
            unit,
            self.live_count
        );
        if sink.wants(SpawnerEventKind::Released) {
            sink.send(SpawnerEvent::Released {
                spawner: self.definition.id,
                cause,
                unit,
                amount,
                live_count: self.live_count,
            });
        }
    }
}

impl<W: SpawnWorld + ?Sized> Spawner<W> {
    /// Advance to tick `now`, firing a batch if the gate is open and the window elapsed.
    pub fn tick(&mut self, now: Tick, world: &mut W, rng: &mut dyn Rng) -> TickOutcome {
        self.tick_with_events(now, world, rng, &mut ())
    }

    pub fn tick_with_events(
        &mut self,
        now: Tick,
        world: &mut W,
        rng: &mut dyn Rng,
        sink: &mut dyn EventSink,
    ) -> TickOutcome {
        if !self.can_spawn() {
            return TickOutcome::Blocked;
        }
        if !self.window.elapsed(now) {
            return TickOutcome::Waiting {
                remaining: self.window.remaining(now),
            };
        }

        let definition = Arc::clone(&self.definition);
        debug!(
            "Spawner {} firing at tick {} (live count {}).",
            definition.id, now, self.live_count
        );
        if sink.wants(SpawnerEventKind::Fired) {
            sink.send(SpawnerEvent::Fired {
                spawner: definition.id,
                tick: now,
                live_count: self.live_count,
            });
        }

        let tag = UnitTag::new(self.owner, definition.id);
        let mut units = Vec::new();
        let mut added = 0u64;
        let mut skipped = 0usize;

        for (index, object) in definition.objects.iter().enumerate() {
            let Some(point) = definition.spawn_region.random_point(rng) else {
                warn!(
                    "Spawner {} could not draw a spawn point for '{}'; skipping.",
                    definition.id,
                    object.label()
                );
                if sink.wants(SpawnerEventKind::Warning) {
                    sink.send(SpawnerEvent::Warning {
                        context: format!("spawner:{} object:{}", definition.id, index),
                        message: "Spawn region cannot be sampled; producer skipped".into(),
                    });
                }
                skipped += 1;
                continue;
            };

            let spawned = object.spawn(point, world);
            for unit in &spawned {
                world.tag(unit.id, tag.with_quantity(unit.quantity));
            }
            world.spawn_effect(point);

            let count = object.spawn_count();
            self.live_count = self.live_count.saturating_add(count);
            added = added.saturating_add(count);

            if sink.wants(SpawnerEventKind::BatchSpawned) {
                sink.send(SpawnerEvent::BatchSpawned {
                    spawner: definition.id,
                    index,
                    point: Vec3::from(point),
                    units: spawned.iter().map(|u| u.id).collect(),
                    count,
                });
            }
            units.extend(spawned.into_iter().map(|u| u.id));
        }

        self.window = roll_delay(&definition, rng, now);
        if sink.wants(SpawnerEventKind::DelayRolled) {
            sink.send(SpawnerEvent::DelayRolled {
                spawner: definition.id,
                tick: now,
                delay: self.window.current_delay,
            });
        }

        TickOutcome::Fired(FireSummary {
            tick: now,
            units,
            added,
            skipped,
            next_delay: self.window.current_delay,
        })
    }
}

impl<W: ?Sized> fmt::Debug for Spawner<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("id", &self.definition.id)
            .field("owner", &self.owner)
            .field("window", &self.window)
            .field("live_count", &self.live_count)
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use mint::Vector3;

    use crate::spawnable::{SpawnWorld, Spawnable, SpawnedUnit};
    use crate::tag::{TagOwner, TagStore, TagTable, UnitId, UnitTag};

    /// Minimal host world: a tag table, a unit registry and recorded effects.
    #[derive(Default)]
    pub(crate) struct TestWorld {
        pub tags: TagTable,
        pub units: HashMap<UnitId, (Vector3<f32>, u32)>,
        pub effects: Vec<Vector3<f32>>,
        next_unit: u64,
    }

    impl TestWorld {
        pub(crate) fn alloc(&mut self, point: Vector3<f32>, quantity: u32) -> UnitId {
            let id = UnitId(self.next_unit);
            self.next_unit += 1;
            self.units.insert(id, (point, quantity));
            id
        }
    }

    impl TagStore for TestWorld {
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

    impl SpawnWorld for TestWorld {
        fn spawn_effect(&mut self, point: Vector3<f32>) {
            self.effects.push(point);
        }
    }

    /// A single item stack of `amount`.
    pub(crate) struct ItemStack {
        pub amount: u32,
    }

    impl Spawnable<TestWorld> for ItemStack {
        fn spawn(&self, point: Vector3<f32>, world: &mut TestWorld) -> Vec<SpawnedUnit> {
            vec![SpawnedUnit::new(world.alloc(point, self.amount), self.amount)]
        }

        fn spawn_count(&self) -> u64 {
            self.amount as u64
        }

        fn label(&self) -> &str {
            "item"
        }
    }

    /// `count` single mobs.
    pub(crate) struct Mobs {
        pub count: u32,
    }

    impl Spawnable<TestWorld> for Mobs {
        fn spawn(&self, point: Vector3<f32>, world: &mut TestWorld) -> Vec<SpawnedUnit> {
            (0..self.count)
                .map(|_| SpawnedUnit::single(world.alloc(point, 1)))
                .collect()
        }

        fn spawn_count(&self) -> u64 {
            self.count as u64
        }

        fn label(&self) -> &str {
            "mobs"
        }
    }

    /// Produces nothing and says so.
    pub(crate) struct Dud;

    impl Spawnable<TestWorld> for Dud {
        fn spawn(&self, _point: Vector3<f32>, _world: &mut TestWorld) -> Vec<SpawnedUnit> {
            Vec::new()
        }

        fn spawn_count(&self) -> u64 {
            0
        }
    }
}
