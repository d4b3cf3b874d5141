//! Event types and sinks for observing spawners.
//!
//! This module defines [`SpawnerEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while driving a [`crate::spawner::Spawner`] or a
//! [`crate::group::SpawnerGroup`] through their `*_with_events` methods.
use glam::Vec3;

use crate::definition::SpawnerId;
use crate::observer::ObserverId;
use crate::tag::UnitId;
use crate::time::Tick;

/// Why a spawner's live count went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// A spawned entity died.
    Destroyed,
    /// A spawned stack timed out.
    Expired,
    /// A spawned stack was picked up.
    Consumed,
}

/// Describes events emitted by spawners.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SpawnerEvent {
    /// Emitted when a spawner passes its gate and its delay window has elapsed.
    Fired {
        spawner: SpawnerId,
        tick: Tick,
        /// Live count before the batch.
        live_count: u64,
    },

    /// Emitted once per producer of a fire.
    BatchSpawned {
        spawner: SpawnerId,
        /// Index of the producer in the definition.
        index: usize,
        /// Spawn point drawn from the spawn region.
        point: Vec3,
        /// Units the producer reported.
        units: Vec<UnitId>,
        /// Nominal quantity added to the live count.
        count: u64,
    },

    /// Emitted when a new delay window opens.
    DelayRolled {
        spawner: SpawnerId,
        tick: Tick,
        delay: Tick,
    },

    /// Emitted when a lifecycle event is attributed to a spawner.
    Released {
        spawner: SpawnerId,
        cause: ReleaseCause,
        unit: UnitId,
        /// Quantity the event reported.
        amount: u64,
        /// Live count after the (clamped) decrement.
        live_count: u64,
    },

    /// Emitted when an observer starts being tracked.
    ObserverEntered {
        spawner: SpawnerId,
        observer: ObserverId,
    },

    /// Emitted when a tracked observer is dropped.
    ObserverLeft {
        spawner: SpawnerId,
        observer: ObserverId,
    },

    /// Emitted when a stack merge was refused.
    MergeVetoed { a: UnitId, b: UnitId },

    /// Emitted when a session ends and observers are cleared.
    SessionEnded { spawners: usize },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. spawner id, producer label).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`SpawnerEvent`], used by sinks to opt out of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnerEventKind {
    Fired,
    BatchSpawned,
    DelayRolled,
    Released,
    ObserverEntered,
    ObserverLeft,
    MergeVetoed,
    SessionEnded,
    Warning,
}

impl SpawnerEvent {
    pub fn kind(&self) -> SpawnerEventKind {
        match self {
            SpawnerEvent::Fired { .. } => SpawnerEventKind::Fired,
            SpawnerEvent::BatchSpawned { .. } => SpawnerEventKind::BatchSpawned,
            SpawnerEvent::DelayRolled { .. } => SpawnerEventKind::DelayRolled,
            SpawnerEvent::Released { .. } => SpawnerEventKind::Released,
            SpawnerEvent::ObserverEntered { .. } => SpawnerEventKind::ObserverEntered,
            SpawnerEvent::ObserverLeft { .. } => SpawnerEventKind::ObserverLeft,
            SpawnerEvent::MergeVetoed { .. } => SpawnerEventKind::MergeVetoed,
            SpawnerEvent::SessionEnded { .. } => SpawnerEventKind::SessionEnded,
            SpawnerEvent::Warning { .. } => SpawnerEventKind::Warning,
        }
    }

    /// Spawner the event concerns, if any.
    pub fn spawner(&self) -> Option<SpawnerId> {
        match self {
            SpawnerEvent::Fired { spawner, .. }
            | SpawnerEvent::BatchSpawned { spawner, .. }
            | SpawnerEvent::DelayRolled { spawner, .. }
            | SpawnerEvent::Released { spawner, .. }
            | SpawnerEvent::ObserverEntered { spawner, .. }
            | SpawnerEvent::ObserverLeft { spawner, .. } => Some(*spawner),
            _ => None,
        }
    }
}

/// A generic event sink that accepts [`SpawnerEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SpawnerEvent);

    /// Whether the sink cares about `kind`. Emitters skip building events that are not wanted.
    #[inline]
    fn wants(&self, _kind: SpawnerEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = SpawnerEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SpawnerEvent) {}

    #[inline]
    fn wants(&self, _kind: SpawnerEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SpawnerEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SpawnerEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SpawnerEvent),
{
    #[inline]
    fn send(&mut self, event: SpawnerEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SpawnerEvent>,
    only: Option<Vec<SpawnerEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = SpawnerEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<SpawnerEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SpawnerEvent] {
        &self.events
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: SpawnerEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SpawnerEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    #[inline]
    fn wants(&self, kind: SpawnerEventKind) -> bool {
        self.only
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: SpawnerEvent) {
        let kind = event.kind();
        let mut targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for i in targets {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: SpawnerEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
