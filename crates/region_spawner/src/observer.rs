//! Observers, eligibility filters and per-spawner presence tracking.
//!
//! An [`Observer`] is a live handle owned by the host (a connected player, a camera rig,
//! anything that "watches" a spawner). Spawners track which observers are inside their
//! trigger region in an [`ObserverTracker`], and ask an [`ObserverFilter`] whether any of
//! them currently allows spawning. Tracker membership is presence only: the filter is
//! re-evaluated on every gate check because observer state (team, participation) can
//! change while they stand still.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mint::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of an observer for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer:{}", self.0)
    }
}

/// Team an observer currently plays for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamId(pub u32);

/// Live view of an observer. Implementations read current host state on every call.
pub trait Observer: Send + Sync {
    fn id(&self) -> ObserverId;

    fn position(&self) -> Vector3<f32>;

    /// Whether the observer takes part in the session (as opposed to spectating).
    fn is_participant(&self) -> bool {
        true
    }

    fn team(&self) -> Option<TeamId> {
        None
    }
}

/// Shared handle to a host observer.
pub type ObserverHandle = Arc<dyn Observer>;

/// Eligibility predicate deciding whether an observer allows spawning.
pub trait ObserverFilter: Send + Sync {
    fn allows(&self, observer: &dyn Observer) -> bool;
}

impl<F> ObserverFilter for F
where
    F: Fn(&dyn Observer) -> bool + Send + Sync,
{
    #[inline]
    fn allows(&self, observer: &dyn Observer) -> bool {
        self(observer)
    }
}

/// Allows every observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ObserverFilter for AllowAll {
    fn allows(&self, _observer: &dyn Observer) -> bool {
        true
    }
}

/// Allows observers that currently participate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticipantFilter;

impl ObserverFilter for ParticipantFilter {
    fn allows(&self, observer: &dyn Observer) -> bool {
        observer.is_participant()
    }
}

/// Allows participating observers on one of the listed teams.
#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub teams: Vec<TeamId>,
}

impl TeamFilter {
    pub fn new(teams: impl IntoIterator<Item = TeamId>) -> Self {
        Self {
            teams: teams.into_iter().collect(),
        }
    }
}

impl ObserverFilter for TeamFilter {
    fn allows(&self, observer: &dyn Observer) -> bool {
        observer.is_participant()
            && observer
                .team()
                .is_some_and(|team| self.teams.contains(&team))
    }
}

/// Set of observers currently present in a trigger region.
#[derive(Default)]
pub struct ObserverTracker {
    observers: HashMap<ObserverId, ObserverHandle>,
}

impl ObserverTracker {
    pub fn new() -> Self {
        Self {
            observers: HashMap::new(),
        }
    }

    /// Track `observer`, replacing any previous handle with the same id.
    /// Returns `true` if the observer was not tracked before.
    pub fn insert(&mut self, observer: ObserverHandle) -> bool {
        self.observers.insert(observer.id(), observer).is_none()
    }

    /// Stop tracking `id`. Returns `true` if it was tracked.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Whether at least one tracked observer passes `filter` right now.
    pub fn any_allowed(&self, filter: &dyn ObserverFilter) -> bool {
        self.observers
            .values()
            .any(|observer| filter.allows(observer.as_ref()))
    }
}

impl fmt::Debug for ObserverTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.observers.keys().collect();
        ids.sort();
        f.debug_struct("ObserverTracker")
            .field("observers", &ids)
            .finish()
    }
}
