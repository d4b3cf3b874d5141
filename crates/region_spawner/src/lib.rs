#![forbid(unsafe_code)]
//! region_spawner: tick-driven, population-gated spawners with region sampling and unit attribution.
//!
//! Modules:
//! - time: tick arithmetic and duration conversion
//! - region: trigger/spawn regions and uniform point sampling
//! - observer: observers, eligibility filters, presence tracking
//! - tag: typed tag table attributing spawned units to spawners
//! - spawnable / definition: producer interface and immutable spawner definitions
//! - delay: inter-spawn delay windows
//! - spawner: spawn cycle, eligibility gate, lifecycle tracking
//! - merge: stack merge veto rules
//! - group: a session's set of spawners
//! - events: event types and sinks
//! - config (feature `serde`): serializable spawner definitions
pub mod delay;
pub mod definition;
pub mod error;
pub mod events;
pub mod group;
pub mod merge;
pub mod observer;
pub mod region;
pub mod spawnable;
pub mod spawner;
pub mod tag;
pub mod time;

#[cfg(feature = "serde")]
pub mod config;

/// Convenient re-exports for common types. Import with `use region_spawner::prelude::*;`.
pub mod prelude {
    #[cfg(feature = "serde")]
    pub use crate::config::{
        DurationDef, FilterDef, RegionDef, SpawnableDef, SpawnerDef, SpawnerSetDef,
    };
    pub use crate::definition::{SpawnerDefinition, SpawnerId};
    pub use crate::delay::{roll_delay, DelayWindow};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        EventSink, FnSink, MultiSink, ReleaseCause, SpawnerEvent, SpawnerEventKind, VecSink,
    };
    pub use crate::group::SpawnerGroup;
    pub use crate::merge::{resolve_merge, resolve_merge_for_owner, MergeDecision};
    pub use crate::observer::{
        AllowAll, Observer, ObserverFilter, ObserverId, ObserverTracker, ParticipantFilter,
        TeamFilter, TeamId,
    };
    pub use crate::region::{Cuboid, Cylinder, Everywhere, Region, Sphere};
    pub use crate::spawnable::{SpawnWorld, Spawnable, SpawnedUnit};
    pub use crate::spawner::{FireSummary, Spawner, TickOutcome};
    pub use crate::tag::{find_tag, TagOwner, TagStore, TagTable, UnitId, UnitTag, SPAWNER_TAG_OWNER};
    pub use crate::time::{to_ticks, Tick, TICKS_PER_SECOND};
}
