//! Immutable spawner definitions.
use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observer::{AllowAll, ObserverFilter};
use crate::region::Region;
use crate::spawnable::Spawnable;

/// Default delay between spawns when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Numeric identity of a spawner, unique within a session. Written into unit tags.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnerId(pub u32);

impl fmt::Display for SpawnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a spawner needs to know about what, where and how often to spawn.
///
/// Definitions are built once (usually by the config layer) and shared read-only between
/// the spawner and the host. `W` is the host world the spawnables write into.
#[non_exhaustive]
pub struct SpawnerDefinition<W: ?Sized> {
    /// Identity written into the tags of every unit this spawner produces.
    pub id: SpawnerId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Region observers must stand in for the spawner to be active.
    pub trigger_region: Box<dyn Region>,
    /// Region spawn points are drawn from.
    pub spawn_region: Box<dyn Region>,
    /// Eligibility predicate at least one tracked observer must pass.
    pub filter: Box<dyn ObserverFilter>,
    /// Producers, in emission order. One batch per producer per fire.
    pub objects: Vec<Box<dyn Spawnable<W>>>,
    /// Fixed delay, used when `min_delay == max_delay`.
    pub delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Live count at or above which the spawner stops firing.
    pub max_entities: u64,
}

impl<W: ?Sized> SpawnerDefinition<W> {
    /// Create a definition with no producers, a fixed [`DEFAULT_DELAY`], no observer
    /// restriction and no live-count ceiling.
    pub fn new(
        id: SpawnerId,
        trigger_region: impl Region + 'static,
        spawn_region: impl Region + 'static,
    ) -> Self {
        Self::from_boxed(id, Box::new(trigger_region), Box::new(spawn_region))
    }

    /// Like [`SpawnerDefinition::new`], for regions chosen at runtime.
    pub fn from_boxed(
        id: SpawnerId,
        trigger_region: Box<dyn Region>,
        spawn_region: Box<dyn Region>,
    ) -> Self {
        Self {
            id,
            name: None,
            trigger_region,
            spawn_region,
            filter: Box::new(AllowAll),
            objects: Vec::new(),
            delay: DEFAULT_DELAY,
            min_delay: DEFAULT_DELAY,
            max_delay: DEFAULT_DELAY,
            max_entities: u64::MAX,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_filter(mut self, filter: impl ObserverFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_boxed_filter(mut self, filter: Box<dyn ObserverFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Append a producer.
    pub fn with_object(mut self, object: impl Spawnable<W> + 'static) -> Self {
        self.objects.push(Box::new(object));
        self
    }

    /// Append several boxed producers.
    pub fn with_objects(mut self, objects: Vec<Box<dyn Spawnable<W>>>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Use a fixed delay between spawns.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self.min_delay = delay;
        self.max_delay = delay;
        self
    }

    /// Draw each delay uniformly from `[min, max)`.
    pub fn with_delay_range(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    pub fn with_max_entities(mut self, max_entities: u64) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Name if set, otherwise the numeric id.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }

    /// Nominal live-count increase of one fire.
    pub fn batch_count(&self) -> u64 {
        self.objects
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.spawn_count()))
    }

    /// Checks the definition for values the spawn cycle cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_delay < self.min_delay {
            return Err(Error::InvalidConfig(format!(
                "spawner {}: max_delay ({:?}) must not be shorter than min_delay ({:?})",
                self.id, self.max_delay, self.min_delay
            )));
        }
        if self.objects.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "spawner {} has nothing to spawn",
                self.id
            )));
        }
        if self.max_entities == 0 {
            return Err(Error::InvalidConfig(format!(
                "spawner {}: max_entities must be > 0",
                self.id
            )));
        }
        if self.trigger_region.is_empty() {
            return Err(Error::EmptyRegion {
                context: format!("spawner {} trigger_region", self.id),
            });
        }
        if self.spawn_region.is_empty() || self.spawn_region.bounds().is_none() {
            return Err(Error::EmptyRegion {
                context: format!("spawner {} spawn_region", self.id),
            });
        }
        Ok(())
    }
}

impl<W: ?Sized> fmt::Debug for SpawnerDefinition<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnerDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "objects",
                &self.objects.iter().map(|o| o.label()).collect::<Vec<_>>(),
            )
            .field("delay", &self.delay)
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("max_entities", &self.max_entities)
            .finish_non_exhaustive()
    }
}
