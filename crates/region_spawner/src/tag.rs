//! Attribution of spawned units to the spawner that produced them.
//!
//! Hosts keep a [`TagStore`] mapping each unit to the tags attached to it. Several
//! subsystems may tag the same unit; a tag is only meaningful to the [`TagOwner`] that
//! wrote it, so every lookup is keyed by owner first and spawner identity second.
//! [`TagTable`] is a ready-made store for hosts without their own metadata system.
use std::collections::HashMap;
use std::fmt;

use crate::definition::SpawnerId;

/// Host-assigned identity of a spawned unit (entity or item stack).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit:{}", self.0)
    }
}

/// Subsystem that wrote a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagOwner(pub &'static str);

/// Owner used for tags written by spawners.
pub const SPAWNER_TAG_OWNER: TagOwner = TagOwner("region_spawner");

/// One metadata entry on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTag {
    pub owner: TagOwner,
    pub spawner: SpawnerId,
    /// Stack size the unit was spawned with, 1 for single entities.
    pub quantity: u32,
}

impl UnitTag {
    pub fn new(owner: TagOwner, spawner: SpawnerId) -> Self {
        Self {
            owner,
            spawner,
            quantity: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Typed association table from units to their tags.
pub trait TagStore {
    /// Attach `tag` to `unit`, replacing any existing tag from the same owner.
    fn tag(&mut self, unit: UnitId, tag: UnitTag);

    /// Remove the tag written by `owner`. Returns `true` if one was removed.
    fn untag(&mut self, unit: UnitId, owner: TagOwner) -> bool;

    /// All tags currently attached to `unit`.
    fn tags(&self, unit: UnitId) -> &[UnitTag];

    /// Drop every tag on `unit`, e.g. when the host forgets it.
    fn forget(&mut self, unit: UnitId);
}

/// First tag on `unit` written by `owner`.
pub fn find_tag(store: &dyn TagStore, unit: UnitId, owner: TagOwner) -> Option<UnitTag> {
    store
        .tags(unit)
        .iter()
        .find(|tag| tag.owner == owner)
        .copied()
}

/// In-memory [`TagStore`].
#[derive(Debug, Default, Clone)]
pub struct TagTable {
    entries: HashMap<UnitId, Vec<UnitTag>>,
}

impl TagTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Number of units carrying at least one tag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every tag on every unit.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl TagStore for TagTable {
    fn tag(&mut self, unit: UnitId, tag: UnitTag) {
        let tags = self.entries.entry(unit).or_default();
        match tags.iter_mut().find(|t| t.owner == tag.owner) {
            Some(existing) => *existing = tag,
            None => tags.push(tag),
        }
    }

    fn untag(&mut self, unit: UnitId, owner: TagOwner) -> bool {
        let Some(tags) = self.entries.get_mut(&unit) else {
            return false;
        };
        let before = tags.len();
        tags.retain(|t| t.owner != owner);
        let removed = tags.len() != before;
        if tags.is_empty() {
            self.entries.remove(&unit);
        }
        removed
    }

    fn tags(&self, unit: UnitId) -> &[UnitTag] {
        self.entries.get(&unit).map(Vec::as_slice).unwrap_or(&[])
    }

    fn forget(&mut self, unit: UnitId) {
        self.entries.remove(&unit);
    }
}
