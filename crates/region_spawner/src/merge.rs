//! Merge veto for spawned item stacks.
//!
//! Two stacks about to combine are only allowed to if doing so cannot move quantity
//! between spawners or between a spawner and the untracked world:
//!
//! | a tagged | b tagged | same spawner | decision |
//! |---|---|---|---|
//! | no | no | - | allow |
//! | yes | no | - | veto |
//! | no | yes | - | veto |
//! | yes | yes | yes | allow |
//! | yes | yes | no | veto |
use crate::tag::{find_tag, TagOwner, TagStore, UnitId, SPAWNER_TAG_OWNER};

/// Outcome of a merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    Allow,
    Veto,
}

impl MergeDecision {
    pub fn is_veto(self) -> bool {
        matches!(self, MergeDecision::Veto)
    }
}

/// Decide whether stacks `a` and `b` may merge, looking at spawner tags.
pub fn resolve_merge(store: &dyn TagStore, a: UnitId, b: UnitId) -> MergeDecision {
    resolve_merge_for_owner(store, a, b, SPAWNER_TAG_OWNER)
}

/// [`resolve_merge`] for tags written under `owner`.
pub fn resolve_merge_for_owner(
    store: &dyn TagStore,
    a: UnitId,
    b: UnitId,
    owner: TagOwner,
) -> MergeDecision {
    let tag_a = find_tag(store, a, owner);
    let tag_b = find_tag(store, b, owner);
    match (tag_a, tag_b) {
        (None, None) => MergeDecision::Allow,
        (Some(x), Some(y)) if x.spawner == y.spawner => MergeDecision::Allow,
        _ => MergeDecision::Veto,
    }
}
