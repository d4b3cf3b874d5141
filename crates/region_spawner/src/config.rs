//! Serializable spawner definitions.
//!
//! A [`SpawnerSetDef`] is the parse target for a session's spawner list (typically a RON
//! file). [`SpawnerSetDef::build`] turns it into runtime [`SpawnerDefinition`]s, applying
//! defaults, assigning ids in file order and validating every definition.
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::definition::{SpawnerDefinition, SpawnerId, DEFAULT_DELAY};
use crate::error::{Error, Result};
use crate::observer::{AllowAll, ObserverFilter, ParticipantFilter, TeamFilter, TeamId};
use crate::region::{Cuboid, Cylinder, Everywhere, Region, Sphere};
use crate::spawnable::Spawnable;
use crate::time::{from_ticks, Tick};

/// All spawners of a session, in file order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpawnerSetDef {
    pub spawners: Vec<SpawnerDef>,
}

/// One spawner entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpawnerDef {
    #[serde(default)]
    pub name: Option<String>,
    pub trigger_region: RegionDef,
    pub spawn_region: RegionDef,
    #[serde(default)]
    pub filter: FilterDef,
    pub objects: Vec<SpawnableDef>,
    /// Fixed delay. Defaults to 10 seconds.
    #[serde(default)]
    pub delay: Option<DurationDef>,
    /// Defaults to `delay`.
    #[serde(default)]
    pub min_delay: Option<DurationDef>,
    /// Defaults to `delay`.
    #[serde(default)]
    pub max_delay: Option<DurationDef>,
    /// Defaults to unbounded.
    #[serde(default)]
    pub max_entities: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RegionDef {
    Cuboid { min: Vec3, max: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    Cylinder { base: Vec3, radius: f32, height: f32 },
    Everywhere,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum FilterDef {
    #[default]
    All,
    Participants,
    Teams(Vec<u32>),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DurationDef {
    Seconds(f32),
    Millis(u64),
    Ticks(Tick),
}

/// A producer entry. The host decides what `kind` means.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpawnableDef {
    /// An item stack of `amount`.
    Item { kind: String, amount: u32 },
    /// `count` entities.
    Entity { kind: String, count: u32 },
}

impl SpawnableDef {
    pub fn kind(&self) -> &str {
        match self {
            SpawnableDef::Item { kind, .. } | SpawnableDef::Entity { kind, .. } => kind,
        }
    }

    /// Nominal quantity the entry adds to a live count per fire.
    pub fn quantity(&self) -> u64 {
        match self {
            SpawnableDef::Item { amount, .. } => *amount as u64,
            SpawnableDef::Entity { count, .. } => *count as u64,
        }
    }
}

impl RegionDef {
    pub fn to_region(&self) -> Box<dyn Region> {
        match self {
            RegionDef::Cuboid { min, max } => Box::new(Cuboid::new(*min, *max)),
            RegionDef::Sphere { center, radius } => Box::new(Sphere::new(*center, *radius)),
            RegionDef::Cylinder {
                base,
                radius,
                height,
            } => Box::new(Cylinder::new(*base, *radius, *height)),
            RegionDef::Everywhere => Box::new(Everywhere),
        }
    }
}

impl FilterDef {
    pub fn to_filter(&self) -> Box<dyn ObserverFilter> {
        match self {
            FilterDef::All => Box::new(AllowAll),
            FilterDef::Participants => Box::new(ParticipantFilter),
            FilterDef::Teams(teams) => Box::new(TeamFilter::new(teams.iter().copied().map(TeamId))),
        }
    }
}

impl DurationDef {
    pub fn to_duration(self) -> Result<Duration> {
        match self {
            DurationDef::Seconds(secs) => Duration::try_from_secs_f32(secs)
                .map_err(|e| Error::InvalidConfig(format!("invalid duration {secs}s: {e}"))),
            DurationDef::Millis(millis) => Ok(Duration::from_millis(millis)),
            DurationDef::Ticks(ticks) => Ok(from_ticks(ticks)),
        }
    }
}

fn duration_or(def: Option<DurationDef>, fallback: Duration) -> Result<Duration> {
    def.map_or(Ok(fallback), DurationDef::to_duration)
}

impl SpawnerDef {
    /// Build a definition with id `id`, turning each [`SpawnableDef`] into a producer
    /// through `factory`.
    pub fn build<W, F>(&self, id: SpawnerId, factory: &mut F) -> Result<SpawnerDefinition<W>>
    where
        W: ?Sized,
        F: FnMut(&SpawnableDef) -> Result<Box<dyn Spawnable<W>>>,
    {
        let delay = duration_or(self.delay, DEFAULT_DELAY)?;
        let min_delay = duration_or(self.min_delay, delay)?;
        let max_delay = duration_or(self.max_delay, delay)?;
        let objects = self
            .objects
            .iter()
            .map(&mut *factory)
            .collect::<Result<Vec<_>>>()?;

        let mut definition = SpawnerDefinition::from_boxed(
            id,
            self.trigger_region.to_region(),
            self.spawn_region.to_region(),
        )
        .with_boxed_filter(self.filter.to_filter())
        .with_objects(objects)
        .with_delay(delay)
        .with_delay_range(min_delay, max_delay)
        .with_max_entities(self.max_entities.unwrap_or(u64::MAX));
        if let Some(name) = &self.name {
            definition = definition.with_name(name.clone());
        }
        definition.validate()?;
        Ok(definition)
    }
}

impl SpawnerSetDef {
    /// Build every spawner, assigning ids `0, 1, 2, ...` in order.
    pub fn build<W, F>(&self, mut factory: F) -> Result<Vec<Arc<SpawnerDefinition<W>>>>
    where
        W: ?Sized,
        F: FnMut(&SpawnableDef) -> Result<Box<dyn Spawnable<W>>>,
    {
        self.spawners
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let id = u32::try_from(i)
                    .map(SpawnerId)
                    .map_err(|_| Error::InvalidConfig(format!("too many spawners ({i})")))?;
                def.build(id, &mut factory).map(Arc::new)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use mint::Vector3;

    use super::*;
    use crate::spawnable::SpawnedUnit;
    use crate::tag::UnitId;

    struct Stub(u64);

    impl Spawnable<()> for Stub {
        fn spawn(&self, _point: Vector3<f32>, _world: &mut ()) -> Vec<SpawnedUnit> {
            vec![SpawnedUnit::new(UnitId(0), self.0 as u32)]
        }

        fn spawn_count(&self) -> u64 {
            self.0
        }
    }

    fn factory(def: &SpawnableDef) -> Result<Box<dyn Spawnable<()>>> {
        match def.kind() {
            "unknown" => Err(Error::InvalidConfig(format!("unknown kind '{}'", def.kind()))),
            _ => Ok(Box::new(Stub(def.quantity()))),
        }
    }

    const SET: &str = r#"(
        spawners: [
            (
                name: Some("gold"),
                trigger_region: Cuboid(min: (-5.0, 0.0, -5.0), max: (5.0, 4.0, 5.0)),
                spawn_region: Sphere(center: (0.0, 1.0, 0.0), radius: 2.0),
                objects: [Item(kind: "gold_ingot", amount: 4)],
                delay: Some(Seconds(2.5)),
                max_entities: Some(16),
            ),
            (
                trigger_region: Everywhere,
                spawn_region: Cylinder(base: (0.0, 0.0, 0.0), radius: 3.0, height: 2.0),
                filter: Teams([1, 2]),
                objects: [Entity(kind: "zombie", count: 2), Item(kind: "arrow", amount: 8)],
                min_delay: Some(Millis(1000)),
                max_delay: Some(Ticks(60)),
            ),
        ],
    )"#;

    #[test]
    fn parses_and_applies_defaults() {
        let set: SpawnerSetDef = ron::from_str(SET).expect("valid ron");
        let defs = set.build(factory).expect("valid set");
        assert_eq!(defs.len(), 2);

        let gold = &defs[0];
        assert_eq!(gold.id, SpawnerId(0));
        assert_eq!(gold.name.as_deref(), Some("gold"));
        assert_eq!(gold.delay, Duration::from_millis(2500));
        assert_eq!(gold.min_delay, gold.delay);
        assert_eq!(gold.max_delay, gold.delay);
        assert_eq!(gold.max_entities, 16);
        assert_eq!(gold.batch_count(), 4);

        let mixed = &defs[1];
        assert_eq!(mixed.id, SpawnerId(1));
        assert_eq!(mixed.delay, DEFAULT_DELAY);
        assert_eq!(mixed.min_delay, Duration::from_secs(1));
        assert_eq!(mixed.max_delay, Duration::from_secs(3));
        assert_eq!(mixed.max_entities, u64::MAX);
        assert_eq!(mixed.objects.len(), 2);
        assert_eq!(mixed.batch_count(), 10);
        assert!(mixed.trigger_region.contains(Vec3::splat(1.0e6).into()));
    }

    #[test]
    fn reversed_delay_range_is_rejected() {
        let set: SpawnerSetDef = ron::from_str(
            r#"(spawners: [(
                trigger_region: Everywhere,
                spawn_region: Sphere(center: (0.0, 0.0, 0.0), radius: 1.0),
                objects: [Item(kind: "x", amount: 1)],
                min_delay: Some(Seconds(5.0)),
                max_delay: Some(Seconds(1.0)),
            )])"#,
        )
        .expect("valid ron");
        assert!(matches!(set.build(factory), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn unsampleable_spawn_region_is_rejected() {
        let set: SpawnerSetDef = ron::from_str(
            r#"(spawners: [(
                trigger_region: Everywhere,
                spawn_region: Everywhere,
                objects: [Item(kind: "x", amount: 1)],
            )])"#,
        )
        .expect("valid ron");
        assert!(matches!(set.build(factory), Err(Error::EmptyRegion { .. })));
    }

    #[test]
    fn factory_errors_propagate() {
        let set: SpawnerSetDef = ron::from_str(
            r#"(spawners: [(
                trigger_region: Everywhere,
                spawn_region: Sphere(center: (0.0, 0.0, 0.0), radius: 1.0),
                objects: [Entity(kind: "unknown", count: 1)],
            )])"#,
        )
        .expect("valid ron");
        let err = set.build(factory).unwrap_err();
        assert!(err.to_string().contains("unknown kind"));
    }

    #[test]
    fn negative_seconds_are_invalid() {
        assert!(DurationDef::Seconds(-1.0).to_duration().is_err());
        assert_eq!(
            DurationDef::Ticks(20).to_duration().ok(),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn cuboid_corners_are_normalized() {
        let region = RegionDef::Cuboid {
            min: Vec3::splat(2.0),
            max: Vec3::splat(-2.0),
        }
        .to_region();
        assert!(region.contains(Vec3::ZERO.into()));
    }
}
