use core::result::Result;

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::tasks::ConditionalSendFuture;
use region_spawner::config::{SpawnerDef, SpawnerSetDef};
use serde::{Deserialize, Serialize};

/// Asset describing every spawner of a session, in file order.
#[derive(Asset, TypePath, Clone, Debug, Serialize, Deserialize)]
pub struct SpawnerSetAsset {
    pub spawners: Vec<SpawnerDef>,
}

impl From<&SpawnerSetAsset> for SpawnerSetDef {
    fn from(asset: &SpawnerSetAsset) -> Self {
        SpawnerSetDef {
            spawners: asset.spawners.clone(),
        }
    }
}

impl From<SpawnerSetAsset> for SpawnerSetDef {
    fn from(asset: SpawnerSetAsset) -> Self {
        SpawnerSetDef {
            spawners: asset.spawners,
        }
    }
}

/// Asset loader for [`SpawnerSetAsset`] using RON files with `.spawner` extension.
#[derive(TypePath)]
pub struct SpawnerSetAssetLoader;

impl AssetLoader for SpawnerSetAssetLoader {
    type Asset = SpawnerSetAsset;
    type Settings = ();
    type Error = anyhow::Error;

    fn extensions(&self) -> &[&str] {
        &["spawner"]
    }

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        Box::pin(async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            let asset: SpawnerSetAsset =
                ron::de::from_bytes(&bytes).map_err(|e| anyhow::anyhow!(e))?;
            Ok(asset)
        })
    }
}

impl FromWorld for SpawnerSetAssetLoader {
    fn from_world(_: &mut World) -> Self {
        SpawnerSetAssetLoader
    }
}
