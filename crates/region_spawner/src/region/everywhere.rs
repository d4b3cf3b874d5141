//! Unbounded region.
use glam::Vec3;
use mint::Vector3;
use rand::Rng;

use crate::region::Region;

/// Contains every point. Useful as a trigger region; cannot be sampled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Everywhere;

impl Region for Everywhere {
    fn contains(&self, _point: Vector3<f32>) -> bool {
        true
    }

    fn random_point(&self, _rng: &mut dyn Rng) -> Option<Vector3<f32>> {
        None
    }

    fn bounds(&self) -> Option<(Vec3, Vec3)> {
        None
    }
}
