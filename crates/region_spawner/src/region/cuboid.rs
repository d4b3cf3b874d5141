//! Axis-aligned box region.
use glam::Vec3;
use mint::Vector3;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::region::{next_down, rand01, Region};

/// Half-open axis-aligned box `[min, max)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub min: Vec3,
    pub max: Vec3,
}

impl Cuboid {
    /// Create a box from two opposite corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a box from its center and full extent.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        let half = extent.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Region for Cuboid {
    fn contains(&self, point: Vector3<f32>) -> bool {
        let p = Vec3::from(point);
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    fn random_point(&self, rng: &mut dyn Rng) -> Option<Vector3<f32>> {
        let extent = self.extent();
        if extent.cmple(Vec3::ZERO).any() {
            return None;
        }

        let x = self.min.x + rand01(rng) as f32 * extent.x;
        let y = self.min.y + rand01(rng) as f32 * extent.y;
        let z = self.min.z + rand01(rng) as f32 * extent.z;

        // Float rounding can land on the exclusive edge.
        let p = Vec3::new(x, y, z).clamp(
            self.min,
            Vec3::new(
                next_down(self.max.x),
                next_down(self.max.y),
                next_down(self.max.z),
            ),
        );
        Some(p.into())
    }

    fn bounds(&self) -> Option<(Vec3, Vec3)> {
        Some((self.min, self.max))
    }
}
