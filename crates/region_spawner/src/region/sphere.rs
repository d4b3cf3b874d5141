//! Ball region.
use glam::Vec3;
use mint::Vector3;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::region::{rand01, Region};

const MAX_REJECTION_ATTEMPTS: usize = 64;

/// Closed ball of `radius` around `center`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Region for Sphere {
    fn contains(&self, point: Vector3<f32>) -> bool {
        Vec3::from(point).distance_squared(self.center) <= self.radius * self.radius
    }

    fn random_point(&self, rng: &mut dyn Rng) -> Option<Vector3<f32>> {
        if self.radius <= 0.0 {
            return None;
        }

        // Rejection from the bounding cube accepts ~52% of draws.
        for _ in 0..MAX_REJECTION_ATTEMPTS {
            let offset = Vec3::new(
                rand01(rng) as f32 * 2.0 - 1.0,
                rand01(rng) as f32 * 2.0 - 1.0,
                rand01(rng) as f32 * 2.0 - 1.0,
            );
            if offset.length_squared() <= 1.0 {
                return Some((self.center + offset * self.radius).into());
            }
        }
        Some(self.center.into())
    }

    fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let r = Vec3::splat(self.radius.max(0.0));
        Some((self.center - r, self.center + r))
    }
}
