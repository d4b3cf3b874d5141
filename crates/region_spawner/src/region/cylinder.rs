//! Upright cylinder region.
use std::f64::consts::TAU;

use glam::{Vec2, Vec3};
use mint::Vector3;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::region::{rand01, Region};

/// Vertical cylinder standing on `base` (center of the bottom face).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub base: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Cylinder {
    pub fn new(base: Vec3, radius: f32, height: f32) -> Self {
        Self {
            base,
            radius,
            height,
        }
    }
}

impl Region for Cylinder {
    fn contains(&self, point: Vector3<f32>) -> bool {
        let p = Vec3::from(point);
        let dy = p.y - self.base.y;
        if dy < 0.0 || dy > self.height {
            return false;
        }
        let horizontal = Vec2::new(p.x - self.base.x, p.z - self.base.z);
        horizontal.length_squared() <= self.radius * self.radius
    }

    fn random_point(&self, rng: &mut dyn Rng) -> Option<Vector3<f32>> {
        if self.radius <= 0.0 || self.height <= 0.0 {
            return None;
        }

        // sqrt keeps the disc density uniform.
        let r = rand01(rng).sqrt() * self.radius as f64;
        let angle = rand01(rng) * TAU;
        let y = rand01(rng) * self.height as f64;

        Some(
            Vec3::new(
                self.base.x + (r * angle.cos()) as f32,
                self.base.y + y as f32,
                self.base.z + (r * angle.sin()) as f32,
            )
            .into(),
        )
    }

    fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let r = self.radius.max(0.0);
        Some((
            self.base - Vec3::new(r, 0.0, r),
            self.base + Vec3::new(r, self.height.max(0.0), r),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn contains_checks_height_and_radius() {
        let c = Cylinder::new(Vec3::new(0.0, 10.0, 0.0), 2.0, 4.0);
        assert!(c.contains(Vec3::new(1.0, 12.0, 1.0).into()));
        assert!(!c.contains(Vec3::new(1.0, 9.0, 1.0).into()));
        assert!(!c.contains(Vec3::new(1.0, 14.5, 1.0).into()));
        assert!(!c.contains(Vec3::new(2.0, 12.0, 2.0).into()));
    }

    #[test]
    fn samples_stay_inside() {
        let mut rng = StdRng::seed_from_u64(5);
        let c = Cylinder::new(Vec3::new(-4.0, 0.0, 4.0), 6.0, 3.0);
        for _ in 0..500 {
            let p = c.random_point(&mut rng).expect("cylinder samples");
            // Allow for f32 rounding at the rim.
            let p = Vec3::from(p);
            let horizontal = Vec2::new(p.x - c.base.x, p.z - c.base.z).length();
            assert!(horizontal <= c.radius + 1e-4);
            assert!(p.y >= c.base.y && p.y <= c.base.y + c.height);
        }
    }

    #[test]
    fn flat_cylinder_cannot_be_sampled() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(Cylinder::new(Vec3::ZERO, 1.0, 0.0)
            .random_point(&mut rng)
            .is_none());
    }
}
