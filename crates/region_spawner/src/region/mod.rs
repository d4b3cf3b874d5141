//! Regions observers are tracked in and spawned units are placed in.
//!
//! A [`Region`] answers point membership (used for the trigger region) and, when it is
//! bounded, draws uniformly distributed points (used for the spawn region). Points cross
//! the trait boundary as [`mint::Vector3`] so hosts can bring their own math types.
use glam::Vec3;
use mint::Vector3;
use rand::Rng;

pub mod cuboid;
pub mod cylinder;
pub mod everywhere;
pub mod sphere;

pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use everywhere::Everywhere;
pub use sphere::Sphere;

/// A volume in world space.
pub trait Region: Send + Sync {
    /// Whether `point` lies inside the region.
    fn contains(&self, point: Vector3<f32>) -> bool;

    /// Draw a point uniformly from the region, or `None` when the region cannot be sampled
    /// (unbounded or degenerate).
    fn random_point(&self, rng: &mut dyn Rng) -> Option<Vector3<f32>>;

    /// Axis-aligned bounds `(min, max)`, if the region is bounded.
    fn bounds(&self) -> Option<(Vec3, Vec3)>;

    /// Whether no point can be drawn from the region.
    fn is_empty(&self) -> bool {
        match self.bounds() {
            Some((min, max)) => (max - min).cmple(Vec3::ZERO).any(),
            None => false,
        }
    }
}

/// Generate a random float in the range [0, 1) with 53 bits of precision.
#[inline]
pub fn rand01(rng: &mut dyn Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Largest float strictly below `val`, for keeping samples inside half-open bounds.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() || val == f32::NEG_INFINITY {
        return val;
    }
    if val == f32::INFINITY {
        return f32::MAX;
    }
    if val == 0.0 {
        return -f32::from_bits(1);
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    }
}
