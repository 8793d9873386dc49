use fastrand::Rng;
use glam::Vec3;
use std::f32::consts::TAU;

/// Upper bound of the random azimuth offset added to each ring particle.
pub const RING_JITTER: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadPattern {
    Sphere,    // Uniform over the sphere
    Weeping,   // Drooping willow fronds
    Palm,      // Mostly up and out
    Ring,      // Evenly spaced horizontal ring
    Crossette, // Slow sphere, splits later
}

impl SpreadPattern {
    /// Initial velocity for particle `index` of `total`.
    pub fn velocity(self, index: usize, total: usize, base_speed: f32, rng: &mut Rng) -> Vec3 {
        match self {
            SpreadPattern::Sphere => {
                let speed = base_speed * (0.7 + rng.f32() * 0.6);
                sphere_direction(rng) * speed
            }
            SpreadPattern::Weeping => {
                let dir = sphere_direction(rng);
                let speed = base_speed * (0.5 + rng.f32() * 0.5);
                Vec3::new(
                    dir.x * speed * 0.7,
                    dir.y * speed * 0.5 + base_speed * 0.3,
                    dir.z * speed * 0.7,
                )
            }
            SpreadPattern::Palm => {
                let theta = rng.f32() * TAU;
                let spread = rng.f32();
                let speed = base_speed * (0.8 + rng.f32() * 0.4);
                Vec3::new(
                    speed * spread * theta.cos(),
                    speed * (0.8 + spread * 0.5),
                    speed * spread * theta.sin(),
                )
            }
            SpreadPattern::Ring => {
                let theta = ring_azimuth(index, total) + rng.f32() * RING_JITTER;
                let speed = base_speed * (0.9 + rng.f32() * 0.2);
                let tilt = rng.f32() * 0.3;
                Vec3::new(
                    speed * theta.cos(),
                    speed * tilt * (theta * 2.0).sin(),
                    speed * theta.sin(),
                )
            }
            SpreadPattern::Crossette => {
                let dir = sphere_direction(rng);
                let speed = base_speed * 0.6 * (0.8 + rng.f32() * 0.4);
                dir * speed
            }
        }
    }
}

/// Evenly spaced azimuth for ring bursts; degenerate rings start at 0.
pub fn ring_azimuth(index: usize, total: usize) -> f32 {
    if total <= 1 {
        return 0.0;
    }
    index as f32 / total as f32 * TAU
}

// Inverse-cosine latitude sampling gives uniform solid-angle coverage.
fn sphere_direction(rng: &mut Rng) -> Vec3 {
    let theta = rng.f32() * TAU;
    let phi = (2.0 * rng.f32() - 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}
