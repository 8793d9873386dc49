use crate::config::Config;
use fastrand::Rng;
use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};

pub const SMOKE_CAPACITY: usize = 500;

// 0x444444 in linear RGB
const SMOKE_COLOR: Vec3 = Vec3::splat(0.058);
const TURBULENCE: f32 = 0.05;

/// Small pool of drifting smoke puffs. Emissions beyond capacity are dropped.
pub struct SmokeEmitter {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    lifetimes: Vec<f32>,
    sizes: Vec<f32>,
    colors: Vec<Vec3>,
    perlin: Perlin,
    // Seconds since creation; Perlin input is not periodic, so this never wraps.
    time: f64,
}

impl SmokeEmitter {
    pub fn new(seed: u32) -> Self {
        Self {
            positions: Vec::with_capacity(SMOKE_CAPACITY),
            velocities: Vec::with_capacity(SMOKE_CAPACITY),
            lifetimes: Vec::with_capacity(SMOKE_CAPACITY),
            sizes: Vec::with_capacity(SMOKE_CAPACITY),
            colors: Vec::with_capacity(SMOKE_CAPACITY),
            perlin: Perlin::new(seed),
            time: 0.0,
        }
    }

    /// Emits up to `count` puffs around `at`; returns how many fit in the pool.
    pub fn emit(&mut self, at: Vec3, count: usize, config: &Config, rng: &mut Rng) -> usize {
        if !config.smoke_enabled {
            return 0;
        }

        let room = SMOKE_CAPACITY - self.positions.len();
        let count = count.min(room);
        for _ in 0..count {
            let jitter = Vec3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5) * 5.0;
            self.positions.push(at + jitter);
            self.velocities.push(Vec3::new(
                (rng.f32() - 0.5) * 0.2,
                rng.f32() * 0.3 + 0.1,
                (rng.f32() - 0.5) * 0.2,
            ));
            self.lifetimes.push(1.0);
            self.sizes.push(10.0 + rng.f32() * 20.0);
            self.colors.push(SMOKE_COLOR * 0.2);
        }
        count
    }

    pub fn update(&mut self, dt: f32, wind: Vec2) {
        self.time += dt as f64;

        let drift = Vec3::new(wind.x, 0.0, wind.y) * 10.0;
        let mut i = 0;
        while i < self.positions.len() {
            let p = self.positions[i];
            let swirl = Vec3::new(
                self.perlin.get([p.x as f64 * 0.02, p.y as f64 * 0.02, self.time * 0.3]) as f32,
                0.0,
                self.perlin.get([p.z as f64 * 0.02, p.y as f64 * 0.02, self.time * 0.3 + 100.0]) as f32,
            ) * TURBULENCE;

            let v = &mut self.velocities[i];
            self.positions[i] += *v + drift + swirl;
            v.y *= 0.98;
            self.lifetimes[i] -= dt * 0.3;
            self.sizes[i] += dt * 5.0;

            if self.lifetimes[i] <= 0.0 {
                // Order is irrelevant, so swap-remove keeps the columns dense.
                self.positions.swap_remove(i);
                self.velocities.swap_remove(i);
                self.lifetimes.swap_remove(i);
                self.sizes.swap_remove(i);
                self.colors.swap_remove(i);
                continue;
            }

            self.colors[i] = SMOKE_COLOR * (self.lifetimes[i] * 0.2);
            i += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Smoke colour premultiplied by puff opacity.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn lifetimes(&self) -> &[f32] {
        &self.lifetimes
    }
}
