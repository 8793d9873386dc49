use fastrand::Rng;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const STAR_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);

/// Static background stars whose sizes twinkle over time.
pub struct StarField {
    positions: Vec<Vec3>,
    base_sizes: Vec<f32>,
    phases: Vec<f32>,
    sizes: Vec<f32>,
    colors: Vec<Vec3>,
}

impl StarField {
    pub fn new(count: usize, rng: &mut Rng) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut base_sizes = Vec::with_capacity(count);
        let mut phases = Vec::with_capacity(count);

        for _ in 0..count {
            let theta = rng.f32() * TAU;
            let phi = (2.0 * rng.f32() - 1.0).acos();
            let radius = 800.0 + rng.f32() * 600.0;

            // Fold everything above the horizon.
            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                (radius * phi.sin() * theta.sin()).abs() * 0.5 + 50.0,
                radius * phi.cos(),
            ));
            base_sizes.push(0.5 + rng.f32() * 1.5);
            phases.push(rng.f32() * PI * 2.0);
        }

        Self {
            sizes: base_sizes.clone(),
            colors: vec![STAR_COLOR; count],
            positions,
            base_sizes,
            phases,
        }
    }

    pub fn update(&mut self, elapsed: f32) {
        for ((size, base), phase) in self.sizes.iter_mut().zip(&self.base_sizes).zip(&self.phases) {
            *size = base * (0.7 + 0.3 * (elapsed * 2.0 + phase).sin());
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

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }
}
