//! Column-wise storage for burst particles.
//!
//! A buffer is sized once at detonation and never grows or shrinks. Slots whose
//! lifetime has reached zero are inert: physics skips them and their render
//! colour and size are zeroed, but they stay in place until the owning
//! firework is retired.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SparkEffect {
    #[default]
    Normal,
    Glitter, // Random flicker every tick
    Strobe,  // Hard on/off blink
}

/// Simultaneous mutable view of every column, for the integration loop.
pub struct ColumnsMut<'a> {
    pub positions: &'a mut [Vec3],
    pub velocities: &'a mut [Vec3],
    pub base_colors: &'a [Vec3],
    pub colors: &'a mut [Vec3],
    pub sizes: &'a mut [f32],
    pub lifetimes: &'a mut [f32],
    pub effects: &'a [SparkEffect],
}

impl ColumnsMut<'_> {
    /// Zeroes the render output of a slot that just went inert.
    pub fn retire(&mut self, index: usize) {
        if let Some(color) = self.colors.get_mut(index) {
            *color = Vec3::ZERO;
            self.sizes[index] = 0.0;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    base_colors: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    lifetimes: Vec<f32>,
    effects: Vec<SparkEffect>,
    capacity: usize,
}

impl ParticleBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            base_colors: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            sizes: Vec::with_capacity(capacity),
            lifetimes: Vec::with_capacity(capacity),
            effects: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a particle; returns `false` and drops it once the buffer is full.
    pub fn push(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        color: Vec3,
        lifetime: f32,
        size: f32,
        effect: SparkEffect,
    ) -> bool {
        if self.positions.len() >= self.capacity {
            return false;
        }
        self.positions.push(position);
        self.velocities.push(velocity);
        self.base_colors.push(color);
        self.colors.push(color);
        self.sizes.push(size);
        self.lifetimes.push(lifetime);
        self.effects.push(effect);
        true
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.lifetimes.get(index).is_some_and(|&life| life > 0.0)
    }

    pub fn columns_mut(&mut self) -> ColumnsMut<'_> {
        ColumnsMut {
            positions: &mut self.positions,
            velocities: &mut self.velocities,
            base_colors: &self.base_colors,
            colors: &mut self.colors,
            sizes: &mut self.sizes,
            lifetimes: &mut self.lifetimes,
            effects: &self.effects,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn base_colors(&self) -> &[Vec3] {
        &self.base_colors
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn lifetimes(&self) -> &[f32] {
        &self.lifetimes
    }

    pub fn effects(&self) -> &[SparkEffect] {
        &self.effects
    }
}
