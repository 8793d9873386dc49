use crate::config::{Config, MAX_PARTICLE_COUNT};
use crate::launcher::LaunchRequest;
use fastrand::Rng;

/// Discrete events delivered by the front end. Every one of them counts as a
/// user gesture for audio unlocking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer click in normalised device coordinates, both in [-1, 1].
    Click { ndc_x: f32, ndc_y: f32 },
    LaunchOne,
    LaunchFinale,
    Tune(Tunable),
}

/// A single control-panel edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tunable {
    ParticleCount(usize),
    ParticleSize(f32),
    ExplosionForce(f32),
    Gravity(f32),
    WindStrength(f32),
    WindDirection(f32),
    HoverDuration(f32),
    LaunchInterval(f64),
    Volume(f32),
    AutoLaunch(bool),
    FinaleMode(bool),
    SoundEnabled(bool),
    SmokeEnabled(bool),
}

impl Tunable {
    /// Writes the value into `config`, clamped to the panel's range.
    pub fn apply(self, config: &mut Config) {
        match self {
            Tunable::ParticleCount(n) => config.particle_count = n.min(MAX_PARTICLE_COUNT),
            Tunable::ParticleSize(v) => config.particle_size = v.clamp(0.3, 2.0),
            Tunable::ExplosionForce(v) => config.explosion_force = v.clamp(1.0, 6.0),
            Tunable::Gravity(v) => config.gravity = v.clamp(0.001, 0.015),
            Tunable::WindStrength(v) => config.wind_strength = v.clamp(0.0, 1.0),
            Tunable::WindDirection(v) => config.wind_direction = v.rem_euclid(360.0),
            Tunable::HoverDuration(v) => config.hover_duration = v.clamp(0.0, 2.0),
            Tunable::LaunchInterval(ms) => config.launch_interval = ms.clamp(500.0, 6000.0),
            Tunable::Volume(v) => config.volume = v.clamp(0.0, 1.0),
            Tunable::AutoLaunch(on) => config.auto_launch = on,
            Tunable::FinaleMode(on) => config.finale_mode = on,
            Tunable::SoundEnabled(on) => config.sound_enabled = on,
            Tunable::SmokeEnabled(on) => config.smoke_enabled = on,
        }
    }
}

/// Maps a click to a launch site: horizontal position follows the pointer,
/// depth is random.
pub fn click_launch(ndc_x: f32, rng: &mut Rng) -> LaunchRequest {
    LaunchRequest::at(ndc_x.clamp(-1.0, 1.0) * 100.0, (rng.f32() - 0.5) * 40.0)
}
