//! A single shell: ascent, detonation and burst decay.

use crate::config::Config;
use crate::explosion::{ExplosionKind, ExplosionProfile, ShellFlags};
use crate::palette::Palette;
use crate::particles::{ParticleBuffer, SparkEffect};
use crate::trail::{RocketTrail, TrailPoint};
use fastrand::Rng;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

pub const LAUNCH_HEIGHT: f32 = -85.0;

// Rocket thrust decays by this factor every tick.
const ROCKET_DAMPING: f32 = 0.995;
const BURNOUT_SPEED: f32 = 0.15;
// Gravity eases in over this many seconds once the hover ends.
const GRAVITY_RAMP: f32 = 0.5;
const STROBE_RATE: f32 = 30.0;
const SPARKLE_RATE: f32 = 20.0;

pub type FireworkId = u64;

/// Lifecycle notifications collected during a tick and consumed by the
/// simulation (smoke, audio, bookkeeping).
#[derive(Debug, Clone, PartialEq)]
pub enum FireworkEvent {
    Launched {
        id: FireworkId,
        kind: ExplosionKind,
        /// Present when this launch should whistle.
        whistle_seconds: Option<f32>,
    },
    Exhaust {
        position: Vec3,
        puffs: usize,
    },
    Detonated {
        id: FireworkId,
        kind: ExplosionKind,
        position: Vec3,
        distance: f32,
        particles: usize,
    },
    Retired {
        id: FireworkId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Rocket,
    Exploding,
    Dead,
}

#[derive(Debug)]
pub struct Rocket {
    velocity: Vec3,
    trail: RocketTrail,
    styled: Vec<TrailPoint>,
}

impl Rocket {
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Trail points with render colour and size, newest first.
    pub fn styled_trail(&self) -> &[TrailPoint] {
        &self.styled
    }
}

#[derive(Debug)]
struct SplitSchedule {
    thresholds: Vec<f32>,
    done: Vec<bool>,
}

#[derive(Debug)]
pub struct Burst {
    particles: ParticleBuffer,
    splits: Option<SplitSchedule>,
}

impl Burst {
    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    pub fn has_split(&self, index: usize) -> bool {
        self.splits
            .as_ref()
            .and_then(|s| s.done.get(index).copied())
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn set_split_threshold(&mut self, index: usize, threshold: f32) {
        if let Some(splits) = self.splits.as_mut() {
            splits.thresholds[index] = threshold;
        }
    }

    /// Advances every live particle by one tick. Returns the number still alive.
    fn step(&mut self, tick: &BurstTick, config: &Config, wind: Vec2, rng: &mut Rng) -> usize {
        let hovering = tick.phase_elapsed < config.hover_duration;
        let ramp = smoothstep(
            config.hover_duration,
            config.hover_duration + GRAVITY_RAMP,
            tick.phase_elapsed,
        );
        let gravity = config.gravity * tick.profile.gravity * ramp;
        let strobe = if (tick.explosion_elapsed * STROBE_RATE).sin() > 0.0 { 1.0 } else { 0.1 };

        let mut cols = self.particles.columns_mut();
        let mut alive = 0;

        for i in 0..cols.lifetimes.len() {
            if cols.lifetimes[i] <= 0.0 {
                continue;
            }

            let v = &mut cols.velocities[i];
            let drag = 1.0 - config.air_drag * v.length() * tick.dt;
            *v *= drag;
            v.x += wind.x;
            v.z += wind.y;

            if !hovering {
                v.y -= gravity;
                cols.lifetimes[i] -= config.fade_speed;
            }

            cols.positions[i] += *v;

            if let Some(splits) = self.splits.as_mut() {
                if !splits.done[i] && tick.explosion_elapsed >= splits.thresholds[i] {
                    splits.done[i] = true;
                    let kick = 0.5 + rng.f32() * 0.5;
                    let theta = rng.f32() * TAU;
                    *v = Vec3::new(theta.cos() * kick, rng.f32() * kick, theta.sin() * kick);
                }
            }

            let life = cols.lifetimes[i];
            if life <= 0.0 {
                cols.retire(i);
                continue;
            }
            alive += 1;

            let mut alpha = life.max(0.0);
            match cols.effects[i] {
                SparkEffect::Glitter => alpha *= 0.3 + rng.f32() * 0.7,
                SparkEffect::Strobe => alpha *= strobe,
                SparkEffect::Normal => {}
            }
            let sparkle = 1.0
                + (tick.explosion_elapsed * SPARKLE_RATE + i as f32).sin()
                    * config.sparkle_intensity
                    * 0.2;

            let base = cols.base_colors[i];
            let color = match tick.transition {
                Some(target) if life < 0.5 => base.lerp(target, 1.0 - life * 2.0),
                _ => base,
            };
            cols.colors[i] = color * alpha * sparkle;
        }

        alive
    }
}

struct BurstTick<'a> {
    dt: f32,
    phase_elapsed: f32,
    explosion_elapsed: f32,
    profile: &'a ExplosionProfile,
    transition: Option<Vec3>,
}

#[derive(Debug)]
enum Phase {
    Rocket(Rocket),
    Exploding(Burst),
    Dead,
}

#[derive(Debug)]
pub struct Firework {
    id: FireworkId,
    kind: ExplosionKind,
    palette: Palette,
    launch_position: Vec3,
    position: Vec3,
    distance: f32,
    target_apex: f32,
    phase: Phase,
    phase_elapsed: f32,
    explosion_elapsed: f32,
}

impl Firework {
    /// Creates a rocket on the launch line. Without a `kind` one is drawn at random.
    pub fn new(
        id: FireworkId,
        launch_position: Vec3,
        kind: Option<ExplosionKind>,
        config: &Config,
        rng: &mut Rng,
    ) -> Self {
        let kind = kind.unwrap_or_else(|| ExplosionKind::random(rng));
        let palette = Palette::random(kind.profile().flags.contains(ShellFlags::COLOR_SHIFT), rng);

        let velocity = Vec3::new(
            (rng.f32() - 0.5) * 0.4,
            config.rocket_speed * (0.9 + rng.f32() * 0.2),
            (rng.f32() - 0.5) * 0.2,
        );
        let target_apex = 10.0 + rng.f32() * 50.0;

        Self {
            id,
            kind,
            palette,
            launch_position,
            position: launch_position,
            distance: launch_position.distance(config.listener()),
            target_apex,
            phase: Phase::Rocket(Rocket {
                velocity,
                trail: RocketTrail::new(config.rocket_trail_length, launch_position),
                styled: Vec::with_capacity(config.rocket_trail_length),
            }),
            phase_elapsed: 0.0,
            explosion_elapsed: 0.0,
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        config: &Config,
        wind: Vec2,
        rng: &mut Rng,
        events: &mut Vec<FireworkEvent>,
    ) {
        match &mut self.phase {
            Phase::Rocket(rocket) => {
                self.phase_elapsed += dt;

                rocket.velocity.y *= ROCKET_DAMPING;
                rocket.velocity.x += wind.x;
                rocket.velocity.z += wind.y;
                self.position += rocket.velocity;

                rocket.trail.push(self.position);
                rocket.trail.styled_into(config.rocket_size, &mut rocket.styled);

                if rng.f32() > 0.7 {
                    events.push(FireworkEvent::Exhaust {
                        position: self.position,
                        puffs: 2,
                    });
                }

                if rocket.velocity.y < BURNOUT_SPEED || self.position.y >= self.target_apex {
                    self.detonate(config, rng, events);
                }
            }
            Phase::Exploding(burst) => {
                self.phase_elapsed += dt;
                self.explosion_elapsed += dt;

                let tick = BurstTick {
                    dt,
                    phase_elapsed: self.phase_elapsed,
                    explosion_elapsed: self.explosion_elapsed,
                    profile: self.kind.profile(),
                    transition: self.palette.transition,
                };
                let alive = burst.step(&tick, config, wind, rng);
                log::trace!("firework {} has {} live sparks", self.id, alive);

                if alive == 0 && self.cleanup() {
                    events.push(FireworkEvent::Retired { id: self.id });
                }
            }
            Phase::Dead => {}
        }
    }

    fn detonate(&mut self, config: &Config, rng: &mut Rng, events: &mut Vec<FireworkEvent>) {
        let profile = self.kind.profile();
        let count = (config.particle_count as f64 * profile.particle_multiplier).floor() as usize;
        let base_speed = config.explosion_force * (0.8 + rng.f32() * 0.4);

        let mut particles = ParticleBuffer::with_capacity(count);
        for i in 0..count {
            let velocity = profile.pattern.velocity(i, count, base_speed, rng);
            let color = self.palette.pick(rng) * (0.6 + rng.f32() * 0.4);

            let mut lifetime = 0.8 + rng.f32() * 0.4;
            if profile.flags.contains(ShellFlags::LONG_LIFE) {
                lifetime *= 1.5;
            }

            let effect = if profile.flags.contains(ShellFlags::GLITTER) && rng.f32() > 0.7 {
                SparkEffect::Glitter
            } else if profile.flags.contains(ShellFlags::STROBE) && rng.f32() > 0.5 {
                SparkEffect::Strobe
            } else {
                SparkEffect::Normal
            };

            particles.push(self.position, velocity, color, lifetime, config.particle_size, effect);
        }

        let splits = profile.flags.contains(ShellFlags::SPLITS).then(|| SplitSchedule {
            thresholds: (0..count).map(|_| 0.3 + rng.f32() * 0.3).collect(),
            done: vec![false; count],
        });

        // Replacing the phase drops the rocket head and its trail.
        self.phase = Phase::Exploding(Burst { particles, splits });
        self.phase_elapsed = 0.0;
        self.explosion_elapsed = 0.0;

        log::debug!(
            "firework {} detonated as {} at {:?} with {} sparks",
            self.id,
            self.kind,
            self.position,
            count
        );
        events.push(FireworkEvent::Detonated {
            id: self.id,
            kind: self.kind,
            position: self.position,
            distance: self.distance,
            particles: count,
        });
    }

    /// Releases everything the firework owns. Returns `false` if it was already dead.
    pub fn cleanup(&mut self) -> bool {
        if matches!(self.phase, Phase::Dead) {
            return false;
        }
        self.phase = Phase::Dead;
        log::debug!("firework {} retired", self.id);
        true
    }

    /// Approximate flight time used to size the launch whistle.
    pub fn whistle_seconds(&self, config: &Config) -> f32 {
        self.target_apex / config.rocket_speed.max(1e-3) / 60.0
    }

    pub fn id(&self) -> FireworkId {
        self.id
    }

    pub fn kind(&self) -> ExplosionKind {
        self.kind
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn launch_position(&self) -> Vec3 {
        self.launch_position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Distance to the listener, fixed at launch.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn target_apex(&self) -> f32 {
        self.target_apex
    }

    pub fn phase(&self) -> PhaseKind {
        match self.phase {
            Phase::Rocket(_) => PhaseKind::Rocket,
            Phase::Exploding(_) => PhaseKind::Exploding,
            Phase::Dead => PhaseKind::Dead,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, Phase::Dead)
    }

    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    pub fn explosion_elapsed(&self) -> f32 {
        self.explosion_elapsed
    }

    pub fn rocket(&self) -> Option<&Rocket> {
        match &self.phase {
            Phase::Rocket(rocket) => Some(rocket),
            _ => None,
        }
    }

    pub fn burst(&self) -> Option<&Burst> {
        match &self.phase {
            Phase::Exploding(burst) => Some(burst),
            _ => None,
        }
    }

    #[cfg(test)]
    fn burst_mut(&mut self) -> Option<&mut Burst> {
        match &mut self.phase {
            Phase::Exploding(burst) => Some(burst),
            _ => None,
        }
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if x <= edge0 {
        return 0.0;
    }
    if x >= edge1 {
        return 1.0;
    }
    let t = (x - edge0) / (edge1 - edge0);
    t * t * (3.0 - 2.0 * t)
}
