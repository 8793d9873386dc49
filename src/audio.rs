//! Distance-aware explosion and whistle cues.
//!
//! The engine never produces samples itself. Each cue is broken down into
//! one-shot [`Voice`] descriptions (a source, an optional filter, and gain and
//! frequency envelopes) and handed to an [`AudioOutput`] with a start time on
//! that output's clock. Every call is a no-op until [`AudioCueEngine::unlock`]
//! has been triggered by a user gesture, and while sound is disabled.

use crate::explosion::ExplosionKind;
use fastrand::Rng;

pub const SPEED_OF_SOUND: f64 = 343.0;
/// Metres per world unit.
pub const WORLD_SCALE: f64 = 2.0;

const SILENCE: f32 = 0.001;

/// Seconds for sound to travel `distance` world units.
pub fn sound_delay(distance: f32) -> f64 {
    distance as f64 * WORLD_SCALE / SPEED_OF_SOUND
}

/// Volume factor for a source `distance` units away, floored at 0.3.
pub fn attenuation(distance: f32) -> f32 {
    (1.0 - distance / 200.0).max(0.3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    Exponential,
}

/// Moves the parameter to `target`, arriving `at` seconds after the voice starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub target: f32,
    pub at: f64,
    pub curve: Curve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub initial: f32,
    pub ramps: Vec<Ramp>,
}

impl Envelope {
    pub fn starting_at(initial: f32) -> Self {
        Self {
            initial,
            ramps: Vec::new(),
        }
    }

    pub fn linear_to(mut self, target: f32, at: f64) -> Self {
        self.ramps.push(Ramp {
            target,
            at,
            curve: Curve::Linear,
        });
        self
    }

    pub fn exponential_to(mut self, target: f32, at: f64) -> Self {
        self.ramps.push(Ramp {
            target,
            at,
            curve: Curve::Exponential,
        });
        self
    }

    /// Parameter value `t` seconds after the voice starts. Holds the last
    /// target once every ramp has completed.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut from_time = 0.0;
        let mut from_value = self.initial;

        for ramp in &self.ramps {
            if t < ramp.at {
                let span = ramp.at - from_time;
                if span <= 0.0 {
                    return ramp.target;
                }
                let k = ((t - from_time) / span).clamp(0.0, 1.0) as f32;
                return match ramp.curve {
                    Curve::Linear => from_value + (ramp.target - from_value) * k,
                    Curve::Exponential if from_value > 0.0 && ramp.target > 0.0 => {
                        from_value * (ramp.target / from_value).powf(k)
                    }
                    Curve::Exponential => from_value,
                };
            }
            from_time = ramp.at;
            from_value = ramp.target;
        }

        from_value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Oscillator { waveform: Waveform, frequency: Envelope },
    Noise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Bandpass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub kind: FilterKind,
    pub cutoff: Envelope,
    pub q: f32,
}

/// One independent synthesized sound.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub source: Source,
    pub filter: Option<Filter>,
    pub gain: Envelope,
    /// Start time on the output's clock, in seconds.
    pub start: f64,
    pub duration: f64,
}

impl Voice {
    fn oscillator(waveform: Waveform, frequency: Envelope, gain: Envelope, start: f64, duration: f64) -> Self {
        Self {
            source: Source::Oscillator { waveform, frequency },
            filter: None,
            gain,
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Destination for scheduled voices.
pub trait AudioOutput {
    /// Current time of the output clock, in seconds.
    fn now(&self) -> f64;

    fn schedule(&mut self, voice: Voice);
}

/// A crackle layer that must be played later by the caller's task queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredCrackle {
    /// Seconds from now.
    pub after: f64,
    pub volume: f32,
    pub count: usize,
}

pub struct AudioCueEngine<O> {
    output: O,
    unlocked: bool,
    enabled: bool,
    volume: f32,
    rng: Rng,
}

impl<O: AudioOutput> AudioCueEngine<O> {
    pub fn new(output: O, enabled: bool, volume: f32, rng: Rng) -> Self {
        Self {
            output,
            unlocked: false,
            enabled,
            volume: volume.clamp(0.0, 1.0),
            rng,
        }
    }

    /// Called on the first user gesture. Later calls do nothing.
    pub fn unlock(&mut self) {
        if !self.unlocked {
            self.unlocked = true;
            log::debug!("audio unlocked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_active(&self) -> bool {
        self.unlocked && self.enabled
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Schedules the burst sound for `kind`, heard `distance` units away.
    /// Crossettes return a crackle layer that the caller must replay later.
    pub fn play_explosion(&mut self, kind: ExplosionKind, distance: f32) -> Option<DeferredCrackle> {
        if !self.is_active() {
            return None;
        }

        let delay = sound_delay(distance);
        let t = self.output.now() + delay;
        let v = self.volume * attenuation(distance);
        log::trace!("explosion cue {kind} in {delay:.3}s at volume {v:.3}");

        match kind {
            ExplosionKind::Chrysanthemum | ExplosionKind::Peony => self.deep_boom(t, v),
            ExplosionKind::Willow => {
                self.deep_boom(t, v * 0.8);
                self.crackle(t + 0.5, v * 0.4, 3);
            }
            ExplosionKind::Palm => {
                self.deep_boom(t, v);
                self.whoosh(t, v * 0.3);
            }
            ExplosionKind::Ring => self.sharp_crack(t, v),
            ExplosionKind::Crossette => {
                self.sharp_crack(t, v * 0.7);
                return Some(DeferredCrackle {
                    after: delay + 0.3,
                    volume: v * 0.5,
                    count: 5,
                });
            }
            ExplosionKind::Strobe => {
                self.sharp_crack(t, v * 0.5);
                self.crackle(t + 0.2, v * 0.6, 8);
            }
            ExplosionKind::Glitter => {
                self.deep_boom(t, v * 0.7);
                self.crackle(t + 0.3, v * 0.5, 6);
            }
        }
        None
    }

    /// Plays a crackle layer starting now.
    pub fn play_crackle(&mut self, volume: f32, count: usize) {
        if !self.is_active() {
            return;
        }
        let t = self.output.now();
        self.crackle(t, volume, count);
    }

    pub fn play_rocket_whistle(&mut self, duration: f32) {
        if !self.is_active() || duration <= 0.0 {
            return;
        }

        let t = self.output.now();
        let duration = duration as f64;
        let top = 1200.0 + self.rng.f32() * 400.0;
        self.output.schedule(Voice::oscillator(
            Waveform::Sine,
            Envelope::starting_at(800.0).linear_to(top, duration),
            Envelope::starting_at(SILENCE)
                .linear_to(self.volume * 0.15, 0.1)
                .linear_to(self.volume * 0.08, duration * 0.8)
                .linear_to(SILENCE, duration),
            t,
            duration,
        ));
    }

    fn deep_boom(&mut self, t: f64, v: f32) {
        // Sub-bass body
        self.output.schedule(Voice::oscillator(
            Waveform::Sine,
            Envelope::starting_at(60.0).exponential_to(20.0, 2.0),
            Envelope::starting_at(v * 1.2).exponential_to(SILENCE, 3.0),
            t,
            3.0,
        ));
        // Punch
        self.output.schedule(Voice::oscillator(
            Waveform::Triangle,
            Envelope::starting_at(150.0).exponential_to(40.0, 0.3),
            Envelope::starting_at(v * 0.8).exponential_to(SILENCE, 0.4),
            t,
            0.4,
        ));
        self.output.schedule(Voice {
            source: Source::Noise,
            filter: Some(Filter {
                kind: FilterKind::Lowpass,
                cutoff: Envelope::starting_at(200.0).exponential_to(30.0, 1.5),
                q: 1.0,
            }),
            gain: Envelope::starting_at(v * 0.6).exponential_to(SILENCE, 2.0),
            start: t,
            duration: 2.0,
        });
    }

    fn sharp_crack(&mut self, t: f64, v: f32) {
        self.output.schedule(Voice::oscillator(
            Waveform::Sawtooth,
            Envelope::starting_at(800.0).exponential_to(100.0, 0.08),
            Envelope::starting_at(v * 0.6).exponential_to(SILENCE, 0.15),
            t,
            0.15,
        ));
    }

    fn crackle(&mut self, t: f64, v: f32, count: usize) {
        for _ in 0..count {
            let at = t + self.rng.f64() * 0.8;
            let pitch = 2000.0 + self.rng.f32() * 1000.0;
            let level = v * (0.2 + self.rng.f32() * 0.3);
            self.output.schedule(Voice::oscillator(
                Waveform::Square,
                Envelope::starting_at(pitch).exponential_to(200.0, 0.02),
                Envelope::starting_at(level).exponential_to(SILENCE, 0.05),
                at,
                0.05,
            ));
        }
    }

    fn whoosh(&mut self, t: f64, v: f32) {
        self.output.schedule(Voice {
            source: Source::Noise,
            filter: Some(Filter {
                kind: FilterKind::Bandpass,
                cutoff: Envelope::starting_at(500.0).exponential_to(100.0, 0.8),
                q: 2.0,
            }),
            gain: Envelope::starting_at(SILENCE)
                .linear_to(v * 0.4, 0.1)
                .exponential_to(SILENCE, 0.8),
            start: t,
            duration: 1.0,
        });
    }
}
