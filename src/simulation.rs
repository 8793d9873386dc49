//! Frame orchestration.
//!
//! [`Simulation`] owns every piece of mutable state: the config, the wind, the
//! smoke pool, the star field, the live fireworks, the wall-clock task queue
//! and the audio engine. A tick runs in a fixed order: clock, wind, smoke,
//! stars, auto launcher, due tasks, fireworks, then the lifecycle events the
//! fireworks raised. Rendering reads the result afterwards.

use crate::audio::{AudioCueEngine, AudioOutput};
use crate::config::Config;
use crate::error::Result;
use crate::explosion::ExplosionKind;
use crate::firework::{FireworkEvent, PhaseKind};
use crate::input::{self, InputEvent};
use crate::launcher::{LaunchRequest, LaunchScheduler, Task};
use crate::render::{Layer, PointCloud, RenderService};
use crate::schedule::TaskQueue;
use crate::smoke::SmokeEmitter;
use crate::stars::StarField;
use crate::wind::WindField;
use fastrand::Rng;

/// Longest step the physics will take, in seconds.
pub const MAX_FRAME_DT: f32 = 0.1;

const DETONATION_SMOKE: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    elapsed: f32,
    last_dt: f32,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps a raw frame delta into `[0, MAX_FRAME_DT]` and accumulates it.
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.last_dt = dt;
        dt
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }
}

pub struct Simulation<O> {
    config: Config,
    seed: u64,
    rng: Rng,
    clock: SimulationClock,
    wind: WindField,
    smoke: SmokeEmitter,
    stars: StarField,
    launcher: LaunchScheduler,
    tasks: TaskQueue<Task>,
    audio: AudioCueEngine<O>,
    events: Vec<FireworkEvent>,
    forced_kind: Option<ExplosionKind>,
    now_ms: f64,
}

impl<O: AudioOutput> Simulation<O> {
    pub fn new(config: Config, audio_output: O) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        let mut rng = Rng::with_seed(seed);
        let smoke = SmokeEmitter::new(rng.u32(..));
        let stars = StarField::new(config.star_count, &mut rng);
        let audio = AudioCueEngine::new(audio_output, config.sound_enabled, config.volume, rng.fork());
        log::info!(
            "simulation ready: seed {}, {} particles per shell, {} stars",
            seed,
            config.particle_count,
            config.star_count
        );

        Ok(Self {
            launcher: LaunchScheduler::new(&config),
            config,
            seed,
            rng,
            clock: SimulationClock::new(),
            wind: WindField::new(),
            smoke,
            stars,
            tasks: TaskQueue::new(),
            audio,
            events: Vec::new(),
            forced_kind: None,
            now_ms: 0.0,
        })
    }

    /// Advances one frame. `raw_dt` is the measured frame delta in seconds,
    /// `now_ms` the wall clock used for launch timing and deferred tasks.
    /// Returns the step actually simulated.
    pub fn tick(&mut self, raw_dt: f32, now_ms: f64) -> f32 {
        let dt = self.clock.advance(raw_dt);
        self.now_ms = now_ms;

        self.audio.set_enabled(self.config.sound_enabled);
        self.audio.set_volume(self.config.volume);

        self.wind.update(dt, &self.config);
        self.smoke.update(dt, self.wind.vector());
        self.stars.update(self.clock.elapsed());

        self.launcher
            .update(now_ms, &self.config, &mut self.rng, &mut self.tasks, &mut self.events);
        self.run_due_tasks(now_ms);

        self.launcher.update_fireworks(
            dt,
            &self.config,
            self.wind.vector(),
            &mut self.rng,
            &mut self.events,
        );
        self.dispatch_events();

        dt
    }

    fn run_due_tasks(&mut self, now_ms: f64) {
        for task in self.tasks.drain_due(now_ms) {
            log::debug!("running deferred {task:?}");
            match task {
                Task::Launch(request) => {
                    self.launcher
                        .spawn(request, &self.config, &mut self.rng, &mut self.events);
                }
                Task::Crackle { volume, count } => self.audio.play_crackle(volume, count),
            }
        }
    }

    fn dispatch_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            match event {
                FireworkEvent::Launched { whistle_seconds, .. } => {
                    if let Some(seconds) = whistle_seconds {
                        self.audio.play_rocket_whistle(seconds);
                    }
                }
                FireworkEvent::Exhaust { position, puffs } => {
                    self.smoke.emit(position, puffs, &self.config, &mut self.rng);
                }
                FireworkEvent::Detonated {
                    kind,
                    position,
                    distance,
                    ..
                } => {
                    self.smoke
                        .emit(position, DETONATION_SMOKE, &self.config, &mut self.rng);
                    if let Some(crackle) = self.audio.play_explosion(kind, distance) {
                        self.tasks.push(
                            self.now_ms + crackle.after * 1000.0,
                            Task::Crackle {
                                volume: crackle.volume,
                                count: crackle.count,
                            },
                        );
                    }
                }
                FireworkEvent::Retired { id } => log::trace!("firework {id} removed"),
            }
        }
        // Keep the allocation for the next tick.
        self.events = events;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.audio.unlock();

        match event {
            InputEvent::Click { ndc_x, .. } => {
                let request = input::click_launch(ndc_x, &mut self.rng).with_kind(self.forced_kind);
                self.launch(request);
            }
            InputEvent::LaunchOne => {
                let request = LaunchRequest::random(&mut self.rng).with_kind(self.forced_kind);
                self.launch(request);
            }
            InputEvent::LaunchFinale => {
                self.launcher
                    .queue_finale(self.now_ms, &mut self.rng, &mut self.tasks);
            }
            InputEvent::Tune(tunable) => {
                tunable.apply(&mut self.config);
                log::debug!("config changed: {tunable:?}");
            }
        }
    }

    /// Manual launch through the common spawn path.
    pub fn launch(&mut self, request: LaunchRequest) {
        self.launcher
            .spawn(request, &self.config, &mut self.rng, &mut self.events);
    }

    pub fn render<R: RenderService>(&self, out: &mut R) {
        out.begin_frame();

        out.draw_points(PointCloud::new(
            Layer::Stars,
            self.stars.positions(),
            self.stars.colors(),
            self.stars.sizes(),
        ));
        out.draw_points(PointCloud::new(
            Layer::Smoke,
            self.smoke.positions(),
            self.smoke.colors(),
            self.smoke.sizes(),
        ));

        for firework in self.launcher.fireworks() {
            match firework.phase() {
                PhaseKind::Rocket => {
                    if let Some(rocket) = firework.rocket() {
                        out.draw_trail(rocket.styled_trail());
                    }
                    let head = [firework.position()];
                    let color = [firework.palette().primary()];
                    let size = [self.config.rocket_size];
                    out.draw_points(PointCloud::new(Layer::RocketHead, &head, &color, &size));
                }
                PhaseKind::Exploding => {
                    if let Some(burst) = firework.burst() {
                        let particles = burst.particles();
                        out.draw_points(
                            PointCloud::new(
                                Layer::Sparks,
                                particles.positions(),
                                particles.colors(),
                                particles.sizes(),
                            )
                            .with_persistence(firework.kind().profile().trail_fade),
                        );
                    }
                }
                PhaseKind::Dead => {}
            }
        }

        out.end_frame();
    }

    /// Forces the explosion type of manual launches. `None` picks at random.
    pub fn set_forced_kind(&mut self, kind: Option<ExplosionKind>) {
        self.forced_kind = kind;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn wind(&self) -> &WindField {
        &self.wind
    }

    pub fn smoke(&self) -> &SmokeEmitter {
        &self.smoke
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn launcher(&self) -> &LaunchScheduler {
        &self.launcher
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn audio(&self) -> &AudioCueEngine<O> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioCueEngine<O> {
        &mut self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Source, Voice, Waveform};
    use crate::input::Tunable;
    use crate::trail::TrailPoint;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct Recorder {
        now: f64,
        voices: Vec<Voice>,
    }

    impl AudioOutput for Recorder {
        fn now(&self) -> f64 {
            self.now
        }

        fn schedule(&mut self, voice: Voice) {
            self.voices.push(voice);
        }
    }

    #[derive(Default)]
    struct FrameLog {
        frames: usize,
        layers: Vec<Layer>,
        trails: usize,
    }

    impl RenderService for FrameLog {
        fn begin_frame(&mut self) {
            self.frames += 1;
            self.layers.clear();
            self.trails = 0;
        }

        fn draw_points(&mut self, cloud: PointCloud<'_>) {
            self.layers.push(cloud.layer);
        }

        fn draw_trail(&mut self, _trail: &[TrailPoint]) {
            self.trails += 1;
        }
    }

    fn quiet_config() -> Config {
        Config {
            particle_count: 100,
            auto_launch: false,
            star_count: 50,
            seed: Some(42),
            ..Config::default()
        }
    }

    fn simulation(config: Config) -> Simulation<Recorder> {
        Simulation::new(config, Recorder::default()).expect("valid config")
    }

    /// Ticks at 60 Hz until `done` or the budget runs out. Returns the final wall clock.
    fn run_until(sim: &mut Simulation<Recorder>, start_ms: f64, done: impl Fn(&Simulation<Recorder>) -> bool) -> f64 {
        let mut now = start_ms;
        for _ in 0..20_000 {
            now += 1000.0 / 60.0;
            sim.audio_mut().output_mut().now = now / 1000.0;
            sim.tick(DT, now);
            if done(sim) {
                return now;
            }
        }
        panic!("condition never reached");
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.advance(5.0), 0.1);
        assert_eq!(clock.advance(0.02), 0.02);
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert!((clock.elapsed() - 0.12).abs() < 1e-6);
    }

    #[test]
    fn tick_reports_the_clamped_step() {
        let mut sim = simulation(quiet_config());
        assert_eq!(sim.tick(5.0, 5000.0), 0.1);
        assert_eq!(sim.clock().last_dt(), 0.1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            volume: 2.0,
            ..quiet_config()
        };
        assert!(Simulation::new(config, Recorder::default()).is_err());
    }

    #[test]
    fn audio_stays_silent_until_a_gesture() {
        let mut sim = simulation(quiet_config());
        sim.launch(LaunchRequest::at(0.0, 0.0).with_kind(Some(ExplosionKind::Peony)));
        run_until(&mut sim, 0.0, |s| s.launcher().is_empty());
        assert!(!sim.audio().is_unlocked());
        assert!(sim.audio().output().voices.is_empty());
    }

    #[test]
    fn detonation_makes_smoke_and_sound() {
        let config = Config {
            sound_enabled: true,
            ..quiet_config()
        };
        let mut sim = simulation(config);
        sim.set_forced_kind(Some(ExplosionKind::Ring));
        sim.handle_input(InputEvent::LaunchOne);
        assert!(sim.audio().is_unlocked());

        run_until(&mut sim, 0.0, |s| {
            s.launcher()
                .fireworks()
                .iter()
                .all(|f| f.phase() == PhaseKind::Exploding)
        });

        assert!(sim.smoke().len() >= DETONATION_SMOKE);
        let cracks = sim
            .audio()
            .output()
            .voices
            .iter()
            .filter(|v| matches!(v.source, Source::Oscillator { waveform: Waveform::Sawtooth, .. }))
            .count();
        assert_eq!(cracks, 1);
    }

    #[test]
    fn crossette_crackle_goes_through_the_task_queue() {
        let mut sim = simulation(quiet_config());
        sim.handle_input(InputEvent::Tune(Tunable::Volume(0.6)));
        sim.launch(LaunchRequest::at(0.0, 0.0).with_kind(Some(ExplosionKind::Crossette)));

        let detonated_at = run_until(&mut sim, 0.0, |s| s.pending_tasks() == 1);
        let squares = |s: &Simulation<Recorder>| {
            s.audio()
                .output()
                .voices
                .iter()
                .filter(|v| matches!(v.source, Source::Oscillator { waveform: Waveform::Square, .. }))
                .count()
        };
        assert_eq!(squares(&sim), 0);

        let ran_at = run_until(&mut sim, detonated_at, |s| s.pending_tasks() == 0);
        assert_eq!(squares(&sim), 5);
        let distance = sim.config().listener().distance(glam::Vec3::new(0.0, -85.0, 0.0));
        let expected = 300.0 + crate::audio::sound_delay(distance) * 1000.0;
        let waited = ran_at - detonated_at;
        assert!(waited >= expected - 1e-6 && waited < expected + 20.0, "{waited}");
    }

    #[test]
    fn retired_fireworks_vanish_on_the_same_tick() {
        let config = Config {
            particle_count: 20,
            hover_duration: 0.0,
            fade_speed: 0.2,
            ..quiet_config()
        };
        let mut sim = simulation(config);
        for _ in 0..4 {
            sim.handle_input(InputEvent::LaunchOne);
        }
        run_until(&mut sim, 0.0, |s| {
            assert!(s.launcher().fireworks().iter().all(|f| !f.is_dead()));
            s.launcher().is_empty()
        });
    }

    #[test]
    fn finale_key_launches_a_staggered_volley() {
        let mut sim = simulation(quiet_config());
        sim.tick(DT, 1000.0);
        sim.handle_input(InputEvent::LaunchFinale);
        let queued = sim.pending_tasks();
        assert!((5..=9).contains(&queued));

        sim.tick(DT, 1000.0);
        assert_eq!(sim.launcher().len(), 1);
        sim.tick(DT, 1000.0 + 100.0 * (queued - 1) as f64);
        assert_eq!(sim.launcher().len(), queued);
        assert_eq!(sim.pending_tasks(), 0);
    }

    #[test]
    fn auto_launch_uses_the_wall_clock() {
        let config = Config {
            auto_launch: true,
            ..quiet_config()
        };
        let mut sim = simulation(config);
        sim.tick(DT, 2400.0);
        assert!(sim.launcher().is_empty());
        sim.tick(DT, 2600.0);
        assert_eq!(sim.launcher().len(), 1);
    }

    #[test]
    fn tuning_applies_on_the_next_tick() {
        let mut sim = simulation(quiet_config());
        sim.handle_input(InputEvent::Tune(Tunable::Volume(0.2)));
        sim.handle_input(InputEvent::Tune(Tunable::SoundEnabled(false)));
        sim.tick(DT, 10.0);
        assert_eq!(sim.audio().volume(), 0.2);
        assert!(!sim.audio().is_active());
    }

    #[test]
    fn render_walks_every_layer() {
        let mut sim = simulation(quiet_config());
        sim.handle_input(InputEvent::LaunchOne);
        sim.tick(DT, 10.0);

        let mut frame = FrameLog::default();
        sim.render(&mut frame);
        assert_eq!(frame.frames, 1);
        assert_eq!(frame.layers, vec![Layer::Stars, Layer::Smoke, Layer::RocketHead]);
        assert_eq!(frame.trails, 1);

        run_until(&mut sim, 10.0, |s| {
            s.launcher().fireworks().iter().all(|f| f.phase() == PhaseKind::Exploding)
        });
        sim.render(&mut frame);
        assert_eq!(frame.layers, vec![Layer::Stars, Layer::Smoke, Layer::Sparks]);
        assert_eq!(frame.trails, 0);
    }

    #[test]
    fn same_seed_same_show() {
        let positions = |seed| {
            let mut sim = simulation(Config {
                seed: Some(seed),
                ..quiet_config()
            });
            for _ in 0..3 {
                sim.handle_input(InputEvent::LaunchOne);
            }
            for i in 0..120 {
                sim.tick(DT, i as f64 * 16.0);
            }
            sim.launcher()
                .fireworks()
                .iter()
                .map(|f| f.position())
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(7), positions(7));
    }

    proptest! {
        #[test]
        fn step_never_exceeds_the_cap(raw in 0.0f32..100.0) {
            let mut clock = SimulationClock::new();
            let dt = clock.advance(raw);
            prop_assert!(dt <= MAX_FRAME_DT);
            prop_assert_eq!(dt, raw.min(MAX_FRAME_DT));
        }
    }
}
