//! Automatic launch timing and the set of live fireworks.

use crate::config::Config;
use crate::explosion::ExplosionKind;
use crate::firework::{Firework, FireworkEvent, FireworkId, LAUNCH_HEIGHT};
use crate::schedule::TaskQueue;
use fastrand::Rng;
use glam::{Vec2, Vec3};

/// Where (and optionally what) to launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub x: f32,
    pub z: f32,
    pub kind: Option<ExplosionKind>,
}

impl LaunchRequest {
    pub fn at(x: f32, z: f32) -> Self {
        Self { x, z, kind: None }
    }

    /// Anywhere along the regular launch line.
    pub fn random(rng: &mut Rng) -> Self {
        Self::at((rng.f32() - 0.5) * 180.0, (rng.f32() - 0.5) * 60.0)
    }

    /// Finale shells spread a little wider.
    pub fn finale(rng: &mut Rng) -> Self {
        Self::at((rng.f32() - 0.5) * 200.0, (rng.f32() - 0.5) * 80.0)
    }

    pub fn with_kind(mut self, kind: Option<ExplosionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, LAUNCH_HEIGHT, self.z)
    }
}

/// Work deferred on the wall clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Launch(LaunchRequest),
    Crackle { volume: f32, count: usize },
}

pub struct LaunchScheduler {
    fireworks: Vec<Firework>,
    last_launch_ms: f64,
    next_delay_ms: f64,
    next_id: FireworkId,
}

impl LaunchScheduler {
    pub fn new(config: &Config) -> Self {
        Self {
            fireworks: Vec::new(),
            last_launch_ms: 0.0,
            next_delay_ms: config.launch_interval,
            next_id: 0,
        }
    }

    /// Fires the automatic launcher once its randomized interval has passed.
    /// Companion and finale launches are queued on `tasks`.
    pub fn update(
        &mut self,
        now_ms: f64,
        config: &Config,
        rng: &mut Rng,
        tasks: &mut TaskQueue<Task>,
        events: &mut Vec<FireworkEvent>,
    ) {
        if !config.auto_launch || now_ms - self.last_launch_ms <= self.next_delay_ms {
            return;
        }
        self.last_launch_ms = now_ms;

        if config.finale_mode {
            self.queue_finale(now_ms, rng, tasks);
            self.next_delay_ms = config.launch_interval * 2.0 + rng.f64() * 2000.0;
        } else {
            self.spawn(LaunchRequest::random(rng), config, rng, events);
            if rng.f32() > 0.7 {
                let due = now_ms + 200.0 + rng.f64() * 300.0;
                tasks.push(due, Task::Launch(LaunchRequest::random(rng)));
            }
            self.next_delay_ms = config.launch_interval * (0.8 + rng.f64() * 0.4);
        }
        log::trace!("next automatic launch in {:.0} ms", self.next_delay_ms);
    }

    /// Queues 5 to 9 shells 100 ms apart, the first one due immediately.
    pub fn queue_finale(&self, now_ms: f64, rng: &mut Rng, tasks: &mut TaskQueue<Task>) -> usize {
        let count = rng.usize(5..10);
        for i in 0..count {
            tasks.push(now_ms + i as f64 * 100.0, Task::Launch(LaunchRequest::finale(rng)));
        }
        log::debug!("finale of {count} shells queued");
        count
    }

    /// The single path every launch goes through, automatic or manual.
    pub fn spawn(
        &mut self,
        request: LaunchRequest,
        config: &Config,
        rng: &mut Rng,
        events: &mut Vec<FireworkEvent>,
    ) -> FireworkId {
        let id = self.next_id;
        self.next_id += 1;

        let firework = Firework::new(id, request.position(), request.kind, config, rng);
        let whistle_seconds =
            (config.sound_enabled && rng.f32() > 0.5).then(|| firework.whistle_seconds(config));

        log::debug!("launched firework {} ({}) at x={:.1} z={:.1}", id, firework.kind(), request.x, request.z);
        events.push(FireworkEvent::Launched {
            id,
            kind: firework.kind(),
            whistle_seconds,
        });
        self.fireworks.push(firework);
        id
    }

    /// Advances every live firework and drops the ones that died this tick.
    pub fn update_fireworks(
        &mut self,
        dt: f32,
        config: &Config,
        wind: Vec2,
        rng: &mut Rng,
        events: &mut Vec<FireworkEvent>,
    ) {
        let mut i = 0;
        while i < self.fireworks.len() {
            self.fireworks[i].update(dt, config, wind, rng, events);
            if self.fireworks[i].is_dead() {
                self.fireworks.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fireworks.is_empty()
    }

    pub fn last_launch_ms(&self) -> f64 {
        self.last_launch_ms
    }

    pub fn next_delay_ms(&self) -> f64 {
        self.next_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firework::PhaseKind;

    fn launched(events: &[FireworkEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, FireworkEvent::Launched { .. }))
            .count()
    }

    #[test]
    fn waits_for_the_first_interval() {
        let config = Config::default();
        let mut scheduler = LaunchScheduler::new(&config);
        let mut rng = Rng::with_seed(1);
        let mut tasks = TaskQueue::new();
        let mut events = Vec::new();

        scheduler.update(2500.0, &config, &mut rng, &mut tasks, &mut events);
        assert!(scheduler.is_empty());

        scheduler.update(2500.5, &config, &mut rng, &mut tasks, &mut events);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.last_launch_ms(), 2500.5);
        let delay = scheduler.next_delay_ms();
        assert!((2000.0..=3000.0).contains(&delay), "{delay}");
    }

    #[test]
    fn auto_launch_can_be_disabled() {
        let config = Config {
            auto_launch: false,
            ..Config::default()
        };
        let mut scheduler = LaunchScheduler::new(&config);
        let mut tasks = TaskQueue::new();
        let mut events = Vec::new();
        scheduler.update(1e9, &config, &mut Rng::with_seed(1), &mut tasks, &mut events);
        assert!(scheduler.is_empty());
        assert!(tasks.is_empty());
    }

    #[test]
    fn companions_are_queued_sometimes() {
        let config = Config::default();
        let mut rng = Rng::with_seed(5);
        let mut companions = 0;
        for _ in 0..400 {
            let mut scheduler = LaunchScheduler::new(&config);
            let mut tasks = TaskQueue::new();
            let mut events = Vec::new();
            scheduler.update(3000.0, &config, &mut rng, &mut tasks, &mut events);
            if let Some(due) = tasks.next_due() {
                assert!((3200.0..=3500.0).contains(&due));
                companions += 1;
            }
        }
        assert!((80..160).contains(&companions), "{companions}");
    }

    #[test]
    fn finale_mode_staggers_a_volley() {
        let config = Config {
            finale_mode: true,
            ..Config::default()
        };
        let mut scheduler = LaunchScheduler::new(&config);
        let mut rng = Rng::with_seed(9);
        let mut tasks = TaskQueue::new();
        let mut events = Vec::new();

        scheduler.update(3000.0, &config, &mut rng, &mut tasks, &mut events);
        assert!(scheduler.is_empty());
        assert!((5..=9).contains(&tasks.len()));
        let delay = scheduler.next_delay_ms();
        assert!((5000.0..=7000.0).contains(&delay), "{delay}");

        let total = tasks.len();
        let due = tasks.drain_due(3000.0 + 100.0 * (total - 1) as f64);
        assert_eq!(due.len(), total);
        for task in due {
            let Task::Launch(request) = task else {
                panic!("finale only queues launches");
            };
            assert!(request.x.abs() <= 100.0 && request.z.abs() <= 40.0);
        }
    }

    #[test]
    fn spawn_reports_launch_and_whistle() {
        let config = Config::default();
        let mut scheduler = LaunchScheduler::new(&config);
        let mut rng = Rng::with_seed(2);
        let mut events = Vec::new();
        let mut whistles = 0;

        for _ in 0..200 {
            scheduler.spawn(LaunchRequest::at(10.0, -5.0), &config, &mut rng, &mut events);
        }
        for event in &events {
            if let FireworkEvent::Launched {
                whistle_seconds: Some(seconds),
                ..
            } = event
            {
                assert!(*seconds > 0.0);
                whistles += 1;
            }
        }
        assert_eq!(launched(&events), 200);
        assert!((60..140).contains(&whistles), "{whistles}");

        let ids: Vec<FireworkId> = scheduler.fireworks().iter().map(Firework::id).collect();
        assert_eq!(ids, (0..200).collect::<Vec<_>>());
        assert!(scheduler
            .fireworks()
            .iter()
            .all(|f| f.launch_position() == Vec3::new(10.0, LAUNCH_HEIGHT, -5.0)));
    }

    #[test]
    fn silent_config_never_whistles() {
        let config = Config {
            sound_enabled: false,
            ..Config::default()
        };
        let mut scheduler = LaunchScheduler::new(&config);
        let mut events = Vec::new();
        let mut rng = Rng::with_seed(3);
        for _ in 0..50 {
            scheduler.spawn(LaunchRequest::random(&mut rng), &config, &mut rng, &mut events);
        }
        assert!(events.iter().all(|e| matches!(
            e,
            FireworkEvent::Launched {
                whistle_seconds: None,
                ..
            }
        )));
    }

    #[test]
    fn forced_kind_is_honoured() {
        let config = Config::default();
        let mut scheduler = LaunchScheduler::new(&config);
        let mut events = Vec::new();
        let request = LaunchRequest::at(0.0, 0.0).with_kind(Some(ExplosionKind::Willow));
        scheduler.spawn(request, &config, &mut Rng::with_seed(4), &mut events);
        assert_eq!(scheduler.fireworks()[0].kind(), ExplosionKind::Willow);
    }

    #[test]
    fn dead_fireworks_leave_the_live_set() {
        let config = Config {
            particle_count: 10,
            hover_duration: 0.0,
            fade_speed: 0.5,
            ..Config::default()
        };
        let mut scheduler = LaunchScheduler::new(&config);
        let mut rng = Rng::with_seed(6);
        let mut events = Vec::new();
        for _ in 0..3 {
            scheduler.spawn(LaunchRequest::random(&mut rng), &config, &mut rng, &mut events);
        }

        for _ in 0..2000 {
            scheduler.update_fireworks(1.0 / 60.0, &config, Vec2::ZERO, &mut rng, &mut events);
            assert!(scheduler.fireworks().iter().all(|f| f.phase() != PhaseKind::Dead));
            if scheduler.is_empty() {
                break;
            }
        }
        assert!(scheduler.is_empty());
        let retired = events
            .iter()
            .filter(|e| matches!(e, FireworkEvent::Retired { .. }))
            .count();
        assert_eq!(retired, 3);
    }
}
