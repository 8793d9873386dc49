//! Firework particle simulation with distance-aware audio cues.
//!
//! The library is front-end agnostic: drive a [`Simulation`] with frame deltas
//! and wall-clock timestamps, feed it [`InputEvent`]s, and hand it a
//! [`RenderService`] and an [`AudioOutput`] to receive the results.

pub mod audio;
pub mod config;
pub mod error;
pub mod explosion;
pub mod firework;
pub mod input;
pub mod launcher;
pub mod palette;
pub mod particles;
pub mod pattern;
pub mod render;
pub mod schedule;
pub mod simulation;
pub mod smoke;
pub mod stars;
pub mod trail;
pub mod wind;

pub use audio::{AudioCueEngine, AudioOutput, Voice};
pub use config::Config;
pub use error::{Error, Result};
pub use explosion::{ExplosionKind, ExplosionProfile, ShellFlags};
pub use firework::{Firework, FireworkEvent, PhaseKind};
pub use input::{InputEvent, Tunable};
pub use launcher::{LaunchRequest, LaunchScheduler};
pub use render::{Layer, PointCloud, RenderService};
pub use simulation::{Simulation, SimulationClock, MAX_FRAME_DT};
