//! Live-tunable simulation parameters.
//!
//! The simulation owns one [`Config`] and reads it at the point of use every
//! tick, so edits made between frames reach in-flight fireworks right away.
//! Values captured at spawn or detonation time (apex height, particle count,
//! base speed) are the exceptions.

use crate::error::{Error, Result};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

pub const MAX_PARTICLE_COUNT: usize = 40_000;
pub const MAX_STAR_COUNT: usize = 50_000;
pub const MAX_TRAIL_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    // Particles
    pub particle_count: usize,
    pub particle_size: f32,

    // Physics
    pub explosion_force: f32,
    pub gravity: f32,
    pub air_drag: f32,
    pub wind_strength: f32,
    /// Degrees, measured from +x towards +z.
    pub wind_direction: f32,
    /// Seconds after detonation during which sparks ignore gravity.
    pub hover_duration: f32,

    // Fade
    pub fade_speed: f32,
    pub sparkle_intensity: f32,

    // Rocket
    pub rocket_speed: f32,
    pub rocket_size: f32,
    pub rocket_trail_length: usize,

    // Environment
    pub smoke_enabled: bool,
    pub star_count: usize,
    pub listener_position: [f32; 3],

    // Timing
    pub auto_launch: bool,
    /// Milliseconds between automatic launches.
    pub launch_interval: f64,
    pub finale_mode: bool,

    // Audio
    pub sound_enabled: bool,
    pub volume: f32,

    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            particle_size: 0.9,
            explosion_force: 3.5,
            gravity: 0.004,
            air_drag: 0.015,
            wind_strength: 0.3,
            wind_direction: 0.0,
            hover_duration: 0.8,
            fade_speed: 0.006,
            sparkle_intensity: 0.5,
            rocket_speed: 1.2,
            rocket_size: 2.5,
            rocket_trail_length: 20,
            smoke_enabled: true,
            star_count: 4000,
            listener_position: [0.0, 20.0, 180.0],
            auto_launch: true,
            launch_interval: 2500.0,
            finale_mode: false,
            sound_enabled: true,
            volume: 0.6,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn listener(&self) -> Vec3 {
        Vec3::from_array(self.listener_position)
    }

    pub fn validate(&self) -> Result<()> {
        if self.particle_count > MAX_PARTICLE_COUNT {
            return Err(invalid(
                "particle_count",
                format!("{} exceeds the maximum of {}", self.particle_count, MAX_PARTICLE_COUNT),
            ));
        }

        let non_negative = [
            ("particle_size", self.particle_size),
            ("explosion_force", self.explosion_force),
            ("gravity", self.gravity),
            ("air_drag", self.air_drag),
            ("wind_strength", self.wind_strength),
            ("hover_duration", self.hover_duration),
            ("fade_speed", self.fade_speed),
            ("sparkle_intensity", self.sparkle_intensity),
            ("rocket_speed", self.rocket_speed),
            ("rocket_size", self.rocket_size),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("expected a finite value >= 0, got {value}")));
            }
        }

        if !self.wind_direction.is_finite() {
            return Err(invalid("wind_direction", "must be finite".to_string()));
        }
        if self.listener_position.iter().any(|c| !c.is_finite()) {
            return Err(invalid("listener_position", "must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(invalid("volume", format!("expected 0..=1, got {}", self.volume)));
        }
        if !self.launch_interval.is_finite() || self.launch_interval <= 0.0 {
            return Err(invalid(
                "launch_interval",
                format!("expected a positive interval in ms, got {}", self.launch_interval),
            ));
        }
        if !(1..=MAX_TRAIL_LENGTH).contains(&self.rocket_trail_length) {
            return Err(invalid(
                "rocket_trail_length",
                format!("expected 1..={MAX_TRAIL_LENGTH}, got {}", self.rocket_trail_length),
            ));
        }
        if self.star_count > MAX_STAR_COUNT {
            return Err(invalid(
                "star_count",
                format!("{} exceeds the maximum of {}", self.star_count, MAX_STAR_COUNT),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfig { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 20_000);
        assert_eq!(config.listener(), Vec3::new(0.0, 20.0, 180.0));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            particle_count = 5000
            finale_mode = true
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.particle_count, 5000);
        assert!(config.finale_mode);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.gravity, Config::default().gravity);
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let err = Config::from_toml_str("volume = 1.5").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "volume", .. }));
    }

    #[test]
    fn rejects_negative_gravity() {
        let config = Config {
            gravity: -0.1,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { field: "gravity", .. })
        ));
    }

    #[test]
    fn rejects_oversized_allocations() {
        let err = Config::from_toml_str("star_count = 4000000000").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "star_count", .. }));

        let err = Config::from_toml_str("rocket_trail_length = 100000").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "rocket_trail_length", .. }));

        let err = Config::from_toml_str("rocket_trail_length = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "rocket_trail_length", .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Config::from_toml_str("particle_count = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
