use crate::config::Config;
use glam::Vec2;
use std::f32::consts::PI;

// Converts the configured strength into per-tick displacement units.
const DISPLACEMENT_SCALE: f32 = 0.001;
// Common period of both wobble terms (4π and 20π/3), so wrapping is seamless.
const TIME_WRAP: f32 = 20.0 * PI * 159.0;

/// Global horizontal wind. Only [`WindField::update`] writes it.
#[derive(Debug, Clone, Default)]
pub struct WindField {
    time: f32,
    vector: Vec2,
}

impl WindField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dt: f32, config: &Config) {
        self.time += dt;
        if self.time > TIME_WRAP {
            self.time -= TIME_WRAP;
        }

        let angle = config.wind_direction.to_radians() + (self.time * 0.5).sin() * 0.3;
        let strength = config.wind_strength * (0.7 + (self.time * 0.3).sin() * 0.3);

        self.vector = Vec2::new(angle.cos(), angle.sin()) * strength * DISPLACEMENT_SCALE;
    }

    /// Wind as (x, z).
    pub fn vector(&self) -> Vec2 {
        self.vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_config_produces_no_wind() {
        let config = Config {
            wind_strength: 0.0,
            ..Config::default()
        };
        let mut wind = WindField::new();
        for _ in 0..100 {
            wind.update(1.0 / 60.0, &config);
            assert_eq!(wind.vector(), Vec2::ZERO);
        }
    }

    #[test]
    fn magnitude_stays_within_modulation_band() {
        let config = Config::default();
        let mut wind = WindField::new();
        for _ in 0..2000 {
            wind.update(0.05, &config);
            let magnitude = wind.vector().length();
            let lo = config.wind_strength * 0.4 * DISPLACEMENT_SCALE;
            let hi = config.wind_strength * 1.0 * DISPLACEMENT_SCALE;
            assert!(magnitude >= lo - 1e-7 && magnitude <= hi + 1e-7, "{magnitude}");
        }
    }

    #[test]
    fn direction_wobbles_around_configured_heading() {
        let config = Config {
            wind_direction: 90.0,
            ..Config::default()
        };
        let mut wind = WindField::new();
        for _ in 0..500 {
            wind.update(0.1, &config);
            let v = wind.vector();
            let heading = v.y.atan2(v.x);
            assert!((heading - 90f32.to_radians()).abs() <= 0.3 + 1e-4);
        }
    }

    #[test]
    fn time_wrap_is_seamless() {
        let config = Config {
            wind_direction: 40.0,
            ..Config::default()
        };
        let close = |a: &WindField, b: &WindField| (a.vector() - b.vector()).length() < 1e-6;

        // A field just short of the wrap matches one a full period earlier.
        let mut wrapped = WindField::new();
        wrapped.time = TIME_WRAP - 0.05;
        let mut reference = WindField::new();
        reference.time = -0.05;
        wrapped.update(0.01, &config);
        reference.update(0.01, &config);
        assert!(close(&wrapped, &reference));

        wrapped.update(0.1, &config);
        reference.update(0.1, &config);
        assert!(wrapped.time < 1.0);
        assert!(close(&wrapped, &reference));
    }
}
