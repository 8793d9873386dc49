use fastrand::Rng;
use glam::Vec3;

const GOLD: Vec3 = Vec3::new(1.0, 0.85, 0.4);
const GOLD_FADE: Vec3 = Vec3::new(1.0, 0.3, 0.1); // Burns out red
const SILVER: Vec3 = Vec3::new(0.9, 0.95, 1.0);
const SILVER_FADE: Vec3 = Vec3::new(0.4, 0.6, 1.0); // Burns out blue

/// Colours of one shell, all linear RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub colors: Vec<Vec3>,
    /// Colour the stars drift towards during their last half of life.
    pub transition: Option<Vec3>,
}

impl Palette {
    pub fn random(color_shift: bool, rng: &mut Rng) -> Self {
        let roll = rng.f32();
        let hue = rng.f32();

        if roll < 0.25 {
            // Single colour, optionally darkening as it burns
            Self {
                colors: vec![hsl(hue, 0.9, 0.6)],
                transition: color_shift.then(|| hsl(hue, 0.7, 0.3)),
            }
        } else if roll < 0.5 {
            // Complementary
            Self {
                colors: vec![hsl(hue, 0.95, 0.6), hsl((hue + 0.5) % 1.0, 0.95, 0.55)],
                transition: None,
            }
        } else if roll < 0.75 {
            // Triadic
            Self {
                colors: vec![
                    hsl(hue, 0.9, 0.6),
                    hsl((hue + 0.33) % 1.0, 0.9, 0.55),
                    hsl((hue + 0.66) % 1.0, 0.9, 0.55),
                ],
                transition: None,
            }
        } else if rng.bool() {
            Self {
                colors: vec![GOLD],
                transition: Some(GOLD_FADE),
            }
        } else {
            Self {
                colors: vec![SILVER],
                transition: Some(SILVER_FADE),
            }
        }
    }

    pub fn primary(&self) -> Vec3 {
        self.colors.first().copied().unwrap_or(Vec3::ONE)
    }

    pub fn pick(&self, rng: &mut Rng) -> Vec3 {
        if self.colors.is_empty() {
            return Vec3::ONE;
        }
        self.colors[rng.usize(0..self.colors.len())]
    }
}

/// HSL in sRGB space converted to linear RGB.
pub fn hsl(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let srgb = if s == 0.0 {
        Vec3::splat(l)
    } else {
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Vec3::new(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    };

    Vec3::new(
        srgb_to_linear(srgb.x),
        srgb_to_linear(srgb.y),
        srgb_to_linear(srgb.z),
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}
