//! The eight shell types and their static burst profiles.

use crate::error::Error;
use crate::pattern::SpreadPattern;
use bitflags::bitflags;
use fastrand::Rng;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Behaviour switches derived from a shell's type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShellFlags: u8 {
        const TRAILS = 1 << 0;
        const COLOR_SHIFT = 1 << 1;
        const LONG_LIFE = 1 << 2;
        const SPLITS = 1 << 3;
        const STROBE = 1 << 4;
        const GLITTER = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplosionKind {
    Chrysanthemum, // Dense sphere with trails
    Peony,         // Plain sphere
    Willow,        // Long-lived drooping trails
    Palm,          // Thick upward fronds
    Ring,          // Flat ring
    Crossette,     // Splits mid-air
    Strobe,        // Blinking stars
    Glitter,       // Flickering stars
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionProfile {
    pub name: &'static str,
    pub particle_multiplier: f64,
    pub pattern: SpreadPattern,
    /// Per-frame trail persistence, present only for trailing shells.
    pub trail_fade: Option<f32>,
    pub gravity: f32,
    pub flags: ShellFlags,
}

impl ExplosionProfile {
    pub fn has_trails(&self) -> bool {
        self.flags.contains(ShellFlags::TRAILS)
    }
}

const CHRYSANTHEMUM: ExplosionProfile = ExplosionProfile {
    name: "Chrysanthemum",
    particle_multiplier: 1.0,
    pattern: SpreadPattern::Sphere,
    trail_fade: Some(0.85),
    gravity: 1.0,
    flags: ShellFlags::TRAILS.union(ShellFlags::COLOR_SHIFT),
};

const PEONY: ExplosionProfile = ExplosionProfile {
    name: "Peony",
    particle_multiplier: 0.8,
    pattern: SpreadPattern::Sphere,
    trail_fade: None,
    gravity: 1.2,
    flags: ShellFlags::empty(),
};

const WILLOW: ExplosionProfile = ExplosionProfile {
    name: "Willow",
    particle_multiplier: 1.2,
    pattern: SpreadPattern::Weeping,
    trail_fade: Some(0.92),
    gravity: 0.6,
    flags: ShellFlags::TRAILS
        .union(ShellFlags::COLOR_SHIFT)
        .union(ShellFlags::LONG_LIFE),
};

const PALM: ExplosionProfile = ExplosionProfile {
    name: "Palm",
    particle_multiplier: 0.6,
    pattern: SpreadPattern::Palm,
    trail_fade: Some(0.88),
    gravity: 1.0,
    flags: ShellFlags::TRAILS,
};

const RING: ExplosionProfile = ExplosionProfile {
    name: "Ring",
    particle_multiplier: 0.5,
    pattern: SpreadPattern::Ring,
    trail_fade: None,
    gravity: 1.0,
    flags: ShellFlags::empty(),
};

const CROSSETTE: ExplosionProfile = ExplosionProfile {
    name: "Crossette",
    particle_multiplier: 0.4,
    pattern: SpreadPattern::Crossette,
    trail_fade: Some(0.8),
    gravity: 1.0,
    flags: ShellFlags::TRAILS.union(ShellFlags::SPLITS),
};

const STROBE: ExplosionProfile = ExplosionProfile {
    name: "Strobe",
    particle_multiplier: 0.7,
    pattern: SpreadPattern::Sphere,
    trail_fade: None,
    gravity: 0.8,
    flags: ShellFlags::STROBE,
};

const GLITTER: ExplosionProfile = ExplosionProfile {
    name: "Glitter",
    particle_multiplier: 1.3,
    pattern: SpreadPattern::Sphere,
    trail_fade: Some(0.75),
    gravity: 1.1,
    flags: ShellFlags::TRAILS
        .union(ShellFlags::COLOR_SHIFT)
        .union(ShellFlags::GLITTER),
};

impl ExplosionKind {
    pub const ALL: [ExplosionKind; 8] = [
        ExplosionKind::Chrysanthemum,
        ExplosionKind::Peony,
        ExplosionKind::Willow,
        ExplosionKind::Palm,
        ExplosionKind::Ring,
        ExplosionKind::Crossette,
        ExplosionKind::Strobe,
        ExplosionKind::Glitter,
    ];

    /// Used whenever a requested type cannot be resolved: sphere burst, deep boom.
    pub const FALLBACK: ExplosionKind = ExplosionKind::Peony;

    pub fn random(rng: &mut Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }

    pub fn profile(self) -> &'static ExplosionProfile {
        match self {
            ExplosionKind::Chrysanthemum => &CHRYSANTHEMUM,
            ExplosionKind::Peony => &PEONY,
            ExplosionKind::Willow => &WILLOW,
            ExplosionKind::Palm => &PALM,
            ExplosionKind::Ring => &RING,
            ExplosionKind::Crossette => &CROSSETTE,
            ExplosionKind::Strobe => &STROBE,
            ExplosionKind::Glitter => &GLITTER,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ExplosionKind::Chrysanthemum => "chrysanthemum",
            ExplosionKind::Peony => "peony",
            ExplosionKind::Willow => "willow",
            ExplosionKind::Palm => "palm",
            ExplosionKind::Ring => "ring",
            ExplosionKind::Crossette => "crossette",
            ExplosionKind::Strobe => "strobe",
            ExplosionKind::Glitter => "glitter",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }

    /// Lenient lookup: unknown keys fall back to [`ExplosionKind::FALLBACK`].
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            log::warn!("unknown explosion type {key:?}, using {}", Self::FALLBACK);
            Self::FALLBACK
        })
    }
}

impl fmt::Display for ExplosionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ExplosionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| Error::UnknownExplosionType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for kind in ExplosionKind::ALL {
            assert_eq!(kind.key().parse::<ExplosionKind>().unwrap(), kind);
        }
        assert_eq!(ExplosionKind::from_key("  WILLOW "), Some(ExplosionKind::Willow));
    }

    #[test]
    fn unknown_key_falls_back_to_sphere_shell() {
        let kind = ExplosionKind::from_key_or_default("kamuro");
        assert_eq!(kind, ExplosionKind::FALLBACK);
        assert_eq!(kind.profile().pattern, SpreadPattern::Sphere);
        assert!(matches!(
            "kamuro".parse::<ExplosionKind>(),
            Err(Error::UnknownExplosionType(name)) if name == "kamuro"
        ));
    }

    #[test]
    fn trail_fade_present_only_for_trailing_shells() {
        for kind in ExplosionKind::ALL {
            let profile = kind.profile();
            assert_eq!(profile.has_trails(), profile.trail_fade.is_some(), "{kind}");
        }
    }

    #[test]
    fn behaviour_flags_match_shell_names() {
        assert!(ExplosionKind::Crossette.profile().flags.contains(ShellFlags::SPLITS));
        assert!(ExplosionKind::Willow.profile().flags.contains(ShellFlags::LONG_LIFE));
        assert!(ExplosionKind::Strobe.profile().flags.contains(ShellFlags::STROBE));
        assert!(ExplosionKind::Glitter.profile().flags.contains(ShellFlags::GLITTER));
        assert!(ExplosionKind::Peony.profile().flags.is_empty());
        assert_eq!(ExplosionKind::Peony.profile().particle_multiplier, 0.8);
    }

    #[test]
    fn random_covers_every_kind() {
        let mut rng = Rng::with_seed(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(ExplosionKind::random(&mut rng));
        }
        assert_eq!(seen.len(), ExplosionKind::ALL.len());
    }
}
