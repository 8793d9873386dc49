use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    pub color: Vec3,
    pub size: f32,
}

/// Fixed-length history of recent rocket positions. Pushing overwrites the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct RocketTrail {
    slots: Vec<Vec3>,
    head: usize,
}

impl RocketTrail {
    /// A trail of `length` slots (at least one), all seeded at `origin`.
    pub fn new(length: usize, origin: Vec3) -> Self {
        Self {
            slots: vec![origin; length.max(1)],
            head: 0,
        }
    }

    pub fn push(&mut self, position: Vec3) {
        self.head = (self.head + self.slots.len() - 1) % self.slots.len();
        self.slots[self.head] = position;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Positions from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        let (older, newer) = self.slots.split_at(self.head);
        newer.iter().chain(older.iter()).copied()
    }

    /// Writes styled points into `out`, fading from hot orange at the head.
    pub fn styled_into(&self, rocket_size: f32, out: &mut Vec<TrailPoint>) {
        out.clear();
        let n = self.slots.len() as f32;
        out.extend(self.iter().enumerate().map(|(i, position)| {
            let alpha = 1.0 - i as f32 / n;
            TrailPoint {
                position,
                color: Vec3::new(1.0, 0.6 * alpha, 0.2 * alpha),
                size: rocket_size * 0.8 * alpha,
            }
        }));
    }
}
