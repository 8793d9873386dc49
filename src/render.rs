use crate::trail::TrailPoint;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Stars,
    Smoke,
    Sparks,
    RocketHead,
}

/// Flat per-point buffers for one draw call. All slices have the same length.
#[derive(Debug, Clone, Copy)]
pub struct PointCloud<'a> {
    pub layer: Layer,
    pub positions: &'a [Vec3],
    pub colors: &'a [Vec3],
    pub sizes: &'a [f32],
    /// Per-frame afterimage retention for shells that leave trails.
    pub persistence: Option<f32>,
}

impl<'a> PointCloud<'a> {
    pub fn new(layer: Layer, positions: &'a [Vec3], colors: &'a [Vec3], sizes: &'a [f32]) -> Self {
        Self {
            layer,
            positions,
            colors,
            sizes,
            persistence: None,
        }
    }

    pub fn with_persistence(mut self, persistence: Option<f32>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Points with a visible colour and size.
    pub fn visible(&self) -> impl Iterator<Item = (Vec3, Vec3, f32)> + '_ {
        self.positions
            .iter()
            .zip(self.colors)
            .zip(self.sizes)
            .filter(|(_, size)| **size > 0.0)
            .filter(|((_, color), _)| color.max_element() > 0.0)
            .map(|((p, c), s)| (*p, *c, *s))
    }
}

/// Receives the scene once per tick, after physics.
pub trait RenderService {
    fn begin_frame(&mut self) {}

    fn draw_points(&mut self, cloud: PointCloud<'_>);

    fn draw_trail(&mut self, trail: &[TrailPoint]);

    fn end_frame(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_points_are_skipped() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let colors = [Vec3::ONE, Vec3::ZERO, Vec3::ONE];
        let sizes = [1.0, 1.0, 0.0];
        let cloud = PointCloud::new(Layer::Sparks, &positions, &colors, &sizes);
        let visible: Vec<_> = cloud.visible().collect();
        assert_eq!(visible, vec![(Vec3::ZERO, Vec3::ONE, 1.0)]);
    }
}
