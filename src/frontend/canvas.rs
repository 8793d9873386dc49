use super::camera::Camera;
use glam::Vec3;
use skyburst::render::{Layer, PointCloud, RenderService};
use skyburst::trail::TrailPoint;
use std::io::{self, Write};

const EXPOSURE: f32 = 1.2;
const TRAIL_GAIN: f32 = 0.8;
const MAX_SPLAT_RADIUS: f32 = 3.0;

fn layer_gain(layer: Layer) -> f32 {
    match layer {
        Layer::Stars => 0.25,
        Layer::Smoke => 1.0,
        Layer::Sparks => 1.2,
        Layer::RocketHead => 2.0,
    }
}

/// Additive light accumulator drawn with half-block cells, two pixels per
/// terminal cell.
pub struct TerminalCanvas {
    width: usize,
    height: usize,
    eye: Vec3,
    camera: Camera,
    background: (u8, u8, u8),
    light: Vec<Vec3>,
    afterglow: Vec<Vec3>,
    afterglow_fade: Vec<f32>,
    output_buf: Vec<u8>,
}

impl TerminalCanvas {
    pub fn new(cols: usize, rows: usize, eye: Vec3, background: (u8, u8, u8)) -> Self {
        let width = cols.max(1);
        let height = rows.max(1) * 2;
        Self {
            width,
            height,
            eye,
            camera: Camera::new(eye, width as f32 / height as f32),
            background,
            light: vec![Vec3::ZERO; width * height],
            afterglow: vec![Vec3::ZERO; width * height],
            afterglow_fade: vec![0.0; width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        *self = Self::new(cols, rows, self.eye, self.background);
    }

    fn splat(&mut self, position: Vec3, color: Vec3, size: f32, persistence: Option<f32>) {
        let Some((ndc, scale)) = self.camera.project(position) else {
            return;
        };
        let px = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let py = (1.0 - ndc.y) * 0.5 * self.height as f32;
        let radius = (size * scale * 0.25 * self.height as f32).min(MAX_SPLAT_RADIUS);

        // Spread the same energy over the covered pixels.
        let reach = radius.floor() as i32;
        let cells = ((2 * reach + 1) * (2 * reach + 1)) as f32;
        let energy = color * (1.0 + radius) / cells;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let x = px.floor() as i32 + dx;
                let y = py.floor() as i32 + dy;
                if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                    continue;
                }
                let idx = y as usize * self.width + x as usize;
                self.light[idx] += energy;
                if let Some(fade) = persistence {
                    self.afterglow[idx] = self.afterglow[idx].max(energy);
                    self.afterglow_fade[idx] = self.afterglow_fade[idx].max(fade);
                }
            }
        }
    }

    fn cell_color(&self, idx: usize) -> (u8, u8, u8) {
        let radiance = self.light[idx] + self.afterglow[idx];
        let bg = self.background;
        let mix = |bg: u8, x: f32| {
            let mapped = (1.0 - (-x * EXPOSURE).exp()).powf(1.0 / 2.2);
            (bg as f32 + (255.0 - bg as f32) * mapped) as u8
        };
        (
            mix(bg.0, radiance.x),
            mix(bg.1, radiance.y),
            mix(bg.2, radiance.z),
        )
    }

    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot_color: (u8, u8, u8) = (255, 255, 255);

        // Render using half-blocks
        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top_color = self.cell_color(top_idx);
                let bot_color = self.cell_color(bot_idx);

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl RenderService for TerminalCanvas {
    fn begin_frame(&mut self) {
        self.light.fill(Vec3::ZERO);
        for (glow, fade) in self.afterglow.iter_mut().zip(self.afterglow_fade.iter_mut()) {
            *glow *= *fade;
            if glow.max_element() < 1e-3 {
                *glow = Vec3::ZERO;
                *fade = 0.0;
            }
        }
    }

    fn draw_points(&mut self, cloud: PointCloud<'_>) {
        let gain = layer_gain(cloud.layer);
        for (position, color, size) in cloud.visible() {
            self.splat(position, color * gain, size, cloud.persistence);
        }
    }

    fn draw_trail(&mut self, trail: &[TrailPoint]) {
        for point in trail {
            self.splat(point.position, point.color * TRAIL_GAIN, point.size, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EYE: Vec3 = Vec3::new(0.0, 20.0, 180.0);

    fn brightest(pixels: &[Vec3]) -> usize {
        (0..pixels.len())
            .max_by(|&a, &b| pixels[a].element_sum().total_cmp(&pixels[b].element_sum()))
            .unwrap()
    }

    #[test]
    fn empty_frame_is_background() {
        let mut canvas = TerminalCanvas::new(4, 2, EYE, (10, 20, 30));
        canvas.begin_frame();
        assert_eq!(canvas.cell_color(0), (10, 20, 30));

        let mut out = Vec::new();
        canvas.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('▄').count(), 8);
        assert!(text.contains("\x1b[48;2;10;20;30m"));
    }

    #[test]
    fn sparks_light_up_the_centre() {
        let mut canvas = TerminalCanvas::new(40, 20, EYE, (0, 0, 0));
        canvas.begin_frame();
        let positions = [Vec3::new(0.0, 30.0, 0.0)];
        let colors = [Vec3::new(1.0, 0.5, 0.2)];
        let sizes = [0.9];
        canvas.draw_points(PointCloud::new(Layer::Sparks, &positions, &colors, &sizes));

        let idx = brightest(&canvas.light);
        let (x, y) = (idx % canvas.width, idx / canvas.width);
        assert!(x.abs_diff(20) <= 1 && y.abs_diff(20) <= 1, "{x},{y}");
        let (r, g, b) = canvas.cell_color(idx);
        assert!(r > g && g > b);
    }

    #[test]
    fn afterglow_decays_between_frames() {
        let mut canvas = TerminalCanvas::new(40, 20, EYE, (0, 0, 0));
        canvas.begin_frame();
        let positions = [Vec3::new(0.0, 30.0, 0.0)];
        let colors = [Vec3::ONE];
        let sizes = [0.9];
        canvas.draw_points(
            PointCloud::new(Layer::Sparks, &positions, &colors, &sizes).with_persistence(Some(0.5)),
        );
        let idx = brightest(&canvas.afterglow);
        let lit = canvas.afterglow[idx];
        assert!(lit.max_element() > 0.0);

        canvas.begin_frame();
        assert_eq!(canvas.light[idx], Vec3::ZERO);
        assert!((canvas.afterglow[idx] - lit * 0.5).abs().max_element() < 1e-6);
    }
}
