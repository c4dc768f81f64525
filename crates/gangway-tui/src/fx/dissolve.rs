use std::f32::consts::TAU;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use gangway_core::config::EffectsConfig;

use super::easing::ease_out_cubic;
use super::raster::{CellPixel, Raster};
use super::rng::RandomSource;

/// Fraction of the run over which layer start times are spread: the
/// last layer only begins once 60% of the clock has elapsed.
const STAGGER_SPAN: f32 = 0.6;
const ROTATION_RANGE_DEG: f32 = 15.0;
/// Fragments dimmer than this are not worth a cell write.
const MIN_VISIBLE_OPACITY: f32 = 0.05;

#[derive(Debug, Clone)]
pub(crate) struct DissolveConfig {
    pub(crate) layer_count: usize,
    pub(crate) scatter_repeats: usize,
    pub(crate) duration: Duration,
    pub(crate) drift_cells: f32,
}

impl DissolveConfig {
    pub(crate) fn from_effects(effects: &EffectsConfig) -> Self {
        Self {
            layer_count: effects.layer_count.max(1),
            scatter_repeats: effects.scatter_repeats.max(1),
            duration: Duration::from_millis(effects.dissolve_ms.max(1)),
            drift_cells: effects.drift_cells,
        }
    }
}

#[derive(Debug)]
struct ScatterLayer {
    cells: Vec<Option<CellPixel>>,
    angle: f32,
    rotation: f32,
    delay: f32,
    populated: usize,
    writes: usize,
}

/// Instantaneous transform of one scatter layer. Rotation is carried
/// for completeness even though a cell grid cannot express it; the
/// renderer maps translation and opacity only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayerPose {
    pub(crate) dx: f32,
    pub(crate) dy: f32,
    pub(crate) rotation: f32,
    pub(crate) opacity: f32,
}

/// One card dissolve: the captured raster split into staggered scatter
/// layers that drift outward and fade. The run owns all of its state;
/// dropping it is the cleanup.
pub(crate) struct DissolveRun {
    origin: Rect,
    width: u16,
    height: u16,
    layers: Vec<ScatterLayer>,
    config: DissolveConfig,
}

impl DissolveRun {
    pub(crate) fn new(
        raster: Raster,
        origin: Rect,
        config: DissolveConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let count = config.layer_count;
        let width = raster.width();
        let height = raster.height();
        let cell_total = width as usize * height as usize;

        let mut layers: Vec<ScatterLayer> = (0..count)
            .map(|index| ScatterLayer {
                cells: vec![None; cell_total],
                angle: rng.next_f32() * TAU,
                rotation: (rng.next_f32() * 2.0 - 1.0) * ROTATION_RANGE_DEG,
                delay: index as f32 / count as f32 * STAGGER_SPAN,
                populated: 0,
                writes: 0,
            })
            .collect();

        // Every visible cell gets `scatter_repeats` independent layer
        // assignments, biased rightward so the card dissolves in a
        // left-to-right wave. Repeat hits on the same layer are allowed;
        // this is a lossy decomposition, not a partition.
        for y in 0..height {
            for x in 0..width {
                let Some(pixel) = raster.get(x, y) else {
                    continue;
                };
                for _ in 0..config.scatter_repeats {
                    let bias = 2.0 * x as f32 / width as f32;
                    let raw = count as f32 * (rng.next_f32() + bias) / 3.0;
                    let index = (raw as usize).min(count - 1);

                    let layer = &mut layers[index];
                    let slot = y as usize * width as usize + x as usize;
                    if layer.cells[slot].is_none() {
                        layer.populated += 1;
                    }
                    layer.cells[slot] = Some(pixel);
                    layer.writes += 1;
                }
            }
        }

        Self {
            origin,
            width,
            height,
            layers,
            config,
        }
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f32() / self.config.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub(crate) fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.config.duration
    }

    fn pose_at(&self, layer: &ScatterLayer, progress: f32) -> LayerPose {
        let adjusted = ((progress - layer.delay) / (1.0 - layer.delay)).clamp(0.0, 1.0);
        if adjusted <= 0.0 {
            return LayerPose {
                dx: 0.0,
                dy: 0.0,
                rotation: 0.0,
                opacity: 1.0,
            };
        }

        let eased = ease_out_cubic(adjusted);
        LayerPose {
            dx: self.config.drift_cells * layer.angle.sin() * eased,
            dy: self.config.drift_cells * layer.angle.cos() * eased,
            rotation: layer.rotation * eased,
            opacity: 1.0 - eased,
        }
    }

    pub(crate) fn render(&self, elapsed: Duration, buffer: &mut Buffer) {
        let progress = self.progress(elapsed);
        let bounds = buffer.area;

        for layer in &self.layers {
            if layer.populated == 0 {
                continue;
            }
            let pose = self.pose_at(layer, progress);
            if pose.opacity <= MIN_VISIBLE_OPACITY {
                continue;
            }

            let dx = pose.dx.round() as i32;
            // Terminal cells are roughly twice as tall as wide; halve
            // the vertical drift so the scatter reads as circular.
            let dy = (pose.dy * 0.5).round() as i32;

            for y in 0..self.height {
                for x in 0..self.width {
                    let slot = y as usize * self.width as usize + x as usize;
                    let Some(pixel) = layer.cells[slot] else {
                        continue;
                    };

                    let tx = i32::from(self.origin.x) + i32::from(x) + dx;
                    let ty = i32::from(self.origin.y) + i32::from(y) + dy;
                    if tx < i32::from(bounds.x)
                        || ty < i32::from(bounds.y)
                        || tx >= i32::from(bounds.right())
                        || ty >= i32::from(bounds.bottom())
                    {
                        continue;
                    }

                    let Some(cell) = buffer.cell_mut((tx as u16, ty as u16)) else {
                        continue;
                    };
                    let (symbol, style) = fragment_appearance(pixel, pose.opacity);
                    cell.set_char(symbol);
                    cell.set_style(style);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scatter_writes(&self) -> usize {
        self.layers.iter().map(|layer| layer.writes).sum()
    }

    #[cfg(test)]
    pub(crate) fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[cfg(test)]
    pub(crate) fn layer_delay(&self, index: usize) -> f32 {
        self.layers[index].delay
    }

    #[cfg(test)]
    pub(crate) fn layer_writes(&self, index: usize) -> usize {
        self.layers[index].writes
    }

    #[cfg(test)]
    pub(crate) fn pose(&self, index: usize, progress: f32) -> LayerPose {
        self.pose_at(&self.layers[index], progress)
    }

    #[cfg(test)]
    pub(crate) fn populated_by_layer(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.populated).collect()
    }
}

/// Fades a fragment by stepping it through dim styling and a shade
/// glyph instead of alpha, which the terminal does not have.
fn fragment_appearance(pixel: CellPixel, opacity: f32) -> (char, Style) {
    if opacity > 0.6 {
        (pixel.symbol, pixel.style)
    } else if opacity > 0.3 {
        (pixel.symbol, pixel.style.add_modifier(Modifier::DIM))
    } else {
        ('░', pixel.style.add_modifier(Modifier::DIM))
    }
}
