use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use tracing::debug;

use gangway_core::config::EffectsConfig;
use gangway_core::step::{STEPS, StepId, step_index};

use super::easing::ease_out;
use super::rng::{RandomSource, shuffled_indices};
use crate::theme;

/// Source resolution the procedural panoramas are built at. Sampling
/// treats one cell as a 1x2 pixel block so the imagery keeps its aspect
/// on any viewport.
const TEX_WIDTH: usize = 144;
const TEX_HEIGHT: usize = 81;
/// Fraction of texture space the displacement map may push a sample
/// during a crossfade.
const DISPLACE_STRENGTH: f32 = 0.08;
/// Peak camera-drift excursion in texture space during the settle.
const DRIFT_AMPLITUDE: f32 = 0.015;

#[derive(Debug, Clone)]
pub(crate) struct Texture {
    width: usize,
    height: usize,
    texels: Vec<(u8, u8, u8)>,
}

impl Texture {
    /// Cover-fit sample: the texture is scaled to cover the viewport
    /// without stretching, overflow cropped equally on both sides.
    fn sample(&self, cell_x: u16, cell_y: u16, viewport: Rect, offset: (f32, f32)) -> (u8, u8, u8) {
        let vp_w = f32::from(viewport.width.max(1));
        let vp_h = f32::from(viewport.height.max(1)) * 2.0;
        let px = f32::from(cell_x.saturating_sub(viewport.x)) + 0.5;
        let py = (f32::from(cell_y.saturating_sub(viewport.y)) + 0.5) * 2.0;

        let scale = (vp_w / self.width as f32).max(vp_h / self.height as f32);
        let u = (px - vp_w / 2.0) / scale + self.width as f32 / 2.0 + offset.0 * self.width as f32;
        let v =
            (py - vp_h / 2.0) / scale + self.height as f32 / 2.0 + offset.1 * self.height as f32;

        let tx = (u.max(0.0) as usize).min(self.width - 1);
        let ty = (v.max(0.0) as usize).min(self.height - 1);
        self.texels[ty * self.width + tx]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DisplacementMap {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl DisplacementMap {
    fn sample(&self, cell_x: u16, cell_y: u16, viewport: Rect) -> f32 {
        let x = cell_x.saturating_sub(viewport.x) as usize * self.width
            / viewport.width.max(1) as usize;
        let y = cell_y.saturating_sub(viewport.y) as usize * self.height
            / viewport.height.max(1) as usize;
        self.values[y.min(self.height - 1) * self.width + x.min(self.width - 1)]
    }
}

/// One texture per step plus the shared displacement map.
pub(crate) struct TextureSet {
    by_step: Vec<Texture>,
    displacement: DisplacementMap,
}

/// Palette variants the per-mount shuffle assigns to steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panorama {
    Dawn,
    Harbor,
    Nebula,
    Ember,
    Meadow,
    Midnight,
}

const PANORAMA_POOL: [Panorama; 6] = [
    Panorama::Dawn,
    Panorama::Harbor,
    Panorama::Nebula,
    Panorama::Ember,
    Panorama::Meadow,
    Panorama::Midnight,
];

impl Panorama {
    fn stops(self) -> [(u8, u8, u8); 3] {
        match self {
            Self::Dawn => [(24, 18, 48), (148, 72, 104), (244, 180, 132)],
            Self::Harbor => [(10, 24, 40), (28, 84, 120), (120, 188, 204)],
            Self::Nebula => [(14, 10, 34), (84, 40, 128), (200, 120, 220)],
            Self::Ember => [(28, 12, 10), (140, 52, 28), (240, 156, 72)],
            Self::Meadow => [(10, 28, 18), (44, 108, 64), (164, 212, 128)],
            Self::Midnight => [(8, 10, 20), (30, 40, 72), (96, 120, 168)],
        }
    }

    fn frequencies(self) -> (f32, f32, f32) {
        match self {
            Self::Dawn => (2.1, 1.3, 0.7),
            Self::Harbor => (1.4, 2.6, 1.1),
            Self::Nebula => (3.2, 1.9, 1.6),
            Self::Ember => (2.7, 2.2, 0.9),
            Self::Meadow => (1.2, 1.7, 1.4),
            Self::Midnight => (1.8, 1.1, 2.3),
        }
    }
}

fn build_panorama(kind: Panorama) -> Texture {
    let (fx, fy, fd) = kind.frequencies();
    let stops = kind.stops();
    let mut texels = Vec::with_capacity(TEX_WIDTH * TEX_HEIGHT);

    for y in 0..TEX_HEIGHT {
        for x in 0..TEX_WIDTH {
            let nx = x as f32 / TEX_WIDTH as f32;
            let ny = y as f32 / TEX_HEIGHT as f32;
            let wave = ((nx * fx * std::f32::consts::TAU).sin()
                + (ny * fy * std::f32::consts::TAU).sin()
                + ((nx + ny) * fd * std::f32::consts::TAU).sin())
                / 3.0;
            let value = (wave * 0.5 + 0.5).clamp(0.0, 1.0);
            texels.push(gradient(stops, value));
        }
    }

    Texture {
        width: TEX_WIDTH,
        height: TEX_HEIGHT,
        texels,
    }
}

fn gradient(stops: [(u8, u8, u8); 3], value: f32) -> (u8, u8, u8) {
    let (from, to, local) = if value < 0.5 {
        (stops[0], stops[1], value * 2.0)
    } else {
        (stops[1], stops[2], (value - 0.5) * 2.0)
    };
    (
        lerp_channel(from.0, to.0, local),
        lerp_channel(from.1, to.1, local),
        lerp_channel(from.2, to.2, local),
    )
}

fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
}

fn build_displacement() -> DisplacementMap {
    let mut values = Vec::with_capacity(TEX_WIDTH * TEX_HEIGHT);
    for y in 0..TEX_HEIGHT {
        for x in 0..TEX_WIDTH {
            // Classic shader hash; stable across runs on purpose so the
            // distortion pattern itself is a fixed asset.
            let raw = ((x as f32 * 12.9898 + y as f32 * 78.233).sin() * 43758.547).fract();
            values.push(raw.abs());
        }
    }
    DisplacementMap {
        width: TEX_WIDTH,
        height: TEX_HEIGHT,
        values,
    }
}

pub(crate) fn build_texture_set(assignment: &[usize]) -> TextureSet {
    let by_step = assignment
        .iter()
        .map(|&pool_index| build_panorama(PANORAMA_POOL[pool_index % PANORAMA_POOL.len()]))
        .collect();
    TextureSet {
        by_step,
        displacement: build_displacement(),
    }
}

enum Phase {
    Idle,
    Crossfade { from: StepId, elapsed: Duration },
    Settle { elapsed: Duration },
}

/// Full-screen animated background keyed to the active step. Textures
/// build off-thread; until they arrive a solid fallback color shows.
/// At most one crossfade runs at a time; triggers that land mid-fade
/// are dropped.
pub(crate) struct Backdrop {
    textures: Option<TextureSet>,
    receiver: Option<Receiver<TextureSet>>,
    current: StepId,
    phase: Phase,
    crossfade: Duration,
    settle: Duration,
    reduced_motion: bool,
}

impl Backdrop {
    pub(crate) fn new(effects: &EffectsConfig, initial: StepId, rng: &mut dyn RandomSource) -> Self {
        // The step-to-panorama assignment is reshuffled on every mount
        // and never persisted, so it is not stable across relaunches.
        let assignment = shuffled_indices(STEPS.len(), rng);
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(build_texture_set(&assignment));
        });

        Self {
            textures: None,
            receiver: Some(receiver),
            current: initial,
            phase: Phase::Idle,
            crossfade: Duration::from_millis(effects.crossfade_ms.max(1)),
            settle: Duration::from_millis(effects.settle_ms.max(1)),
            reduced_motion: effects.reduced_motion,
        }
    }

    #[cfg(test)]
    pub(crate) fn preloaded(effects: &EffectsConfig, initial: StepId, set: TextureSet) -> Self {
        Self {
            textures: Some(set),
            receiver: None,
            current: initial,
            phase: Phase::Idle,
            crossfade: Duration::from_millis(effects.crossfade_ms.max(1)),
            settle: Duration::from_millis(effects.settle_ms.max(1)),
            reduced_motion: effects.reduced_motion,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_crossfading(&self) -> bool {
        matches!(self.phase, Phase::Crossfade { .. })
    }

    pub(crate) fn on_step_changed(&mut self, next: StepId) {
        if next == self.current {
            return;
        }

        if self.reduced_motion || self.textures.is_none() {
            self.current = next;
            return;
        }

        if !matches!(self.phase, Phase::Idle) {
            debug!(step = %next, "backdrop busy, dropping crossfade trigger");
            return;
        }

        self.phase = Phase::Crossfade {
            from: self.current,
            elapsed: Duration::ZERO,
        };
        self.current = next;
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        if let Some(receiver) = &self.receiver
            && let Ok(set) = receiver.try_recv()
        {
            self.textures = Some(set);
            self.receiver = None;
        }

        match &mut self.phase {
            Phase::Idle => {}
            Phase::Crossfade { elapsed, .. } => {
                *elapsed += dt;
                if *elapsed >= self.crossfade {
                    self.phase = Phase::Settle {
                        elapsed: Duration::ZERO,
                    };
                }
            }
            Phase::Settle { elapsed } => {
                *elapsed += dt;
                if *elapsed >= self.settle {
                    self.phase = Phase::Idle;
                }
            }
        }
    }

    pub(crate) fn paint(&self, buffer: &mut Buffer, area: Rect) {
        let Some(set) = &self.textures else {
            fill_background(buffer, area, theme::BACKDROP_FALLBACK);
            return;
        };

        let current = &set.by_step[step_index(self.current)];
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let color = match &self.phase {
                    Phase::Idle => current.sample(x, y, area, (0.0, 0.0)),
                    Phase::Crossfade { from, elapsed } => {
                        let progress = ease_out(
                            elapsed.as_secs_f32() / self.crossfade.as_secs_f32(),
                        );
                        let displacement = set.displacement.sample(x, y, area);
                        let outgoing = set.by_step[step_index(*from)].sample(
                            x,
                            y,
                            area,
                            (displacement * progress * DISPLACE_STRENGTH, 0.0),
                        );
                        let incoming = current.sample(
                            x,
                            y,
                            area,
                            (displacement * (1.0 - progress) * DISPLACE_STRENGTH, 0.0),
                        );
                        blend(outgoing, incoming, progress)
                    }
                    Phase::Settle { elapsed } => {
                        let t = (elapsed.as_secs_f32() / self.settle.as_secs_f32())
                            .clamp(0.0, 1.0);
                        let amplitude = 1.0 - t;
                        let drift = (
                            amplitude * (t * 6.0 * std::f32::consts::PI).sin() * DRIFT_AMPLITUDE,
                            amplitude
                                * (t * 4.0 * std::f32::consts::PI).cos()
                                * DRIFT_AMPLITUDE
                                * 0.5,
                        );
                        current.sample(x, y, area, drift)
                    }
                };

                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_bg(Color::Rgb(color.0, color.1, color.2));
                }
            }
        }
    }
}

fn fill_background(buffer: &mut Buffer, area: Rect, color: Color) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_bg(color);
            }
        }
    }
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    (
        lerp_channel(from.0, to.0, t),
        lerp_channel(from.1, to.1, t),
        lerp_channel(from.2, to.2, t),
    )
}
