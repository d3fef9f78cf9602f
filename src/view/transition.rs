use egui::Vec2;

/// A camera view expressed as a model-space center plus the model-space
/// extent that should fill the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub center: Vec2,
    pub extent: f32,
}

impl View {
    pub fn new(center: Vec2, extent: f32) -> Self {
        Self { center, extent }
    }
}

const RHO: f32 = std::f32::consts::SQRT_2;
const RHO_2: f32 = 2.0;
const RHO_4: f32 = 4.0;

enum Path {
    /// Centers effectively coincide: plain translation with exponential
    /// extent change.
    Straight { s_total: f32 },
    /// The van Wijk & Nuij path: zooms out, travels, zooms back in so the
    /// perceived motion speed stays constant.
    Curved { s_total: f32, r0: f32, distance: f32 },
}

/// Smooth zoom-and-pan interpolation between two views. Sampling at
/// `t` in `[0, 1]` moves along a path whose apparent on-screen speed is
/// uniform, regardless of how far apart the views are in model space.
pub struct ZoomInterpolator {
    start: View,
    end: View,
    path: Path,
}

impl ZoomInterpolator {
    pub fn new(start: View, end: View) -> Self {
        let delta = end.center - start.center;
        let distance_sq = delta.length_sq();

        let path = if distance_sq < 1e-6 {
            Path::Straight {
                s_total: (end.extent / start.extent).max(1e-12).ln() / RHO,
            }
        } else {
            let distance = distance_sq.sqrt();
            let b0 = ((end.extent * end.extent) - (start.extent * start.extent)
                + (RHO_4 * distance_sq))
                / (2.0 * start.extent * RHO_2 * distance);
            let b1 = ((end.extent * end.extent) - (start.extent * start.extent)
                - (RHO_4 * distance_sq))
                / (2.0 * end.extent * RHO_2 * distance);
            let r0 = (((b0 * b0) + 1.0).sqrt() - b0).ln();
            let r1 = (((b1 * b1) + 1.0).sqrt() - b1).ln();
            Path::Curved {
                s_total: (r1 - r0) / RHO,
                r0,
                distance,
            }
        };

        Self { start, end, path }
    }

    pub fn sample(&self, t: f32) -> View {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return self.end;
        }

        match self.path {
            Path::Straight { s_total } => {
                let delta = self.end.center - self.start.center;
                View {
                    center: self.start.center + (delta * t),
                    extent: self.start.extent * (RHO * t * s_total).exp(),
                }
            }
            Path::Curved {
                s_total,
                r0,
                distance,
            } => {
                let s = t * s_total;
                let delta = self.end.center - self.start.center;
                // Fraction of the straight-line travel covered at s; reaches
                // exactly 1 when s hits the full path length.
                let u = (self.start.extent / (RHO_2 * distance))
                    * ((r0.cosh() * ((RHO * s) + r0).tanh()) - r0.sinh());
                View {
                    center: self.start.center + (delta * u),
                    extent: self.start.extent * r0.cosh() / ((RHO * s) + r0).cosh(),
                }
            }
        }
    }
}

/// Pollable transition advanced by the host's own scheduling loop; starting
/// a new one replaces any in-flight transition on the same state.
pub struct Transition {
    interpolator: ZoomInterpolator,
    duration_ms: f32,
    elapsed_ms: f32,
}

impl Transition {
    pub fn new(start: View, end: View, duration_ms: f32) -> Self {
        Self {
            interpolator: ZoomInterpolator::new(start, end),
            duration_ms: duration_ms.max(1.0),
            elapsed_ms: 0.0,
        }
    }

    /// Advances by elapsed wall-clock milliseconds and returns the view for
    /// this frame.
    pub fn advance(&mut self, delta_ms: f32) -> View {
        self.elapsed_ms = (self.elapsed_ms + delta_ms.max(0.0)).min(self.duration_ms);
        self.interpolator.sample(self.elapsed_ms / self.duration_ms)
    }

    pub fn current(&self) -> View {
        self.interpolator.sample(self.elapsed_ms / self.duration_ms)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}
