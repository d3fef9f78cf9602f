pub mod highlight;
pub mod hull;
pub mod transition;

use egui::{Pos2, Rect, Vec2, pos2};

use crate::events::{Event, Events};
use crate::graph::LayoutGraph;
use crate::scale;

pub use highlight::{Highlight, HighlightState};
pub use hull::{cluster_hull, convex_hull, hull_contains, hull_points};
pub use transition::{Transition, View, ZoomInterpolator};

#[derive(Clone, Copy, Debug)]
pub struct ViewConfig {
    /// Canvas size in screen units.
    pub canvas: Vec2,
    /// Zoom scale bounds.
    pub scale_min: f32,
    pub scale_max: f32,
    /// Model-space region panning may not leave; `None` means unbounded,
    /// the timeline-style infinite extent.
    pub translate_extent: Option<Rect>,
    /// Link stroke width range mapped from evidence counts; strokes follow
    /// true zoom, not semantic zoom.
    pub min_link_stroke: f32,
    pub max_link_stroke: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            canvas: Vec2::new(1000.0, 1000.0),
            scale_min: 1.0 / 3.0,
            scale_max: 3.0,
            translate_extent: None,
            min_link_stroke: 0.8,
            max_link_stroke: 3.0,
        }
    }
}

/// Pan/zoom state; `screen = model * scale + translate`. Mutated only by
/// the [`Viewport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn apply(&self, model: Vec2) -> Pos2 {
        pos2(
            (model.x * self.scale) + self.translate.x,
            (model.y * self.scale) + self.translate.y,
        )
    }

    pub fn invert(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }
}

/// The view transform controller: clamps gestures, runs zoom transitions,
/// derives semantic sizes and owns the highlight protocol.
pub struct Viewport {
    config: ViewConfig,
    transform: ViewTransform,
    transition: Option<Transition>,
    highlight: HighlightState,
    events: Events,
    hovered_node: Option<usize>,
    hovered_link: Option<usize>,
}

impl Viewport {
    pub fn new(config: ViewConfig) -> Self {
        let mut viewport = Self {
            config,
            transform: ViewTransform::IDENTITY,
            transition: None,
            highlight: HighlightState::default(),
            events: Events::default(),
            hovered_node: None,
            hovered_link: None,
        };
        viewport.transform = viewport.clamped(viewport.transform);
        viewport
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Hot-swaps the view knobs, re-clamping the current transform.
    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
        let clamped = self.clamped(self.transform);
        self.transform = clamped;
    }

    fn clamped(&self, mut transform: ViewTransform) -> ViewTransform {
        transform.scale = transform.scale.clamp(self.config.scale_min, self.config.scale_max);

        if let Some(extent) = self.config.translate_extent {
            let k = transform.scale;
            let lo_x = self.config.canvas.x - (extent.max.x * k);
            let hi_x = -(extent.min.x * k);
            let lo_y = self.config.canvas.y - (extent.max.y * k);
            let hi_y = -(extent.min.y * k);
            transform.translate.x = clamp_or_center(transform.translate.x, lo_x, hi_x);
            transform.translate.y = clamp_or_center(transform.translate.y, lo_y, hi_y);
        }
        transform
    }

    /// Wheel zoom about a screen anchor: the model point under the cursor
    /// stays put while the scale changes.
    pub fn zoom_by(&mut self, factor: f32, anchor: Pos2) {
        self.transition = None;
        let before = self.transform.invert(anchor);
        let scale = (self.transform.scale * factor).clamp(self.config.scale_min, self.config.scale_max);
        let translate = anchor.to_vec2() - (before * scale);
        self.transform = self.clamped(ViewTransform { translate, scale });
        self.events.push(Event::ZoomChanged {
            scale: self.transform.scale,
        });
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transition = None;
        let mut transform = self.transform;
        transform.translate += delta;
        self.transform = self.clamped(transform);
    }

    fn view_of(&self, transform: ViewTransform) -> View {
        let center = transform.invert(pos2(
            self.config.canvas.x * 0.5,
            self.config.canvas.y * 0.5,
        ));
        View::new(center, self.config.canvas.x / transform.scale)
    }

    fn transform_of(&self, view: View) -> ViewTransform {
        let scale = self.config.canvas.x / view.extent;
        let translate = (self.config.canvas * 0.5) - (view.center * scale);
        ViewTransform { translate, scale }
    }

    /// Starts a smooth transition that puts `position` at the canvas
    /// center at `target_scale`. Replaces any in-flight transition.
    pub fn zoom_to_node(&mut self, position: Vec2, target_scale: f32, duration_ms: f32) {
        let target_scale = target_scale.clamp(self.config.scale_min, self.config.scale_max);
        let target = View::new(position, self.config.canvas.x / target_scale);
        self.transition = Some(Transition::new(
            self.view_of(self.transform),
            target,
            duration_ms,
        ));
    }

    /// Advances the in-flight transition by wall-clock milliseconds.
    /// Returns whether the transform changed this frame.
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };

        let view = transition.advance(delta_ms);
        let finished = transition.is_finished();
        let next = self.transform_of(view);
        let changed = next != self.transform;
        self.transform = next;

        if finished {
            self.transition = None;
            self.transform = self.clamped(self.transform);
            self.events.push(Event::ZoomChanged {
                scale: self.transform.scale,
            });
        }
        changed
    }

    pub fn transition_active(&self) -> bool {
        self.transition.is_some()
    }

    /// Semantic zoom: sizes divided by the scale keep their apparent
    /// on-screen size constant under camera zoom.
    pub fn apparent_size(&self, base: f32) -> f32 {
        base / self.transform.scale
    }

    /// True-zoom link stroke width from an evidence count; shrinks on
    /// zoom-out together with everything else.
    pub fn link_stroke(&self, evidence: usize, domain: (usize, usize)) -> f32 {
        scale::linear(
            (domain.0 as f32, domain.1 as f32),
            (self.config.min_link_stroke, self.config.max_link_stroke),
            evidence as f32,
        )
    }

    // --- highlight protocol -------------------------------------------------

    pub fn set_highlight(&mut self, mode: Highlight, dim_opacity: f32) {
        self.highlight.set(mode, dim_opacity);
    }

    pub fn current_highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn reset_highlight(&mut self) {
        self.highlight.reset();
    }

    // --- interaction events -------------------------------------------------

    pub fn select_node(&mut self, graph: &LayoutGraph, id: &str) {
        if graph.index_of(id).is_none() {
            return;
        }
        self.events.push(Event::NodeSelected { id: id.to_owned() });
    }

    /// Hover bookkeeping: derives the neighborhood highlight and emits
    /// enter/exit events as the hovered node changes.
    pub fn hover_node(&mut self, graph: &LayoutGraph, index: Option<usize>, dim_opacity: f32) {
        if index == self.hovered_node {
            return;
        }

        if let Some(previous) = self.hovered_node.take()
            && let Some(node) = graph.nodes.get(previous)
        {
            self.events.push(Event::NodeHoverExit {
                id: node.id.clone(),
            });
        }

        match index {
            Some(hovered) if hovered < graph.node_count() => {
                self.hovered_node = Some(hovered);
                self.events.push(Event::NodeHoverEnter {
                    id: graph.nodes[hovered].id.clone(),
                });
                self.highlight.set(Highlight::Neighborhood { node: hovered }, dim_opacity);
            }
            _ => self.highlight.reset(),
        }
    }

    pub fn hover_link(&mut self, graph: &LayoutGraph, index: Option<usize>, dim_opacity: f32) {
        if index == self.hovered_link {
            return;
        }

        if let Some(previous) = self.hovered_link.take()
            && let Some(link) = graph.links.get(previous)
        {
            self.events.push(Event::LinkHoverExit {
                source: graph.nodes[link.source].id.clone(),
                target: graph.nodes[link.target].id.clone(),
            });
        }

        match index {
            Some(hovered) if hovered < graph.link_count() => {
                self.hovered_link = Some(hovered);
                let link = &graph.links[hovered];
                self.events.push(Event::LinkHoverEnter {
                    source: graph.nodes[link.source].id.clone(),
                    target: graph.nodes[link.target].id.clone(),
                });
                self.highlight.set(Highlight::Link { link: hovered }, dim_opacity);
            }
            _ => self.highlight.reset(),
        }
    }

    pub fn hover_legend(&mut self, tag: &str, dim_opacity: f32) {
        self.events.push(Event::LegendHover {
            key: tag.to_owned(),
        });
        self.highlight.set(
            Highlight::Cluster {
                tag: tag.to_owned(),
            },
            dim_opacity,
        );
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}

fn clamp_or_center(value: f32, lo: f32, hi: f32) -> f32 {
    if lo <= hi {
        value.clamp(lo, hi)
    } else {
        (lo + hi) * 0.5
    }
}
