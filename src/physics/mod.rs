pub mod forces;
pub mod quadtree;

use egui::Vec2;
use log::debug;

use crate::graph::LayoutGraph;

pub use forces::{
    CenterConfig, ClusterPullConfig, CollideConfig, Force, RadialConfig, RepulsionConfig,
    SpringConfig,
};
pub use quadtree::SpatialIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    Idle,
    Running,
    Cooling,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SimulationConfig {
    /// Convergence threshold; the simulation goes Idle below it.
    pub alpha_min: f32,
    /// Geometric decay applied each tick.
    pub alpha_decay: f32,
    /// Velocity damping applied before integration.
    pub velocity_damping: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            // alpha_min ^ (1/300): cools to idle in about 300 ticks.
            alpha_decay: 0.0228,
            velocity_damping: 0.6,
        }
    }
}

/// Iterative n-body simulator. One instance owns the node positions of the
/// graph it is started on until it is stopped or replaced; ticks are
/// synchronous, non-reentrant passes driven by the host's frame callback.
pub struct Simulation {
    config: SimulationConfig,
    forces: Vec<Force>,
    state: SimState,
    alpha: f32,
    alpha_target: f32,
    positions: Vec<Vec2>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            forces: Vec::new(),
            state: SimState::Idle,
            alpha: 0.0,
            alpha_target: 0.0,
            positions: Vec::new(),
        }
    }

    /// Installs the force list and heats the simulation. A zero-node graph
    /// is a no-op and the engine stays Idle.
    pub fn start(&mut self, graph: &LayoutGraph, forces: Vec<Force>) {
        self.forces = forces;
        if graph.node_count() == 0 {
            self.state = SimState::Idle;
            return;
        }

        debug!("simulation started over {} nodes", graph.node_count());
        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.state = SimState::Running;
    }

    /// Re-heats toward `alpha_target` without touching positions; used
    /// while dragging (`> 0`) and on release (`0`) so the system cools back
    /// down instead of stopping abruptly.
    pub fn restart_at(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
        self.alpha = self.alpha.max(self.alpha_target).max(self.config.alpha_min * 2.0);
        self.state = if self.alpha_target > self.config.alpha_min {
            SimState::Running
        } else {
            SimState::Cooling
        };
    }

    /// Deterministic cancellation; no further tick will move a node.
    pub fn stop(&mut self) {
        self.state = SimState::Idle;
        self.alpha_target = 0.0;
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Swaps the force list without discarding alpha or positions; knob
    /// changes re-bind forces while the layout keeps cooling in place.
    pub fn set_forces(&mut self, forces: Vec<Force>) {
        self.forces = forces;
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Advances the simulation one tick: decay alpha, apply every force in
    /// declared order, damp and integrate velocities. Returns whether the
    /// simulation is still active.
    pub fn tick(&mut self, graph: &mut LayoutGraph) -> bool {
        if self.state == SimState::Idle || graph.node_count() == 0 {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        if self.alpha < self.config.alpha_min && self.alpha_target <= self.config.alpha_min {
            self.state = SimState::Idle;
            debug!("simulation converged to idle");
            return false;
        }

        self.state = if self.alpha_target > self.config.alpha_min {
            SimState::Running
        } else {
            SimState::Cooling
        };

        // Positions are snapshotted so every force in this pass sees the
        // same start-of-tick geometry; the index never survives the tick.
        self.positions.clear();
        self.positions.extend(graph.nodes.iter().map(|node| node.position));
        let index = SpatialIndex::build(&self.positions);

        for force in &self.forces {
            force.apply(
                &mut graph.nodes,
                &graph.links,
                &graph.clusters,
                &self.positions,
                index.as_ref(),
                self.alpha,
            );
        }

        for node in &mut graph.nodes {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity *= self.config.velocity_damping;
            node.position += node.velocity;
        }

        true
    }
}
