use egui::{Vec2, vec2};

use crate::graph::{Cluster, LayoutLink, LayoutNode};
use crate::scale::PointScale;

use super::quadtree::{QuadCell, SpatialIndex};

#[derive(Clone, Copy, Debug)]
pub struct RepulsionConfig {
    /// Charge-like push strength; larger spreads the graph wider.
    pub strength: f32,
    /// Barnes-Hut acceptance ratio; a cell whose side/distance ratio is
    /// below this is treated as one mass at its centroid.
    pub theta: f32,
    pub softening: f32,
}

impl Default for RepulsionConfig {
    fn default() -> Self {
        Self {
            strength: 30.0,
            theta: 0.72,
            softening: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SpringConfig {
    pub strength: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self { strength: 0.3 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CenterConfig {
    pub center: Vec2,
    pub strength: f32,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            strength: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CollideConfig {
    /// Padding between nodes sharing a cluster tag.
    pub padding_intra: f32,
    /// Padding between nodes of different clusters; the larger value makes
    /// cluster separation emerge without a grouping force.
    pub padding_inter: f32,
    pub strength: f32,
}

impl Default for CollideConfig {
    fn default() -> Self {
        Self {
            padding_intra: 15.0,
            padding_inter: 80.0,
            strength: 0.7,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ClusterPullConfig {
    pub strength: f32,
    /// Slack added to the contact distance between a member and its
    /// influence node.
    pub spacing: f32,
}

impl Default for ClusterPullConfig {
    fn default() -> Self {
        Self {
            strength: 0.2,
            spacing: 3.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RadialConfig {
    /// Category order; each kind's rank picks its target ring.
    pub kinds: Vec<String>,
    pub min_radius: f32,
    pub max_radius: f32,
    pub center: Vec2,
    pub strength: f32,
}

impl RadialConfig {
    pub fn new(kinds: Vec<String>, min_radius: f32, max_radius: f32) -> Self {
        Self {
            kinds,
            min_radius,
            max_radius,
            center: Vec2::ZERO,
            strength: 0.1,
        }
    }
}

/// A per-tick rule contributing a velocity adjustment to simulated nodes.
/// Forces are applied in the order they are declared in the force list.
#[derive(Clone, Debug)]
pub enum Force {
    Repulsion(RepulsionConfig),
    Springs(SpringConfig),
    Center(CenterConfig),
    Collide(CollideConfig),
    ClusterPull(ClusterPullConfig),
    Radial(RadialConfig),
}

impl Force {
    pub(super) fn apply(
        &self,
        nodes: &mut [LayoutNode],
        links: &[LayoutLink],
        clusters: &[Cluster],
        positions: &[Vec2],
        index: Option<&SpatialIndex>,
        alpha: f32,
    ) {
        match self {
            Self::Repulsion(config) => apply_repulsion(nodes, positions, index, *config, alpha),
            Self::Springs(config) => apply_springs(nodes, links, positions, *config, alpha),
            Self::Center(config) => apply_center(nodes, positions, *config, alpha),
            Self::Collide(config) => apply_collide(nodes, positions, index, *config, alpha),
            Self::ClusterPull(config) => apply_cluster_pull(nodes, clusters, positions, *config, alpha),
            Self::Radial(config) => apply_radial(nodes, positions, config, alpha),
        }
    }
}

fn separation(delta: Vec2, fallback_seed: usize) -> (f32, Vec2) {
    let distance = delta.length();
    if distance > 0.0001 {
        (distance, delta / distance)
    } else {
        // Coincident points get a deterministic pseudo-random direction so
        // they can separate at all.
        let angle = ((fallback_seed as f32) * 0.618_034 + 0.37) * std::f32::consts::TAU;
        (0.0001, vec2(angle.cos(), angle.sin()))
    }
}

fn apply_repulsion(
    nodes: &mut [LayoutNode],
    positions: &[Vec2],
    index: Option<&SpatialIndex>,
    config: RepulsionConfig,
    alpha: f32,
) {
    let Some(index) = index else {
        return;
    };

    for (node_index, node) in nodes.iter_mut().enumerate() {
        let mut push = Vec2::ZERO;
        accumulate_repulsion(
            index.root(),
            node_index,
            positions,
            config,
            &mut push,
        );
        node.velocity += push * alpha;
    }
}

fn accumulate_repulsion(
    cell: &QuadCell,
    node_index: usize,
    positions: &[Vec2],
    config: RepulsionConfig,
    push: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[node_index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == node_index {
                continue;
            }
            let (distance, direction) = separation(point - positions[other], node_index + other);
            *push += direction * (config.strength / ((distance * distance) + config.softening));
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let can_approximate = !cell.bounds.contains(point)
        && ((cell.bounds.side_length() / distance) < config.theta)
        && cell.mass > 1.0;

    if can_approximate {
        let direction = delta / distance;
        *push += direction * ((config.strength * cell.mass) / (distance_sq + config.softening));
        return;
    }

    for child in cell.children.iter().flatten() {
        accumulate_repulsion(child, node_index, positions, config, push);
    }
}

fn apply_springs(
    nodes: &mut [LayoutNode],
    links: &[LayoutLink],
    positions: &[Vec2],
    config: SpringConfig,
    alpha: f32,
) {
    for link in links {
        if link.source >= nodes.len() || link.target >= nodes.len() {
            continue;
        }

        let (distance, direction) = separation(
            positions[link.source] - positions[link.target],
            link.source + link.target,
        );
        let correction =
            direction * ((distance - link.spring_target) * config.strength * alpha * 0.5);

        nodes[link.source].velocity -= correction;
        nodes[link.target].velocity += correction;
    }
}

fn apply_center(nodes: &mut [LayoutNode], positions: &[Vec2], config: CenterConfig, alpha: f32) {
    for (index, node) in nodes.iter_mut().enumerate() {
        node.velocity += (config.center - positions[index]) * (config.strength * alpha);
    }
}

fn apply_collide(
    nodes: &mut [LayoutNode],
    positions: &[Vec2],
    index: Option<&SpatialIndex>,
    config: CollideConfig,
    alpha: f32,
) {
    let Some(index) = index else {
        return;
    };

    let max_radius = nodes.iter().map(|node| node.radius).fold(0.0_f32, f32::max);
    let max_padding = config.padding_intra.max(config.padding_inter);

    for i in 0..nodes.len() {
        let search = nodes[i].radius + max_radius + max_padding;
        let mut pairs = Vec::new();
        index.for_each_near(positions[i], search, |j| {
            if j > i {
                pairs.push(j);
            }
        });

        for j in pairs {
            let same_cluster = nodes[i].cluster == nodes[j].cluster;
            let padding = if same_cluster {
                config.padding_intra
            } else {
                config.padding_inter
            };
            let contact = nodes[i].radius + nodes[j].radius + padding;

            let (distance, direction) = separation(positions[i] - positions[j], i + j);
            if distance >= contact {
                continue;
            }

            let push = direction * ((contact - distance) * config.strength * alpha * 0.5);
            nodes[i].velocity += push;
            nodes[j].velocity -= push;
        }
    }
}

fn apply_cluster_pull(
    nodes: &mut [LayoutNode],
    clusters: &[Cluster],
    positions: &[Vec2],
    config: ClusterPullConfig,
    alpha: f32,
) {
    for cluster in clusters {
        let influence = cluster.influence;
        if influence >= nodes.len() {
            continue;
        }

        for &member in &cluster.members {
            // The influence node is its own anchor; pulling it at itself
            // would collapse the cluster onto one point.
            if member == influence || member >= nodes.len() {
                continue;
            }

            let (distance, direction) =
                separation(positions[member] - positions[influence], member + influence);
            let contact = nodes[member].radius + nodes[influence].radius + config.spacing;
            let correction = direction * ((distance - contact) * config.strength * alpha);

            nodes[member].velocity -= correction;
            nodes[influence].velocity += correction;
        }
    }
}

fn apply_radial(nodes: &mut [LayoutNode], positions: &[Vec2], config: &RadialConfig, alpha: f32) {
    let scale = PointScale::new(
        config.kinds.clone(),
        (config.min_radius, config.max_radius),
    );

    for (index, node) in nodes.iter_mut().enumerate() {
        let Some(target_radius) = scale.position(&node.kind) else {
            continue;
        };

        let (distance, direction) = separation(positions[index] - config.center, index);
        node.velocity += direction * ((target_radius - distance) * config.strength * alpha);
    }
}
