use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;

use egui::{Vec2, vec2};
use log::debug;

use crate::snapshot::GraphSnapshot;
use crate::util::stable_pair;

pub mod ancestors;
pub mod expand;
pub mod search;

/// Knobs applied when a snapshot is bound into a [`LayoutGraph`].
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct BindConfig {
    /// Base circle radius; a node's radius grows with its degree centrality.
    pub base_circle_radius: f32,
    /// Rest length for link springs before any density scaling.
    pub link_distance: f32,
    /// When true, spring targets shrink as the pair's neighborhood grows,
    /// keeping tightly connected subgraphs compact.
    pub neighbor_scaled_distance: bool,
    /// How strongly density shortens the spring target.
    pub compactness: f32,
    /// Radius of the ring nodes are seeded on before the first tick.
    pub seed_radius: f32,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            base_circle_radius: 6.0,
            link_distance: 40.0,
            neighbor_scaled_distance: false,
            compactness: 0.5,
            seed_radius: 120.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub label: Option<String>,
    pub cluster: Option<String>,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set while the user drags the node; overrides the simulated position.
    pub pinned: Option<Vec2>,
    pub degree_centrality: usize,
    pub radius: f32,
    pub expanded: bool,
}

#[derive(Clone, Debug)]
pub struct LayoutLink {
    pub source: usize,
    pub target: usize,
    /// Scalar evidence values aggregated across parallel edges.
    pub evidence: Vec<f32>,
    pub oriented: bool,
    /// Cached spring rest length, derived once at bind time.
    pub spring_target: f32,
}

#[derive(Clone, Debug)]
pub struct Cluster {
    pub tag: String,
    pub members: Vec<usize>,
    /// Member with the highest degree centrality; attraction anchor.
    pub influence: usize,
}

/// Arena of node and link records addressed by index. All engine passes
/// (forces, expansion, highlighting) work on indices into this arena rather
/// than holding live references.
#[derive(Clone, Debug, Default)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    pub clusters: Vec<Cluster>,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    linked_pairs: HashSet<(usize, usize)>,
}

impl LayoutGraph {
    /// Binds a snapshot into a fresh arena. Links referencing unknown node
    /// ids are dropped, never fatal.
    pub fn bind(snapshot: &GraphSnapshot, config: BindConfig) -> Self {
        let mut graph = Self::default();
        graph.rebuild(snapshot, config, &HashMap::new());
        graph
    }

    /// Rebinds a snapshot while carrying positions, velocities, pins and
    /// expansion flags over for node ids that survive the change. Used for
    /// in-place filtering; a full data replace should call [`Self::bind`].
    pub fn rebind(&mut self, snapshot: &GraphSnapshot, config: BindConfig) {
        let prior = self
            .nodes
            .drain(..)
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();
        self.rebuild(snapshot, config, &prior);
    }

    fn rebuild(
        &mut self,
        snapshot: &GraphSnapshot,
        config: BindConfig,
        prior: &HashMap<String, LayoutNode>,
    ) {
        let node_count = snapshot.nodes.len();

        let mut index_by_id = HashMap::with_capacity(node_count);
        for (index, spec) in snapshot.nodes.iter().enumerate() {
            index_by_id.entry(spec.id.clone()).or_insert(index);
        }

        let mut links = Vec::with_capacity(snapshot.links.len());
        let mut degrees = vec![0usize; node_count];
        for spec in &snapshot.links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&spec.source),
                index_by_id.get(&spec.target),
            ) else {
                debug!(
                    "dropping link {} -> {}: unknown endpoint",
                    spec.source, spec.target
                );
                continue;
            };
            if source == target {
                continue;
            }

            degrees[source] += 1;
            degrees[target] += 1;
            links.push(LayoutLink {
                source,
                target,
                evidence: spec.evidence(),
                oriented: spec.oriented,
                spring_target: config.link_distance,
            });
        }

        let mut neighbors = vec![Vec::new(); node_count];
        let mut linked_pairs = HashSet::with_capacity(links.len());
        for link in &links {
            neighbors[link.source].push(link.target);
            neighbors[link.target].push(link.source);
            linked_pairs.insert(ordered_pair(link.source, link.target));
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        if config.neighbor_scaled_distance {
            for link in &mut links {
                let density = neighbors[link.source].len().max(1) as f32;
                link.spring_target =
                    config.link_distance / (1.0 + (config.compactness * density.sqrt()));
            }
        }

        let nodes = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let radius = config.base_circle_radius + degrees[index] as f32;
                if let Some(kept) = prior.get(&spec.id) {
                    LayoutNode {
                        id: spec.id.clone(),
                        kind: spec.kind.clone(),
                        name: spec.name.clone(),
                        label: spec.label.clone(),
                        cluster: spec.cluster.clone(),
                        position: kept.position,
                        velocity: kept.velocity,
                        pinned: kept.pinned,
                        degree_centrality: degrees[index],
                        radius,
                        expanded: kept.expanded,
                    }
                } else {
                    LayoutNode {
                        id: spec.id.clone(),
                        kind: spec.kind.clone(),
                        name: spec.name.clone(),
                        label: spec.label.clone(),
                        cluster: spec.cluster.clone(),
                        position: seed_position(&spec.id, index, node_count, config.seed_radius),
                        velocity: Vec2::ZERO,
                        pinned: None,
                        degree_centrality: degrees[index],
                        radius,
                        expanded: false,
                    }
                }
            })
            .collect::<Vec<_>>();

        self.clusters = derive_clusters(&nodes);
        self.nodes = nodes;
        self.links = links;
        self.index_by_id = index_by_id;
        self.neighbors = neighbors;
        self.linked_pairs = linked_pairs;
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn neighbors_of(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Two nodes count as connected when they share a link or are the same
    /// node.
    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        a == b || self.linked_pairs.contains(&ordered_pair(a, b))
    }

    pub fn cluster_of(&self, index: usize) -> Option<&Cluster> {
        let tag = self.nodes.get(index)?.cluster.as_deref()?;
        self.clusters.iter().find(|cluster| cluster.tag == tag)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn seed_position(id: &str, index: usize, count: usize, seed_radius: f32) -> Vec2 {
    let angle = (index as f32 / count.max(1) as f32) * TAU;
    let (jx, jy) = stable_pair(id);
    let jitter = vec2(jx, jy) * (seed_radius * 0.25);
    (vec2(angle.cos(), angle.sin()) * seed_radius) + jitter
}

fn derive_clusters(nodes: &[LayoutNode]) -> Vec<Cluster> {
    let mut by_tag: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        if let Some(tag) = node.cluster.as_deref() {
            by_tag.entry(tag).or_default().push(index);
        }
    }

    let mut clusters = by_tag
        .into_iter()
        .map(|(tag, members)| {
            let influence = members
                .iter()
                .copied()
                .max_by_key(|&index| nodes[index].degree_centrality)
                .unwrap_or(members[0]);
            Cluster {
                tag: tag.to_owned(),
                members,
                influence,
            }
        })
        .collect::<Vec<_>>();
    clusters.sort_by(|a, b| a.tag.cmp(&b.tag));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{LinkSpec, NodeSpec};

    fn node(id: &str, cluster: Option<&str>) -> NodeSpec {
        NodeSpec {
            id: id.to_owned(),
            kind: "entity".to_owned(),
            name: id.to_owned(),
            label: None,
            cluster: cluster.map(str::to_owned),
        }
    }

    fn link(source: &str, target: &str) -> LinkSpec {
        LinkSpec {
            source: source.to_owned(),
            target: target.to_owned(),
            value: None,
            values: Vec::new(),
            oriented: false,
        }
    }

    fn snapshot(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>) -> GraphSnapshot {
        GraphSnapshot { nodes, links }
    }

    #[test]
    fn unknown_link_endpoints_are_dropped() {
        let data = snapshot(
            vec![node("a", None), node("b", None)],
            vec![link("a", "b"), link("a", "ghost")],
        );
        let graph = LayoutGraph::bind(&data, BindConfig::default());

        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.nodes[0].degree_centrality, 1);
    }

    #[test]
    fn degree_centrality_counts_incident_links() {
        let data = snapshot(
            vec![node("a", None), node("b", None), node("c", None)],
            vec![link("a", "b"), link("a", "c")],
        );
        let graph = LayoutGraph::bind(&data, BindConfig::default());

        assert_eq!(graph.nodes[graph.index_of("a").unwrap()].degree_centrality, 2);
        assert_eq!(graph.nodes[graph.index_of("b").unwrap()].degree_centrality, 1);
    }

    #[test]
    fn cluster_influence_is_max_degree_member() {
        let data = snapshot(
            vec![
                node("a", Some("g")),
                node("b", Some("g")),
                node("c", Some("g")),
                node("d", None),
            ],
            vec![link("b", "a"), link("b", "c"), link("b", "d")],
        );
        let graph = LayoutGraph::bind(&data, BindConfig::default());

        assert_eq!(graph.clusters.len(), 1);
        let influence = graph.clusters[0].influence;
        assert_eq!(graph.nodes[influence].id, "b");
    }

    #[test]
    fn rebind_carries_positions_by_id() {
        let data = snapshot(vec![node("a", None), node("b", None)], vec![link("a", "b")]);
        let mut graph = LayoutGraph::bind(&data, BindConfig::default());
        let moved = vec2(42.0, -17.0);
        let a = graph.index_of("a").unwrap();
        graph.nodes[a].position = moved;

        let filtered = snapshot(vec![node("a", None), node("z", None)], Vec::new());
        graph.rebind(&filtered, BindConfig::default());

        let a = graph.index_of("a").unwrap();
        assert_eq!(graph.nodes[a].position, moved);
        let z = graph.index_of("z").unwrap();
        assert_ne!(graph.nodes[z].position, moved);
    }

    #[test]
    fn neighbor_scaled_targets_shrink_with_density() {
        let mut nodes = vec![node("hub", None), node("far", None), node("solo", None)];
        let mut links = vec![link("hub", "far")];
        for i in 0..6 {
            let id = format!("n{i}");
            nodes.push(node(&id, None));
            links.push(link("hub", &id));
        }
        links.push(link("solo", "far"));

        let config = BindConfig {
            neighbor_scaled_distance: true,
            ..BindConfig::default()
        };
        let graph = LayoutGraph::bind(&snapshot(nodes, links), config);

        let dense = graph
            .links
            .iter()
            .find(|l| graph.nodes[l.source].id == "hub")
            .unwrap()
            .spring_target;
        let sparse = graph
            .links
            .iter()
            .find(|l| graph.nodes[l.source].id == "solo")
            .unwrap()
            .spring_target;
        assert!(dense < sparse, "denser pair should get a shorter target");
    }
}
