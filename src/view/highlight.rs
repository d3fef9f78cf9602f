use std::collections::HashSet;

use crate::graph::LayoutGraph;
use crate::graph::ancestors::AncestorChain;

/// What is currently emphasized. Pure state derivation over the bound
/// graph's adjacency; never touches the layout itself.
#[derive(Clone, Debug, Default)]
pub enum Highlight {
    #[default]
    None,
    /// A node, everything one link away and their cluster visuals.
    Neighborhood { node: usize },
    /// A link and its two endpoints.
    Link { link: usize },
    /// Every member of one cluster (legend hover).
    Cluster { tag: String },
    /// Fuzzy search result set.
    SearchMatches { matches: HashSet<usize> },
    /// A timeline node's full ancestor lineage.
    Ancestors { chain: AncestorChain },
}

#[derive(Clone, Debug)]
pub struct HighlightState {
    mode: Highlight,
    dim_opacity: f32,
}

impl Default for HighlightState {
    fn default() -> Self {
        Self {
            mode: Highlight::None,
            dim_opacity: 0.1,
        }
    }
}

impl HighlightState {
    pub fn set(&mut self, mode: Highlight, dim_opacity: f32) {
        self.mode = mode;
        self.dim_opacity = dim_opacity.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        self.mode = Highlight::None;
    }

    pub fn current(&self) -> &Highlight {
        &self.mode
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.mode, Highlight::None)
    }

    /// Opacity the host should render node `index` with.
    pub fn node_opacity(&self, graph: &LayoutGraph, index: usize) -> f32 {
        let full = 1.0;
        match &self.mode {
            Highlight::None => full,
            Highlight::Neighborhood { node } => {
                if graph.is_connected(*node, index) {
                    full
                } else {
                    self.dim_opacity
                }
            }
            Highlight::Link { link } => match graph.links.get(*link) {
                Some(link) if link.source == index || link.target == index => full,
                Some(_) => self.dim_opacity,
                None => full,
            },
            Highlight::Cluster { tag } => {
                let in_cluster = graph
                    .nodes
                    .get(index)
                    .and_then(|node| node.cluster.as_deref())
                    .is_some_and(|cluster| cluster == tag);
                if in_cluster { full } else { self.dim_opacity }
            }
            Highlight::SearchMatches { matches } => {
                if matches.contains(&index) {
                    full
                } else {
                    self.dim_opacity
                }
            }
            Highlight::Ancestors { chain } => {
                if chain.nodes.contains(&index) {
                    full
                } else {
                    self.dim_opacity
                }
            }
        }
    }

    /// Opacity the host should render link `index` with.
    pub fn link_opacity(&self, graph: &LayoutGraph, index: usize) -> f32 {
        let full = 1.0;
        let Some(link) = graph.links.get(index) else {
            return full;
        };

        match &self.mode {
            Highlight::None => full,
            Highlight::Neighborhood { node } => {
                if link.source == *node || link.target == *node {
                    full
                } else {
                    self.dim_opacity
                }
            }
            Highlight::Link { link: hovered } => {
                if *hovered == index {
                    full
                } else {
                    self.dim_opacity
                }
            }
            // Hovering a cluster leaves no link emphasized.
            Highlight::Cluster { .. } => self.dim_opacity,
            Highlight::SearchMatches { matches } => {
                if matches.contains(&link.source) && matches.contains(&link.target) {
                    full
                } else {
                    self.dim_opacity
                }
            }
            Highlight::Ancestors { chain } => {
                if chain.links.contains(&index) {
                    full
                } else {
                    self.dim_opacity
                }
            }
        }
    }

    /// Whether the cluster hull and title for `tag` keep full emphasis.
    pub fn cluster_emphasized(&self, graph: &LayoutGraph, tag: &str) -> bool {
        match &self.mode {
            Highlight::None => true,
            Highlight::Neighborhood { node } => graph
                .nodes
                .get(*node)
                .and_then(|node| node.cluster.as_deref())
                .is_some_and(|cluster| cluster == tag),
            Highlight::Link { link } => graph.links.get(*link).is_some_and(|link| {
                [link.source, link.target].iter().any(|&endpoint| {
                    graph
                        .nodes
                        .get(endpoint)
                        .and_then(|node| node.cluster.as_deref())
                        .is_some_and(|cluster| cluster == tag)
                })
            }),
            Highlight::Cluster { tag: hovered } => hovered == tag,
            Highlight::SearchMatches { .. } | Highlight::Ancestors { .. } => false,
        }
    }

    /// Whether node labels should surface; labels follow the emphasized
    /// set rather than the dimmed remainder.
    pub fn label_visible(&self, graph: &LayoutGraph, index: usize) -> bool {
        match &self.mode {
            Highlight::None => false,
            _ => self.node_opacity(graph, index) >= 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BindConfig;
    use crate::snapshot::GraphSnapshot;

    fn graph() -> LayoutGraph {
        let snapshot = GraphSnapshot::from_json(
            r#"{"nodes": [
                    {"id": "a", "cluster": "g1"},
                    {"id": "b", "cluster": "g1"},
                    {"id": "c", "cluster": "g2"}
                ],
                "links": [{"source": "a", "target": "b"}]}"#,
        )
        .unwrap();
        LayoutGraph::bind(&snapshot, BindConfig::default())
    }

    #[test]
    fn neighborhood_dims_unconnected_nodes() {
        let graph = graph();
        let mut state = HighlightState::default();
        state.set(Highlight::Neighborhood { node: 0 }, 0.2);

        assert_eq!(state.node_opacity(&graph, 0), 1.0);
        assert_eq!(state.node_opacity(&graph, 1), 1.0);
        assert_eq!(state.node_opacity(&graph, 2), 0.2);
        assert_eq!(state.link_opacity(&graph, 0), 1.0);
        assert!(state.cluster_emphasized(&graph, "g1"));
        assert!(!state.cluster_emphasized(&graph, "g2"));
    }

    #[test]
    fn reset_restores_full_opacity() {
        let graph = graph();
        let mut state = HighlightState::default();
        state.set(Highlight::Neighborhood { node: 0 }, 0.2);
        state.reset();

        assert!(!state.is_active());
        for index in 0..graph.node_count() {
            assert_eq!(state.node_opacity(&graph, index), 1.0);
        }
    }

    #[test]
    fn link_mode_emphasizes_endpoints_only() {
        let graph = graph();
        let mut state = HighlightState::default();
        state.set(Highlight::Link { link: 0 }, 0.1);

        assert_eq!(state.node_opacity(&graph, 0), 1.0);
        assert_eq!(state.node_opacity(&graph, 1), 1.0);
        assert_eq!(state.node_opacity(&graph, 2), 0.1);
        assert!(state.label_visible(&graph, 0));
        assert!(!state.label_visible(&graph, 2));
    }

    #[test]
    fn cluster_mode_follows_tags() {
        let graph = graph();
        let mut state = HighlightState::default();
        state.set(
            Highlight::Cluster {
                tag: "g2".to_owned(),
            },
            0.05,
        );

        assert_eq!(state.node_opacity(&graph, 2), 1.0);
        assert_eq!(state.node_opacity(&graph, 0), 0.05);
        assert_eq!(state.link_opacity(&graph, 0), 0.05);
    }

    #[test]
    fn highlight_never_mutates_the_graph() {
        let graph = graph();
        let positions = graph.nodes.iter().map(|n| n.position).collect::<Vec<_>>();
        let mut state = HighlightState::default();
        state.set(Highlight::Neighborhood { node: 1 }, 0.3);
        let _ = state.node_opacity(&graph, 0);
        let after = graph.nodes.iter().map(|n| n.position).collect::<Vec<_>>();
        assert_eq!(positions, after);
    }
}
