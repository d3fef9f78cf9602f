use std::collections::HashSet;

use super::LayoutGraph;

/// Set of node ids currently opened in the on-demand subgraph view. The
/// originally designated id can never be collapsed away: emptying the set
/// falls back to it so something is always visible.
#[derive(Clone, Debug)]
pub struct ExpansionState {
    origin: String,
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let expanded = HashSet::from([origin.clone()]);
        Self { origin, expanded }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Expands a collapsed node, or collapses an expanded one together with
    /// its collapse closure. Unknown ids are a no-op.
    pub fn toggle(&mut self, graph: &mut LayoutGraph, id: &str) {
        let Some(index) = graph.index_of(id) else {
            return;
        };

        if self.expanded.contains(id) {
            let closure = self.collapse_closure(graph, index);
            for &member in &closure {
                self.expanded.remove(&graph.nodes[member].id);
                graph.nodes[member].expanded = false;
            }

            if self.expanded.is_empty() {
                // Restore the origin, whichever node the collapse started
                // from, so the view never goes blank.
                self.expanded.insert(self.origin.clone());
                if let Some(origin) = graph.index_of(&self.origin) {
                    graph.nodes[origin].expanded = true;
                }
            }
        } else {
            self.expanded.insert(id.to_owned());
            graph.nodes[index].expanded = true;
        }
    }

    /// Recursive walk from `start` over its links: outgoing edges always,
    /// incoming only when the link is not oriented; the walk only recurses
    /// through neighbors that are themselves currently expanded.
    fn collapse_closure(&self, graph: &LayoutGraph, start: usize) -> Vec<usize> {
        let mut closure = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            closure.push(node);

            for link in &graph.links {
                let neighbor = if link.source == node {
                    link.target
                } else if link.target == node && !link.oriented {
                    link.source
                } else {
                    continue;
                };

                if !self.expanded.contains(&graph.nodes[neighbor].id) {
                    continue;
                }
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        closure
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleSubgraph {
    pub nodes: Vec<usize>,
    pub links: Vec<usize>,
}

/// Union over all expanded ids of the id itself, every node one link away
/// from it, and every link incident to it. Recomputed whole on each
/// expansion change rather than patched incrementally.
pub fn visible_subgraph(graph: &LayoutGraph, state: &ExpansionState) -> VisibleSubgraph {
    let mut nodes = HashSet::new();
    let mut links = HashSet::new();

    for id in state.expanded_ids() {
        let Some(expanded) = graph.index_of(id) else {
            continue;
        };
        nodes.insert(expanded);

        for (link_index, link) in graph.links.iter().enumerate() {
            if link.source == expanded || link.target == expanded {
                links.insert(link_index);
                nodes.insert(link.source);
                nodes.insert(link.target);
            }
        }
    }

    let mut nodes = nodes.into_iter().collect::<Vec<_>>();
    let mut links = links.into_iter().collect::<Vec<_>>();
    nodes.sort_unstable();
    links.sort_unstable();
    VisibleSubgraph { nodes, links }
}
