use std::collections::HashSet;

use super::LayoutGraph;

#[derive(Clone, Debug, Default)]
pub struct AncestorChain {
    pub nodes: HashSet<usize>,
    pub links: HashSet<usize>,
}

/// Depth-first walk up the oriented parent links of a time-ordered graph,
/// collecting every ancestor node and every link on the chain. Used to
/// light up a node's full lineage while the rest of the timeline dims.
pub fn ancestor_chain(graph: &LayoutGraph, id: &str) -> AncestorChain {
    let mut chain = AncestorChain::default();
    let Some(start) = graph.index_of(id) else {
        return chain;
    };

    let mut stack = vec![start];
    chain.nodes.insert(start);

    while let Some(node) = stack.pop() {
        for (link_index, link) in graph.links.iter().enumerate() {
            if link.target != node || !link.oriented {
                continue;
            }

            chain.links.insert(link_index);
            if chain.nodes.insert(link.source) {
                stack.push(link.source);
            }
        }
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BindConfig;
    use crate::snapshot::GraphSnapshot;

    fn timeline_graph() -> LayoutGraph {
        // gen1 -> gen2 -> gen3, with a second root feeding gen3 and one
        // unrelated branch.
        let snapshot = GraphSnapshot::from_json(
            r#"{"nodes": [
                    {"id": "gen1"}, {"id": "gen2"}, {"id": "gen3"},
                    {"id": "aux"}, {"id": "stray"}
                ],
                "links": [
                    {"source": "gen1", "target": "gen2", "oriented": true},
                    {"source": "gen2", "target": "gen3", "oriented": true},
                    {"source": "aux", "target": "gen3", "oriented": true},
                    {"source": "gen1", "target": "stray", "oriented": true}
                ]}"#,
        )
        .unwrap();
        LayoutGraph::bind(&snapshot, BindConfig::default())
    }

    #[test]
    fn chain_collects_all_ancestors() {
        let graph = timeline_graph();
        let chain = ancestor_chain(&graph, "gen3");

        let names = chain
            .nodes
            .iter()
            .map(|&index| graph.nodes[index].id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(names, HashSet::from(["gen1", "gen2", "gen3", "aux"]));
        assert_eq!(chain.links.len(), 3);
    }

    #[test]
    fn chain_ignores_descendants() {
        let graph = timeline_graph();
        let chain = ancestor_chain(&graph, "gen2");

        let names = chain
            .nodes
            .iter()
            .map(|&index| graph.nodes[index].id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(names, HashSet::from(["gen1", "gen2"]));
    }

    #[test]
    fn unknown_id_yields_empty_chain() {
        let graph = timeline_graph();
        let chain = ancestor_chain(&graph, "nope");
        assert!(chain.nodes.is_empty());
        assert!(chain.links.is_empty());
    }
}
