use std::collections::HashSet;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

/// Graph snapshot handed in by the data-loading collaborator. The engine
/// treats it as immutable for the duration of a bind pass.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default)]
    pub oriented: bool,
}

impl LinkSpec {
    /// Evidence payload for multi-edge aggregation. A link with neither
    /// `values` nor `value` gets the default weight of 1.
    pub fn evidence(&self) -> Vec<f32> {
        if !self.values.is_empty() {
            self.values.clone()
        } else if let Some(value) = self.value {
            vec![value]
        } else {
            vec![1.0]
        }
    }
}

impl GraphSnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid graph snapshot JSON")
    }

    /// Drops links whose endpoints are not in the node set.
    pub fn drop_unknown_links(&mut self) {
        let known = self
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();

        let before = self.links.len();
        self.links
            .retain(|link| known.contains(link.source.as_str()) && known.contains(link.target.as_str()));
        if self.links.len() < before {
            debug!("dropped {} links with unknown endpoints", before - self.links.len());
        }
    }

    /// Folds an A->B link into an existing B->A one, concatenating their
    /// evidence, so each undirected pair carries a single aggregated link.
    pub fn merge_reverse_links(&mut self) {
        let mut merged: Vec<LinkSpec> = Vec::with_capacity(self.links.len());
        for link in self.links.drain(..) {
            if let Some(reverse) = merged
                .iter_mut()
                .find(|kept| kept.source == link.target && kept.target == link.source)
            {
                let mut evidence = reverse.evidence();
                evidence.extend(link.evidence());
                reverse.values = evidence;
                reverse.value = None;
            } else {
                merged.push(link);
            }
        }
        self.links = merged;
    }

    /// Keeps only nodes of the allowed kinds, then drops dangling links.
    pub fn retain_kinds(&mut self, allowed: &[&str]) {
        self.nodes.retain(|node| allowed.contains(&node.kind.as_str()));
        self.drop_unknown_links();
    }
}

/// Hierarchy snapshot for the packing engine; absence of `children` marks a
/// leaf.
#[derive(Clone, Debug, Deserialize)]
pub struct HierarchySnapshot {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub children: Vec<HierarchySnapshot>,
}

impl HierarchySnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid hierarchy snapshot JSON")
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf weight with the malformed-input fallback: absent or negative
    /// weights count as 1.
    pub fn weight(&self) -> f32 {
        match self.value {
            Some(value) if value > 0.0 && value.is_finite() => value,
            _ => 1.0,
        }
    }
}
