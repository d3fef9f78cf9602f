pub mod enclose;
pub mod focus;
pub mod siblings;

use egui::Vec2;

use crate::scale;
use crate::snapshot::HierarchySnapshot;

pub use enclose::{Circle, enclose as enclose_circles};
pub use focus::{FocusView, PackRole, Projected};
pub use siblings::pack_siblings;

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PackConfig {
    /// Side length of the square canvas the view projection maps onto.
    pub canvas_size: f32,
    /// Padding kept between sibling circles and around children inside
    /// their parent.
    pub padding: f32,
    /// Leaf radius range for the sqrt value scale.
    pub min_radius: f32,
    pub max_radius: f32,
    /// Multiplier applied to the focused circle's radius when deriving the
    /// target view.
    pub zoom_extent: f32,
    /// Duration of the focus transition in milliseconds.
    pub zoom_speed: f32,
    /// Flatten-to-deepest-level mode: every actual leaf renders as a leaf
    /// regardless of focus depth.
    pub flatten_leaves: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            canvas_size: 1500.0,
            padding: 4.0,
            min_radius: 5.0,
            max_radius: 10.0,
            zoom_extent: 4.0,
            zoom_speed: 800.0,
            flatten_leaves: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PackNode {
    pub name: String,
    pub label: Option<String>,
    pub group: Option<String>,
    pub depth: usize,
    pub height: usize,
    /// Subtree leaf-count weight.
    pub value: f32,
    pub center: Vec2,
    pub radius: f32,
    pub children: Vec<usize>,
    /// Non-owning backreference; the arena owns every node.
    pub parent: Option<usize>,
}

impl PackNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Nested-circle layout of a hierarchy. Node 0 is the root, centered at the
/// origin; children are strictly contained in their parents.
#[derive(Clone, Debug)]
pub struct PackTree {
    pub nodes: Vec<PackNode>,
}

impl PackTree {
    pub const ROOT: usize = 0;

    pub fn root(&self) -> &PackNode {
        &self.nodes[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Depth-first descendant indices of `index`, itself included.
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![index];
        while let Some(node) = stack.pop() {
            if node >= self.nodes.len() {
                continue;
            }
            order.push(node);
            stack.extend(self.nodes[node].children.iter().rev());
        }
        order
    }
}

/// Computes the deterministic nested-circle layout: leaf radii from a sqrt
/// transform of their weight, siblings front-chain packed with padding,
/// parents sized by the minimal enclosing circle of their children.
pub fn pack(hierarchy: &HierarchySnapshot, config: &PackConfig) -> PackTree {
    let mut nodes = Vec::new();
    flatten(hierarchy, None, 0, &mut nodes);

    let mut tree = PackTree { nodes };
    if tree.is_empty() {
        return tree;
    }

    accumulate_values(&mut tree);
    let total_value = tree.root().value;

    assign_radii(&mut tree, PackTree::ROOT, total_value, config);
    offset_children(&mut tree, PackTree::ROOT, Vec2::ZERO);
    tree
}

fn flatten(
    snapshot: &HierarchySnapshot,
    parent: Option<usize>,
    depth: usize,
    nodes: &mut Vec<PackNode>,
) -> usize {
    let index = nodes.len();
    nodes.push(PackNode {
        name: snapshot.name.clone(),
        label: snapshot.label.clone(),
        group: snapshot.group.clone(),
        depth,
        height: 0,
        value: snapshot.weight(),
        center: Vec2::ZERO,
        radius: 0.0,
        children: Vec::new(),
        parent,
    });

    for child in &snapshot.children {
        let child_index = flatten(child, Some(index), depth + 1, nodes);
        nodes[index].children.push(child_index);
    }
    index
}

fn accumulate_values(tree: &mut PackTree) {
    // Children always follow their parent in the arena, so one reverse
    // sweep settles values and heights bottom-up.
    for index in (0..tree.nodes.len()).rev() {
        let node = &tree.nodes[index];
        if node.is_leaf() {
            let weight = if node.value > 0.0 { node.value } else { 1.0 };
            tree.nodes[index].value = weight;
            tree.nodes[index].height = 0;
            continue;
        }

        let children = tree.nodes[index].children.clone();
        let mut value = 0.0;
        let mut height = 0;
        for &child in &children {
            value += tree.nodes[child].value;
            height = height.max(tree.nodes[child].height + 1);
        }
        tree.nodes[index].value = value;
        tree.nodes[index].height = height;
    }
}

fn assign_radii(tree: &mut PackTree, index: usize, total_value: f32, config: &PackConfig) {
    if tree.nodes[index].is_leaf() {
        tree.nodes[index].radius = scale::sqrt(
            total_value,
            (config.min_radius, config.max_radius),
            tree.nodes[index].value,
        );
        return;
    }

    let children = tree.nodes[index].children.clone();
    for &child in &children {
        assign_radii(tree, child, total_value, config);
    }

    // Pack siblings with their radii inflated by the padding, so the
    // enclosing circle keeps every child clear of its parent's rim.
    let mut circles = children
        .iter()
        .map(|&child| Circle::new(Vec2::ZERO, tree.nodes[child].radius + config.padding))
        .collect::<Vec<_>>();
    let enclosing_radius = pack_siblings(&mut circles);

    for (&child, circle) in children.iter().zip(&circles) {
        tree.nodes[child].center = circle.center;
    }
    tree.nodes[index].radius = enclosing_radius.max(config.min_radius);
}

fn offset_children(tree: &mut PackTree, index: usize, origin: Vec2) {
    tree.nodes[index].center += origin;
    let center = tree.nodes[index].center;
    for child in tree.nodes[index].children.clone() {
        offset_children(tree, child, center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy(raw: &str) -> HierarchySnapshot {
        HierarchySnapshot::from_json(raw).unwrap()
    }

    fn two_level() -> PackTree {
        let tree = hierarchy(
            r#"{"name": "root", "children": [
                {"name": "x", "children": [{"name": "x1"}, {"name": "x2"}]},
                {"name": "y"}
            ]}"#,
        );
        pack(&tree, &PackConfig::default())
    }

    fn find(tree: &PackTree, name: &str) -> usize {
        tree.nodes
            .iter()
            .position(|node| node.name == name)
            .unwrap()
    }

    #[test]
    fn values_are_subtree_leaf_counts() {
        let tree = two_level();
        assert_eq!(tree.root().value, 3.0);
        assert_eq!(tree.nodes[find(&tree, "x")].value, 2.0);
        assert_eq!(tree.nodes[find(&tree, "x1")].value, 1.0);
        assert_eq!(tree.root().height, 2);
    }

    #[test]
    fn parent_radius_exceeds_child_radius() {
        let tree = two_level();
        let x = find(&tree, "x");
        let x1 = find(&tree, "x1");
        assert!(tree.nodes[x].radius > tree.nodes[x1].radius);
    }

    #[test]
    fn packing_containment_holds_everywhere() {
        let tree = pack(
            &hierarchy(
                r#"{"name": "root", "children": [
                    {"name": "a", "children": [
                        {"name": "a1"}, {"name": "a2"}, {"name": "a3"},
                        {"name": "a4", "children": [{"name": "a41"}, {"name": "a42"}]}
                    ]},
                    {"name": "b", "children": [{"name": "b1"}, {"name": "b2"}]},
                    {"name": "c"}
                ]}"#,
            ),
            &PackConfig::default(),
        );

        for (index, node) in tree.nodes.iter().enumerate() {
            let Some(parent) = node.parent else {
                continue;
            };
            let parent_node = &tree.nodes[parent];
            let distance = (node.center - parent_node.center).length();
            assert!(
                distance + node.radius <= parent_node.radius + 1e-2,
                "node {index} escapes its parent: {} + {} > {}",
                distance,
                node.radius,
                parent_node.radius
            );
        }
    }

    #[test]
    fn siblings_do_not_overlap() {
        let tree = two_level();
        let x1 = &tree.nodes[find(&tree, "x1")];
        let x2 = &tree.nodes[find(&tree, "x2")];
        let distance = (x1.center - x2.center).length();
        assert!(distance >= x1.radius + x2.radius - 1e-2);
    }

    #[test]
    fn root_is_centered_at_the_origin() {
        let tree = two_level();
        assert_eq!(tree.root().center, Vec2::ZERO);
    }

    #[test]
    fn pack_is_deterministic() {
        let a = two_level();
        let b = two_level();
        for (left, right) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(left.center, right.center);
            assert_eq!(left.radius, right.radius);
        }
    }

    #[test]
    fn empty_hierarchy_single_node() {
        let tree = pack(&hierarchy(r#"{"name": "only"}"#), &PackConfig::default());
        assert_eq!(tree.len(), 1);
        assert!(tree.root().radius > 0.0);
    }
}
