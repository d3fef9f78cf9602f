use egui::Vec2;

use crate::view::transition::{Transition, View};

use super::{PackConfig, PackTree};

/// How a pack node renders under the current focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackRole {
    /// Outline-only interior circle.
    Interior,
    /// Colorable, clickable leaf circle.
    Leaf,
    Hidden,
}

/// Canvas-space placement of one pack circle for the current view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub center: Vec2,
    pub radius: f32,
}

/// Semantic-zoom camera over a packed tree: a focus node plus the view
/// (center, visible extent) every visual transform derives from.
pub struct FocusView {
    focus: usize,
    view: View,
    transition: Option<Transition>,
}

impl FocusView {
    pub fn new(tree: &PackTree, config: &PackConfig) -> Self {
        let view = if tree.is_empty() {
            View::new(Vec2::ZERO, config.canvas_size.max(1.0))
        } else {
            target_view(tree, PackTree::ROOT, config)
        };

        Self {
            focus: PackTree::ROOT,
            view,
            transition: None,
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Retargets the camera on a node, starting a smooth zoom from the
    /// current view. Out-of-range indices and refocusing the current node
    /// are no-ops; a new focus replaces any in-flight transition.
    pub fn set_focus(&mut self, tree: &PackTree, index: usize, config: &PackConfig) {
        if index >= tree.len() || index == self.focus {
            return;
        }

        self.focus = index;
        self.transition = Some(Transition::new(
            self.view,
            target_view(tree, index, config),
            config.zoom_speed,
        ));
    }

    /// Advances the zoom transition by wall-clock milliseconds; returns
    /// whether the view moved this frame.
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };

        let view = transition.advance(delta_ms);
        let changed = view != self.view;
        self.view = view;
        if transition.is_finished() {
            self.transition = None;
        }
        changed
    }

    pub fn transition_active(&self) -> bool {
        self.transition.is_some()
    }

    /// Level visibility policy: interiors down to the focus depth, leaves
    /// exactly one level below it. Flatten mode always classifies by the
    /// actual tree shape and lets the focus move only the camera.
    pub fn classify(&self, tree: &PackTree, index: usize, config: &PackConfig) -> PackRole {
        let Some(node) = tree.nodes.get(index) else {
            return PackRole::Hidden;
        };

        if config.flatten_leaves {
            return if node.is_leaf() {
                PackRole::Leaf
            } else {
                PackRole::Interior
            };
        }

        let focus_depth = tree
            .nodes
            .get(self.focus)
            .map(|focus| focus.depth)
            .unwrap_or(0);
        if node.depth == focus_depth + 1 {
            PackRole::Leaf
        } else if node.depth <= focus_depth {
            PackRole::Interior
        } else {
            PackRole::Hidden
        }
    }

    /// Projects one pack circle into canvas space for the current view:
    /// `(center - view.center) * k` with `k = canvas / extent`.
    pub fn project(&self, tree: &PackTree, index: usize, config: &PackConfig) -> Option<Projected> {
        let node = tree.nodes.get(index)?;
        let k = config.canvas_size / self.view.extent.max(f32::EPSILON);
        Some(Projected {
            center: (node.center - self.view.center) * k,
            radius: node.radius * k,
        })
    }
}

fn target_view(tree: &PackTree, index: usize, config: &PackConfig) -> View {
    let node = &tree.nodes[index];
    View::new(node.center, (node.radius * config.zoom_extent).max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::pack;
    use crate::snapshot::HierarchySnapshot;

    fn tree() -> (PackTree, PackConfig) {
        let hierarchy = HierarchySnapshot::from_json(
            r#"{"name": "root", "children": [
                {"name": "x", "children": [{"name": "x1"}, {"name": "x2"}]},
                {"name": "y"}
            ]}"#,
        )
        .unwrap();
        let config = PackConfig::default();
        (pack(&hierarchy, &config), config)
    }

    fn find(tree: &PackTree, name: &str) -> usize {
        tree.nodes.iter().position(|n| n.name == name).unwrap()
    }

    #[test]
    fn root_focus_classifies_first_level_as_leaves() {
        let (tree, config) = tree();
        let view = FocusView::new(&tree, &config);

        assert_eq!(view.classify(&tree, PackTree::ROOT, &config), PackRole::Interior);
        assert_eq!(view.classify(&tree, find(&tree, "x"), &config), PackRole::Leaf);
        assert_eq!(view.classify(&tree, find(&tree, "x1"), &config), PackRole::Hidden);
    }

    #[test]
    fn focusing_deeper_reveals_the_next_level() {
        let (tree, config) = tree();
        let mut view = FocusView::new(&tree, &config);
        view.set_focus(&tree, find(&tree, "x"), &config);

        assert_eq!(view.classify(&tree, find(&tree, "x"), &config), PackRole::Interior);
        assert_eq!(view.classify(&tree, find(&tree, "x1"), &config), PackRole::Leaf);
    }

    #[test]
    fn flatten_mode_ignores_focus_for_classification() {
        let (tree, mut config) = tree();
        config.flatten_leaves = true;
        let view = FocusView::new(&tree, &config);

        assert_eq!(view.classify(&tree, find(&tree, "x1"), &config), PackRole::Leaf);
        assert_eq!(view.classify(&tree, find(&tree, "y"), &config), PackRole::Leaf);
        assert_eq!(view.classify(&tree, find(&tree, "x"), &config), PackRole::Interior);
    }

    #[test]
    fn focus_transition_converges_on_the_target() {
        let (tree, config) = tree();
        let mut view = FocusView::new(&tree, &config);
        let x = find(&tree, "x");
        view.set_focus(&tree, x, &config);
        assert!(view.transition_active());

        while view.advance(16.0) {}
        assert!(!view.transition_active());

        let expected = tree.nodes[x].radius * config.zoom_extent;
        assert!((view.view().extent - expected).abs() < 1e-2);
        assert!((view.view().center - tree.nodes[x].center).length() < 1e-2);
    }

    #[test]
    fn projection_fills_the_canvas_with_the_focused_circle() {
        let (tree, config) = tree();
        let mut view = FocusView::new(&tree, &config);
        let x = find(&tree, "x");
        view.set_focus(&tree, x, &config);
        while view.advance(16.0) {}

        let projected = view.project(&tree, x, &config).unwrap();
        assert!(projected.center.length() < 1e-1, "focused circle centers");
        let expected = config.canvas_size / config.zoom_extent;
        assert!((projected.radius - expected).abs() < 1.0);
    }

    #[test]
    fn refocusing_the_same_node_is_a_no_op() {
        let (tree, config) = tree();
        let mut view = FocusView::new(&tree, &config);
        view.set_focus(&tree, PackTree::ROOT, &config);
        assert!(!view.transition_active());
    }
}
