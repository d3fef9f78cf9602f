use egui::{Vec2, vec2};

use crate::graph::LayoutGraph;

/// Expands each member node into its four padded corner points; the hull is
/// computed over this cloud so the outline clears every circle.
pub fn hull_points(graph: &LayoutGraph, members: &[usize], padding: f32) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(members.len() * 4);
    for &member in members {
        let Some(node) = graph.nodes.get(member) else {
            continue;
        };
        let pad = node.radius + padding;
        let center = node.position;
        points.push(center + vec2(-pad, -pad));
        points.push(center + vec2(-pad, pad));
        points.push(center + vec2(pad, -pad));
        points.push(center + vec2(pad, pad));
    }
    points
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    ((a.x - o.x) * (b.y - o.y)) - ((a.y - o.y) * (b.x - o.x))
}

/// Monotone-chain convex hull, counter-clockwise. Degenerate clouds (fewer
/// than three points) yield `None` and the layer draws nothing.
pub fn convex_hull(points: &[Vec2]) -> Option<Vec<Vec2>> {
    if points.len() < 3 {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.retain(|point| point.x.is_finite() && point.y.is_finite());
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return None;
    }

    let mut lower: Vec<Vec2> = Vec::new();
    for &point in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.0
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Vec2> = Vec::new();
    for &point in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.0
        {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 { None } else { Some(lower) }
}

/// Convex hull around a cluster's member circles, or `None` when the
/// cluster is unknown or degenerate.
pub fn cluster_hull(graph: &LayoutGraph, tag: &str, padding: f32) -> Option<Vec<Vec2>> {
    let cluster = graph.clusters.iter().find(|cluster| cluster.tag == tag)?;
    convex_hull(&hull_points(graph, &cluster.members, padding))
}

/// True when `point` lies inside or on the hull polygon (counter-clockwise
/// winding).
pub fn hull_contains(hull: &[Vec2], point: Vec2) -> bool {
    if hull.len() < 3 {
        return false;
    }
    hull.iter().enumerate().all(|(i, &a)| {
        let b = hull[(i + 1) % hull.len()];
        cross(a, b, point) >= -1e-3
    })
}
