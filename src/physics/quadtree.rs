use egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy)]
pub(crate) struct QuadBounds {
    pub(crate) center: Vec2,
    pub(crate) half_extent: f32,
}

impl QuadBounds {
    fn from_points(positions: &[Vec2], indices: &[usize]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for &index in indices {
            let point = positions[index];
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let half_extent = (span_x.max(span_y) * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    pub(crate) fn contains(self, point: Vec2) -> bool {
        let min = self.center - vec2(self.half_extent, self.half_extent);
        let max = self.center + vec2(self.half_extent, self.half_extent);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let upper = point.y >= self.center.y;
        match (right, upper) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(crate) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared distance from `point` to the nearest edge of the box, zero inside.
    pub(crate) fn distance_sq_to_point(self, point: Vec2) -> f32 {
        let dx = ((point.x - self.center.x).abs() - self.half_extent).max(0.0);
        let dy = ((point.y - self.center.y).abs() - self.half_extent).max(0.0);
        (dx * dx) + (dy * dy)
    }
}

pub(crate) struct QuadCell {
    pub(crate) bounds: QuadBounds,
    pub(crate) center_of_mass: Vec2,
    pub(crate) mass: f32,
    pub(crate) indices: Vec<usize>,
    pub(crate) children: [Option<Box<QuadCell>>; 4],
}

impl QuadCell {
    fn build(bounds: QuadBounds, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.indices.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &cell.indices {
            let quadrant = bounds.quadrant_for(positions[index]);
            buckets[quadrant].push(index);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            let child_bounds = bounds.child(quadrant);
            cell.children[quadrant] = Some(Box::new(Self::build(
                child_bounds,
                bucket,
                positions,
                depth + 1,
            )));
        }
        cell.indices.clear();
        cell
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}

/// Region quadtree over a node position snapshot.
///
/// Rebuilt whole once per simulation tick; positions that are not finite
/// are skipped and never indexed.
pub struct SpatialIndex {
    root: QuadCell,
}

impl SpatialIndex {
    pub fn build(positions: &[Vec2]) -> Option<Self> {
        let finite = (0..positions.len())
            .filter(|&index| positions[index].x.is_finite() && positions[index].y.is_finite())
            .collect::<Vec<_>>();
        if finite.is_empty() {
            return None;
        }

        let bounds = QuadBounds::from_points(positions, &finite)?;
        Some(Self {
            root: QuadCell::build(bounds, finite, positions, 0),
        })
    }

    pub(crate) fn root(&self) -> &QuadCell {
        &self.root
    }

    /// Visits the index of every point whose cell could lie within `radius`
    /// of `point`. Branches whose bounding box cannot intersect the query
    /// disc are pruned; exact distance filtering is left to the visitor.
    pub fn for_each_near(&self, point: Vec2, radius: f32, mut visitor: impl FnMut(usize)) {
        if !(radius >= 0.0) || !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        Self::visit_near(&self.root, point, radius * radius, &mut visitor);
    }

    fn visit_near(cell: &QuadCell, point: Vec2, radius_sq: f32, visitor: &mut impl FnMut(usize)) {
        if cell.mass <= 0.0 || cell.bounds.distance_sq_to_point(point) > radius_sq {
            return;
        }

        for &index in &cell.indices {
            visitor(index);
        }

        for child in cell.children.iter().flatten() {
            Self::visit_near(child, point, radius_sq, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize, step: f32) -> Vec<Vec2> {
        (0..n)
            .flat_map(|row| (0..n).map(move |col| vec2(col as f32 * step, row as f32 * step)))
            .collect()
    }

    #[test]
    fn build_skips_non_finite_positions() {
        let positions = vec![
            vec2(0.0, 0.0),
            vec2(f32::NAN, 4.0),
            vec2(8.0, f32::INFINITY),
            vec2(8.0, 8.0),
        ];

        let index = SpatialIndex::build(&positions).expect("two finite points");
        let mut seen = Vec::new();
        index.for_each_near(vec2(4.0, 4.0), 100.0, |i| seen.push(i));
        seen.sort_unstable();

        assert_eq!(seen, vec![0, 3]);
    }

    #[test]
    fn build_returns_none_without_finite_points() {
        assert!(SpatialIndex::build(&[]).is_none());
        assert!(SpatialIndex::build(&[vec2(f32::NAN, 1.0)]).is_none());
    }

    #[test]
    fn near_query_covers_the_disc() {
        let positions = grid(8, 10.0);
        let index = SpatialIndex::build(&positions).expect("finite grid");

        let query = vec2(35.0, 35.0);
        let radius = 21.0;
        let mut visited = std::collections::HashSet::new();
        index.for_each_near(query, radius, |i| {
            visited.insert(i);
        });

        // Every point actually inside the disc must have been offered.
        for (i, point) in positions.iter().enumerate() {
            if (*point - query).length() <= radius {
                assert!(visited.contains(&i), "missed in-radius point {i}");
            }
        }
    }

    #[test]
    fn near_query_prunes_far_branches() {
        let positions = grid(16, 100.0);
        let index = SpatialIndex::build(&positions).expect("finite grid");

        let mut count = 0usize;
        index.for_each_near(vec2(0.0, 0.0), 150.0, |_| count += 1);

        // 256 points in the tree; a 150-radius disc at the corner touches a handful.
        assert!(count < 40, "visited {count} candidates, pruning is broken");
    }

    #[test]
    fn duplicate_coordinates_are_tolerated() {
        let positions = vec![vec2(5.0, 5.0); 64];
        let index = SpatialIndex::build(&positions).expect("duplicates are fine");

        let mut count = 0usize;
        index.for_each_near(vec2(5.0, 5.0), 1.0, |_| count += 1);
        assert_eq!(count, 64);
    }
}
