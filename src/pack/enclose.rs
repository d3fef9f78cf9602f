use egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.radius - b.radius;
    let d = b.center - a.center;
    dr < 0.0 || (dr * dr) < d.length_sq()
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.radius - b.radius + (a.radius.max(b.radius).max(1.0) * 1e-6);
    let d = b.center - a.center;
    dr > 0.0 && (dr * dr) > d.length_sq()
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|&b| encloses_weak(a, b))
}

fn basis_2(a: Circle, b: Circle) -> Circle {
    let delta = b.center - a.center;
    let dr = b.radius - a.radius;
    let length = delta.length();
    if length <= f32::EPSILON {
        return if a.radius >= b.radius { a } else { b };
    }

    Circle {
        center: (a.center + b.center + (delta / length * dr)) * 0.5,
        radius: (length + a.radius + b.radius) * 0.5,
    }
}

fn basis_3(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.center.x, a.center.y, a.radius);
    let (x2, y2, r2) = (b.center.x, b.center.y, b.radius);
    let (x3, y3, r3) = (c.center.x, c.center.y, c.radius);

    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = (x1 * x1) + (y1 * y1) - (r1 * r1);
    let d2 = d1 - (x2 * x2) - (y2 * y2) + (r2 * r2);
    let d3 = d1 - (x3 * x3) - (y3 * y3) + (r3 * r3);
    let ab = (a3 * b2) - (a2 * b3);
    if ab.abs() <= f32::EPSILON {
        return basis_2(basis_2(a, b), c);
    }

    let xa = ((b2 * d3) - (b3 * d2)) / (ab * 2.0) - x1;
    let xb = ((b3 * c2) - (b2 * c3)) / ab;
    let ya = ((a3 * d2) - (a2 * d3)) / (ab * 2.0) - y1;
    let yb = ((a2 * c3) - (a3 * c2)) / ab;
    let qa = (xb * xb) + (yb * yb) - 1.0;
    let qb = 2.0 * (r1 + (xa * xb) + (ya * yb));
    let qc = (xa * xa) + (ya * ya) - (r1 * r1);
    let radius = if qa.abs() > f32::EPSILON {
        -(qb + ((qb * qb) - (4.0 * qa * qc)).max(0.0).sqrt()) / (2.0 * qa)
    } else {
        -qc / qb
    };

    Circle {
        center: vec2(x1 + xa + (xb * radius), y1 + ya + (yb * radius)),
        radius,
    }
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => basis_2(*a, *b),
        [a, b, c] => basis_3(*a, *b, *c),
        _ => Circle::default(),
    }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Vec<Circle> {
    if encloses_weak_all(p, basis) {
        return vec![p];
    }

    for &a in basis {
        if encloses_not(p, a) && encloses_weak_all(basis_2(a, p), basis) {
            return vec![a, p];
        }
    }

    for i in 0..basis.len() {
        for j in (i + 1)..basis.len() {
            let (a, b) = (basis[i], basis[j]);
            if encloses_not(basis_2(a, b), p)
                && encloses_not(basis_2(a, p), b)
                && encloses_not(basis_2(b, p), a)
                && encloses_weak_all(basis_3(a, b, p), basis)
            {
                return vec![a, b, p];
            }
        }
    }

    // Numerically impossible for consistent input; degrade to the new
    // circle rather than looping forever.
    vec![p]
}

/// Minimal enclosing circle of a set of circles (Welzl-style incremental
/// basis, deterministic input order). Empty input yields `None`.
pub fn enclose(circles: &[Circle]) -> Option<Circle> {
    if circles.is_empty() {
        return None;
    }

    let mut basis: Vec<Circle> = Vec::new();
    let mut enclosing: Option<Circle> = None;
    let mut i = 0;
    while i < circles.len() {
        let p = circles[i];
        match enclosing {
            Some(e) if encloses_weak(e, p) => i += 1,
            _ => {
                basis = extend_basis(&basis, p);
                enclosing = Some(enclose_basis(&basis));
                i = 0;
            }
        }
    }

    enclosing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(e: Circle, c: Circle, tolerance: f32) -> bool {
        (c.center - e.center).length() + c.radius <= e.radius + tolerance
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(enclose(&[]).is_none());
    }

    #[test]
    fn single_circle_encloses_itself() {
        let c = Circle::new(vec2(3.0, -2.0), 5.0);
        assert_eq!(enclose(&[c]), Some(c));
    }

    #[test]
    fn two_disjoint_circles() {
        let a = Circle::new(vec2(-10.0, 0.0), 2.0);
        let b = Circle::new(vec2(10.0, 0.0), 4.0);
        let e = enclose(&[a, b]).unwrap();

        assert!((e.radius - 13.0).abs() < 1e-3);
        assert!(contains(e, a, 1e-3));
        assert!(contains(e, b, 1e-3));
    }

    #[test]
    fn nested_circle_is_absorbed() {
        let big = Circle::new(vec2(0.0, 0.0), 10.0);
        let small = Circle::new(vec2(1.0, 1.0), 2.0);
        let e = enclose(&[small, big]).unwrap();

        assert!((e.radius - 10.0).abs() < 1e-3);
        assert!((e.center - big.center).length() < 1e-3);
    }

    #[test]
    fn all_inputs_are_contained() {
        let circles = (0..12)
            .map(|i| {
                let angle = (i as f32) * 0.7;
                Circle::new(
                    vec2(angle.cos() * (i as f32 * 3.0), angle.sin() * (i as f32 * 2.0)),
                    1.0 + ((i % 4) as f32),
                )
            })
            .collect::<Vec<_>>();

        let e = enclose(&circles).unwrap();
        for &c in &circles {
            assert!(contains(e, c, 1e-2), "{c:?} outside {e:?}");
        }
    }
}
