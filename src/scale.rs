use egui::Color32;

/// Default categorical scheme (ColorBrewer Set2), used when the host
/// supplies none.
pub const DEFAULT_SCHEME: [Color32; 8] = [
    Color32::from_rgb(0x66, 0xc2, 0xa5),
    Color32::from_rgb(0xfc, 0x8d, 0x62),
    Color32::from_rgb(0x8d, 0xa0, 0xcb),
    Color32::from_rgb(0xe7, 0x8a, 0xc3),
    Color32::from_rgb(0xa6, 0xd8, 0x54),
    Color32::from_rgb(0xff, 0xd9, 0x2f),
    Color32::from_rgb(0xe5, 0xc4, 0x94),
    Color32::from_rgb(0xb3, 0xb3, 0xb3),
];

pub const NEUTRAL_COLOR: Color32 = Color32::from_rgb(0xbb, 0xbb, 0xbb);

/// Maps `value` from `domain` into `range` linearly. A zero-span domain
/// short-circuits to the middle of the range instead of dividing by zero.
pub fn linear(domain: (f32, f32), range: (f32, f32), value: f32) -> f32 {
    let span = domain.1 - domain.0;
    if span.abs() <= f32::EPSILON {
        return (range.0 + range.1) * 0.5;
    }
    let t = (value - domain.0) / span;
    range.0 + ((range.1 - range.0) * t)
}

/// Square-root transform of `value` in `[0, max]` into `range`; monotonic,
/// used for weight-to-radius mapping.
pub fn sqrt(max: f32, range: (f32, f32), value: f32) -> f32 {
    if max <= 0.0 {
        return range.0;
    }
    let t = (value.max(0.0) / max).sqrt();
    range.0 + ((range.1 - range.0) * t.min(1.0))
}

/// Ordinal domain spread evenly across a numeric range (a point scale).
#[derive(Clone, Debug)]
pub struct PointScale {
    domain: Vec<String>,
    range: (f32, f32),
    padding: f32,
}

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f32, f32)) -> Self {
        Self {
            domain,
            range,
            padding: 0.0,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Position of `key` along the range, `None` for keys outside the
    /// domain.
    pub fn position(&self, key: &str) -> Option<f32> {
        let rank = self.domain.iter().position(|entry| entry == key)?;
        let slots = (self.domain.len() - 1) as f32 + (self.padding * 2.0);
        if slots <= f32::EPSILON {
            return Some((self.range.0 + self.range.1) * 0.5);
        }
        let step = (self.range.1 - self.range.0) / slots;
        Some(self.range.0 + (step * (self.padding + rank as f32)))
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Ordinal color scale; keys missing from the domain get the neutral
/// default rather than failing.
#[derive(Clone, Debug)]
pub struct ColorScale {
    domain: Vec<String>,
    scheme: Vec<Color32>,
}

impl ColorScale {
    pub fn new(domain: Vec<String>, scheme: Vec<Color32>) -> Self {
        let scheme = if scheme.is_empty() {
            DEFAULT_SCHEME.to_vec()
        } else {
            scheme
        };
        Self { domain, scheme }
    }

    pub fn color(&self, key: &str) -> Color32 {
        match self.domain.iter().position(|entry| entry == key) {
            Some(rank) => self.scheme[rank % self.scheme.len()],
            None => NEUTRAL_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_zero_span_short_circuits() {
        assert_eq!(linear((3.0, 3.0), (0.0, 10.0), 3.0), 5.0);
        assert_eq!(linear((0.0, 10.0), (1.0, 3.0), 5.0), 2.0);
    }

    #[test]
    fn sqrt_is_monotonic_and_bounded() {
        let r = (5.0, 10.0);
        let a = sqrt(16.0, r, 1.0);
        let b = sqrt(16.0, r, 4.0);
        let c = sqrt(16.0, r, 16.0);
        assert!(a < b && b < c);
        assert_eq!(c, 10.0);
        assert_eq!(sqrt(0.0, r, 3.0), 5.0);
    }

    #[test]
    fn point_scale_spreads_the_domain() {
        let scale = PointScale::new(
            vec!["a".into(), "b".into(), "c".into()],
            (0.0, 100.0),
        );
        assert_eq!(scale.position("a"), Some(0.0));
        assert_eq!(scale.position("b"), Some(50.0));
        assert_eq!(scale.position("c"), Some(100.0));
        assert_eq!(scale.position("d"), None);
    }

    #[test]
    fn missing_color_key_gets_neutral_default() {
        let scale = ColorScale::new(vec!["x".into()], Vec::new());
        assert_eq!(scale.color("x"), DEFAULT_SCHEME[0]);
        assert_eq!(scale.color("unknown"), NEUTRAL_COLOR);
    }
}
