// src/grid/sampler.rs

//! Perceptually uniform sampling of variation axis values.
//!
//! A warp map bends the normalized `[-1, 1]` design space, so drawing raw
//! coordinates uniformly clusters values where the map is compressed. The
//! sampler draws uniformly in the *warped* space and maps back through the
//! inverse of the piecewise-linear warp.

use rand::Rng;

use crate::font::{Axis, WarpPair};

/// Pairs closer than this to the identity do not count as a warp.
pub const WARP_EPSILON: f64 = 1e-6;

/// Samples values for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSampler {
    pub axis: Axis,
    /// Warp pairs sorted by `from`.
    pairs: Vec<WarpPair>,
    has_non_linear_warp: bool,
}

impl AxisSampler {
    /// Builds a sampler for `axis`, optionally warped by `warp_map`.
    ///
    /// Maps with fewer than two pairs cannot be interpolated and are ignored.
    pub fn new(axis: &Axis, warp_map: Option<&[WarpPair]>) -> Self {
        let mut pairs: Vec<WarpPair> = warp_map
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|p| p.from.is_finite() && p.to.is_finite())
            .collect();
        pairs.sort_by(|a, b| a.from.total_cmp(&b.from));

        let has_non_linear_warp =
            pairs.len() >= 2 && pairs.iter().any(|p| (p.to - p.from).abs() > WARP_EPSILON);

        if !has_non_linear_warp {
            pairs.clear();
        }

        log::trace!(
            "AxisSampler {}: {} warp pairs, non-linear={}",
            axis.tag,
            pairs.len(),
            has_non_linear_warp
        );

        Self {
            axis: axis.clone(),
            pairs,
            has_non_linear_warp,
        }
    }

    pub fn tag(&self) -> &str {
        &self.axis.tag
    }

    pub fn has_non_linear_warp(&self) -> bool {
        self.has_non_linear_warp
    }

    pub fn pairs(&self) -> &[WarpPair] {
        &self.pairs
    }

    /// Draws one axis value in user units.
    pub fn sample_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let axis = &self.axis;
        if !self.has_non_linear_warp {
            return axis.min + rng.gen::<f64>() * (axis.max - axis.min);
        }

        let warped = rng.gen::<f64>() * 2.0 - 1.0;
        let raw = invert_warp(&self.pairs, warped);
        normalized_to_user(axis, raw)
    }
}

/// Maps a warped coordinate back to the raw coordinate that produces it.
///
/// `pairs` must be sorted by `from`. The bracketing interval is found by
/// output (`to`) value and the input (`from`) interpolated linearly. Zero-span
/// intervals resolve to the lower pair's input; values outside the map
/// resolve to the nearest endpoint's input. The result is clamped to
/// `[-1, 1]`.
pub fn invert_warp(pairs: &[WarpPair], warped: f64) -> f64 {
    let (first, last) = match (pairs.first(), pairs.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return warped.clamp(-1.0, 1.0),
    };

    if warped <= first.to {
        return first.from.clamp(-1.0, 1.0);
    }
    if warped >= last.to {
        return last.from.clamp(-1.0, 1.0);
    }

    for window in pairs.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        if warped < lo.to || warped > hi.to {
            continue;
        }
        let span = hi.to - lo.to;
        if span.abs() <= f64::EPSILON {
            return lo.from.clamp(-1.0, 1.0);
        }
        let t = (warped - lo.to) / span;
        return (lo.from + t * (hi.from - lo.from)).clamp(-1.0, 1.0);
    }

    // Only reachable for maps whose outputs are not monotonic.
    let nearest = pairs
        .iter()
        .min_by(|a, b| (a.to - warped).abs().total_cmp(&(b.to - warped).abs()))
        .unwrap_or(first);
    nearest.from.clamp(-1.0, 1.0)
}

/// Converts a normalized coordinate to user units.
///
/// Negative coordinates scale between `min` and `default`, non-negative ones
/// between `default` and `max`.
pub fn normalized_to_user(axis: &Axis, coordinate: f64) -> f64 {
    if coordinate < 0.0 {
        axis.default + coordinate * (axis.default - axis.min)
    } else {
        axis.default + coordinate * (axis.max - axis.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn weight_axis() -> Axis {
        Axis::new("wght", 100.0, 400.0, 900.0)
    }

    fn weight_warp() -> Vec<WarpPair> {
        vec![
            WarpPair::new(-1.0, -1.0),
            WarpPair::new(-0.5, -0.7),
            WarpPair::new(0.0, 0.0),
            WarpPair::new(0.5, 0.8),
            WarpPair::new(1.0, 1.0),
        ]
    }

    #[test]
    fn inverse_is_exact_at_knots() {
        let pairs = weight_warp();
        for pair in &pairs {
            let raw = invert_warp(&pairs, pair.to);
            assert!(
                (raw - pair.from).abs() < 1e-12,
                "invert_warp({}) = {}, expected {}",
                pair.to,
                raw,
                pair.from
            );
        }
    }

    #[test]
    fn inverse_interpolates_between_knots() {
        let pairs = weight_warp();
        // Halfway between to=0.0 and to=0.8 is from=0.25.
        assert!((invert_warp(&pairs, 0.4) - 0.25).abs() < 1e-12);
        // Halfway between to=-1.0 and to=-0.7 is from=-0.75.
        assert!((invert_warp(&pairs, -0.85) + 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_span_interval_resolves_to_lower_input() {
        let pairs = vec![
            WarpPair::new(-1.0, -1.0),
            WarpPair::new(0.0, 0.5),
            WarpPair::new(0.5, 0.5),
            WarpPair::new(1.0, 1.0),
        ];
        assert_eq!(invert_warp(&pairs, 0.5), 0.0);
    }

    #[test]
    fn outside_the_map_resolves_to_endpoints() {
        let pairs = vec![WarpPair::new(-0.8, -0.5), WarpPair::new(0.6, 0.5)];
        assert_eq!(invert_warp(&pairs, -0.9), -0.8);
        assert_eq!(invert_warp(&pairs, 0.9), 0.6);
    }

    #[test]
    fn identity_map_is_not_a_warp() {
        let identity = vec![WarpPair::new(-1.0, -1.0), WarpPair::new(0.0, 0.0), WarpPair::new(1.0, 1.0)];
        let sampler = AxisSampler::new(&weight_axis(), Some(identity.as_slice()));
        assert!(!sampler.has_non_linear_warp());
        assert!(sampler.pairs().is_empty());

        let single = vec![WarpPair::new(0.0, 0.4)];
        assert!(!AxisSampler::new(&weight_axis(), Some(single.as_slice())).has_non_linear_warp());
        assert!(!AxisSampler::new(&weight_axis(), None).has_non_linear_warp());
    }

    #[test]
    fn pairs_are_sorted_on_construction() {
        let mut shuffled = weight_warp();
        shuffled.reverse();
        let sampler = AxisSampler::new(&weight_axis(), Some(shuffled.as_slice()));
        assert!(sampler.has_non_linear_warp());
        assert_eq!(sampler.pairs(), weight_warp().as_slice());
    }

    #[test]
    fn normalized_coordinates_map_around_default() {
        let axis = weight_axis();
        assert_eq!(normalized_to_user(&axis, -1.0), 100.0);
        assert_eq!(normalized_to_user(&axis, -0.5), 250.0);
        assert_eq!(normalized_to_user(&axis, 0.0), 400.0);
        assert_eq!(normalized_to_user(&axis, 0.5), 650.0);
        assert_eq!(normalized_to_user(&axis, 1.0), 900.0);
    }

    #[test]
    fn unwarped_samples_are_uniform() {
        let axis = weight_axis();
        let sampler = AxisSampler::new(&axis, None);
        let mut rng = StdRng::seed_from_u64(42);

        const BINS: usize = 8;
        const DRAWS: usize = 40_000;
        let mut histogram = [0usize; BINS];
        for _ in 0..DRAWS {
            let v = sampler.sample_value(&mut rng);
            assert!((axis.min..=axis.max).contains(&v));
            let bin = (((v - axis.min) / (axis.max - axis.min)) * BINS as f64) as usize;
            histogram[bin.min(BINS - 1)] += 1;
        }

        let expected = DRAWS as f64 / BINS as f64;
        for (bin, &count) in histogram.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.1, "bin {} has {} draws", bin, count);
        }
    }

    #[test]
    fn warped_samples_are_uniform_in_warped_space() {
        let axis = weight_axis();
        let pairs = weight_warp();
        let sampler = AxisSampler::new(&axis, Some(pairs.as_slice()));
        let mut rng = StdRng::seed_from_u64(7);

        // Under the warp, raw 0.0..0.5 covers warped 0.0..0.8 (40% of draws)
        // while raw 0.5..1.0 covers warped 0.8..1.0 (10% of draws).
        let mut low_half = 0usize;
        let mut high_half = 0usize;
        const DRAWS: usize = 20_000;
        for _ in 0..DRAWS {
            let v = sampler.sample_value(&mut rng);
            assert!((axis.min..=axis.max).contains(&v));
            if v >= 400.0 && v < 650.0 {
                low_half += 1;
            } else if v >= 650.0 {
                high_half += 1;
            }
        }
        let low = low_half as f64 / DRAWS as f64;
        let high = high_half as f64 / DRAWS as f64;
        assert!((low - 0.4).abs() < 0.02, "low share {}", low);
        assert!((high - 0.1).abs() < 0.02, "high share {}", high);
    }
}
