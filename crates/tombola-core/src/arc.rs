#![forbid(unsafe_code)]

//! Arc layout and pointer resolution.
//!
//! Segments are laid out clockwise from the current rotation angle, in
//! list order, with no gaps. Each segment's angular span is proportional
//! to its weight. The pointer is fixed at angle 0 (the top of the wheel);
//! the segment under it is found by walking cumulative spans against the
//! inverted rotation angle.

use std::f64::consts::TAU;

use crate::option::WheelOption;

/// Sum of effective weights over a list.
pub fn total_weight(options: &[WheelOption]) -> u64 {
    options.iter().map(|o| u64::from(o.weight())).sum()
}

/// Angular span of each segment, in list order. Empty for an empty list.
///
/// The spans always sum to 2π (within floating-point tolerance).
pub fn arc_spans(options: &[WheelOption]) -> Vec<f64> {
    let total = total_weight(options);
    if total == 0 {
        return Vec::new();
    }
    options
        .iter()
        .map(|o| TAU * f64::from(o.weight()) / total as f64)
        .collect()
}

/// Normalize an angle to [0, 2π).
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 { a + TAU } else { a }
}

/// Index of the segment under the pointer for the given rotation angle.
///
/// Returns `None` for an empty list. If floating-point error leaves the
/// normalized angle outside every cumulative span, falls back to index 0.
pub fn segment_at(options: &[WheelOption], rotation: f64) -> Option<usize> {
    if options.is_empty() {
        return None;
    }

    // The pointer sits at angle 0; invert the rotation to find which
    // segment rotated underneath it.
    let pointer = normalize_angle(TAU - normalize_angle(rotation));

    let mut start = 0.0;
    for (i, span) in arc_spans(options).iter().enumerate() {
        if pointer >= start && pointer < start + span {
            return Some(i);
        }
        start += span;
    }
    Some(0)
}

/// Angle of the center of segment `index`, measured from the layout
/// origin. `None` when the index is out of range.
pub fn segment_center(options: &[WheelOption], index: usize) -> Option<f64> {
    if index >= options.len() {
        return None;
    }
    let spans = arc_spans(options);
    let start: f64 = spans[..index].iter().sum();
    Some(start + spans[index] / 2.0)
}

/// Rotation angle that parks the center of segment `index` under the
/// pointer.
pub fn rotation_for_segment(options: &[WheelOption], index: usize) -> Option<f64> {
    segment_center(options, index).map(|center| normalize_angle(TAU - center))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(weights: &[u32]) -> Vec<WheelOption> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let mut o = WheelOption::new(format!("opt{i}"));
                o.multiplier = w;
                o
            })
            .collect()
    }

    #[test]
    fn spans_sum_to_full_turn() {
        let options = opts(&[1, 2, 3, 1]);
        let sum: f64 = arc_spans(&options).iter().sum();
        assert!((sum - TAU).abs() < 1e-9);
    }

    #[test]
    fn empty_list_has_no_layout() {
        assert!(arc_spans(&[]).is_empty());
        assert_eq!(segment_at(&[], 1.0), None);
        assert_eq!(segment_center(&[], 0), None);
    }

    #[test]
    fn single_option_fills_the_circle() {
        let options = opts(&[1]);
        let spans = arc_spans(&options);
        assert_eq!(spans.len(), 1);
        assert!((spans[0] - TAU).abs() < 1e-12);
        for angle in [0.0, 1.0, 3.0, TAU - 1e-9, -2.5] {
            assert_eq!(segment_at(&options, angle), Some(0));
        }
    }

    #[test]
    fn zero_rotation_points_at_first_segment() {
        let options = opts(&[1, 1, 1]);
        assert_eq!(segment_at(&options, 0.0), Some(0));
    }

    #[test]
    fn rotation_walks_backwards_through_segments() {
        // Rotating the wheel clockwise by one span brings the last
        // segment under the pointer.
        let options = opts(&[1, 1, 1, 1]);
        let span = TAU / 4.0;
        assert_eq!(segment_at(&options, span / 2.0), Some(3));
        assert_eq!(segment_at(&options, span + span / 2.0), Some(2));
    }

    #[test]
    fn negative_angles_normalize() {
        let options = opts(&[1, 1]);
        let a = segment_at(&options, -1.0);
        let b = segment_at(&options, TAU - 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn weighted_spans_are_proportional() {
        let options = opts(&[1, 3]);
        let spans = arc_spans(&options);
        assert!((spans[0] - TAU / 4.0).abs() < 1e-12);
        assert!((spans[1] - 3.0 * TAU / 4.0).abs() < 1e-12);
    }

    #[test]
    fn center_of_first_segment() {
        let options = opts(&[1, 1]);
        let center = segment_center(&options, 0).unwrap();
        assert!((center - TAU / 4.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_for_segment_lands_its_center_under_pointer() {
        let options = opts(&[2, 1, 1, 5]);
        for i in 0..options.len() {
            let rot = rotation_for_segment(&options, i).unwrap();
            assert_eq!(segment_at(&options, rot), Some(i), "segment {i}");
        }
    }

    #[test]
    fn near_full_turn_resolves() {
        let options = opts(&[1, 1, 1]);
        assert!(segment_at(&options, TAU - 1e-12).is_some());
    }
}
