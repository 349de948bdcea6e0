#![forbid(unsafe_code)]

//! Weighted random selection.

use rand::Rng;

use crate::arc::total_weight;
use crate::option::WheelOption;

/// Draw a weighted-random index: draw uniformly in `[0, total weight)`
/// and walk the weight list subtracting until the draw falls inside one.
///
/// Unbiased with respect to the weight ratios for any list length ≥ 1.
/// Returns `None` for an empty list.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, options: &[WheelOption]) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    let total = total_weight(options);

    let mut draw = rng.random_range(0..total);
    for (i, opt) in options.iter().enumerate() {
        let w = u64::from(opt.weight());
        if draw < w {
            return Some(i);
        }
        draw -= w;
    }
    Some(0)
}
