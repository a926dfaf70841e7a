//! Selection of the candidates closest to a reference value

use crate::numeric::Float;
use prefix_num_ops::real::*;

/// Mark the candidate values which are closest to a reference value
///
/// Every candidate achieving the minimal |value - reference| is marked, so
/// ties yield several marked candidates. NaN values are never marked.
///
pub fn closest(values: &[Float], reference: Float) -> Vec<bool> {
    let deltas = values.iter().map(|&v| abs(v - reference)).collect::<Vec<_>>();
    let min_delta = deltas
        .iter()
        .copied()
        .filter(|delta| !delta.is_nan())
        .fold(Float::INFINITY, Float::min);
    deltas.into_iter().map(|delta| delta == min_delta).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_nearest_mass() {
        assert_eq!(closest(&[100., 126., 200.], 125.), vec![false, true, false]);
    }

    #[test]
    fn ties_are_all_marked() {
        assert_eq!(closest(&[120., 130., 140.], 125.), vec![true, true, false]);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(closest(&[], 125.).is_empty());
        assert_eq!(closest(&[Float::NAN, 90.], 125.), vec![false, true]);
    }
}
