//! Multi-threaded back-end of the event selection

use crate::scheduling::{merge, BatchResult};
use rayon::prelude::*;
use std::ops::Range;

/// Classify event batches in parallel
///
/// Batch results are merged in batch order rather than in completion order,
/// so that the output is identical to that of the sequential back-end.
///
pub fn run_selection_impl(
    batches: Vec<Range<usize>>,
    classify_batch: impl Send + Sync + Fn(Range<usize>) -> BatchResult,
) -> BatchResult {
    let mut results = batches
        .into_par_iter()
        .map(|batch| classify_batch(batch))
        .collect::<Vec<_>>()
        .into_iter();

    let mut accumulator = results.next().expect("There is always at least one batch");
    for result in results {
        merge(&mut accumulator, result);
    }
    accumulator
}
