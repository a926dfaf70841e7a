//! Sequential back-end of the event selection

use crate::scheduling::{merge, BatchResult};
use std::ops::Range;

/// Classify event batches one after the other
pub fn run_selection_impl(
    batches: Vec<Range<usize>>,
    classify_batch: impl Fn(Range<usize>) -> BatchResult,
) -> BatchResult {
    let mut batches = batches.into_iter();

    // Initialize the accumulator with the first batch of events
    let first_batch = batches.next().expect("There is always at least one batch");
    let mut accumulator = classify_batch(first_batch);

    // Integrate the remaining batches
    for batch in batches {
        merge(&mut accumulator, classify_batch(batch));
    }
    accumulator
}
