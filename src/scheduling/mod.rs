//! This module takes care of scheduling the selection work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(not(feature = "multi-threading"))]
mod sequential;
#[cfg(feature = "multi-threading")]
mod multi_threading;

use crate::{
    classifier::{EventClassifier, SelectionOutput},
    cutflow::CutFlow,
    event::Events,
};
use std::ops::Range;
use tracing::info;

/// Size of the classified event batches
///
/// Events are grouped in batches of a certain size in order to bound the
/// amount of intermediary data that the classifier allocates at any given
/// time, and to give the multi-threaded back-end some parallelism to play
/// with. Classification is per-event, so batching does not affect results.
///
pub const EVENT_BATCH_SIZE: usize = 10_000;

/// Results of classifying one or more event batches
pub type BatchResult = (SelectionOutput, CutFlow);

/// Split a number of events into batches. There is always at least one
/// (possibly empty) batch, so that the cut flow gets recorded.
fn batches(num_events: usize, batch_size: usize) -> Vec<Range<usize>> {
    assert!(batch_size > 0, "Batches must hold at least one event");
    if num_events == 0 {
        return vec![0..0];
    }
    (0..num_events)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(num_events))
        .collect()
}

/// Integrate the results of a batch into the results of previous batches
fn merge(accumulator: &mut BatchResult, batch: BatchResult) {
    accumulator.0.append(&batch.0);
    accumulator.1.merge(&batch.1);
}

/// Classify events in the manner that was configured at build time
///
/// The cut-flow counts of the run are added to those already in `cutflow`,
/// so that a single table can accumulate over several event files. Output
/// events are in batch order, which makes results reproducible.
///
pub fn run_selection(
    classifier: &EventClassifier,
    events: &Events,
    cutflow: &mut CutFlow,
) -> SelectionOutput {
    run_selection_batched(classifier, events, cutflow, EVENT_BATCH_SIZE)
}

/// Like run_selection, with a custom batch size
pub fn run_selection_batched(
    classifier: &EventClassifier,
    events: &Events,
    cutflow: &mut CutFlow,
    batch_size: usize,
) -> SelectionOutput {
    // This kernel classifies one batch of events
    let classify_batch = |batch: Range<usize>| -> BatchResult {
        let mut batch_cutflow = CutFlow::new();
        let output = classifier.classify(&events.slice(batch), &mut batch_cutflow);
        (output, batch_cutflow)
    };
    let batches = batches(events.len(), batch_size);
    let num_batches = batches.len();

    // Classify the batches...
    let (output, run_cutflow) = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_selection_impl(batches, classify_batch)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_selection_impl(batches, classify_batch)
        }
    };

    cutflow.merge(&run_cutflow);
    info!(
        events = events.len(),
        batches = num_batches,
        "Event selection complete"
    );
    output
}
