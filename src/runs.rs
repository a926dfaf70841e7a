//! Readout of the number of generated events from run summaries
//!
//! Simulated samples are usually skimmed before selection, so the number of
//! events in the event file is not the number of generated events. That one
//! is stored per run in a run summary file, one `<run> <genEventCount>` record
//! per line, and must be summed over all runs.

use crate::{numeric::Count, Result};

use eyre::{ensure, WrapErr};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Summary of one run of a simulated sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Run number
    pub run: u32,

    /// Number of events generated during this run
    pub gen_event_count: Count,
}

/// Total number of generated events across a set of runs
pub fn sum_gen_event_counts(runs: impl IntoIterator<Item = RunSummary>) -> Count {
    runs.into_iter().map(|run| run.gen_event_count).sum()
}

/// Parse the run summaries of a run summary file
pub fn read_run_summaries(reader: impl BufRead) -> Result<Vec<RunSummary>> {
    let mut runs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.wrap_err("Failed to read run summary")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = line.split_whitespace().collect::<Vec<_>>();
        ensure!(
            fields.len() == 2,
            "Line {}: expected <run> <genEventCount>, got {:?}",
            idx + 1,
            line
        );
        runs.push(RunSummary {
            run: fields[0]
                .parse()
                .wrap_err_with(|| format!("Line {}: invalid run number", idx + 1))?,
            gen_event_count: fields[1]
                .parse()
                .wrap_err_with(|| format!("Line {}: invalid event count", idx + 1))?,
        });
    }
    Ok(runs)
}

/// Total number of generated events recorded in a run summary file
///
/// The file is only opened for reading, and closed before returning, whether
/// reading succeeded or not.
///
pub fn count_generated_events(path: impl AsRef<Path>) -> Result<Count> {
    let path = path.as_ref();
    let file = File::open(path)
        .wrap_err_with(|| format!("Could not open run summary {}", path.display()))?;
    let runs = read_run_summaries(BufReader::new(file))
        .wrap_err_with(|| format!("Bad run summary {}", path.display()))?;
    Ok(sum_gen_event_counts(runs))
}
