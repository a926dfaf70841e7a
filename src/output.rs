//! This module is in charge of outputting the selection results to the
//! standard output and to a report file

use crate::{
    classifier::SelectionOutput,
    cutflow::{CutFlow, Region, Stage},
    numeric::{Count, Float},
    Result,
};

use eyre::WrapErr;
use time::{macros::format_description, OffsetDateTime};

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    time::Duration,
};

/// Everything that goes into a selection report
pub struct Report<'a> {
    /// Selected events
    pub output: &'a SelectionOutput,

    /// Cut flow of the selection
    pub cutflow: &'a CutFlow,

    /// Number of generated events, if known
    pub gen_events: Option<Count>,

    /// Time spent in the selection
    pub elapsed: Duration,
}

/// Output the selection results to the console and, if requested, to disk
pub fn dump_results(report: &Report, file_name: Option<&Path>) -> Result<()> {
    // Print out the report on stdout
    write_report(&mut io::stdout().lock(), report).wrap_err("Failed to print the report")?;

    // Write it down to a file, with a timestamp of when the run ended
    if let Some(file_name) = file_name {
        let timestamp = OffsetDateTime::now_utc()
            .format(format_description!(
                "[day]-[month repr:short]-[year repr:last_two]   [hour]:[minute]:[second]"
            ))
            .wrap_err("Failed to format the timestamp")?;
        let mut file = File::create(file_name)
            .wrap_err_with(|| format!("Could not create {}", file_name.display()))?;
        writeln!(file, "{}", timestamp)?;
        write_report(&mut file, report)
            .wrap_err_with(|| format!("Failed to write {}", file_name.display()))?;
    }
    Ok(())
}

/// Write a selection report
pub fn write_report(writer: &mut impl Write, report: &Report) -> io::Result<()> {
    let skimmed = report.cutflow.get(Region::SrBoosted, Stage::Skim).unwrap_or(0);
    writeln!(writer, "---------------------------------------------")?;
    writeln!(writer, "{:<31}: {}", "Events read", skimmed)?;
    if let Some(gen_events) = report.gen_events {
        writeln!(writer, "{:<31}: {}", "Generated events", gen_events)?;
        if gen_events > 0 {
            let skim_eff = skimmed as Float / gen_events as Float;
            writeln!(writer, "{:<31}: {:.6}", "Skim efficiency", skim_eff)?;
        }
    }
    let elapsed_secs = report.elapsed.as_secs_f64();
    writeln!(writer, "{:<31}: {:.3} s", "Selection time", elapsed_secs)?;
    writeln!(writer, "---------------------------------------------")?;

    // Per-region yields
    writeln!(writer, "{:<16}{:>12}{:>12}{:>14}", "Region", "Fail", "Pass", "Efficiency")?;
    for region in Region::ALL {
        let (fail, pass) = report.output.yields(region);
        let last_stage = *region.stages().last().unwrap_or(&Stage::Skim);
        match report.cutflow.efficiency(region, last_stage) {
            Some(eff) => writeln!(writer, "{:<16}{:>12}{:>12}{:>14.6}", region, fail, pass, eff)?,
            None => writeln!(writer, "{:<16}{:>12}{:>12}{:>14}", region, fail, pass, "-")?,
        }
    }
    writeln!(writer, "---------------------------------------------")?;

    // Cut flow
    write!(writer, "{}", report.cutflow)
}
