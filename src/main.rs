//! Command-line front-end of the HHH → 6b event selection

use clap::Parser;
use eyre::WrapErr;
use hhh_select::{
    output::{self, Report},
    runs,
    scheduling,
    source::{EventSource, TextEventSource},
    Configuration, CutFlow, EventClassifier, Result,
};
use std::{path::PathBuf, time::Instant};
use tracing::info;

#[derive(Parser)]
#[command(name = "hhh-select")]
#[command(about = "Boosted and semiboosted HHH → 6b event selection")]
#[command(version)]
struct Cli {
    /// Selection configuration file
    #[arg(short, long, default_value = "selection.cfg")]
    config: PathBuf,

    /// Event file (text event format)
    #[arg(short, long)]
    events: PathBuf,

    /// Run summary file, to report the number of generated events
    #[arg(short, long)]
    runs: Option<PathBuf>,

    /// Also write the report to this file, with a timestamp
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::load(&cli.config).wrap_err("Failed to load the configuration")?;

    // ### EVENT LOADING ###

    let events = TextEventSource::open(&cli.events)?
        .read_events(cfg.event_limit)
        .wrap_err("Failed to load events")?;
    info!(events = events.len(), "Loaded events");
    let gen_events = cli
        .runs
        .as_ref()
        .map(runs::count_generated_events)
        .transpose()
        .wrap_err("Failed to count generated events")?;

    // ### EVENT SELECTION ###

    // Start the clock after I/O, to avoid IO-induced timing fluctuations
    let saved_time = Instant::now();
    let classifier = EventClassifier::new(cfg.cuts.clone());
    let mut cutflow = CutFlow::new();
    let selected = scheduling::run_selection(&classifier, &events, &mut cutflow);
    let elapsed = saved_time.elapsed();

    // ### RESULTS DISPLAY AND STORAGE ###

    let report = Report {
        output: &selected,
        cutflow: &cutflow,
        gen_events,
        elapsed,
    };
    output::dump_results(&report, cli.output.as_deref()).wrap_err("Failed to output the results")
}
