//! Loading of recorded events
//!
//! The selection works on events which are already in memory. Event sources
//! are what brings them there. The only source provided here reads a simple
//! line-oriented text dump, where each event starts with an `event` line and
//! is followed by its objects:
//!
//! ```text
//! event
//! fatjet <pt> <eta> <phi> <msoftdrop> <particleNetMD_Xbb> <particleNetMD_QCD>
//! jet <pt> <eta> <phi> <mass> <btagDeepB>
//! ```
//!
//! Blank lines and lines starting with '#' are ignored.

use crate::{
    event::{Events, EventsBuilder, FatJet, Jet},
    numeric::Float,
    Result,
};

use eyre::{bail, ensure, WrapErr};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Something which recorded events can be read from
pub trait EventSource {
    /// Read events, up to an optional maximal number of events
    ///
    /// Objects are sorted by decreasing pT within each event.
    ///
    fn read_events(&mut self, limit: Option<usize>) -> Result<Events>;
}

/// Event source reading the text event format
pub struct TextEventSource<R: BufRead> {
    /// Where event data comes from
    reader: R,

    /// Name of the data source, for error reporting
    name: String,
}
//
impl TextEventSource<BufReader<File>> {
    /// Open an event file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Could not open event file {}", path.display()))?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}
//
impl<R: BufRead> TextEventSource<R> {
    /// Read events from an arbitrary source of text
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
        }
    }
}

impl<R: BufRead> EventSource for TextEventSource<R> {
    fn read_events(&mut self, limit: Option<usize>) -> Result<Events> {
        let mut builder = EventsBuilder::new();
        let mut current: Option<(Vec<FatJet>, Vec<Jet>)> = None;
        let mut line = String::new();
        let mut line_number = 0;
        loop {
            line.clear();
            let bytes = self
                .reader
                .read_line(&mut line)
                .wrap_err_with(|| format!("Failed to read from {}", self.name))?;
            if bytes == 0 {
                break;
            }
            line_number += 1;

            let mut fields = line.split_whitespace();
            let Some(keyword) = fields.next() else { continue };
            if keyword.starts_with('#') {
                continue;
            }
            let context = || format!("{}:{}", self.name, line_number);
            match keyword {
                "event" => {
                    if let Some((fatjets, jets)) = current.take() {
                        builder.push(fatjets, jets);
                    }
                    if limit.map_or(false, |limit| builder.len() >= limit) {
                        break;
                    }
                    current = Some((Vec::new(), Vec::new()));
                }
                "fatjet" => {
                    let [pt, eta, phi, msoftdrop, xbb, qcd] =
                        parse_fields::<6>(fields).wrap_err_with(context)?;
                    let Some((fatjets, _)) = current.as_mut() else {
                        bail!("{}: fat jet outside of an event", context())
                    };
                    fatjets.push(FatJet {
                        pt,
                        eta,
                        phi,
                        msoftdrop,
                        particle_net_xbb: xbb,
                        particle_net_qcd: qcd,
                    });
                }
                "jet" => {
                    let [pt, eta, phi, mass, btag_deep_b] =
                        parse_fields::<5>(fields).wrap_err_with(context)?;
                    let Some((_, jets)) = current.as_mut() else {
                        bail!("{}: jet outside of an event", context())
                    };
                    jets.push(Jet {
                        pt,
                        eta,
                        phi,
                        mass,
                        btag_deep_b,
                    });
                }
                other => bail!("{}: unknown record type {:?}", context(), other),
            }
        }
        if let Some((fatjets, jets)) = current {
            builder.push(fatjets, jets);
        }
        Ok(builder.build())
    }
}

/// Parse a fixed number of numerical fields
fn parse_fields<'a, const N: usize>(
    fields: impl Iterator<Item = &'a str>,
) -> Result<[Float; N]> {
    let mut values = [0.; N];
    let mut count = 0;
    for field in fields {
        ensure!(count < N, "Too many fields, expected {}", N);
        values[count] = field
            .parse::<Float>()
            .wrap_err_with(|| format!("Invalid number {:?}", field))?;
        count += 1;
    }
    ensure!(count == N, "Expected {} fields, got {}", N, count);
    Ok(values)
}
