//! Mechanism for loading and checking the selection configuration

use crate::{evcut::SelectionCuts, numeric::Float, Result};

use eyre::{ensure, eyre, WrapErr};

use std::{fs, path::Path, str::FromStr};

/// Selection configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    /// Maximal number of events to be read (None means all of them)
    pub event_limit: Option<usize>,

    /// Thresholds of the event selection
    pub cuts: SelectionCuts,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read {}", file_name.display()))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check the contents of a configuration file
    ///
    /// Configuration items are the first non-whitespace chunk of text on each
    /// line, in a fixed order. Blank lines and lines starting with '#' are
    /// ignored, and anything after the first chunk of a line is a comment.
    ///
    pub fn parse(config_str: &str) -> Result<Self> {
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|item| !item.starts_with('#'));

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let event_limit = next_item("event_limit")?.parse::<usize>()?;
        let config = Configuration {
            event_limit: (event_limit > 0).then_some(event_limit),
            cuts: SelectionCuts {
                higgs_mass: next_item("higgs_mass")?.parse::<Float>()?,
                fatjet_pt_min: next_item("fatjet_pt_min")?.parse::<Float>()?,
                fatjet_eta_max: next_item("fatjet_eta_max")?.parse::<Float>()?,
                mass_window_low: next_item("mass_window_low")?.parse::<Float>()?,
                mass_window_high: next_item("mass_window_high")?.parse::<Float>()?,
                min_jet_mass: next_item("min_jet_mass")?.parse::<Float>()?,
                pnet_cut: next_item("pnet_cut")?.parse::<Float>()?,
                jet_pt_min: next_item("jet_pt_min")?.parse::<Float>()?,
                jet_eta_max: next_item("jet_eta_max")?.parse::<Float>()?,
                jet_btag_min: next_item("jet_btag_min")?.parse::<Float>()?,
                dijet_mass_low: next_item("dijet_mass_low")?.parse::<Float>()?,
                dijet_mass_high: next_item("dijet_mass_high")?.parse::<Float>()?,
                delta_r_cut: next_item("delta_r_cut")?.parse::<Float>()?,
            },
        };
        ensure!(
            config_iter.next().is_none(),
            "Unexpected trailing items in the configuration"
        );
        config.check()?;
        Ok(config)
    }

    /// Check that the configuration makes sense
    pub fn check(&self) -> Result<()> {
        let cuts = &self.cuts;
        ensure!(
            cuts.mass_window_low < cuts.mass_window_high,
            "Empty Higgs mass window [{}, {}]",
            cuts.mass_window_low,
            cuts.mass_window_high
        );
        ensure!(
            cuts.min_jet_mass < cuts.mass_window_low,
            "The mass floor ({}) must be below the Higgs mass window",
            cuts.min_jet_mass
        );
        ensure!(
            cuts.dijet_mass_low < cuts.dijet_mass_high,
            "Empty dijet mass window [{}, {}]",
            cuts.dijet_mass_low,
            cuts.dijet_mass_high
        );
        ensure!(
            (0. ..=1.).contains(&cuts.pnet_cut),
            "ParticleNet working point {} is not a probability",
            cuts.pnet_cut
        );
        ensure!(cuts.delta_r_cut > 0., "Isolation cone must have a positive size");
        ensure!(
            cuts.fatjet_eta_max > 0. && cuts.jet_eta_max > 0.,
            "Pseudorapidity acceptance must not be empty"
        );
        Ok(())
    }

    /// Display the configuration
    pub fn print(&self) {
        let cuts = &self.cuts;
        match self.event_limit {
            Some(limit) => println!("EVENT LIMIT      : {}", limit),
            None => println!("EVENT LIMIT      : none"),
        }
        println!("HIGGS MASS       : {}", cuts.higgs_mass);
        println!("FATJET PT MIN    : {}", cuts.fatjet_pt_min);
        println!("FATJET ETA MAX   : {}", cuts.fatjet_eta_max);
        println!(
            "MASS WINDOW      : [{}, {}]",
            cuts.mass_window_low, cuts.mass_window_high
        );
        println!("MIN JET MASS     : {}", cuts.min_jet_mass);
        println!("PNET CUT         : {}", cuts.pnet_cut);
        println!("JET PT MIN       : {}", cuts.jet_pt_min);
        println!("JET ETA MAX      : {}", cuts.jet_eta_max);
        println!("JET BTAG MIN     : {}", cuts.jet_btag_min);
        println!(
            "DIJET MASS WINDOW: [{}, {}]",
            cuts.dijet_mass_low, cuts.dijet_mass_high
        );
        println!("DELTA R CUT      : {}", cuts.delta_r_cut);
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }
}
