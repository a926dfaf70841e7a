//! Per-region, per-stage record of surviving event counts (cut-flow table)

use crate::numeric::{Count, Float};
use std::fmt::{self, Display};

/// Number of analysis regions
pub const NUM_REGIONS: usize = 4;

/// Number of selection stages
pub const NUM_STAGES: usize = 8;

/// Mutually exclusive analysis regions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Signal region, three Higgs candidates in fat jets
    SrBoosted = 0,

    /// Validation region, boosted topology
    VrBoosted,

    /// Signal region, two Higgs candidates in fat jets + one resolved dijet
    SrSemiboosted,

    /// Validation region, semiboosted topology
    VrSemiboosted,
}
//
impl Region {
    /// All regions, in table order
    pub const ALL: [Region; NUM_REGIONS] = [
        Region::SrBoosted,
        Region::VrBoosted,
        Region::SrSemiboosted,
        Region::VrSemiboosted,
    ];

    /// Name under which the region is reported
    pub fn name(self) -> &'static str {
        match self {
            Region::SrBoosted => "SR_boosted",
            Region::VrBoosted => "VR_boosted",
            Region::SrSemiboosted => "SR_semiboosted",
            Region::VrSemiboosted => "VR_semiboosted",
        }
    }

    /// Truth that the region uses the semiboosted (fat jets + dijet) topology
    pub fn is_semiboosted(self) -> bool {
        matches!(self, Region::SrSemiboosted | Region::VrSemiboosted)
    }

    /// Stages which the event classifier records for this region, in order
    pub fn stages(self) -> &'static [Stage] {
        if self.is_semiboosted() {
            &[
                Stage::Skim,
                Stage::PreselectionFatjets,
                Stage::MassCutFatjets,
                Stage::PreselectionJets,
                Stage::AwayJets,
                Stage::GoodDijet,
            ]
        } else {
            &[Stage::Skim, Stage::Preselection, Stage::MassCut]
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Stages of the event selection, in the order where they are applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Events read from the source
    Skim = 0,

    /// At least 3 preselected fat jets (boosted regions)
    Preselection,

    /// At least 2 preselected fat jets (semiboosted regions)
    PreselectionFatjets,

    /// Fat jet mass requirements (boosted regions)
    MassCut,

    /// Fat jet mass requirements (semiboosted regions)
    MassCutFatjets,

    /// At least 2 preselected resolved jets
    PreselectionJets,

    /// At least 2 resolved jets isolated from the fat jets
    AwayJets,

    /// A resolved dijet with Higgs-like mass
    GoodDijet,
}
//
impl Stage {
    /// All stages, in selection order
    pub const ALL: [Stage; NUM_STAGES] = [
        Stage::Skim,
        Stage::Preselection,
        Stage::PreselectionFatjets,
        Stage::MassCut,
        Stage::MassCutFatjets,
        Stage::PreselectionJets,
        Stage::AwayJets,
        Stage::GoodDijet,
    ];

    /// Name under which the stage is reported
    pub fn name(self) -> &'static str {
        match self {
            Stage::Skim => "Skim",
            Stage::Preselection => "Preselection",
            Stage::PreselectionFatjets => "Preselection_fatjets",
            Stage::MassCut => "Mass_cut",
            Stage::MassCutFatjets => "Mass_cut_fatjets",
            Stage::PreselectionJets => "Preselection_jets",
            Stage::AwayJets => "Away_jets",
            Stage::GoodDijet => "Good_dijet",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Cut-flow table
///
/// Entries which were never recorded are absent, which is different from a
/// count of zero surviving events.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CutFlow {
    counts: [[Option<Count>; NUM_STAGES]; NUM_REGIONS],
}
//
impl CutFlow {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the number of events surviving a stage of a region
    pub fn record(&mut self, region: Region, stage: Stage, count: usize) {
        self.counts[region as usize][stage as usize] = Some(count as Count);
    }

    /// Record the same stage count for all regions
    pub fn record_all(&mut self, stage: Stage, count: usize) {
        for region in Region::ALL {
            self.record(region, stage, count);
        }
    }

    /// Number of events surviving a stage of a region, if recorded
    pub fn get(&self, region: Region, stage: Stage) -> Option<Count> {
        self.counts[region as usize][stage as usize]
    }

    /// Recorded stages of a region, in selection order
    pub fn recorded(&self, region: Region) -> impl Iterator<Item = (Stage, Count)> + '_ {
        Stage::ALL
            .into_iter()
            .filter_map(move |stage| self.get(region, stage).map(|count| (stage, count)))
    }

    /// Fraction of the skimmed events which survive a stage of a region
    pub fn efficiency(&self, region: Region, stage: Stage) -> Option<Float> {
        let skim = self.get(region, Stage::Skim)?;
        let count = self.get(region, stage)?;
        (skim > 0).then(|| count as Float / skim as Float)
    }

    /// Truth that recorded counts never increase along the selection
    pub fn is_monotonic(&self, region: Region) -> bool {
        let counts = self.recorded(region).map(|(_, count)| count).collect::<Vec<_>>();
        counts.windows(2).all(|w| w[1] <= w[0])
    }

    /// Integrate counts from another table (e.g. from another event batch)
    pub fn merge(&mut self, other: &CutFlow) {
        for (mine, theirs) in self.counts.iter_mut().flatten().zip(other.counts.iter().flatten()) {
            *mine = match (*mine, *theirs) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            };
        }
    }
}

impl Display for CutFlow {
    /// Stage-by-region table, absent entries are displayed as "-"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<22}", "")?;
        for region in Region::ALL {
            write!(f, "{:>16}", region.name())?;
        }
        writeln!(f)?;
        for stage in Stage::ALL {
            write!(f, "{:<22}", stage.name())?;
            for region in Region::ALL {
                match self.get(region, stage) {
                    Some(count) => write!(f, "{:>16}", count)?,
                    None => write!(f, "{:>16}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
