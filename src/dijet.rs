//! Reconstruction of a Higgs → bb̄ candidate from two resolved jets

use crate::{
    closest::closest,
    cutflow::{CutFlow, Region, Stage},
    event::{FatJet, Jet},
    evcut::SelectionCuts,
    momentum::{self, Momentum},
    numeric::Float,
    ragged::Ragged,
};
use tracing::debug;

/// Unordered pair of resolved jets from the same event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DijetPair {
    /// Leading jet of the pair (in pT)
    pub i0: Jet,

    /// Subleading jet of the pair (in pT)
    pub i1: Jet,
}
//
impl DijetPair {
    /// Total 4-momentum of the pair
    pub fn momentum(&self) -> Momentum {
        self.i0.momentum() + self.i1.momentum()
    }

    /// Invariant mass of the pair
    pub fn mass(&self) -> Float {
        momentum::invariant_mass(&self.momentum())
    }
}

/// All unordered pairs of jets, in (i, j > i) lexicographic order
fn combinations(jets: &[Jet]) -> Vec<DijetPair> {
    (0..jets.len())
        .flat_map(|i| {
            (i + 1..jets.len()).map(move |j| DijetPair {
                i0: jets[i],
                i1: jets[j],
            })
        })
        .collect()
}

/// Events of the semiboosted topology which have a good resolved dijet
pub struct DijetSelection {
    /// Fat jets of the surviving events
    pub fatjets: Ragged<FatJet>,

    /// The good dijet of each surviving event
    pub dijets: Ragged<DijetPair>,
}

/// Look for a resolved Higgs candidate in events which have fat jets
///
/// Both input collections must hold the same events. Events are dropped from
/// both collections as they fail the resolved jet requirements, and the
/// number of surviving events is recorded in the cut-flow table of `region`
/// after each step.
///
/// Among all jet pairs of an event, the one whose mass is closest to the
/// Higgs mass is picked, and must then lie within the dijet mass window. If
/// several pairs are equally close, the first one (in pair enumeration order)
/// which passes the mass window wins, so there is at most one good dijet per
/// event.
///
pub fn reconstruct(
    cuts: &SelectionCuts,
    fatjets: &Ragged<FatJet>,
    jets: &Ragged<Jet>,
    cutflow: &mut CutFlow,
    region: Region,
) -> DijetSelection {
    // Apply the preselection to the resolved jets, require at least two
    let jets = jets.filter_objects(|jet| cuts.jet_preselection(jet));
    let mask = jets.count_mask(|n| n > 1);
    let fatjets = fatjets.select(&mask);
    let jets = jets.select(&mask);
    cutflow.record(region, Stage::PreselectionJets, fatjets.len());

    // Require jets to be away from the fat jets, again at least two of them
    let jets = jets.filter_objects_with(&fatjets, |jet, fatjets| cuts.is_isolated(jet, fatjets));
    let mask = jets.count_mask(|n| n > 1);
    let fatjets = fatjets.select(&mask);
    let jets = jets.select(&mask);
    cutflow.record(region, Stage::AwayJets, fatjets.len());

    // Pick the jet pair with mass closest to the Higgs mass, apply mass window
    let good_dijets = jets.map_events(|jets| {
        let pairs = combinations(jets);
        let masses = pairs.iter().map(DijetPair::mass).collect::<Vec<_>>();
        closest(&masses, cuts.higgs_mass)
            .into_iter()
            .zip(pairs.into_iter().zip(masses))
            .filter(|&(is_closest, (_, mass))| is_closest && cuts.dijet_mass_cut(mass))
            .map(|(_, (pair, _))| pair)
            .take(1)
    });

    // Select events with a good dijet
    let mask = good_dijets.count_mask(|n| n > 0);
    let fatjets = fatjets.select(&mask);
    let dijets = good_dijets.select(&mask);
    cutflow.record(region, Stage::GoodDijet, fatjets.len());

    debug!(
        region = region.name(),
        preselection_jets = ?cutflow.get(region, Stage::PreselectionJets),
        away_jets = ?cutflow.get(region, Stage::AwayJets),
        good_dijet = fatjets.len(),
        "Reconstructed resolved dijets"
    );
    DijetSelection { fatjets, dijets }
}
