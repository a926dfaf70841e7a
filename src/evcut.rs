//! Kinematic cuts applied to the physics objects of recorded events

use crate::{
    event::{FatJet, Jet},
    numeric::Float,
};
use prefix_num_ops::real::*;

/// Thresholds of the event selection
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionCuts {
    /// Reference Higgs boson mass (GeV)
    pub higgs_mass: Float,

    // ### FAT JETS ###
    /// Cut on minimum fat jet transverse momentum (GeV)
    pub fatjet_pt_min: Float,

    /// Cut on maximum fat jet |η|
    pub fatjet_eta_max: Float,

    /// Lower edge of the soft-drop mass window (GeV, inclusive)
    pub mass_window_low: Float,

    /// Upper edge of the soft-drop mass window (GeV, inclusive)
    pub mass_window_high: Float,

    /// Soft-drop mass floor for jets in the mass sidebands (GeV)
    pub min_jet_mass: Float,

    /// ParticleNet Hbb vs QCD working point
    pub pnet_cut: Float,

    // ### RESOLVED JETS ###
    /// Cut on minimum resolved jet transverse momentum (GeV)
    pub jet_pt_min: Float,

    /// Cut on maximum resolved jet |η|
    pub jet_eta_max: Float,

    /// Cut on minimum DeepCSV score (loose working point by default)
    pub jet_btag_min: Float,

    /// Lower edge of the dijet mass window (GeV, inclusive)
    pub dijet_mass_low: Float,

    /// Upper edge of the dijet mass window (GeV, inclusive)
    pub dijet_mass_high: Float,

    /// Minimal angular distance between a resolved jet and any fat jet
    pub delta_r_cut: Float,
}
//
impl SelectionCuts {
    // ### FAT JET CUTS ###

    /// Fat jet preselection on pT and η
    pub fn precut(&self, fatjet: &FatJet) -> bool {
        fatjet.pt > self.fatjet_pt_min && abs(fatjet.eta) < self.fatjet_eta_max
    }

    /// Truth that a fat jet's soft-drop mass is compatible with a Higgs boson
    pub fn higgs_mass_cut(&self, fatjet: &FatJet) -> bool {
        (self.mass_window_low..=self.mass_window_high).contains(&fatjet.msoftdrop)
    }

    /// Truth that a fat jet's soft-drop mass lies in the sidebands of the
    /// Higgs mass window, but above the mass floor
    pub fn higgs_mass_veto(&self, fatjet: &FatJet) -> bool {
        let m = fatjet.msoftdrop;
        (m < self.mass_window_low || m > self.mass_window_high) && m > self.min_jet_mass
    }

    /// Boosted validation region mass pattern: the two leading fat jets are in
    /// the mass sidebands, the third one is in the Higgs mass window
    ///
    /// Fat jets must be sorted by decreasing pT, and there must be at least
    /// three of them. Callers are expected to check the latter beforehand.
    ///
    pub fn vr_boosted_mass_pattern(&self, fatjets: &[FatJet]) -> bool {
        assert!(
            fatjets.len() >= 3,
            "The boosted VR mass pattern needs 3 fat jets, got {}",
            fatjets.len()
        );
        self.higgs_mass_veto(&fatjets[0])
            && self.higgs_mass_veto(&fatjets[1])
            && self.higgs_mass_cut(&fatjets[2])
    }

    /// Truth that a discriminant score passes the ParticleNet working point.
    /// Undefined (NaN) scores never pass.
    pub fn passes_pnet(&self, score: Float) -> bool {
        score > self.pnet_cut
    }

    // ### RESOLVED JET CUTS ###

    /// Resolved jet preselection on pT, η and b-tagging score
    pub fn jet_preselection(&self, jet: &Jet) -> bool {
        jet.pt > self.jet_pt_min
            && abs(jet.eta) < self.jet_eta_max
            && jet.btag_deep_b > self.jet_btag_min
    }

    /// Truth that a resolved jet is far enough from the closest fat jet of
    /// its event. A jet in an event without fat jets is not isolated.
    pub fn is_isolated(&self, jet: &Jet, fatjets: &[FatJet]) -> bool {
        fatjets
            .iter()
            .map(|fatjet| jet.delta_r(fatjet))
            .min_by(Float::total_cmp)
            .map_or(false, |nearest| nearest > self.delta_r_cut)
    }

    /// Truth that a dijet mass lies in the dijet mass window
    pub fn dijet_mass_cut(&self, mass: Float) -> bool {
        (self.dijet_mass_low..=self.dijet_mass_high).contains(&mass)
    }
}

impl Default for SelectionCuts {
    /// Working points of the analysis
    fn default() -> Self {
        Self {
            higgs_mass: 125.,
            fatjet_pt_min: 250.,
            fatjet_eta_max: 2.5,
            mass_window_low: 100.,
            mass_window_high: 150.,
            min_jet_mass: 50.,
            pnet_cut: 0.9105,
            jet_pt_min: 30.,
            jet_eta_max: 2.5,
            jet_btag_min: 0.0532,
            dijet_mass_low: 90.,
            dijet_mass_high: 150.,
            delta_r_cut: 0.8,
        }
    }
}
