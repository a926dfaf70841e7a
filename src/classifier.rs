//! Assignment of events to the mutually exclusive analysis regions
//!
//! The classifier works on whole collections of events at once. Starting from
//! the preselected fat jets, it derives one event mask per region, making sure
//! that each event ends up in at most one region, then splits every region
//! into ParticleNet pass/fail categories. Along the way, the number of events
//! surviving each stage is recorded in a cut-flow table.
//!
//! Regions are defined as follows, N being the number of fat jets which pass
//! the pT/η preselection (these are sorted by decreasing pT):
//!
//! * SR boosted: N > 2, at least 3 fat jets in the Higgs mass window. The 3
//!   leading such fat jets are kept.
//! * VR boosted: N > 2, leading two fat jets in the mass sidebands and third
//!   one in the Higgs mass window, not in the SR boosted. The 3 leading fat
//!   jets are kept.
//! * SR semiboosted: exactly 2 fat jets in the Higgs mass window (either
//!   N == 2, or N > 2 and not in the VR boosted), plus a resolved dijet.
//! * VR semiboosted: the 2 leading fat jets in the mass sidebands (either
//!   N == 2, or N > 2 and in none of the above regions), plus a resolved
//!   dijet.

use crate::{
    category::{self, PassFail},
    cutflow::{CutFlow, Region, Stage},
    dijet::{self, DijetPair, DijetSelection},
    event::{Events, FatJet, Jet},
    evcut::SelectionCuts,
    ragged::{self, EventId, Ragged},
};
use tracing::{debug, info};

/// Output of a semiboosted region
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemiboostedOutput {
    /// Fat jets of the region's events
    pub fatjets: PassFail<FatJet>,

    /// Resolved dijet of the region's events
    pub dijets: PassFail<DijetPair>,
}

/// Selected events of every region, split in discriminant categories
///
/// Fields are laid out in the canonical output order: SR boosted (fail,
/// pass), VR boosted (fail, pass), SR semiboosted (fat jets fail/pass, then
/// dijets fail/pass), VR semiboosted (same).
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionOutput {
    /// Boosted signal region
    pub sr_boosted: PassFail<FatJet>,

    /// Boosted validation region
    pub vr_boosted: PassFail<FatJet>,

    /// Semiboosted signal region
    pub sr_semiboosted: SemiboostedOutput,

    /// Semiboosted validation region
    pub vr_semiboosted: SemiboostedOutput,
}
//
impl SelectionOutput {
    /// Fat jet categories of a region
    pub fn fatjets(&self, region: Region) -> &PassFail<FatJet> {
        match region {
            Region::SrBoosted => &self.sr_boosted,
            Region::VrBoosted => &self.vr_boosted,
            Region::SrSemiboosted => &self.sr_semiboosted.fatjets,
            Region::VrSemiboosted => &self.vr_semiboosted.fatjets,
        }
    }

    /// Source positions of the events of a region (fail category first)
    pub fn region_ids(&self, region: Region) -> Vec<EventId> {
        let split = self.fatjets(region);
        split.fail.ids().iter().chain(split.pass.ids()).copied().collect()
    }

    /// Number of (fail, pass) events in a region
    pub fn yields(&self, region: Region) -> (usize, usize) {
        let split = self.fatjets(region);
        (split.fail.len(), split.pass.len())
    }

    /// Integrate the events of another output (e.g. from another event batch)
    pub fn append(&mut self, other: &Self) {
        self.sr_boosted.append(&other.sr_boosted);
        self.vr_boosted.append(&other.vr_boosted);
        for (mine, theirs) in [
            (&mut self.sr_semiboosted, &other.sr_semiboosted),
            (&mut self.vr_semiboosted, &other.vr_semiboosted),
        ] {
            mine.fatjets.append(&theirs.fatjets);
            mine.dijets.append(&theirs.dijets);
        }
    }
}

/// Event classifier, configured with a set of selection cuts
pub struct EventClassifier {
    cuts: SelectionCuts,
}
//
impl EventClassifier {
    /// Set up event classification
    pub fn new(cuts: SelectionCuts) -> Self {
        Self { cuts }
    }

    /// Classify a batch of events, recording the cut flow of each region
    ///
    /// Each stage of each region is recorded exactly once, overwriting any
    /// previous value in `cutflow`.
    ///
    pub fn classify(&self, events: &Events, cutflow: &mut CutFlow) -> SelectionOutput {
        let cuts = &self.cuts;
        cutflow.record_all(Stage::Skim, events.len());

        // ### PRESELECTION ###

        // Split events by number of preselected fat jets
        let fatjets = events.fatjets.filter_objects(|fj| cuts.precut(fj));
        let eq2_mask = fatjets.count_mask(|n| n == 2);
        let gt2_mask = fatjets.count_mask(|n| n > 2);
        let fatjets_eq2 = fatjets.select(&eq2_mask);
        let jets_eq2 = events.jets.select(&eq2_mask);
        let fatjets_gt2 = fatjets.select(&gt2_mask);
        let jets_gt2 = events.jets.select(&gt2_mask);
        for region in Region::ALL {
            if region.is_semiboosted() {
                cutflow.record(
                    region,
                    Stage::PreselectionFatjets,
                    fatjets_gt2.len() + fatjets_eq2.len(),
                );
            } else {
                cutflow.record(region, Stage::Preselection, fatjets_gt2.len());
            }
        }
        debug!(eq2 = fatjets_eq2.len(), gt2 = fatjets_gt2.len(), "Preselected fat jets");

        // ### BOOSTED REGIONS ###

        // SR: at least 3 fat jets in the Higgs mass window. Only the 3 leading
        // ones are passed on, so that the 4th and further fat jets cannot
        // affect the discriminant category.
        let fatjets_sr = fatjets_gt2.filter_objects(|fj| cuts.higgs_mass_cut(fj));
        let sr_b_mask = fatjets_sr.count_mask(|n| n > 2);
        let fatjets_sr_b = fatjets_sr.select(&sr_b_mask).leading(3);

        // VR: mass pattern of the 3 leading fat jets, orthogonal to the SR
        let vr_b_pattern = fatjets_gt2.event_mask(|fj| cuts.vr_boosted_mass_pattern(&fj[..3]));
        let vr_b_mask = ragged::and_not(&vr_b_pattern, &sr_b_mask);
        let fatjets_vr_b = fatjets_gt2.select(&vr_b_mask).leading(3);

        cutflow.record(Region::SrBoosted, Stage::MassCut, fatjets_sr_b.len());
        cutflow.record(Region::VrBoosted, Stage::MassCut, fatjets_vr_b.len());

        // ### SEMIBOOSTED SIGNAL REGION ###

        // More than 2 fat jets: exactly 2 in the Higgs mass window, and not in
        // the VR boosted. Orthogonality to the SR boosted is guaranteed by the
        // number of fat jets in the mass window.
        let sr_sb_gt2_candidates = fatjets_sr.count_mask(|n| n == 2);
        let sr_sb_gt2_mask = ragged::and_not(&sr_sb_gt2_candidates, &vr_b_mask);
        let fatjets_sr_sb = fatjets_sr.select(&sr_sb_gt2_mask);
        let jets_sr_sb = jets_gt2.select(&sr_sb_gt2_mask);

        // Exactly 2 fat jets: both in the Higgs mass window
        let (fatjets_sr_sb_eq2, jets_sr_sb_eq2) =
            both_pass(&fatjets_eq2, &jets_eq2, |fj| cuts.higgs_mass_cut(fj));

        let sr_sb = self.semiboosted(
            Region::SrSemiboosted,
            fatjets_sr_sb.concat(&fatjets_sr_sb_eq2),
            jets_sr_sb.concat(&jets_sr_sb_eq2),
            cutflow,
        );

        // ### SEMIBOOSTED VALIDATION REGION ###

        // More than 2 fat jets: the 2 leading ones in the mass sidebands, and
        // in no other region
        let fatjets_vr_sb = fatjets_gt2
            .leading(2)
            .filter_objects(|fj| cuts.higgs_mass_veto(fj));
        let other_regions = ragged::or(&ragged::or(&sr_b_mask, &sr_sb_gt2_candidates), &vr_b_mask);
        let vr_sb_gt2_mask =
            ragged::and_not(&fatjets_vr_sb.count_mask(|n| n == 2), &other_regions);
        let fatjets_vr_sb = fatjets_vr_sb.select(&vr_sb_gt2_mask);
        let jets_vr_sb = jets_gt2.select(&vr_sb_gt2_mask);

        // Exactly 2 fat jets: both in the mass sidebands
        let (fatjets_vr_sb_eq2, jets_vr_sb_eq2) =
            both_pass(&fatjets_eq2, &jets_eq2, |fj| cuts.higgs_mass_veto(fj));

        let vr_sb = self.semiboosted(
            Region::VrSemiboosted,
            fatjets_vr_sb.concat(&fatjets_vr_sb_eq2),
            jets_vr_sb.concat(&jets_vr_sb_eq2),
            cutflow,
        );

        // ### DISCRIMINANT CATEGORIES ###

        let output = SelectionOutput {
            sr_boosted: category::split_pass_fail(cuts, &fatjets_sr_b),
            vr_boosted: category::split_pass_fail(cuts, &fatjets_vr_b),
            sr_semiboosted: self.split_semiboosted(&sr_sb),
            vr_semiboosted: self.split_semiboosted(&vr_sb),
        };
        info!(
            events = events.len(),
            sr_boosted = output.sr_boosted.len(),
            vr_boosted = output.vr_boosted.len(),
            sr_semiboosted = output.sr_semiboosted.fatjets.len(),
            vr_semiboosted = output.vr_semiboosted.fatjets.len(),
            "Classified events"
        );
        output
    }

    /// Record the mass cut stage of a semiboosted region, then look for a
    /// resolved dijet
    fn semiboosted(
        &self,
        region: Region,
        fatjets: Ragged<FatJet>,
        jets: Ragged<Jet>,
        cutflow: &mut CutFlow,
    ) -> DijetSelection {
        cutflow.record(region, Stage::MassCutFatjets, fatjets.len());
        dijet::reconstruct(&self.cuts, &fatjets, &jets, cutflow, region)
    }

    /// Split a semiboosted region in discriminant categories
    fn split_semiboosted(&self, selection: &DijetSelection) -> SemiboostedOutput {
        let (fatjets, dijets) =
            category::split_pass_fail_with(&self.cuts, &selection.fatjets, &selection.dijets);
        SemiboostedOutput { fatjets, dijets }
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(SelectionCuts::default())
    }
}

/// Among events with exactly 2 fat jets, keep those where both fat jets pass
/// a cut, along with their resolved jets
fn both_pass(
    fatjets: &Ragged<FatJet>,
    jets: &Ragged<Jet>,
    cut: impl FnMut(&FatJet) -> bool,
) -> (Ragged<FatJet>, Ragged<Jet>) {
    let fatjets = fatjets.filter_objects(cut);
    let mask = fatjets.count_mask(|n| n == 2);
    (fatjets.select(&mask), jets.select(&mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::{tests::fatjet, EventsBuilder},
        numeric::floats::consts::PI,
    };

    /// b-tagged massless jet pair of mass 124 GeV, isolated from fat jets
    /// sitting at φ = 0
    fn higgs_dijet() -> Vec<Jet> {
        let jet = |phi| Jet {
            pt: 62.,
            eta: 0.,
            phi,
            mass: 0.,
            btag_deep_b: 0.9,
        };
        vec![jet(1.6), jet(1.6 - PI)]
    }

    fn classify(events: &Events) -> (SelectionOutput, CutFlow) {
        let mut cutflow = CutFlow::new();
        let output = EventClassifier::default().classify(events, &mut cutflow);
        (output, cutflow)
    }

    fn single_event(fatjets: Vec<FatJet>, jets: Vec<Jet>) -> Events {
        let mut builder = EventsBuilder::new();
        builder.push(fatjets, jets);
        builder.build()
    }

    fn regions_of(output: &SelectionOutput, id: EventId) -> Vec<Region> {
        Region::ALL
            .into_iter()
            .filter(|&region| output.region_ids(region).contains(&id))
            .collect()
    }

    #[test]
    fn boosted_signal_event() {
        // 4 fat jets, 3 of them in the mass window
        let events = single_event(
            vec![
                fatjet(600., 120., 0.95),
                fatjet(500., 130., 0.2),
                fatjet(400., 70., 0.2),
                fatjet(300., 110., 0.2),
            ],
            vec![],
        );
        let (output, cutflow) = classify(&events);
        assert_eq!(regions_of(&output, 0), vec![Region::SrBoosted]);
        assert_eq!(output.yields(Region::SrBoosted), (0, 1));
        let selected = output.sr_boosted.pass.event(0);
        assert_eq!(selected.len(), 3);
        let masses = selected.iter().map(|fj| fj.msoftdrop).collect::<Vec<_>>();
        assert_eq!(masses, vec![120., 130., 110.]);
        assert_eq!(cutflow.get(Region::SrBoosted, Stage::MassCut), Some(1));
        assert_eq!(cutflow.get(Region::VrBoosted, Stage::MassCut), Some(0));
    }

    #[test]
    fn boosted_signal_has_priority_over_validation() {
        // Leading two in the sidebands, 3 in the mass window overall
        let events = single_event(
            vec![
                fatjet(600., 70., 0.2),
                fatjet(500., 170., 0.2),
                fatjet(400., 120., 0.2),
                fatjet(350., 125., 0.2),
                fatjet(300., 130., 0.2),
            ],
            vec![],
        );
        let cuts = SelectionCuts::default();
        assert!(cuts.vr_boosted_mass_pattern(events.fatjets.event(0)));
        let (output, _) = classify(&events);
        assert_eq!(regions_of(&output, 0), vec![Region::SrBoosted]);
        assert_eq!(output.yields(Region::SrBoosted), (1, 0));
    }

    #[test]
    fn boosted_validation_event() {
        let events = single_event(
            vec![
                fatjet(600., 70., 0.2),
                fatjet(500., 170., 0.99),
                fatjet(400., 120., 0.2),
                fatjet(300., 20., 0.2),
            ],
            higgs_dijet(),
        );
        let (output, cutflow) = classify(&events);
        assert_eq!(regions_of(&output, 0), vec![Region::VrBoosted]);
        assert_eq!(output.yields(Region::VrBoosted), (0, 1));
        assert_eq!(output.vr_boosted.pass.event(0).len(), 3);
        assert_eq!(cutflow.get(Region::VrBoosted, Stage::MassCut), Some(1));
        // Not a semiboosted candidate either
        assert_eq!(cutflow.get(Region::VrSemiboosted, Stage::MassCutFatjets), Some(0));
    }

    #[test]
    fn semiboosted_signal_with_two_fat_jets() {
        let events = single_event(
            vec![fatjet(500., 120., 0.95), fatjet(400., 130., 0.3)],
            higgs_dijet(),
        );
        let (output, cutflow) = classify(&events);
        assert_eq!(regions_of(&output, 0), vec![Region::SrSemiboosted]);
        assert_eq!(output.sr_semiboosted.dijets.pass.counts(), vec![1]);
        let region = Region::SrSemiboosted;
        assert_eq!(cutflow.get(region, Stage::Skim), Some(1));
        assert_eq!(cutflow.get(region, Stage::PreselectionFatjets), Some(1));
        assert_eq!(cutflow.get(region, Stage::MassCutFatjets), Some(1));
        assert_eq!(cutflow.get(region, Stage::GoodDijet), Some(1));
        assert_eq!(cutflow.get(Region::SrBoosted, Stage::Preselection), Some(0));
    }

    #[test]
    fn semiboosted_signal_with_more_fat_jets_keeps_mass_window_jets() {
        let events = single_event(
            vec![
                fatjet(600., 200., 0.99),
                fatjet(500., 120., 0.3),
                fatjet(400., 130., 0.3),
            ],
            higgs_dijet(),
        );
        let (output, _) = classify(&events);
        assert_eq!(regions_of(&output, 0), vec![Region::SrSemiboosted]);
        // The high-score fat jet is out of the mass window, so it is dropped
        // and cannot promote the event to the pass category
        assert_eq!(output.sr_semiboosted.fatjets.fail.counts(), vec![2]);
    }

    #[test]
    fn semiboosted_validation_events() {
        let mut builder = EventsBuilder::new();
        builder.push(vec![fatjet(500., 70., 0.3), fatjet(400., 180., 0.3)], higgs_dijet());
        builder.push(
            vec![fatjet(600., 70., 0.3), fatjet(500., 180., 0.95), fatjet(400., 20., 0.3)],
            higgs_dijet(),
        );
        // Below the mass floor: in no region
        builder.push(vec![fatjet(500., 40., 0.3), fatjet(400., 180., 0.3)], higgs_dijet());
        let events = builder.build();
        let (output, cutflow) = classify(&events);
        assert_eq!(output.region_ids(Region::VrSemiboosted), vec![0, 1]);
        assert_eq!(output.yields(Region::VrSemiboosted), (1, 1));
        assert!(regions_of(&output, 2).is_empty());
        assert_eq!(cutflow.get(Region::VrSemiboosted, Stage::MassCutFatjets), Some(2));
        assert_eq!(cutflow.get(Region::VrSemiboosted, Stage::GoodDijet), Some(2));
    }

    #[test]
    fn events_failing_preselection() {
        let mut builder = EventsBuilder::new();
        builder.push(vec![fatjet(500., 125., 0.99)], higgs_dijet());
        builder.push(vec![fatjet(500., 125., 0.99), fatjet(200., 125., 0.99)], higgs_dijet());
        builder.push(vec![], vec![]);
        let events = builder.build();
        let (output, cutflow) = classify(&events);
        for region in Region::ALL {
            assert!(output.region_ids(region).is_empty());
            assert_eq!(cutflow.get(region, Stage::Skim), Some(3));
            assert!(cutflow.is_monotonic(region));
        }
        assert_eq!(cutflow.get(Region::SrSemiboosted, Stage::PreselectionFatjets), Some(0));
    }

    #[test]
    fn every_stage_of_every_region_is_recorded() {
        let (_, cutflow) = classify(&Events::default());
        for region in Region::ALL {
            for &stage in region.stages() {
                assert_eq!(cutflow.get(region, stage), Some(0), "{region} {stage}");
            }
            assert_eq!(cutflow.recorded(region).count(), region.stages().len());
        }
    }

    #[test]
    fn undefined_discriminant_goes_to_fail() {
        let mut jets = vec![fatjet(500., 120., 0.), fatjet(400., 130., 0.)];
        for fj in &mut jets {
            fj.particle_net_qcd = 0.;
        }
        let (output, _) = classify(&single_event(jets, higgs_dijet()));
        assert_eq!(output.yields(Region::SrSemiboosted), (1, 0));
        assert!(output.sr_semiboosted.fatjets.fail.event(0)[0].hbb_vs_qcd().is_nan());
    }
}
