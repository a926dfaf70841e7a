//! Split of selected events into "pass" and "fail" categories of the
//! ParticleNet Hbb vs QCD discriminant

use crate::{
    event::FatJet,
    evcut::SelectionCuts,
    numeric::Float,
    ragged::{EventMask, Ragged},
};

/// Events of a region, split by discriminant category
#[derive(Clone, Debug, PartialEq)]
pub struct PassFail<T> {
    /// Events whose best fat jet does not pass the working point
    pub fail: Ragged<T>,

    /// Events whose best fat jet passes the working point
    pub pass: Ragged<T>,
}
//
impl<T: Clone> PassFail<T> {
    /// Split a collection according to a per-event pass mask
    fn split(collection: &Ragged<T>, pass_mask: &[bool]) -> Self {
        let fail_mask = pass_mask.iter().map(|&pass| !pass).collect::<Vec<_>>();
        Self {
            fail: collection.select(&fail_mask),
            pass: collection.select(pass_mask),
        }
    }

    /// Integrate the events of another split (e.g. from another event batch)
    pub fn append(&mut self, other: &Self) {
        self.fail.append(&other.fail);
        self.pass.append(&other.pass);
    }
}
//
impl<T> PassFail<T> {
    /// Total number of events across both categories
    pub fn len(&self) -> usize {
        self.fail.len() + self.pass.len()
    }

    /// Truth that there are no events in either category
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for PassFail<T> {
    fn default() -> Self {
        Self {
            fail: Ragged::default(),
            pass: Ragged::default(),
        }
    }
}

/// Highest discriminant score among the fat jets of an event
///
/// This is the score of the first fat jet once they are sorted by decreasing
/// discriminant, with undefined (NaN) scores sorted last. If there is no fat
/// jet with a defined score, the result is NaN.
///
pub fn leading_score(fatjets: &[FatJet]) -> Float {
    fatjets
        .iter()
        .map(FatJet::hbb_vs_qcd)
        .filter(|score| !score.is_nan())
        .max_by(Float::total_cmp)
        .unwrap_or(Float::NAN)
}

/// Truth that each event's leading fat jet passes the discriminant cut
pub fn pass_mask(cuts: &SelectionCuts, fatjets: &Ragged<FatJet>) -> EventMask {
    fatjets.event_mask(|fatjets| cuts.passes_pnet(leading_score(fatjets)))
}

/// Split events into discriminant categories. Every event ends up in exactly
/// one of the categories.
pub fn split_pass_fail(cuts: &SelectionCuts, fatjets: &Ragged<FatJet>) -> PassFail<FatJet> {
    PassFail::split(fatjets, &pass_mask(cuts, fatjets))
}

/// Like split_pass_fail, but also split a parallel collection (holding the
/// same events) along the same event categories
pub fn split_pass_fail_with<T: Clone>(
    cuts: &SelectionCuts,
    fatjets: &Ragged<FatJet>,
    parallel: &Ragged<T>,
) -> (PassFail<FatJet>, PassFail<T>) {
    assert_eq!(fatjets.ids(), parallel.ids(), "Collections must hold the same events");
    let mask = pass_mask(cuts, fatjets);
    (PassFail::split(fatjets, &mask), PassFail::split(parallel, &mask))
}
