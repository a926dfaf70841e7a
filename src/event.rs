//! This module defines the physics objects of a collision event and the
//! storage of a batch of events

use crate::{
    momentum::{self, Momentum},
    numeric::Float,
    ragged::{EventId, Ragged},
};
use std::{cmp::Ordering, ops::Range};

/// Large-radius jet, candidate for a boosted Higgs → bb̄ decay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatJet {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle
    pub phi: Float,

    /// Soft-drop groomed mass (GeV)
    pub msoftdrop: Float,

    /// ParticleNet mass-decorrelated H → bb̄ score
    pub particle_net_xbb: Float,

    /// ParticleNet mass-decorrelated QCD score
    pub particle_net_qcd: Float,
}
//
impl FatJet {
    /// H → bb̄ vs QCD discriminant, Xbb / (Xbb + QCD)
    ///
    /// This is recomputed on every call rather than stored. If both tagger
    /// scores are zero, the result is NaN, which never passes a threshold.
    ///
    pub fn hbb_vs_qcd(&self) -> Float {
        self.particle_net_xbb / (self.particle_net_xbb + self.particle_net_qcd)
    }
}

/// Standard-radius ("resolved") jet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jet {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle
    pub phi: Float,

    /// Jet mass (GeV)
    pub mass: Float,

    /// DeepCSV b-tagging discriminant
    pub btag_deep_b: Float,
}
//
impl Jet {
    /// 4-momentum of the jet
    pub fn momentum(&self) -> Momentum {
        momentum::from_pt_eta_phi_m(self.pt, self.eta, self.phi, self.mass)
    }

    /// Angular distance to a fat jet
    pub fn delta_r(&self, fatjet: &FatJet) -> Float {
        momentum::delta_r(self.eta, self.phi, fatjet.eta, fatjet.phi)
    }
}

/// Descending transverse momentum order, NaN last
fn by_decreasing_pt(pt1: Float, pt2: Float) -> Ordering {
    pt2.partial_cmp(&pt1).unwrap_or_else(|| pt1.is_nan().cmp(&pt2.is_nan()))
}

/// Batch of collision events, as loaded from the event source
///
/// Both object collections hold the same events, in source order. Within each
/// event, fat jets and jets are sorted by decreasing transverse momentum: the
/// selection relies on this to find "leading" objects, and EventsBuilder is
/// the place where this ordering is established.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Events {
    /// Large-radius jets of each event
    pub fatjets: Ragged<FatJet>,

    /// Resolved jets of each event
    pub jets: Ragged<Jet>,
}
//
impl Events {
    /// Number of events
    pub fn len(&self) -> usize {
        self.fatjets.len()
    }

    /// Truth that there are no events
    pub fn is_empty(&self) -> bool {
        self.fatjets.is_empty()
    }

    /// Extract a contiguous range of events (used for batching)
    pub fn slice(&self, events: Range<usize>) -> Events {
        Events {
            fatjets: self.fatjets.slice(events.clone()),
            jets: self.jets.slice(events),
        }
    }
}

/// Incremental construction of an Events batch
#[derive(Default)]
pub struct EventsBuilder {
    events: Events,
}
//
impl EventsBuilder {
    /// Start building an empty batch of events
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events pushed so far
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Truth that no event has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Add an event, whose source position is the number of events pushed so
    /// far. Objects are sorted by decreasing pT.
    pub fn push(&mut self, mut fatjets: Vec<FatJet>, mut jets: Vec<Jet>) -> EventId {
        let id = self.events.len();
        fatjets.sort_by(|a, b| by_decreasing_pt(a.pt, b.pt));
        jets.sort_by(|a, b| by_decreasing_pt(a.pt, b.pt));
        self.events.fatjets.push_event(id, fatjets);
        self.events.jets.push_event(id, jets);
        id
    }

    /// Finish building
    pub fn build(self) -> Events {
        self.events
    }
}
