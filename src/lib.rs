//! HHH → 6b: boosted and semiboosted event selection
//!
//!
//! # Introduction (for the physicist)
//!
//! This library selects recorded proton-proton collision events where three
//! Higgs bosons could have been produced, each decaying into a pair of b
//! quarks. Depending on their momentum, the b quarks of a Higgs decay either
//! end up in a single large-radius ("fat") jet, or in two separate standard
//! ("resolved") jets.
//!
//! Events are sorted into mutually exclusive regions:
//!
//! * Boosted regions, where all three Higgs candidates are fat jets.
//! * Semiboosted regions, where two Higgs candidates are fat jets and the
//!   third one is a pair of resolved jets.
//!
//! Signal regions (SR) require the fat jet soft-drop masses to be compatible
//! with a Higgs boson, validation regions (VR) use the mass sidebands. Every
//! region is then split into "pass" and "fail" categories of the ParticleNet
//! H → bb̄ vs QCD discriminant, and the number of events surviving each step
//! is recorded in a cut-flow table.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Events own a variable number of jets, which are stored in ragged arrays
//! (see the `ragged` module). The selection is a pipeline of whole-collection
//! transformations: per-object filters, per-event masks, truncation and
//! concatenation. No collection is ever modified in place.
//!
//! * `source` loads events, `runs` reads the number of generated events
//! * `evcut` holds the thresholds and per-object predicates
//! * `closest`, `dijet` and `category` are the building blocks of...
//! * ...the `classifier`, which assigns events to regions
//! * `scheduling` splits the work into batches, `output` reports results

#![warn(missing_docs)]

pub mod category;
pub mod classifier;
pub mod closest;
pub mod config;
pub mod cutflow;
pub mod dijet;
pub mod evcut;
pub mod event;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod ragged;
pub mod runs;
pub mod scheduling;
pub mod source;

/// We'll use eyre's type-erased result type throughout the application
pub type Result<T> = eyre::Result<T>;

pub use crate::{
    classifier::{EventClassifier, SelectionOutput},
    config::Configuration,
    cutflow::{CutFlow, Region, Stage},
    event::{Events, EventsBuilder, FatJet, Jet},
    evcut::SelectionCuts,
};
