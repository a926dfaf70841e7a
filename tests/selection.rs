//! Whole-pipeline checks of the event selection, on hand-written and on
//! randomly generated events

use hhh_select::{
    category::PassFail,
    numeric::{floats::consts::PI, Float},
    ragged::EventId,
    scheduling,
    source::{EventSource, TextEventSource},
    CutFlow, EventClassifier, Events, EventsBuilder, FatJet, Jet, Region, SelectionOutput, Stage,
};
use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

fn fatjet(pt: Float, msoftdrop: Float, xbb: Float) -> FatJet {
    FatJet {
        pt,
        eta: 0.,
        phi: 0.,
        msoftdrop,
        particle_net_xbb: xbb,
        particle_net_qcd: 1. - xbb,
    }
}

fn random_event(rng: &mut impl Rng) -> (Vec<FatJet>, Vec<Jet>) {
    let num_fatjets = rng.gen_range(0..6);
    let fatjets = (0..num_fatjets)
        .map(|_| {
            let xbb: Float = rng.gen_range(0.0..1.0);
            // Sometimes leave the discriminant undefined
            let qcd = if rng.gen_bool(0.05) { 0. } else { 1. - xbb };
            FatJet {
                pt: rng.gen_range(200.0..700.0),
                eta: rng.gen_range(-3.0..3.0),
                phi: rng.gen_range(-PI..PI),
                msoftdrop: rng.gen_range(0.0..220.0),
                particle_net_xbb: if qcd == 0. { 0. } else { xbb },
                particle_net_qcd: qcd,
            }
        })
        .collect();
    let num_jets = rng.gen_range(0..7);
    let jets = (0..num_jets)
        .map(|_| Jet {
            pt: rng.gen_range(10.0..150.0),
            eta: rng.gen_range(-3.0..3.0),
            phi: rng.gen_range(-PI..PI),
            mass: rng.gen_range(0.0..20.0),
            btag_deep_b: rng.gen_range(0.0..1.0),
        })
        .collect();
    (fatjets, jets)
}

fn random_events(seed: u64, num_events: usize) -> Events {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut builder = EventsBuilder::new();
    for _ in 0..num_events {
        let (fatjets, jets) = random_event(&mut rng);
        builder.push(fatjets, jets);
    }
    builder.build()
}

fn sorted_ids<T>(split: &PassFail<T>) -> (Vec<EventId>, Vec<EventId>) {
    let sorted = |ids: &[EventId]| {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids
    };
    (sorted(split.fail.ids()), sorted(split.pass.ids()))
}

fn classify(events: &Events) -> (SelectionOutput, CutFlow) {
    let mut cutflow = CutFlow::new();
    let output = EventClassifier::default().classify(events, &mut cutflow);
    (output, cutflow)
}

#[test]
fn boosted_signal_event_is_not_in_validation_region() {
    let mut builder = EventsBuilder::new();
    builder.push(
        vec![
            fatjet(700., 120., 0.2),
            fatjet(600., 60., 0.99),
            fatjet(500., 130., 0.2),
            fatjet(400., 110., 0.2),
        ],
        vec![],
    );
    let (output, cutflow) = classify(&builder.build());

    assert_eq!(output.region_ids(Region::SrBoosted), vec![0]);
    assert!(output.region_ids(Region::VrBoosted).is_empty());
    let selected = output.sr_boosted.fail.event(0);
    let masses = selected.iter().map(|fj| fj.msoftdrop).collect::<Vec<_>>();
    assert_eq!(masses, vec![120., 130., 110.]);
    assert_eq!(cutflow.get(Region::SrBoosted, Stage::Preselection), Some(1));
    assert_eq!(cutflow.get(Region::SrBoosted, Stage::MassCut), Some(1));
    assert_eq!(cutflow.get(Region::VrBoosted, Stage::MassCut), Some(0));
}

#[test]
fn discriminant_threshold() {
    let mut builder = EventsBuilder::new();
    for xbb in [0.95, 0.5] {
        builder.push(
            vec![fatjet(600., 120., xbb), fatjet(500., 125., 0.1), fatjet(400., 130., 0.1)],
            vec![],
        );
    }
    let (output, _) = classify(&builder.build());
    assert_eq!(output.sr_boosted.pass.ids(), &[0]);
    assert_eq!(output.sr_boosted.fail.ids(), &[1]);
}

#[test]
fn text_events_through_the_selection() {
    let text = "
        # Semiboosted signal event
        event
        fatjet 400 0.3 0.0 130 0.96 0.04
        fatjet 500 -0.2 3.1 120 0.2 0.8
        jet 62 0.0 1.6 0 0.9
        jet 62 0.0 -1.5415926 0 0.9
        jet 20 0.0 0.0 0 0.9

        # Fails preselection
        event
        fatjet 200 0.0 0.0 125 0.9 0.1
    ";
    let events = TextEventSource::new(text.as_bytes(), "inline")
        .read_events(None)
        .unwrap();
    let mut cutflow = CutFlow::new();
    let output = scheduling::run_selection(&EventClassifier::default(), &events, &mut cutflow);

    assert_eq!(output.yields(Region::SrSemiboosted), (0, 1));
    let dijet = output.sr_semiboosted.dijets.pass.event(0)[0];
    assert_relative_eq!(dijet.mass(), 124., epsilon = 0.1);
    assert_eq!(cutflow.get(Region::SrSemiboosted, Stage::Skim), Some(2));
    assert_eq!(cutflow.get(Region::SrSemiboosted, Stage::PreselectionJets), Some(1));
    assert_eq!(cutflow.get(Region::SrSemiboosted, Stage::GoodDijet), Some(1));
}

#[test]
fn regions_partition_selected_events() {
    let events = random_events(0x5eed, 2000);
    let (output, cutflow) = classify(&events);

    let mut seen = vec![None; events.len()];
    for region in Region::ALL {
        let (fail, pass) = output.yields(region);
        let ids = output.region_ids(region);
        assert_eq!(ids.len(), fail + pass);

        // Each event is in at most one region
        for id in ids {
            assert_eq!(seen[id], None, "event {id} is in {region} and {:?}", seen[id]);
            seen[id] = Some(region);
        }

        // Region membership matches the last cut-flow stage
        let last_stage = *region.stages().last().unwrap();
        assert_eq!(cutflow.get(region, last_stage), Some((fail + pass) as u64));
        assert!(cutflow.is_monotonic(region), "{region}\n{cutflow}");
    }
}

#[test]
fn selected_objects_have_the_expected_shape() {
    let events = random_events(42, 2000);
    let (output, _) = classify(&events);

    for region in [Region::SrBoosted, Region::VrBoosted] {
        let split = output.fatjets(region);
        assert!(split.fail.iter().chain(split.pass.iter()).all(|fj| fj.len() == 3));
    }
    for semiboosted in [&output.sr_semiboosted, &output.vr_semiboosted] {
        let fatjets = &semiboosted.fatjets;
        assert!(fatjets.fail.iter().chain(fatjets.pass.iter()).all(|fj| fj.len() == 2));
        let dijets = &semiboosted.dijets;
        assert!(dijets.fail.iter().chain(dijets.pass.iter()).all(|d| d.len() == 1));
        assert_eq!(dijets.fail.ids(), fatjets.fail.ids());
        assert_eq!(dijets.pass.ids(), fatjets.pass.ids());
    }
}

#[test]
fn batching_does_not_change_results() {
    let events = random_events(1234, 1000);
    let classifier = EventClassifier::default();
    let (reference, reference_cutflow) = classify(&events);

    for batch_size in [1, 7, 100, 1000, 5000] {
        let mut cutflow = CutFlow::new();
        let output =
            scheduling::run_selection_batched(&classifier, &events, &mut cutflow, batch_size);
        assert_eq!(cutflow, reference_cutflow, "batch size {batch_size}");
        for region in Region::ALL {
            assert_eq!(
                sorted_ids(output.fatjets(region)),
                sorted_ids(reference.fatjets(region)),
                "{region}, batch size {batch_size}"
            );
        }
    }
}

#[test]
fn cut_flow_accumulates_over_runs() {
    let classifier = EventClassifier::default();
    let mut cutflow = CutFlow::new();
    scheduling::run_selection(&classifier, &random_events(1, 300), &mut cutflow);
    scheduling::run_selection(&classifier, &random_events(2, 200), &mut cutflow);
    for region in Region::ALL {
        assert_eq!(cutflow.get(region, Stage::Skim), Some(500));
    }
}
