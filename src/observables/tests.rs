use super::*;

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use particle_id::ParticleID;

use crate::{event::EventBuilder, four_vector::FourVector, table::Values};

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const CONFIG_2760: &str = r#"
sqrt_s: 2760
jet_R: [0.2, 0.4]
min_jet_pt: 10.
max_jet_y: 3.
hadron:
  pt_ch_alice:
    centrality: [[0, 5]]
    pt: [5., 100.]
    eta_cut: 0.8
hadron_correlations: {}
inclusive_chjet:
  pt_alice:
    centrality: [[0, 10]]
    pt: [20., 100.]
    eta_cut: 0.5
    jet_R: [0.2]
    leading_track_min_pt: 5.
  g_alice:
    centrality: [[0, 10]]
    pt: [40., 60.]
    eta_cut_R: 0.9
    jet_R: [0.2]
inclusive_jet:
  pt_atlas:
    centrality: [[0, 10]]
    pt: [30., 500.]
    y_cut: 2.1
    jet_R: [0.4]
  Dz_atlas:
    centrality: [[0, 10]]
    pt: [100., 398.]
    y_cut: 2.1
    jet_R: [0.4]
dijet:
  xj_atlas:
    centrality: [[0, 10]]
    jet_R: [0.4]
    eta_cut: 2.1
    pt_leading_min: 100.
    pt_subleading_min: 25.
"#;

const CONFIG_SEMI_INCLUSIVE: &str = r#"
sqrt_s: 2760
jet_R: [0.2, 0.4]
min_jet_pt: 10.
max_jet_y: 3.
hadron: {}
hadron_correlations: {}
inclusive_chjet: {}
semi_inclusive_chjet:
  IAA_alice:
    centrality: [[0, 10]]
    jet_R: [0.2, 0.4]
    hadron_eta_cut: 0.9
    low_trigger_range: [8., 9.]
    high_trigger_range: [20., 50.]
    pt: [40., 60.]
    eta_cut_R: 0.9
"#;

const CONFIG_NSUBJETTINESS: &str = r#"
sqrt_s: 2760
jet_R: [0.4]
min_jet_pt: 10.
max_jet_y: 3.
hadron: {}
hadron_correlations: {}
inclusive_chjet: {}
semi_inclusive_chjet:
  IAA_alice:
    centrality: [[0, 10]]
    jet_R: [0.4]
    hadron_eta_cut: 0.9
    low_trigger_range: [8., 9.]
    high_trigger_range: [20., 50.]
    pt: [40., 60.]
    eta_cut_R: 0.9
  nsubjettiness_alice:
    centrality: [[0, 10]]
    jet_R: [0.4]
    low_trigger_range: [8., 9.]
    high_trigger_range: [20., 50.]
    pt: [40., 100.]
"#;

const CONFIG_5020: &str = r#"
sqrt_s: 5020
jet_R: [0.2, 0.4]
min_jet_pt: 10.
max_jet_y: 3.
SoftDrop:
  - {zcut: 0.1, beta: 0}
  - {zcut: 0.4, beta: 0}
hadron: {}
hadron_correlations: {}
inclusive_chjet:
  zg_alice:
    centrality: [[0, 10]]
    pt: [60., 80.]
    eta_cut_R: 0.9
    jet_R: [0.2, 0.4]
    SoftDrop:
      - {zcut: 0.1, beta: 0}
      - {zcut: 0.4, beta: 0}
"#;

fn particle(pid: i32, status: i32, pt: f64, eta: f64, phi: f64) -> Particle {
    Particle::new(
        ParticleID::new(pid),
        status,
        FourVector::from_pt_eta_phi(pt, eta, phi),
    )
}

/// Two back-to-back sprays plus a few soft hadrons
fn dijet_particles() -> Vec<Particle> {
    vec![
        particle(211, 0, 150., 0., 0.),
        particle(211, 0, 50., 0.1, 0.1),
        particle(-211, 0, 80., -0.2, PI),
        particle(211, 0, 10., 0.5, 1.5),
        particle(111, 0, 10., 0.5, -1.5),
        particle(211, 0, 3., 0.2, -1.5),
        particle(211, 0, 10., 1.0, -2.),
    ]
}

fn event(particles: impl IntoIterator<Item = Particle>) -> Event {
    let mut event = EventBuilder::new(0);
    for particle in particles {
        event.add_particle(particle);
    }
    event.build()
}

fn central() -> Option<Centrality> {
    Some(Centrality { min: 0., max: 5. })
}

fn scalars(obs: &EventObservables, key: &str) -> Vec<f64> {
    match obs.get(key) {
        Some(Values::Scalar(v)) => v.clone(),
        other => panic!("{key}: expected scalar values, got {other:?}"),
    }
}

fn pairs(obs: &EventObservables, key: &str) -> Vec<[f64; 2]> {
    match obs.get(key) {
        Some(Values::Pair(v)) => v.clone(),
        other => panic!("{key}: expected pair values, got {other:?}"),
    }
}

#[test]
fn pp_keys() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let analysis = Analysis::new(config, None).unwrap();
    assert!(!analysis.is_aa());
    let keys: Vec<_> = analysis.observables().keys().collect();
    assert_eq!(
        keys,
        [
            "dijet_xj_atlas_R0.4",
            "hadron_pt_ch_alice",
            "inclusive_chjet_g_alice_R0.2",
            "inclusive_chjet_pt_alice_R0.2",
            "inclusive_jet_Dz_atlas_R0.4",
            "inclusive_jet_Dz_atlas_R0.4_Njets",
            "inclusive_jet_pt_atlas_R0.4",
        ]
    );
}

#[test]
fn aa_keys() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let analysis = Analysis::new(config, central()).unwrap();
    assert!(analysis.is_aa());
    let obs = analysis.observables();
    for key in [
        "hadron_pt_ch_alice_holes",
        "inclusive_chjet_pt_alice_R0.2_unsubtracted",
        "inclusive_chjet_g_alice_R0.2_unsubtracted",
        "inclusive_jet_pt_atlas_R0.4_unsubtracted",
        "inclusive_jet_Dz_atlas_R0.4_holes",
        "dijet_xj_atlas_R0.4_unsubtracted",
    ] {
        assert!(obs.contains_key(key), "{key}");
    }
    assert!(!obs.contains_key("inclusive_jet_Dz_atlas_R0.4_unsubtracted"));
    assert_eq!(obs.len(), 13);
}

#[test]
fn excluded_grooming() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_5020).unwrap();
    let analysis = Analysis::new(config, None).unwrap();
    let obs = analysis.observables();
    assert!(obs.contains_key("inclusive_chjet_zg_alice_R0.2_zcut0.4_beta0"));
    assert!(obs.contains_key("inclusive_chjet_tg_alice_R0.2_zcut0.1_beta0"));
    assert!(!obs.contains_key("inclusive_chjet_tg_alice_R0.2_zcut0.4_beta0"));
    assert!(obs.contains_key("inclusive_chjet_tg_alice_R0.4_zcut0.4_beta0"));
}

#[test]
fn missing_field() {
    log_init();
    let yaml = CONFIG_2760.replace("    y_cut: 2.1\n    jet_R: [0.4]\n  Dz_atlas", "    y_cut: 2.1\n  Dz_atlas");
    let config = AnalysisConfig::from_yaml(&yaml).unwrap();
    let Err(AnalysisError::MissingField(err)) = Analysis::new(config, None) else {
        panic!("expected missing field error");
    };
    assert_eq!(err.observable, "pt_atlas");
    assert_eq!(err.field, "jet_R");
}

#[test]
fn hadrons() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();
    let event = event([
        particle(211, 0, 10., 0., 0.),
        particle(111, 0, 10., 0., 1.),
        particle(211, 0, 3., 0., 2.),
        particle(-211, 0, 10., 1., 3.),
        particle(321, -1, 6., 0.2, 3.),
    ]);
    let obs = analysis.analyze_event(&event).unwrap();
    let pt = scalars(obs, "hadron_pt_ch_alice");
    assert_eq!(pt.len(), 1);
    assert_abs_diff_eq!(pt[0], 10., epsilon = 1e-9);
    let pt = scalars(obs, "hadron_pt_ch_alice_holes");
    assert_eq!(pt.len(), 1);
    assert_abs_diff_eq!(pt[0], 6., epsilon = 1e-9);
}

#[test]
fn pp_jets() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let mut analysis = Analysis::new(config, None).unwrap();
    let particles = dijet_particles();
    let leading = (particles[0].p + particles[1].p).pt();
    let subleading = particles[2].pt();
    let obs = analysis.analyze_event(&event(particles)).unwrap();

    let pt = scalars(obs, "inclusive_jet_pt_atlas_R0.4");
    assert_eq!(pt.len(), 2);
    assert_abs_diff_eq!(pt[0], leading, epsilon = 1e-9);
    assert_abs_diff_eq!(pt[1], subleading, epsilon = 1e-9);

    let njets = scalars(obs, "inclusive_jet_Dz_atlas_R0.4_Njets");
    assert_eq!(njets.len(), 1);
    let dz = pairs(obs, "inclusive_jet_Dz_atlas_R0.4");
    assert_eq!(dz.len(), 2);
    for [pt, z] in dz {
        assert_abs_diff_eq!(pt, leading, epsilon = 1e-9);
        assert!(0. < z && z < 1.);
    }

    let xj = scalars(obs, "dijet_xj_atlas_R0.4");
    assert_eq!(xj.len(), 1);
    assert_abs_diff_eq!(xj[0], subleading / leading, epsilon = 1e-9);

    // the leading charged jet is above the pt range
    let pt = scalars(obs, "inclusive_chjet_pt_alice_R0.2");
    assert_eq!(pt.len(), 1);
    assert_abs_diff_eq!(pt[0], subleading, epsilon = 1e-9);
    assert!(scalars(obs, "inclusive_chjet_g_alice_R0.2").is_empty());
}

#[test]
fn deterministic() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();
    let event = event(dijet_particles());
    let first = analysis.analyze_event(&event).unwrap().clone();
    let second = analysis.analyze_event(&event).unwrap();
    assert_eq!(&first, second);
}

#[test]
fn aa_without_holes() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();
    let obs = analysis.analyze_event(&event(dijet_particles())).unwrap();
    assert_eq!(
        scalars(obs, "inclusive_jet_pt_atlas_R0.4"),
        scalars(obs, "inclusive_jet_pt_atlas_R0.4_unsubtracted")
    );
    assert!(pairs(obs, "inclusive_jet_Dz_atlas_R0.4_holes").is_empty());
}

#[test]
fn aa_with_holes() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();
    let mut particles = dijet_particles();
    particles.push(particle(211, -1, 6., 0., 0.05));
    let obs = analysis.analyze_event(&event(particles)).unwrap();

    let pt = scalars(obs, "inclusive_jet_pt_atlas_R0.4");
    let unsubtracted = scalars(obs, "inclusive_jet_pt_atlas_R0.4_unsubtracted");
    assert_eq!(pt.len(), 2);
    assert_abs_diff_eq!(pt[0], unsubtracted[0] - 6., epsilon = 1e-9);
    assert_abs_diff_eq!(pt[1], unsubtracted[1], epsilon = 1e-9);

    let holes = pairs(obs, "inclusive_jet_Dz_atlas_R0.4_holes");
    assert_eq!(holes.len(), 1);
    assert_abs_diff_eq!(holes[0][0], pt[0], epsilon = 1e-9);

    let xj = scalars(obs, "dijet_xj_atlas_R0.4");
    assert_eq!(xj.len(), 1);
    assert_abs_diff_eq!(xj[0], pt[1] / pt[0], epsilon = 1e-9);
}

#[test]
fn semi_inclusive() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_SEMI_INCLUSIVE).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();
    let event = event([
        particle(211, 0, 25., 0., 0.),
        particle(-211, 0, 55., 0.1, PI),
    ]);
    let obs = analysis.analyze_event(&event).unwrap();

    let trigger = scalars(obs, "semi_inclusive_chjet_alice_trigger_pt");
    assert_eq!(trigger.len(), 1);
    assert_abs_diff_eq!(trigger[0], 25., epsilon = 1e-9);

    for r in ["0.2", "0.4"] {
        let key = format!("semi_inclusive_chjet_IAA_alice_R{r}_highTrigger");
        let pt = scalars(obs, &key);
        assert_eq!(pt.len(), 1, "{key}");
        assert_abs_diff_eq!(pt[0], 55., epsilon = 1e-9);
        assert_eq!(pt, scalars(obs, &format!("{key}_unsubtracted")));
        let key = format!("semi_inclusive_chjet_IAA_alice_R{r}_lowTrigger");
        assert!(scalars(obs, &key).is_empty());
    }
}

#[test]
fn nsubjettiness() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_NSUBJETTINESS).unwrap();
    let mut analysis = Analysis::new(config, central()).unwrap();

    // recoil jet: a hard prong with a collinear soft particle, and a
    // second prong; none of them is in a trigger range
    let recoil = [
        particle(211, 0, 60., 0., PI),
        particle(-211, 0, 15., 0., PI + 0.2),
        particle(211, 0, 2., 0., PI + 0.05),
    ];
    let [a, b, c] = recoil;
    let jet_axis = a.p + b.p + c.p;
    let subjet = a.p + c.p;
    let tau1: f64 = recoil.iter().map(|h| h.pt() * h.p.delta_r(&jet_axis)).sum();
    let tau2 = a.pt() * a.p.delta_r(&subjet) + c.pt() * c.p.delta_r(&subjet);
    assert!(tau2 > 0.);

    let low = "semi_inclusive_chjet_nsubjettiness_alice_R0.4_lowTrigger";
    let high = "semi_inclusive_chjet_nsubjettiness_alice_R0.4_highTrigger";
    let with_trigger = |pt: f64| event(recoil.into_iter().chain([particle(211, 0, pt, 0., 0.)]));

    let obs = analysis.analyze_event(&with_trigger(25.)).unwrap();
    let ratio = scalars(obs, high);
    assert_eq!(ratio.len(), 1);
    assert_abs_diff_eq!(ratio[0], tau2 / tau1, epsilon = 1e-9);
    assert!(scalars(obs, low).is_empty());

    let obs = analysis.analyze_event(&with_trigger(8.5)).unwrap();
    let ratio = scalars(obs, low);
    assert_eq!(ratio.len(), 1);
    assert_abs_diff_eq!(ratio[0], tau2 / tau1, epsilon = 1e-9);
    assert!(scalars(obs, high).is_empty());

    // between the trigger ranges
    let obs = analysis.analyze_event(&with_trigger(15.)).unwrap();
    assert!(scalars(obs, low).is_empty());
    assert!(scalars(obs, high).is_empty());
}

#[test]
fn rejected_centrality() {
    log_init();
    let config = AnalysisConfig::from_yaml(CONFIG_2760).unwrap();
    let peripheral = Some(Centrality { min: 30., max: 40. });
    let mut analysis = Analysis::new(config, peripheral).unwrap();
    let obs = analysis.analyze_event(&event(dijet_particles())).unwrap();
    assert!(obs.iter().all(|(_, values)| values.is_empty()));
}
