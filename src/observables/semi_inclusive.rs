//! Semi-inclusive hadron-jet correlations
//!
//! Events are tagged by a high-pt charged trigger hadron. For each
//! trigger, the charged jets recoiling against it are recorded.
use std::cell::OnceCell;
use std::f64::consts::PI;

use super::{
    keys::{radius, UNSUBTRACTED_SUFFIX},
    AnalysisError, Settings,
};
use crate::{
    config::{CollisionEnergy, ObservableBlock},
    event::Particle,
    nsubjettiness::Nsubjettiness,
    subtraction::SubtractedJet,
    table::EventObservables,
};

/// Recoil jets have |Δφ(jet, trigger)| above this value
const RECOIL_DPHI_MIN: f64 = PI - 0.6;
/// τ₁ below this value is considered unphysical
const TAU1_MIN: f64 = 1e-3;

fn in_range([min, max]: [f64; 2], value: f64) -> bool {
    min < value && value < max
}

fn is_recoil(jet: &SubtractedJet, trigger: &Particle) -> bool {
    jet.jet().delta_phi_to(&trigger.p).abs() > RECOIL_DPHI_MIN
}

fn range(block: &ObservableBlock, value: &Option<[f64; 2]>, field: &'static str) -> Result<[f64; 2], AnalysisError> {
    Ok(*block.require(value, field)?)
}

fn pt_range(block: &ObservableBlock) -> Result<[f64; 2], AnalysisError> {
    let (min, max) = block.pt_bounds()?;
    Ok([min, max])
}

/// Smallest radius of the block
fn min_jet_r(block: &ObservableBlock) -> Result<f64, AnalysisError> {
    Ok(block.jet_r()?.iter().copied().fold(f64::INFINITY, f64::min))
}

pub(crate) fn fill(
    settings: &Settings,
    jets: &[SubtractedJet],
    charged: &[Particle],
    r: f64,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let Some(category) = settings.config.semi_inclusive_chjet.as_ref() else {
        return Ok(());
    };
    match settings.energy {
        CollisionEnergy::Lhc2760 => {
            let Some(iaa) = category.get("IAA_alice") else {
                return Ok(());
            };
            let analysis = Alice {
                settings,
                iaa,
                dphi: category.get("dphi_alice"),
                nsubjettiness: category.get("nsubjettiness_alice"),
            };
            analysis.fill(jets, charged, r, out)
        }
        CollisionEnergy::Rhic200 => {
            let Some(iaa) = category.get("IAA_star") else {
                return Ok(());
            };
            let analysis = Star {
                settings,
                iaa,
                dphi: category.get("dphi_star"),
            };
            analysis.fill(jets, charged, r, out)
        }
        _ => Ok(()),
    }
}

/// Low and high trigger classes
#[derive(Debug, Copy, Clone, Default)]
struct Triggers {
    low: bool,
    high: bool,
}

impl Triggers {
    fn any(&self) -> bool {
        self.low || self.high
    }

    fn labelled(&self) -> [(bool, &'static str); 2] {
        [(self.low, "_lowTrigger"), (self.high, "_highTrigger")]
    }
}

struct Alice<'a> {
    settings: &'a Settings,
    iaa: &'a ObservableBlock,
    dphi: Option<&'a ObservableBlock>,
    nsubjettiness: Option<&'a ObservableBlock>,
}

impl<'a> Alice<'a> {
    fn fill(
        &self,
        jets: &[SubtractedJet],
        charged: &[Particle],
        r: f64,
        out: &mut EventObservables,
    ) -> Result<(), AnalysisError> {
        let iaa = self.iaa;
        let mut radii = iaa.jet_r()?.to_vec();
        if let Some(nsub) = self.nsubjettiness {
            radii.extend_from_slice(nsub.jet_r()?);
        }
        if !radii.contains(&r) {
            return Ok(());
        }

        let hadron_eta_cut = *iaa.require(&iaa.hadron_eta_cut, "hadron_eta_cut")?;
        let iaa_low = range(iaa, &iaa.low_trigger_range, "low_trigger_range")?;
        let iaa_high = range(iaa, &iaa.high_trigger_range, "high_trigger_range")?;
        let iaa_pt = pt_range(iaa)?;
        let eta_cut_r = *iaa.require(&iaa.eta_cut_r, "eta_cut_R")?;
        let record_trigger = r == min_jet_r(iaa)?;
        let iaa_accepted = self.settings.accepts(iaa)?;
        let iaa_has_r = iaa.has_jet_r(r)?;

        let dphi = match self.dphi {
            Some(dphi) if dphi.has_jet_r(r)? => Some(pt_range(dphi)?),
            _ => None,
        };

        let nsub = match self.nsubjettiness {
            Some(nsub) => Some(NsubSelection {
                low: range(nsub, &nsub.low_trigger_range, "low_trigger_range")?,
                high: range(nsub, &nsub.high_trigger_range, "high_trigger_range")?,
                pt: pt_range(nsub)?,
                active: self.settings.accepts(nsub)? && nsub.has_jet_r(r)?,
            }),
            None => None,
        };

        let r_suffix = radius(r);
        let taus: Vec<OnceCell<(f64, f64)>> = vec![OnceCell::new(); jets.len()];

        for hadron in charged {
            if hadron.eta().abs() >= hadron_eta_cut {
                continue;
            }
            let pt = hadron.pt();
            let hjet = Triggers {
                low: in_range(iaa_low, pt),
                high: in_range(iaa_high, pt),
            };
            let nsub_triggers = nsub.as_ref().map_or_else(Triggers::default, |n| Triggers {
                low: in_range(n.low, pt),
                high: in_range(n.high, pt),
            });
            if !hjet.any() && !nsub_triggers.any() {
                continue;
            }
            if record_trigger {
                out.push("semi_inclusive_chjet_alice_trigger_pt", pt);
            }

            for (jet, tau) in jets.iter().zip(&taus) {
                if jet.jet().eta().abs() >= eta_cut_r - r {
                    continue;
                }
                let recoil = is_recoil(jet, hadron);
                if iaa_accepted {
                    for (found, label) in hjet.labelled() {
                        if !found {
                            continue;
                        }
                        if iaa_has_r && recoil && in_range(iaa_pt, jet.pt) {
                            let key = format!("semi_inclusive_chjet_IAA_alice{r_suffix}{label}");
                            out.push(&key, jet.pt);
                            if self.settings.is_aa() {
                                out.push(&format!("{key}{UNSUBTRACTED_SUFFIX}"), jet.pt_unsubtracted);
                            }
                        }
                        if let Some(dphi_pt) = dphi {
                            if in_range(dphi_pt, jet.pt) {
                                let key = format!("semi_inclusive_chjet_dphi_alice{r_suffix}{label}");
                                out.push(&key, hadron.p.delta_phi_to(jet.jet().momentum()).abs());
                            }
                        }
                    }
                }

                let Some(selection) = nsub.as_ref().filter(|n| n.active) else {
                    continue;
                };
                for (found, label) in nsub_triggers.labelled() {
                    if !found || !recoil || !in_range(selection.pt, jet.pt) {
                        continue;
                    }
                    let &(tau1, tau2) = tau.get_or_init(|| {
                        // normalised to the pt including recoils, since τ_N
                        // is computed without hole subtraction
                        let norm = jet.pt_unsubtracted;
                        (
                            Nsubjettiness::new(1).tau(jet.jet()) / norm,
                            Nsubjettiness::new(2).tau(jet.jet()) / norm,
                        )
                    });
                    if tau1 > TAU1_MIN {
                        let key = format!("semi_inclusive_chjet_nsubjettiness_alice{r_suffix}{label}");
                        out.push(&key, tau2 / tau1);
                    }
                }
            }
        }
        Ok(())
    }
}

struct NsubSelection {
    low: [f64; 2],
    high: [f64; 2],
    pt: [f64; 2],
    /// Whether the centrality and radius are accepted
    active: bool,
}

struct Star<'a> {
    settings: &'a Settings,
    iaa: &'a ObservableBlock,
    dphi: Option<&'a ObservableBlock>,
}

impl<'a> Star<'a> {
    fn fill(
        &self,
        jets: &[SubtractedJet],
        charged: &[Particle],
        r: f64,
        out: &mut EventObservables,
    ) -> Result<(), AnalysisError> {
        let iaa = self.iaa;
        if !iaa.has_jet_r(r)? {
            return Ok(());
        }
        let hadron_eta_cut = *iaa.require(&iaa.hadron_eta_cut, "hadron_eta_cut")?;
        let trigger_range = range(iaa, &iaa.trigger_range, "trigger_range")?;
        let iaa_pt = pt_range(iaa)?;
        let eta_cut_r = *iaa.require(&iaa.eta_cut_r, "eta_cut_R")?;
        let record_trigger = r == min_jet_r(iaa)?;
        let iaa_accepted = self.settings.accepts(iaa)?;
        let dphi = match self.dphi {
            Some(dphi) if dphi.has_jet_r(r)? => Some(pt_range(dphi)?),
            _ => None,
        };
        let r_suffix = radius(r);

        for hadron in charged {
            if hadron.eta().abs() >= hadron_eta_cut || !in_range(trigger_range, hadron.pt()) {
                continue;
            }
            if record_trigger {
                out.push("semi_inclusive_chjet_star_trigger_pt", hadron.pt());
            }
            if !iaa_accepted {
                continue;
            }
            for jet in jets {
                if jet.jet().eta().abs() >= eta_cut_r - r {
                    continue;
                }
                if is_recoil(jet, hadron) && in_range(iaa_pt, jet.pt) {
                    let key = format!("semi_inclusive_chjet_IAA_star{r_suffix}");
                    out.push(&key, jet.pt);
                    if self.settings.is_aa() {
                        out.push(&format!("{key}{UNSUBTRACTED_SUFFIX}"), jet.pt_unsubtracted);
                    }
                }
                if let Some(dphi_pt) = dphi {
                    if in_range(dphi_pt, jet.pt) {
                        let key = format!("semi_inclusive_chjet_dphi_star{r_suffix}");
                        out.push(&key, hadron.p.delta_phi_to(jet.jet().momentum()).abs());
                    }
                }
            }
        }
        Ok(())
    }
}
