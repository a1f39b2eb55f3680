//! Inclusive full jet observables
use super::{
    block,
    keys::{grooming, kappa, radius, HOLES_SUFFIX, NJETS_SUFFIX, UNSUBTRACTED_SUFFIX},
    AnalysisError, Settings,
};
use crate::{
    config::{CollisionEnergy, ObservableBlock},
    event::Particle,
    groom::{GroomedJet, SoftDrop},
    subtraction::SubtractedJet,
    table::EventObservables,
    traits::Groom,
};

/// Minimum pt of a charged constituent for ALICE full jets
fn alice_leading_track_min_pt(r: f64) -> f64 {
    if r == 0.2 {
        5.
    } else {
        7.
    }
}

/// Whether the jet has a charged constituent with pt above `min_pt`
pub(crate) fn has_leading_track(jet: &SubtractedJet, min_pt: f64) -> bool {
    jet.jet()
        .constituents()
        .iter()
        .any(|c| c.pt() > min_pt && c.is_charged())
}

pub(crate) fn fill(
    settings: &Settings,
    jet: &SubtractedJet,
    particles: &[Particle],
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    if settings.config.inclusive_jet.is_none() {
        return Ok(());
    }
    if settings.energy.is_lhc() {
        fill_ungroomed(settings, jet, particles, out)?;
    }
    if settings.energy == CollisionEnergy::Lhc5020 {
        fill_groomed(settings, jet, out)?;
    }
    Ok(())
}

/// Record the subtracted jet pt and, in heavy-ion runs, the unsubtracted one
fn push_pt(settings: &Settings, key: &str, jet: &SubtractedJet, out: &mut EventObservables) {
    out.push(key, jet.pt);
    if settings.is_aa() {
        out.push(&format!("{key}{UNSUBTRACTED_SUFFIX}"), jet.pt_unsubtracted);
    }
}

fn fill_ungroomed(
    settings: &Settings,
    jet: &SubtractedJet,
    particles: &[Particle],
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let category = settings.config.inclusive_jet.as_ref();
    let r = jet.radius();
    let r_suffix = radius(r);
    let pt = jet.pt;
    let abs_eta = jet.jet().eta().abs();
    let abs_rap = jet.jet().rap().abs();

    if let Some(block) = block(category, "pt_alice") {
        if settings.accepts(block)? && block.has_jet_r(r)? {
            let eta_cut_r = *block.require(&block.eta_cut_r, "eta_cut_R")?;
            let (pt_min, pt_max) = block.pt_bounds()?;
            if abs_eta < eta_cut_r - r
                && pt_min < pt
                && pt < pt_max
                && has_leading_track(jet, alice_leading_track_min_pt(r))
            {
                push_pt(settings, &format!("inclusive_jet_pt_alice{r_suffix}"), jet, out);
            }
        }
    }

    if let Some(block) = block(category, "pt_atlas") {
        if settings.accepts(block)? && block.has_jet_r(r)? {
            let y_cut = *block.require(&block.y_cut, "y_cut")?;
            let (pt_min, pt_max) = block.pt_bounds()?;
            if abs_rap < y_cut && pt_min < pt && pt < pt_max {
                push_pt(settings, &format!("inclusive_jet_pt_atlas{r_suffix}"), jet, out);
            }
        }
    }

    if let Some(block) = block(category, "pt_cms") {
        if settings.accepts(block)? && block.has_jet_r(r)? {
            let (pt_min, pt_max) = block.pt_bounds()?;
            if block.eta_cut()?.accepts(abs_eta) && pt_min < pt && pt < pt_max {
                push_pt(settings, &format!("inclusive_jet_pt_cms{r_suffix}"), jet, out);
            }
        }
    }

    if let Some(block) = block(category, "Dz_atlas") {
        if settings.accepts(block)? && block.has_jet_r(r)? {
            let y_cut = *block.require(&block.y_cut, "y_cut")?;
            if abs_rap < y_cut {
                fill_fragmentation(settings, block, "atlas", jet, particles, out)?;
            }
        }
    }

    if settings.energy == CollisionEnergy::Lhc2760 {
        if let Some(block) = block(category, "Dz_cms") {
            if settings.accepts(block)? && block.has_jet_r(r)? {
                if block.eta_cut()?.accepts(abs_eta) {
                    fill_fragmentation(settings, block, "cms", jet, particles, out)?;
                }
            }
        }
    }

    if settings.energy == CollisionEnergy::Lhc5020 {
        if let Some(block) = block(category, "charge_cms") {
            fill_charge(settings, block, jet, particles, out)?;
        }
    }
    Ok(())
}

/// Fragmentation functions D(z) and D(pt)
///
/// Each charged hadron within the jet cone is recorded as (jet pt, z) and
/// (jet pt, hadron pt), with z the longitudinal momentum fraction.
fn fill_fragmentation(
    settings: &Settings,
    block: &ObservableBlock,
    experiment: &str,
    jet: &SubtractedJet,
    particles: &[Particle],
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let (pt_min, pt_max) = block.pt_span()?;
    let pt = jet.pt;
    if !(pt_min < pt && pt < pt_max) {
        return Ok(());
    }
    let r = jet.radius();
    let r_suffix = radius(r);
    let dz_key = format!("inclusive_jet_Dz_{experiment}{r_suffix}");
    let dpt_key = format!("inclusive_jet_Dpt_{experiment}{r_suffix}");
    out.push(&format!("{dz_key}{NJETS_SUFFIX}"), pt);

    let fragments = Fragments {
        jet,
        dz_key: &dz_key,
        dpt_key: &dpt_key,
    };
    fragments.fill(particles.iter(), "", out);
    if settings.is_aa() {
        fragments.fill(jet.holes().iter().copied(), HOLES_SUFFIX, out);
    }
    Ok(())
}

struct Fragments<'a> {
    jet: &'a SubtractedJet<'a>,
    dz_key: &'a str,
    dpt_key: &'a str,
}

impl<'a> Fragments<'a> {
    fn fill<'p>(
        &self,
        hadrons: impl Iterator<Item = &'p Particle>,
        suffix: &str,
        out: &mut EventObservables,
    ) {
        let dz_key = format!("{}{suffix}", self.dz_key);
        let dpt_key = format!("{}{suffix}", self.dpt_key);
        let axis = self.jet.jet().momentum();
        let pt = self.jet.pt;
        for hadron in hadrons {
            let delta_r = axis.delta_r(&hadron.p);
            if hadron.is_charged() && delta_r < self.jet.radius() {
                let z = hadron.pt() * delta_r.cos() / pt;
                out.push_pair(&dz_key, [pt, z]);
                out.push_pair(&dpt_key, [pt, hadron.pt()]);
            }
        }
    }
}

/// Jet charge for each configured κ
fn fill_charge(
    settings: &Settings,
    block: &ObservableBlock,
    jet: &SubtractedJet,
    particles: &[Particle],
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let r = jet.radius();
    if !settings.accepts(block)? || !block.has_jet_r(r)? {
        return Ok(());
    }
    let pt_min = *block.require(&block.pt_min, "pt_min")?;
    if !block.eta_cut()?.accepts(jet.jet().eta().abs()) || jet.pt <= pt_min {
        return Ok(());
    }
    let track_pt_min = *block.require(&block.track_pt_min, "track_pt_min")?;
    for &k in block.require(&block.kappa, "kappa")? {
        let charge = jet.charge(particles, k.value(), track_pt_min)?;
        let key = format!("inclusive_jet_charge_cms{}{}", radius(r), kappa(k));
        out.push(&key, charge.value);
        if settings.is_aa() {
            out.push(&format!("{key}{UNSUBTRACTED_SUFFIX}"), charge.unsubtracted);
        }
    }
    Ok(())
}

/// Groomed mass and momentum fraction
fn fill_groomed(
    settings: &Settings,
    jet: &SubtractedJet,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let category = settings.config.inclusive_jet.as_ref();
    let mg = block(category, "mg_cms");
    let zg = block(category, "zg_cms");
    if mg.is_none() && zg.is_none() {
        return Ok(());
    }
    let r = jet.radius();
    let pt = jet.pt;
    let abs_eta = jet.jet().eta().abs();

    // common selection shared by both observables
    let selected = |block: &ObservableBlock| -> Result<bool, AnalysisError> {
        if !settings.accepts(block)? || !block.has_jet_r(r)? {
            return Ok(false);
        }
        let (pt_min, pt_max) = block.pt_span()?;
        Ok(block.eta_cut()?.accepts(abs_eta) && pt_min < pt && pt < pt_max)
    };
    let mg = match mg {
        Some(block) => selected(block)?.then_some(block),
        None => None,
    };
    let zg = match zg {
        Some(block) => selected(block)?.then_some(block),
        None => None,
    };

    for setting in &settings.config.soft_drop {
        let mg = mg.filter(|b| b.lists_grooming(setting));
        let zg = zg.filter(|b| b.lists_grooming(setting));
        if mg.is_none() && zg.is_none() {
            continue;
        }
        let soft_drop = SoftDrop::new(setting.zcut.value(), setting.beta.value(), r);
        let Some(GroomedJet::Tagged { z, delta_r, pair }) = soft_drop.groom(jet.jet()) else {
            continue;
        };
        let suffix = format!("{}{}", radius(r), grooming(setting));
        if let Some(block) = mg {
            let min_delta_r = *block.require(&block.delta_r, "dR")?;
            if delta_r > min_delta_r {
                out.push_pair(&format!("inclusive_jet_mg_cms{suffix}"), [pt, pair.m() / pt]);
            }
        }
        if let Some(block) = zg {
            let min_delta_r = *block.require(&block.delta_r, "dR")?;
            if delta_r > min_delta_r {
                out.push_pair(&format!("inclusive_jet_zg_cms{suffix}"), [pt, z]);
            }
        }
    }
    Ok(())
}
