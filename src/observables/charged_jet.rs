//! Inclusive charged jet observables
use super::{
    full_jet::has_leading_track,
    keys::{grooming, is_excluded, radius, UNSUBTRACTED_SUFFIX},
    AnalysisError, Settings,
};
use crate::{
    config::{CollisionEnergy, ObservableBlock},
    groom::{GroomedJet, SoftDrop},
    subtraction::{SubtractedJet, Subtracted},
    table::EventObservables,
    traits::Groom,
};

/// Minimum pt of the leading track for STAR jets
const STAR_LEADING_TRACK_MIN_PT: f64 = 5.;
/// Open upper jet pt bound for STAR jets
const STAR_PT_MAX: f64 = 100.;

pub(crate) fn fill(
    settings: &Settings,
    jet: &SubtractedJet,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    match settings.energy {
        CollisionEnergy::Lhc2760 => fill_2760(settings, jet, out),
        CollisionEnergy::Lhc5020 => fill_groomed(settings, jet, out),
        CollisionEnergy::Rhic200 => fill_200(settings, jet, out),
        CollisionEnergy::Other(_) => Ok(()),
    }
}

/// Whether `|η| < eta_cut_R - R`
fn in_fiducial_volume(block: &ObservableBlock, jet: &SubtractedJet) -> Result<bool, AnalysisError> {
    let eta_cut_r = *block.require(&block.eta_cut_r, "eta_cut_R")?;
    Ok(jet.jet().eta().abs() < eta_cut_r - jet.radius())
}

/// Common selection for substructure observables
fn substructure_selected(
    settings: &Settings,
    block: &ObservableBlock,
    jet: &SubtractedJet,
    (pt_min, pt_max): (f64, f64),
) -> Result<bool, AnalysisError> {
    Ok(settings.accepts(block)?
        && in_fiducial_volume(block, jet)?
        && block.has_jet_r(jet.radius())?
        && pt_min < jet.pt
        && jet.pt < pt_max)
}

fn push_subtracted(settings: &Settings, key: &str, value: Subtracted, out: &mut EventObservables) {
    out.push(key, value.value);
    if settings.is_aa() {
        out.push(&format!("{key}{UNSUBTRACTED_SUFFIX}"), value.unsubtracted);
    }
}

fn fill_2760(
    settings: &Settings,
    jet: &SubtractedJet,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let category = &settings.config.inclusive_chjet;
    let r = jet.radius();
    let r_suffix = radius(r);
    let pt = jet.pt;

    if let Some(block) = category.get("pt_alice") {
        if settings.accepts(block)? && block.has_jet_r(r)? {
            let (pt_min, pt_max) = block.pt_bounds()?;
            let leading_track_min_pt =
                *block.require(&block.leading_track_min_pt, "leading_track_min_pt")?;
            if block.eta_cut()?.accepts(jet.jet().eta().abs())
                && pt_min < pt
                && pt < pt_max
                && has_leading_track(jet, leading_track_min_pt)
            {
                let pt = Subtracted {
                    value: pt,
                    unsubtracted: jet.pt_unsubtracted,
                };
                push_subtracted(settings, &format!("inclusive_chjet_pt_alice{r_suffix}"), pt, out);
            }
        }
    }

    if let Some(block) = category.get("g_alice") {
        if substructure_selected(settings, block, jet, block.pt_bounds()?)? {
            let key = format!("inclusive_chjet_g_alice{r_suffix}");
            push_subtracted(settings, &key, jet.angularity(), out);
        }
    }

    if let Some(block) = category.get("ptd_alice") {
        if substructure_selected(settings, block, jet, block.pt_bounds()?)? {
            let key = format!("inclusive_chjet_ptd_alice{r_suffix}");
            push_subtracted(settings, &key, jet.pt_dispersion(), out);
        }
    }

    if let Some(block) = category.get("mass_alice") {
        if substructure_selected(settings, block, jet, block.pt_span()?)? {
            let key = format!("inclusive_chjet_mass_alice{r_suffix}");
            let mass = jet.mass();
            out.push_pair(&key, [pt, mass.value]);
            if settings.is_aa() {
                out.push_pair(&format!("{key}{UNSUBTRACTED_SUFFIX}"), [pt, mass.unsubtracted]);
            }
        }
    }
    Ok(())
}

fn fill_200(
    settings: &Settings,
    jet: &SubtractedJet,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let Some(block) = settings.config.inclusive_chjet.get("pt_star") else {
        return Ok(());
    };
    let pt_range = (block.pt_lower()?, STAR_PT_MAX);
    if substructure_selected(settings, block, jet, pt_range)?
        && has_leading_track(jet, STAR_LEADING_TRACK_MIN_PT)
    {
        let pt = Subtracted {
            value: jet.pt,
            unsubtracted: jet.pt_unsubtracted,
        };
        let key = format!("inclusive_chjet_pt_star{}", radius(jet.radius()));
        push_subtracted(settings, &key, pt, out);
    }
    Ok(())
}

/// Groomed momentum fraction z_g and angle θ_g = ΔR/R
fn fill_groomed(
    settings: &Settings,
    jet: &SubtractedJet,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    let Some(block) = settings.config.inclusive_chjet.get("zg_alice") else {
        return Ok(());
    };
    if !substructure_selected(settings, block, jet, block.pt_bounds()?)? {
        return Ok(());
    }
    let r = jet.radius();
    for setting in &settings.config.soft_drop {
        if !block.lists_grooming(setting) {
            continue;
        }
        let soft_drop = SoftDrop::new(setting.zcut.value(), setting.beta.value(), r);
        let Some(GroomedJet::Tagged { z, delta_r, .. }) = soft_drop.groom(jet.jet()) else {
            continue;
        };
        let suffix = format!("{}{}", radius(r), grooming(setting));
        out.push(&format!("inclusive_chjet_zg_alice{suffix}"), z);
        if !is_excluded("tg_alice", r, setting) {
            out.push(&format!("inclusive_chjet_tg_alice{suffix}"), delta_r / r);
        }
    }
    Ok(())
}
