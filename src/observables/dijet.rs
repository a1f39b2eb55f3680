use std::f64::consts::PI;

use super::{block, keys::radius, AnalysisError, Settings};
use crate::{config::CollisionEnergy, subtraction::SubtractedJet, table::EventObservables};

/// Leading and subleading jets have |Δφ| above this value
const DIJET_DPHI_MIN: f64 = 7. * PI / 8.;

/// Position of the jet with the largest subtracted pt
///
/// Ties go to the first jet. Older versions of this analysis returned
/// the index of the last jet scanned instead of the leading one.
fn leading_jet(jets: &[&SubtractedJet]) -> Option<usize> {
    let mut leading: Option<(usize, f64)> = None;
    for (i, jet) in jets.iter().enumerate() {
        match leading {
            Some((_, pt)) if jet.pt <= pt => {}
            _ => leading = Some((i, jet.pt)),
        }
    }
    leading.map(|(i, _)| i)
}

/// Dijet momentum balance x_J = pt_subleading / pt_leading
pub(crate) fn fill(
    settings: &Settings,
    jets: &[SubtractedJet],
    r: f64,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    if settings.energy != CollisionEnergy::Lhc2760 {
        return Ok(());
    }
    let Some(block) = block(settings.config.dijet.as_ref(), "xj_atlas") else {
        return Ok(());
    };
    if !settings.accepts(block)? || !block.has_jet_r(r)? {
        return Ok(());
    }
    let pt_subleading_min =
        *block.require(&block.pt_subleading_min, "pt_subleading_min")?;
    let pt_leading_min = *block.require(&block.pt_leading_min, "pt_leading_min")?;
    let eta_cut = block.eta_cut()?;

    let mut candidates: Vec<_> = jets
        .iter()
        .filter(|jet| jet.pt > pt_subleading_min && eta_cut.accepts(jet.jet().eta().abs()))
        .collect();
    let Some(i) = leading_jet(&candidates) else {
        return Ok(());
    };
    let leading = candidates.remove(i);
    let Some(i) = leading_jet(&candidates) else {
        return Ok(());
    };
    let subleading = candidates[i];

    let dphi = leading.jet().delta_phi_to(subleading.jet().momentum());
    if dphi.abs() > DIJET_DPHI_MIN && leading.pt > pt_leading_min {
        out.push(
            &format!("dijet_xj_atlas{}", radius(r)),
            subleading.pt / leading.pt,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{cluster::Jet, four_vector::FourVector};

    #[test]
    fn leading() {
        assert_eq!(leading_jet(&[]), None);

        let jets: Vec<_> = [40., 90., 90., 15.]
            .into_iter()
            .map(|pt| Jet::new(FourVector::from_pt_eta_phi(pt, 0., 0.), Vec::new()))
            .collect();
        let subtracted: Vec<_> = jets.iter().map(|jet| SubtractedJet::new(jet, &[], 0.4)).collect();
        let candidates: Vec<_> = subtracted.iter().collect();
        assert_eq!(leading_jet(&candidates), Some(1));
        assert_eq!(leading_jet(&candidates[2..]), Some(0));
    }
}
