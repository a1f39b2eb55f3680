//! Single-hadron spectra
use super::{AnalysisError, Settings};
use crate::{
    config::CollisionEnergy::{self, *},
    event::Particle,
    species::{is_charged, K_PLUS, PI_0, PI_PLUS, PROTON},
    table::EventObservables,
};

use particle_id::ParticleID;

/// Open upper transverse momentum bound for RHIC spectra
const RHIC_PT_MAX: f64 = 100.;

#[derive(Debug, Copy, Clone)]
enum Species {
    Charged,
    /// Any of the given species or their antiparticles
    OneOf(&'static [ParticleID]),
}

impl Species {
    fn contains(&self, id: ParticleID) -> bool {
        match self {
            Self::Charged => is_charged(id),
            Self::OneOf(ids) => ids.contains(&id.abs()),
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct HadronSpectrum {
    name: &'static str,
    energies: &'static [CollisionEnergy],
    species: Species,
    /// Whether the upper pt bound is taken from the configuration
    bounded: bool,
}

const SPECTRA: [HadronSpectrum; 7] = [
    HadronSpectrum {
        name: "pt_ch_alice",
        energies: &[Lhc2760, Lhc5020],
        species: Species::Charged,
        bounded: true,
    },
    HadronSpectrum {
        name: "pt_pi_alice",
        energies: &[Lhc2760, Lhc5020],
        species: Species::OneOf(&[PI_PLUS]),
        bounded: true,
    },
    HadronSpectrum {
        name: "pt_pi0_alice",
        energies: &[Lhc2760],
        species: Species::OneOf(&[PI_0]),
        bounded: true,
    },
    HadronSpectrum {
        name: "pt_ch_atlas",
        energies: &[Lhc2760],
        species: Species::Charged,
        bounded: true,
    },
    HadronSpectrum {
        name: "pt_ch_cms",
        energies: &[Lhc2760, Lhc5020],
        species: Species::Charged,
        bounded: true,
    },
    HadronSpectrum {
        name: "pt_pi0_phenix",
        energies: &[Rhic200],
        species: Species::OneOf(&[PI_0]),
        bounded: false,
    },
    HadronSpectrum {
        name: "pt_ch_star",
        energies: &[Rhic200],
        species: Species::OneOf(&[PI_PLUS, K_PLUS, PROTON]),
        bounded: false,
    },
];

/// Fill hadron spectra from `particles`
///
/// `suffix` is appended to each key, so that holes can be recorded
/// separately.
pub(crate) fn fill(
    settings: &Settings,
    particles: &[Particle],
    suffix: &str,
    out: &mut EventObservables,
) -> Result<(), AnalysisError> {
    for spectrum in &SPECTRA {
        if !spectrum.energies.contains(&settings.energy) {
            continue;
        }
        let Some(block) = settings.config.hadron.get(spectrum.name) else {
            continue;
        };
        if !settings.accepts(block)? {
            continue;
        }
        let (pt_min, pt_max) = if spectrum.bounded {
            block.pt_bounds()?
        } else {
            (block.pt_lower()?, RHIC_PT_MAX)
        };
        let eta_cut = block.eta_cut()?;
        let key = format!("hadron_{}{suffix}", spectrum.name);
        for particle in particles {
            let pt = particle.pt();
            if pt_min < pt
                && pt < pt_max
                && eta_cut.accepts(particle.eta().abs())
                && spectrum.species.contains(particle.id)
            {
                out.push(&key, pt);
            }
        }
    }
    Ok(())
}
