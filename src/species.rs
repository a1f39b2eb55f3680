use particle_id::{
    sm_elementary_particles::{electron, muon, photon},
    ParticleID,
};
use thiserror::Error;

/// Charged pion
pub const PI_PLUS: ParticleID = ParticleID::new(211);
/// Neutral pion
pub const PI_0: ParticleID = ParticleID::new(111);
/// Charged kaon
pub const K_PLUS: ParticleID = ParticleID::new(321);
/// Proton
pub const PROTON: ParticleID = ParticleID::new(2212);
pub const NEUTRON: ParticleID = ParticleID::new(2112);
pub const SIGMA_PLUS: ParticleID = ParticleID::new(3222);
pub const SIGMA_MINUS: ParticleID = ParticleID::new(3112);
pub const XI_MINUS: ParticleID = ParticleID::new(3312);
pub const OMEGA_MINUS: ParticleID = ParticleID::new(3334);

/// Charged species in the final state, particles only
pub const CHARGED_SPECIES: [ParticleID; 9] = [
    electron,
    muon,
    PI_PLUS,
    K_PLUS,
    PROTON,
    SIGMA_PLUS,
    SIGMA_MINUS,
    XI_MINUS,
    OMEGA_MINUS,
];

/// Charged species whose particle (positive id) has charge -1
const NEGATIVE_SPECIES: [ParticleID; 5] =
    [electron, muon, SIGMA_MINUS, XI_MINUS, OMEGA_MINUS];

/// Neutral species with a known charge
const NEUTRAL_SPECIES: [ParticleID; 3] = [photon, PI_0, NEUTRON];

/// Whether the particle belongs to one of the [CHARGED_SPECIES]
pub fn is_charged(id: ParticleID) -> bool {
    CHARGED_SPECIES.contains(&id.abs())
}

/// Electric charge in units of the positron charge
///
/// Only the charged species and photons, neutral pions and neutrons
/// are known. Any other id is an error.
pub fn charge(id: ParticleID) -> Result<f64, SpeciesError> {
    if is_charged(id) {
        let particle_charge = if NEGATIVE_SPECIES.contains(&id.abs()) {
            -1.
        } else {
            1.
        };
        Ok(if id.id() < 0 {
            -particle_charge
        } else {
            particle_charge
        })
    } else if NEUTRAL_SPECIES.contains(&id) {
        Ok(0.)
    } else {
        Err(SpeciesError::UnknownCharge(id.id()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum SpeciesError {
    #[error("Failed to compute charge of particle with id {0}")]
    UnknownCharge(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges() {
        for id in CHARGED_SPECIES {
            let anti = ParticleID::new(-id.id());
            let q = charge(id).unwrap();
            assert_eq!(q.abs(), 1.);
            assert_eq!(charge(anti).unwrap(), -q);
            // idempotent
            assert_eq!(charge(id).unwrap(), q);
            assert!(is_charged(id));
            assert!(is_charged(anti));
        }
        assert_eq!(charge(PI_PLUS).unwrap(), 1.);
        assert_eq!(charge(ParticleID::new(-211)).unwrap(), -1.);
        assert_eq!(charge(ParticleID::new(11)).unwrap(), -1.);
        assert_eq!(charge(ParticleID::new(-11)).unwrap(), 1.);
        assert_eq!(charge(ParticleID::new(3112)).unwrap(), -1.);
        assert_eq!(charge(ParticleID::new(-3222)).unwrap(), -1.);
        for id in NEUTRAL_SPECIES {
            assert_eq!(charge(id).unwrap(), 0.);
            assert!(!is_charged(id));
        }
    }

    #[test]
    fn unknown_species() {
        for pid in [130, 310, -2112, 3122, 421] {
            let id = ParticleID::new(pid);
            assert!(matches!(
                charge(id),
                Err(SpeciesError::UnknownCharge(p)) if p == pid
            ));
        }
    }
}
