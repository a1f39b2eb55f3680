//! Hole subtraction
//!
//! In heavy-ion events, holes represent momentum removed from the
//! medium. They are not clustered into jets; instead all holes within
//! the jet radius are subtracted from the jet observables afterwards.
use crate::{
    cluster::Jet,
    event::Particle,
    four_vector::FourVector,
    species::{charge, SpeciesError},
};

/// An observable value with and without hole subtraction
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Subtracted {
    pub value: f64,
    pub unsubtracted: f64,
}

/// A jet together with the holes inside its cone
#[derive(Debug, Clone)]
pub struct SubtractedJet<'a> {
    jet: &'a Jet,
    radius: f64,
    holes: Vec<&'a Particle>,
    /// Transverse momentum after subtracting the holes
    pub pt: f64,
    /// Transverse momentum of shower and recoil particles
    pub pt_unsubtracted: f64,
}

/// Holes with ΔR(jet, hole) < `radius`
pub fn holes_in_cone<'a>(
    axis: &FourVector,
    holes: &'a [Particle],
    radius: f64,
) -> Vec<&'a Particle> {
    holes
        .iter()
        .filter(|hole| axis.delta_r(&hole.p) < radius)
        .collect()
}

impl<'a> SubtractedJet<'a> {
    pub fn new(jet: &'a Jet, holes: &'a [Particle], radius: f64) -> Self {
        let holes = holes_in_cone(jet.momentum(), holes, radius);
        let pt_unsubtracted = jet.pt();
        let pt = pt_unsubtracted - holes.iter().map(|h| h.pt()).sum::<f64>();
        Self {
            jet,
            radius,
            holes,
            pt,
            pt_unsubtracted,
        }
    }

    pub fn jet(&self) -> &'a Jet {
        self.jet
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn holes(&self) -> &[&'a Particle] {
        &self.holes
    }

    /// Jet angularity Σ pt/pt_jet ΔR
    ///
    /// Both values are normalised to the subtracted jet pt.
    pub fn angularity(&self) -> Subtracted {
        let axis = self.jet.momentum();
        let term = |p: &Particle| p.pt() / self.pt * p.p.delta_r(axis);
        let unsubtracted: f64 = self.jet.constituents().iter().map(term).sum();
        let holes: f64 = self.holes.iter().map(|h| term(*h)).sum();
        Subtracted {
            value: unsubtracted - holes,
            unsubtracted,
        }
    }

    /// Momentum dispersion √(Σ pt²)/pt_jet
    pub fn pt_dispersion(&self) -> Subtracted {
        let sum: f64 = self.jet.constituents().iter().map(|c| c.pt2()).sum();
        let holes: f64 = self.holes.iter().map(|h| h.pt2()).sum();
        Subtracted {
            value: (sum - holes).sqrt() / self.pt,
            unsubtracted: sum.sqrt() / self.pt,
        }
    }

    /// Jet mass minus the mass of the summed hole momenta
    pub fn mass(&self) -> Subtracted {
        let unsubtracted = self.jet.m();
        let holes: FourVector = self.holes.iter().map(|h| h.p).sum();
        Subtracted {
            value: unsubtracted - holes.m(),
            unsubtracted,
        }
    }

    /// Jet charge Σ q pt^κ / pt_jet^κ
    ///
    /// Sums over the charged `particles` inside the jet cone with
    /// transverse momentum above `track_pt_min`.
    pub fn charge(
        &self,
        particles: &[Particle],
        kappa: f64,
        track_pt_min: f64,
    ) -> Result<Subtracted, SpeciesError> {
        let axis = self.jet.momentum();
        let in_cone = |p: &&Particle| {
            p.pt() > track_pt_min
                && p.is_charged()
                && p.p.delta_r(axis) < self.radius
        };
        let weighted_charge = |p: &Particle| -> Result<f64, SpeciesError> {
            Ok(charge(p.id)? * p.pt().powf(kappa))
        };
        let mut sum = 0.;
        for p in particles.iter().filter(in_cone) {
            sum += weighted_charge(p)?;
        }
        let mut sum_holes = 0.;
        for h in self.holes.iter().copied().filter(in_cone) {
            sum_holes += weighted_charge(h)?;
        }
        let norm = self.pt.powf(kappa);
        Ok(Subtracted {
            value: (sum - sum_holes) / norm,
            unsubtracted: sum / norm,
        })
    }
}
