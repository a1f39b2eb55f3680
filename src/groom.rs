use serde::{Deserialize, Serialize};

use crate::{
    cluster::{ClusterTree, Jet, JetAlgorithm},
    four_vector::FourVector,
    traits::Groom,
};

/// Outcome of grooming a jet with at least one splitting
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GroomedJet {
    /// A splitting passed the grooming condition
    Tagged {
        /// Momentum fraction of the softer branch
        z: f64,
        /// Opening angle between the branches
        delta_r: f64,
        /// Sum of both branches
        pair: FourVector,
    },
    /// No splitting passed the grooming condition
    Untagged,
}

/// [Soft Drop](https://arxiv.org/abs/1402.2657) grooming
///
/// The jet constituents are reclustered with the Cambridge/Aachen
/// algorithm. Starting from the full jet, the softer branch is dropped
/// until a splitting satisfies `z > zcut (ΔR/R0)^β`.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct SoftDrop {
    pub zcut: f64,
    pub beta: f64,
    /// Jet radius used to normalise the opening angle
    pub r0: f64,
}

impl SoftDrop {
    pub fn new(zcut: f64, beta: f64, r0: f64) -> Self {
        Self { zcut, beta, r0 }
    }

    fn passes(&self, z: f64, delta_r: f64) -> bool {
        z > self.zcut * (delta_r / self.r0).powf(self.beta)
    }
}

impl Groom for SoftDrop {
    fn groom(&self, jet: &Jet) -> Option<GroomedJet> {
        let constituents = jet.constituents();
        if constituents.len() < 2 {
            return None;
        }
        let tree = ClusterTree::recluster(constituents, JetAlgorithm::CambridgeAachen);
        let mut node = *tree.jet_nodes().first()?;
        while let Some((a, b)) = tree.parents(node) {
            let (pa, pb) = (tree.momentum(a), tree.momentum(b));
            let (pt_a, pt_b) = (pa.pt(), pb.pt());
            let z = pt_a.min(pt_b) / (pt_a + pt_b);
            let delta_r = pa.delta_r(pb);
            if self.passes(z, delta_r) {
                return Some(GroomedJet::Tagged {
                    z,
                    delta_r,
                    pair: *tree.momentum(node),
                });
            }
            node = if pt_a >= pt_b { a } else { b };
        }
        Some(GroomedJet::Untagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use particle_id::ParticleID;

    use crate::event::Particle;

    fn jet(parts: &[(f64, f64, f64)]) -> Jet {
        let constituents: Vec<_> = parts
            .iter()
            .map(|&(pt, eta, phi)| {
                Particle::new(
                    ParticleID::new(211),
                    0,
                    FourVector::from_pt_eta_phi(pt, eta, phi),
                )
            })
            .collect();
        let p = constituents.iter().map(|p| p.p).sum();
        Jet::new(p, constituents)
    }

    #[test]
    fn single_constituent() {
        let jet = jet(&[(10., 0., 0.)]);
        assert_eq!(SoftDrop::new(0.1, 0., 0.4).groom(&jet), None);
    }

    #[test]
    fn tagged() {
        // a soft wide-angle emission around a hard two-prong core
        let jet = jet(&[(40., 0., 0.), (30., 0.1, 0.), (1., 0., 0.35)]);
        let groomed = SoftDrop::new(0.1, 0., 0.4).groom(&jet).unwrap();
        let GroomedJet::Tagged { z, delta_r, pair } = groomed else {
            panic!("jet should be tagged")
        };
        assert_abs_diff_eq!(z, 30. / 70., epsilon = 1e-6);
        assert_abs_diff_eq!(delta_r, 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(pair.pt(), 70., epsilon = 1e-2);
    }

    #[test]
    fn untagged() {
        let jet = jet(&[(100., 0., 0.), (1., 0.1, 0.), (1., 0., 0.3)]);
        assert_eq!(
            SoftDrop::new(0.1, 0., 0.4).groom(&jet),
            Some(GroomedJet::Untagged)
        );
    }
}
