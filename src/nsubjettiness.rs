use crate::cluster::{ClusterTree, Jet, JetAlgorithm};

/// [N-subjettiness](https://arxiv.org/abs/1011.2268) with exclusive kt axes
///
/// Uses the unnormalised measure with angular exponent β = 1:
/// τ_N = Σ_i pt_i min_k ΔR(i, axis_k)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Nsubjettiness {
    n: usize,
}

impl Nsubjettiness {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn tau(&self, jet: &Jet) -> f64 {
        let constituents = jet.constituents();
        let tree = ClusterTree::recluster(constituents, JetAlgorithm::Kt);
        let axes: Vec<_> = tree
            .exclusive_nodes(self.n)
            .into_iter()
            .map(|node| *tree.momentum(node))
            .collect();
        constituents
            .iter()
            .map(|c| {
                let min_dist = axes
                    .iter()
                    .map(|axis| c.p.delta_r(axis))
                    .fold(f64::INFINITY, f64::min);
                if min_dist.is_finite() {
                    c.pt() * min_dist
                } else {
                    0.
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use particle_id::ParticleID;

    use crate::{event::Particle, four_vector::FourVector};

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
    fn two_prong() {
        let jet = jet(&[(10., 0., 0.), (10., 0., 0.2)]);
        let tau1 = Nsubjettiness::new(1).tau(&jet);
        let tau2 = Nsubjettiness::new(2).tau(&jet);
        // the single axis sits halfway between the prongs
        assert_abs_diff_eq!(tau1, 20. * 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(tau2, 0., epsilon = 1e-12);
    }

    #[test]
    fn single_particle() {
        let jet = jet(&[(10., 0.3, 1.)]);
        assert_abs_diff_eq!(Nsubjettiness::new(1).tau(&jet), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(Nsubjettiness::new(2).tau(&jet), 0., epsilon = 1e-12);
    }
}
