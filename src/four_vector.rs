use std::f64::consts::PI;

use jetty::PseudoJet;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// Rapidity assigned to momenta without transverse component
const MAX_RAP: f64 = 1e5;

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy, Default)]
pub struct FourVector {
    p: [f64; 4],
}

impl FourVector {
    /// Construct a new four-vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from Cartesian components
    pub fn from_e_px_py_pz(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { p: [e, px, py, pz] }
    }

    /// Construct a massless momentum from transverse momentum,
    /// pseudorapidity, and azimuthal angle
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        let pz = pt * eta.sinh();
        Self::from_e_px_py_pz(pt * eta.cosh(), pt * phi.cos(), pt * phi.sin(), pz)
    }

    pub fn e(&self) -> f64 {
        self.p[0]
    }

    pub fn px(&self) -> f64 {
        self.p[1]
    }

    pub fn py(&self) -> f64 {
        self.p[2]
    }

    pub fn pz(&self) -> f64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> f64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> f64 {
        self.p.iter().skip(1).map(|e| e * e).sum()
    }

    /// The square of the scalar transverse momentum
    pub fn pt2(&self) -> f64 {
        self.px() * self.px() + self.py() * self.py()
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> f64 {
        self.e() * self.e() - self.spatial_norm_sq()
    }

    /// The invariant mass
    ///
    /// Negative for space-like vectors, `-\sqrt{-m^2}`
    pub fn m(&self) -> f64 {
        let m_sq = self.m_sq();
        if m_sq < 0. {
            -(-m_sq).sqrt()
        } else {
            m_sq.sqrt()
        }
    }

    /// Azimuthal angle in [0, 2π)
    pub fn phi(&self) -> f64 {
        if self.pt2() == 0. {
            return 0.;
        }
        let phi = self.py().atan2(self.px());
        if phi < 0. {
            phi + 2. * PI
        } else {
            phi
        }
    }

    /// Rapidity
    pub fn rap(&self) -> f64 {
        let pt2 = self.pt2();
        if pt2 == 0. && self.e() == self.pz().abs() {
            return MAX_RAP.copysign(self.pz());
        }
        let m_sq = self.m_sq().max(0.);
        let e_plus_pz = self.e() + self.pz().abs();
        let rap = 0.5 * ((pt2 + m_sq) / (e_plus_pz * e_plus_pz)).ln();
        if self.pz() > 0. {
            -rap
        } else {
            rap
        }
    }

    /// Pseudorapidity
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0. {
            return MAX_RAP.copysign(self.pz());
        }
        (self.pz() / pt).asinh()
    }

    /// Azimuthal distance `other.phi() - self.phi()`, mapped to (-π, π]
    pub fn delta_phi_to(&self, other: &FourVector) -> f64 {
        let mut dphi = other.phi() - self.phi();
        if dphi > PI {
            dphi -= 2. * PI;
        }
        if dphi <= -PI {
            dphi += 2. * PI;
        }
        dphi
    }

    /// Squared distance in the rapidity-azimuth plane
    pub fn delta_r_sq(&self, other: &FourVector) -> f64 {
        let drap = self.rap() - other.rap();
        let dphi = self.delta_phi_to(other);
        drap * drap + dphi * dphi
    }

    /// Distance in the rapidity-azimuth plane
    pub fn delta_r(&self, other: &FourVector) -> f64 {
        self.delta_r_sq(other).sqrt()
    }

    const fn len() -> usize {
        4
    }
}

impl std::convert::From<[f64; 4]> for FourVector {
    fn from(p: [f64; 4]) -> FourVector {
        FourVector { p }
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = f64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
    }
}

impl std::ops::SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] -= rhs[i]
        }
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourVector {
    type Output = Self;

    fn sub(mut self, rhs: FourVector) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = FourVector>>(iter: I) -> Self {
        iter.fold(FourVector::new(), std::ops::Add::add)
    }
}

impl From<PseudoJet> for FourVector {
    fn from(p: PseudoJet) -> Self {
        [p.e(), p.px(), p.py(), p.pz()].map(f64::from).into()
    }
}

impl From<FourVector> for PseudoJet {
    fn from(p: FourVector) -> Self {
        (&p).into()
    }
}

impl From<&FourVector> for PseudoJet {
    fn from(p: &FourVector) -> Self {
        [n64(p[0]), n64(p[1]), n64(p[2]), n64(p[3])].into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn azimuth() {
        let p = FourVector::from_e_px_py_pz(1., 0., -1., 0.);
        assert_abs_diff_eq!(p.phi(), 1.5 * PI, epsilon = 1e-12);

        let q = FourVector::from_e_px_py_pz(1., 1., 0.01, 0.);
        let dphi = p.delta_phi_to(&q);
        assert!(dphi > 0. && dphi < PI);
        assert_abs_diff_eq!(dphi, 0.5 * PI + 0.01f64.atan(), epsilon = 1e-12);
        assert_abs_diff_eq!(q.delta_phi_to(&p), -dphi, epsilon = 1e-12);
    }

    #[test]
    fn rapidities() {
        let p = FourVector::from_pt_eta_phi(10., 1.3, 0.4);
        assert_abs_diff_eq!(p.eta(), 1.3, epsilon = 1e-12);
        // massless, so rapidity and pseudorapidity agree
        assert_abs_diff_eq!(p.rap(), 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(p.pt(), 10., epsilon = 1e-12);

        let beam = FourVector::from_e_px_py_pz(5., 0., 0., -5.);
        assert_eq!(beam.rap(), -MAX_RAP);
    }

    #[test]
    fn mass() {
        let p = FourVector::from_pt_eta_phi(10., 0.5, 0.);
        let q = FourVector::from_pt_eta_phi(10., -0.5, 0.);
        assert_abs_diff_eq!(p.m(), 0., epsilon = 1e-6);
        // m^2 = 2 pt^2 (cosh(Δη) - 1) for massless momenta at equal φ
        let expected = (2. * 100. * (1f64.cosh() - 1.)).sqrt();
        assert_abs_diff_eq!((p + q).m(), expected, epsilon = 1e-9);

        let spacelike = FourVector::from_e_px_py_pz(1., 2., 0., 0.);
        assert_abs_diff_eq!(spacelike.m(), -(3f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn pseudojet_interop() {
        let p = FourVector::from_pt_eta_phi(25., -0.7, 2.1);
        let pj = PseudoJet::from(p);
        let back = FourVector::from(pj);
        for i in 0..4 {
            assert_abs_diff_eq!(back[i], p[i], epsilon = 1e-12);
        }
    }
}
