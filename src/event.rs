use crate::four_vector::FourVector;
use crate::species::is_charged;

use particle_id::ParticleID;

/// A final-state hadron
///
/// Particles with negative status are holes: they carry the momentum
/// removed from the medium and enter observables with negative sign.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleID,
    pub status: i32,
    pub p: FourVector,
}

impl Particle {
    pub fn new(id: ParticleID, status: i32, p: FourVector) -> Self {
        Self { id, status, p }
    }

    pub fn is_hole(&self) -> bool {
        self.status < 0
    }

    pub fn is_charged(&self) -> bool {
        is_charged(self.id)
    }

    pub fn pt(&self) -> f64 {
        self.p.pt()
    }

    pub fn pt2(&self) -> f64 {
        self.p.pt2()
    }

    pub fn eta(&self) -> f64 {
        self.p.eta()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct EventBuilder {
    id: usize,
    weight: f64,
    ep_angle: f64,
    pt_hat: Option<f64>,

    particles: Vec<Particle>,
}

impl EventBuilder {
    pub fn new(id: usize) -> Self {
        Self::with_capacity(id, 0)
    }

    pub fn with_capacity(id: usize, cap: usize) -> Self {
        Self {
            id,
            weight: 1.,
            ep_angle: 0.,
            pt_hat: None,
            particles: Vec::with_capacity(cap),
        }
    }

    pub fn add_particle(&mut self, particle: Particle) -> &mut Self {
        self.particles.push(particle);
        self
    }

    pub fn weight(&mut self, weight: f64) -> &mut Self {
        self.weight = weight;
        self
    }

    pub fn ep_angle(&mut self, ep_angle: f64) -> &mut Self {
        self.ep_angle = ep_angle;
        self
    }

    pub fn pt_hat(&mut self, pt_hat: Option<f64>) -> &mut Self {
        self.pt_hat = pt_hat;
        self
    }

    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn build(self) -> Event {
        Event {
            id: self.id,
            weight: self.weight,
            ep_angle: self.ep_angle,
            pt_hat: self.pt_hat,
            particles: self.particles,
        }
    }
}

impl From<EventBuilder> for Event {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

/// A simulated collision event
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Event {
    id: usize,
    pub weight: f64,
    /// Event-plane angle
    pub ep_angle: f64,
    pub pt_hat: Option<f64>,

    particles: Vec<Particle>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// Shower and recoil particles, i.e. everything except holes
    pub fn shower(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| !p.is_hole())
    }

    pub fn holes(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_hole())
    }

    pub fn into_particles(self) -> Vec<Particle> {
        self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_selection() {
        let p = FourVector::from_pt_eta_phi(3., 0., 0.);
        let mut ev = EventBuilder::new(7);
        ev.weight(0.5)
            .add_particle(Particle::new(ParticleID::new(211), 0, p))
            .add_particle(Particle::new(ParticleID::new(111), 1, p))
            .add_particle(Particle::new(ParticleID::new(-211), -1, p));
        let ev = ev.build();
        assert_eq!(ev.id(), 7);
        assert_eq!(ev.weight, 0.5);
        assert_eq!(ev.shower().count(), 2);
        assert_eq!(ev.holes().count(), 1);
        assert_eq!(ev.shower().filter(|p| p.is_charged()).count(), 1);
        assert_eq!(ev.holes().filter(|p| p.is_charged()).count(), 1);
    }
}
