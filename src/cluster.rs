use std::cmp::Reverse;
use std::collections::HashMap;

use jetty::{
    anti_kt_f, cambridge_aachen_f, distance::Distance, kt_f, ClusterHistory,
    ClusterStep, PseudoJet,
};
use log::warn;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{event::Particle, four_vector::FourVector, traits::FindJets};

/// Radius for reclustering a set of particles into a single tree
const RECLUSTER_R: f64 = 1000.;

/// Jet clustering algorithms
#[derive(Deserialize, Serialize, Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}

/// Definition of a jet
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: f64,
}

impl JetDefinition {
    pub fn anti_kt(radius: f64) -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius,
        }
    }
}

/// A clustered jet together with its constituents
#[derive(Debug, Clone, PartialEq)]
pub struct Jet {
    p: FourVector,
    constituents: Vec<Particle>,
}

impl Jet {
    pub fn new(p: FourVector, constituents: Vec<Particle>) -> Self {
        Self { p, constituents }
    }

    pub fn momentum(&self) -> &FourVector {
        &self.p
    }

    pub fn constituents(&self) -> &[Particle] {
        &self.constituents
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

    pub fn rap(&self) -> f64 {
        self.p.rap()
    }

    pub fn phi(&self) -> f64 {
        self.p.phi()
    }

    pub fn m(&self) -> f64 {
        self.p.m()
    }

    /// Distance to `p` in the rapidity-azimuth plane
    pub fn delta_r(&self, p: &FourVector) -> f64 {
        self.p.delta_r(p)
    }

    /// Azimuthal distance from the jet axis to `p`
    pub fn delta_phi_to(&self, p: &FourVector) -> f64 {
        self.p.delta_phi_to(p)
    }
}

/// Jet selection by transverse momentum and rapidity
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetSelector {
    /// Minimum jet transverse momentum
    pub min_pt: f64,
    /// Maximum absolute jet rapidity
    pub max_abs_rap: f64,
}

impl JetSelector {
    pub fn accepts(&self, jet: &Jet) -> bool {
        jet.pt() > self.min_pt && jet.rap().abs() < self.max_abs_rap
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    p: FourVector,
    parents: Option<(usize, usize)>,
}

/// Recombination tree recorded from a `jetty` cluster history
///
/// The first nodes are the input particles, in the same order. Every
/// recombination step adds a new node.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTree {
    particles: Vec<Particle>,
    nodes: Vec<Node>,
    jets: Vec<usize>,
}

impl ClusterTree {
    /// Cluster into inclusive jets
    pub fn inclusive(particles: &[Particle], jet_def: &JetDefinition) -> Self {
        let r = jet_def.radius;
        match jet_def.algorithm {
            JetAlgorithm::AntiKt => Self::with_distance(particles, anti_kt_f(r)),
            JetAlgorithm::Kt => Self::with_distance(particles, kt_f(r)),
            JetAlgorithm::CambridgeAachen => {
                Self::with_distance(particles, cambridge_aachen_f(r))
            }
        }
    }

    /// Recluster all particles into a single jet
    pub fn recluster(particles: &[Particle], algorithm: JetAlgorithm) -> Self {
        Self::inclusive(
            particles,
            &JetDefinition {
                algorithm,
                radius: RECLUSTER_R,
            },
        )
    }

    fn with_distance<D: Distance>(particles: &[Particle], distance: D) -> Self {
        let partons: Vec<PseudoJet> =
            particles.iter().map(|p| PseudoJet::from(&p.p)).collect();
        let mut nodes: Vec<_> = particles
            .iter()
            .map(|p| Node {
                p: p.p,
                parents: None,
            })
            .collect();
        // pseudojets that are still part of the history; several
        // particles can share the same momentum
        let mut active: HashMap<PseudoJet, Vec<usize>> = HashMap::new();
        for (node, parton) in partons.iter().enumerate() {
            active.entry(*parton).or_default().push(node);
        }
        let mut jets = Vec::new();
        for step in ClusterHistory::new(partons, distance) {
            match step {
                ClusterStep::Combine([a, b]) => {
                    let (Some(na), Some(nb)) =
                        (take_node(&mut active, &a), take_node(&mut active, &b))
                    else {
                        warn!("Recombined unknown pseudojets {a:?} and {b:?}");
                        continue;
                    };
                    let node = nodes.len();
                    nodes.push(Node {
                        p: nodes[na].p + nodes[nb].p,
                        parents: Some((na, nb)),
                    });
                    active.entry(a + b).or_default().push(node);
                }
                ClusterStep::Jet(jet) => match take_node(&mut active, &jet) {
                    Some(node) => jets.push(node),
                    None => warn!("Found unknown jet {jet:?}"),
                },
            }
        }
        Self {
            particles: particles.to_vec(),
            nodes,
            jets,
        }
    }

    /// Nodes corresponding to the final jets
    pub fn jet_nodes(&self) -> &[usize] {
        &self.jets
    }

    /// Nodes left over when the recombination stops at `njets` pseudojets
    ///
    /// With fewer than `njets` particles, every particle is its own jet.
    pub fn exclusive_nodes(&self, njets: usize) -> Vec<usize> {
        let nparticles = self.particles.len();
        let ncombined = nparticles
            .saturating_sub(njets)
            .min(self.nodes.len() - nparticles);
        let last = nparticles + ncombined;
        let mut merged = vec![false; last];
        for node in &self.nodes[nparticles..last] {
            if let Some((a, b)) = node.parents {
                merged[a] = true;
                merged[b] = true;
            }
        }
        (0..last).filter(|&node| !merged[node]).collect()
    }

    /// Final jets, sorted by descending transverse momentum
    pub fn jets(&self) -> Vec<Jet> {
        let mut jets: Vec<_> = self
            .jets
            .iter()
            .map(|&node| Jet::new(self.nodes[node].p, self.constituents(node)))
            .collect();
        jets.sort_by_key(|jet| Reverse(n64(jet.pt2())));
        jets
    }

    pub fn momentum(&self, node: usize) -> &FourVector {
        &self.nodes[node].p
    }

    /// The two nodes that were recombined into `node`
    pub fn parents(&self, node: usize) -> Option<(usize, usize)> {
        self.nodes[node].parents
    }

    /// All input particles recombined into `node`
    pub fn constituents(&self, node: usize) -> Vec<Particle> {
        let mut constituents = Vec::new();
        let mut todo = vec![node];
        while let Some(node) = todo.pop() {
            match self.nodes[node].parents {
                Some((a, b)) => {
                    todo.push(b);
                    todo.push(a);
                }
                None => constituents.push(self.particles[node]),
            }
        }
        constituents
    }
}

fn take_node(
    active: &mut HashMap<PseudoJet, Vec<usize>>,
    p: &PseudoJet,
) -> Option<usize> {
    let nodes = active.get_mut(p)?;
    let node = nodes.pop();
    if nodes.is_empty() {
        active.remove(p);
    }
    node
}

/// Jet finding with `jetty`
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetFinder {
    pub selector: JetSelector,
}

impl JetFinder {
    pub fn new(selector: JetSelector) -> Self {
        Self { selector }
    }
}

impl FindJets for JetFinder {
    fn find_jets(&self, particles: &[Particle], jet_def: &JetDefinition) -> Vec<Jet> {
        let mut jets = ClusterTree::inclusive(particles, jet_def).jets();
        jets.retain(|jet| self.selector.accepts(jet));
        jets
    }
}
