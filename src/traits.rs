use crate::{
    cluster::{Jet, JetDefinition},
    event::Particle,
    groom::GroomedJet,
    reader::CrossSection,
};

pub trait Rewind {
    type Error;

    fn rewind(&mut self) -> Result<(), Self::Error>;
}

/// Event sources that can be counted before the event loop
pub trait CountEvents {
    type Error;

    /// Count the remaining events, then rewind to the first event
    fn count_events(&mut self) -> Result<usize, Self::Error>;
}

/// Event sources that report a generator cross section
pub trait CrossSectionInfo {
    /// The cross section, if known
    fn cross_section(&self) -> Option<CrossSection>;
}

/// Progress indicator
pub trait Progress {
    /// Advance progress by the given amount
    fn inc(&self, i: u64);

    /// Signal that progress is finished
    fn finish(&self);
}

/// Jet finding
pub trait FindJets {
    /// Cluster `particles` into jets
    ///
    /// The jets are sorted by descending transverse momentum.
    fn find_jets(&self, particles: &[Particle], jet_def: &JetDefinition) -> Vec<Jet>;
}

/// Jet grooming
pub trait Groom {
    /// Groom a jet
    ///
    /// Returns `None` if the jet has no splitting at all
    fn groom(&self, jet: &Jet) -> Option<GroomedJet>;
}
