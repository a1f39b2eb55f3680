//! Observable catalogue
//!
//! [Analysis] computes all configured observables for one event at a
//! time. Jets are clustered separately from all final-state particles
//! ("full jets") and from the charged ones ("charged jets") for each
//! configured radius. In heavy-ion runs, holes inside the jet cone are
//! subtracted afterwards, see [subtraction](crate::subtraction).
mod charged_jet;
mod dijet;
mod full_jet;
mod hadron;
pub(crate) mod keys;
mod semi_inclusive;

pub use keys::HOLES_SUFFIX;

use log::{debug, warn};
use thiserror::Error;

use crate::{
    centrality::{centrality_accepted, Centrality},
    cluster::{JetDefinition, JetFinder, JetSelector},
    config::{AnalysisConfig, Category, CollisionEnergy, MissingField, ObservableBlock},
    event::{Event, Particle},
    species::SpeciesError,
    subtraction::SubtractedJet,
    table::EventObservables,
    traits::FindJets,
};

/// Run-wide analysis settings
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    config: AnalysisConfig,
    centrality: Option<Centrality>,
    energy: CollisionEnergy,
}

impl Settings {
    /// Heavy-ion runs are the ones with a centrality class
    pub(crate) fn is_aa(&self) -> bool {
        self.centrality.is_some()
    }

    /// Whether the observable is measured in the centrality class of the run
    pub(crate) fn accepts(&self, block: &ObservableBlock) -> Result<bool, MissingField> {
        Ok(centrality_accepted(self.centrality.as_ref(), block.centrality()?))
    }
}

/// Look up an observable in an optional category
pub(crate) fn block<'a>(
    category: Option<&'a Category>,
    name: &str,
) -> Option<&'a ObservableBlock> {
    category.and_then(|c| c.get(name))
}

/// Event analysis
pub struct Analysis<J = JetFinder> {
    settings: Settings,
    jet_finder: J,
    observables: EventObservables,
}

impl Analysis<JetFinder> {
    /// Analysis with the built-in jet clustering
    ///
    /// Runs without a `centrality` are proton-proton runs.
    pub fn new(
        config: AnalysisConfig,
        centrality: Option<Centrality>,
    ) -> Result<Self, AnalysisError> {
        let selector = JetSelector {
            min_pt: config.min_jet_pt,
            max_abs_rap: config.max_jet_y,
        };
        Self::with_jet_finder(config, centrality, JetFinder::new(selector))
    }
}

impl<J: FindJets> Analysis<J> {
    /// Analysis with a custom jet finder
    ///
    /// The jet finder is responsible for applying the jet selection.
    pub fn with_jet_finder(
        config: AnalysisConfig,
        centrality: Option<Centrality>,
        jet_finder: J,
    ) -> Result<Self, AnalysisError> {
        let energy = config.energy();
        if let CollisionEnergy::Other(sqrt_s) = energy {
            warn!("No observables defined for √s = {sqrt_s} GeV");
        }
        let settings = Settings {
            config,
            centrality,
            energy,
        };
        let observables = keys::declare(&settings)?;
        debug!("Declared {} observables", observables.len());
        Ok(Self {
            settings,
            jet_finder,
            observables,
        })
    }

    pub fn is_aa(&self) -> bool {
        self.settings.is_aa()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.settings.config
    }

    /// Observables of the last analysed event
    pub fn observables(&self) -> &EventObservables {
        &self.observables
    }

    /// Compute all observables for `event`
    pub fn analyze_event(
        &mut self,
        event: &Event,
    ) -> Result<&EventObservables, AnalysisError> {
        let settings = &self.settings;
        let out = &mut self.observables;
        out.clear();

        let positive: Vec<Particle> = event.shower().copied().collect();
        let holes: Vec<Particle> = if settings.is_aa() {
            event.holes().copied().collect()
        } else {
            Vec::new()
        };
        let charged: Vec<Particle> =
            positive.iter().filter(|p| p.is_charged()).copied().collect();
        let charged_holes: Vec<Particle> =
            holes.iter().filter(|p| p.is_charged()).copied().collect();

        hadron::fill(settings, &positive, "", out)?;
        if settings.is_aa() {
            hadron::fill(settings, &holes, HOLES_SUFFIX, out)?;
        }
        // there are no hadron correlation observables to fill

        for &r in &settings.config.jet_r {
            let jet_def = JetDefinition::anti_kt(r);

            let jets = self.jet_finder.find_jets(&positive, &jet_def);
            let jets: Vec<_> = jets
                .iter()
                .map(|jet| SubtractedJet::new(jet, &holes, r))
                .collect();
            for jet in &jets {
                full_jet::fill(settings, jet, &positive, out)?;
            }

            let charged_jets = self.jet_finder.find_jets(&charged, &jet_def);
            let charged_jets: Vec<_> = charged_jets
                .iter()
                .map(|jet| SubtractedJet::new(jet, &charged_holes, r))
                .collect();
            for jet in &charged_jets {
                charged_jet::fill(settings, jet, out)?;
            }

            semi_inclusive::fill(settings, &charged_jets, &charged, r, out)?;
            dijet::fill(settings, &jets, r, out)?;
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error(transparent)]
    Species(#[from] SpeciesError),
}

#[cfg(test)]
mod tests;
