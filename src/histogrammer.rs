//! Histogramming of observable tables
//!
//! [Histogrammer] reads the per-event values written by the analysis and
//! fills them into weighted histograms, using the binning from the
//! configuration.
use itertools::iproduct;
use log::{debug, info, warn};

use crate::{
    config::{AnalysisConfig, Category, CollisionEnergy, ObservableBlock},
    histogram::{log_edges, Histogram, HistogramError},
    observables::keys::{grooming, is_excluded, kappa, radius, HOLES_SUFFIX, NJETS_SUFFIX},
    table::{CrossSectionTable, ObservableFile, Values},
};

/// Number of edges for the event weight histogram
const N_WEIGHT_EDGES: usize = 10000;
/// Number of edges for the pt-hat histograms
const N_PT_HAT_EDGES: usize = 100;

fn centrality_label([min, max]: [f64; 2]) -> String {
    format!("[{min}, {max}]")
}

/// Transverse momentum bin of a jet observable
#[derive(Debug, Copy, Clone, PartialEq)]
struct PtBin {
    min: f64,
    max: f64,
    /// Name suffix, empty if there is only one bin
    suffix_index: Option<usize>,
}

impl PtBin {
    fn suffix(&self) -> String {
        self.suffix_index
            .map(|i| format!("_pt{i}"))
            .unwrap_or_default()
    }
}

/// Fills histograms from an observable table
pub struct Histogrammer<'a> {
    config: &'a AnalysisConfig,
    observables: &'a ObservableFile,
    histograms: Vec<Histogram>,
}

impl<'a> Histogrammer<'a> {
    pub fn new(config: &'a AnalysisConfig, observables: &'a ObservableFile) -> Self {
        Self {
            config,
            observables,
            histograms: Vec::new(),
        }
    }

    /// Histogram all configured observables
    pub fn run(
        mut self,
        xs: &CrossSectionTable,
    ) -> Result<Vec<Histogram>, HistogramError> {
        self.histogram_event_qa(xs)?;
        self.histogram_hadrons()?;
        self.histogram_hadron_correlations()?;
        let config = self.config;
        self.histogram_jets("inclusive_chjet", &config.inclusive_chjet)?;
        if let Some(category) = &config.inclusive_jet {
            self.histogram_jets("inclusive_jet", category)?;
        }
        if let Some(category) = &config.semi_inclusive_chjet {
            self.histogram_semi_inclusive(category)?;
        }
        if let Some(category) = &config.dijet {
            self.histogram_jets("dijet", category)?;
        }
        info!("Filled {} histograms", self.histograms.len());
        Ok(self.histograms)
    }

    fn histogram_event_qa(&mut self, xs: &CrossSectionTable) -> Result<(), HistogramError> {
        let weights = self.observables.weights();
        let sum_weights: f64 = weights.iter().sum();
        info!(
            "Cross section: {} ± {}, sum of weights: {sum_weights}",
            xs.cross_section.value, xs.cross_section.error
        );
        let single = [
            ("h_n_events_generated", xs.n_events as f64),
            ("h_xsec", xs.cross_section.value),
            ("h_xsec_error", xs.cross_section.error),
        ];
        for (name, value) in single {
            self.histograms.push(Histogram::single_bin(name.to_owned(), value));
        }

        let AnalysisConfig {
            sqrt_s,
            power,
            pt_ref,
            ..
        } = *self.config;
        let edges = log_edges(
            (pt_ref / (sqrt_s / 2.)).powf(power),
            (pt_ref / 2.).powf(power),
            N_WEIGHT_EDGES,
        );
        let mut h = Histogram::new("h_weights".to_owned(), edges)?;
        for &weight in weights {
            h.fill(weight, 1.);
        }
        self.histograms.push(h);
        self.histograms
            .push(Histogram::single_bin("h_weight_sum".to_owned(), sum_weights));

        let edges = log_edges(1., sqrt_s / 2., N_PT_HAT_EDGES);
        let mut h = Histogram::new("h_pt_hat".to_owned(), edges.clone())?;
        let mut weighted = Histogram::new("h_pt_hat_weighted".to_owned(), edges)?;
        for (pt_hat, &weight) in self.observables.pt_hat().iter().zip(weights) {
            if let Some(pt_hat) = *pt_hat {
                h.fill(pt_hat, 1.);
                weighted.fill(pt_hat, weight);
            }
        }
        self.histograms.push(h);
        self.histograms.push(weighted);
        Ok(())
    }

    fn histogram_hadrons(&mut self) -> Result<(), HistogramError> {
        debug!("Histogramming hadron observables");
        let config = self.config;
        for (observable, block) in &config.hadron {
            for &centrality in block.centrality()? {
                let Some(bins) = bins(block, "") else {
                    continue;
                };
                let column = format!("hadron_{observable}");
                self.histogram_column(&column, "", &bins, centrality, None)?;
                let column = format!("{column}{HOLES_SUFFIX}");
                self.histogram_column(&column, "", &bins, centrality, None)?;
            }
        }
        Ok(())
    }

    fn histogram_hadron_correlations(&mut self) -> Result<(), HistogramError> {
        debug!("Histogramming hadron correlation observables");
        let config = self.config;
        for (observable, block) in &config.hadron_correlations {
            for &centrality in block.centrality()? {
                let Some(bins) = bins(block, "") else {
                    continue;
                };
                let column = format!("hadron_correlations_{observable}");
                self.histogram_column(&column, "", &bins, centrality, None)?;
            }
        }
        Ok(())
    }

    fn histogram_jets(
        &mut self,
        prefix: &str,
        category: &Category,
    ) -> Result<(), HistogramError> {
        debug!("Histogramming {prefix} observables");
        for (observable, block) in category {
            let pt = block.require(&block.pt, "pt")?;
            let subobservables: Vec<String> = match &block.kappa {
                Some(kappas) => kappas.iter().map(|&k| kappa(k)).collect(),
                None => vec![String::new()],
            };
            let bins_in_pt = pt.windows(2).enumerate();
            for (&centrality, &r, (i, w)) in
                iproduct!(block.centrality()?, block.jet_r()?, bins_in_pt)
            {
                let pt_bin = PtBin {
                    min: w[0],
                    max: w[1],
                    suffix_index: (pt.len() > 2).then_some(i),
                };
                for sub in &subobservables {
                    for suffix in column_suffixes(observable, block, r, sub) {
                        let label = format!("{suffix}{}", pt_bin.suffix());
                        let Some(bins) = bins(block, &label) else {
                            continue;
                        };
                        let column = format!("{prefix}_{observable}{suffix}");
                        self.histogram_column(&column, "", &bins, centrality, Some(pt_bin))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn histogram_semi_inclusive(&mut self, category: &Category) -> Result<(), HistogramError> {
        debug!("Histogramming semi-inclusive observables");
        let energy = self.config.energy();
        for (observable, block) in category {
            let jet_r = block.jet_r()?;
            let first_r = jet_r.first().copied();
            for &centrality in block.centrality()? {
                for &r in jet_r {
                    let Some(bins) = bins(block, &radius(r)) else {
                        continue;
                    };
                    let column = format!("semi_inclusive_chjet_{observable}{}", radius(r));
                    match energy {
                        CollisionEnergy::Lhc2760 => {
                            for trigger in ["_lowTrigger", "_highTrigger"] {
                                let column = format!("{column}{trigger}");
                                self.histogram_column(&column, "", &bins, centrality, None)?;
                            }
                            if Some(r) == first_r {
                                let low = block.require(&block.low_trigger_range, "low_trigger_range")?;
                                let high =
                                    block.require(&block.high_trigger_range, "high_trigger_range")?;
                                let bins = [low[0], low[1], high[0], high[1]];
                                self.histogram_column(
                                    "semi_inclusive_chjet_alice_trigger_pt",
                                    observable,
                                    &bins,
                                    centrality,
                                    None,
                                )?;
                            }
                        }
                        CollisionEnergy::Rhic200 => {
                            self.histogram_column(&column, "", &bins, centrality, None)?;
                            if observable == "IAA_star" && Some(r) == first_r {
                                let bins = block.require(&block.trigger_range, "trigger_range")?;
                                self.histogram_column(
                                    "semi_inclusive_chjet_star_trigger_pt",
                                    "",
                                    bins,
                                    centrality,
                                    None,
                                )?;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Histogram a single column
    ///
    /// Pair values are selected by the jet pt in their first entry and
    /// the second entry is filled.
    fn histogram_column(
        &mut self,
        column: &str,
        label: &str,
        bins: &[f64],
        centrality: [f64; 2],
        pt_bin: Option<PtBin>,
    ) -> Result<(), HistogramError> {
        let Some(values) = self.observables.column(column)? else {
            warn!("No column `{column}` in observables, skipping");
            return Ok(());
        };
        let pt_suffix = pt_bin.map(|b| b.suffix()).unwrap_or_default();
        let name = format!("h_{column}{label}_{}{pt_suffix}", centrality_label(centrality));
        let mut h = Histogram::new(name, bins.to_vec())?;
        let weights = self.observables.weights();
        for (row, &weight) in values.iter().zip(weights) {
            match row {
                Values::Scalar(values) => {
                    for &value in values {
                        h.fill(value, weight);
                    }
                }
                Values::Pair(pairs) => {
                    let Some(PtBin { min, max, .. }) = pt_bin else {
                        warn!("No pt bin for `{column}`, skipping");
                        return Ok(());
                    };
                    for &[pt, value] in pairs {
                        if min < pt && pt < max {
                            h.fill(value, weight);
                        }
                    }
                }
            }
        }
        self.histograms.push(h);

        if column.contains("Dz") && !column.ends_with(NJETS_SUFFIX) {
            if let Some(pt_bin) = pt_bin {
                let column = format!("{column}{NJETS_SUFFIX}");
                let bins = [pt_bin.min, pt_bin.max];
                self.histogram_column(&column, "", &bins, centrality, Some(pt_bin))?;
            }
        }
        Ok(())
    }
}

/// Column name suffixes for radius `r` and a sub-observable
fn column_suffixes(
    observable: &str,
    block: &ObservableBlock,
    r: f64,
    sub: &str,
) -> Vec<String> {
    let Some(settings) = &block.soft_drop else {
        return vec![format!("{}{sub}", radius(r))];
    };
    settings
        .iter()
        .filter(|setting| !is_excluded(observable, r, setting))
        .map(|setting| format!("{}{}{sub}", radius(r), grooming(setting)))
        .collect()
}

/// Bin edges for a block
fn bins(block: &ObservableBlock, label: &str) -> Option<Vec<f64>> {
    if let Some(bins) = &block.bins {
        return Some(bins.clone());
    }
    if block.hepdata.is_some() {
        warn!(
            "{}{label}: HEPData binning is not supported, skipping",
            block.name
        );
    } else {
        warn!("{}{label}: no binning found, skipping", block.name);
    }
    None
}
