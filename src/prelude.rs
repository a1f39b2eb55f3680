pub use crate::{
    centrality::Centrality,
    config::AnalysisConfig,
    hijet::{Hijet, HijetBuilder},
    histogrammer::Histogrammer,
    observables::Analysis,
    reader::FileReader,
    traits::*,
};
