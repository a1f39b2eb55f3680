//! Weighted one-dimensional histograms
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::MissingField, table::TableError};

/// A histogram with arbitrary bin edges
///
/// Bins include their lower edge and exclude their upper edge.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Histogram {
    pub name: String,
    pub edges: Vec<f64>,
    /// Sum of weights in each bin
    pub sumw: Vec<f64>,
    /// Sum of squared weights in each bin
    pub sumw2: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
}

impl Histogram {
    /// Create an empty histogram
    ///
    /// There have to be at least two finite, strictly increasing edges.
    pub fn new(name: String, edges: Vec<f64>) -> Result<Self, HistogramError> {
        let valid = edges.len() >= 2
            && edges.iter().all(|e| e.is_finite())
            && edges.windows(2).all(|w| w[0] < w[1]);
        if !valid {
            return Err(HistogramError::BadEdges(name, edges));
        }
        let nbins = edges.len() - 1;
        Ok(Self {
            name,
            edges,
            sumw: vec![0.; nbins],
            sumw2: vec![0.; nbins],
            underflow: 0.,
            overflow: 0.,
        })
    }

    /// Histogram with a single bin `[0, 1)` holding `value`
    pub fn single_bin(name: String, value: f64) -> Self {
        Self {
            name,
            edges: vec![0., 1.],
            sumw: vec![value],
            sumw2: vec![value * value],
            underflow: 0.,
            overflow: 0.,
        }
    }

    pub fn nbins(&self) -> usize {
        self.sumw.len()
    }

    /// Bin containing `x`, if any
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        let (first, last) = (self.edges[0], self.edges[self.edges.len() - 1]);
        if !(first <= x && x < last) {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }

    pub fn fill(&mut self, x: f64, weight: f64) {
        if x.is_nan() {
            trace!("{}: ignoring NaN", self.name);
            return;
        }
        match self.find_bin(x) {
            Some(bin) => {
                self.sumw[bin] += weight;
                self.sumw2[bin] += weight * weight;
            }
            None if x < self.edges[0] => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Total sum of weights in all bins, excluding under- and overflow
    pub fn integral(&self) -> f64 {
        self.sumw.iter().sum()
    }
}

/// `n` logarithmically spaced values between `min` and `max` (inclusive)
pub fn log_edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let (log_min, log_max) = (min.log10(), max.log10());
            let step = (log_max - log_min) / (n - 1) as f64;
            (0..n)
                .map(|i| 10f64.powf(log_min + i as f64 * step))
                .collect()
        }
    }
}

/// Histogram file name derived from the observable table name
pub fn histogram_file_name(observables: &Path) -> PathBuf {
    let name = observables
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let name = name
        .replace("observables", "histograms")
        .replace("parquet", "yaml");
    if name.is_empty() {
        PathBuf::from("histograms.yaml")
    } else {
        PathBuf::from(name)
    }
}

/// Write histograms as a YAML list
pub fn write_histograms(
    path: &Path,
    histograms: &[Histogram],
) -> Result<(), HistogramError> {
    debug!("Writing {} histograms to {path:?}", histograms.len());
    let file = File::create(path)
        .map_err(|err| HistogramError::Io(path.to_owned(), err))?;
    serde_yaml::to_writer(BufWriter::new(file), histograms)
        .map_err(|err| HistogramError::Yaml(path.to_owned(), err))
}

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("Invalid bin edges for {0}: {1:?}")]
    BadEdges(String, Vec<f64>),
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error("Failed to read observables")]
    Table(#[from] TableError),
    #[error("Failed to write to {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to serialise histograms to {0:?}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn fill() {
        let mut h = Histogram::new("h".to_owned(), vec![0., 1., 3., 6.]).unwrap();
        h.fill(-1., 2.);
        h.fill(0., 1.);
        h.fill(1., 0.5);
        h.fill(2.9, 0.5);
        h.fill(6., 3.);
        h.fill(f64::NAN, 1.);
        assert_eq!(h.nbins(), 3);
        assert_eq!(h.sumw, [1., 1., 0.]);
        assert_eq!(h.sumw2, [1., 0.5, 0.]);
        assert_eq!(h.underflow, 2.);
        assert_eq!(h.overflow, 3.);
        assert_eq!(h.integral(), 2.);
    }

    #[test]
    fn bad_edges() {
        assert!(Histogram::new("h".to_owned(), vec![1.]).is_err());
        assert!(Histogram::new("h".to_owned(), vec![1., 1.]).is_err());
        assert!(Histogram::new("h".to_owned(), vec![0., f64::INFINITY]).is_err());
    }

    #[test]
    fn log() {
        let edges = log_edges(1., 1000., 4);
        assert_eq!(edges.len(), 4);
        for (edge, expected) in edges.iter().zip([1., 10., 100., 1000.]) {
            assert_relative_eq!(*edge, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("histograms.yaml");
        let mut h = Histogram::new("h_test".to_owned(), vec![0., 1., 2.]).unwrap();
        h.fill(1.5, 0.25);
        let histograms = vec![h, Histogram::single_bin("h_xsec".to_owned(), 3.)];
        write_histograms(&path, &histograms).unwrap();
        let read: Vec<Histogram> =
            serde_yaml::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(read, histograms);
    }

    #[test]
    fn file_name() {
        assert_eq!(
            histogram_file_name(Path::new("out/observables_5020_0000_00.parquet")),
            PathBuf::from("histograms_5020_0000_00.yaml")
        );
    }
}
