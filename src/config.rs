//! Analysis configuration
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Observable blocks of one category, keyed by observable name
pub type Category = BTreeMap<String, ObservableBlock>;

/// Top-level analysis configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Centre-of-mass energy per nucleon pair in GeV
    pub sqrt_s: f64,
    /// Radii for jet clustering
    #[serde(rename = "jet_R")]
    pub jet_r: Vec<f64>,
    pub min_jet_pt: f64,
    pub max_jet_y: f64,
    /// Grooming settings applied to every jet
    #[serde(rename = "SoftDrop", default)]
    pub soft_drop: Vec<GroomingSetting>,

    pub hadron: Category,
    pub hadron_correlations: Category,
    pub inclusive_chjet: Category,
    #[serde(default)]
    pub inclusive_jet: Option<Category>,
    #[serde(default)]
    pub semi_inclusive_chjet: Option<Category>,
    #[serde(default)]
    pub dijet: Option<Category>,

    /// Exponent of the event weight `(pt_hat / pt_ref)^-power`
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default = "default_pt_ref")]
    pub pt_ref: f64,
}

fn default_power() -> f64 {
    4.
}

fn default_pt_ref() -> f64 {
    10.
}

impl AnalysisConfig {
    /// Load the configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading configuration from {path:?}");
        let file = File::open(path)
            .map_err(|err| ConfigError::Io(path.to_owned(), err))?;
        let mut config: Self = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| ConfigError::Yaml(path.to_owned(), err))?;
        config.name_blocks();
        Ok(config)
    }

    /// Parse the configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.name_blocks();
        Ok(config)
    }

    pub fn energy(&self) -> CollisionEnergy {
        CollisionEnergy::from(self.sqrt_s)
    }

    fn name_blocks(&mut self) {
        let categories = [
            Some(&mut self.hadron),
            Some(&mut self.hadron_correlations),
            Some(&mut self.inclusive_chjet),
            self.inclusive_jet.as_mut(),
            self.semi_inclusive_chjet.as_mut(),
            self.dijet.as_mut(),
        ];
        for category in categories.into_iter().flatten() {
            for (name, block) in category.iter_mut() {
                block.name = name.clone();
            }
        }
    }
}

/// Collision energies with catalogued observables
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CollisionEnergy {
    Rhic200,
    Lhc2760,
    Lhc5020,
    Other(f64),
}

impl From<f64> for CollisionEnergy {
    fn from(sqrt_s: f64) -> Self {
        if sqrt_s == 200. {
            Self::Rhic200
        } else if sqrt_s == 2760. {
            Self::Lhc2760
        } else if sqrt_s == 5020. {
            Self::Lhc5020
        } else {
            Self::Other(sqrt_s)
        }
    }
}

impl CollisionEnergy {
    pub fn is_lhc(&self) -> bool {
        matches!(self, Self::Lhc2760 | Self::Lhc5020)
    }
}

/// A Soft Drop setting
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct GroomingSetting {
    pub zcut: Number,
    pub beta: Number,
}

/// A number as written in the configuration
///
/// Observable names show the number the way it was written: `0` stays
/// `0`, while `1.0` keeps its decimal point.
#[derive(Deserialize, Serialize, Debug, Copy, Clone)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn value(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(x) => x,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{}", float_str(x)),
        }
    }
}

/// Format a float with at least one decimal place
///
/// Integral values below 10^16 get a trailing `.0`.
pub fn float_str(x: f64) -> String {
    if x.is_finite() && x == x.trunc() && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

/// Pseudorapidity acceptance
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
#[serde(untagged)]
pub enum EtaCut {
    /// |η| < cut
    Symmetric(f64),
    /// min < |η| < max
    Range([f64; 2]),
}

impl EtaCut {
    pub fn accepts(&self, abs_eta: f64) -> bool {
        match *self {
            Self::Symmetric(cut) => abs_eta < cut,
            Self::Range([min, max]) => min < abs_eta && abs_eta < max,
        }
    }
}

/// Definition of a single observable
///
/// Which fields are required depends on the observable.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ObservableBlock {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub centrality: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub pt: Option<Vec<f64>>,
    #[serde(default)]
    pub pt_min: Option<f64>,
    #[serde(default)]
    pub eta_cut: Option<EtaCut>,
    #[serde(rename = "eta_cut_R", default)]
    pub eta_cut_r: Option<f64>,
    #[serde(default)]
    pub y_cut: Option<f64>,
    #[serde(rename = "jet_R", default)]
    pub jet_r: Option<Vec<f64>>,
    #[serde(rename = "SoftDrop", default)]
    pub soft_drop: Option<Vec<GroomingSetting>>,
    #[serde(default)]
    pub kappa: Option<Vec<Number>>,
    #[serde(rename = "dR", default)]
    pub delta_r: Option<f64>,
    #[serde(default)]
    pub leading_track_min_pt: Option<f64>,
    #[serde(default)]
    pub track_pt_min: Option<f64>,
    #[serde(default)]
    pub hadron_eta_cut: Option<f64>,
    #[serde(default)]
    pub low_trigger_range: Option<[f64; 2]>,
    #[serde(default)]
    pub high_trigger_range: Option<[f64; 2]>,
    #[serde(default)]
    pub trigger_range: Option<[f64; 2]>,
    #[serde(default)]
    pub pt_leading_min: Option<f64>,
    #[serde(default)]
    pub pt_subleading_min: Option<f64>,
    /// Histogram bin edges
    #[serde(default)]
    pub bins: Option<Vec<f64>>,
    /// Reference data file for the binning
    #[serde(default)]
    pub hepdata: Option<String>,
}

impl ObservableBlock {
    /// Unwrap a required field
    pub fn require<'a, T>(
        &self,
        value: &'a Option<T>,
        field: &'static str,
    ) -> Result<&'a T, MissingField> {
        value.as_ref().ok_or_else(|| self.missing(field))
    }

    pub fn centrality(&self) -> Result<&[[f64; 2]], MissingField> {
        self.require(&self.centrality, "centrality").map(|c| c.as_slice())
    }

    pub fn jet_r(&self) -> Result<&[f64], MissingField> {
        self.require(&self.jet_r, "jet_R").map(|r| r.as_slice())
    }

    /// Whether the observable is measured for jet radius `r`
    pub fn has_jet_r(&self, r: f64) -> Result<bool, MissingField> {
        Ok(self.jet_r()?.contains(&r))
    }

    pub fn eta_cut(&self) -> Result<EtaCut, MissingField> {
        self.require(&self.eta_cut, "eta_cut").copied()
    }

    /// The first two `pt` entries as an open range
    pub fn pt_bounds(&self) -> Result<(f64, f64), MissingField> {
        match self.pt.as_deref() {
            Some([min, max, ..]) => Ok((*min, *max)),
            _ => Err(self.missing("pt")),
        }
    }

    /// The first and last `pt` entries as an open range
    pub fn pt_span(&self) -> Result<(f64, f64), MissingField> {
        match self.pt.as_deref() {
            Some([min, .., max]) => Ok((*min, *max)),
            _ => Err(self.missing("pt")),
        }
    }

    /// The first `pt` entry
    pub fn pt_lower(&self) -> Result<f64, MissingField> {
        match self.pt.as_deref() {
            Some([min, ..]) => Ok(*min),
            _ => Err(self.missing("pt")),
        }
    }

    /// Whether the block lists `setting` among its grooming settings
    pub fn lists_grooming(&self, setting: &GroomingSetting) -> bool {
        self.soft_drop
            .as_ref()
            .map_or(false, |settings| settings.contains(setting))
    }

    fn missing(&self, field: &'static str) -> MissingField {
        MissingField {
            observable: self.name.clone(),
            field,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse configuration file {0:?}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Observable `{observable}` requires the field `{field}`")]
pub struct MissingField {
    pub observable: String,
    pub field: &'static str,
}
