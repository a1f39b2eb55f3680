use std::{
    fmt::{self, Display},
    str::FromStr,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref CENTRALITY_RE: Regex = Regex::new(
        r"^\s*(?P<min>\d+(?:\.\d*)?)\s*[-,:_]\s*(?P<max>\d+(?:\.\d*)?)\s*$"
    )
    .unwrap();
}

/// Centrality class of a heavy-ion run in percent
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct Centrality {
    pub min: f64,
    pub max: f64,
}

impl Centrality {
    /// Whether the class lies inside one of the given `[min, max]` ranges
    pub fn is_inside_any(&self, ranges: &[[f64; 2]]) -> bool {
        ranges
            .iter()
            .any(|&[min, max]| self.min >= min && self.max <= max)
    }
}

/// Whether an observable measured in the `accepted` centrality ranges
/// applies to the run
///
/// Runs without centrality are proton-proton runs and accept everything.
pub fn centrality_accepted(
    run: Option<&Centrality>,
    accepted: &[[f64; 2]],
) -> bool {
    run.map_or(true, |c| c.is_inside_any(accepted))
}

impl Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for Centrality {
    type Err = ParseCentralityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParseCentralityError::*;

        let Some(captures) = CENTRALITY_RE.captures(s) else {
            return Err(BadFormat(s.to_owned()));
        };
        let parse = |name: &str| -> Result<f64, Self::Err> {
            captures[name].parse().map_err(|_| BadFormat(s.to_owned()))
        };
        let (min, max) = (parse("min")?, parse("max")?);
        if min > max || max > 100. {
            return Err(BadRange(min, max));
        }
        Ok(Self { min, max })
    }
}

#[derive(Debug, Clone, Error)]
pub enum ParseCentralityError {
    #[error("Failed to parse centrality `{0}`, expected MIN-MAX")]
    BadFormat(String),
    #[error("Invalid centrality range {0}-{1}")]
    BadRange(f64, f64),
}
