//! `hijet` computes jet and hadron observables from heavy-ion collision
//! events and bins them into histograms for comparison with experimental
//! data.
//!
//! # How to use
//!
//! The `hijet` binary reads a file with final-state hadrons and writes a
//! parquet table with one row per event and one column per observable.
//! `hijet-histogram` turns such a table into weighted histograms.
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [hijet] contains the main event loop
//! - [config] for the YAML analysis configuration
//! - [observables] for the catalogue of observables
//! - [subtraction] for the hole subtraction in heavy-ion events
//! - [table] for the output tables
//! - [histogrammer] for the histogramming step
//!

/// Centrality classes
pub mod centrality;
/// Jet clustering
pub mod cluster;
/// Analysis configuration
pub mod config;
/// Collision event class
pub mod event;
/// Four-vector class
pub mod four_vector;
/// Soft Drop grooming
pub mod groom;
pub mod hijet;
/// Weighted histograms
pub mod histogram;
pub mod histogrammer;
/// N-subjettiness
pub mod nsubjettiness;
pub mod observables;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Event reader
pub mod reader;
/// Particle species
pub mod species;
pub mod subtraction;
pub mod table;
/// Common traits
pub mod traits;

mod parsing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
