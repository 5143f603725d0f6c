//! Two-dimensional correlation spectroscopy (2DCOS).
//!
//! [`cos`] holds the numerical core (dense [`cos::Matrix`], the Hilbert–Noda
//! matrix and the synchronous/asynchronous maps). [`data`] turns measurement
//! files into a data matrix, [`export`] writes the results and
//! [`state::AnalysisState`] chains the stages for one run.

pub mod config;
pub mod cos;
pub mod data;
pub mod export;
pub mod state;
