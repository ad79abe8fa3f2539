//! Command-line layer for volley: argument parsing, the live event log,
//! the periodic report and the auxiliary `decoy` and `mkform` commands.
mod cli;
mod decoy;
mod mkform;
mod report;

pub use cli::Cli;
