//! Subcommand implementations

pub mod replay;
pub mod status;
pub mod thresholds;
