//! CLI library components for the PMFM toolbox.

pub mod logging;
