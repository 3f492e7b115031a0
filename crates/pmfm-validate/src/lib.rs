//! Measurement-value validation against PMFM descriptors.
//!
//! A [`PmfmValidator`] is built once per descriptor and checks raw wire
//! strings, reporting every failed rule as a [`RuleViolation`].

pub mod rules;
pub mod significant_figures;
pub mod validator;

pub use rules::RuleViolation;
pub use significant_figures::count_significant_figures;
pub use validator::{CreateOptions, PmfmValidator};
