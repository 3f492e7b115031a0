//! PMFM data model: descriptors, typed measurement values, and display-unit
//! conversion.
//!
//! A PMFM (Parameter-Matrix-Fraction-Method) descriptor qualifies one
//! measurable quantity of a fisheries observation. This crate models the
//! descriptor shapes served by the referential service, decodes and encodes
//! measurement values against them, and rescales weight/length descriptors
//! for display in a different unit.

pub mod conversion;
pub mod error;
pub mod math_utils;
pub mod names;
pub mod pmfm;
pub mod referential;
pub mod units;
pub mod value;

pub use error::{PmfmError, Result};
pub use pmfm::{
    ExtendedPmfmType, Pmfm, PmfmDetail, PmfmFilter, PmfmType, filter_pmfms, first_qualitative_pmfm,
};
pub use referential::{DisplayProperty, Parameter, ReferentialRef};
pub use units::{LengthUnit, UnitConversion, WeightUnit};
pub use value::{ConvertedNumber, FormValue, PmfmValue};
