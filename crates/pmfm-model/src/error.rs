use thiserror::Error;

/// Errors raised by the PMFM model layer.
///
/// Unknown type or unit strings are metadata/schema mismatches and must
/// surface immediately; absent or blank values are never errors.
#[derive(Debug, Error)]
pub enum PmfmError {
    #[error("unknown pmfm type: {0}")]
    UnknownType(String),
    #[error("unknown weight unit: {0}")]
    UnknownWeightUnit(String),
    #[error("unknown length unit: {0}")]
    UnknownLengthUnit(String),
}

pub type Result<T> = std::result::Result<T, PmfmError>;
