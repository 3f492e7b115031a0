//! CLI argument definitions for the PMFM toolbox.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pmfm_model::{LengthUnit, WeightUnit};

#[derive(Parser)]
#[command(
    name = "pmfm",
    version,
    about = "PMFM toolbox - inspect referentials, validate values, convert units",
    long_about = "Work with PMFM (Parameter-Matrix-Fraction-Method) referentials.\n\n\
                  Lists descriptors, validates measurement values against their\n\
                  descriptor's rules, and converts weights and lengths between units."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the descriptors of a referential file.
    Pmfms(PmfmsArgs),

    /// Validate measurement values against their descriptors.
    Check(CheckArgs),

    /// Convert a weight or length between units.
    Convert(ConvertArgs),
}

#[derive(Parser)]
pub struct PmfmsArgs {
    /// Path to the referential JSON file (an array of descriptors).
    #[arg(value_name = "REFERENTIAL_JSON")]
    pub referential: PathBuf,

    /// Display weight descriptors in this unit.
    #[arg(long = "weight-unit", value_enum)]
    pub weight_unit: Option<WeightUnitArg>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the referential JSON file (an array of descriptors).
    #[arg(value_name = "REFERENTIAL_JSON")]
    pub referential: PathBuf,

    /// Path to a CSV file with `pmfm_id,value` rows.
    #[arg(value_name = "VALUES_CSV")]
    pub values: PathBuf,

    /// Validate against descriptors displayed in this weight unit.
    #[arg(long = "weight-unit", value_enum)]
    pub weight_unit: Option<WeightUnitArg>,

    /// Treat required descriptors as optional.
    #[arg(long = "force-optional")]
    pub force_optional: bool,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// The value to convert.
    #[arg(value_name = "VALUE")]
    pub value: f64,

    /// Source unit (t, kg, g, mg, km, m, dm, cm, mm).
    #[arg(long = "from", value_name = "UNIT")]
    pub from: String,

    /// Target unit of the same kind as --from.
    #[arg(long = "to", value_name = "UNIT")]
    pub to: String,

    /// Rounding precision step for length conversions (default 1e-6).
    #[arg(long = "precision", value_name = "STEP")]
    pub precision: Option<f64>,
}

/// CLI weight unit choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum WeightUnitArg {
    T,
    Kg,
    G,
    Mg,
}

impl From<WeightUnitArg> for WeightUnit {
    fn from(value: WeightUnitArg) -> Self {
        match value {
            WeightUnitArg::T => WeightUnit::T,
            WeightUnitArg::Kg => WeightUnit::Kg,
            WeightUnitArg::G => WeightUnit::G,
            WeightUnitArg::Mg => WeightUnit::Mg,
        }
    }
}

/// A unit argument accepted by `convert`: weight or length.
#[derive(Debug, Clone, Copy)]
pub enum AnyUnit {
    Weight(WeightUnit),
    Length(LengthUnit),
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
