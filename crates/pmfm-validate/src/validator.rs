//! Validator construction from a descriptor.
//!
//! [`PmfmValidator::create`] derives an ordered rule list from one
//! descriptor: requiredness, then type-specific constraints. Validation
//! runs against the raw wire string; an empty input is checked for
//! requiredness only, since the remaining rules describe a present value.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use pmfm_model::pmfm::{Pmfm, PmfmType};

use crate::rules::RuleViolation;
use crate::significant_figures::count_significant_figures;

/// Maximum length of alphanumeric measurement values.
const STRING_MAX_LENGTH: usize = 40;

/// Tolerance of the precision-step multiple check.
const PRECISION_STEP_EPSILON: f64 = 1e-6;

static INTEGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("invalid integer regex"));

static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("invalid decimal regex"));

/// Options for [`PmfmValidator::create`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Treat a required descriptor as optional.
    pub force_optional: bool,
}

#[derive(Debug)]
enum Rule {
    Required,
    MaxLength(usize),
    Min(f64),
    Max(f64),
    Integer,
    Decimal,
    MaxDecimals { max: u32, pattern: Regex },
    SignifFigures(u32),
    PrecisionStep(f64),
    QualitativeValue(Vec<i32>),
}

/// An ordered rule list for one descriptor.
#[derive(Debug)]
pub struct PmfmValidator {
    pmfm_id: i32,
    rules: Vec<Rule>,
}

impl PmfmValidator {
    /// Derive the rule list for a descriptor. Returns `None` when no rule
    /// applies (an optional string without constraints, for instance).
    pub fn create(pmfm: &Pmfm, opts: &CreateOptions) -> Option<Self> {
        let mut rules = Vec::new();
        if pmfm.required && !opts.force_optional {
            rules.push(Rule::Required);
        }
        match pmfm.pmfm_type {
            PmfmType::String => {
                rules.push(Rule::MaxLength(STRING_MAX_LENGTH));
            }
            PmfmType::Integer | PmfmType::Double => {
                if let Some(min) = pmfm.min_value {
                    rules.push(Rule::Min(min));
                }
                if let Some(max) = pmfm.max_value {
                    rules.push(Rule::Max(max));
                }
                // Exactly one pattern rule applies: the narrowest of
                // integer, bounded-decimals, free decimal.
                if pmfm.pmfm_type == PmfmType::Integer {
                    rules.push(Rule::Integer);
                } else {
                    match pmfm.maximum_number_decimals {
                        Some(0) => rules.push(Rule::Integer),
                        Some(max) => rules.push(Rule::MaxDecimals {
                            max,
                            pattern: max_decimals_regex(max),
                        }),
                        None => rules.push(Rule::Decimal),
                    }
                }
                if let Some(max) = pmfm.signif_figures_number {
                    rules.push(Rule::SignifFigures(max));
                }
                if let Some(precision) = pmfm.precision.filter(|p| *p > 0.0) {
                    rules.push(Rule::PrecisionStep(precision));
                }
            }
            PmfmType::QualitativeValue => {
                let ids: Vec<i32> = pmfm.qualitative_values().iter().map(|qv| qv.id).collect();
                if !ids.is_empty() {
                    rules.push(Rule::QualitativeValue(ids));
                }
            }
            PmfmType::Boolean | PmfmType::Date => {}
        }
        if rules.is_empty() {
            return None;
        }
        debug!(pmfm_id = pmfm.id, rule_count = rules.len(), "built validator");
        Some(Self {
            pmfm_id: pmfm.id,
            rules,
        })
    }

    pub fn pmfm_id(&self) -> i32 {
        self.pmfm_id
    }

    /// Check a raw wire value; all failed rules are reported, in rule
    /// order.
    pub fn validate(&self, input: &str) -> Vec<RuleViolation> {
        let trimmed = input.trim();
        let mut violations = Vec::new();
        for rule in &self.rules {
            if trimmed.is_empty() {
                if matches!(rule, Rule::Required) {
                    violations.push(RuleViolation::Required);
                }
                continue;
            }
            match rule {
                Rule::Required => {}
                Rule::MaxLength(max) => {
                    if trimmed.chars().count() > *max {
                        violations.push(RuleViolation::MaxLength { max: *max });
                    }
                }
                Rule::Min(min) => {
                    // Range checks only apply to parseable numbers; the
                    // pattern rule reports malformed input.
                    if let Ok(actual) = f64::from_str(trimmed) {
                        if actual < *min {
                            violations.push(RuleViolation::Min {
                                min: *min,
                                actual,
                            });
                        }
                    }
                }
                Rule::Max(max) => {
                    if let Ok(actual) = f64::from_str(trimmed) {
                        if actual > *max {
                            violations.push(RuleViolation::Max {
                                max: *max,
                                actual,
                            });
                        }
                    }
                }
                Rule::Integer => {
                    if !INTEGER_REGEX.is_match(trimmed) {
                        violations.push(RuleViolation::Integer);
                    }
                }
                Rule::Decimal => {
                    if !DECIMAL_REGEX.is_match(trimmed) {
                        violations.push(RuleViolation::Decimal);
                    }
                }
                Rule::MaxDecimals { max, pattern } => {
                    if !pattern.is_match(trimmed) {
                        violations.push(RuleViolation::MaxDecimals { max: *max });
                    }
                }
                Rule::SignifFigures(max) => {
                    let actual = count_significant_figures(trimmed);
                    if actual > *max {
                        violations.push(RuleViolation::SignifFigures {
                            max: *max,
                            actual,
                        });
                    }
                }
                Rule::PrecisionStep(precision) => {
                    if let Ok(actual) = f64::from_str(trimmed) {
                        let ratio = actual / precision;
                        if (ratio - ratio.round()).abs() > PRECISION_STEP_EPSILON {
                            violations.push(RuleViolation::PrecisionStep {
                                precision: *precision,
                            });
                        }
                    }
                }
                Rule::QualitativeValue(ids) => {
                    let known = i32::from_str(trimmed)
                        .is_ok_and(|id| ids.contains(&id));
                    if !known {
                        violations.push(RuleViolation::InvalidQualitativeValue);
                    }
                }
            }
        }
        violations
    }

    pub fn is_valid(&self, input: &str) -> bool {
        self.validate(input).is_empty()
    }
}

/// Decimal pattern with a bounded fraction length.
fn max_decimals_regex(max: u32) -> Regex {
    Regex::new(&format!(r"^[+-]?[0-9]+(\.[0-9]{{1,{max}}})?$"))
        .expect("invalid max-decimals regex")
}
