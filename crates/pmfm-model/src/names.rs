//! Display-name composition for descriptors.
//!
//! Denormalized descriptors carry a precomputed `completeName` whose
//! details follow the name after `" - "`. Full descriptors compose their
//! name from the parameter and the matrix/fraction/method facets. Either
//! way the result goes through [`sanitize_name`], which strips synonym
//! suffixes and appends the unit.

use std::sync::LazyLock;

use regex::Regex;

use crate::pmfm::{Pmfm, PmfmDetail};

/// Matches a name ending with a parenthesized synonym or a ` / `-joined
/// alternate, e.g. `Total length (LT)` or `Carapace width / CW`.
static NAME_ENDS_WITH_PARENTHESIS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^/(]+)((?:\s+/\s+[^/]+)|(?:\([^)]+\)))$")
        .expect("invalid parenthesis name regex")
});

/// Unit suffixes never appended to a name.
const UNIT_SUFFIX_BLOCKLIST: &[&str] = &["°"];

/// Rendering options for [`pmfm_name`].
#[derive(Debug, Clone, Copy)]
pub struct NameOptions {
    /// Append the unit label as a ` (unit)` suffix.
    pub with_unit: bool,
    /// Strip trailing synonyms, e.g. `Total length (LT)` renders as
    /// `Total length`.
    pub compact: bool,
    /// Render the unit suffix as a `<small>` HTML block.
    pub html: bool,
    /// Keep the ` - `-joined details of the complete name.
    pub with_details: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            with_unit: true,
            compact: true,
            html: false,
            with_details: false,
        }
    }
}

/// Human-readable name of a descriptor.
pub fn pmfm_name(pmfm: &Pmfm, opts: &NameOptions) -> Option<String> {
    let (name, details) = match &pmfm.detail {
        PmfmDetail::Denormalized(detail) => match detail.complete_name.as_deref() {
            Some(complete) => match complete.split_once(" - ") {
                Some((head, tail)) => (head.to_string(), Some(tail.to_string())),
                None => (complete.to_string(), None),
            },
            None => (detail.name.clone(), None),
        },
        PmfmDetail::Full(detail) => {
            let name = detail
                .parameter
                .name
                .clone()
                .or_else(|| detail.name.clone())?;
            let facets: Vec<&str> = [&detail.matrix, &detail.fraction, &detail.method]
                .into_iter()
                .filter_map(|facet| facet.as_ref())
                .filter_map(|facet| facet.name.as_deref())
                .collect();
            let details = if facets.is_empty() {
                None
            } else {
                Some(facets.join(" - "))
            };
            (name, details)
        }
        PmfmDetail::Minimal(_) => return None,
    };

    let base = match (opts.with_details, details) {
        (true, Some(details)) => format!("{name} - {details}"),
        _ => name,
    };
    Some(sanitize_name(&base, pmfm.unit_label(), opts))
}

/// Strip trailing synonyms and append the unit suffix.
pub fn sanitize_name(name: &str, unit_label: Option<&str>, opts: &NameOptions) -> String {
    let mut result = if opts.compact {
        match NAME_ENDS_WITH_PARENTHESIS_REGEX.captures(name) {
            Some(captures) => captures
                .get(1)
                .map_or(name, |m| m.as_str())
                .trim_end()
                .to_string(),
            None => name.to_string(),
        }
    } else {
        name.to_string()
    };

    if opts.with_unit {
        if let Some(unit) = unit_label.filter(|unit| !UNIT_SUFFIX_BLOCKLIST.contains(unit)) {
            if opts.html {
                result.push_str(&format!("<small><br/>({unit})</small>"));
            } else {
                result.push_str(&format!(" ({unit})"));
            }
        }
    }
    result
}
