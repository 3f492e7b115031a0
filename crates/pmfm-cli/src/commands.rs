//! Command implementations.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, CellAlignment, Table};
use serde::Deserialize;
use tracing::{debug, info, warn};

use pmfm_model::conversion::set_weight_unit_conversions;
use pmfm_model::names::{NameOptions, pmfm_name};
use pmfm_model::pmfm::Pmfm;
use pmfm_model::value::convert_length_value;
use pmfm_model::{LengthUnit, WeightUnit, math_utils};
use pmfm_validate::{CreateOptions, PmfmValidator};

use crate::cli::{AnyUnit, CheckArgs, ConvertArgs, PmfmsArgs};
use crate::tables::{align_column, apply_table_style, dim_cell, error_cell, header_cell};

/// Outcome of the `check` command.
pub struct CheckResult {
    pub checked_rows: usize,
    pub violation_count: usize,
}

impl CheckResult {
    pub fn has_violations(&self) -> bool {
        self.violation_count > 0
    }
}

pub fn run_pmfms(args: &PmfmsArgs) -> Result<()> {
    let mut pmfms = load_pmfms(&args.referential)?;
    if let Some(unit) = args.weight_unit {
        pmfms = set_weight_unit_conversions(&pmfms, WeightUnit::from(unit));
    }
    pmfms.sort_by_key(|pmfm| (pmfm.rank_order.unwrap_or(i32::MAX), pmfm.id));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Label"),
        header_cell("Name"),
        header_cell("Type"),
        header_cell("Unit"),
        header_cell("Range"),
        header_cell("Decimals"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    for pmfm in &pmfms {
        table.add_row(vec![
            Cell::new(pmfm.id),
            Cell::new(&pmfm.label),
            Cell::new(
                pmfm_name(pmfm, &NameOptions {
                    with_unit: false,
                    ..Default::default()
                })
                .unwrap_or_default(),
            ),
            Cell::new(pmfm.pmfm_type),
            Cell::new(pmfm.unit_label().unwrap_or("")),
            Cell::new(format_range(pmfm)),
            match pmfm.maximum_number_decimals {
                Some(decimals) => Cell::new(decimals),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
    info!(count = pmfms.len(), "listed descriptors");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ValueRow {
    pmfm_id: i32,
    #[serde(default)]
    value: String,
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let mut pmfms = load_pmfms(&args.referential)?;
    if let Some(unit) = args.weight_unit {
        pmfms = set_weight_unit_conversions(&pmfms, WeightUnit::from(unit));
    }
    let by_id: BTreeMap<i32, &Pmfm> = pmfms.iter().map(|pmfm| (pmfm.id, pmfm)).collect();
    let create_opts = CreateOptions {
        force_optional: args.force_optional,
    };
    let validators: BTreeMap<i32, PmfmValidator> = pmfms
        .iter()
        .filter_map(|pmfm| PmfmValidator::create(pmfm, &create_opts).map(|v| (pmfm.id, v)))
        .collect();
    debug!(
        descriptor_count = pmfms.len(),
        validator_count = validators.len(),
        "built validators"
    );

    let mut reader = csv::Reader::from_path(&args.values)
        .with_context(|| format!("open values file {}", args.values.display()))?;

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Pmfm"),
        header_cell("Value"),
        header_cell("Rule"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    let mut checked_rows = 0usize;
    let mut violation_count = 0usize;
    for (index, record) in reader.deserialize::<ValueRow>().enumerate() {
        let line = index + 2; // header is line 1
        let row = record.with_context(|| format!("read values row at line {line}"))?;
        checked_rows += 1;
        let Some(pmfm) = by_id.get(&row.pmfm_id) else {
            warn!(pmfm_id = row.pmfm_id, line, "unknown pmfm id");
            violation_count += 1;
            table.add_row(vec![
                Cell::new(line),
                error_cell(row.pmfm_id),
                Cell::new(&row.value),
                error_cell("unknownPmfm"),
                Cell::new("no descriptor with this id"),
            ]);
            continue;
        };
        let Some(validator) = validators.get(&row.pmfm_id) else {
            continue;
        };
        for violation in validator.validate(&row.value) {
            violation_count += 1;
            table.add_row(vec![
                Cell::new(line),
                Cell::new(format!("{} ({})", pmfm.label, pmfm.id)),
                Cell::new(&row.value),
                error_cell(violation.rule_name()),
                Cell::new(violation.to_string()),
            ]);
        }
    }

    if violation_count > 0 {
        println!("{table}");
    }
    println!("{checked_rows} rows checked, {violation_count} violations");
    Ok(CheckResult {
        checked_rows,
        violation_count,
    })
}

pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let from = parse_unit(&args.from)?;
    let to = parse_unit(&args.to)?;
    let converted = match (from, to) {
        (AnyUnit::Weight(from), AnyUnit::Weight(to)) => {
            math_utils::multiply(args.value, from.kg_factor() / to.kg_factor())
        }
        (AnyUnit::Length(from), AnyUnit::Length(to)) => {
            convert_length_value(args.value, from, to, args.precision)
        }
        _ => bail!("units {} and {} are not of the same kind", args.from, args.to),
    };
    println!(
        "{} {} = {} {}",
        math_utils::format_decimal(args.value),
        args.from.trim().to_lowercase(),
        math_utils::format_decimal(converted),
        args.to.trim().to_lowercase()
    );
    Ok(())
}

fn parse_unit(text: &str) -> Result<AnyUnit> {
    if let Ok(unit) = WeightUnit::from_str(text) {
        return Ok(AnyUnit::Weight(unit));
    }
    if let Ok(unit) = LengthUnit::from_str(text) {
        return Ok(AnyUnit::Length(unit));
    }
    bail!("unknown unit: {text}")
}

fn format_range(pmfm: &Pmfm) -> String {
    match (pmfm.min_value, pmfm.max_value) {
        (Some(min), Some(max)) => format!(
            "{}..{}",
            math_utils::format_decimal(min),
            math_utils::format_decimal(max)
        ),
        (Some(min), None) => format!("{}..", math_utils::format_decimal(min)),
        (None, Some(max)) => format!("..{}", math_utils::format_decimal(max)),
        (None, None) => String::new(),
    }
}

/// Load a referential file: a JSON array of descriptors.
pub fn load_pmfms(path: &Path) -> Result<Vec<Pmfm>> {
    let file =
        File::open(path).with_context(|| format!("open referential file {}", path.display()))?;
    let pmfms: Vec<Pmfm> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse referential file {}", path.display()))?;
    debug!(count = pmfms.len(), path = %path.display(), "loaded referential");
    Ok(pmfms)
}
