//! Input parsing and text rendering shared by the subcommands and headless mode.

use crate::persist::AreaInfo;
use fuzzy_core::validate::Issue;
use fuzzy_core::{AreaSnapshot, Evaluation, RuleDisplay, Variable};
use std::collections::HashMap;
use std::io::{self, Write};
use thiserror::Error;

/// Default spacing for curve tables.
pub const DEFAULT_CURVE_STEP: f64 = 10.0;

/// A malformed `NAME=VALUE` input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Expected NAME=VALUE, got {0:?}")]
    MissingEquals(String),

    #[error("Input name is empty in {0:?}")]
    EmptyName(String),

    #[error("Input {name} has a non-numeric value {value:?}")]
    InvalidNumber { name: String, value: String },
}

/// Parse one `NAME=VALUE` assignment. Whitespace around either side is ignored.
pub fn parse_assignment(text: &str) -> Result<(String, f64), InputError> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| InputError::MissingEquals(text.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::EmptyName(text.to_string()));
    }

    let value = value.trim();
    let number = value
        .parse::<f64>()
        .map_err(|_| InputError::InvalidNumber {
            name: name.to_string(),
            value: value.to_string(),
        })?;
    Ok((name.to_string(), number))
}

/// Parse several assignments; later ones win.
pub fn parse_assignments<'a>(
    items: impl IntoIterator<Item = &'a str>,
) -> Result<HashMap<String, f64>, InputError> {
    items.into_iter().map(parse_assignment).collect()
}

/// `Name = value` for every crisp output, one per line.
pub fn write_crisp(out: &mut impl Write, evaluation: &Evaluation) -> io::Result<()> {
    if evaluation.crisp_outputs.is_empty() {
        return writeln!(out, "(no outputs)");
    }
    for (name, value) in &evaluation.crisp_outputs {
        writeln!(out, "{name} = {value:.4}")?;
    }
    Ok(())
}

pub fn write_issues(out: &mut impl Write, issues: &[Issue]) -> io::Result<()> {
    if issues.is_empty() {
        return writeln!(out, "No issues found");
    }
    for issue in issues {
        writeln!(out, "{}: {issue}", issue.severity())?;
    }
    Ok(())
}

/// Numbered rules in `IF ... THEN ...` form.
pub fn write_rules(out: &mut impl Write, snapshot: &AreaSnapshot) -> io::Result<()> {
    if snapshot.rules.is_empty() {
        return writeln!(out, "(no rules)");
    }
    for (i, rule) in snapshot.rules.iter().enumerate() {
        writeln!(out, "{:>3}. {}", i + 1, RuleDisplay::new(rule, &snapshot.variables))?;
    }
    Ok(())
}

/// A table of every set's degree, sampled across the variable's universe.
pub fn write_curve(out: &mut impl Write, variable: &Variable, step: f64) -> io::Result<()> {
    let universe = variable.universe_or_default();
    let curves: Vec<_> = variable
        .sets
        .iter()
        .map(|set| set.curve(universe, step))
        .collect();

    write!(out, "{:>10}", "x")?;
    for set in &variable.sets {
        write!(out, " {:>10}", set.name)?;
    }
    writeln!(out)?;

    let rows = curves.first().map_or(0, Vec::len);
    for row in 0..rows {
        write!(out, "{:>10.3}", curves[0][row].x)?;
        for curve in &curves {
            write!(out, " {:>10.4}", curve[row].degree)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_area_list(out: &mut impl Write, areas: &[AreaInfo]) -> io::Result<()> {
    if areas.is_empty() {
        return writeln!(out, "No areas found");
    }
    for area in areas {
        let saved = area
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}  {} ({} variables, {} rules, saved {})",
            area.path.display(),
            area.name,
            area.variables,
            area.rules,
            saved
        )?;
    }
    Ok(())
}
