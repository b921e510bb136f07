//! `ssidrot validate`: check the SSID list file and suggest fixes.

use std::path::PathBuf;

use serde::Serialize;

use ssidrot_core::ssid::{self, NameError};
use ssidrot_core::{RotationError, RotationList};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

#[derive(Debug, Serialize)]
struct ValidationReport {
    file: PathBuf,
    valid: bool,
    active: usize,
    reserve: usize,
    protected: usize,
    cycle_days: f64,
    errors: Vec<NameProblem>,
    overlap: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NameProblem {
    list: String,
    index: usize,
    name: String,
    problem: String,
    suggestion: Option<String>,
}

impl From<&NameError> for NameProblem {
    fn from(e: &NameError) -> Self {
        Self {
            list: e.list.clone(),
            index: e.index,
            name: e.name.clone(),
            problem: e.issue.to_string(),
            suggestion: ssid::suggest_fix(&e.name),
        }
    }
}

impl ValidationReport {
    fn empty(file: PathBuf) -> Self {
        Self {
            file,
            valid: false,
            active: 0,
            reserve: 0,
            protected: 0,
            cycle_days: 0.0,
            errors: Vec::new(),
            overlap: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn from_list(file: PathBuf, list: &RotationList) -> Self {
        let overlap = list.overlap();
        Self {
            valid: overlap.is_empty(),
            active: list.len(),
            reserve: list.reserve().len(),
            protected: list.protected().len(),
            cycle_days: list.cycle_days(),
            overlap,
            warnings: list.warnings().iter().map(ToString::to_string).collect(),
            ..Self::empty(file)
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let path = config::rotation_settings(global, &cfg).ssid_list_file;

    let report = match RotationList::load(&path) {
        Ok(list) => ValidationReport::from_list(path, &list),
        Err(RotationError::ValidationFailed { errors }) => ValidationReport {
            errors: errors.iter().map(NameProblem::from).collect(),
            ..ValidationReport::empty(path)
        },
        // Unreadable, malformed or empty: nothing name-level to report.
        Err(e) => return Err(e.into()),
    };

    let painter = Painter::new(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| detail(r, painter),
        |r| (if r.valid { "valid" } else { "invalid" }).to_owned(),
    );
    output::print_output(&out, global.quiet);

    if !report.overlap.is_empty() {
        return Err(CliError::Overlap {
            names: report.overlap.join(", "),
        });
    }
    if !report.errors.is_empty() {
        // The per-name details were just printed.
        return Err(CliError::ValidationFailed {
            count: report.errors.len(),
            details: String::new(),
        });
    }
    Ok(())
}

fn detail(r: &ValidationReport, p: Painter) -> String {
    let mut lines = vec![format!("Checking {}", r.file.display())];

    if r.errors.is_empty() {
        lines.push(format!(
            "  Active rotation: {} SSIDs ({:.1} days per cycle)",
            r.active, r.cycle_days
        ));
        lines.push(format!("  Reserve pool:    {} SSIDs", r.reserve));
        lines.push(format!("  Protected:       {} SSIDs", r.protected));
    }

    for e in &r.errors {
        lines.push(format!(
            "  {} {}[{}] '{}': {}",
            p.bad("x"),
            e.list,
            e.index,
            e.name.escape_debug(),
            e.problem
        ));
        match e.suggestion {
            Some(ref fix) => lines.push(format!("      suggestion: '{fix}'")),
            None => lines.push(p.dim("      suggestion: none, rename it by hand")),
        }
    }
    for name in &r.overlap {
        lines.push(format!(
            "  {} '{name}' is both protected and in active rotation",
            p.bad("x")
        ));
    }
    for w in &r.warnings {
        lines.push(format!("  {} {w}", p.warn("!")));
    }

    lines.push(if r.valid {
        p.ok("All SSIDs are valid")
    } else {
        p.bad("SSID list is invalid")
    });
    lines.join("\n")
}
