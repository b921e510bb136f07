//! `ssidrot stage <index>`: make a chosen active SSID the next one rotated in.

use chrono::Utc;
use serde::Serialize;

use ssidrot_core::{RotationList, StateStore};

use crate::cli::{GlobalOpts, StageArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

#[derive(Debug, Serialize)]
struct Staged {
    index: usize,
    ssid: String,
    current_index: usize,
    staged_at: Option<String>,
}

pub fn handle(args: &StageArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::rotation_settings(global, &cfg);
    let list = RotationList::load(&settings.ssid_list_file)?;

    let Some(name) = list.active().get(args.index) else {
        return Err(CliError::Validation {
            field: "index".into(),
            reason: format!(
                "{} is out of range, the active rotation has {} names (0..={})",
                args.index,
                list.len(),
                list.len() - 1
            ),
        });
    };

    let overlap = list.overlap();
    if !overlap.is_empty() {
        return Err(CliError::Overlap {
            names: overlap.join(", "),
        });
    }

    if !util::confirm(
        &format!("Make '{name}' the next SSID to rotate in?"),
        global.yes,
    )? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let store = StateStore::new(&settings.state_file);
    let _lock = store.lock()?;
    let mut state = store.load()?;
    state
        .stage_next(args.index, list.len(), Utc::now())
        .map_err(|e| CliError::Validation {
            field: "index".into(),
            reason: e.to_string(),
        })?;
    store.save(&state)?;
    tracing::info!(index = args.index, ssid = %name, "staged next rotation");

    let staged = Staged {
        index: args.index,
        ssid: name.clone(),
        current_index: state.current_index,
        staged_at: state.staged_at,
    };
    let painter = Painter::new(global.color);
    let out = output::render_single(
        global.output,
        &staged,
        |s| {
            format!(
                "{} Next rotation will use '{}' (index {})",
                painter.ok("Staged."),
                painter.bold(&s.ssid),
                s.index
            )
        },
        |s| s.ssid.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
