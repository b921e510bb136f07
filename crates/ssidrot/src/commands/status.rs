//! `ssidrot status`: local view of the rotation. Never contacts the controller.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ssidrot_core::rotation_list::ROTATION_INTERVAL_HOURS;
use ssidrot_core::{RotationList, RotationState, StateStore};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

#[derive(Debug, Serialize)]
struct StatusView {
    ssid_list_file: PathBuf,
    state_file: PathBuf,
    active_rotation: Vec<String>,
    reserve_pool: Vec<String>,
    protected_ssids: Vec<String>,
    current_index: usize,
    current_ssid: Option<String>,
    next_index: usize,
    next_ssid: Option<String>,
    wlan_id: Option<String>,
    last_rotation: Option<DateTime<Utc>>,
    staged_by_user: bool,
    staged_at: Option<String>,
    cycle_days: f64,
    warnings: Vec<String>,
}

impl StatusView {
    fn new(settings_paths: (PathBuf, PathBuf), list: &RotationList, state: RotationState) -> Self {
        let active = list.active();
        let next_index = state.next_index(list.len());
        let mut warnings: Vec<String> = list.warnings().iter().map(ToString::to_string).collect();
        if state.current_index >= active.len() {
            warnings.push(format!(
                "stored index {} is beyond the active list ({} names); the next rotation wraps",
                state.current_index,
                active.len()
            ));
        }

        Self {
            ssid_list_file: settings_paths.0,
            state_file: settings_paths.1,
            active_rotation: active.to_vec(),
            reserve_pool: list.reserve().to_vec(),
            protected_ssids: list.protected().to_vec(),
            current_index: state.current_index,
            current_ssid: active.get(state.current_index).cloned(),
            next_index,
            next_ssid: active.get(next_index).cloned(),
            wlan_id: state.wlan_id,
            last_rotation: state.last_rotation,
            staged_by_user: state.staged_by_user.unwrap_or(false),
            staged_at: state.staged_at,
            cycle_days: list.cycle_days(),
            warnings,
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::rotation_settings(global, &cfg);

    let list = RotationList::load(&settings.ssid_list_file)?;
    let state = StateStore::new(&settings.state_file).load()?;

    let view = StatusView::new(
        (settings.ssid_list_file.clone(), settings.state_file.clone()),
        &list,
        state,
    );

    let painter = Painter::new(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |v| detail(v, painter),
        |v| v.current_ssid.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(v: &StatusView, p: Painter) -> String {
    let none = || p.dim("(none)");
    let mut lines = vec![
        format!("SSID list:      {}", v.ssid_list_file.display()),
        format!("State file:     {}", v.state_file.display()),
        format!(
            "Current:        {}",
            v.current_ssid
                .as_deref()
                .map_or_else(none, |s| format!("'{s}' (index {})", v.current_index))
        ),
        format!(
            "Next:           {}",
            v.next_ssid
                .as_deref()
                .map_or_else(none, |s| format!("'{}' (index {})", p.bold(s), v.next_index))
        ),
        format!(
            "Target WLAN:    {}",
            v.wlan_id.clone().unwrap_or_else(|| p.dim("(not cached)"))
        ),
        format!(
            "Last rotation:  {}",
            v.last_rotation.map_or_else(none, |t| t
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string())
        ),
    ];
    if v.staged_by_user {
        lines.push(format!(
            "Staged:         {}",
            p.warn(&format!(
                "yes (at {})",
                v.staged_at.as_deref().unwrap_or("unknown time")
            ))
        ));
    }
    lines.push(format!(
        "Cycle:          {} names, {:.1} days at one rotation every {ROTATION_INTERVAL_HOURS}h",
        v.active_rotation.len(),
        v.cycle_days
    ));

    lines.push(String::new());
    lines.push("Active rotation:".into());
    for (i, name) in v.active_rotation.iter().enumerate() {
        let marker = if i == v.next_index {
            "->"
        } else if i == v.current_index {
            " *"
        } else {
            "  "
        };
        lines.push(format!("  {marker} [{i}] {name}"));
    }
    lines.push(format!(
        "Reserve pool:   {} names",
        v.reserve_pool.len()
    ));
    lines.push(format!(
        "Protected:      {}",
        if v.protected_ssids.is_empty() {
            none()
        } else {
            v.protected_ssids.join(", ")
        }
    ));
    for w in &v.warnings {
        lines.push(p.warn(&format!("warning: {w}")));
    }
    lines.join("\n")
}
