//! `ssidrot wlans`: list the controller's WLANs and their role in the rotation.

use serde::Serialize;
use tabled::Tabled;

use ssidrot_core::{
    ControllerClient, RotationList, StateStore, UnifiController, WlanRecord, WlanSession,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Role {
    Protected,
    Rotation,
    Reserve,
    Other,
}

impl Role {
    fn of(name: &str, list: Option<&RotationList>) -> Self {
        let Some(list) = list else {
            return Self::Other;
        };
        if list.is_protected(name) {
            Self::Protected
        } else if list.active().iter().any(|n| n == name) {
            Self::Rotation
        } else if list.reserve().iter().any(|n| n == name) {
            Self::Reserve
        } else {
            Self::Other
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Rotation => "rotation",
            Self::Reserve => "reserve",
            Self::Other => "-",
        }
    }
}

#[derive(Debug, Serialize)]
struct WlanView {
    id: String,
    name: String,
    role: Role,
    target: bool,
}

#[derive(Tabled)]
struct WlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SSID")]
    name: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Target")]
    target: &'static str,
}

impl From<&WlanView> for WlanRow {
    fn from(w: &WlanView) -> Self {
        Self {
            id: w.id.clone(),
            name: w.name.clone(),
            role: w.role.label(),
            target: if w.target { "yes" } else { "" },
        }
    }
}

fn build_views(
    wlans: &[WlanRecord],
    list: Option<&RotationList>,
    target_id: Option<&str>,
) -> Vec<WlanView> {
    wlans
        .iter()
        .map(|w| WlanView {
            id: w.id.clone(),
            name: w.name.clone(),
            role: Role::of(&w.name, list),
            target: target_id == Some(w.id.as_str()),
        })
        .collect()
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::rotation_settings(global, &cfg);

    // The listing is still useful when the SSID list is broken.
    let list = match RotationList::load(&settings.ssid_list_file) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::warn!("SSID list unavailable, roles not shown: {e}");
            None
        }
    };
    let state = StateStore::new(&settings.state_file).load()?;
    let target_id = state.wlan_id.or_else(|| settings.target_wlan_id.clone());

    let controller = UnifiController::new(config::controller_config(global, &cfg)?);
    let session = controller.authenticate().await?;
    let wlans = session.list_wlans().await;
    if let Err(e) = session.logout().await {
        tracing::warn!("logout failed: {e}");
    }
    let wlans = wlans?;

    let views = build_views(&wlans, list.as_ref(), target_id.as_deref());
    let out = output::render_list(
        global.output,
        &views,
        |w: &WlanView| WlanRow::from(w),
        |w| w.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
