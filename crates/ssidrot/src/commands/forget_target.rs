//! `ssidrot forget-target`: drop the cached WLAN id.

use ssidrot_core::StateStore;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::rotation_settings(global, &cfg);

    let store = StateStore::new(&settings.state_file);
    let _lock = store.lock()?;
    let mut state = store.load()?;

    let message = match state.wlan_id.take() {
        Some(id) => {
            store.save(&state)?;
            tracing::info!(wlan_id = %id, "forgot cached target WLAN");
            format!("Forgot WLAN {id}. The next rotation searches by name.")
        }
        None => "No WLAN id cached.".to_owned(),
    };
    output::print_output(&message, global.quiet);
    Ok(())
}
