//! CLI-specific config helpers.
//!
//! Thin layer over `ssidrot_config`: resolves the config file path with the
//! `--config` override and applies per-invocation flags on top of the
//! loaded settings.

use std::path::PathBuf;

use ssidrot_config::Config;
use ssidrot_core::{ControllerConfig, RotationSettings, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `SSIDROT_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(ssidrot_config::config_path)
}

/// Load the layered configuration (defaults, file, environment).
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    ssidrot_config::load_config_from(&path)
        .map_err(|e| CliError::from(e).with_config_path(&path))
}

/// Rotation settings with `--ssid-list` and `--state` applied.
pub fn rotation_settings(global: &GlobalOpts, cfg: &Config) -> RotationSettings {
    let mut settings = ssidrot_config::rotation_settings(&cfg.rotation);
    if let Some(ref path) = global.ssid_list {
        settings.ssid_list_file.clone_from(path);
    }
    if let Some(ref path) = global.state {
        settings.state_file.clone_from(path);
    }
    settings
}

/// Controller connection settings with the password resolved.
pub fn controller_config(global: &GlobalOpts, cfg: &Config) -> Result<ControllerConfig, CliError> {
    let path = config_path(global);
    let section = &cfg.controller;

    let password = ssidrot_config::resolve_password(section)
        .map_err(|e| CliError::from(e).with_config_path(&path))?;
    let mut controller = ssidrot_config::controller_config(section, password)
        .map_err(|e| CliError::from(e).with_config_path(&path))?;

    if global.insecure {
        controller.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(controller)
}
