//! Configuration for the ssidrot CLI.
//!
//! A single TOML file with `[controller]` and `[rotation]` sections,
//! `SSIDROT_`-prefixed environment overrides, credential resolution
//! (env + keyring + plaintext), and translation to the
//! `ssidrot_core` runtime types. The core crate never reads files itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ssidrot_core::{ControllerConfig, PlatformHint, RotationSettings, TlsVerification};

/// Environment variable consulted for the controller password.
pub const PASSWORD_ENV: &str = "SSIDROT_PASSWORD";

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "ssidrot";

const ENV_PREFIX: &str = "SSIDROT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing required setting '{field}'")]
    Missing { field: String },

    #[error("no password configured for {account}")]
    NoCredentials { account: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerSection,

    #[serde(default)]
    pub rotation: RotationSection,
}

/// `[controller]`: how to reach and authenticate with the controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSection {
    /// Controller base URL (e.g., "https://192.168.1.1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_site")]
    pub site: String,

    /// "auto", "unifi-os" or "classic".
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or an environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            url: None,
            site: default_site(),
            platform: default_platform(),
            username: None,
            password: None,
            password_env: None,
            insecure: None,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

/// `[rotation]`: where the lists and state live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationSection {
    #[serde(default = "default_ssid_list_file")]
    pub ssid_list_file: PathBuf,

    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_ssid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_wlan_id: Option<String>,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for RotationSection {
    fn default() -> Self {
        Self {
            ssid_list_file: default_ssid_list_file(),
            state_file: default_state_file(),
            seed_ssid: None,
            target_wlan_id: None,
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_site() -> String {
    "default".into()
}
fn default_platform() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_ssid_list_file() -> PathBuf {
    PathBuf::from("/var/lib/ssid_rotator/ssid_list.json")
}
fn default_state_file() -> PathBuf {
    PathBuf::from("/var/lib/ssid_rotator/state.json")
}
fn default_settle_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Copy with the plaintext password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.controller.password.is_some() {
            cfg.controller.password = Some("********".into());
        }
        cfg
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ssidrot", "ssidrot").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ssidrot");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` (missing file is fine) merged with the
/// environment. Nested keys use a double underscore:
/// `SSIDROT_ROTATION__STATE_FILE=/tmp/state.json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Keyring account for a controller login: `<username>@<host>`.
pub fn keyring_account(section: &ControllerSection) -> Result<String, ConfigError> {
    let username = section.username.as_deref().ok_or_else(|| ConfigError::Missing {
        field: "controller.username".into(),
    })?;
    let url = parse_url(section)?;
    Ok(format!(
        "{username}@{}",
        url.host_str().unwrap_or("localhost")
    ))
}

/// Resolve the controller password.
///
/// Order: the variable named by `password_env`, then `SSIDROT_PASSWORD`,
/// then the system keyring, then the plaintext `password` field.
pub fn resolve_password(section: &ControllerSection) -> Result<SecretString, ConfigError> {
    let account = keyring_account(section)?;
    resolve_password_from(
        section,
        &account,
        |name| std::env::var(name).ok(),
        |account| {
            keyring::Entry::new(KEYRING_SERVICE, account)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_from(
    section: &ControllerSection,
    account: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Configured env var
    if let Some(val) = section.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    // 2. Well-known env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. Keyring
    if let Some(val) = keyring(account) {
        return Ok(SecretString::from(val));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = section.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        account: account.into(),
    })
}

/// Store the controller password in the system keyring.
pub fn store_password(
    section: &ControllerSection,
    password: &SecretString,
) -> Result<String, ConfigError> {
    let account = keyring_account(section)?;
    keyring::Entry::new(KEYRING_SERVICE, &account)
        .and_then(|entry| entry.set_password(password.expose_secret()))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    Ok(account)
}

// ── Translation to runtime types ────────────────────────────────────

fn parse_url(section: &ControllerSection) -> Result<url::Url, ConfigError> {
    let raw = section.url.as_deref().ok_or_else(|| ConfigError::Missing {
        field: "controller.url".into(),
    })?;
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "controller.url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Parse the `platform` setting.
pub fn parse_platform(raw: &str) -> Result<PlatformHint, ConfigError> {
    match raw {
        "auto" => Ok(PlatformHint::Auto),
        "unifi-os" => Ok(PlatformHint::UnifiOs),
        "classic" => Ok(PlatformHint::Classic),
        other => Err(ConfigError::Validation {
            field: "controller.platform".into(),
            reason: format!("expected 'auto', 'unifi-os', or 'classic', got '{other}'"),
        }),
    }
}

/// TLS mode: explicit `insecure` wins, then a custom CA, then an explicit
/// `insecure = false` means the system store. Unset defaults to accepting
/// self-signed certificates, which is what local controllers ship with.
pub fn tls_verification(section: &ControllerSection) -> TlsVerification {
    match (section.insecure, &section.ca_cert) {
        (Some(true), _) | (None, None) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca)) => TlsVerification::CustomCa(ca.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
    }
}

/// Build a `ControllerConfig` with an already-resolved password.
pub fn controller_config(
    section: &ControllerSection,
    password: SecretString,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_url(section)?;
    let username = section.username.clone().ok_or_else(|| ConfigError::Missing {
        field: "controller.username".into(),
    })?;

    Ok(ControllerConfig {
        url,
        username,
        password,
        site: section.site.clone(),
        platform: parse_platform(&section.platform)?,
        tls: tls_verification(section),
        timeout: Duration::from_secs(section.timeout),
    })
}

/// Build `RotationSettings` from the `[rotation]` section.
pub fn rotation_settings(section: &RotationSection) -> RotationSettings {
    let mut settings =
        RotationSettings::new(section.ssid_list_file.clone(), section.state_file.clone());
    settings.seed_ssid.clone_from(&section.seed_ssid);
    settings.target_wlan_id.clone_from(&section.target_wlan_id);
    settings.settle_delay = Duration::from_millis(section.settle_delay_ms);
    settings
}
