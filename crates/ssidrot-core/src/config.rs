// ── Runtime configuration ──
//
// These types describe how to reach the controller and where the rotation
// files live. They carry credential data and tuning, but never read a
// config file themselves: the CLI builds them and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default wait between the WLAN write and the verification read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Which controller flavour to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformHint {
    /// Probe the login endpoints on connect.
    #[default]
    Auto,
    UnifiOs,
    Classic,
}

/// Connection settings for a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Site to operate on (defaults to "default").
    pub site: String,
    pub platform: PlatformHint,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Where the rotation files live and how the target WLAN is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSettings {
    /// JSON document with `active_rotation`, `reserve_pool`, `protected_ssids`.
    pub ssid_list_file: PathBuf,
    /// JSON rotation cursor owned by the engine.
    pub state_file: PathBuf,
    /// SSID the target WLAN is expected to carry before the first rotation.
    pub seed_ssid: Option<String>,
    /// Skip discovery and use this WLAN id when no id is cached yet.
    pub target_wlan_id: Option<String>,
    /// Wait between the write and the verification read.
    pub settle_delay: Duration,
}

impl RotationSettings {
    pub fn new(ssid_list_file: impl Into<PathBuf>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            ssid_list_file: ssid_list_file.into(),
            state_file: state_file.into(),
            seed_ssid: None,
            target_wlan_id: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
