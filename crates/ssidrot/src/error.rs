//! CLI error types with miette diagnostics.
//!
//! Maps `RotationError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ssidrot_config::ConfigError;
use ssidrot_core::{ControllerError, RotationError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const SAFETY: i32 = 10;
    pub const VERIFICATION: i32 = 11;
    pub const PERSISTENCE: i32 = 12;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── SSID list ────────────────────────────────────────────────────
    #[error("SSID list file not found: {path}")]
    #[diagnostic(
        code(ssidrot::list_missing),
        help(
            "Create the file, or point rotation.ssid_list_file (or --ssid-list) at it.\n\
             Expected keys: active_rotation, reserve_pool, protected_ssids"
        )
    )]
    ListMissing { path: String },

    #[error("{message}")]
    #[diagnostic(
        code(ssidrot::list_invalid),
        help("Fix the SSID list file. Run: ssidrot validate")
    )]
    ListInvalid { message: String },

    #[error("SSID validation failed with {count} error(s){details}")]
    #[diagnostic(
        code(ssidrot::validation_failed),
        help("Run: ssidrot validate  (shows a suggested fix for each name)")
    )]
    ValidationFailed { count: usize, details: String },

    #[error("SSIDs appear in both the protected and rotation lists: {names}")]
    #[diagnostic(
        code(ssidrot::overlap),
        help("A name may be protected or rotated, never both. Remove it from one list.")
    )]
    Overlap { names: String },

    // ── Target ───────────────────────────────────────────────────────
    #[error("Could not find the target WLAN (tried: {tried})")]
    #[diagnostic(
        code(ssidrot::target_not_found),
        help(
            "SSIDs on the controller: {available}\n\
             Set rotation.seed_ssid to the WLAN's current name or pin rotation.target_wlan_id.\n\
             Run: ssidrot wlans"
        )
    )]
    TargetNotFound { tried: String, available: String },

    #[error("Cached WLAN id {wlan_id} no longer exists on the controller")]
    #[diagnostic(
        code(ssidrot::stale_target),
        help("Run: ssidrot forget-target  (the next rotation searches by name again)")
    )]
    StaleTarget { wlan_id: String },

    // ── Safety ───────────────────────────────────────────────────────
    #[error("Safety check failed: {reason}")]
    #[diagnostic(
        code(ssidrot::safety_violation),
        help("No change was made. Check the protected list and the cached target WLAN.")
    )]
    SafetyViolation { reason: String },

    #[error("SSID update verification failed: expected '{expected}', controller shows '{observed}'")]
    #[diagnostic(
        code(ssidrot::verification_failed),
        help("Rotation state was not advanced. Inspect the WLAN on the controller.")
    )]
    VerificationFailed { expected: String, observed: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(ssidrot::persistence),
        help("Check permissions on the state file and its directory.")
    )]
    Persistence { message: String },

    #[error("Another rotation is in progress (lock held on {lock_path})")]
    #[diagnostic(
        code(ssidrot::in_progress),
        help("Wait for the other run to finish. The next scheduled run will retry.")
    )]
    InProgress { lock_path: String },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ssidrot::auth_failed),
        help(
            "Verify controller.username and the password.\n\
             Run: ssidrot config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Could not reach the controller: {message}")]
    #[diagnostic(
        code(ssidrot::connection_failed),
        help(
            "Check that the controller is running and controller.url is correct.\n\
             Self-signed certificate? Use --insecure (-k) or configure ca_cert."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Controller rejected the request: {message}")]
    #[diagnostic(code(ssidrot::api_error))]
    Rejected { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(ssidrot::no_config),
        help(
            "Set it in the config file or via SSIDROT_<SECTION>__<KEY>.\n\
             Config file: {path}"
        )
    )]
    NoConfig { field: String, path: String },

    #[error("No password configured for {account}")]
    #[diagnostic(
        code(ssidrot::no_credentials),
        help(
            "Run: ssidrot config set-password\n\
             Or set the SSIDROT_PASSWORD environment variable."
        )
    )]
    NoCredentials { account: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(ssidrot::config))]
    Config { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ssidrot::validation))]
    Validation { field: String, reason: String },

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ListMissing { .. } | Self::TargetNotFound { .. } | Self::StaleTarget { .. } => {
                exit_code::NOT_FOUND
            }
            Self::ListInvalid { .. }
            | Self::ValidationFailed { .. }
            | Self::Overlap { .. }
            | Self::NoConfig { .. }
            | Self::Validation { .. } => exit_code::USAGE,
            Self::SafetyViolation { .. } => exit_code::SAFETY,
            Self::VerificationFailed { .. } => exit_code::VERIFICATION,
            Self::Persistence { .. } => exit_code::PERSISTENCE,
            Self::InProgress { .. } => exit_code::CONFLICT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Rejected { .. } | Self::Config { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the config file path to a missing-setting error.
    pub fn with_config_path(self, config_path: &std::path::Path) -> Self {
        match self {
            Self::NoConfig { field, .. } => Self::NoConfig {
                field,
                path: config_path.display().to_string(),
            },
            other => other,
        }
    }
}

// ── RotationError → CliError mapping ─────────────────────────────────

impl From<RotationError> for CliError {
    fn from(err: RotationError) -> Self {
        match err {
            RotationError::ConfigurationMissing { path } => Self::ListMissing {
                path: path.display().to_string(),
            },
            e @ (RotationError::ConfigurationMalformed { .. }
            | RotationError::ConfigurationEmpty) => Self::ListInvalid {
                message: e.to_string(),
            },
            RotationError::ValidationFailed { errors } => Self::ValidationFailed {
                count: errors.len(),
                details: errors.iter().map(|e| format!("\n  - {e}")).collect(),
            },
            RotationError::Overlap { names } => Self::Overlap {
                names: names.join(", "),
            },
            RotationError::TargetNotFound { tried, available } => Self::TargetNotFound {
                tried: tried.join(", "),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            RotationError::StaleTarget { wlan_id } => Self::StaleTarget { wlan_id },
            RotationError::SafetyViolation { reason } => Self::SafetyViolation { reason },
            RotationError::VerificationFailed { expected, observed } => {
                Self::VerificationFailed { expected, observed }
            }
            e @ RotationError::Persistence { .. } => Self::Persistence {
                message: e.to_string(),
            },
            RotationError::RotationInProgress { lock_path } => Self::InProgress {
                lock_path: lock_path.display().to_string(),
            },
            RotationError::Authentication { message } => Self::AuthFailed { message },
            RotationError::ControllerUnavailable { message } => {
                Self::ConnectionFailed { message }
            }
            RotationError::ControllerRejected { message } => Self::Rejected { message },
        }
    }
}

impl From<ControllerError> for CliError {
    fn from(err: ControllerError) -> Self {
        RotationError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field } => Self::NoConfig {
                field,
                path: String::new(),
            },
            ConfigError::NoCredentials { account } => Self::NoCredentials { account },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
