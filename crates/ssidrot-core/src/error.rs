// ── Rotation error types ──
//
// One variant per way a rotation attempt can end early. Every failure
// aborts the attempt; nothing is retried in-process. `ErrorKind` gives
// callers a stable tag to branch on (retry on the next tick vs. page an
// operator) without matching on messages.

use std::path::PathBuf;

use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

use crate::controller::ControllerError;
use crate::ssid::NameError;

/// Stable, message-free classification of a [`RotationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    ConfigurationMissing,
    ConfigurationMalformed,
    ConfigurationEmpty,
    ValidationFailed,
    Overlap,
    TargetNotFound,
    StaleTarget,
    SafetyViolation,
    VerificationFailed,
    Persistence,
    RotationInProgress,
    Authentication,
    ControllerUnavailable,
    ControllerRejected,
}

impl ErrorKind {
    /// Safe to try again on the next scheduled tick without operator action.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ControllerUnavailable | Self::RotationInProgress)
    }

    /// Points at configuration or controller state an operator has to fix.
    pub fn is_operator_actionable(self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing
                | Self::ConfigurationMalformed
                | Self::ConfigurationEmpty
                | Self::ValidationFailed
                | Self::Overlap
                | Self::TargetNotFound
                | Self::StaleTarget
                | Self::SafetyViolation
                | Self::Authentication
        )
    }
}

/// Why a rotation attempt (or one of its building blocks) failed.
#[derive(Debug, Error)]
pub enum RotationError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("SSID list file not found: {}", .path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("SSID list file {} is not valid: {message}", .path.display())]
    ConfigurationMalformed { path: PathBuf, message: String },

    #[error("Active rotation list is empty - add SSIDs before rotating")]
    ConfigurationEmpty,

    #[error("SSID validation failed with {} error(s)", .errors.len())]
    ValidationFailed { errors: Vec<NameError> },

    #[error(
        "SSIDs appear in both the protected and rotation lists: {}",
        .names.join(", ")
    )]
    Overlap { names: Vec<String> },

    // ── Target resolution ────────────────────────────────────────────
    #[error(
        "Could not find a WLAN named {} (available SSIDs: {})",
        .tried.join(" / "),
        .available.join(", ")
    )]
    TargetNotFound {
        tried: Vec<String>,
        available: Vec<String>,
    },

    #[error("Cached WLAN id {wlan_id} no longer exists on the controller")]
    StaleTarget { wlan_id: String },

    // ── Safety ───────────────────────────────────────────────────────
    #[error("Safety check failed: {reason}")]
    SafetyViolation { reason: String },

    #[error("SSID update verification failed: expected '{expected}', controller shows '{observed}'")]
    VerificationFailed { expected: String, observed: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Failed to {action} rotation state at {}: {source}", .path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Another rotation attempt holds {}", .lock_path.display())]
    RotationInProgress { lock_path: PathBuf },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Controller unavailable: {message}")]
    ControllerUnavailable { message: String },

    #[error("Controller rejected the request: {message}")]
    ControllerRejected { message: String },
}

impl RotationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::ConfigurationMalformed { .. } => ErrorKind::ConfigurationMalformed,
            Self::ConfigurationEmpty => ErrorKind::ConfigurationEmpty,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::Overlap { .. } => ErrorKind::Overlap,
            Self::TargetNotFound { .. } => ErrorKind::TargetNotFound,
            Self::StaleTarget { .. } => ErrorKind::StaleTarget,
            Self::SafetyViolation { .. } => ErrorKind::SafetyViolation,
            Self::VerificationFailed { .. } => ErrorKind::VerificationFailed,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::RotationInProgress { .. } => ErrorKind::RotationInProgress,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::ControllerUnavailable { .. } => ErrorKind::ControllerUnavailable,
            Self::ControllerRejected { .. } => ErrorKind::ControllerRejected,
        }
    }

    pub(crate) fn persistence(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Persistence {
            action,
            path: path.into(),
            source,
        }
    }
}

// ── Conversion from controller errors ────────────────────────────────

impl From<ControllerError> for RotationError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Authentication(message) => Self::Authentication { message },
            ControllerError::Unavailable(message) => Self::ControllerUnavailable { message },
            ControllerError::NotFound(resource) => Self::ControllerRejected {
                message: format!("not found: {resource}"),
            },
            ControllerError::Rejected(message) => Self::ControllerRejected { message },
        }
    }
}
