//! Rotation engine for UniFi WLAN names.
//!
//! Given an operator-curated list of SSIDs, each [`RotationEngine::rotate`]
//! call advances one WLAN on the controller to the next name in the list.
//! The engine never writes a protected name, never touches a WLAN that
//! currently broadcasts one, and only persists its cursor after the
//! controller has confirmed the change.
//!
//! The controller is reached through the [`ControllerClient`] trait;
//! [`UnifiController`] implements it over `ssidrot-api`.

pub mod config;
pub mod controller;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod rotation_list;
pub mod ssid;
pub mod state;

pub use config::{ControllerConfig, PlatformHint, RotationSettings, TlsVerification};
pub use controller::{
    ControllerClient, ControllerError, UnifiController, UnifiSession, WlanRecord, WlanSession,
};
pub use discovery::DiscoveryStrategy;
pub use engine::{RotationEngine, RotationReport};
pub use error::{ErrorKind, RotationError};
pub use rotation_list::{ListWarning, RotationList, SsidListDocument, cycle_days};
pub use ssid::{NameError, SsidIssue, Strictness};
pub use state::{IndexOutOfRange, RotationLock, RotationState, StateStore};
