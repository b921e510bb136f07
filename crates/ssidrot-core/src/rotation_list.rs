// ── Rotation list ──
//
// The operator-curated name sets. Read fresh from disk at the start of
// every attempt so edits made between runs take effect on the next tick.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::RotationError;
use crate::ssid::{self, Strictness};

/// Hours between scheduled rotations, used for the cycle estimate.
pub const ROTATION_INTERVAL_HOURS: u32 = 18;

/// On-disk shape of the SSID list file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsidListDocument {
    #[serde(default)]
    pub active_rotation: Vec<String>,
    #[serde(default)]
    pub reserve_pool: Vec<String>,
    #[serde(default)]
    pub protected_ssids: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Non-fatal findings about the active list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListWarning {
    /// Only one active name: every rotation rewrites the same SSID.
    SingleEntry,
    /// Repeated names shorten the effective cycle.
    Duplicates { names: Vec<String> },
}

impl fmt::Display for ListWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleEntry => {
                f.write_str("only 1 SSID in active rotation - rotation will have no effect")
            }
            Self::Duplicates { names } => {
                write!(f, "duplicate SSIDs in active rotation: {}", names.join(", "))
            }
        }
    }
}

/// Validated rotation, reserve and protected name sets.
#[derive(Debug, Clone)]
pub struct RotationList {
    active: Vec<String>,
    reserve: Vec<String>,
    protected: Vec<String>,
    warnings: Vec<ListWarning>,
    last_updated: Option<String>,
    updated_by: Option<String>,
}

impl RotationList {
    /// Read, parse and validate the SSID list file.
    pub fn load(path: &Path) -> Result<Self, RotationError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RotationError::ConfigurationMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(RotationError::ConfigurationMalformed {
                    path: path.to_path_buf(),
                    message: format!("read failed: {e}"),
                });
            }
        };

        let doc: SsidListDocument =
            serde_json::from_str(&raw).map_err(|e| RotationError::ConfigurationMalformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let list = Self::from_document(doc)?;

        info!(
            "loaded {} SSIDs in active rotation ({:.1} days per cycle)",
            list.active.len(),
            list.cycle_days()
        );
        info!("reserve pool contains {} SSIDs", list.reserve.len());
        info!("protected SSIDs: {}", list.protected.join(", "));

        Ok(list)
    }

    /// Validate an already-parsed document.
    ///
    /// Every per-name failure across all three lists is collected into one
    /// `ValidationFailed` so the operator can fix them in a single pass.
    pub fn from_document(doc: SsidListDocument) -> Result<Self, RotationError> {
        if doc.active_rotation.is_empty() {
            return Err(RotationError::ConfigurationEmpty);
        }

        let warnings = active_warnings(&doc.active_rotation);
        for w in &warnings {
            warn!("{w}");
        }

        let mut errors = ssid::validate_list(
            "Active rotation",
            &doc.active_rotation,
            Strictness::Strict,
        );
        errors.extend(ssid::validate_list(
            "Reserve pool",
            &doc.reserve_pool,
            Strictness::Strict,
        ));
        errors.extend(ssid::validate_list(
            "Protected SSIDs",
            &doc.protected_ssids,
            Strictness::Lenient,
        ));

        if !errors.is_empty() {
            error!("SSID validation errors:");
            for e in &errors {
                error!("  - {e}");
            }
            return Err(RotationError::ValidationFailed { errors });
        }

        Ok(Self {
            active: doc.active_rotation,
            reserve: doc.reserve_pool,
            protected: doc.protected_ssids,
            warnings,
            last_updated: doc.last_updated,
            updated_by: doc.updated_by,
        })
    }

    /// Names in rotation order.
    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn reserve(&self) -> &[String] {
        &self.reserve
    }

    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    pub fn warnings(&self) -> &[ListWarning] {
        &self.warnings
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|p| p == name)
    }

    /// Names present in both the active and protected lists, sorted.
    pub fn overlap(&self) -> Vec<String> {
        let protected: HashSet<&str> = self.protected.iter().map(String::as_str).collect();
        self.active
            .iter()
            .filter(|name| protected.contains(name.as_str()))
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Days for one full pass through the active list.
    pub fn cycle_days(&self) -> f64 {
        cycle_days(self.active.len())
    }
}

/// Estimated full-cycle duration in days for `n` active names.
pub fn cycle_days(n: usize) -> f64 {
    let n = f64::from(u32::try_from(n).unwrap_or(u32::MAX));
    n * f64::from(ROTATION_INTERVAL_HOURS) / 24.0
}

fn active_warnings(active: &[String]) -> Vec<ListWarning> {
    let mut warnings = Vec::new();
    if active.len() == 1 {
        warnings.push(ListWarning::SingleEntry);
    }

    let mut seen = HashSet::new();
    let dupes: BTreeSet<&str> = active
        .iter()
        .filter(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
        .collect();
    if !dupes.is_empty() {
        warnings.push(ListWarning::Duplicates {
            names: dupes.into_iter().map(String::from).collect(),
        });
    }
    warnings
}
