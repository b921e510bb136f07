// ── Rotation engine ──
//
// One attempt, start to finish: lock, reload the list, authenticate,
// find the target, refuse to touch protected names, write, verify, and
// only then persist the new cursor. Every failure aborts the attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::RotationSettings;
use crate::controller::{ControllerClient, ControllerError, WlanRecord, WlanSession};
use crate::discovery;
use crate::error::RotationError;
use crate::rotation_list::RotationList;
use crate::state::{RotationState, StateStore};

/// Outcome of a successful rotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationReport {
    pub wlan_id: String,
    pub previous_name: String,
    pub new_name: String,
    /// Index of `new_name` in the active list.
    pub index: usize,
    pub total: usize,
    /// Name the following rotation will use.
    pub next_preview: String,
    pub rotated_at: DateTime<Utc>,
    /// `true` if the WLAN id was resolved during this attempt.
    pub discovered: bool,
}

/// Drives rotation attempts against a controller.
pub struct RotationEngine<C> {
    controller: C,
    settings: RotationSettings,
    store: StateStore,
}

impl<C: ControllerClient> RotationEngine<C> {
    pub fn new(controller: C, settings: RotationSettings) -> Self {
        let store = StateStore::new(settings.state_file.clone());
        Self {
            controller,
            settings,
            store,
        }
    }

    /// Run one rotation attempt.
    ///
    /// The single-flight lock is held for the whole attempt. List problems
    /// (missing, invalid, protected overlap) fail before any controller I/O.
    pub async fn rotate(&self) -> Result<RotationReport, RotationError> {
        info!("starting SSID rotation");

        let _lock = self.store.lock()?;

        let list = RotationList::load(&self.settings.ssid_list_file)?;
        let overlap = list.overlap();
        if !overlap.is_empty() {
            error!(
                "SSIDs found in both protected and rotation lists: {}",
                overlap.join(", ")
            );
            return Err(RotationError::Overlap { names: overlap });
        }

        let mut state = self.store.load()?;

        let session = self.controller.authenticate().await?;
        let result = self.rotate_in_session(&session, &list, &mut state).await;

        if let Err(e) = session.logout().await {
            warn!(error = %e, "logout failed");
        }

        let report = result?;
        info!(
            "rotation complete: '{}' -> '{}' ({}/{})",
            report.previous_name,
            report.new_name,
            report.index + 1,
            report.total
        );
        info!("next rotation will use: '{}'", report.next_preview);
        Ok(report)
    }

    async fn rotate_in_session(
        &self,
        session: &C::Session,
        list: &RotationList,
        state: &mut RotationState,
    ) -> Result<RotationReport, RotationError> {
        let (wlan_id, discovered) = match &state.wlan_id {
            Some(id) => (id.clone(), false),
            None => (self.discover(session, list).await?, true),
        };

        let current = safety_gate(session, list, &wlan_id).await?;

        let total = list.len();
        let next_index = state.next_index(total);
        let next_name = list.active()[next_index].clone();
        if list.is_protected(&next_name) {
            return Err(RotationError::SafetyViolation {
                reason: format!("next SSID '{next_name}' is in the protected list"),
            });
        }

        self.apply(session, &current, &next_name).await?;

        let rotated_at = Utc::now();
        state.current_index = next_index;
        state.wlan_id = Some(wlan_id.clone());
        state.last_rotation = Some(rotated_at);
        self.store.save(state)?;

        Ok(RotationReport {
            wlan_id,
            previous_name: current.name,
            new_name: next_name,
            index: next_index,
            total,
            next_preview: list.active()[(next_index + 1) % total].clone(),
            rotated_at,
            discovered,
        })
    }

    /// Resolve the target WLAN id when none is cached.
    async fn discover(
        &self,
        session: &C::Session,
        list: &RotationList,
    ) -> Result<String, RotationError> {
        if let Some(id) = &self.settings.target_wlan_id {
            info!(wlan_id = %id, "using configured target WLAN id");
            return Ok(id.clone());
        }

        info!("no WLAN id cached, searching by name");
        let wlans = session.list_wlans().await?;
        let strategies = discovery::plan(self.settings.seed_ssid.as_deref(), list.active());
        let (wlan, via) = discovery::resolve(&strategies, &wlans)?;

        if list.is_protected(&wlan.name) {
            return Err(RotationError::SafetyViolation {
                reason: format!(
                    "discovered WLAN {} broadcasts protected SSID '{}'",
                    wlan.id, wlan.name
                ),
            });
        }

        info!(wlan_id = %wlan.id, "found target WLAN via {via}");
        Ok(wlan.id.clone())
    }

    /// Write the new name and confirm the controller reports it back.
    async fn apply(
        &self,
        session: &C::Session,
        current: &WlanRecord,
        next_name: &str,
    ) -> Result<(), RotationError> {
        info!("updating SSID: '{}' -> '{next_name}'", current.name);
        session
            .update_wlan(&current.id, &current.renamed(next_name))
            .await
            .map_err(|e| vanished(e, &current.id))?;

        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let observed = session
            .get_wlan(&current.id)
            .await
            .map_err(|e| vanished(e, &current.id))?;
        if observed.name != next_name {
            error!(
                "verification failed: expected '{next_name}', got '{}'",
                observed.name
            );
            return Err(RotationError::VerificationFailed {
                expected: next_name.to_owned(),
                observed: observed.name,
            });
        }
        info!("SSID update verified");
        Ok(())
    }
}

/// A WLAN that disappears mid-attempt is a stale target, whatever the call.
fn vanished(err: ControllerError, wlan_id: &str) -> RotationError {
    match err {
        ControllerError::NotFound(_) => RotationError::StaleTarget {
            wlan_id: wlan_id.to_owned(),
        },
        other => other.into(),
    }
}

/// Fetch the live WLAN and refuse to proceed if it carries a protected name.
async fn safety_gate<S: WlanSession>(
    session: &S,
    list: &RotationList,
    wlan_id: &str,
) -> Result<WlanRecord, RotationError> {
    let current = session
        .get_wlan(wlan_id)
        .await
        .map_err(|e| vanished(e, wlan_id))?;

    if list.is_protected(&current.name) {
        error!(
            "safety check failed: WLAN {wlan_id} broadcasts protected SSID '{}'",
            current.name
        );
        return Err(RotationError::SafetyViolation {
            reason: format!(
                "WLAN {wlan_id} currently broadcasts protected SSID '{}'",
                current.name
            ),
        });
    }

    info!("current SSID: '{}'", current.name);
    Ok(current)
}
