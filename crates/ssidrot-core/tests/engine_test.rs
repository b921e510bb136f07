#![allow(clippy::unwrap_used)]
// Integration tests for `RotationEngine` against an in-memory controller
// and, once, against a wiremock-backed UniFi controller.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use ssidrot_core::{
    ControllerClient, ControllerError, ErrorKind, RotationEngine, RotationError, RotationSettings,
    RotationState, StateStore, WlanRecord, WlanSession,
};

// ── Fake controller ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Authenticate,
    List,
    Get(String),
    Update(String, String),
    Logout,
}

#[derive(Default)]
struct FakeInner {
    wlans: Vec<WlanRecord>,
    calls: Vec<Call>,
    /// When each entry in `calls` happened, on the tokio clock.
    stamps: Vec<Instant>,
    reject_login: bool,
    /// Accept PUTs but keep serving the old name.
    ignore_updates: bool,
    /// Delete the WLAN right after accepting a PUT.
    vanish_on_update: bool,
    /// Runs after every accepted PUT.
    on_update: Option<Box<dyn Fn() + Send>>,
}

#[derive(Clone, Default)]
struct FakeController {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeController {
    fn with_wlans(wlans: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        fake.inner.lock().unwrap().wlans = wlans
            .iter()
            .map(|(id, name)| WlanRecord {
                id: (*id).into(),
                name: (*name).into(),
                payload: json!({ "security": "wpapsk", "vlan": 20 })
                    .as_object()
                    .unwrap()
                    .clone(),
            })
            .collect();
        fake
    }

    fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn updates(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(id, name) => Some((id, name)),
                _ => None,
            })
            .collect()
    }

    fn name_of(&self, id: &str) -> String {
        let inner = self.inner.lock().unwrap();
        inner.wlans.iter().find(|w| w.id == id).unwrap().name.clone()
    }

    fn stamps(&self) -> Vec<(Call, Instant)> {
        let inner = self.inner.lock().unwrap();
        inner.calls.iter().cloned().zip(inner.stamps.iter().copied()).collect()
    }

    fn record(&self, call: Call) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        inner.stamps.push(Instant::now());
    }
}

impl ControllerClient for FakeController {
    type Session = Self;

    async fn authenticate(&self) -> Result<Self, ControllerError> {
        self.record(Call::Authenticate);
        if self.inner.lock().unwrap().reject_login {
            return Err(ControllerError::Authentication("invalid credentials".into()));
        }
        Ok(self.clone())
    }
}

impl WlanSession for FakeController {
    async fn list_wlans(&self) -> Result<Vec<WlanRecord>, ControllerError> {
        self.record(Call::List);
        Ok(self.inner.lock().unwrap().wlans.clone())
    }

    async fn get_wlan(&self, id: &str) -> Result<WlanRecord, ControllerError> {
        self.record(Call::Get(id.into()));
        let inner = self.inner.lock().unwrap();
        inner
            .wlans
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| ControllerError::NotFound(format!("wlanconf/{id}")))
    }

    async fn update_wlan(
        &self,
        id: &str,
        record: &WlanRecord,
    ) -> Result<WlanRecord, ControllerError> {
        self.record(Call::Update(id.into(), record.name.clone()));
        let mut inner = self.inner.lock().unwrap();
        let ignore = inner.ignore_updates;
        let wlan = inner
            .wlans
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| ControllerError::NotFound(format!("wlanconf/{id}")))?;
        // Full-record writes only: everything but the name must come back intact.
        assert_eq!(wlan.payload, record.payload);
        if !ignore {
            *wlan = record.clone();
        }
        let written = wlan.clone();
        if inner.vanish_on_update {
            inner.wlans.retain(|w| w.id != id);
        }
        if let Some(hook) = &inner.on_update {
            hook();
        }
        Ok(written)
    }

    async fn logout(&self) -> Result<(), ControllerError> {
        self.record(Call::Logout);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn write_list(dir: &Path, active: &[&str], protected: &[&str]) {
    std::fs::write(
        dir.join("ssid_list.json"),
        serde_json::to_string_pretty(&json!({
            "active_rotation": active,
            "reserve_pool": ["Spare"],
            "protected_ssids": protected,
        }))
        .unwrap(),
    )
    .unwrap();
}

fn settings(dir: &Path) -> RotationSettings {
    let mut settings =
        RotationSettings::new(dir.join("ssid_list.json"), dir.join("state.json"));
    settings.settle_delay = Duration::ZERO;
    settings
}

fn seed_state(dir: &Path, index: usize, wlan_id: Option<&str>) {
    let state = RotationState {
        current_index: index,
        wlan_id: wlan_id.map(String::from),
        ..RotationState::default()
    };
    StateStore::new(dir.join("state.json")).save(&state).unwrap();
}

fn load_state(dir: &Path) -> RotationState {
    StateStore::new(dir.join("state.json")).load().unwrap()
}

fn setup(active: &[&str], protected: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_list(dir.path(), active, protected);
    dir
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_rotates_a_to_b_and_persists() {
    let dir = setup(&["A", "B", "C"], &["P"]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A"), ("id2", "P")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let report = engine.rotate().await.unwrap();

    assert_eq!(report.wlan_id, "id1");
    assert_eq!(report.previous_name, "A");
    assert_eq!(report.new_name, "B");
    assert_eq!(report.index, 1);
    assert_eq!(report.total, 3);
    assert_eq!(report.next_preview, "C");
    assert!(!report.discovered);

    assert_eq!(fake.name_of("id1"), "B");
    assert_eq!(fake.name_of("id2"), "P");

    let state = load_state(dir.path());
    assert_eq!(state.current_index, 1);
    assert_eq!(state.wlan_id.as_deref(), Some("id1"));
    assert_eq!(state.last_rotation, Some(report.rotated_at));

    assert_eq!(
        fake.calls(),
        vec![
            Call::Authenticate,
            Call::Get("id1".into()),
            Call::Update("id1".into(), "B".into()),
            Call::Get("id1".into()),
            Call::Logout,
        ]
    );
}

#[tokio::test]
async fn test_full_cycle_returns_to_start() {
    let dir = setup(&["A", "B", "C", "D"], &["P"]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(engine.rotate().await.unwrap().new_name);
    }

    assert_eq!(seen, vec!["B", "C", "D", "A"]);
    assert_eq!(load_state(dir.path()).current_index, 0);
    assert_eq!(fake.name_of("id1"), "A");
}

#[tokio::test]
async fn test_single_entry_rewrites_same_name() {
    let dir = setup(&["Solo"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "Solo")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let report = engine.rotate().await.unwrap();
    assert_eq!(report.index, 0);
    assert_eq!(report.new_name, "Solo");
    assert_eq!(report.next_preview, "Solo");
    assert_eq!(fake.updates(), vec![("id1".into(), "Solo".into())]);
}

#[tokio::test]
async fn test_staging_fields_survive_rotation() {
    let dir = setup(&["A", "B", "C"], &[]);
    let store = StateStore::new(dir.path().join("state.json"));
    let mut state = RotationState {
        wlan_id: Some("id1".into()),
        ..RotationState::default()
    };
    state
        .stage_next(2, 3, chrono::Utc::now())
        .unwrap();
    state.extra.insert("note".into(), json!("hands off"));
    store.save(&state).unwrap();

    let fake = FakeController::with_wlans(&[("id1", "B")]);
    let engine = RotationEngine::new(fake, settings(dir.path()));
    let report = engine.rotate().await.unwrap();
    assert_eq!(report.new_name, "C");

    let after = load_state(dir.path());
    assert_eq!(after.current_index, 2);
    assert_eq!(after.staged_by_user, Some(true));
    assert_eq!(after.staged_at, state.staged_at);
    assert_eq!(after.extra.get("note"), Some(&json!("hands off")));
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovers_by_seed_then_caches_id() {
    let dir = setup(&["A", "B", "C"], &["Home"]);
    let fake = FakeController::with_wlans(&[("home", "Home"), ("w9", "Initial")]);
    let mut settings = settings(dir.path());
    settings.seed_ssid = Some("Initial".into());
    let engine = RotationEngine::new(fake.clone(), settings);

    let report = engine.rotate().await.unwrap();
    assert!(report.discovered);
    assert_eq!(report.wlan_id, "w9");
    assert_eq!(report.previous_name, "Initial");
    assert_eq!(report.new_name, "B");
    assert_eq!(load_state(dir.path()).wlan_id.as_deref(), Some("w9"));

    let report = engine.rotate().await.unwrap();
    assert!(!report.discovered);
    assert_eq!(report.new_name, "C");
    assert_eq!(
        fake.calls().iter().filter(|c| **c == Call::List).count(),
        1,
        "listing happens only while no id is cached"
    );
}

#[tokio::test]
async fn test_discovery_falls_back_to_active_names() {
    let dir = setup(&["A", "B", "C"], &[]);
    let fake = FakeController::with_wlans(&[("guest", "Guest"), ("w2", "C")]);
    let mut settings = settings(dir.path());
    settings.seed_ssid = Some("Initial".into());
    let engine = RotationEngine::new(fake.clone(), settings);

    let report = engine.rotate().await.unwrap();
    assert_eq!(report.wlan_id, "w2");
    assert_eq!(fake.name_of("w2"), "B");
    assert_eq!(fake.name_of("guest"), "Guest");
}

#[tokio::test]
async fn test_discovery_failure_lists_available_names() {
    let dir = setup(&["A", "B"], &[]);
    let fake = FakeController::with_wlans(&[("w1", "Guest"), ("w2", "Office")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    let RotationError::TargetNotFound { tried, available } = &err else {
        panic!("expected TargetNotFound, got {err:?}");
    };
    assert_eq!(tried, &vec!["A".to_owned(), "B".to_owned()]);
    assert_eq!(available, &vec!["Guest".to_owned(), "Office".to_owned()]);
    assert!(fake.updates().is_empty());
    assert_eq!(fake.calls().last(), Some(&Call::Logout));
}

#[tokio::test]
async fn test_configured_target_id_skips_listing() {
    let dir = setup(&["A", "B"], &[]);
    let fake = FakeController::with_wlans(&[("pinned", "A")]);
    let mut settings = settings(dir.path());
    settings.target_wlan_id = Some("pinned".into());
    let engine = RotationEngine::new(fake.clone(), settings);

    let report = engine.rotate().await.unwrap();
    assert_eq!(report.wlan_id, "pinned");
    assert!(!fake.calls().contains(&Call::List));
}

// ── Safety ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_protected_live_name_blocks_write() {
    let dir = setup(&["A", "B"], &["Home"]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "Home")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SafetyViolation);
    assert!(fake.updates().is_empty());
    assert_eq!(fake.name_of("id1"), "Home");
    assert_eq!(load_state(dir.path()).current_index, 0);
}

#[tokio::test]
async fn test_discovered_protected_wlan_is_refused() {
    // A name can match discovery yet still be protected when the seed is
    // misconfigured to a protected network.
    let dir = setup(&["A", "B"], &["Home"]);
    let fake = FakeController::with_wlans(&[("home", "Home")]);
    let mut settings = settings(dir.path());
    settings.seed_ssid = Some("Home".into());
    let engine = RotationEngine::new(fake.clone(), settings);

    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SafetyViolation);
    assert!(fake.updates().is_empty());
}

#[tokio::test]
async fn test_overlap_fails_before_controller_io() {
    let dir = setup(&["A", "Home", "B"], &["Home"]);
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    let RotationError::Overlap { names } = &err else {
        panic!("expected Overlap, got {err:?}");
    };
    assert_eq!(names, &vec!["Home".to_owned()]);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_list_fails_before_controller_io() {
    let dir = setup(&["A", "", "B\tC"], &[]);
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    let RotationError::ValidationFailed { errors } = &err else {
        panic!("expected ValidationFailed, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_missing_list_file() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeController::default();
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
    assert!(fake.calls().is_empty());
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_verification_failure_leaves_state_unchanged() {
    let dir = setup(&["A", "B", "C"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    fake.inner.lock().unwrap().ignore_updates = true;
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    let RotationError::VerificationFailed { expected, observed } = &err else {
        panic!("expected VerificationFailed, got {err:?}");
    };
    assert_eq!(expected, "B");
    assert_eq!(observed, "A");

    let state = load_state(dir.path());
    assert_eq!(state.current_index, 0);
    assert_eq!(state.last_rotation, None);
    assert_eq!(fake.calls().last(), Some(&Call::Logout));
}

#[tokio::test]
async fn test_stale_cached_id_is_not_rediscovered() {
    let dir = setup(&["A", "B"], &[]);
    seed_state(dir.path(), 0, Some("gone"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert!(matches!(&err, RotationError::StaleTarget { wlan_id } if wlan_id == "gone"));
    assert!(!fake.calls().contains(&Call::List));
    assert!(fake.updates().is_empty());
}

#[tokio::test]
async fn test_authentication_failure() {
    let dir = setup(&["A", "B"], &[]);
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    fake.inner.lock().unwrap().reject_login = true;
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(fake.calls(), vec![Call::Authenticate]);
    assert!(!dir.path().join("state.json").exists());
}

#[tokio::test]
async fn test_concurrent_attempt_fails_fast() {
    let dir = setup(&["A", "B"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let held = StateStore::new(dir.path().join("state.json")).lock().unwrap();
    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RotationInProgress);
    assert!(err.kind().is_retryable());
    assert!(fake.calls().is_empty());

    drop(held);
    assert_eq!(engine.rotate().await.unwrap().new_name, "B");
}

#[tokio::test]
async fn test_commit_failure_after_verified_write() {
    let dir = setup(&["A", "B", "C"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    // Put a directory where the state file lives so the final rename fails.
    let state_path = dir.path().join("state.json");
    fake.inner.lock().unwrap().on_update = Some(Box::new(move || {
        std::fs::remove_file(&state_path).unwrap();
        std::fs::create_dir(&state_path).unwrap();
    }));
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(matches!(&err, RotationError::Persistence { .. }));

    // The controller took the write and it verified; only the commit failed.
    assert_eq!(fake.name_of("id1"), "B");
    assert_eq!(
        fake.calls(),
        vec![
            Call::Authenticate,
            Call::Get("id1".into()),
            Call::Update("id1".into(), "B".into()),
            Call::Get("id1".into()),
            Call::Logout,
        ]
    );
}

#[tokio::test]
async fn test_wlan_deleted_mid_rotation_is_stale_target() {
    let dir = setup(&["A", "B", "C"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    fake.inner.lock().unwrap().vanish_on_update = true;
    let engine = RotationEngine::new(fake.clone(), settings(dir.path()));

    let err = engine.rotate().await.unwrap_err();
    assert!(matches!(&err, RotationError::StaleTarget { wlan_id } if wlan_id == "id1"));

    let state = load_state(dir.path());
    assert_eq!(state.current_index, 0);
    assert_eq!(state.last_rotation, None);
    assert_eq!(fake.calls().last(), Some(&Call::Logout));
}

#[tokio::test(start_paused = true)]
async fn test_read_back_waits_for_settle_delay() {
    let dir = setup(&["A", "B"], &[]);
    seed_state(dir.path(), 0, Some("id1"));
    let fake = FakeController::with_wlans(&[("id1", "A")]);
    let mut settings = settings(dir.path());
    settings.settle_delay = Duration::from_secs(5);
    let engine = RotationEngine::new(fake.clone(), settings);

    engine.rotate().await.unwrap();

    let stamps = fake.stamps();
    let updated_at = stamps
        .iter()
        .find(|(c, _)| matches!(c, Call::Update(..)))
        .map(|(_, at)| *at)
        .unwrap();
    let (last_get, read_at) = stamps
        .iter()
        .rev()
        .find(|(c, _)| matches!(c, Call::Get(_)))
        .cloned()
        .unwrap();
    assert_eq!(last_get, Call::Get("id1".into()));
    assert!(read_at.duration_since(updated_at) >= Duration::from_secs(5));
}

// ── Against a mock UniFi controller ─────────────────────────────────

mod unifi {
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use ssidrot_core::{ControllerConfig, PlatformHint, TlsVerification, UnifiController};

    use super::*;

    fn wlan_json(name: &str) -> serde_json::Value {
        json!({
            "_id": "id1",
            "name": name,
            "security": "wpapsk",
            "x_passphrase": "correct horse",
            "vlan": 20
        })
    }

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-CSRF-Token", "tok")
                    .set_body_json(json!({})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/s/default/rest/wlanconf/id1"))
            .respond_with(ok(json!([wlan_json("A")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/s/default/rest/wlanconf/id1"))
            .and(header("X-CSRF-Token", "tok"))
            .and(body_partial_json(wlan_json("B")))
            .respond_with(ok(json!([wlan_json("B")])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/s/default/rest/wlanconf/id1"))
            .respond_with(ok(json!([wlan_json("B")])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = setup(&["A", "B", "C"], &["P"]);
        seed_state(dir.path(), 0, Some("id1"));

        let controller = UnifiController::new(ControllerConfig {
            url: Url::parse(&server.uri()).unwrap(),
            username: "admin".into(),
            password: SecretString::from("secret".to_owned()),
            site: "default".into(),
            platform: PlatformHint::Classic,
            tls: TlsVerification::DangerAcceptInvalid,
            timeout: Duration::from_secs(5),
        });
        let engine = RotationEngine::new(controller, settings(dir.path()));

        let report = engine.rotate().await.unwrap();
        assert_eq!(report.previous_name, "A");
        assert_eq!(report.new_name, "B");

        let state = load_state(dir.path());
        assert_eq!(state.current_index, 1);
        assert_eq!(state.wlan_id.as_deref(), Some("id1"));
    }

    #[tokio::test]
    async fn test_bad_credentials_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
            .mount(&server)
            .await;

        let dir = setup(&["A", "B"], &[]);
        let controller = UnifiController::new(ControllerConfig {
            url: Url::parse(&server.uri()).unwrap(),
            username: "admin".into(),
            password: SecretString::from("wrong".to_owned()),
            site: "default".into(),
            platform: PlatformHint::Classic,
            tls: TlsVerification::DangerAcceptInvalid,
            timeout: Duration::from_secs(5),
        });
        let engine = RotationEngine::new(controller, settings(dir.path()));

        let err = engine.rotate().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
}
