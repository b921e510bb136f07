// ── Rotation state ──
//
// The persisted cursor. `current_index` always names the SSID that is
// live on the controller right now, not the next one. Writes go through
// a temp file + rename so a concurrent reader sees either the old or the
// new document, and a sibling `.lock` file serializes whole attempts.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::RotationError;

/// Persisted rotation cursor.
///
/// Unknown fields written by other tools are preserved across a
/// load/save cycle, as are the staging fields the engine never writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub wlan_id: Option<String>,
    #[serde(
        default,
        with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_rotation: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_by_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Staging target outside the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} is out of range: active rotation has {len} entries")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

impl RotationState {
    /// Index the next rotation will move to, for a list of `len` names.
    ///
    /// `len` must be non-zero; the loader rejects empty lists. A stored
    /// index past the end (hand-edited, or the list shrank) is reduced
    /// first so it cannot overflow.
    pub fn next_index(&self, len: usize) -> usize {
        let len = len.max(1);
        (self.current_index % len + 1) % len
    }

    /// Arrange for `active[target]` to be the next name rotated in.
    pub fn stage_next(
        &mut self,
        target: usize,
        len: usize,
        now: DateTime<Utc>,
    ) -> Result<(), IndexOutOfRange> {
        if target >= len {
            return Err(IndexOutOfRange { index: target, len });
        }
        self.current_index = (target + len - 1) % len;
        self.staged_by_user = Some(true);
        self.staged_at = Some(now.to_rfc3339());
        Ok(())
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// File-backed store for [`RotationState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used for the single-flight lock.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Load the state, or the zero value if none has been saved yet.
    pub fn load(&self) -> Result<RotationState, RotationError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no rotation state yet, starting fresh");
                return Ok(RotationState::default());
            }
            Err(e) => return Err(RotationError::persistence("read", &self.path, e)),
        };

        serde_json::from_str(&raw).map_err(|e| {
            RotationError::persistence(
                "read",
                &self.path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Atomically replace the persisted state.
    pub fn save(&self, state: &RotationState) -> Result<(), RotationError> {
        let fail = |e: std::io::Error| RotationError::persistence("write", &self.path, e);

        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir).map_err(fail)?;

        // Temp files start owner-only; keep the mode of the file being replaced.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(fail)?;
        if let Some(perms) = self.target_permissions() {
            tmp.as_file().set_permissions(perms).map_err(fail)?;
        }
        serde_json::to_writer_pretty(&mut tmp, state).map_err(|e| fail(e.into()))?;
        tmp.write_all(b"\n").map_err(fail)?;
        tmp.as_file().sync_all().map_err(fail)?;
        tmp.persist(&self.path).map_err(|e| fail(e.error))?;

        debug!(path = %self.path.display(), index = state.current_index, "rotation state saved");
        Ok(())
    }

    /// Take the exclusive rotation lock without blocking.
    ///
    /// Fails with `RotationInProgress` if another process holds it.
    pub fn lock(&self) -> Result<RotationLock, RotationError> {
        let lock_path = self.lock_path();
        let fail = |e: std::io::Error| RotationError::persistence("lock", &lock_path, e);

        std::fs::create_dir_all(self.parent_dir()).map_err(fail)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(fail)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!(path = %lock_path.display(), "rotation lock acquired");
                Ok(RotationLock {
                    file,
                    path: lock_path,
                })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(RotationError::RotationInProgress { lock_path })
            }
            Err(e) => Err(fail(e)),
        }
    }

    /// Mode for a freshly written state file: the existing file's, or
    /// 0644 on Unix when there is none yet.
    fn target_permissions(&self) -> Option<std::fs::Permissions> {
        if let Ok(meta) = std::fs::metadata(&self.path) {
            return Some(meta.permissions());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Some(std::fs::Permissions::from_mode(0o644))
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Held for the duration of one rotation attempt; released on drop.
#[derive(Debug)]
pub struct RotationLock {
    file: File,
    path: PathBuf,
}

impl RotationLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RotationLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(error = %e, "failed to release rotation lock");
        }
    }
}

// ── Timestamp encoding ───────────────────────────────────────────────

/// RFC 3339 on write; also accepts offset-less ISO-8601 on read, as
/// written by older tooling, interpreting it as UTC.
mod lenient_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
    }
}
