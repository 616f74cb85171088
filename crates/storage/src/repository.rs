use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use trainer_core::model::{
    Progress, ProgressError, Session, SessionId, SessionMode, SessionRecordError,
};
use trainer_core::time::CalendarDay;

/// Errors surfaced by snapshot stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors turning a persisted snapshot back into domain state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotDecodeError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Session(#[from] SessionRecordError),
}

/// Persisted shape for progress.
///
/// Mirrors the domain `Progress` so stores can serialize without leaking
/// storage concerns into the domain layer. Field names match the original
/// snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub flames: u32,
    pub xp_total: u64,
    pub last_play_date: Option<CalendarDay>,
    pub level: Option<u32>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &Progress) -> Self {
        Self {
            flames: progress.flames(),
            xp_total: progress.xp_total(),
            last_play_date: progress.last_play_date(),
            level: progress.level(),
        }
    }

    /// Convert the record back into domain `Progress`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the persisted values fail validation.
    pub fn into_progress(self) -> Result<Progress, ProgressError> {
        Progress::from_persisted(self.flames, self.xp_total, self.last_play_date, self.level)
    }
}

/// Persisted shape for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub mode: SessionMode,
    pub seed: String,
    pub total_questions: u32,
    pub score: u32,
    pub xp: u64,
    #[serde(default)]
    pub cursor: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: session.id(),
            mode: session.mode(),
            seed: session.seed().to_owned(),
            total_questions: session.total_questions(),
            score: session.score(),
            xp: session.xp(),
            cursor: session.cursor(),
            started_at: session.started_at(),
            finished_at: session.finished_at(),
        }
    }

    /// Convert the record back into a domain `Session`.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` if the persisted values break an
    /// invariant.
    pub fn into_session(self) -> Result<Session, SessionRecordError> {
        Session::from_persisted(
            self.id,
            self.mode,
            self.seed,
            self.total_questions,
            self.score,
            self.xp,
            self.cursor,
            self.started_at,
            self.finished_at,
        )
    }
}

/// Whole persisted snapshot: the optional in-flight session plus progress.
///
/// Always written as a single overwrite; there is only one writer context, so
/// partial-write interleaving is not a concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session: Option<SessionRecord>,
    pub progress: ProgressRecord,
}

impl Snapshot {
    /// Capture the engine's current state for persistence.
    #[must_use]
    pub fn capture(session: Option<&Session>, progress: &Progress) -> Self {
        Self {
            session: session.map(SessionRecord::from_session),
            progress: ProgressRecord::from_progress(progress),
        }
    }

    /// Rebuild domain state from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotDecodeError` if any persisted value fails domain
    /// validation.
    pub fn into_state(self) -> Result<(Option<Session>, Progress), SnapshotDecodeError> {
        let progress = self.progress.into_progress()?;
        let session = self.session.map(SessionRecord::into_session).transpose()?;
        Ok((session, progress))
    }
}

/// Durable key/value persistence for the engine snapshot.
///
/// Synchronous on purpose: the store is the localStorage analog, written
/// best-effort after every mutation. The applied-session marker lives under
/// its own key so it survives a cleared snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backing store cannot be read at all.
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Overwrite the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the write fails; callers treat this as
    /// best-effort and keep running in memory.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// Id of the last session whose XP was folded into the totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backing store cannot be read.
    fn applied_session(&self) -> Result<Option<SessionId>, StorageError>;

    /// Record the session whose XP has been applied.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the write fails.
    fn set_applied_session(&self, id: SessionId) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct InMemoryInner {
    snapshot: Option<Snapshot>,
    applied: Option<SessionId>,
    failing: bool,
}

/// In-memory store for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryInner>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, to exercise the engine's
    /// degrade-to-memory paths.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().expect("store mutex poisoned").failing = failing;
    }

    /// Drop the stored snapshot but keep the applied marker, simulating a
    /// cleared main key.
    pub fn clear_snapshot(&self) {
        self.inner.lock().expect("store mutex poisoned").snapshot = None;
    }
}

impl SnapshotStore for InMemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        if inner.failing {
            return Err(StorageError::Io("injected failure".to_owned()));
        }
        Ok(inner.snapshot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.failing {
            return Err(StorageError::Io("injected failure".to_owned()));
        }
        inner.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn applied_session(&self) -> Result<Option<SessionId>, StorageError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        if inner.failing {
            return Err(StorageError::Io("injected failure".to_owned()));
        }
        Ok(inner.applied)
    }

    fn set_applied_session(&self, id: SessionId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.failing {
            return Err(StorageError::Io("injected failure".to_owned()));
        }
        inner.applied = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::time::fixed_now;

    fn sample_session() -> Session {
        Session::start(
            SessionId::generate(),
            SessionMode::Advanced,
            "seed-1".to_owned(),
            20,
            fixed_now(),
        )
    }

    #[test]
    fn snapshot_round_trips_domain_state() {
        let mut session = sample_session();
        session.record_correct(15);
        let mut progress = Progress::default();
        progress.add_xp(200);

        let snapshot = Snapshot::capture(Some(&session), &progress);
        let (restored_session, restored_progress) = snapshot.into_state().unwrap();
        assert_eq!(restored_session, Some(session));
        assert_eq!(restored_progress, progress);
    }

    #[test]
    fn snapshot_decode_rejects_broken_invariants() {
        let record = SessionRecord {
            id: SessionId::generate(),
            mode: SessionMode::Normal,
            seed: String::new(),
            total_questions: 5,
            score: 9,
            xp: 0,
            cursor: 0,
            started_at: fixed_now(),
            finished_at: None,
        };
        let snapshot = Snapshot {
            session: Some(record),
            progress: ProgressRecord::from_progress(&Progress::default()),
        };
        assert!(snapshot.into_state().is_err());
    }

    #[test]
    fn in_memory_store_keeps_marker_across_snapshot_clear() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        store
            .save(&Snapshot::capture(None, &Progress::default()))
            .unwrap();
        store.set_applied_session(id).unwrap();

        store.clear_snapshot();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.applied_session().unwrap(), Some(id));
    }

    #[test]
    fn failing_store_errors_every_operation() {
        let store = InMemoryStore::new();
        store.set_failing(true);
        assert!(store.load().is_err());
        assert!(
            store
                .save(&Snapshot::capture(None, &Progress::default()))
                .is_err()
        );
        assert!(store.applied_session().is_err());
    }
}
