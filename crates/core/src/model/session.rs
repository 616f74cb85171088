use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SessionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds total_questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("total_questions must be positive")]
    ZeroTotal,
}

/// Difficulty mode of a question-answering session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Normal,
    Advanced,
}

impl SessionMode {
    /// XP multiplier applied per correct answer in this mode.
    #[must_use]
    pub fn multiplier(self, advanced_mult: f64) -> f64 {
        match self {
            SessionMode::Normal => 1.0,
            SessionMode::Advanced => advanced_mult,
        }
    }
}

/// Lifecycle state of the (at most one) session owned by the engine.
///
/// `None` describes the absence of a session; the only valid transitions are
/// `None -> Active -> Finished -> None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    None,
    Active,
    Finished,
}

impl SessionPhase {
    /// Phase of an optional session slot.
    #[must_use]
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            None => SessionPhase::None,
            Some(s) if s.is_finished() => SessionPhase::Finished,
            Some(_) => SessionPhase::Active,
        }
    }
}

/// One question-answering attempt: identity, mode, per-answer score/XP and
/// termination timestamps.
///
/// Score and XP only ever increase, by at most one answer at a time; once
/// `finished_at` is set the session is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    mode: SessionMode,
    seed: String,
    total_questions: u32,
    score: u32,
    xp: u64,
    cursor: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a fresh session.
    ///
    /// `total_questions` of 0 is lifted to 1 so the score bound stays
    /// meaningful.
    #[must_use]
    pub fn start(
        id: SessionId,
        mode: SessionMode,
        seed: String,
        total_questions: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            mode,
            seed,
            total_questions: total_questions.max(1),
            score: 0,
            xp: 0,
            cursor: 0,
            started_at,
            finished_at: None,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` if the persisted values break an
    /// invariant (score above total, finish before start, zero total).
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        mode: SessionMode,
        seed: String,
        total_questions: u32,
        score: u32,
        xp: u64,
        cursor: u32,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<Self, SessionRecordError> {
        if total_questions == 0 {
            return Err(SessionRecordError::ZeroTotal);
        }
        if score > total_questions {
            return Err(SessionRecordError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        if let Some(end) = finished_at {
            if end < started_at {
                return Err(SessionRecordError::InvalidTimeRange);
            }
        }
        Ok(Self {
            id,
            mode,
            seed,
            total_questions,
            score,
            xp,
            cursor: cursor.min(total_questions),
            started_at,
            finished_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// UI-facing question cursor; monotonic, bounded by `total_questions`.
    #[must_use]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Credit one correct answer worth `xp_gain`. No-op on a finished
    /// session or once the score has reached the question total.
    pub fn record_correct(&mut self, xp_gain: u64) -> bool {
        if self.is_finished() || self.score >= self.total_questions {
            return false;
        }
        self.score += 1;
        self.xp = self.xp.saturating_add(xp_gain);
        true
    }

    /// Move the question cursor forward. No-op on a finished session or at
    /// the last question.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() || self.cursor >= self.total_questions {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Adjust the question total (e.g. provider returned fewer questions).
    /// Ignores zero and anything below the current score.
    pub fn set_total_questions(&mut self, total: u32) -> bool {
        if self.is_finished() || total == 0 || total < self.score {
            return false;
        }
        self.total_questions = total;
        self.cursor = self.cursor.min(total);
        true
    }

    /// Terminate the session. Idempotent; the timestamp is clamped so a
    /// finished session never ends before it started.
    pub fn finish(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_finished() {
            return false;
        }
        self.finished_at = Some(now.max(self.started_at));
        true
    }
}
