//! Session lifecycle: NONE -> ACTIVE -> FINISHED -> (reset) NONE, plus the
//! exactly-once folding of a finished session's XP into the ledger.

use rand::distr::{Alphanumeric, SampleString};
use tracing::debug;

use trainer_core::levels;
use trainer_core::model::{Session, SessionId, SessionMode};

use crate::engine::TrainerEngine;
use crate::events::Event;

fn random_seed() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 12)
}

impl TrainerEngine {
    /// Start a fresh session in the given mode, returning its id.
    ///
    /// Any prior unfinished session is abandoned and overwritten; a prior
    /// finished one is simply replaced (its XP can no longer be applied
    /// unless it already was).
    pub fn start_session(&mut self, mode: SessionMode) -> SessionId {
        let session = Session::start(
            SessionId::generate(),
            mode,
            random_seed(),
            self.config().question_count,
            self.clock().now(),
        );
        let id = session.id();
        debug!(%id, ?mode, total = session.total_questions(), "session started");
        let announce = session.clone();
        *self.session_slot() = Some(session);
        self.notify_state();
        self.emit(&Event::SessionStarted(announce));
        id
    }

    /// Record one answer. No-op unless a session is active.
    ///
    /// A correct answer adds 1 to the score and credits XP at the flame
    /// count and mode multiplier in effect right now.
    pub fn record_answer(&mut self, correct: bool) -> bool {
        let flames = self.progress().flames();
        let gain = {
            let config = self.config();
            let Some(session) = self.session() else {
                return false;
            };
            if session.is_finished() {
                return false;
            }
            levels::answer_xp(config, session.mode(), flames)
        };
        if !correct {
            debug!("incorrect answer; score and xp unchanged");
            return false;
        }
        let Some(session) = self.session_mut() else {
            return false;
        };
        if !session.record_correct(gain) {
            return false;
        }
        self.notify_state();
        true
    }

    /// Move the question cursor forward. No-op unless a session is active.
    pub fn advance(&mut self) -> bool {
        let Some(session) = self.session_mut() else {
            return false;
        };
        if !session.advance() {
            return false;
        }
        self.notify_state();
        true
    }

    /// Adjust the question total of the active session (e.g. the provider
    /// returned fewer questions than configured).
    pub fn set_total_questions(&mut self, total: u32) -> bool {
        let Some(session) = self.session_mut() else {
            return false;
        };
        if !session.set_total_questions(total) {
            return false;
        }
        self.notify_state();
        true
    }

    /// Terminate the active session. Idempotent; finishing twice or with no
    /// session at all is a safe no-op.
    pub fn finish_session(&mut self) -> bool {
        let now = self.clock().now();
        let Some(session) = self.session_mut() else {
            return false;
        };
        if !session.finish(now) {
            return false;
        }
        let announce = session.clone();
        debug!(id = %announce.id(), "session finished");
        self.notify_state();
        self.emit(&Event::SessionFinished(announce));
        true
    }

    /// Clear the session slot from any state; only a deliberate return to
    /// the lobby should call this.
    pub fn reset_session(&mut self) {
        *self.session_slot() = None;
        debug!("session reset");
        self.notify_state();
        self.emit(&Event::SessionReset);
    }

    /// Fold the finished session's XP into the total, exactly once.
    ///
    /// Returns false when there is no finished session or its XP was
    /// already applied — across duplicate calls, reloads, or another engine
    /// over the same store.
    pub fn apply_to_ledger_once(&mut self) -> bool {
        let Some(session) = self.session() else {
            return false;
        };
        if !session.is_finished() {
            return false;
        }
        let id = session.id();
        let xp = session.xp();
        if self.already_applied(id) {
            debug!(%id, "session xp already applied");
            return false;
        }

        self.progress_mut().add_xp(xp);
        self.mark_applied(id);
        debug!(%id, xp, total = self.progress().xp_total(), "session xp applied to totals");
        self.notify_state();
        let event = Event::ProgressUpdated(self.progress().clone());
        self.emit(&event);
        true
    }
}
