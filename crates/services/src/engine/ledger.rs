//! Progress ledger operations: patch updates, daily flame credit and the
//! streak-reset check.

use tracing::debug;

use trainer_core::levels::{self, LevelProgress};
use trainer_core::model::ProgressPatch;

use crate::engine::TrainerEngine;
use crate::events::{Event, FlamesReason};

impl TrainerEngine {
    /// Merge a typed patch into progress, re-derive the cached level,
    /// persist and broadcast `ProgressUpdated`.
    pub fn update_progress(&mut self, patch: &ProgressPatch) {
        self.progress_mut().apply(patch);
        let level = levels::level_from_xp(self.config(), self.progress().xp_total());
        self.progress_mut().apply(&ProgressPatch::new().level(level));
        self.notify_state();
        let event = Event::ProgressUpdated(self.progress().clone());
        self.emit(&event);
    }

    /// True when today's play has already been credited to the streak.
    #[must_use]
    pub fn has_credited_today(&self) -> bool {
        self.progress().last_play_date() == Some(self.clock().today())
    }

    /// Count today towards the streak, at most once per calendar day.
    ///
    /// Returns true when a flame was credited. Repeated calls on the same
    /// day are no-ops regardless of how many sessions finish.
    pub fn credit_day_if_needed(&mut self) -> bool {
        let today = self.clock().today();
        if self.progress().last_play_date() == Some(today) {
            debug!(%today, "streak already credited today");
            return false;
        }
        let flames = self.progress().flames() + 1;
        self.update_progress(
            &ProgressPatch::new()
                .flames(flames)
                .last_play_date(today),
        );
        let event = Event::FlamesUpdated {
            flames,
            reason: FlamesReason::SessionEnd,
        };
        self.emit(&event);
        true
    }

    /// Reset the streak to the baseline of 1 when at least two whole days
    /// have passed since the last credited play. Run on every route entry.
    ///
    /// Returns true when a reset happened.
    pub fn check_daily_reset(&mut self) -> bool {
        let today = self.clock().today();
        let last = self.progress().last_play_date();
        if !levels::should_reset_streak(last, Some(today)) {
            return false;
        }
        debug!(?last, %today, "streak gap >= 2 days; resetting flames");
        self.update_progress(&ProgressPatch::new().flames(1));
        let event = Event::FlamesUpdated {
            flames: 1,
            reason: FlamesReason::DailyReset,
        };
        self.emit(&event);
        true
    }

    /// Level-bar data for the current XP total.
    #[must_use]
    pub fn level_progress(&self) -> LevelProgress {
        levels::progress_in_level(self.config(), self.progress().xp_total())
    }
}
