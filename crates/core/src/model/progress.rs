use thiserror::Error;

use crate::time::CalendarDay;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("level {0} is outside the level table (levels start at 1)")]
    InvalidLevel(u32),
}

/// Whole-of-time progress record for one learner: streak, XP, last credited
/// play day and the cached level.
///
/// Mutated only through [`Progress::apply`] and the engine's ledger
/// operations; collaborators receive clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    flames: u32,
    xp_total: u64,
    last_play_date: Option<CalendarDay>,
    level: Option<u32>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            // Baseline streak display is 1, not 0.
            flames: 1,
            xp_total: 0,
            last_play_date: None,
            level: None,
        }
    }
}

impl Progress {
    /// Rehydrate progress from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLevel` if a cached level of 0 was
    /// persisted (levels are 1-based).
    pub fn from_persisted(
        flames: u32,
        xp_total: u64,
        last_play_date: Option<CalendarDay>,
        level: Option<u32>,
    ) -> Result<Self, ProgressError> {
        if level == Some(0) {
            return Err(ProgressError::InvalidLevel(0));
        }
        Ok(Self {
            flames,
            xp_total,
            last_play_date,
            level,
        })
    }

    #[must_use]
    pub fn flames(&self) -> u32 {
        self.flames
    }

    #[must_use]
    pub fn xp_total(&self) -> u64 {
        self.xp_total
    }

    #[must_use]
    pub fn last_play_date(&self) -> Option<CalendarDay> {
        self.last_play_date
    }

    #[must_use]
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    /// Merge a partial update, field by field. Absent fields keep their
    /// current value.
    pub fn apply(&mut self, patch: &ProgressPatch) {
        if let Some(flames) = patch.flames {
            self.flames = flames;
        }
        if let Some(xp_total) = patch.xp_total {
            self.xp_total = xp_total;
        }
        if let Some(day) = patch.last_play_date {
            self.last_play_date = Some(day);
        }
        if let Some(level) = patch.level {
            self.level = Some(level.max(1));
        }
    }

    /// Fold a finished session's XP into the total.
    pub fn add_xp(&mut self, xp: u64) {
        self.xp_total = self.xp_total.saturating_add(xp);
    }
}

/// Typed partial update for [`Progress`]; the replacement for the original's
/// dynamic field merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub flames: Option<u32>,
    pub xp_total: Option<u64>,
    pub last_play_date: Option<CalendarDay>,
    pub level: Option<u32>,
}

impl ProgressPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn flames(mut self, flames: u32) -> Self {
        self.flames = Some(flames);
        self
    }

    #[must_use]
    pub fn xp_total(mut self, xp_total: u64) -> Self {
        self.xp_total = Some(xp_total);
        self
    }

    #[must_use]
    pub fn last_play_date(mut self, day: CalendarDay) -> Self {
        self.last_play_date = Some(day);
        self
    }

    #[must_use]
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// True when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
