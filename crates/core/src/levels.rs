//! Pure progress arithmetic: level lookup, in-level progress, session XP and
//! streak-reset rules. Everything here is total over its typed inputs; the
//! engine layers persistence and events on top.

use crate::config::Config;
use crate::model::SessionMode;
use crate::time::{CalendarDay, day_difference};

/// Largest level whose cumulative XP threshold is within `xp_total`,
/// clamped to `[1, level_count]`.
#[must_use]
pub fn level_from_xp(config: &Config, xp_total: u64) -> u32 {
    let mut level = 1_u32;
    for (index, threshold) in config.levels_xp_table.iter().enumerate() {
        if xp_total >= *threshold {
            level = u32::try_from(index + 1).unwrap_or(u32::MAX);
        }
    }
    level.clamp(1, config.level_count().max(1))
}

/// Snapshot for a level progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_into_level: u64,
    pub xp_to_next: u64,
    /// Rounded share of the current level span, always within `0..=100`.
    pub percent: u8,
}

/// Where `xp_total` sits inside its level.
///
/// At the maximum level there is no next threshold; `xp_to_next` is 0 and
/// `percent` is pinned to 100 instead of dividing by an empty span.
#[must_use]
pub fn progress_in_level(config: &Config, xp_total: u64) -> LevelProgress {
    let level = level_from_xp(config, xp_total);
    let index = (level - 1) as usize;
    let level_base = config.levels_xp_table.get(index).copied().unwrap_or(0);
    let xp_into_level = xp_total.saturating_sub(level_base);

    let is_max = level >= config.level_count();
    if is_max {
        return LevelProgress {
            level,
            xp_into_level,
            xp_to_next: 0,
            percent: 100,
        };
    }

    let next_base = config
        .levels_xp_table
        .get(index + 1)
        .copied()
        .unwrap_or(level_base);
    let span = next_base.saturating_sub(level_base).max(1);
    let xp_to_next = next_base.saturating_sub(xp_total);
    let percent = (xp_into_level as f64 / span as f64 * 100.0).round();

    LevelProgress {
        level,
        xp_into_level,
        xp_to_next,
        percent: percent.clamp(0.0, 100.0) as u8,
    }
}

/// Inputs for end-of-session XP scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionXpInput {
    pub good_count: u32,
    pub advanced: bool,
    pub flames: u32,
}

/// XP breakdown for one session, multipliers included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionXp {
    pub base: u64,
    pub mult_mode: f64,
    pub mult_flames: u32,
    pub total: u64,
}

/// XP earned by a whole session: `good_count × XP_PER_GOOD`, times the mode
/// multiplier, times the flame count.
///
/// A flame count of 0 multiplies by 1 — a broken streak is never a penalty.
#[must_use]
pub fn session_xp(config: &Config, input: SessionXpInput) -> SessionXp {
    let base = u64::from(input.good_count) * u64::from(config.xp_per_good);
    let mult_mode = if input.advanced {
        config.advanced_mult
    } else {
        1.0
    };
    let mult_flames = input.flames.max(1);
    let total = (base as f64 * mult_mode * f64::from(mult_flames)).round() as u64;
    SessionXp {
        base,
        mult_mode,
        mult_flames,
        total,
    }
}

/// XP gained by a single correct answer at the current flame count.
#[must_use]
pub fn answer_xp(config: &Config, mode: SessionMode, flames: u32) -> u64 {
    let mult_flames = f64::from(flames.max(1));
    (f64::from(config.xp_per_good) * mult_flames * mode.multiplier(config.advanced_mult)).round()
        as u64
}

/// True when the streak is broken: both days known and at least two whole
/// days apart. Skipping a single day keeps the streak.
#[must_use]
pub fn should_reset_streak(last: Option<CalendarDay>, today: Option<CalendarDay>) -> bool {
    match day_difference(last, today) {
        Some(gap) => gap >= 2,
        None => false,
    }
}
