use std::time::Duration;

/// Tunable rules and endpoints for the trainer.
///
/// One place for every number the rest of the workspace reads. `default()`
/// mirrors the production values; tests build variants with the struct-update
/// syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of questions per session.
    pub question_count: u32,
    /// XP granted per correct answer, before multipliers.
    pub xp_per_good: u32,
    /// XP multiplier for the advanced mode.
    pub advanced_mult: f64,
    /// Cumulative XP thresholds; index 0 is level 1 (reached at 0 XP).
    pub levels_xp_table: Vec<u64>,
    /// Base URL of the remote data provider.
    pub api_base_url: String,
    /// Per-request timeout for the remote data provider.
    pub provider_timeout: Duration,
}

impl Config {
    /// Number of levels in the cumulative XP table.
    #[must_use]
    pub fn level_count(&self) -> u32 {
        u32::try_from(self.levels_xp_table.len()).unwrap_or(u32::MAX)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_count: 20,
            xp_per_good: 10,
            advanced_mult: 1.5,
            levels_xp_table: default_levels_table(),
            api_base_url: "https://api.pokersciences.com".to_owned(),
            provider_timeout: Duration::from_secs(8),
        }
    }
}

/// Cumulative XP table for 35 levels: level 1 at 0 XP, a 50 XP first step,
/// each following step 10 XP wider than the last.
#[must_use]
pub fn default_levels_table() -> Vec<u64> {
    let mut levels = vec![0];
    let mut total = 0_u64;
    let mut step = 50_u64;
    for _ in 1..35 {
        total += step;
        levels.push(total);
        step += 10;
    }
    levels
}
