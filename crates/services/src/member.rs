//! Identity/member-field store contract.
//!
//! One capability trait, chosen at construction time; no runtime probing of
//! whatever integration happens to be loaded. It is always optional: local
//! persistence stays authoritative and every failure is swallowed by the
//! engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use trainer_core::model::{Progress, ProgressPatch};
use trainer_core::time::CalendarDay;

use crate::error::HydrateError;

/// Progress fields as a remote store knows them; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressFields {
    pub flames: Option<u32>,
    pub xp_total: Option<u64>,
    pub last_play_date: Option<CalendarDay>,
    pub level: Option<u32>,
}

impl ProgressFields {
    /// Snapshot the local progress for a push to the remote store.
    #[must_use]
    pub fn from_progress(progress: &Progress) -> Self {
        Self {
            flames: Some(progress.flames()),
            xp_total: Some(progress.xp_total()),
            last_play_date: progress.last_play_date(),
            level: progress.level(),
        }
    }

    /// Patch applying the present fields over local progress; absent fields
    /// keep their local value.
    #[must_use]
    pub fn into_patch(self) -> ProgressPatch {
        ProgressPatch {
            flames: self.flames,
            xp_total: self.xp_total,
            last_play_date: self.last_play_date,
            level: self.level,
        }
    }
}

/// Best-effort remote store of progress fields (e.g. member custom fields).
#[async_trait]
pub trait MemberFieldStore: Send + Sync {
    /// Read the remote progress fields; `None` means "no data" without
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `HydrateError` when the store is unreachable.
    async fn read_progress_fields(&self) -> Result<Option<ProgressFields>, HydrateError>;

    /// Push progress fields. Returns whether the store accepted them.
    ///
    /// # Errors
    ///
    /// Returns `HydrateError` when the store is unreachable.
    async fn write_progress_fields(&self, fields: &ProgressFields) -> Result<bool, HydrateError>;
}
