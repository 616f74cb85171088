//! Boot and hydration: load the persisted snapshot, guard the route, mark
//! ready, then (separately, never blocking readiness) merge remote progress
//! fields.

use tracing::{debug, warn};

use crate::engine::TrainerEngine;
use crate::events::Event;
use crate::guard::{GuardDecision, Route, guard_route};
use crate::member::{MemberFieldStore, ProgressFields};

/// Result of a boot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// State loaded, guard passed, `Ready` emitted.
    Ready,
    /// The guard vetoed this route; the host should navigate to the target
    /// and boot again there.
    Redirect(Route),
    /// A previous boot already completed; nothing re-ran.
    AlreadyReady,
}

impl TrainerEngine {
    /// Bring the engine up for the page at `path`.
    ///
    /// Loads the persisted snapshot (absent or corrupt data falls back to
    /// defaults), resolves and guards the route, applies the daily streak
    /// reset, then marks ready and emits `Ready`. Idempotent: a second call
    /// in the same process is a no-op returning `AlreadyReady`, so repeated
    /// script injection cannot double-initialize.
    pub fn boot(&mut self, path: &str) -> BootOutcome {
        if self.is_ready() {
            debug!("boot skipped; engine already ready");
            return BootOutcome::AlreadyReady;
        }

        match self.store().load() {
            Ok(Some(snapshot)) => match snapshot.into_state() {
                Ok((session, progress)) => self.set_state(session, progress),
                Err(e) => {
                    warn!(error = %e, "snapshot failed validation; starting from defaults");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "snapshot load failed; starting from defaults");
            }
        }

        let route = Route::from_path(path);
        self.set_route(route);
        self.emit(&Event::RouteChanged(route));

        if let GuardDecision::Redirect(target) = guard_route(route, self.session_phase()) {
            debug!(?route, ?target, "boot stopped by route guard");
            return BootOutcome::Redirect(target);
        }

        self.check_daily_reset();

        self.set_ready();
        self.notify_state();
        let event = Event::Ready(self.snapshot());
        self.emit(&event);
        debug!(?route, "engine ready");
        BootOutcome::Ready
    }

    /// Merge remote progress fields over the local ledger, best-effort.
    ///
    /// Runs at most once per process, after `boot`; any store failure or
    /// absence of data is swallowed. Returns whether a merge happened.
    pub async fn hydrate(&mut self, members: &dyn MemberFieldStore) -> bool {
        if !self.hydration_pending() {
            debug!("hydration skipped; already attempted");
            return false;
        }
        match members.read_progress_fields().await {
            Ok(Some(fields)) => {
                debug!(?fields, "merging remote progress fields");
                self.update_progress(&fields.into_patch());
                true
            }
            Ok(None) => {
                debug!("member store has no progress data");
                false
            }
            Err(e) => {
                debug!(error = %e, "hydration failed silently");
                false
            }
        }
    }

    /// Push the local progress fields to the remote store, fire-and-forget.
    /// Returns whether the store accepted them; failures are swallowed.
    pub async fn push_progress(&self, members: &dyn MemberFieldStore) -> bool {
        let fields = ProgressFields::from_progress(self.progress());
        match members.write_progress_fields(&fields).await {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!(error = %e, "progress push failed silently");
                false
            }
        }
    }
}
