//! The engine: one explicitly constructed owner of session + progress state.
//!
//! Every mutation goes through an engine method, persists a best-effort
//! snapshot and broadcasts a typed event; collaborators only ever see
//! cloned snapshots.

mod boot;
mod ledger;
mod session;

pub use boot::BootOutcome;

use tracing::warn;

use storage::{Snapshot, SnapshotStore};
use trainer_core::model::{Progress, Session, SessionId, SessionPhase};
use trainer_core::{Clock, Config};

use crate::events::{Event, EventBus, EventKind, SubscriptionId};
use crate::guard::Route;

/// Read-only copy of the engine state handed to subscribers and hosts.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub ready: bool,
    pub route: Route,
    pub session: Option<Session>,
    pub progress: Progress,
}

/// Process-wide trainer state: current route, the (at most one) session,
/// and the durable progress ledger.
pub struct TrainerEngine {
    config: Config,
    clock: Clock,
    store: Box<dyn SnapshotStore>,
    bus: EventBus,
    route: Route,
    ready: bool,
    hydrated: bool,
    session: Option<Session>,
    progress: Progress,
    // In-memory shadow of the persisted applied marker, so a failing store
    // still cannot double-apply within one process.
    last_applied: Option<SessionId>,
}

impl TrainerEngine {
    /// Build an engine over the given store. State starts at defaults;
    /// call [`TrainerEngine::boot`] to load the persisted snapshot.
    #[must_use]
    pub fn new(config: Config, clock: Clock, store: Box<dyn SnapshotStore>) -> Self {
        Self {
            config,
            clock,
            store,
            bus: EventBus::new(),
            route: Route::Other,
            ready: false,
            hydrated: false,
            session: None,
            progress: Progress::default(),
            last_applied: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn session_phase(&self) -> SessionPhase {
        SessionPhase::of(self.session.as_ref())
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Copy of the full state; the only thing collaborators ever receive.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            ready: self.ready,
            route: self.route,
            session: self.session.clone(),
            progress: self.progress.clone(),
        }
    }

    /// Listen for one event kind.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    /// Listen for every event.
    pub fn subscribe_all(
        &mut self,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: &Event) {
        self.bus.emit(event);
    }

    /// Persist the current snapshot, best-effort. A failed write is logged
    /// and the engine keeps running in memory; the next reload simply loses
    /// whatever was not saved.
    pub(crate) fn persist(&mut self) {
        let snapshot = Snapshot::capture(self.session.as_ref(), &self.progress);
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "snapshot save failed; continuing in memory");
        }
    }

    /// Persist and broadcast `StateUpdated`; the tail of every mutation.
    pub(crate) fn notify_state(&mut self) {
        self.persist();
        let event = Event::StateUpdated(self.snapshot());
        self.emit(&event);
    }

    pub(crate) fn clock(&self) -> Clock {
        self.clock
    }

    pub(crate) fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    pub(crate) fn set_state(&mut self, session: Option<Session>, progress: Progress) {
        self.session = session;
        self.progress = progress;
    }

    pub(crate) fn set_route(&mut self, route: Route) {
        self.route = route;
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn hydration_pending(&mut self) -> bool {
        if self.hydrated {
            return false;
        }
        self.hydrated = true;
        true
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub(crate) fn session_slot(&mut self) -> &mut Option<Session> {
        &mut self.session
    }

    pub(crate) fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    pub(crate) fn mark_applied(&mut self, id: SessionId) {
        self.last_applied = Some(id);
        if let Err(e) = self.store.set_applied_session(id) {
            warn!(error = %e, "applied-session marker write failed");
        }
    }

    pub(crate) fn already_applied(&self, id: SessionId) -> bool {
        if self.last_applied == Some(id) {
            return true;
        }
        match self.store.applied_session() {
            Ok(marker) => marker == Some(id),
            Err(e) => {
                warn!(error = %e, "applied-session marker read failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for TrainerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerEngine")
            .field("route", &self.route)
            .field("ready", &self.ready)
            .field("session", &self.session)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}
