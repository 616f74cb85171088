//! Logical routes and the navigation guard.
//!
//! The guard runs once per route entry, before the engine marks itself
//! ready; it never re-evaluates on background mutation.

use tracing::debug;

use trainer_core::model::SessionPhase;

/// Logical page the host is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Lobby,
    Questions,
    Results,
    Other,
}

impl Route {
    /// Resolve a raw location path: trailing slashes, query string and
    /// fragment are ignored. Anything unrecognized is `Other`.
    #[must_use]
    pub fn from_path(raw: &str) -> Self {
        let path = raw
            .split(['?', '#'])
            .next()
            .unwrap_or("");
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        match path {
            "/trainer/lobby" => Route::Lobby,
            "/trainer/questions" => Route::Questions,
            "/trainer/results" => Route::Results,
            _ => Route::Other,
        }
    }

    /// Canonical path for navigation to this route.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::Lobby => "/trainer/lobby",
            Route::Questions => "/trainer/questions",
            Route::Results => "/trainer/results",
            Route::Other => "/",
        }
    }
}

/// Outcome of a route-entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether entering `route` is valid for the current session phase.
///
/// Questions and results need a session; results additionally needs a
/// finished one. Everything else is open.
#[must_use]
pub fn guard_route(route: Route, phase: SessionPhase) -> GuardDecision {
    let decision = match (route, phase) {
        (Route::Questions | Route::Results, SessionPhase::None) => {
            GuardDecision::Redirect(Route::Lobby)
        }
        (Route::Results, SessionPhase::Active) => GuardDecision::Redirect(Route::Questions),
        _ => GuardDecision::Allow,
    };
    debug!(?route, ?phase, ?decision, "route guard evaluated");
    decision
}
