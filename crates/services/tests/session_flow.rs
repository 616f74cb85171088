use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use services::{
    BootOutcome, Clock, Config, Event, EventKind, HydrateError, MemberFieldStore, ProgressFields,
    Route, TrainerEngine,
};
use storage::{InMemoryStore, SnapshotStore};
use trainer_core::model::{ProgressPatch, SessionMode, SessionPhase};
use trainer_core::time::{fixed_clock, fixed_now};

fn engine_over(store: InMemoryStore) -> TrainerEngine {
    TrainerEngine::new(Config::default(), fixed_clock(), Box::new(store))
}

#[test]
fn full_session_scores_at_the_multiplier_of_each_answer() {
    let config = Config {
        question_count: 5,
        ..Config::default()
    };
    let mut engine = TrainerEngine::new(config, fixed_clock(), Box::new(InMemoryStore::new()));

    engine.start_session(SessionMode::Normal);
    assert_eq!(engine.session().unwrap().total_questions(), 5);

    // Two correct answers at the baseline flame count of 1: 10 XP each.
    assert!(engine.record_answer(true));
    assert!(engine.record_answer(true));
    // Streak grows mid-session; the next correct answer scores at x3.
    engine.update_progress(&ProgressPatch::new().flames(3));
    assert!(engine.record_answer(true));
    // Two misses change nothing.
    assert!(!engine.record_answer(false));
    assert!(!engine.record_answer(false));

    assert!(engine.finish_session());
    let session = engine.session().unwrap();
    assert_eq!(session.score(), 3);
    assert_eq!(session.xp(), 10 + 10 + 30);
    assert_eq!(engine.session_phase(), SessionPhase::Finished);
}

#[test]
fn xp_application_is_exactly_once_across_reloads() {
    let store = InMemoryStore::new();

    let mut engine = engine_over(store.clone());
    assert_eq!(engine.boot("/trainer/lobby"), BootOutcome::Ready);
    engine.start_session(SessionMode::Normal);
    engine.record_answer(true);
    engine.record_answer(true);
    engine.finish_session();
    assert!(engine.apply_to_ledger_once());
    let total_after_first = engine.progress().xp_total();
    assert_eq!(total_after_first, 20);

    // Reload: a fresh engine over the same store sees the finished session
    // and the applied marker.
    let mut reloaded = engine_over(store.clone());
    assert_eq!(reloaded.boot("/trainer/results"), BootOutcome::Ready);
    assert_eq!(reloaded.session_phase(), SessionPhase::Finished);
    assert!(!reloaded.apply_to_ledger_once());
    assert_eq!(reloaded.progress().xp_total(), total_after_first);
}

#[test]
fn marker_survives_a_cleared_snapshot() {
    let store = InMemoryStore::new();

    let mut engine = engine_over(store.clone());
    engine.start_session(SessionMode::Normal);
    engine.record_answer(true);
    engine.finish_session();
    assert!(engine.apply_to_ledger_once());
    let snapshot = store.load().unwrap().expect("snapshot persisted");

    // Wipe the main key, keep the marker, restore the snapshot by hand: the
    // session still cannot be applied again.
    store.clear_snapshot();
    store.save(&snapshot).unwrap();
    let mut reloaded = engine_over(store);
    reloaded.boot("/trainer/results");
    assert!(!reloaded.apply_to_ledger_once());
}

#[test]
fn boot_redirects_guarded_routes() {
    // No persisted state at all: questions and results bounce to the lobby.
    let mut engine = engine_over(InMemoryStore::new());
    assert_eq!(
        engine.boot("/trainer/results"),
        BootOutcome::Redirect(Route::Lobby)
    );

    // An unfinished session in storage: results bounces to questions.
    let store = InMemoryStore::new();
    let mut first = engine_over(store.clone());
    first.boot("/trainer/lobby");
    first.start_session(SessionMode::Normal);

    let mut second = engine_over(store);
    assert_eq!(
        second.boot("/trainer/results"),
        BootOutcome::Redirect(Route::Questions)
    );
    assert!(!second.is_ready());
}

#[test]
fn boot_is_idempotent() {
    let mut engine = engine_over(InMemoryStore::new());
    let ready_count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ready_count);
    engine.subscribe(EventKind::Ready, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(engine.boot("/trainer/lobby"), BootOutcome::Ready);
    assert_eq!(engine.boot("/trainer/lobby"), BootOutcome::AlreadyReady);
    assert_eq!(ready_count.load(Ordering::SeqCst), 1);
}

#[test]
fn boot_applies_the_daily_streak_reset() {
    let store = InMemoryStore::new();
    let mut past = engine_over(store.clone());
    past.update_progress(
        &ProgressPatch::new()
            .flames(7)
            .last_play_date(fixed_clock().today()),
    );

    let later = Clock::fixed(fixed_now() + Duration::days(3));
    let mut engine = TrainerEngine::new(Config::default(), later, Box::new(store));
    assert_eq!(engine.boot("/trainer/lobby"), BootOutcome::Ready);
    assert_eq!(engine.progress().flames(), 1);
}

#[test]
fn finish_emits_state_then_session_finished() {
    let mut engine = engine_over(InMemoryStore::new());
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kinds);
    engine.subscribe_all(move |event: &Event| {
        sink.lock().unwrap().push(event.kind());
    });

    engine.start_session(SessionMode::Normal);
    kinds.lock().unwrap().clear();
    engine.finish_session();

    assert_eq!(
        *kinds.lock().unwrap(),
        vec![EventKind::StateUpdated, EventKind::SessionFinished]
    );
}

#[test]
fn failing_store_degrades_to_in_memory_state() {
    let store = InMemoryStore::new();
    store.set_failing(true);

    let mut engine = engine_over(store);
    assert_eq!(engine.boot("/trainer/lobby"), BootOutcome::Ready);
    engine.start_session(SessionMode::Normal);
    assert!(engine.record_answer(true));
    assert!(engine.finish_session());

    // Even the apply-once guard holds within the process when the marker
    // cannot be persisted.
    assert!(engine.apply_to_ledger_once());
    assert!(!engine.apply_to_ledger_once());
    assert_eq!(engine.progress().xp_total(), 10);
}

struct FakeMemberStore {
    fields: Option<ProgressFields>,
    reads: AtomicUsize,
    fail: bool,
}

impl FakeMemberStore {
    fn with_fields(fields: ProgressFields) -> Self {
        Self {
            fields: Some(fields),
            reads: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fields: None,
            reads: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl MemberFieldStore for FakeMemberStore {
    async fn read_progress_fields(&self) -> Result<Option<ProgressFields>, HydrateError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HydrateError::Unavailable("offline".to_owned()));
        }
        Ok(self.fields.clone())
    }

    async fn write_progress_fields(&self, _fields: &ProgressFields) -> Result<bool, HydrateError> {
        if self.fail {
            return Err(HydrateError::Unavailable("offline".to_owned()));
        }
        Ok(true)
    }
}

#[tokio::test]
async fn hydration_merges_present_fields_and_runs_once() {
    let mut engine = engine_over(InMemoryStore::new());
    engine.boot("/trainer/lobby");
    engine.update_progress(&ProgressPatch::new().flames(4));

    let members = FakeMemberStore::with_fields(ProgressFields {
        xp_total: Some(600),
        ..ProgressFields::default()
    });

    assert!(engine.hydrate(&members).await);
    assert_eq!(engine.progress().xp_total(), 600);
    // Field absent remotely stays local.
    assert_eq!(engine.progress().flames(), 4);

    assert!(!engine.hydrate(&members).await);
    assert_eq!(members.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hydration_failure_is_swallowed() {
    let mut engine = engine_over(InMemoryStore::new());
    engine.boot("/trainer/lobby");
    engine.update_progress(&ProgressPatch::new().xp_total(150));

    let members = FakeMemberStore::failing();
    assert!(!engine.hydrate(&members).await);
    assert_eq!(engine.progress().xp_total(), 150);

    assert!(!engine.push_progress(&members).await);
}
