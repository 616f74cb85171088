use storage::{JsonFileStore, Snapshot, SnapshotStore};
use trainer_core::model::{Progress, ProgressPatch, Session, SessionId, SessionMode};
use trainer_core::time::fixed_now;

#[test]
fn reload_restores_session_and_progress() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::start(
        SessionId::generate(),
        SessionMode::Advanced,
        "reload-seed".to_owned(),
        20,
        fixed_now(),
    );
    session.record_correct(45);
    session.advance();

    let mut progress = Progress::default();
    progress.apply(
        &ProgressPatch::new()
            .flames(3)
            .xp_total(980)
            .last_play_date("2023-11-14".parse().unwrap()),
    );

    {
        let store = JsonFileStore::open(dir.path()).unwrap();
        store
            .save(&Snapshot::capture(Some(&session), &progress))
            .unwrap();
    }

    // Fresh store over the same directory: the page-reload case.
    let store = JsonFileStore::open(dir.path()).unwrap();
    let (restored_session, restored_progress) =
        store.load().unwrap().expect("snapshot").into_state().unwrap();

    let restored = restored_session.expect("session survives reload");
    assert_eq!(restored.id(), session.id());
    assert_eq!(restored.score(), 1);
    assert_eq!(restored.xp(), 45);
    assert_eq!(restored.cursor(), 1);
    assert!(!restored.is_finished());

    assert_eq!(restored_progress.flames(), 3);
    assert_eq!(restored_progress.xp_total(), 980);
    assert_eq!(
        restored_progress.last_play_date(),
        Some("2023-11-14".parse().unwrap())
    );
}

#[test]
fn applied_marker_survives_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = SessionId::generate();

    {
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.set_applied_session(id).unwrap();
    }

    let store = JsonFileStore::open(dir.path()).unwrap();
    assert_eq!(store.applied_session().unwrap(), Some(id));
}
