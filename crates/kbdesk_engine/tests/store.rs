use std::fs;

use kbdesk_engine::{PersistError, PersistedSession, StateDir};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn session_survives_reload_before_quit() {
    let dir = TempDir::new().expect("tempdir");
    let store = StateDir::new(dir.path().join("state"));

    let first = store.load_or_create_session().expect("first start");
    assert!(first.session_id.starts_with("web-user-"));
    assert!(dir.path().join("state").join("session.ron").is_file());

    let second = StateDir::new(dir.path().join("state"))
        .load_or_create_session()
        .expect("second start");
    assert_eq!(first, second);
}

#[test]
fn clearing_starts_a_new_session() {
    let dir = TempDir::new().expect("tempdir");
    let store = StateDir::new(dir.path());

    let first = store.load_or_create_session().expect("first");
    store.clear_session().expect("clear");
    store.clear_session().expect("clearing twice is fine");
    assert_eq!(store.load_session().expect("load"), None);

    let second = store.load_or_create_session().expect("second");
    assert_ne!(first.session_id, second.session_id);
}

#[test]
fn corrupt_session_file_is_replaced() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("session.ron"), "not ron at all (").expect("write");
    let store = StateDir::new(dir.path());

    assert!(matches!(
        store.load_session(),
        Err(PersistError::Format { .. })
    ));
    let session = store.load_or_create_session().expect("recovered");
    assert_eq!(store.load_session().expect("reload"), Some(session));
}

#[test]
fn foreign_session_id_is_replaced() {
    let dir = TempDir::new().expect("tempdir");
    let store = StateDir::new(dir.path());
    store
        .save_session(&PersistedSession {
            session_id: "admin".into(),
            created_utc: "2024-01-01T00:00:00+00:00".into(),
        })
        .expect("save");

    let session = store.load_or_create_session().expect("session");
    assert!(session.session_id.starts_with("web-user-"));
}

#[test]
fn write_atomic_replaces_content() {
    let dir = TempDir::new().expect("tempdir");
    let store = StateDir::new(dir.path().join("nested"));

    let path = store.write_atomic("transcript.html", "<p>one</p>").expect("write");
    store.write_atomic("transcript.html", "<p>two</p>").expect("rewrite");

    assert_eq!(fs::read_to_string(&path).expect("read"), "<p>two</p>");
    let leftovers = fs::read_dir(store.path())
        .expect("list")
        .filter_map(Result::ok)
        .count();
    assert_eq!(leftovers, 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let blocker = dir.path().join("state");
    fs::write(&blocker, "").expect("write");

    let err = StateDir::new(&blocker).ensure().unwrap_err();
    assert!(matches!(err, PersistError::StateDir(_)));
}
