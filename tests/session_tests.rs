// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{ScriptedTransport, api, credential, login_ok, profile};
use pocketclip::PocketError;
use pocketclip::db;
use pocketclip::http::Method;
use pocketclip::models::Registration;
use pocketclip::session::{
    CredentialStore, MemoryCredentialStore, SessionState, SessionStore, SqliteCredentialStore,
};
use rusqlite::params;
use serde_json::json;

fn registration() -> Registration {
    Registration {
        username: "sari".into(),
        email: "sari@example.com".into(),
        password: "rahasia".into(),
        full_name: Some("Sari Wulandari".into()),
    }
}

#[test]
fn login_persists_and_restore_needs_no_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketclip.sqlite");

    let t = ScriptedTransport::new();
    t.reply(200, login_ok("tok-1"));
    {
        let store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
        let mut session = SessionStore::new(store, api(&t));
        let cred = session.login("sari", "rahasia").unwrap();
        assert_eq!(cred.user, profile());
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.current_token(), Some("tok-1"));
    }
    let req = t.call(0);
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.url, "http://ledger.test/auth?action=login");
    assert_eq!(req.bearer, None);
    assert_eq!(req.body.unwrap()["username"], "sari");

    // Next process run.
    let store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
    let mut session = SessionStore::new(store, api(&t));
    assert_eq!(session.state(), SessionState::LoggedOut);
    let restored = session.restore_session().unwrap();
    assert_eq!(restored.user, profile());
    assert_eq!(session.current_token(), Some("tok-1"));
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(t.call_count(), 1);
}

#[test]
fn rejected_login_returns_to_logged_out() {
    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": false, "error": "Username atau password salah" }));
    let mut session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    let events = session.subscribe();

    let err = session.login("sari", "salah").unwrap_err();
    match err {
        PocketError::InvalidCredentials(msg) => assert_eq!(msg, "Username atau password salah"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.state(), SessionState::LoggedOut);
    assert!(session.current().is_none());
    let seen: Vec<_> = events.try_iter().collect();
    assert_eq!(seen, vec![SessionState::Authenticating, SessionState::LoggedOut]);
}

#[test]
fn login_401_is_invalid_credentials() {
    let t = ScriptedTransport::new();
    t.reply(401, json!({ "success": false }));
    let mut session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    assert!(matches!(
        session.login("sari", "x"),
        Err(PocketError::InvalidCredentials(_))
    ));
}

#[test]
fn login_transport_failure_is_network_error() {
    let t = ScriptedTransport::new();
    t.fail("connection refused");
    let mut session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    match session.login("sari", "rahasia") {
        Err(PocketError::Network(msg)) => assert!(msg.contains("connection refused")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(session.state(), SessionState::LoggedOut);
}

#[test]
fn login_reply_without_token_is_server_error() {
    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": true, "user": { "id": 7, "username": "sari" } }));
    let mut session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    assert!(matches!(
        session.login("sari", "rahasia"),
        Err(PocketError::Server { .. })
    ));
    assert!(session.current_token().is_none());
}

#[test]
fn register_does_not_authenticate() {
    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": true }));
    let session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    session.register(&registration()).unwrap();
    assert_eq!(session.state(), SessionState::LoggedOut);
    let req = t.call(0);
    assert_eq!(req.url, "http://ledger.test/auth?action=register");
    assert_eq!(req.body.unwrap()["full_name"], "Sari Wulandari");
}

#[test]
fn register_collision_is_conflict() {
    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": false, "error": "Username sudah terdaftar" }));
    t.reply(409, json!({ "success": false }));
    let session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    assert!(matches!(
        session.register(&registration()),
        Err(PocketError::Conflict(msg)) if msg == "Username sudah terdaftar"
    ));
    assert!(matches!(
        session.register(&registration()),
        Err(PocketError::Conflict(_))
    ));
}

#[test]
fn register_validates_locally() {
    let t = ScriptedTransport::new();
    let session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    let mut reg = registration();
    reg.email = "not-an-email".into();
    assert!(matches!(
        session.register(&reg),
        Err(PocketError::Validation(_))
    ));
    assert_eq!(t.call_count(), 0);
}

#[test]
fn register_and_login_chains_both_calls() {
    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": true }));
    t.reply(200, login_ok("tok-2"));
    let mut session = SessionStore::new(MemoryCredentialStore::default(), api(&t));
    let cred = session.register_and_login(&registration()).unwrap();
    assert_eq!(cred.token.as_str(), "tok-2");
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(t.call_count(), 2);
}

#[test]
fn invalidate_twice_is_a_no_op() {
    let t = ScriptedTransport::new();
    let store = MemoryCredentialStore::with(credential("tok-1"));
    let mut session = SessionStore::new(store, api(&t));
    session.restore_session().unwrap();
    let events = session.subscribe();

    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::LoggedOut);
    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::LoggedOut);
    assert!(session.current_token().is_none());

    let seen: Vec<_> = events.try_iter().collect();
    assert_eq!(seen, vec![SessionState::LoggedOut]);
    assert_eq!(t.call_count(), 0);
}

#[test]
fn logout_clears_persisted_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketclip.sqlite");
    let mut store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
    store.save(&credential("tok-1")).unwrap();

    let t = ScriptedTransport::new();
    let mut session = SessionStore::new(store, api(&t));
    session.restore_session().unwrap();
    session.logout().unwrap();

    let conn = db::open_at(&path).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM settings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn half_written_store_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketclip.sqlite");
    let conn = db::open_at(&path).unwrap();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('auth_token', ?1)",
        params!["orphan"],
    )
    .unwrap();
    drop(conn);

    let t = ScriptedTransport::new();
    let store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
    let mut session = SessionStore::new(store, api(&t));
    assert!(session.restore_session().is_none());
    assert_eq!(session.state(), SessionState::LoggedOut);

    let conn = db::open_at(&path).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM settings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

fn stored_rows(path: &std::path::Path) -> i64 {
    let conn = db::open_at(path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM settings", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn failed_relogin_then_logout_leaves_nothing_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketclip.sqlite");
    let mut store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
    store.save(&credential("tok-old")).unwrap();

    let t = ScriptedTransport::new();
    t.reply(200, json!({ "success": false, "error": "Username atau password salah" }));
    let mut session = SessionStore::new(store, api(&t));
    session.restore_session().unwrap();

    assert!(session.login("sari", "salah").is_err());
    assert_eq!(session.state(), SessionState::LoggedOut);
    assert_eq!(stored_rows(&path), 0);

    session.logout().unwrap();
    assert_eq!(stored_rows(&path), 0);
    assert!(session.restore_session().is_none());
}

#[test]
fn logout_before_restore_clears_persisted_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketclip.sqlite");
    let mut store = SqliteCredentialStore::new(db::open_at(&path).unwrap());
    store.save(&credential("tok-1")).unwrap();

    let t = ScriptedTransport::new();
    let mut session = SessionStore::new(store, api(&t));
    let events = session.subscribe();
    session.logout().unwrap();

    assert_eq!(stored_rows(&path), 0);
    assert_eq!(session.state(), SessionState::LoggedOut);
    // Nothing was live, so nobody hears about it.
    assert!(events.try_iter().next().is_none());
    assert!(session.restore_session().is_none());
}
