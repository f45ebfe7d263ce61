use std::fs;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;

use tourney_terminal::model::UserRole;
use tourney_terminal::session::{SessionError, SessionStore, decode_claims};

fn make_token(sub: &str, id: u64, role: Option<&str>, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = match role {
        Some(role) => format!(r#"{{"sub":"{sub}","id":{id},"role":"{role}","exp":{exp}}}"#),
        None => format!(r#"{{"sub":"{sub}","id":{id},"exp":{exp}}}"#),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
    format!("{header}.{payload}.unsigned")
}

fn temp_session(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "tourney_terminal_{}_{name}.json",
        std::process::id()
    ))
}

#[test]
fn a_fresh_token_restores_across_stores() {
    let path = temp_session("restore");
    let token = make_token("alice", 7, Some("ADMIN"), Utc::now().timestamp() + 3600);
    fs::write(&path, format!(r#"{{"token":"{token}"}}"#)).expect("seed file should write");

    let mut store = SessionStore::new(Some(path.clone()));
    let user = store.restore().expect("unexpired token should restore");
    assert_eq!(user.username, "alice");
    assert_eq!(user.id, 7);
    assert_eq!(user.role, UserRole::Admin);
    assert_eq!(store.token(), Some(token.as_str()));

    let _ = fs::remove_file(&path);
}

#[test]
fn an_expired_token_is_purged_on_restore() {
    let path = temp_session("expired");
    let token = make_token("bob", 1, None, Utc::now().timestamp() - 30);
    fs::write(&path, format!(r#"{{"token":"{token}"}}"#)).expect("seed file should write");

    let mut store = SessionStore::new(Some(path.clone()));
    assert!(store.restore().is_none());
    assert!(store.token().is_none());
    assert!(!path.exists(), "stale session file should be removed");
}

#[test]
fn an_unreadable_session_file_is_purged() {
    let path = temp_session("garbage");
    fs::write(&path, "definitely not json").expect("seed file should write");

    let mut store = SessionStore::new(Some(path.clone()));
    assert!(store.restore().is_none());
    assert!(!path.exists(), "corrupt session file should be removed");
}

#[test]
fn login_persists_and_logout_purges() {
    let path = temp_session("lifecycle");
    let token = make_token("carol", 3, Some("PARTICIPANT"), Utc::now().timestamp() + 3600);

    let mut store = SessionStore::new(Some(path.clone()));
    let user = store.login(&token).expect("valid token should log in");
    assert_eq!(user.username, "carol");
    assert_eq!(user.role, UserRole::Participant);
    assert!(path.exists(), "session should be mirrored to disk");

    let mut second = SessionStore::new(Some(path.clone()));
    assert!(second.restore().is_some(), "a later start should resume the session");

    store.logout();
    assert!(store.token().is_none());
    assert!(store.user().is_none());
    assert!(!path.exists(), "logout should remove the session file");
}

#[test]
fn logging_in_with_an_expired_token_fails_without_persisting() {
    let path = temp_session("expired_login");
    let token = make_token("dave", 2, None, Utc::now().timestamp() - 5);

    let mut store = SessionStore::new(Some(path.clone()));
    let err = store.login(&token).expect_err("expired token should be rejected");
    assert!(matches!(err, SessionError::Expired));
    assert!(store.token().is_none());
    assert!(!path.exists());
}

#[test]
fn decode_rejects_tokens_that_are_not_three_parts() {
    assert!(matches!(decode_claims("no-dots"), Err(SessionError::Malformed)));
    assert!(matches!(decode_claims("two.parts"), Err(SessionError::Malformed)));
    assert!(decode_claims("a.%%%.c").is_err());
}

#[test]
fn a_missing_role_claim_defaults_to_participant() {
    let claims = decode_claims(&make_token("erin", 9, None, 123)).expect("claims should parse");
    assert_eq!(claims.sub, "erin");
    assert_eq!(claims.id, 9);
    assert_eq!(claims.exp, 123);
    assert_eq!(claims.role, UserRole::Participant);

    let claims =
        decode_claims(&make_token("frank", 10, Some("admin"), 123)).expect("claims should parse");
    assert_eq!(claims.role, UserRole::Admin, "lowercase role spelling is accepted");
}
