mod support;

use hostel_desk::db::SessionStorage;
use hostel_desk::error::AppError;
use hostel_desk::models::{ProfileUpdate, SignupDraft, User, UserRole};
use reqwest::Method;
use serde_json::json;
use support::{Harness, PASSWORD, TOKEN};

fn stale_profile() -> User {
    User {
        id: 42,
        name: "Old Name".to_string(),
        email: "asha@hostel.test".to_string(),
        role: UserRole::Student,
        room_no: Some("A-001".to_string()),
        avatar_url: None,
    }
}

#[tokio::test]
async fn test_login_persists_token_and_profile() {
    let h = Harness::new();

    assert!(h.session.login("asha@hostel.test", PASSWORD).await);

    assert_eq!(h.session.token().as_deref(), Some(TOKEN));
    let identity = h.session.identity().expect("identity missing");
    assert_eq!(identity.name, "Asha");
    assert_eq!(identity.room_no.as_deref(), Some("B-204"));
    assert_eq!(h.storage.load_token().await.unwrap().as_deref(), Some(TOKEN));
    assert_eq!(h.storage.load_profile().await.unwrap(), Some(identity));

    let me = h
        .backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/auth/me")
        .expect("profile fetch missing");
    assert_eq!(me.token.as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_login_failure_returns_false() {
    let h = Harness::new();

    assert!(!h.session.login("asha@hostel.test", "wrong").await);
    assert!(h.session.token().is_none());
    assert!(!h.session.is_authenticated());
    assert!(h.storage.load_token().await.unwrap().is_none());

    h.backend.set_offline(true);
    assert!(!h.session.login("asha@hostel.test", PASSWORD).await);
}

#[tokio::test]
async fn test_signup_sends_backend_field_names() {
    let h = Harness::new();
    let draft = SignupDraft {
        name: "Kiran".to_string(),
        email: "kiran@hostel.test".to_string(),
        password: "pw".to_string(),
        role: None,
        room_no: Some("D-3".to_string()),
    };

    assert!(h.session.signup(&draft).await);

    let request = h.backend.requests().pop().expect("signup request missing");
    assert_eq!(request.path, "/auth/signup");
    let body = request.body.expect("signup body missing");
    assert_eq!(body["full_name"], "Kiran");
    assert_eq!(body["role"], "student");
    assert_eq!(body["roomNo"], "D-3");

    h.backend.fail(Method::POST, "/auth/signup", 409, json!({ "error": "Email already registered" }));
    assert!(!h.session.signup(&draft).await);
}

#[tokio::test]
async fn test_logout_clears_everything_and_is_idempotent() {
    let h = Harness::logged_in().await;
    let mut changes = h.session.subscribe();
    changes.borrow_and_update();

    h.session.logout().await;

    assert!(h.session.token().is_none());
    assert!(h.session.identity().is_none());
    assert!(h.storage.load_token().await.unwrap().is_none());
    assert!(h.storage.load_profile().await.unwrap().is_none());
    assert!(changes.has_changed().unwrap());
    changes.borrow_and_update();

    // A second logout does not notify again.
    h.session.logout().await;
    assert!(!changes.has_changed().unwrap());
}

#[tokio::test]
async fn test_restore_refreshes_identity_but_returns_last_known() {
    let h = Harness::new();
    h.storage.save_token(TOKEN).await.unwrap();
    h.storage.save_profile(&stale_profile()).await.unwrap();

    let last_known = h.session.restore().await.expect("restore failed");

    assert_eq!(last_known.map(|u| u.name).as_deref(), Some("Old Name"));
    assert_eq!(h.session.identity().map(|u| u.name).as_deref(), Some("Asha"));
    assert_eq!(h.session.token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_restore_with_rejected_token_leaves_no_identity() {
    let h = Harness::new();
    h.storage.save_token("expired-token").await.unwrap();
    h.storage.save_profile(&stale_profile()).await.unwrap();

    let last_known = h.session.restore().await.expect("restore failed");

    assert!(last_known.is_some());
    // The persisted profile is for display only.
    assert!(h.session.identity().is_none());
}

#[tokio::test]
async fn test_restore_without_token_sends_nothing() {
    let h = Harness::new();

    let last_known = h.session.restore().await.expect("restore failed");

    assert!(last_known.is_none());
    assert!(h.backend.requests().is_empty());
}

#[tokio::test]
async fn test_update_profile_validates_and_refreshes() {
    let h = Harness::new();
    let update = ProfileUpdate {
        name: "Asha K".to_string(),
        email: "asha@hostel.test".to_string(),
        room_no: "B-205".to_string(),
    };

    let anonymous = h.session.update_profile(&update).await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));

    assert!(h.session.login("asha@hostel.test", PASSWORD).await);
    let blank = ProfileUpdate {
        name: "  ".to_string(),
        ..update.clone()
    };
    assert!(matches!(h.session.update_profile(&blank).await, Err(AppError::BadRequest(_))));

    h.backend.reset_log();
    h.session.update_profile(&update).await.expect("update failed");

    let paths: Vec<_> = h.backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/auth/update-profile", "/auth/me"]);
    let put = &h.backend.requests()[0];
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.body.as_ref().expect("profile body")["roomNo"], "B-205");
}
