mod common;

use std::fs;

use axum::http::StatusCode;
use infra::BuildQueue;
use uuid::Uuid;

use crate::common::*;

#[tokio::test]
async fn login_page_renders_for_anonymous_users() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());
    let app = router(&state);

    let response = send(&app, get("/login", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<title>Login | Mein Club</title>"));
    assert!(html.contains("action=\"/login\""));
}

#[tokio::test]
async fn register_page_renders_for_anonymous_users() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());

    let response = send(&router(&state), get("/register", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<title>Registrieren | Mein Club</title>"));
}

#[tokio::test]
async fn admin_requires_a_session() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());
    let app = router(&state);

    for uri in ["/admin", "/admin/build"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/login"));
    }
}

#[tokio::test]
async fn invalid_session_cookie_is_treated_as_anonymous() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());
    let app = router(&state);
    let cookie = "club_portal_session=not-a-token";

    let response = send(&app, get("/login", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get("/admin", Some(cookie))).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn logged_in_users_skip_login_and_register() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());
    let app = router(&state);
    let cookie = session_cookie(&state, Uuid::new_v4(), "a@test.local");

    for uri in ["/login", "/register"] {
        let response = send(&app, get(uri, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/admin"));
    }
}

#[tokio::test]
async fn build_status_reports_the_queue() {
    let out = tempfile::tempdir().unwrap();
    let (state, queue) = offline_state(out.path());
    let app = router(&state);
    let cookie = session_cookie(&state, Uuid::new_v4(), "a@test.local");

    let response = send(&app, get("/admin/build", Some(&cookie))).await;
    assert_eq!(body_text(response).await, "null");

    queue.enqueue(std::time::Duration::from_secs(10)).await.unwrap();

    let response = send(&app, get("/admin/build", Some(&cookie))).await;
    let task: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(task["status"], "pending");
    assert_eq!(task["task_key"], "site");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let out = tempfile::tempdir().unwrap();
    let (state, _) = offline_state(out.path());

    let response = send(&router(&state), post_form("/logout", "", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let header = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(header.starts_with("club_portal_session=;"));
    assert!(header.contains("Max-Age=0"));
}

#[tokio::test]
async fn generated_pages_and_assets_are_served() {
    let out = tempfile::tempdir().unwrap();
    fs::create_dir_all(out.path().join("clubs/sv-adler")).unwrap();
    fs::create_dir_all(out.path().join("assets")).unwrap();
    fs::write(out.path().join("clubs/sv-adler/index.html"), "<h1>SV Adler</h1>").unwrap();
    fs::write(out.path().join("assets/site.css"), "body{}").unwrap();
    let (state, _) = offline_state(out.path());
    let app = router(&state);

    let response = send(&app, get("/clubs/sv-adler/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<h1>SV Adler</h1>");

    let response = send(&app, get("/assets/site.css", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get("/clubs/missing/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
