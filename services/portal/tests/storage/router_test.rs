use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use birimza_auth_types::cookie::SESSION_COOKIE;
use birimza_portal::router::build_router;
use birimza_portal::usecase::staff::EnsureAdminUseCase;
use birimza_domain::role::Role;
use birimza_testing::auth::MockAuth;

use crate::helpers::{app_state, fast_hasher, seed_staff, setup_db, stored_codes};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Value, auth: Option<&MockAuth>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth.bearer());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, auth: Option<&MockAuth>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth.bearer());
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn should_report_liveness_and_readiness() {
    let app = build_router(app_state(setup_db().await));

    let (status, _) = send(&app, get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get("/readyz", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_register_verify_and_login_parent_over_http() {
    let db = setup_db().await;
    let app = build_router(app_state(db.clone()));
    let credentials = json!({ "phone": "05551112233", "password": "pw1" });

    let (status, body) = send(
        &app,
        post(
            "/api/parents",
            json!({ "name": "Ayşe", "phone": "05551112233", "password": "pw1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["parent_id"], 1);

    let (status, body) = send(&app, post("/api/parents/login", credentials.clone(), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "UNVERIFIED");

    let (status, body) = send(
        &app,
        post("/api/parents/1/verify", json!({ "code": "abcdef" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_CODE");

    let code = stored_codes(&db).await.remove(0).code;
    let (status, _) = send(
        &app,
        post("/api/parents/1/verify", json!({ "code": code }), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, post("/api/parents/login", credentials, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_id"], 1);
    assert_eq!(body["name"], "Ayşe");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_parent_otp() {
    let app = build_router(app_state(setup_db().await));

    let (status, body) = send(&app, post("/api/parents/99/otp", json!({}), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "PARENT_NOT_FOUND");
}

#[tokio::test]
async fn should_set_session_cookie_on_staff_login() {
    let db = setup_db().await;
    EnsureAdminUseCase {
        staff: birimza_portal::infra::db::DbStaffRepository { db: db.clone() },
        hasher: fast_hasher(),
    }
    .execute("admin", "123456")
    .await
    .unwrap();
    let app = build_router(app_state(db));

    let response = app
        .clone()
        .oneshot(post(
            "/auth/session",
            json!({ "username": "admin", "password": "123456" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");

    let (status, body) = send(
        &app,
        post(
            "/auth/session",
            json!({ "username": "admin", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "INVALID_CREDENTIAL");
}

#[tokio::test]
async fn should_enforce_roles_on_staff_routes() {
    let app = build_router(app_state(setup_db().await));

    let (status, _) = send(&app, get("/dashboard", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/dashboard", Some(&MockAuth::parent(1)))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "FORBIDDEN");

    let (status, _) = send(&app, get("/teachers", Some(&MockAuth::teacher(2)))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get("/dashboard", Some(&MockAuth::admin()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_students"], 0);
    assert_eq!(body["recent_homeworks"], json!([]));
}

#[tokio::test]
async fn should_run_homework_review_round_trip() {
    let db = setup_db().await;
    let admin_id = seed_staff(&db, "admin", Role::Admin).await;
    let teacher_id = seed_staff(&db, "zeynep", Role::Teacher).await;
    let app = build_router(app_state(db));
    let admin = MockAuth::new(admin_id, Role::Admin);
    let teacher = MockAuth::teacher(teacher_id);

    let (status, body) = send(
        &app,
        post("/students", json!({ "name": "Ali" }), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_id = body["id"].clone();

    let (status, body) = send(
        &app,
        post(
            "/homeworks",
            json!({ "student_id": student_id, "subject": "Matematik" }),
            Some(&teacher),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let homework_id = body["id"].clone();

    let (status, body) = send(&app, get("/homeworks", Some(&teacher))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["student_name"], "Ali");
    assert_eq!(body[0]["status"], "pending");

    let review = json!({
        "homework_id": homework_id,
        "status": "reviewed_ok",
        "teacher_note": "Aferin",
    });
    let (status, _) = send(&app, post("/api/review_homework", review.clone(), Some(&admin))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        post("/api/review_homework", review.clone(), Some(&teacher)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reviewed_ok");

    let (status, body) = send(&app, post("/api/review_homework", review, Some(&teacher))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "HOMEWORK_ALREADY_REVIEWED");

    let (status, body) = send(&app, get("/homeworks?status=pending", Some(&teacher))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, get("/homeworks?status=bogus", Some(&teacher))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_STATUS");
}
