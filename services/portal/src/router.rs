use axum::{
    Router,
    routing::{get, post},
};

use birimza_core::health::healthz;
use birimza_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    dashboard::dashboard,
    health::readyz,
    homework::{add_homework, list_homeworks, review_homework},
    parent::{login_parent, my_homeworks, register_parent, resend_otp, verify_otp},
    session::{create_session, delete_session, teacher_login},
    student::{add_student, list_students},
    teacher::{add_teacher, list_teachers},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Staff sessions
        .route("/auth/session", post(create_session).delete(delete_session))
        .route("/api/teacher_login", post(teacher_login))
        // Parent onboarding
        .route("/api/parents", post(register_parent))
        .route("/api/parents/login", post(login_parent))
        .route("/api/parents/me/homeworks", get(my_homeworks))
        .route("/api/parents/{id}/otp", post(resend_otp))
        .route("/api/parents/{id}/verify", post(verify_otp))
        // Staff screens
        .route("/teachers", get(list_teachers).post(add_teacher))
        .route("/students", get(list_students).post(add_student))
        .route("/homeworks", get(list_homeworks).post(add_homework))
        .route("/api/review_homework", post(review_homework))
        .route("/dashboard", get(dashboard))
        .with_state(state)
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
