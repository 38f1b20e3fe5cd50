//! HTTP round-trips against the full app: routing, bearer auth, the error
//! envelope, and the request-id middleware, all over the in-memory store.

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::{json, Value};

use backend::api::health::HealthState;
use backend::api::{self, AppState};
use backend::auth::JwtCredentialService;
use backend::store::MemoryStore;
use backend::RequestId;

const TEST_COST: u32 = 4;

fn app_state() -> (web::Data<AppState>, web::Data<HealthState>) {
    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(JwtCredentialService::new(b"http-secret", 3600, TEST_COST));
    (
        web::Data::new(AppState::new(store, credentials)),
        web::Data::new(HealthState::new()),
    )
}

macro_rules! init_app {
    ($state:expr, $health:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestId)
                .configure(|cfg| api::configure(cfg, $state.clone(), $health.clone())),
        )
        .await
    };
}

async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "email": email, "password": "long-enough-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201, "registration for {email}");
    let body: Value = test::read_body_json(res).await;
    body["token"].as_str().expect("token in response").to_owned()
}

fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn register_login_me_round_trip() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let token = register(&app, "pi@lab.edu").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "PI@lab.edu", "password": "long-enough-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["email"], json!("pi@lab.edu"));
}

#[actix_web::test]
async fn wrong_password_yields_the_unauthorized_envelope() {
    let (state, health) = app_state();
    let app = init_app!(state, health);
    register(&app, "pi@lab.edu").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "pi@lab.edu", "password": "wrong-password!" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 401);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], json!("unauthorized"));
}

#[actix_web::test]
async fn requests_without_a_token_are_rejected() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/workspaces").to_request(),
    )
    .await;
    assert_eq!(res.status(), 401);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/workspaces")
            .insert_header(("authorization", "Bearer not-a-real-token"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 401);
}

#[actix_web::test]
async fn workspace_plan_expense_analytics_flow() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let owner = register(&app, "pi@lab.edu").await;
    let member = register(&app, "postdoc@lab.edu").await;

    // Create a workspace.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/workspaces")
            .insert_header(bearer(&owner))
            .set_json(json!({ "name": "Sequencing Grant", "description": "2026" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);
    let ws: Value = test::read_body_json(res).await;
    let ws_id = ws["id"].as_str().expect("workspace id").to_owned();

    // Invite the second account.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/members"))
            .insert_header(bearer(&owner))
            .set_json(json!({ "email": "postdoc@lab.edu" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);

    // The member sees the workspace with their role.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/workspaces/{ws_id}"))
            .insert_header(bearer(&member))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["role"], json!("member"));
    assert_eq!(detail["name"], json!("Sequencing Grant"));

    // Budget a category; a duplicate type conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/plans"))
            .insert_header(bearer(&owner))
            .set_json(json!({ "type": "travel", "plannedAmount": 1000.0 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/plans"))
            .insert_header(bearer(&member))
            .set_json(json!({ "type": "travel", "plannedAmount": 1.0 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 409);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], json!("conflict"));

    // The member records expenses.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/expenses"))
            .insert_header(bearer(&member))
            .set_json(json!({ "planType": "travel", "amount": 1200.0, "note": "flights" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/expenses"))
            .insert_header(bearer(&member))
            .set_json(json!({ "amount": 50.0 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 201);

    // Unknown category comes back as a field-level validation failure.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/workspaces/{ws_id}/expenses"))
            .insert_header(bearer(&member))
            .set_json(json!({ "planType": "catering", "amount": 10.0 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 400);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], json!("validation"));
    assert!(body["fieldErrors"]["planType"].is_array());

    // Listing paginates and orders.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/workspaces/{ws_id}/expenses?limit=1&offset=0"
            ))
            .insert_header(bearer(&owner))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["total"], json!(2));
    assert_eq!(page["hasMore"], json!(true));
    assert_eq!(page["items"].as_array().expect("items").len(), 1);

    // Plan types include the synthetic catch-all.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/workspaces/{ws_id}/plans/types"))
            .insert_header(bearer(&member))
            .to_request(),
    )
    .await;
    let types: Value = test::read_body_json(res).await;
    assert_eq!(types, json!(["other", "travel"]));

    // Analytics reflects the overspend.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/workspaces/{ws_id}/analytics"))
            .insert_header(bearer(&member))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let snapshot: Value = test::read_body_json(res).await;
    assert_eq!(snapshot["summary"]["overSpent"], json!(true));
    assert_eq!(snapshot["summary"]["remaining"], json!(-250.0));
    assert_eq!(snapshot["summary"]["usagePercentage"], json!(100.0));
    assert_eq!(
        snapshot["monthlyTrend"].as_array().expect("trend").len(),
        6
    );
    assert_eq!(snapshot["categoryComparison"][0]["status"], json!("over"));

    // A third account is no participant at all.
    let stranger = register(&app, "stranger@lab.edu").await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/workspaces/{ws_id}/analytics"))
            .insert_header(bearer(&stranger))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], json!("forbidden"));

    // Owner-gated delete: the member gets the distinct owner-only kind.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/workspaces/{ws_id}"))
            .insert_header(bearer(&member))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 403);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], json!("owner_required"));

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/workspaces/{ws_id}"))
            .insert_header(bearer(&owner))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 204);
}

#[actix_web::test]
async fn every_response_carries_a_request_id() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/live").to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
}

#[actix_web::test]
async fn readiness_flips_with_the_shared_state() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(res.status(), 503);

    health.mark_ready();
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
}

#[actix_web::test]
async fn openapi_document_is_served() {
    let (state, health) = app_state();
    let app = init_app!(state, health);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), 200);
    let doc: Value = test::read_body_json(res).await;
    assert!(doc["paths"]["/api/v1/auth/register"].is_object());
}
