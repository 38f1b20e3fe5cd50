//! HTTP adapter: handlers, DTOs, and error mapping.
//!
//! Handlers stay thin: resolve the bearer identity, decode the input DTO,
//! call a domain service, serialise the result. All authorization and
//! business rules live in the domain layer.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod expenses;
pub mod health;
pub mod members;
pub mod plans;
pub mod workspaces;

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::auth::JwtCredentialService;
use crate::doc::ApiDoc;
use crate::domain::{
    AccountService, AnalyticsService, Error, ExpenseService, Identity, MembershipService,
    PlanService, WorkspaceService,
};
use crate::store::MemoryStore;
use utoipa::OpenApi;

/// Concrete service graph wired over the bundled store and credential
/// adapter. Everything is `Arc`-shared; the state clones cheaply per worker.
pub struct AppState {
    /// Registration, login, and token resolution.
    pub accounts: AccountService<MemoryStore, JwtCredentialService>,
    /// Workspace CRUD.
    pub workspaces: WorkspaceService<MemoryStore, MemoryStore, MemoryStore, MemoryStore>,
    /// Membership management.
    pub members: MembershipService<MemoryStore, MemoryStore>,
    /// Plan registry.
    pub plans: PlanService<MemoryStore, MemoryStore>,
    /// Expense ledger.
    pub expenses: ExpenseService<MemoryStore, MemoryStore>,
    /// Budget analytics.
    pub analytics: AnalyticsService<MemoryStore, MemoryStore, MemoryStore>,
}

impl AppState {
    /// Wire every service over one store and credential adapter.
    pub fn new(store: Arc<MemoryStore>, credentials: Arc<JwtCredentialService>) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store), credentials),
            workspaces: WorkspaceService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
            ),
            members: MembershipService::new(Arc::clone(&store), Arc::clone(&store)),
            plans: PlanService::new(Arc::clone(&store), Arc::clone(&store)),
            expenses: ExpenseService::new(Arc::clone(&store), Arc::clone(&store)),
            analytics: AnalyticsService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
            ),
        }
    }
}

/// Resolve the caller's identity from the `Authorization: Bearer` header.
pub fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Identity, Error> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    state.accounts.identify(token.trim())
}

/// Raw OpenAPI document.
#[get("/api-docs/openapi.json")]
async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Mount every route onto the app. Shared by the binary and the HTTP test
/// harness.
pub fn configure(
    cfg: &mut web::ServiceConfig,
    state: web::Data<AppState>,
    health: web::Data<health::HealthState>,
) {
    cfg.app_data(state)
        .app_data(health)
        .service(openapi_json)
        .service(health::live)
        .service(health::ready)
        .service(
            web::scope("/api/v1")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me)
                .service(workspaces::create_workspace)
                .service(workspaces::list_workspaces)
                .service(workspaces::get_workspace)
                .service(workspaces::update_workspace)
                .service(workspaces::delete_workspace)
                .service(members::list_members)
                .service(members::invite_member)
                .service(members::remove_member)
                .service(plans::list_plan_types)
                .service(plans::create_plan)
                .service(plans::list_plans)
                .service(plans::update_plan)
                .service(plans::delete_plan)
                .service(expenses::expense_summary)
                .service(expenses::create_expense)
                .service(expenses::list_expenses)
                .service(expenses::update_expense)
                .service(expenses::delete_expense)
                .service(analytics::workspace_analytics),
        );
}
