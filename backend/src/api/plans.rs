//! Plan registry endpoints.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Plan, PlanDraft, PlanId, PlanList, PlanPatch, WorkspaceId};

use super::{authenticate, AppState};

/// Plan creation payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    /// Budget category key.
    #[serde(rename = "type")]
    pub plan_type: String,
    /// Target amount; zero is allowed.
    pub planned_amount: f64,
}

/// Plan update payload; absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    /// Replacement category key.
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
    /// Replacement target amount.
    pub planned_amount: Option<f64>,
}

/// Plan projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// Plan identifier.
    pub id: PlanId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Budget category key.
    #[serde(rename = "type")]
    pub plan_type: String,
    /// Target amount.
    pub planned_amount: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            workspace_id: plan.workspace_id,
            plan_type: plan.plan_type.as_str().to_owned(),
            planned_amount: plan.planned_amount,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// Plan listing with aggregate totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanListResponse {
    /// Plans sorted by type, then creation time descending.
    pub plans: Vec<PlanResponse>,
    /// Sum of all planned amounts.
    pub total_planned_amount: f64,
    /// Mean planned amount; zero when there are no plans.
    pub average_amount: f64,
}

impl From<PlanList> for PlanListResponse {
    fn from(list: PlanList) -> Self {
        Self {
            plans: list.plans.into_iter().map(Into::into).collect(),
            total_planned_amount: list.total_planned_amount,
            average_amount: list.average_amount,
        }
    }
}

/// Create a plan.
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/plans",
    params(("id" = Uuid, Path, description = "Workspace id")),
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Invalid type or amount", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 409, description = "Category already planned", body = Error)
    ),
    tags = ["plans"],
    operation_id = "createPlan"
)]
#[post("/workspaces/{id}/plans")]
pub async fn create_plan(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let body = body.into_inner();
    let plan = state
        .plans
        .create(
            &identity,
            &workspace_id,
            PlanDraft {
                plan_type: body.plan_type,
                planned_amount: body.planned_amount,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(PlanResponse::from(plan)))
}

/// List plans with totals.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/plans",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Plans with totals", body = PlanListResponse),
        (status = 403, description = "Not a participant", body = Error)
    ),
    tags = ["plans"],
    operation_id = "listPlans"
)]
#[get("/workspaces/{id}/plans")]
pub async fn list_plans(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<PlanListResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let list = state.plans.list(&identity, &workspace_id).await?;
    Ok(web::Json(list.into()))
}

/// Distinct category keys; always contains `"other"`.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/plans/types",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Sorted distinct plan types", body = [String]),
        (status = 403, description = "Not a participant", body = Error)
    ),
    tags = ["plans"],
    operation_id = "listPlanTypes"
)]
#[get("/workspaces/{id}/plans/types")]
pub async fn list_plan_types(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<Vec<String>>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let types = state.plans.plan_types(&identity, &workspace_id).await?;
    Ok(web::Json(types))
}

/// Update a plan.
#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}/plans/{planId}",
    params(
        ("id" = Uuid, Path, description = "Workspace id"),
        ("planId" = Uuid, Path, description = "Plan id")
    ),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Updated plan", body = PlanResponse),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such plan in this workspace", body = Error),
        (status = 409, description = "Category already planned", body = Error)
    ),
    tags = ["plans"],
    operation_id = "updatePlan"
)]
#[put("/workspaces/{id}/plans/{planId}")]
pub async fn update_plan(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdatePlanRequest>,
) -> Result<web::Json<PlanResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let (workspace_id, plan_id) = path.into_inner();
    let body = body.into_inner();
    let plan = state
        .plans
        .update(
            &identity,
            &WorkspaceId::from(workspace_id),
            &PlanId::from(plan_id),
            PlanPatch {
                plan_type: body.plan_type,
                planned_amount: body.planned_amount,
            },
        )
        .await?;
    Ok(web::Json(plan.into()))
}

/// Delete a plan; owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}/plans/{planId}",
    params(
        ("id" = Uuid, Path, description = "Workspace id"),
        ("planId" = Uuid, Path, description = "Plan id")
    ),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 403, description = "Owner role required", body = Error),
        (status = 404, description = "No such plan in this workspace", body = Error)
    ),
    tags = ["plans"],
    operation_id = "deletePlan"
)]
#[delete("/workspaces/{id}/plans/{planId}")]
pub async fn delete_plan(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let (workspace_id, plan_id) = path.into_inner();
    state
        .plans
        .delete(
            &identity,
            &WorkspaceId::from(workspace_id),
            &PlanId::from(plan_id),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
