//! Workspace endpoints.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Error, Role, UserId, Workspace, WorkspaceDraft, WorkspaceId, WorkspacePatch,
};

use super::{authenticate, AppState};

/// Workspace creation payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    /// Display name, unique among the caller's workspaces.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

/// Workspace update payload; absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspaceRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
}

/// Workspace projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Owning user.
    pub owner_id: UserId,
    /// Number of invited members (owner excluded).
    pub member_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(ws: Workspace) -> Self {
        Self {
            id: ws.id,
            name: ws.name,
            description: ws.description,
            owner_id: ws.owner_id,
            member_count: ws.member_ids.len(),
            created_at: ws.created_at,
            updated_at: ws.updated_at,
        }
    }
}

/// Workspace projection including the caller's role.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDetailResponse {
    /// The workspace itself.
    #[serde(flatten)]
    pub workspace: WorkspaceResponse,
    /// The caller's role in the workspace.
    pub role: Role,
}

fn parse_draft(name: &str, description: &str) -> Result<WorkspaceDraft, Error> {
    WorkspaceDraft::new(name, description).map_err(|err| {
        Error::validation(err.to_string()).with_field_error(err.field(), err.to_string())
    })
}

/// Create a workspace owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/workspaces",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created", body = WorkspaceResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 409, description = "Name already used by this owner", body = Error)
    ),
    tags = ["workspaces"],
    operation_id = "createWorkspace"
)]
#[post("/workspaces")]
pub async fn create_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateWorkspaceRequest>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let draft = parse_draft(&body.name, &body.description)?;
    let workspace = state.workspaces.create(&identity, draft).await?;
    Ok(HttpResponse::Created().json(WorkspaceResponse::from(workspace)))
}

/// List the caller's workspaces.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces",
    responses(
        (status = 200, description = "Workspaces the caller participates in", body = [WorkspaceResponse]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["workspaces"],
    operation_id = "listWorkspaces"
)]
#[get("/workspaces")]
pub async fn list_workspaces(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<web::Json<Vec<WorkspaceResponse>>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspaces = state.workspaces.list_mine(&identity).await?;
    Ok(web::Json(
        workspaces.into_iter().map(WorkspaceResponse::from).collect(),
    ))
}

/// Fetch one workspace with the caller's role.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace detail", body = WorkspaceDetailResponse),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such workspace", body = Error)
    ),
    tags = ["workspaces"],
    operation_id = "getWorkspace"
)]
#[get("/workspaces/{id}")]
pub async fn get_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<WorkspaceDetailResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let (workspace, role) = state.workspaces.get(&identity, &workspace_id).await?;
    Ok(web::Json(WorkspaceDetailResponse {
        workspace: workspace.into(),
        role,
    }))
}

/// Update name/description; owner only.
#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}",
    params(("id" = Uuid, Path, description = "Workspace id")),
    request_body = UpdateWorkspaceRequest,
    responses(
        (status = 200, description = "Updated workspace", body = WorkspaceResponse),
        (status = 403, description = "Owner role required", body = Error),
        (status = 409, description = "Name already used by this owner", body = Error)
    ),
    tags = ["workspaces"],
    operation_id = "updateWorkspace"
)]
#[put("/workspaces/{id}")]
pub async fn update_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateWorkspaceRequest>,
) -> Result<web::Json<WorkspaceResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let body = body.into_inner();
    let workspace = state
        .workspaces
        .update(
            &identity,
            &workspace_id,
            WorkspacePatch {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(web::Json(workspace.into()))
}

/// Delete the workspace and everything in it; owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 204, description = "Workspace deleted"),
        (status = 403, description = "Owner role required", body = Error),
        (status = 404, description = "No such workspace", body = Error)
    ),
    tags = ["workspaces"],
    operation_id = "deleteWorkspace"
)]
#[delete("/workspaces/{id}")]
pub async fn delete_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    state.workspaces.delete(&identity, &workspace_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
