//! Membership endpoints.

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, MemberEntry, Role, UserId, WorkspaceId};

use super::{authenticate, AppState};

/// Invitation payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    /// Email of an existing account to invite.
    pub email: String,
}

/// One participant row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    /// Participant's user id.
    pub user_id: UserId,
    /// Participant's email.
    pub email: String,
    /// Owner or member.
    pub role: Role,
    /// Workspace creation time for the owner; account creation time for
    /// members.
    pub joined_at: DateTime<Utc>,
}

impl From<MemberEntry> for MemberResponse {
    fn from(entry: MemberEntry) -> Self {
        Self {
            user_id: entry.user_id,
            email: entry.email.as_str().to_owned(),
            role: entry.role,
            joined_at: entry.joined_at,
        }
    }
}

/// List participants; owner first.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/members",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Participants", body = [MemberResponse]),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such workspace", body = Error)
    ),
    tags = ["members"],
    operation_id = "listMembers"
)]
#[get("/workspaces/{id}/members")]
pub async fn list_members(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<Vec<MemberResponse>>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let entries = state.members.list(&identity, &workspace_id).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Invite an existing account; owner only.
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/members",
    params(("id" = Uuid, Path, description = "Workspace id")),
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 403, description = "Owner role required", body = Error),
        (status = 404, description = "No account for that email", body = Error),
        (status = 409, description = "Already a member", body = Error)
    ),
    tags = ["members"],
    operation_id = "inviteMember"
)]
#[post("/workspaces/{id}/members")]
pub async fn invite_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<InviteMemberRequest>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let entry = state
        .members
        .invite(&identity, &workspace_id, &body.email)
        .await?;
    Ok(HttpResponse::Created().json(MemberResponse::from(entry)))
}

/// Remove a member; owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}/members/{userId}",
    params(
        ("id" = Uuid, Path, description = "Workspace id"),
        ("userId" = Uuid, Path, description = "Member's user id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Owner attempted self-removal", body = Error),
        (status = 403, description = "Owner role required", body = Error),
        (status = 404, description = "Not a member", body = Error)
    ),
    tags = ["members"],
    operation_id = "removeMember"
)]
#[delete("/workspaces/{id}/members/{userId}")]
pub async fn remove_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let (workspace_id, user_id) = path.into_inner();
    state
        .members
        .remove(
            &identity,
            &WorkspaceId::from(workspace_id),
            &UserId::from(user_id),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
