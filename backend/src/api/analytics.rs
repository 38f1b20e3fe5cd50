//! Analytics endpoint.

use actix_web::{get, web, HttpRequest};
use uuid::Uuid;

use crate::domain::{AnalyticsSnapshot, Error, WorkspaceId};

use super::{authenticate, AppState};

/// Current budget analytics for a workspace.
///
/// Recomputed from scratch on every call; consumers may cache at their own
/// layer.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/analytics",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Derived analytics snapshot", body = AnalyticsSnapshot),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such workspace", body = Error)
    ),
    tags = ["analytics"],
    operation_id = "workspaceAnalytics"
)]
#[get("/workspaces/{id}/analytics")]
pub async fn workspace_analytics(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<AnalyticsSnapshot>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let snapshot = state.analytics.snapshot(&identity, &workspace_id).await?;
    Ok(web::Json(snapshot))
}
