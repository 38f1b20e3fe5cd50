//! Workspace access guard.
//!
//! Every guarded operation resolves the caller's role against a fresh read
//! of the workspace record before touching data. Roles are never cached
//! across calls and never derived from the user's `workspace_ids`
//! back-reference, which may be briefly stale after a membership change.

use std::sync::Arc;

use crate::domain::ports::{WorkspaceRepository, WorkspaceStoreError};
use crate::domain::{Error, Identity, Role, Workspace, WorkspaceId};

/// Message shown when a participant lacks owner privilege.
const OWNER_ONLY: &str = "only the workspace owner can perform this action";

/// Message shown when the caller is not a workspace participant.
const NOT_A_MEMBER: &str = "you are not a member of this workspace";

pub(crate) fn map_workspace_store_error(error: WorkspaceStoreError) -> Error {
    match error {
        WorkspaceStoreError::Connection { message } => {
            Error::internal(format!("workspace store unavailable: {message}"))
        }
        WorkspaceStoreError::Query { message } => {
            Error::internal(format!("workspace store error: {message}"))
        }
        WorkspaceStoreError::DuplicateName { name } => {
            Error::conflict(format!("you already have a workspace named '{name}'"))
        }
        WorkspaceStoreError::DuplicateMember { .. } => {
            Error::conflict("that user is already a member of this workspace")
        }
    }
}

/// Stateless authorization service over the workspace repository.
#[derive(Clone)]
pub struct AccessGuard<W> {
    workspaces: Arc<W>,
}

impl<W> AccessGuard<W> {
    /// Create a guard reading membership through `workspaces`.
    pub fn new(workspaces: Arc<W>) -> Self {
        Self { workspaces }
    }
}

impl<W> AccessGuard<W>
where
    W: WorkspaceRepository,
{
    /// Resolve the caller's role, if any, against the current workspace
    /// record. Fails `NotFound` when the workspace does not exist.
    pub async fn check_access(
        &self,
        workspace_id: &WorkspaceId,
        identity: &Identity,
    ) -> Result<(Workspace, Option<Role>), Error> {
        let workspace = self
            .workspaces
            .find_by_id(workspace_id)
            .await
            .map_err(map_workspace_store_error)?
            .ok_or_else(|| Error::not_found("workspace does not exist"))?;
        let role = workspace.role_of(&identity.user_id);
        Ok((workspace, role))
    }

    /// Require any role; fails `Forbidden` for non-participants.
    pub async fn require_participant(
        &self,
        workspace_id: &WorkspaceId,
        identity: &Identity,
    ) -> Result<(Workspace, Role), Error> {
        let (workspace, role) = self.check_access(workspace_id, identity).await?;
        match role {
            Some(role) => Ok((workspace, role)),
            None => Err(Error::forbidden(NOT_A_MEMBER)),
        }
    }

    /// Require the owner role; members get the distinct owner-only failure.
    pub async fn require_owner(
        &self,
        workspace_id: &WorkspaceId,
        identity: &Identity,
    ) -> Result<Workspace, Error> {
        let (workspace, role) = self.check_access(workspace_id, identity).await?;
        match role {
            Some(Role::Owner) => Ok(workspace),
            Some(Role::Member) => Err(Error::owner_required(OWNER_ONLY)),
            None => Err(Error::forbidden(NOT_A_MEMBER)),
        }
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
