//! Workspace CRUD services.
//!
//! Creation makes the caller the owner; update and delete are owner-gated.
//! Deletion cascades over plans, expenses, and every member's
//! back-reference before the workspace record itself goes away.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::domain::access::{map_workspace_store_error, AccessGuard};
use crate::domain::ports::{
    ExpenseRepository, ExpenseStoreError, PlanRepository, PlanStoreError, UserRepository,
    UserStoreError, WorkspaceRepository,
};
use crate::domain::{Error, Identity, Role, Workspace, WorkspaceDraft, WorkspaceId};

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

fn map_plan_store_error(error: PlanStoreError) -> Error {
    Error::internal(format!("plan store failure: {error}"))
}

fn map_expense_store_error(error: ExpenseStoreError) -> Error {
    Error::internal(format!("expense store failure: {error}"))
}

/// Patch applied by the owner to a workspace profile.
#[derive(Debug, Clone, Default)]
pub struct WorkspacePatch {
    /// Replacement name, if changing.
    pub name: Option<String>,
    /// Replacement description, if changing.
    pub description: Option<String>,
}

/// Workspace service over the workspace, user, plan, and expense stores.
#[derive(Clone)]
pub struct WorkspaceService<W, U, P, E> {
    guard: AccessGuard<W>,
    workspaces: Arc<W>,
    users: Arc<U>,
    plans: Arc<P>,
    expenses: Arc<E>,
}

impl<W, U, P, E> WorkspaceService<W, U, P, E> {
    /// Create a new service with the given collaborators.
    pub fn new(workspaces: Arc<W>, users: Arc<U>, plans: Arc<P>, expenses: Arc<E>) -> Self {
        Self {
            guard: AccessGuard::new(Arc::clone(&workspaces)),
            workspaces,
            users,
            plans,
            expenses,
        }
    }
}

impl<W, U, P, E> WorkspaceService<W, U, P, E>
where
    W: WorkspaceRepository,
    U: UserRepository,
    P: PlanRepository,
    E: ExpenseRepository,
{
    /// Create a workspace owned by the caller.
    ///
    /// Fails `Conflict` when the caller already owns a workspace with the
    /// same name. The owner's `workspace_ids` back-reference is updated
    /// best-effort: the workspace record is authoritative, so a failed
    /// back-reference write is logged for reconciliation rather than
    /// rolling back the creation.
    pub async fn create(
        &self,
        identity: &Identity,
        draft: WorkspaceDraft,
    ) -> Result<Workspace, Error> {
        let workspace = Workspace::new(draft, identity.user_id, Utc::now());
        self.workspaces
            .insert(&workspace)
            .await
            .map_err(map_workspace_store_error)?;

        if let Err(err) = self
            .users
            .add_workspace(&identity.user_id, &workspace.id)
            .await
        {
            error!(
                workspace_id = %workspace.id,
                user_id = %identity.user_id,
                error = %err,
                "owner back-reference write failed; reconciliation required"
            );
        }

        Ok(workspace)
    }

    /// Fetch one workspace together with the caller's role in it.
    pub async fn get(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<(Workspace, Role), Error> {
        self.guard.require_participant(workspace_id, identity).await
    }

    /// List every workspace the caller owns or participates in, resolved via
    /// the back-reference list (read model only; never used for access
    /// decisions).
    pub async fn list_mine(&self, identity: &Identity) -> Result<Vec<Workspace>, Error> {
        let user = self
            .users
            .find_by_id(&identity.user_id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        self.workspaces
            .find_by_ids(&user.workspace_ids)
            .await
            .map_err(map_workspace_store_error)
    }

    /// Update name/description; owner only.
    pub async fn update(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        patch: WorkspacePatch,
    ) -> Result<Workspace, Error> {
        let current = self.guard.require_owner(workspace_id, identity).await?;

        let name = patch.name.unwrap_or_else(|| current.name.clone());
        let description = patch
            .description
            .unwrap_or_else(|| current.description.clone());
        let draft = WorkspaceDraft::new(&name, &description)
            .map_err(|err| Error::validation(err.to_string()).with_field_error(err.field(), err.to_string()))?;

        let updated_at = Utc::now();
        let found = self
            .workspaces
            .update_profile(workspace_id, draft.name(), draft.description(), updated_at)
            .await
            .map_err(map_workspace_store_error)?;
        if !found {
            return Err(Error::not_found("workspace does not exist"));
        }

        Ok(Workspace {
            name: draft.name().to_owned(),
            description: draft.description().to_owned(),
            updated_at,
            ..current
        })
    }

    /// Delete the workspace and everything scoped to it; owner only.
    ///
    /// This is also the only way an owner leaves their own workspace.
    pub async fn delete(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<(), Error> {
        self.guard.require_owner(workspace_id, identity).await?;

        let plans_removed = self
            .plans
            .delete_by_workspace(workspace_id)
            .await
            .map_err(map_plan_store_error)?;
        let expenses_removed = self
            .expenses
            .delete_by_workspace(workspace_id)
            .await
            .map_err(map_expense_store_error)?;
        let users_touched = self
            .users
            .remove_workspace_from_all(workspace_id)
            .await
            .map_err(map_user_store_error)?;

        let found = self
            .workspaces
            .delete(workspace_id)
            .await
            .map_err(map_workspace_store_error)?;
        if !found {
            return Err(Error::not_found("workspace does not exist"));
        }

        info!(
            workspace_id = %workspace_id,
            plans_removed,
            expenses_removed,
            users_touched,
            "workspace deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "workspace_service_tests.rs"]
mod tests;
