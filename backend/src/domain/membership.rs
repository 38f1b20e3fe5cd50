//! Membership management: invite, remove, list.
//!
//! All mutations are owner-gated. The workspace's member list is the
//! authoritative record; the user-side `workspace_ids` back-reference is a
//! read model kept in sync best-effort. A failed back-reference write is
//! logged for reconciliation, never silently dropped, and never consulted
//! for authorization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::domain::access::{map_workspace_store_error, AccessGuard};
use crate::domain::ports::{UserRepository, UserStoreError, WorkspaceRepository};
use crate::domain::{EmailAddress, Error, Identity, Role, UserId, WorkspaceId};

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

/// One row of the member listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberEntry {
    /// The participant's user id.
    pub user_id: UserId,
    /// The participant's email address.
    pub email: EmailAddress,
    /// Owner or member.
    pub role: Role,
    /// Workspace creation time for the owner; account creation time for
    /// members (no separate join timestamp is tracked).
    pub joined_at: DateTime<Utc>,
}

/// Membership service over the workspace and user stores.
#[derive(Clone)]
pub struct MembershipService<W, U> {
    guard: AccessGuard<W>,
    workspaces: Arc<W>,
    users: Arc<U>,
}

impl<W, U> MembershipService<W, U> {
    /// Create a new service with the given collaborators.
    pub fn new(workspaces: Arc<W>, users: Arc<U>) -> Self {
        Self {
            guard: AccessGuard::new(Arc::clone(&workspaces)),
            workspaces,
            users,
        }
    }
}

impl<W, U> MembershipService<W, U>
where
    W: WorkspaceRepository,
    U: UserRepository,
{
    /// Invite an existing account into the workspace; owner only.
    pub async fn invite(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        target_email: &str,
    ) -> Result<MemberEntry, Error> {
        let workspace = self.guard.require_owner(workspace_id, identity).await?;

        let email = EmailAddress::parse(target_email)
            .map_err(|err| Error::validation(err.to_string()).with_field_error("email", err.to_string()))?;
        let target = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("no account exists for that email"))?;

        if target.id == identity.user_id {
            return Err(Error::validation("you cannot invite yourself"));
        }
        if workspace.role_of(&target.id).is_some() {
            return Err(Error::conflict(
                "that user is already a member of this workspace",
            ));
        }

        // The store re-checks membership atomically; a concurrent duplicate
        // invite loses here rather than corrupting the member list.
        self.workspaces
            .add_member(workspace_id, &target.id)
            .await
            .map_err(map_workspace_store_error)?;

        if let Err(err) = self.users.add_workspace(&target.id, workspace_id).await {
            error!(
                workspace_id = %workspace_id,
                user_id = %target.id,
                error = %err,
                "member back-reference write failed; reconciliation required"
            );
        }

        Ok(MemberEntry {
            user_id: target.id,
            email: target.email,
            role: Role::Member,
            joined_at: target.created_at,
        })
    }

    /// Remove a member from the workspace; owner only.
    ///
    /// The owner cannot remove themselves this way; deleting the workspace
    /// is the only self-exit for an owner.
    pub async fn remove(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        target: &UserId,
    ) -> Result<(), Error> {
        self.guard.require_owner(workspace_id, identity).await?;

        if *target == identity.user_id {
            return Err(Error::validation(
                "the owner cannot remove themselves; delete the workspace instead",
            ));
        }

        let was_member = self
            .workspaces
            .remove_member(workspace_id, target)
            .await
            .map_err(map_workspace_store_error)?;
        if !was_member {
            return Err(Error::not_found(
                "that user is not a member of this workspace",
            ));
        }

        if let Err(err) = self.users.remove_workspace(target, workspace_id).await {
            error!(
                workspace_id = %workspace_id,
                user_id = %target,
                error = %err,
                "member back-reference removal failed; reconciliation required"
            );
        }

        Ok(())
    }

    /// List participants: the owner first, then members in stored order.
    pub async fn list(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<MemberEntry>, Error> {
        let (workspace, _) = self.guard.require_participant(workspace_id, identity).await?;

        let owner = self
            .users
            .find_by_id(&workspace.owner_id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::internal("workspace owner account is missing"))?;

        let mut entries = Vec::with_capacity(workspace.member_ids.len() + 1);
        entries.push(MemberEntry {
            user_id: owner.id,
            email: owner.email,
            role: Role::Owner,
            joined_at: workspace.created_at,
        });

        for member_id in &workspace.member_ids {
            match self
                .users
                .find_by_id(member_id)
                .await
                .map_err(map_user_store_error)?
            {
                Some(member) => entries.push(MemberEntry {
                    user_id: member.id,
                    email: member.email,
                    role: Role::Member,
                    joined_at: member.created_at,
                }),
                None => {
                    // Dangling member id; skip it rather than failing the
                    // whole listing.
                    warn!(
                        workspace_id = %workspace_id,
                        user_id = %member_id,
                        "member id resolves to no account"
                    );
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
#[path = "membership_tests.rs"]
mod tests;
