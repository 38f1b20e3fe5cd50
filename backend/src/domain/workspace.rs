//! Workspace aggregate: the tenant boundary owning plans and expenses.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{UserId, WorkspaceId};

/// Longest acceptable workspace name after trimming.
const MAX_NAME_LEN: usize = 120;

/// Longest acceptable workspace description.
const MAX_DESCRIPTION_LEN: usize = 500;

/// Authorization level of a user with respect to one workspace.
///
/// "No role at all" is modelled as `Option<Role>` at the access guard, so a
/// role value always grants at least read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single creator of the workspace; may mutate everything in it.
    Owner,
    /// An invited collaborator; may read everything and log expenses.
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("owner"),
            Self::Member => f.write_str("member"),
        }
    }
}

/// Validation errors returned when constructing a [`WorkspaceDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceValidationError {
    /// Name was empty once trimmed.
    EmptyName,
    /// Name exceeds the length cap.
    NameTooLong { max: usize },
    /// Description exceeds the length cap.
    DescriptionTooLong { max: usize },
}

impl fmt::Display for WorkspaceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "workspace name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "workspace name must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "workspace description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for WorkspaceValidationError {}

impl WorkspaceValidationError {
    /// Name of the input field this error applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
        }
    }
}

/// Validated name/description pair for creating or renaming a workspace.
///
/// ## Invariants
/// - `name` is trimmed and 1..=120 characters.
/// - `description` is at most 500 characters (may be empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceDraft {
    name: String,
    description: String,
}

impl WorkspaceDraft {
    /// Validate raw name/description input.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::WorkspaceDraft;
    ///
    /// let draft = WorkspaceDraft::new("  Field Study 2026  ", "").unwrap();
    /// assert_eq!(draft.name(), "Field Study 2026");
    /// ```
    pub fn new(name: &str, description: &str) -> Result<Self, WorkspaceValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceValidationError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(WorkspaceValidationError::NameTooLong { max: MAX_NAME_LEN });
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(WorkspaceValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
        })
    }

    /// Trimmed workspace name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Workspace description, possibly empty.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Workspace record.
///
/// ## Invariants
/// - `owner_id` never appears in `member_ids`.
/// - `(name, owner_id)` is unique across the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    /// Stable identifier.
    pub id: WorkspaceId,
    /// Display name, unique per owner.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The user who created the workspace.
    pub owner_id: UserId,
    /// Invited collaborators in invitation order; excludes the owner.
    pub member_ids: Vec<UserId>,
    /// Creation time; doubles as the owner's joined-at time.
    pub created_at: DateTime<Utc>,
    /// Last profile or membership mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Create a workspace owned by `owner_id` from a validated draft.
    pub fn new(draft: WorkspaceDraft, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkspaceId::random(),
            name: draft.name,
            description: draft.description,
            owner_id,
            member_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolve the role `user_id` holds in this workspace, if any.
    ///
    /// Pure function over the record's own membership; never consults the
    /// user's `workspace_ids` back-reference.
    pub fn role_of(&self, user_id: &UserId) -> Option<Role> {
        if self.owner_id == *user_id {
            Some(Role::Owner)
        } else if self.member_ids.contains(user_id) {
            Some(Role::Member)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn workspace_with_member(owner: UserId, member: UserId) -> Workspace {
        let draft = WorkspaceDraft::new("Grant 42", "sequencing budget").expect("valid draft");
        let mut ws = Workspace::new(draft, owner, Utc::now());
        ws.member_ids.push(member);
        ws
    }

    #[rstest]
    #[case("", "")]
    #[case("   ", "desc")]
    fn draft_rejects_blank_names(#[case] name: &str, #[case] description: &str) {
        let err = WorkspaceDraft::new(name, description).expect_err("blank name rejected");
        assert_eq!(err, WorkspaceValidationError::EmptyName);
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn draft_rejects_oversized_fields() {
        let long_name = "n".repeat(121);
        assert_eq!(
            WorkspaceDraft::new(&long_name, "").expect_err("long name rejected"),
            WorkspaceValidationError::NameTooLong { max: 120 },
        );

        let long_description = "d".repeat(501);
        let err = WorkspaceDraft::new("ok", &long_description).expect_err("long description");
        assert_eq!(err.field(), "description");
    }

    #[test]
    fn role_resolution_distinguishes_owner_member_and_stranger() {
        let owner = UserId::random();
        let member = UserId::random();
        let ws = workspace_with_member(owner, member);

        assert_eq!(ws.role_of(&owner), Some(Role::Owner));
        assert_eq!(ws.role_of(&member), Some(Role::Member));
        assert_eq!(ws.role_of(&UserId::random()), None);
    }

    #[test]
    fn owner_role_wins_even_if_membership_is_corrupted() {
        // The invariant owner ∉ member_ids is enforced at write time; role
        // resolution must still prefer Owner if a stale record violates it.
        let owner = UserId::random();
        let mut ws = workspace_with_member(owner, owner);
        ws.member_ids.push(owner);
        assert_eq!(ws.role_of(&owner), Some(Role::Owner));
    }
}
